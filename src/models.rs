use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Identity provider a token was issued by
///
/// Serialized as its integer tag (`1` = Facebook, `2` = Google) to stay
/// wire-compatible with existing clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum OAuthSource {
    Facebook = 1,
    Google = 2,
}

impl OAuthSource {
    /// Resolve a raw `oauthSource` tag, returning `None` for unknown values
    #[must_use]
    pub fn from_tag(tag: i64) -> Option<Self> {
        match tag {
            1 => Some(Self::Facebook),
            2 => Some(Self::Google),
            _ => None,
        }
    }

    #[must_use]
    pub fn tag(self) -> i64 {
        self as i64
    }

    /// Lowercase provider name used in logs and error messages
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Facebook => "facebook",
            Self::Google => "google",
        }
    }
}

impl fmt::Display for OAuthSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<i64> for OAuthSource {
    type Error = String;

    fn try_from(tag: i64) -> Result<Self, Self::Error> {
        Self::from_tag(tag).ok_or_else(|| format!("unknown oauthSource {tag}"))
    }
}

impl From<OAuthSource> for i64 {
    fn from(source: OAuthSource) -> Self {
        source.tag()
    }
}

/// Body of `POST /login`
///
/// `oauth_source` stays a raw tag so the dispatcher decides what to do with
/// values outside the known set.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub access_token: String,
    pub oauth_source: i64,
}

impl LoginRequest {
    #[must_use]
    pub fn new(access_token: &str, oauth_source: i64) -> Self {
        Self {
            access_token: access_token.to_string(),
            oauth_source,
        }
    }
}

/// Provider-agnostic profile returned by a successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedUser {
    /// Profile email
    pub username: String,
    pub display_name: String,
    pub oauth_source: OAuthSource,
    /// Provider-native user id
    pub oauth_id: String,
}
