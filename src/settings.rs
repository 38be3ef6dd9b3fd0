use crate::oauth::UnknownSourcePolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_FACEBOOK_GRAPH_API_BASE: &str = "https://graph.facebook.com/v4.0";
pub const DEFAULT_GOOGLE_TOKENINFO_ENDPOINT: &str = "https://oauth2.googleapis.com/tokeninfo";
pub const DEFAULT_GOOGLE_USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Environment variable naming a directory with a higher-priority `Settings.toml`
pub const SECRETS_DIR_ENV: &str = "GATEWAY_SECRETS_DIR";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: basic_toml::Error,
    },

    #[error("missing {0}")]
    MissingCredential(String),

    #[error("invalid URL for {field}: {source}")]
    InvalidUrl {
        field: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("failed to initialize logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GatewaySettings {
    pub application: ApplicationSettings,
    pub cors: CorsSettings,
    pub logging: LoggingSettings,
    pub facebook: FacebookSettings,
    pub google: GoogleSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    /// What to do with an `oauthSource` that is neither Facebook nor Google
    pub unknown_source: UnknownSourcePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsSettings {
    /// `*` or a comma-separated list of origins
    pub allow_origin: String,
    pub allow_methods: Vec<String>,
    pub allow_headers: Vec<String>,
    pub max_age_secs: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FacebookSettings {
    // Direct values (can be overridden by environment variables)
    pub client_id: Option<String>,
    pub client_secret: Option<String>,

    // Environment variable names for overrides
    pub client_id_env: Option<String>,
    pub client_secret_env: Option<String>,

    pub graph_api_base: String,
    /// Edge length in pixels of the profile picture requested from `/me`
    pub picture_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    pub client_id: Option<String>,
    pub client_id_env: Option<String>,
    pub tokeninfo_endpoint: String,
    pub userinfo_endpoint: String,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7788,
            unknown_source: UnknownSourcePolicy::Reject,
        }
    }
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            allow_origin: "*".to_string(),
            allow_methods: ["POST", "GET", "OPTIONS", "PUT", "DELETE"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            allow_headers: [
                "Accept",
                "Content-Type",
                "Content-Length",
                "Accept-Encoding",
                "X-CSRF-Token",
                "Authorization",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            max_age_secs: 3600,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for FacebookSettings {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            client_id_env: Some("FACEBOOK_CLIENT_ID".to_string()),
            client_secret_env: Some("FACEBOOK_CLIENT_SECRET".to_string()),
            graph_api_base: DEFAULT_FACEBOOK_GRAPH_API_BASE.to_string(),
            picture_size: 200,
        }
    }
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            client_id: None,
            client_id_env: Some("GOOGLE_CLIENT_ID".to_string()),
            tokeninfo_endpoint: DEFAULT_GOOGLE_TOKENINFO_ENDPOINT.to_string(),
            userinfo_endpoint: DEFAULT_GOOGLE_USERINFO_ENDPOINT.to_string(),
        }
    }
}

impl GatewaySettings {
    /// Load settings from configuration files and environment variables
    /// and initialize logging with the resulting level
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A settings file cannot be read or parsed
    /// - Logger initialization fails
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_env_file();

        let secrets_dir = std::env::var(SECRETS_DIR_ENV).ok().map(PathBuf::from);
        let mut settings = Self::load_base_settings(Path::new("."), secrets_dir.as_deref())?;

        Self::apply_env_overrides(&mut settings)?;
        Self::initialize_logging(&settings.logging)?;

        Ok(settings)
    }

    /// Load base settings from TOML file(s) or use defaults
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading base settings)
    /// 2. Settings.toml in `secrets_dir` (if given and it exists)
    /// 3. Settings.toml in `base_dir` (if exists)
    /// 4. Default settings
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file exists but cannot be read or parsed
    pub fn load_base_settings(
        base_dir: &Path,
        secrets_dir: Option<&Path>,
    ) -> Result<Self, SettingsError> {
        let mut settings = Self::default();

        let default_config_path = base_dir.join("Settings.toml");
        if default_config_path.exists() {
            settings = Self::from_toml_file(&default_config_path)?;
            println!(
                "✓ Loaded base settings from {}",
                default_config_path.display()
            );
        }

        if let Some(secrets_dir) = secrets_dir {
            let secrets_path = secrets_dir.join("Settings.toml");
            if secrets_path.exists() {
                settings = Self::from_toml_file(&secrets_path)?;
                println!("✓ Overriding settings from {}", secrets_path.display());
            } else {
                println!(
                    "ℹ {SECRETS_DIR_ENV} set but no Settings.toml found at: {}",
                    secrets_path.display()
                );
            }
        }

        Ok(settings)
    }

    /// Parse a single TOML settings file; missing keys take their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML
    pub fn from_toml_file(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        basic_toml::from_str(&content).map_err(|source| SettingsError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment variable overrides to settings
    ///
    /// # Errors
    ///
    /// Returns an error if `UNKNOWN_OAUTH_SOURCE` names no known policy
    pub fn apply_env_overrides(settings: &mut Self) -> Result<(), SettingsError> {
        Self::apply_application_env_overrides(&mut settings.application)?;
        Self::apply_cors_env_overrides(&mut settings.cors);
        Self::apply_logging_env_overrides(&mut settings.logging);
        Self::apply_facebook_env_overrides(&mut settings.facebook);
        Self::apply_google_env_overrides(&mut settings.google);
        Ok(())
    }

    fn apply_application_env_overrides(
        app_settings: &mut ApplicationSettings,
    ) -> Result<(), SettingsError> {
        if let Ok(host) = std::env::var("HOST") {
            app_settings.host = host;
        }
        if let Ok(port_str) = std::env::var("PORT") {
            if let Ok(port) = port_str.parse::<u16>() {
                app_settings.port = port;
            }
        }
        if let Ok(policy) = std::env::var("UNKNOWN_OAUTH_SOURCE") {
            app_settings.unknown_source = policy
                .parse::<UnknownSourcePolicy>()
                .map_err(|reason| SettingsError::InvalidValue {
                    name: "UNKNOWN_OAUTH_SOURCE",
                    reason,
                })?;
        }
        Ok(())
    }

    fn apply_cors_env_overrides(cors_settings: &mut CorsSettings) {
        if let Ok(origin) = std::env::var("CORS_ALLOW_ORIGIN") {
            cors_settings.allow_origin = origin;
        }
    }

    fn apply_logging_env_overrides(logging_settings: &mut LoggingSettings) {
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            logging_settings.level = log_level;
        }
    }

    fn apply_facebook_env_overrides(facebook: &mut FacebookSettings) {
        if let Ok(base) = std::env::var("FACEBOOK_GRAPH_API_BASE") {
            facebook.graph_api_base = base;
        }
    }

    fn apply_google_env_overrides(google: &mut GoogleSettings) {
        if let Ok(endpoint) = std::env::var("GOOGLE_TOKENINFO_ENDPOINT") {
            google.tokeninfo_endpoint = endpoint;
        }
        if let Ok(endpoint) = std::env::var("GOOGLE_USERINFO_ENDPOINT") {
            google.userinfo_endpoint = endpoint;
        }
    }

    fn initialize_logging(logging: &LoggingSettings) -> Result<(), SettingsError> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&logging.level))
            .try_init()?;
        Ok(())
    }

    /// Load environment variables from .env file without clobbering existing ones
    fn load_env_file() {
        if let Ok(contents) = std::fs::read_to_string(".env") {
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    let key = key.trim();
                    if std::env::var_os(key).is_none() {
                        std::env::set_var(key, value.trim());
                    }
                }
            }
        }
    }

    /// Get the bind address for the server
    #[must_use]
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }
}

impl CorsSettings {
    #[must_use]
    pub fn allows_any_origin(&self) -> bool {
        self.allow_origin.trim() == "*"
    }

    /// Configured origins as a vector of strings
    #[must_use]
    pub fn origins(&self) -> Vec<String> {
        self.allow_origin
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Resolve a credential: the named environment variable wins over the direct value
fn resolve_credential(env_name: Option<&String>, direct: Option<&String>) -> Option<String> {
    if let Some(env_var) = env_name {
        if let Ok(value) = std::env::var(env_var) {
            if !value.is_empty() {
                return Some(value);
            }
        }
    }
    direct.filter(|value| !value.is_empty()).cloned()
}

impl FacebookSettings {
    /// Get the client ID, checking environment variable first, then falling back to direct value
    #[must_use]
    pub fn get_client_id(&self) -> Option<String> {
        resolve_credential(self.client_id_env.as_ref(), self.client_id.as_ref())
    }

    /// Get the client secret, checking environment variable first, then falling back to direct value
    #[must_use]
    pub fn get_client_secret(&self) -> Option<String> {
        resolve_credential(self.client_secret_env.as_ref(), self.client_secret.as_ref())
    }
}

impl GoogleSettings {
    /// Get the client ID, checking environment variable first, then falling back to direct value
    #[must_use]
    pub fn get_client_id(&self) -> Option<String> {
        resolve_credential(self.client_id_env.as_ref(), self.client_id.as_ref())
    }
}
