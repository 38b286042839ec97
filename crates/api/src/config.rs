use persistence::ConnectionString;
use serde::Deserialize;
use std::net::SocketAddr;

/// Legacy variable holding the table storage connection string.
pub const LEGACY_CONNECTION_STRING_VAR: &str = "TABLE_SERVICE_CONNECTION_STRING";

/// Legacy variable holding the search index date.
pub const LEGACY_INDEX_DATE_VAR: &str = "AZURE_INDEX_DATE";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub storage: StorageConfig,
    pub pii: PiiConfig,
    pub feedback: FeedbackConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Send Strict-Transport-Security; only behind TLS termination.
    #[serde(default)]
    pub hsts_enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Empty disables persistence.
    #[serde(default)]
    pub connection_string: String,

    #[serde(default = "default_table_name")]
    pub table_name: String,

    #[serde(default = "default_storage_timeout")]
    pub timeout_ms: u64,

    /// Create the table at startup if missing.
    #[serde(default)]
    pub create_table: bool,
}

impl StorageConfig {
    pub fn is_configured(&self) -> bool {
        !self.connection_string.trim().is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PiiConfig {
    /// Analyzer backend: "builtin" or "presidio".
    #[serde(default = "default_pii_provider")]
    pub provider: String,

    /// Base URL of the Presidio analyzer service.
    #[serde(default)]
    pub analyzer_url: String,

    #[serde(default = "default_pii_language")]
    pub language: String,

    #[serde(default = "default_pii_timeout")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub min_score: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackConfig {
    #[serde(default = "default_index_date")]
    pub index_date: String,

    #[serde(default = "default_partition_key")]
    pub partition_key: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_body_size() -> usize {
    1_048_576
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_table_name() -> String {
    domain::models::FEEDBACK_TABLE.to_string()
}

fn default_storage_timeout() -> u64 {
    10_000
}

fn default_pii_provider() -> String {
    PII_PROVIDER_BUILTIN.to_string()
}

fn default_pii_language() -> String {
    "en".to_string()
}

fn default_pii_timeout() -> u64 {
    5_000
}

fn default_index_date() -> String {
    "2023-07-24".to_string()
}

fn default_partition_key() -> String {
    domain::models::GLOBAL_PARTITION_KEY.to_string()
}

pub const PII_PROVIDER_BUILTIN: &str = "builtin";
pub const PII_PROVIDER_PRESIDIO: &str = "presidio";

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Maps the legacy unprefixed variables onto config keys.
fn legacy_overrides(lookup: impl Fn(&str) -> Option<String>) -> Vec<(&'static str, String)> {
    [
        (LEGACY_CONNECTION_STRING_VAR, "storage.connection_string"),
        (LEGACY_INDEX_DATE_VAR, "feedback.index_date"),
    ]
    .into_iter()
    .filter_map(|(var, key)| lookup(var).map(|value| (key, value)))
    .collect()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with ESAI__ prefix
    /// 4. TABLE_SERVICE_CONNECTION_STRING and AZURE_INDEX_DATE
    pub fn load() -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("ESAI").separator("__"));

        for (key, value) in legacy_overrides(|var| std::env::var(var).ok()) {
            builder = builder.set_override(key, value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Uses the bundled defaults only, so tests do not depend on the working
    /// directory or the process environment.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = include_str!("../../../config/default.toml");

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.server.host.parse::<std::net::IpAddr>().is_err() {
            return Err(ConfigValidationError::InvalidValue(format!(
                "Server host '{}' is not an IP address",
                self.server.host
            )));
        }

        match self.pii.provider.as_str() {
            PII_PROVIDER_BUILTIN => {}
            PII_PROVIDER_PRESIDIO => {
                if self.pii.analyzer_url.trim().is_empty() {
                    return Err(ConfigValidationError::MissingRequired(
                        "ESAI__PII__ANALYZER_URL must be set when the presidio provider is used"
                            .to_string(),
                    ));
                }
            }
            other => {
                return Err(ConfigValidationError::InvalidValue(format!(
                    "Unknown PII provider '{}'",
                    other
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.pii.min_score) {
            return Err(ConfigValidationError::InvalidValue(
                "pii.min_score must be between 0 and 1".to_string(),
            ));
        }

        shared::validation::validate_language_code(&self.pii.language)
            .map_err(|e| ConfigValidationError::InvalidValue(format!("pii.language: {}", e)))?;

        shared::validation::validate_table_name(&self.storage.table_name)
            .map_err(|e| ConfigValidationError::InvalidValue(format!("storage.table_name: {}", e)))?;

        shared::validation::validate_table_key(&self.feedback.partition_key).map_err(|e| {
            ConfigValidationError::InvalidValue(format!("feedback.partition_key: {}", e))
        })?;

        if self.storage.is_configured() {
            self.connection_string()?;
        }

        Ok(())
    }

    /// Parsed storage connection string, `None` when persistence is disabled.
    pub fn connection_string(&self) -> Result<Option<ConnectionString>, ConfigValidationError> {
        if !self.storage.is_configured() {
            return Ok(None);
        }

        self.storage
            .connection_string
            .parse()
            .map(Some)
            .map_err(|e| {
                ConfigValidationError::InvalidValue(format!(
                    "{} is malformed: {}",
                    LEGACY_CONNECTION_STRING_VAR, e
                ))
            })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigValidationError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|_| ConfigValidationError::InvalidValue("Invalid socket address".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_load_with_defaults() {
        let config = Config::load_for_test(&[]).expect("Failed to load config");

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.storage.table_name, "ESAIGPTFeedback");
        assert!(!config.storage.is_configured());
        assert_eq!(config.pii.provider, "builtin");
        assert_eq!(config.feedback.index_date, "2023-07-24");
        assert_eq!(config.feedback.partition_key, "Global");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_override() {
        let config = Config::load_for_test(&[
            ("server.port", "9000"),
            ("logging.level", "debug"),
            ("feedback.index_date", "2024-01-31"),
        ])
        .expect("Failed to load config");

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.feedback.index_date, "2024-01-31");
    }

    #[test]
    fn test_legacy_overrides() {
        let overrides = legacy_overrides(|var| match var {
            LEGACY_CONNECTION_STRING_VAR => Some("AccountName=a;AccountKey=c2VjcmV0".to_string()),
            _ => None,
        });
        assert_eq!(
            overrides,
            vec![(
                "storage.connection_string",
                "AccountName=a;AccountKey=c2VjcmV0".to_string()
            )]
        );

        let overrides = legacy_overrides(|var| match var {
            LEGACY_INDEX_DATE_VAR => Some("2024-02-01".to_string()),
            _ => None,
        });
        assert_eq!(
            overrides,
            vec![("feedback.index_date", "2024-02-01".to_string())]
        );

        assert!(legacy_overrides(|_| None).is_empty());
    }

    #[test]
    fn test_config_validation_presidio_requires_url() {
        let config = Config::load_for_test(&[("pii.provider", "presidio")]).unwrap();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("ANALYZER_URL"));

        let config = Config::load_for_test(&[
            ("pii.provider", "presidio"),
            ("pii.analyzer_url", "http://localhost:5002"),
        ])
        .unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_unknown_provider() {
        let config = Config::load_for_test(&[("pii.provider", "magic")]).unwrap();
        assert!(config.validate().unwrap_err().to_string().contains("magic"));
    }

    #[test]
    fn test_config_validation_malformed_connection_string() {
        let config =
            Config::load_for_test(&[("storage.connection_string", "AccountName=only")]).unwrap();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains(LEGACY_CONNECTION_STRING_VAR));
    }

    #[test]
    fn test_config_validation_bad_table_name() {
        let config = Config::load_for_test(&[("storage.table_name", "bad-name")]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_connection_string_parsed() {
        let config = Config::load_for_test(&[(
            "storage.connection_string",
            "UseDevelopmentStorage=true",
        )])
        .unwrap();
        assert!(config.validate().is_ok());
        let conn = config.connection_string().unwrap().unwrap();
        assert_eq!(conn.account_name, "devstoreaccount1");
    }

    #[test]
    fn test_socket_addr() {
        let config = Config::load_for_test(&[("server.host", "127.0.0.1"), ("server.port", "3000")])
            .expect("Failed to load config");

        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:3000");
    }
}
