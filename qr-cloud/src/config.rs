//! Server configuration

use shared::order::{TransitionParseError, TransitionTable};
use thiserror::Error;

/// Invalid or missing environment configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} must be set in {environment} environment")]
    MissingSecret { name: String, environment: String },

    #[error("{name} must not be empty in {environment} environment")]
    EmptySecret { name: String, environment: String },

    #[error("ORDER_TRANSITIONS is invalid: {0}")]
    Transitions(#[from] TransitionParseError),
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// Hosted Postgres project URL, reported by /health only
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub supabase_service_key: Option<String>,
    /// JWT HS256 secret
    pub secret_key: String,
    /// Verbose logging and error details in 5xx envelopes
    pub debug: bool,
    /// Environment: development | staging | production
    pub environment: String,
    /// HTTP port
    pub http_port: u16,
    /// Access token lifetime
    pub access_token_expire_minutes: i64,
    /// CORS origins; `*` allows any
    pub allowed_origins: Vec<String>,
    /// `text` or `json`
    pub log_format: String,
    /// Allowed order status transitions
    pub transitions: TransitionTable,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, ConfigError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(ConfigError::MissingSecret {
                        name: name.to_string(),
                        environment: environment.to_string(),
                    });
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(ConfigError::EmptySecret {
                name: name.to_string(),
                environment: environment.to_string(),
            });
        }
        Ok(val)
    }

    fn optional(name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|s| !s.trim().is_empty())
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let transitions = match Self::optional("ORDER_TRANSITIONS") {
            Some(raw) => raw.parse()?,
            None => TransitionTable::standard(),
        };

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            supabase_url: Self::optional("SUPABASE_URL"),
            supabase_anon_key: Self::optional("SUPABASE_ANON_KEY"),
            supabase_service_key: Self::optional("SUPABASE_SERVICE_KEY"),
            secret_key: Self::require_secret("SECRET_KEY", &environment)?,
            debug: std::env::var("DEBUG")
                .map(|v| parse_bool(&v))
                .unwrap_or(false),
            environment,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            access_token_expire_minutes: std::env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
                .ok()
                .and_then(|m| m.parse().ok())
                .filter(|m: &i64| *m > 0)
                .unwrap_or(30),
            allowed_origins: parse_origins(
                &std::env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "*".into()),
            ),
            log_format: std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".into()),
            transitions,
        })
    }

    /// Whether any hosted-database credential was provided
    pub fn supabase_configured(&self) -> bool {
        self.supabase_url.is_some()
            && (self.supabase_anon_key.is_some() || self.supabase_service_key.is_some())
    }

    /// Default tracing filter when `RUST_LOG` is unset
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug {
            "qr_cloud=debug,tower_http=debug"
        } else {
            "qr_cloud=info,tower_http=info"
        }
    }
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect()
}

#[cfg(test)]
impl Config {
    /// Development config for router tests
    pub fn for_tests() -> Self {
        Self {
            database_url: "postgres://localhost/qr_test".into(),
            supabase_url: None,
            supabase_anon_key: None,
            supabase_service_key: None,
            secret_key: "test-secret".into(),
            debug: false,
            environment: "development".into(),
            http_port: 0,
            access_token_expire_minutes: 30,
            allowed_origins: vec!["*".into()],
            log_format: "text".into(),
            transitions: TransitionTable::standard(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool(" TRUE "));
        assert!(parse_bool("1"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool(""));
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("https://a.example, https://b.example,,"),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert_eq!(parse_origins("*"), vec!["*".to_string()]);
    }

    #[test]
    fn test_require_secret_dev_fallback() {
        let val = Config::require_secret("QR_CLOUD_TEST_UNSET_SECRET", "development").unwrap();
        assert_eq!(val, "dev-QR_CLOUD_TEST_UNSET_SECRET-not-for-production");
        assert!(matches!(
            Config::require_secret("QR_CLOUD_TEST_UNSET_SECRET", "production"),
            Err(ConfigError::MissingSecret { .. })
        ));
    }

    #[test]
    fn test_supabase_configured() {
        let mut config = Config::for_tests();
        assert!(!config.supabase_configured());
        config.supabase_url = Some("https://x.supabase.co".into());
        config.supabase_anon_key = Some("anon".into());
        assert!(config.supabase_configured());
    }
}
