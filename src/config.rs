//! Configuration management for the RecoServe engine
//!
//! Provides strongly-typed configuration with validation, environment variable parsing,
//! and sensible defaults. Supports both development and production environments.
//!
//! # Example
//! ```no_run
//! use recoserve::Config;
//! let config = Config::from_env().expect("failed to load config");
//! println!("Listening on {}:{}", config.api.host, config.api.port);
//! ```

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,
    /// Bearer authentication configuration
    pub auth: AuthConfig,
    /// Recommendation serving configuration
    pub recommendation: RecommendationConfig,
    /// Artifact locations
    pub artifacts: ArtifactConfig,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Port to listen on
    pub port: u16,
    /// Host to bind to
    pub host: String,
    /// Request timeout
    pub request_timeout: Duration,
    /// Enable CORS
    pub cors_enabled: bool,
    /// Allowed origins for CORS
    pub cors_origins: Vec<String>,
}

/// Bearer authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// The service access token requests must present
    pub token: String,
}

/// Recommendation serving configuration
#[derive(Debug, Clone)]
pub struct RecommendationConfig {
    /// Number of items returned per recommendation request
    pub k_recs: usize,
    /// Largest user id the service will accept
    pub max_user_id: u64,
}

/// Artifact locations
#[derive(Debug, Clone)]
pub struct ArtifactConfig {
    /// Directory holding the item catalog, popularity list, and model tables
    pub dir: PathBuf,
}

/// Default ceiling on user ids; ids above this are treated as unknown users
pub const DEFAULT_MAX_USER_ID: u64 = 1_000_000_000;

/// Default number of recommendations per request
pub const DEFAULT_K_RECS: usize = 10;

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Try to load .env file (ignore if not found)
        dotenvy::dotenv().ok();

        let config = Self {
            api: ApiConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            recommendation: RecommendationConfig::from_env()?,
            artifacts: ArtifactConfig::from_env()?,
        };

        config.validate()?;
        config.log_summary();

        Ok(config)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.auth.token.is_empty() {
            return Err(Error::InvalidConfig {
                key: "API_TOKEN",
                message: "Service token cannot be empty".into(),
            });
        }

        if self.recommendation.k_recs == 0 {
            return Err(Error::InvalidConfig {
                key: "REC_K_RECS",
                message: "k_recs must be at least 1".into(),
            });
        }

        Ok(())
    }

    /// Log configuration summary (without sensitive data)
    fn log_summary(&self) {
        info!("Configuration loaded:");
        info!("  API:");
        info!("    Listening on: {}:{}", self.api.host, self.api.port);
        info!("    Request timeout: {:?}", self.api.request_timeout);
        info!("  Auth:");
        info!("    Token: {}", mask_secret(&self.auth.token));
        info!("  Recommendation:");
        info!("    k_recs: {}", self.recommendation.k_recs);
        info!("    Max user id: {}", self.recommendation.max_user_id);
        info!("  Artifacts:");
        info!("    Directory: {}", self.artifacts.dir.display());
    }
}

impl ApiConfig {
    fn from_env() -> Result<Self> {
        Ok(Self {
            port: get_env_or("API_PORT", "8080").parse().unwrap_or(8080),
            host: get_env_or("API_HOST", "0.0.0.0"),
            request_timeout: Duration::from_secs(
                get_env_or("API_REQUEST_TIMEOUT_SECS", "30")
                    .parse()
                    .unwrap_or(30),
            ),
            cors_enabled: get_env_or("API_CORS_ENABLED", "true")
                .parse()
                .unwrap_or(true),
            cors_origins: get_env_or("API_CORS_ORIGINS", "*")
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
        })
    }
}

impl AuthConfig {
    fn from_env() -> Result<Self> {
        Ok(Self {
            token: get_env("API_TOKEN")?,
        })
    }
}

impl RecommendationConfig {
    fn from_env() -> Result<Self> {
        Ok(Self {
            k_recs: get_env_or("REC_K_RECS", &DEFAULT_K_RECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_K_RECS),
            max_user_id: get_env_or("REC_MAX_USER_ID", &DEFAULT_MAX_USER_ID.to_string())
                .parse()
                .unwrap_or(DEFAULT_MAX_USER_ID),
        })
    }
}

impl ArtifactConfig {
    fn from_env() -> Result<Self> {
        Ok(Self {
            dir: PathBuf::from(get_env_or("ARTIFACTS_DIR", "data")),
        })
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Get required environment variable
fn get_env(key: &'static str) -> Result<String> {
    std::env::var(key).map_err(|_| Error::MissingEnvVar { var: key })
}

/// Get environment variable with default
fn get_env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Mask a secret for log output
fn mask_secret(secret: &str) -> String {
    if secret.len() <= 4 {
        "****".to_string()
    } else {
        format!("{}****", &secret[..2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("abc"), "****");
        assert_eq!(mask_secret("supersecret"), "su****");
    }

    #[test]
    fn test_validate_rejects_empty_token() {
        let config = Config {
            api: ApiConfig {
                port: 8080,
                host: "0.0.0.0".to_string(),
                request_timeout: Duration::from_secs(30),
                cors_enabled: true,
                cors_origins: vec!["*".to_string()],
            },
            auth: AuthConfig {
                token: String::new(),
            },
            recommendation: RecommendationConfig {
                k_recs: 10,
                max_user_id: DEFAULT_MAX_USER_ID,
            },
            artifacts: ArtifactConfig {
                dir: PathBuf::from("data"),
            },
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_k_recs() {
        let config = Config {
            api: ApiConfig {
                port: 8080,
                host: "0.0.0.0".to_string(),
                request_timeout: Duration::from_secs(30),
                cors_enabled: true,
                cors_origins: vec!["*".to_string()],
            },
            auth: AuthConfig {
                token: "token".to_string(),
            },
            recommendation: RecommendationConfig {
                k_recs: 0,
                max_user_id: DEFAULT_MAX_USER_ID,
            },
            artifacts: ArtifactConfig {
                dir: PathBuf::from("data"),
            },
        };
        assert!(config.validate().is_err());
    }
}
