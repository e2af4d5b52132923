//! Application configuration.

use serde::Deserialize;
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Default time-to-live of a group advertisement (6 hours).
pub const DEFAULT_GROUP_TTL_MINUTES: i64 = 360;

/// Default length of the post-closure rating window.
///
/// This is the one rating window used everywhere; nothing else hard-codes it.
pub const DEFAULT_RATING_WINDOW_MINUTES: i64 = 30;

/// Longest window any matchmaking setting may span (one year).
pub const MAX_WINDOW_MINUTES: i64 = 525_600;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Matchmaking rules configuration.
    #[serde(default)]
    pub matchmaking: MatchmakingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Matchmaking rules configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchmakingConfig {
    /// Minutes after creation at which an open group stops accepting players.
    #[serde(default = "default_group_ttl_minutes")]
    pub group_ttl_minutes: i64,
    /// Minutes after closure during which members may rate each other.
    #[serde(default = "default_rating_window_minutes")]
    pub rating_window_minutes: i64,
}

impl Default for MatchmakingConfig {
    fn default() -> Self {
        Self {
            group_ttl_minutes: DEFAULT_GROUP_TTL_MINUTES,
            rating_window_minutes: DEFAULT_RATING_WINDOW_MINUTES,
        }
    }
}

impl MatchmakingConfig {
    /// Rejects windows that are not positive or longer than [`MAX_WINDOW_MINUTES`].
    pub fn validate(&self) -> AppResult<()> {
        check_window("group_ttl_minutes", self.group_ttl_minutes)?;
        check_window("rating_window_minutes", self.rating_window_minutes)
    }
}

fn check_window(name: &str, minutes: i64) -> AppResult<()> {
    if (1..=MAX_WINDOW_MINUTES).contains(&minutes) {
        Ok(())
    } else {
        Err(AppError::Config(format!(
            "matchmaking.{name} must be between 1 and {MAX_WINDOW_MINUTES}, got {minutes}"
        )))
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_group_ttl_minutes() -> i64 {
    DEFAULT_GROUP_TTL_MINUTES
}

const fn default_rating_window_minutes() -> i64 {
    DEFAULT_RATING_WINDOW_MINUTES
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present, into the process environment)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `SIETCH_ENV`)
    /// 4. Environment variables with `SIETCH_` prefix
    ///
    /// Out-of-range matchmaking windows are rejected with [`AppError::Config`].
    pub fn load() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let env = std::env::var("SIETCH_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("SIETCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::checked(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("SIETCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::checked(config)
    }

    fn checked(source: config::Config) -> AppResult<Self> {
        let config: Self = source.try_deserialize()?;
        config.matchmaking.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_matchmaking_defaults() {
        let config = MatchmakingConfig::default();
        assert_eq!(config.group_ttl_minutes, 360);
        assert_eq!(config.rating_window_minutes, 30);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [server]
                port = 8080

                [database]
                url = "postgres://localhost/sietch"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.matchmaking.group_ttl_minutes, DEFAULT_GROUP_TTL_MINUTES);
        assert_eq!(
            config.matchmaking.rating_window_minutes,
            DEFAULT_RATING_WINDOW_MINUTES
        );
    }

    #[test]
    fn test_matchmaking_override() {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [server]

                [database]
                url = "postgres://localhost/sietch"

                [matchmaking]
                rating_window_minutes = 60
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.matchmaking.rating_window_minutes, 60);
        assert_eq!(config.matchmaking.group_ttl_minutes, 360);
    }

    #[test]
    fn test_validate_accepts_defaults_and_bounds() {
        assert!(MatchmakingConfig::default().validate().is_ok());
        let config = MatchmakingConfig {
            group_ttl_minutes: 1,
            rating_window_minutes: MAX_WINDOW_MINUTES,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_window() {
        let config = MatchmakingConfig {
            group_ttl_minutes: -5,
            ..MatchmakingConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("group_ttl_minutes"));
    }

    #[test]
    fn test_validate_rejects_zero_and_huge_windows() {
        let zero = MatchmakingConfig {
            rating_window_minutes: 0,
            ..MatchmakingConfig::default()
        };
        assert!(matches!(zero.validate(), Err(AppError::Config(_))));

        let huge = MatchmakingConfig {
            group_ttl_minutes: i64::MAX,
            ..MatchmakingConfig::default()
        };
        assert!(matches!(huge.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_checked_rejects_out_of_range_window() {
        let source = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [server]

                [database]
                url = "postgres://localhost/sietch"

                [matchmaking]
                group_ttl_minutes = -1
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();

        let err = Config::checked(source).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }
}
