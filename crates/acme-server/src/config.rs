//! Configuration management
//!
//! Values come from the process environment (after loading `.env` through
//! `dotenvy`), falling back to the defaults below. `JWT_SECRET` has no
//! default and must be provided.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/acme";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default minimum database connections in the pool.
pub const DEFAULT_DATABASE_MIN_CONNECTIONS: u32 = 2;

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default database idle timeout in seconds (10 minutes).
pub const DEFAULT_DATABASE_IDLE_TIMEOUT_SECS: u64 = 600;

/// Any origin may call the API unless restricted.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "*";

/// Default access token lifetime in seconds (1 hour).
pub const DEFAULT_JWT_EXPIRATION_SECS: i64 = 3600;
pub const MAX_JWT_EXPIRATION_SECS: i64 = 365 * 24 * 3600;

/// Shortest accepted signing secret, in bytes.
pub const MIN_JWT_SECRET_BYTES: usize = 32;

pub const DEFAULT_SEED_ADMIN_EMAIL: &str = "admin@acme.com";
pub const DEFAULT_SEED_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_SEED_ADMIN_PASSWORD: &str = "pa$$w0rd";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub token: TokenConfig,
    pub seed: SeedConfig,
}

/// Hosting environment; API documentation is only served outside production
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(anyhow::anyhow!("Unknown environment: {}", other)),
        }
    }
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
    pub environment: Environment,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    /// Migrate to latest and seed on startup
    pub auto_migrate: bool,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

/// Access token settings
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiration_secs: i64,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("jwt_secret", &"***")
            .field("jwt_expiration_secs", &self.jwt_expiration_secs)
            .finish()
    }
}

/// Administrator account created when seeding
#[derive(Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    pub admin_email: String,
    pub admin_username: String,
    #[serde(skip_serializing)]
    pub admin_password: String,
}

impl std::fmt::Debug for SeedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedConfig")
            .field("admin_email", &self.admin_email)
            .field("admin_username", &self.admin_username)
            .finish_non_exhaustive()
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            admin_email: DEFAULT_SEED_ADMIN_EMAIL.to_string(),
            admin_username: DEFAULT_SEED_ADMIN_USERNAME.to_string(),
            admin_password: DEFAULT_SEED_ADMIN_PASSWORD.to_string(),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_string(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Load configuration from `.env`, the environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = Self::from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the environment without loading `.env` or validating
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = match std::env::var("ACME_ENVIRONMENT") {
            Ok(value) => value.parse()?,
            Err(_) => Environment::default(),
        };

        Ok(Config {
            server: ServerConfig {
                host: env_string("ACME_HOST", DEFAULT_SERVER_HOST),
                port: env_or("ACME_PORT", DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: env_or(
                    "ACME_SHUTDOWN_TIMEOUT",
                    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
                ),
                environment,
            },
            database: DatabaseConfig {
                url: env_string("DATABASE_URL", DEFAULT_DATABASE_URL),
                max_connections: env_or(
                    "DATABASE_MAX_CONNECTIONS",
                    DEFAULT_DATABASE_MAX_CONNECTIONS,
                ),
                min_connections: env_or(
                    "DATABASE_MIN_CONNECTIONS",
                    DEFAULT_DATABASE_MIN_CONNECTIONS,
                ),
                connect_timeout_secs: env_or(
                    "DATABASE_CONNECT_TIMEOUT",
                    DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                ),
                idle_timeout_secs: env_or(
                    "DATABASE_IDLE_TIMEOUT",
                    DEFAULT_DATABASE_IDLE_TIMEOUT_SECS,
                ),
                auto_migrate: env_or("DATABASE_AUTO_MIGRATE", true),
            },
            cors: CorsConfig {
                allowed_origins: env_string("CORS_ALLOWED_ORIGINS", DEFAULT_CORS_ALLOWED_ORIGIN)
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                allow_credentials: env_or("CORS_ALLOW_CREDENTIALS", false),
            },
            token: TokenConfig {
                jwt_secret: std::env::var("JWT_SECRET").unwrap_or_default(),
                jwt_expiration_secs: env_or("JWT_EXPIRATION_SECONDS", DEFAULT_JWT_EXPIRATION_SECS),
            },
            seed: SeedConfig {
                admin_email: env_string("SEED_ADMIN_EMAIL", DEFAULT_SEED_ADMIN_EMAIL),
                admin_username: env_string("SEED_ADMIN_USERNAME", DEFAULT_SEED_ADMIN_USERNAME),
                admin_password: env_string("SEED_ADMIN_PASSWORD", DEFAULT_SEED_ADMIN_PASSWORD),
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }

        if self.database.min_connections > self.database.max_connections {
            anyhow::bail!(
                "Database min_connections ({}) cannot be greater than max_connections ({})",
                self.database.min_connections,
                self.database.max_connections
            );
        }

        if self.token.jwt_secret.trim().is_empty() {
            anyhow::bail!("JWT secret is not configured; set JWT_SECRET");
        }

        if self.token.jwt_secret.len() < MIN_JWT_SECRET_BYTES {
            anyhow::bail!("JWT secret must be at least {} bytes long", MIN_JWT_SECRET_BYTES);
        }

        if self.token.jwt_expiration_secs <= 0 {
            anyhow::bail!("JWT expiration must be a positive number of seconds");
        }

        if self.token.jwt_expiration_secs > MAX_JWT_EXPIRATION_SECS {
            anyhow::bail!(
                "JWT expiration cannot exceed {} seconds (one year)",
                MAX_JWT_EXPIRATION_SECS
            );
        }

        if self.cors.allow_credentials && self.cors.allowed_origins.iter().any(|o| o == "*") {
            anyhow::bail!("CORS credentials cannot be combined with a wildcard origin");
        }

        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured - all origins will be allowed");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
                environment: Environment::Development,
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
                min_connections: DEFAULT_DATABASE_MIN_CONNECTIONS,
                connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                idle_timeout_secs: DEFAULT_DATABASE_IDLE_TIMEOUT_SECS,
                auto_migrate: true,
            },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: false,
            },
            token: TokenConfig {
                jwt_secret: String::new(),
                jwt_expiration_secs: DEFAULT_JWT_EXPIRATION_SECS,
            },
            seed: SeedConfig::default(),
        }
    }
}
