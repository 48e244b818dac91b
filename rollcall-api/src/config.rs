/// Configuration management for the API server
///
/// Configuration comes from environment variables, with a `.env` file loaded
/// first when present.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `APP_ENV`: `production` enables HSTS and `Secure` cookies
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `SESSION_SECRET`: Key for session tokens and URL signatures (required, >= 32 chars)
/// - `SESSION_TTL_HOURS`: Session lifetime (default: 24)
/// - `SIGNED_URL_TTL_MINUTES`: Lifetime of signed links (default: unset, links
///   live as long as the session)
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use rollcall_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use rollcall_shared::auth::session::DEFAULT_SESSION_TTL_HOURS;
use serde::{Deserialize, Serialize};
use std::env;

/// Minimum accepted length of `SESSION_SECRET`
pub const MIN_SECRET_LEN: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Production mode: HSTS header and `Secure` session cookie
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Session and link-signing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Key for session tokens, link signatures and form keys
    ///
    /// Generate with: `openssl rand -hex 32`
    #[serde(skip_serializing)]
    pub secret: String,

    pub ttl_hours: i64,

    /// `None` means signed links expire with the session
    pub signed_url_ttl_minutes: Option<i64>,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Fails when a required variable is missing, a number does not parse,
    /// or the session secret is too short.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;
        let production = env::var("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let secret = env::var("SESSION_SECRET")
            .map_err(|_| anyhow::anyhow!("SESSION_SECRET environment variable is required"))?;
        validate_secret(&secret)?;

        let ttl_hours = env::var("SESSION_TTL_HOURS")
            .map(|v| v.parse::<i64>())
            .unwrap_or(Ok(DEFAULT_SESSION_TTL_HOURS))?;

        let signed_url_ttl_minutes = env::var("SIGNED_URL_TTL_MINUTES")
            .ok()
            .map(|v| v.parse::<i64>())
            .transpose()?;

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            session: SessionConfig {
                secret,
                ttl_hours,
                signed_url_ttl_minutes,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn validate_secret(secret: &str) -> anyhow::Result<()> {
    if secret.len() < MIN_SECRET_LEN {
        anyhow::bail!("SESSION_SECRET must be at least {} characters long", MIN_SECRET_LEN);
    }
    Ok(())
}
