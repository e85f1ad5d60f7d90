use anyhow::{Context, Result};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub email: EmailConfig,
    pub database_url: String,
    /// Base URL of the customer-facing frontend, used in email links.
    pub frontend_url: String,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_expiry_hours: i64,
    pub otp_ttl_minutes: i64,
    pub reset_ttl_minutes: i64,
    pub invite_ttl_days: i64,
}

#[derive(Clone, Debug)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL is not defined")?;
        let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET is not defined")?;

        Ok(Self {
            server: ServerConfig {
                host: env_or("SERVER_HOST", "0.0.0.0"),
                port: env_parsed("SERVER_PORT", 8080)?,
            },
            auth: AuthConfig {
                jwt_secret,
                token_expiry_hours: env_parsed("JWT_EXPIRY_HOURS", 24)?,
                otp_ttl_minutes: 10,
                reset_ttl_minutes: 10,
                invite_ttl_days: 7,
            },
            email: EmailConfig {
                smtp_host: env_or("SMTP_HOST", "localhost"),
                smtp_port: env_parsed("SMTP_PORT", 587)?,
                username: std::env::var("SMTP_USER").ok(),
                password: std::env::var("SMTP_PASS").ok(),
                from: env_or("SMTP_FROM", "noreply@supportsphere.io"),
            },
            database_url,
            frontend_url: env_or("FRONTEND_URL", "http://localhost:5173"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}")),
        Err(_) => Ok(default),
    }
}
