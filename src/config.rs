use anyhow::{anyhow, Context};
use bigdecimal::BigDecimal;
use tracing_subscriber::filter::LevelFilter;

use crate::utils::currency::parse_fee_rate;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    /// Session lifetime in minutes.
    pub jwt_maxage: i64,
    pub port: u16,
    pub platform_fee_rate: BigDecimal,
    pub payment_provider: String,
    pub cors_origins: Vec<String>,
    pub cookie_secure: bool,
    pub log_level: LevelFilter,
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn init() -> anyhow::Result<Config> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = std::env::var("JWT_SECRET_KEY").context("JWT_SECRET_KEY must be set")?;

        let jwt_maxage = var_or("JWT_MAXAGE", "10080")
            .parse::<i64>()
            .context("JWT_MAXAGE must be a number of minutes")?;

        let port = var_or("PORT", "8000")
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let database_max_connections = var_or("DATABASE_MAX_CONNECTIONS", "10")
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;

        let platform_fee_rate = parse_fee_rate(&var_or("PLATFORM_FEE_RATE", "0.15"))
            .map_err(|e| anyhow!(e))?;

        let payment_provider = var_or("PAYMENT_PROVIDER", "stripe");

        let cors_origins = var_or("CORS_ORIGINS", "http://localhost:5173,http://localhost:8000")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let cookie_secure = matches!(
            var_or("COOKIE_SECURE", "false").to_lowercase().as_str(),
            "1" | "true" | "yes"
        );

        let log_level = var_or("LOG_LEVEL", "debug")
            .parse::<LevelFilter>()
            .context("LOG_LEVEL must be one of off, error, warn, info, debug, trace")?;

        Ok(Config {
            database_url,
            database_max_connections,
            jwt_secret,
            jwt_maxage,
            port,
            platform_fee_rate,
            payment_provider,
            cors_origins,
            cookie_secure,
            log_level,
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Config {
        use std::str::FromStr;

        Config {
            database_url: "postgres://localhost/quicktask_test".to_string(),
            database_max_connections: 1,
            jwt_secret: "test-secret".to_string(),
            jwt_maxage: 60,
            port: 0,
            platform_fee_rate: BigDecimal::from_str("0.15").unwrap(),
            payment_provider: "stripe".to_string(),
            cors_origins: vec![],
            cookie_secure: false,
            log_level: LevelFilter::OFF,
        }
    }
}
