use std::env;
use tracing::warn;

pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:5000";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub postgrest_url: String,
    pub postgrest_api_key: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub bind_address: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            postgrest_url: env::var("POSTGREST_URL")
                .unwrap_or_else(|_| {
                    warn!("POSTGREST_URL not set, using empty value");
                    String::new()
                }),
            postgrest_api_key: env::var("POSTGREST_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("POSTGREST_API_KEY not set, using empty value");
                    String::new()
                }),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("JWT_SECRET not set, using empty value");
                    String::new()
                }),
            token_ttl_hours: env::var("TOKEN_TTL_HOURS")
                .ok()
                .and_then(|raw| match raw.parse::<i64>() {
                    Ok(hours) if hours > 0 => Some(hours),
                    _ => {
                        warn!("TOKEN_TTL_HOURS={} is not a positive integer, using default", raw);
                        None
                    }
                })
                .unwrap_or(DEFAULT_TOKEN_TTL_HOURS),
            bind_address: env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string()),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.postgrest_url.is_empty() && !self.jwt_secret.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_without_database_or_secret() {
        let config = AppConfig {
            postgrest_url: String::new(),
            postgrest_api_key: String::new(),
            jwt_secret: "secret".to_string(),
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
        };
        assert!(!config.is_configured());

        let config = AppConfig {
            postgrest_url: "http://localhost:3001".to_string(),
            ..config
        };
        assert!(config.is_configured());
    }
}
