use dotenv::dotenv;
use std::env;
use tracing::{info, warn};

const INSECURE_DEFAULT_SECRET: &str = "club-inbox-insecure-default";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_host: String,
    pub server_port: u16,
    pub max_connections: u32,
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub csrf_token_ttl_secs: i64,
    pub app_env: String,
}

impl Config {
    /// Carica la configurazione dalle variabili d'ambiente
    /// Chiama dotenv() automaticamente
    pub fn from_env() -> Result<Self, String> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set in .env file".to_string())?;

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set, using default (not secure for production!)");
            INSECURE_DEFAULT_SECRET.to_string()
        });

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let server_port = parse_var("SERVER_PORT", "3000")
            .map_err(|_| "Invalid SERVER_PORT: must be a number between 0-65535".to_string())?;

        let max_connections = parse_var("MAX_DB_CONNECTIONS", "5")
            .map_err(|_| "Invalid MAX_DB_CONNECTIONS: must be a positive number".to_string())?;

        let default_page_size = parse_var("DEFAULT_PAGE_SIZE", "20")
            .map_err(|_| "Invalid DEFAULT_PAGE_SIZE: must be a positive number".to_string())?;

        let max_page_size = parse_var("MAX_PAGE_SIZE", "100")
            .map_err(|_| "Invalid MAX_PAGE_SIZE: must be a positive number".to_string())?;

        let csrf_token_ttl_secs = parse_var("CSRF_TOKEN_TTL_SECS", "3600")
            .map_err(|_| "Invalid CSRF_TOKEN_TTL_SECS: must be a number of seconds".to_string())?;

        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            database_url,
            jwt_secret,
            server_host,
            server_port,
            max_connections,
            default_page_size,
            max_page_size,
            csrf_token_ttl_secs,
            app_env,
        })
    }

    /// Logga la configurazione (nascondendo i segreti)
    pub fn print_info(&self) {
        info!("Environment: {}", self.app_env);
        info!("Server Address: {}:{}", self.server_host, self.server_port);
        info!("Database: {}", Self::mask_url(&self.database_url));
        info!("Max DB Connections: {}", self.max_connections);
        info!(
            "Page size: default {}, max {}",
            self.default_page_size, self.max_page_size
        );
        info!("CSRF token lifetime: {}s", self.csrf_token_ttl_secs);
        if self.jwt_secret == INSECURE_DEFAULT_SECRET {
            warn!("JWT Secret: USING DEFAULT (INSECURE!)");
        } else {
            info!("JWT Secret: custom secret configured");
        }
    }

    /// Maschera le credenziali nell'URL del database per il logging
    fn mask_url(url: &str) -> String {
        if let Some(at_pos) = url.find('@') {
            if let Some(scheme_end) = url.find("://") {
                let scheme = &url[..scheme_end + 3];
                let after_at = &url[at_pos..];
                return format!("{}***{}", scheme, after_at);
            }
        }
        // sqlite://file.db non contiene credenziali
        url.to_string()
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: &str) -> Result<T, T::Err> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_url_hides_credentials() {
        assert_eq!(
            Config::mask_url("mysql://user:secret@db:3306/club"),
            "mysql://***@db:3306/club"
        );
        assert_eq!(Config::mask_url("sqlite://club.db"), "sqlite://club.db");
    }
}
