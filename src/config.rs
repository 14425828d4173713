//! Configuration lue depuis l'environnement (et le fichier .env via dotenv)

use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Log des requêtes SQL
    pub sql_echo: bool,
}

#[derive(Debug, Clone)]
pub struct MarketDataConfig {
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database: DatabaseConfig,
    pub market_data: MarketDataConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            host: var_or("HOST", "127.0.0.1".to_string()),
            port: var_or("PORT", 8080),
            log_level: var_or("LOG_LEVEL", "info".to_string()),
            database: DatabaseConfig {
                url: var_or("DATABASE_URL", "sqlite://stock.db?mode=rwc".to_string()),
                max_connections: var_or("DATABASE_MAX_CONNECTIONS", 10),
                sql_echo: var_or("SQL_ECHO", false),
            },
            market_data: MarketDataConfig {
                base_url: var_or("MARKET_DATA_URL", "https://query2.finance.yahoo.com".to_string()),
                timeout: Duration::from_secs(var_or("MARKET_DATA_TIMEOUT_SECS", 10)),
            },
        }
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

// Valeur absente ou illisible => défaut
fn var_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or(default),
        Err(_) => default,
    }
}
