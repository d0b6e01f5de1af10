/*
 * Responsibility
 * - 環境変数の読み込み (PORT, APP_ENV, VALKEY_URL, USER_DATA_TABLE)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - 起動時に一度だけ読み込み、以降は不変
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Settings shared by the authorizer service and the `user-admin` tool.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub valkey_url: String,
    // Collection holding the user records; used as the key prefix.
    pub user_table: String,
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let valkey_url =
            std::env::var("VALKEY_URL").map_err(|_| ConfigError::Missing("VALKEY_URL"))?;
        if valkey_url.trim().is_empty() {
            return Err(ConfigError::Invalid("VALKEY_URL"));
        }

        let user_table = std::env::var("USER_DATA_TABLE")
            .map_err(|_| ConfigError::Missing("USER_DATA_TABLE"))?;
        let user_table = user_table.trim().to_string();
        if user_table.is_empty() || user_table.contains(':') {
            return Err(ConfigError::Invalid("USER_DATA_TABLE"));
        }

        Ok(Self {
            valkey_url,
            user_table,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub store: StoreConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();
        let store = StoreConfig::from_env()?;

        Ok(Self {
            addr,
            app_env,
            store,
        })
    }
}
