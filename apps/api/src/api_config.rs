use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use fieldward_core::AppError;
use tracing_subscriber::EnvFilter;

const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const DEFAULT_API_HOST: &str = "127.0.0.1";
const DEFAULT_API_PORT: u16 = 3001;
const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub store_timeout: Duration,
    pub database_max_connections: u32,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(env::args().nth(1).as_deref(), |name| env::var(name).ok())
    }

    /// Builds the configuration from the first CLI argument and a variable lookup.
    pub fn from_lookup(
        first_argument: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let migrate_only = first_argument == Some("migrate");

        let database_url = lookup("DATABASE_URL")
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| AppError::Validation("DATABASE_URL is required".to_owned()))?;
        let frontend_url =
            lookup("FRONTEND_URL").unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_owned());
        let api_host = lookup("API_HOST").unwrap_or_else(|| DEFAULT_API_HOST.to_owned());
        let api_port = lookup("API_PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_API_PORT);
        let cookie_secure = lookup("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|| "false".to_owned())
            .eq_ignore_ascii_case("true");

        let store_timeout_ms = match lookup("STORE_TIMEOUT_MS") {
            Some(value) => value.parse::<u64>().map_err(|error| {
                AppError::Validation(format!("invalid STORE_TIMEOUT_MS '{value}': {error}"))
            })?,
            None => DEFAULT_STORE_TIMEOUT_MS,
        };
        if store_timeout_ms == 0 {
            return Err(AppError::Validation(
                "STORE_TIMEOUT_MS must be greater than zero".to_owned(),
            ));
        }

        let database_max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(value) => value.parse::<u32>().map_err(|error| {
                AppError::Validation(format!(
                    "invalid DATABASE_MAX_CONNECTIONS '{value}': {error}"
                ))
            })?,
            None => DEFAULT_DATABASE_MAX_CONNECTIONS,
        };

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            api_host,
            api_port,
            cookie_secure,
            store_timeout: Duration::from_millis(store_timeout_ms),
            database_max_connections,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use fieldward_core::AppError;

    use super::ApiConfig;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config = ApiConfig::from_lookup(None, lookup(&[("DATABASE_URL", "postgres://db")]));

        let Ok(config) = config else {
            panic!("expected configuration to load");
        };
        assert!(!config.migrate_only);
        assert_eq!(config.frontend_url, "http://localhost:3000");
        assert_eq!(config.api_port, 3001);
        assert_eq!(config.store_timeout, Duration::from_secs(5));
        assert_eq!(config.database_max_connections, 10);
        assert!(matches!(config.socket_address(), Ok(address) if address.port() == 3001));
    }

    #[test]
    fn missing_database_url_is_rejected() {
        let config = ApiConfig::from_lookup(None, lookup(&[]));
        assert!(matches!(config, Err(AppError::Validation(_))));
    }

    #[test]
    fn zero_store_timeout_is_rejected() {
        let config = ApiConfig::from_lookup(
            None,
            lookup(&[("DATABASE_URL", "postgres://db"), ("STORE_TIMEOUT_MS", "0")]),
        );
        assert!(matches!(config, Err(AppError::Validation(message)) if message.contains("STORE_TIMEOUT_MS")));
    }

    #[test]
    fn migrate_argument_and_overrides_are_read() {
        let config = ApiConfig::from_lookup(
            Some("migrate"),
            lookup(&[
                ("DATABASE_URL", "postgres://db"),
                ("API_HOST", "0.0.0.0"),
                ("API_PORT", "8080"),
                ("SESSION_COOKIE_SECURE", "TRUE"),
                ("STORE_TIMEOUT_MS", "250"),
            ]),
        );

        let Ok(config) = config else {
            panic!("expected configuration to load");
        };
        assert!(config.migrate_only);
        assert!(config.cookie_secure);
        assert_eq!(config.store_timeout, Duration::from_millis(250));
        assert!(matches!(config.socket_address(), Ok(address) if address.port() == 8080));
    }
}
