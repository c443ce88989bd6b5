use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Runtime
    pub environment: String,
    pub log_level: String,

    // Backend endpoints
    pub api_base_url: String,
    pub socket_url: String,
    pub http_timeout_secs: u64,

    // Persisted session
    pub session_file: String,

    // Notification sync
    pub notification_removal_delay_ms: u64,
    pub reconnect_delay_ms: u64,
    pub reconnect_max_delay_ms: u64,
    pub reconnect_attempts: u32,
    pub excluded_route_prefixes: String,

    // Watcher bootstrap
    pub login_email: Option<String>,
    pub login_password: Option<String>,
    pub current_route: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            log_level: env::var("LOG_LEVEL")
                .unwrap_or_else(|_| "fiction_reader=debug".to_string()),

            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5000/api".to_string()),
            socket_url: env::var("SOCKET_URL")
                .unwrap_or_else(|_| "ws://localhost:5000/ws".to_string()),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,

            session_file: env::var("SESSION_FILE")
                .unwrap_or_else(|_| ".fiction-reader/session.json".to_string()),

            notification_removal_delay_ms: env::var("NOTIFICATION_REMOVAL_DELAY_MS")
                .unwrap_or_else(|_| "2000".to_string())
                .parse()?,
            reconnect_delay_ms: env::var("RECONNECT_DELAY_MS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()?,
            reconnect_max_delay_ms: env::var("RECONNECT_MAX_DELAY_MS")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()?,
            reconnect_attempts: env::var("RECONNECT_ATTEMPTS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
            excluded_route_prefixes: env::var("EXCLUDED_ROUTE_PREFIXES")
                .unwrap_or_else(|_| "/manager,/login,/register".to_string()),

            login_email: env::var("LOGIN_EMAIL").ok(),
            login_password: env::var("LOGIN_PASSWORD").ok(),
            current_route: env::var("CURRENT_ROUTE").unwrap_or_else(|_| "/".to_string()),
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn notification_removal_delay(&self) -> Duration {
        Duration::from_millis(self.notification_removal_delay_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn reconnect_max_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_max_delay_ms)
    }

    /// 不启用通知组件的路由前缀
    pub fn excluded_routes(&self) -> Vec<String> {
        self.excluded_route_prefixes
            .split(',')
            .map(|prefix| prefix.trim().to_string())
            .filter(|prefix| !prefix.is_empty())
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_level: "fiction_reader=debug".to_string(),
            api_base_url: "http://localhost:5000/api".to_string(),
            socket_url: "ws://localhost:5000/ws".to_string(),
            http_timeout_secs: 30,
            session_file: ".fiction-reader/session.json".to_string(),
            notification_removal_delay_ms: 2000,
            reconnect_delay_ms: 1000,
            reconnect_max_delay_ms: 5000,
            reconnect_attempts: 5,
            excluded_route_prefixes: "/manager,/login,/register".to_string(),
            login_email: None,
            login_password: None,
            current_route: "/".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excluded_routes_are_trimmed() {
        let config = Config {
            excluded_route_prefixes: " /manager , ,/login".to_string(),
            ..Config::default()
        };
        assert_eq!(config.excluded_routes(), vec!["/manager", "/login"]);
    }

    #[test]
    fn test_default_removal_delay_is_two_seconds() {
        assert_eq!(Config::default().notification_removal_delay(), Duration::from_secs(2));
    }
}
