use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// None keeps requests unbounded; a hung request stays pending
    pub request_timeout_secs: Option<u64>,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Overrides the default `~/.config/budget/cli`
    pub storage_dir: Option<PathBuf>,
    pub watch_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl SessionConfig {
    pub fn watch_interval(&self) -> Duration {
        Duration::from_millis(self.watch_interval_ms)
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("BUDGET_API_URL") {
            self.api.base_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("BUDGET_API_TIMEOUT_SECS") {
            self.api.request_timeout_secs = v.parse().ok().filter(|secs| *secs > 0);
        }
        if let Ok(v) = env::var("BUDGET_CLI_CONFIG_DIR") {
            self.session.storage_dir = Some(PathBuf::from(v));
        }
        if let Ok(v) = env::var("BUDGET_SESSION_WATCH_MS") {
            self.session.watch_interval_ms = v.parse().unwrap_or(self.session.watch_interval_ms);
        }
        if let Ok(v) = env::var("BUDGET_LOG") {
            self.logging.filter = v;
        }

        self
    }

    fn user_agent() -> String {
        format!("budget-tracker/{}", env!("CARGO_PKG_VERSION"))
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:5000".to_string(),
                request_timeout_secs: None,
                user_agent: Self::user_agent(),
            },
            session: SessionConfig {
                storage_dir: None,
                watch_interval_ms: 500,
            },
            logging: LoggingConfig {
                filter: "budget_tracker=debug".to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: "https://staging.budget.example.com".to_string(),
                request_timeout_secs: None,
                user_agent: Self::user_agent(),
            },
            session: SessionConfig {
                storage_dir: None,
                watch_interval_ms: 1000,
            },
            logging: LoggingConfig {
                filter: "budget_tracker=info".to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "https://budget.example.com".to_string(),
                request_timeout_secs: None,
                user_agent: Self::user_agent(),
            },
            session: SessionConfig {
                storage_dir: None,
                watch_interval_ms: 2000,
            },
            logging: LoggingConfig {
                filter: "budget_tracker=warn".to_string(),
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<ClientConfig> = Lazy::new(ClientConfig::from_env);

pub fn config() -> &'static ClientConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}
