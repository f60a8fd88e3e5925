use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub openai: OpenAiConfig,
    pub fx: FxConfig,
    pub research: ResearchConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_request_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub api_url: String,
    /// Used when a request does not carry its own key.
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    /// Domains the web search tool may visit.
    pub vendor_domains: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FxConfig {
    pub primary_url: String,
    pub fallback_url: String,
    pub cache_ttl_hours: i64,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Items researched concurrently per group.
    pub max_parallel: usize,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let config = Config::builder()
            // Compiled defaults so partial files still deserialize
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                File::with_name(&format!(
                    "config/{}",
                    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // Local overrides (gitignored)
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("WIRETRONIC")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("openai.vendor_domains")
                    .try_parsing(true),
            );

        let mut app_config: AppConfig = config.build()?.try_deserialize()?;
        app_config.apply_openai_env();
        Ok(app_config)
    }

    /// Honour the conventional `OPENAI_*` variables when no prefixed value
    /// was configured.
    fn apply_openai_env(&mut self) {
        let has_key = self
            .openai
            .api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty());
        if !has_key {
            self.openai.api_key = env::var("OPENAI_API_KEY").ok().filter(|key| !key.trim().is_empty());
        }
        if env::var("WIRETRONIC__OPENAI__MODEL").is_err() {
            if let Ok(model) = env::var("OPENAI_MODEL") {
                if !model.trim().is_empty() {
                    self.openai.model = model;
                }
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                max_request_size: 2 * 1024 * 1024, // 2MB
            },
            openai: OpenAiConfig {
                api_url: "https://api.openai.com/v1".to_string(),
                api_key: None,
                model: "gpt-5".to_string(),
                timeout_seconds: 8 * 60,
                max_retries: 1,
                retry_backoff_ms: 1000,
                vendor_domains: default_vendor_domains(),
            },
            fx: FxConfig {
                primary_url:
                    "https://api.exchangerate.host/latest?base=EUR&symbols=SEK,USD,GBP,EUR,NOK,DKK"
                        .to_string(),
                fallback_url: "https://open.er-api.com/v6/latest/EUR".to_string(),
                cache_ttl_hours: 12,
                timeout_seconds: 10,
            },
            research: ResearchConfig {
                max_parallel: 10,
                request_timeout_seconds: 300,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
                file_path: None,
            },
        }
    }
}

fn default_vendor_domains() -> Vec<String> {
    [
        "se.farnell.com",
        "se.rs-online.com",
        "www.digikey.se",
        "www.tti.com",
        "www.onlinecomponents.com",
        "www.mouser.se",
        "nexelec.com",
        "www.arrow.com",
        "www.auto-click.co.uk",
        "www.automotiveconnectors.com",
        "www.automotive-connectors.com",
    ]
    .iter()
    .map(|domain| domain.to_string())
    .collect()
}
