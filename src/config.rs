use std::env;

pub const DEFAULT_API_BASE: &str = "https://api.replicate.com/v1";
pub const DEFAULT_IMAGE_MODEL: &str = "google/nano-banana";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8787;

#[derive(Debug, Clone)]
pub struct ReplicateConfig {
    pub api_token: Option<String>,
    pub base_url: String,
    pub image_model: String,
    pub llm_model: Option<String>,
    pub timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub max_poll_attempts: u32,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: Option<u16>,
    pub max_body_bytes: usize,
    pub replicate: ReplicateConfig,
}

impl Default for ReplicateConfig {
    fn default() -> Self {
        ReplicateConfig {
            api_token: None,
            base_url: DEFAULT_API_BASE.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            llm_model: None,
            timeout_secs: 120,
            poll_interval_ms: 1000,
            max_poll_attempts: 120,
        }
    }
}

impl ReplicateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let api_token = non_empty_var("REPLICATE_API_TOKEN");
        let base_url = non_empty_var("REPLICATE_API_BASE").unwrap_or(defaults.base_url);
        let image_model =
            non_empty_var("REPLICATE_MODEL_VERSION").unwrap_or(defaults.image_model);
        let llm_model = non_empty_var("REPLICATE_LLM_MODEL");
        let timeout_secs = parsed_var("REPLICATE_TIMEOUT_SECS").unwrap_or(defaults.timeout_secs);
        let poll_interval_ms =
            parsed_var("REPLICATE_POLL_INTERVAL_MS").unwrap_or(defaults.poll_interval_ms);
        let max_poll_attempts =
            parsed_var("REPLICATE_MAX_POLLS").unwrap_or(defaults.max_poll_attempts);

        ReplicateConfig {
            api_token,
            base_url,
            image_model,
            llm_model,
            timeout_secs,
            poll_interval_ms,
            max_poll_attempts,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    pub fn with_llm_model(mut self, model: impl Into<String>) -> Self {
        self.llm_model = Some(model.into());
        self
    }

    pub fn with_polling(mut self, interval_ms: u64, max_attempts: u32) -> Self {
        self.poll_interval_ms = interval_ms;
        self.max_poll_attempts = max_attempts;
        self
    }

    pub fn has_token(&self) -> bool {
        self.api_token.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: DEFAULT_HOST.to_string(),
            port: None,
            max_body_bytes: 50 * 1024 * 1024,
            replicate: ReplicateConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let host = non_empty_var("API_HOST").unwrap_or(defaults.host);
        let port = parsed_var("API_PORT");
        let max_body_bytes = parsed_var::<usize>("API_MAX_BODY_MB")
            .map(|mb| mb * 1024 * 1024)
            .unwrap_or(defaults.max_body_bytes);

        Config {
            host,
            port,
            max_body_bytes,
            replicate: ReplicateConfig::from_env(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_replicate(mut self, config: ReplicateConfig) -> Self {
        self.replicate = config;
        self
    }

    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port_or_default())
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parsed_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    non_empty_var(key).and_then(|value| value.parse().ok())
}
