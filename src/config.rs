use std::env;
use std::fmt;
use std::net::SocketAddr;

use anyhow::{anyhow, Result};

use crate::completion::GROQ_CHAT_COMPLETIONS_URL;
use crate::prompt::{DEFAULT_MODEL, DEFAULT_TEMPERATURE};

pub const DEFAULT_SERVICE_NAME: &str = "Groq summarizer";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub temperature: f64,
    pub service_name: String,
    pub max_request_bytes: Option<usize>,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: GROQ_CHAT_COMPLETIONS_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            max_request_bytes: None,
            port: DEFAULT_PORT,
        }
    }
}

// The API key never appears in logs.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redacted(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("service_name", &self.service_name)
            .field("max_request_bytes", &self.max_request_bytes)
            .field("port", &self.port)
            .finish()
    }
}

fn redacted(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = AppConfig::default();

        let api_key = non_empty_var("GROQ_API_KEY").unwrap_or_default();
        if api_key.is_empty() {
            tracing::warn!("GROQ_API_KEY not set; completion calls will be unauthorized");
        }
        let api_url = non_empty_var("GROQ_API_URL").unwrap_or(defaults.api_url);
        let model = non_empty_var("GROQ_MODEL").unwrap_or(defaults.model);
        let temperature = parse_optional_f64("GROQ_TEMPERATURE")?.unwrap_or(defaults.temperature);
        if !(0.0..=2.0).contains(&temperature) {
            return Err(anyhow!("GROQ_TEMPERATURE must be between 0.0 and 2.0"));
        }
        let service_name = non_empty_var("RECAP_SERVICE_NAME").unwrap_or(defaults.service_name);
        let max_request_bytes = parse_optional_u64("RECAP_MAX_REQUEST_BYTES")?.map(|v| v as usize);
        let port = match parse_optional_u64("PORT")? {
            Some(v) => u16::try_from(v).map_err(|_| anyhow!("PORT must be at most 65535"))?,
            None => defaults.port,
        };

        Ok(Self {
            api_key,
            api_url,
            model,
            temperature,
            service_name,
            max_request_bytes,
            port,
        })
    }

    /// Address the server listens on: every interface, configured port.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

fn non_empty_var(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_optional_u64(var: &str) -> Result<Option<u64>> {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| anyhow!("{} must be a positive integer", var)),
        Ok(_) => Ok(None),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn parse_optional_f64(var: &str) -> Result<Option<f64>> {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| anyhow!("{} must be a number", var)),
        Ok(_) => Ok(None),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err.into()),
    }
}
