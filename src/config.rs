use std::env;
use std::fmt;

use crate::error::ConfigError;
use crate::proxy::ProxyAddress;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_TEMPERATURE: f32 = 0.23;
pub const DEFAULT_SYSTEM_MESSAGE: &str = "You are a helpful assistant.";
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const API_KEY_VAR: &str = "OPENAI_API_KEY";
const MODEL_VAR: &str = "OPENAI_MODEL";
const MAX_TOKENS_VAR: &str = "OPENAI_MAX_TOKENS";
const TEMPERATURE_VAR: &str = "OPENAI_TEMPERATURE";
const SYSTEM_MESSAGE_VAR: &str = "OPENAI_SYSTEM_MESSAGE";
const API_URL_VAR: &str = "OPENAI_API_URL";
const PROXY_VAR: &str = "OPENAI_PROXY";
const TIMEOUT_SECS_VAR: &str = "OPENAI_TIMEOUT_SECS";

#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub system_message: String,
}

impl Default for RequestParams {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            system_message: DEFAULT_SYSTEM_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub token: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub system_message: Option<String>,
    pub api_url: Option<String>,
    pub proxy: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credential: Credential,
    pub params: RequestParams,
    pub api_url: String,
    pub proxy: Option<ProxyAddress>,
    pub timeout_secs: u64,
}

impl Config {
    pub fn resolve(overrides: &Overrides) -> Result<Self, ConfigError> {
        Self::resolve_with(overrides, |key| env::var(key).ok())
    }

    /// Resolves every field as explicit value, then environment, then default.
    pub fn resolve_with(
        overrides: &Overrides,
        mut get_var: impl FnMut(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let credential = pick_string(overrides.token.as_deref(), get_var(API_KEY_VAR))
            .map(Credential::new)
            .ok_or(ConfigError::MissingCredential)?;

        let params = RequestParams {
            model: pick_string(overrides.model.as_deref(), get_var(MODEL_VAR))
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: overrides
                .max_tokens
                .unwrap_or_else(|| parse_max_tokens(get_var(MAX_TOKENS_VAR).as_deref())),
            temperature: match overrides.temperature {
                Some(value) if value.is_finite() && value >= 0.0 => value,
                Some(value) => return Err(ConfigError::InvalidTemperature(value)),
                None => parse_temperature(get_var(TEMPERATURE_VAR).as_deref()),
            },
            system_message: pick_string(
                overrides.system_message.as_deref(),
                get_var(SYSTEM_MESSAGE_VAR),
            )
            .unwrap_or_else(|| DEFAULT_SYSTEM_MESSAGE.to_string()),
        };

        let api_url = pick_string(overrides.api_url.as_deref(), get_var(API_URL_VAR))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let proxy = pick_string(overrides.proxy.as_deref(), get_var(PROXY_VAR))
            .map(|raw| ProxyAddress::parse(&raw))
            .transpose()?;
        let timeout_secs = parse_timeout_secs(get_var(TIMEOUT_SECS_VAR).as_deref());

        Ok(Self {
            credential,
            params,
            api_url,
            proxy,
            timeout_secs,
        })
    }
}

fn non_empty(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

// Explicit values are kept as typed; blank ones fall through.
fn pick_string(explicit: Option<&str>, from_env: Option<String>) -> Option<String> {
    explicit
        .filter(|value| non_empty(value).is_some())
        .map(str::to_string)
        .or_else(|| from_env.as_deref().and_then(non_empty).map(str::to_string))
}

fn parse_positive_u64(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

fn parse_timeout_secs(raw: Option<&str>) -> u64 {
    parse_positive_u64(raw, DEFAULT_TIMEOUT_SECS)
}

fn parse_max_tokens(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_MAX_TOKENS)
}

fn parse_temperature(raw: Option<&str>) -> f32 {
    raw.and_then(|value| value.trim().parse::<f32>().ok())
        .filter(|value| value.is_finite() && *value >= 0.0)
        .unwrap_or(DEFAULT_TEMPERATURE)
}
