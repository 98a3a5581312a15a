use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "no API token configured; pass --token or set the OPENAI_API_KEY environment variable"
    )]
    MissingCredential,

    #[error("invalid temperature {0}; expected a finite, non-negative number")]
    InvalidTemperature(f32),

    #[error("invalid proxy '{0}'; expected 'host:port' or 'user:pass@host:port'")]
    InvalidProxy(String),

    #[error("failed to initialize HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(
        "completion request timed out after {timeout_secs}s while calling '{api_url}'; \
         increase OPENAI_TIMEOUT_SECS or retry later"
    )]
    Timeout { api_url: String, timeout_secs: u64 },

    #[error(
        "connection refused by completion API at '{api_url}'; \
         check OPENAI_API_URL and any configured proxy"
    )]
    ConnectionRefused { api_url: String },

    #[error(
        "failed to connect to completion API at '{api_url}'; \
         check OPENAI_API_URL and network connectivity"
    )]
    Connect { api_url: String },

    #[error("failed to call completion API at '{api_url}': {message}")]
    Request { api_url: String, message: String },

    #[error("completion request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("unexpected completion response format: {0}")]
    MalformedResponse(String),
}

#[cfg(test)]
impl CompletionError {
    pub(crate) fn is_service(&self) -> bool {
        matches!(self, Self::Service(_))
    }

    pub(crate) fn is_malformed_response(&self) -> bool {
        matches!(self, Self::MalformedResponse(_))
    }
}
