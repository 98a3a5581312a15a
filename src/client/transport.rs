use reqwest::{Client, StatusCode};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, warn};

use super::ChatRequest;
use super::http_errors::transport_error;
use crate::config::{Config, Credential};
use crate::error::{ConfigError, ServiceError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: String,
}

pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<TransportResponse, ServiceError>> + 'a>>;

/// Sends one authenticated JSON POST and hands back whatever the server said.
pub trait Transport {
    fn post_json<'a>(
        &'a self,
        api_url: &'a str,
        credential: &'a Credential,
        request: &'a ChatRequest<'a>,
    ) -> TransportFuture<'a>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout_secs: u64,
}

impl ReqwestTransport {
    pub fn from_config(cfg: &Config) -> Result<Self, ConfigError> {
        let mut builder = Client::builder().timeout(Duration::from_secs(cfg.timeout_secs));
        if let Some(proxy) = &cfg.proxy {
            builder = builder.proxy(proxy.to_reqwest().map_err(ConfigError::HttpClient)?);
        }
        let client = builder.build().map_err(ConfigError::HttpClient)?;

        Ok(Self {
            client,
            timeout_secs: cfg.timeout_secs,
        })
    }
}

impl Transport for ReqwestTransport {
    fn post_json<'a>(
        &'a self,
        api_url: &'a str,
        credential: &'a Credential,
        request: &'a ChatRequest<'a>,
    ) -> TransportFuture<'a> {
        Box::pin(async move {
            let response = self
                .client
                .post(api_url)
                .bearer_auth(credential.expose())
                .json(request)
                .send()
                .await
                .map_err(|err| {
                    warn!(api_url = %api_url, error = %err, "completion request failed");
                    transport_error(err, api_url, self.timeout_secs)
                })?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|err| transport_error(err, api_url, self.timeout_secs))?;
            debug!(
                api_url = %api_url,
                status = %status,
                response_body_len = body.len(),
                "received completion response"
            );
            Ok(TransportResponse { status, body })
        })
    }
}
