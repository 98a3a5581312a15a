mod http_errors;
mod transport;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{Config, Credential, RequestParams};
use crate::error::{CompletionError, ConfigError, ServiceError};
use crate::model::Message;

pub use transport::{ReqwestTransport, Transport, TransportFuture, TransportResponse};

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<Choice>>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for a chat completion endpoint.
///
/// Holds the credential for its whole lifetime. Each `generate` call is an
/// independent exchange; the transport only exists for connection reuse.
pub struct CompletionClient<T = ReqwestTransport> {
    transport: T,
    credential: Credential,
    api_url: String,
}

impl CompletionClient<ReqwestTransport> {
    pub fn new(cfg: &Config) -> Result<Self, ConfigError> {
        let transport = ReqwestTransport::from_config(cfg)?;
        Ok(Self::with_transport(
            transport,
            cfg.credential.clone(),
            cfg.api_url.clone(),
        ))
    }
}

impl<T> CompletionClient<T> {
    pub fn with_transport(transport: T, credential: Credential, api_url: impl Into<String>) -> Self {
        Self {
            transport,
            credential,
            api_url: api_url.into(),
        }
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T> CompletionClient<T>
where
    T: Transport,
{
    /// Sends `prompt` after the system message and `history`, returning the
    /// trimmed text of the first choice. `history` is not modified.
    pub async fn generate(
        &self,
        prompt: &str,
        history: &[Message],
        params: &RequestParams,
    ) -> Result<String, CompletionError> {
        let request = build_request(prompt, history, params);
        debug!(
            api_url = %self.api_url,
            model = %params.model,
            message_count = request.messages.len(),
            max_tokens = params.max_tokens,
            temperature = params.temperature,
            "sending chat completion request"
        );

        let response = self
            .transport
            .post_json(&self.api_url, &self.credential, &request)
            .await?;

        if !response.status.is_success() {
            warn!(
                api_url = %self.api_url,
                model = %params.model,
                status = %response.status,
                response_body_len = response.body.len(),
                "completion API returned non-success status"
            );
            return Err(ServiceError::Status {
                status: response.status,
                body: response.body,
            }
            .into());
        }

        let content = extract_content(&response.body).inspect_err(|err| {
            warn!(model = %params.model, error = %err, "unexpected completion response shape");
        })?;
        debug!(
            model = %params.model,
            response_len = content.len(),
            "received chat completion"
        );
        Ok(content)
    }
}

fn build_request<'a>(
    prompt: &str,
    history: &[Message],
    params: &'a RequestParams,
) -> ChatRequest<'a> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(params.system_message.clone()));
    messages.extend_from_slice(history);
    messages.push(Message::user(prompt));

    ChatRequest {
        model: &params.model,
        messages,
        max_tokens: params.max_tokens,
        temperature: params.temperature,
    }
}

fn extract_content(body: &str) -> Result<String, CompletionError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|err| CompletionError::MalformedResponse(format!("invalid JSON body: {err}")))?;

    let choices = parsed
        .choices
        .ok_or_else(|| CompletionError::MalformedResponse("missing 'choices'".to_string()))?;
    let first = choices
        .into_iter()
        .next()
        .ok_or_else(|| CompletionError::MalformedResponse("empty 'choices'".to_string()))?;

    first
        .message
        .and_then(|message| message.content)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| {
            CompletionError::MalformedResponse("missing 'choices[0].message.content'".to_string())
        })
}
