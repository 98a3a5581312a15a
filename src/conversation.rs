use tracing::debug;

use crate::client::{CompletionClient, ReqwestTransport, Transport};
use crate::config::RequestParams;
use crate::error::CompletionError;
use crate::model::Message;

/// Chat session over a completion client.
///
/// History only ever holds committed turns: a user/assistant pair is appended
/// after the call for it succeeds, never before.
pub struct Conversation<'a, T = ReqwestTransport> {
    client: &'a CompletionClient<T>,
    params: &'a RequestParams,
    history: Vec<Message>,
}

impl<'a, T> Conversation<'a, T>
where
    T: Transport,
{
    pub fn new(client: &'a CompletionClient<T>, params: &'a RequestParams) -> Self {
        Self {
            client,
            params,
            history: Vec::new(),
        }
    }

    pub fn params(&self) -> &RequestParams {
        self.params
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }

    pub async fn exchange(&mut self, prompt: &str) -> Result<String, CompletionError> {
        let answer = self
            .client
            .generate(prompt, &self.history, self.params)
            .await?;

        self.history.push(Message::user(prompt));
        self.history.push(Message::assistant(answer.clone()));
        debug!(
            history_len = self.history.len(),
            "committed conversation turn"
        );
        Ok(answer)
    }
}
