//! HTTP client for the wellness chat endpoint.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use super::sse::{SseDecoder, SseItem};
use super::{ChatMessage, Conversation};
use crate::error::ChatError;
use crate::storage::ChatConfig;

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

pub struct ChatClient {
    http: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl ChatClient {
    pub fn new(endpoint: &str, api_key: Option<String>) -> Result<Self, ChatError> {
        Ok(Self {
            http: Client::new(),
            endpoint: Url::parse(endpoint)?,
            api_key,
        })
    }

    pub fn from_config(config: &ChatConfig) -> Result<Self, ChatError> {
        Self::new(&config.endpoint, config.api_key.clone())
    }

    /// POST the history and stream the reply, calling `on_delta` for each
    /// text fragment as it arrives. Returns the full reply text.
    pub async fn stream_reply<F>(&self, messages: &[ChatMessage], mut on_delta: F) -> Result<String, ChatError>
    where
        F: FnMut(&str),
    {
        let mut request = self
            .http
            .post(self.endpoint.clone())
            .json(&json!({ "messages": messages }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let mut resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
            return Err(ChatError::Rejected(message));
        }

        let mut decoder = SseDecoder::new();
        let mut reply = String::new();
        let mut received = 0usize;
        let mut emit = |items: Vec<SseItem>, reply: &mut String| {
            for item in items {
                if let SseItem::Delta(text) = item {
                    on_delta(&text);
                    reply.push_str(&text);
                }
            }
        };

        while let Some(bytes) = resp.chunk().await? {
            received += bytes.len();
            emit(decoder.push(&bytes), &mut reply);
            if decoder.is_done() {
                break;
            }
        }
        emit(decoder.finish(), &mut reply);

        if received == 0 {
            return Err(ChatError::NoBody);
        }
        debug!(bytes = received, chars = reply.len(), "chat reply streamed");
        Ok(reply)
    }

    /// Send `input` as part of `conversation` and stream the answer into it.
    ///
    /// On failure the partial reply is removed and the error returned for
    /// the host to show.
    pub async fn reply<F>(
        &self,
        conversation: &mut Conversation,
        input: &str,
        mut on_delta: F,
    ) -> Result<String, ChatError>
    where
        F: FnMut(&str),
    {
        let outgoing = conversation.send(input)?;
        let result = self
            .stream_reply(&outgoing, |delta| {
                conversation.append(delta);
                on_delta(delta);
            })
            .await;
        match result {
            Ok(text) => {
                conversation.finish();
                Ok(text)
            }
            Err(e) => {
                warn!(error = %e, "chat reply failed");
                conversation.fail();
                Err(e)
            }
        }
    }
}
