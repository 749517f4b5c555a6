use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::blocks::{Block, MessageTemplate};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NotifyError {
    #[error("slack transport failure: {0}")]
    Transport(String),
    #[error("slack api rejected message: {0}")]
    Api(String),
}

#[async_trait]
pub trait NotificationGateway: Send + Sync {
    async fn send_message(&self, channel: &str, message: &MessageTemplate)
        -> Result<(), NotifyError>;
}

#[derive(Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
    blocks: &'a [Block],
}

#[derive(Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Posts messages through the Web API `chat.postMessage` method.
pub struct SlackWebApiNotifier {
    client: reqwest::Client,
    endpoint: String,
    bot_token: SecretString,
}

impl SlackWebApiNotifier {
    pub fn new(client: reqwest::Client, api_base_url: &str, bot_token: SecretString) -> Self {
        let endpoint = format!("{}/chat.postMessage", api_base_url.trim_end_matches('/'));
        Self { client, endpoint, bot_token }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl NotificationGateway for SlackWebApiNotifier {
    async fn send_message(
        &self,
        channel: &str,
        message: &MessageTemplate,
    ) -> Result<(), NotifyError> {
        let request =
            PostMessageRequest { channel, text: &message.fallback_text, blocks: &message.blocks };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.bot_token.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|error| NotifyError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Transport(format!("http status {status}")));
        }

        let body: PostMessageResponse =
            response.json().await.map_err(|error| NotifyError::Transport(error.to_string()))?;
        parse_api_result(body)
    }
}

fn parse_api_result(body: PostMessageResponse) -> Result<(), NotifyError> {
    if body.ok {
        Ok(())
    } else {
        Err(NotifyError::Api(body.error.unwrap_or_else(|| "unknown_error".to_string())))
    }
}

/// Logs outbound messages instead of sending them.
#[derive(Clone, Debug, Default)]
pub struct NoopNotifier;

#[async_trait]
impl NotificationGateway for NoopNotifier {
    async fn send_message(
        &self,
        channel: &str,
        message: &MessageTemplate,
    ) -> Result<(), NotifyError> {
        info!(
            event_name = "slack.message.skipped",
            channel,
            blocks = message.blocks.len(),
            text = %message.fallback_text,
            "no bot token configured; message not sent"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::{parse_api_result, NotifyError, PostMessageResponse, SlackWebApiNotifier};

    #[test]
    fn endpoint_is_built_from_base_url() {
        let notifier = SlackWebApiNotifier::new(
            reqwest::Client::new(),
            "https://slack.example.test/api/",
            SecretString::from("xoxb-test".to_string()),
        );
        assert_eq!(notifier.endpoint(), "https://slack.example.test/api/chat.postMessage");
    }

    #[test]
    fn api_result_treats_ok_false_as_failure() {
        let rejected: PostMessageResponse =
            serde_json::from_str(r#"{"ok":false,"error":"channel_not_found"}"#).expect("json");
        assert_eq!(
            parse_api_result(rejected),
            Err(NotifyError::Api("channel_not_found".to_string()))
        );

        let accepted: PostMessageResponse =
            serde_json::from_str(r#"{"ok":true,"ts":"1700000000.000100"}"#).expect("json");
        assert_eq!(parse_api_result(accepted), Ok(()));
    }
}
