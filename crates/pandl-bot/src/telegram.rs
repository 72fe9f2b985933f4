//! Minimal Telegram Bot API transport.
//!
//! Only the surface the orchestrator needs: long-poll updates, messages with
//! inline choice buttons, edits and callback answers. Reconnect supervision
//! is left to whatever runs the binary.

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Long-poll wait passed to getUpdates.
pub const POLL_TIMEOUT_SECS: u64 = 50;

#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base: String,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramClient {
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base(&format!("https://api.telegram.org/bot{token}"))
    }

    /// Point the client at an arbitrary base URL (tests).
    pub fn with_base(base: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            // Must outlive the long-poll wait.
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 20))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: &impl Serialize) -> Result<T> {
        let url = format!("{}/{method}", self.base);
        let resp = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("{method} request failed"))?;
        let status = resp.status();
        let api: ApiResponse<T> = resp
            .json()
            .await
            .with_context(|| format!("{method} returned an unreadable body (HTTP {status})"))?;
        if !api.ok {
            bail!(
                "{method} rejected: {}",
                api.description.unwrap_or_else(|| format!("HTTP {status}"))
            );
        }
        api.result
            .ok_or_else(|| anyhow::anyhow!("{method} returned ok without a result"))
    }

    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        self.call(
            "getUpdates",
            &serde_json::json!({
                "offset": offset,
                "timeout": POLL_TIMEOUT_SECS,
                "allowed_updates": ["message", "callback_query"],
            }),
        )
        .await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<Message> {
        let mut body = serde_json::json!({ "chat_id": chat_id, "text": text });
        if let Some(markup) = markup {
            body["reply_markup"] = serde_json::to_value(markup)?;
        }
        self.call("sendMessage", &body).await
    }

    pub async fn edit_message_text(&self, chat_id: i64, message_id: i64, text: &str) -> Result<()> {
        // The result is a Message or `true` for inline edits; either way we
        // only care that the call was accepted.
        let _: serde_json::Value = self
            .call(
                "editMessageText",
                &serde_json::json!({
                    "chat_id": chat_id,
                    "message_id": message_id,
                    "text": text,
                }),
            )
            .await?;
        Ok(())
    }

    pub async fn answer_callback_query(&self, callback_id: &str, text: &str) -> Result<()> {
        let _: serde_json::Value = self
            .call(
                "answerCallbackQuery",
                &serde_json::json!({ "callback_query_id": callback_id, "text": text }),
            )
            .await?;
        Ok(())
    }

    pub async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<()> {
        let _: serde_json::Value = self
            .call(
                "deleteMessage",
                &serde_json::json!({ "chat_id": chat_id, "message_id": message_id }),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn get_updates_parses_messages_and_callbacks() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/getUpdates");
            then.status(200).json_body(serde_json::json!({
                "ok": true,
                "result": [
                    { "update_id": 10, "message": {
                        "message_id": 1, "chat": { "id": 42 }, "text": "hi" } },
                    { "update_id": 11, "callback_query": {
                        "id": "cb1", "data": "cancel",
                        "message": { "message_id": 2, "chat": { "id": 42 } } } }
                ]
            }));
        });
        let client = TelegramClient::with_base(&server.base_url()).unwrap();
        let updates = client.get_updates(0).await.unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].message.as_ref().unwrap().text.as_deref(), Some("hi"));
        let cq = updates[1].callback_query.as_ref().unwrap();
        assert_eq!(cq.data.as_deref(), Some("cancel"));
    }

    #[tokio::test]
    async fn api_level_rejection_is_an_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/sendMessage");
            then.status(200).json_body(serde_json::json!({
                "ok": false,
                "description": "Bad Request: chat not found"
            }));
        });
        let client = TelegramClient::with_base(&server.base_url()).unwrap();
        let err = client.send_message(1, "x", None).await.unwrap_err();
        assert!(err.to_string().contains("chat not found"));
    }

    #[tokio::test]
    async fn send_message_includes_keyboard() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/sendMessage")
                .json_body_partial(r#"{ "reply_markup": { "inline_keyboard": [[ { "callback_data": "cancel" } ]] } }"#);
            then.status(200).json_body(serde_json::json!({
                "ok": true,
                "result": { "message_id": 5, "chat": { "id": 1 } }
            }));
        });
        let client = TelegramClient::with_base(&server.base_url()).unwrap();
        let markup = InlineKeyboardMarkup {
            inline_keyboard: vec![vec![InlineKeyboardButton {
                text: "Cancel".into(),
                callback_data: "cancel".into(),
            }]],
        };
        let msg = client.send_message(1, "choose", Some(&markup)).await.unwrap();
        mock.assert();
        assert_eq!(msg.message_id, 5);
    }
}
