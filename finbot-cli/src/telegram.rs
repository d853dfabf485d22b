//! Minimal Telegram Bot API client over reqwest.
//!
//! Only the calls the bot needs: getMe, getUpdates, sendMessage, sendPhoto,
//! setWebhook and deleteWebhook. Request URLs embed the bot token, so errors
//! are stripped of their URL before they reach the logs.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// One outgoing message.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text {
        text: String,
        /// Send with legacy `Markdown` parse mode.
        markdown: bool,
    },
    Photo {
        png: Vec<u8>,
        file_name: String,
        caption: String,
    },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text {
            text: text.into(),
            markdown: false,
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Reply::Text {
            text: text.into(),
            markdown: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("telegram request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("telegram API error {code}: {description}")]
    Api { code: i64, description: String },
}

/// Outbound side of the Bot API, as seen by the dispatcher and the webhook
/// server. Tests substitute a recording implementation.
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn send(&self, chat_id: i64, reply: &Reply) -> Result<(), TelegramError>;

    async fn set_webhook(&self, url: &str) -> Result<(), TelegramError>;
}

/// Inbound side used by the polling loop.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError>;
}

#[derive(Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
}

impl<T> ApiResponse<T> {
    fn into_result(self) -> Result<T, TelegramError> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(TelegramError::Api {
                code: self.error_code.unwrap_or_default(),
                description: self
                    .description
                    .unwrap_or_else(|| "response without result".to_string()),
            }),
        }
    }
}

fn http(e: reqwest::Error) -> TelegramError {
    TelegramError::Http(e.without_url())
}

pub struct TelegramClient {
    http: reqwest::Client,
    /// `<api base>/bot<token>`
    endpoint: String,
}

impl TelegramClient {
    pub fn new(api_base: &str, token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}/bot{}", api_base.trim_end_matches('/'), token),
        }
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.endpoint, method)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &Value,
        timeout: Option<Duration>,
    ) -> Result<T, TelegramError> {
        let mut req = self.http.post(self.url(method)).json(body);
        if let Some(t) = timeout {
            req = req.timeout(t);
        }
        let resp: ApiResponse<T> = req.send().await.map_err(http)?.json().await.map_err(http)?;
        resp.into_result()
    }

    /// Verifies the token.
    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.call("getMe", &json!({}), None).await
    }

    /// Long poll. The request timeout leaves headroom over the server-side wait.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let mut body = json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }
        self.call(
            "getUpdates",
            &body,
            Some(Duration::from_secs(timeout_secs + 10)),
        )
        .await
    }

    pub async fn delete_webhook(&self) -> Result<(), TelegramError> {
        let _: bool = self.call("deleteWebhook", &json!({}), None).await?;
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        png: &[u8],
        file_name: &str,
        caption: &str,
    ) -> Result<(), TelegramError> {
        let photo = Part::bytes(png.to_vec())
            .file_name(file_name.to_string())
            .mime_str("image/png")
            .map_err(http)?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part("photo", photo);

        let resp: ApiResponse<Value> = self
            .http
            .post(self.url("sendPhoto"))
            .multipart(form)
            .send()
            .await
            .map_err(http)?
            .json()
            .await
            .map_err(http)?;
        resp.into_result().map(|_| ())
    }
}

#[async_trait]
impl UpdateSource for TelegramClient {
    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        TelegramClient::get_updates(self, offset, timeout_secs).await
    }
}

#[async_trait]
impl ChatApi for TelegramClient {
    async fn send(&self, chat_id: i64, reply: &Reply) -> Result<(), TelegramError> {
        match reply {
            Reply::Text { text, markdown } => {
                let mut body = json!({ "chat_id": chat_id, "text": text });
                if *markdown {
                    body["parse_mode"] = json!("Markdown");
                }
                let _: Value = self.call("sendMessage", &body, None).await?;
                Ok(())
            }
            Reply::Photo {
                png,
                file_name,
                caption,
            } => self.send_photo(chat_id, png, file_name, caption).await,
        }
    }

    async fn set_webhook(&self, url: &str) -> Result<(), TelegramError> {
        let _: bool = self
            .call("setWebhook", &json!({ "url": url }), None)
            .await?;
        Ok(())
    }
}
