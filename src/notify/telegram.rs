//! Telegram Bot API sink

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use crate::{
    errors::{BotError, BotResult},
    notify::NotificationSink,
};

const TELEGRAM_API: &str = "https://api.telegram.org";

pub struct TelegramNotifier {
    client: reqwest::Client,
    base_url: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str, chat_id: &str) -> BotResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| BotError::Network {
                message: "Failed to build HTTP client".to_string(),
                source: Some(e.into()),
                retry_count: 0,
            })?;

        Ok(Self {
            client,
            base_url: TELEGRAM_API.to_string(),
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.base_url, self.bot_token)
    }
}

#[async_trait]
impl NotificationSink for TelegramNotifier {
    async fn send(&self, message: &str) -> BotResult<()> {
        let response = self
            .client
            .post(self.endpoint())
            .json(&json!({
                "chat_id": self.chat_id,
                "text": message,
                "parse_mode": "HTML",
                "disable_web_page_preview": true,
            }))
            .send()
            .await
            .map_err(|e| BotError::Notification(format!("request failed: {}", e)))?;

        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .unwrap_or(serde_json::Value::Null);

        if !status.is_success() || body["ok"] != json!(true) {
            let description = body["description"].as_str().unwrap_or("no description");
            return Err(BotError::Notification(format!(
                "Telegram API error: {} - {}",
                status, description
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn posts_html_message_to_chat() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/botTEST_TOKEN/sendMessage")
            .match_body(Matcher::PartialJson(json!({
                "chat_id": "42",
                "text": "<b>hello</b>",
                "parse_mode": "HTML",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":true,"result":{}}"#)
            .create_async()
            .await;

        let notifier = TelegramNotifier::new("TEST_TOKEN", "42")
            .unwrap()
            .with_base_url(&server.url());
        tokio_test::assert_ok!(notifier.send("<b>hello</b>").await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn api_rejection_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/botTEST_TOKEN/sendMessage")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":false,"description":"Bad Request: chat not found"}"#)
            .create_async()
            .await;

        let notifier = TelegramNotifier::new("TEST_TOKEN", "42")
            .unwrap()
            .with_base_url(&server.url());
        let err = notifier.send("hi").await.unwrap_err();
        assert!(matches!(err, BotError::Notification(ref m) if m.contains("chat not found")));
    }
}
