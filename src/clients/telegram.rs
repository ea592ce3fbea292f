//! Telegram 聊天渠道

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::services::notification::{NotificationChannel, QuizAnnouncement};

pub struct TelegramChannel {
    client: reqwest::Client,
    endpoint: String,
    chat_id: String,
}

impl TelegramChannel {
    pub fn new(bot_token: &str, chat_id: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("无法创建 Telegram HTTP 客户端")?;
        Ok(Self {
            client,
            endpoint: format!("https://api.telegram.org/bot{}/sendMessage", bot_token.trim()),
            chat_id: chat_id.trim().to_string(),
        })
    }
}

fn format_message(announcement: &QuizAnnouncement) -> String {
    format!(
        "{}\n\n{}\n\n👉 {}",
        announcement.title, announcement.body, announcement.launch_url
    )
}

#[async_trait]
impl NotificationChannel for TelegramChannel {
    fn name(&self) -> &str {
        "Telegram"
    }

    async fn send(&self, announcement: &QuizAnnouncement) -> Result<()> {
        let payload = json!({
            "chat_id": self.chat_id,
            "text": format_message(announcement),
            "disable_web_page_preview": false
        });

        // 不在错误信息里带上 endpoint，避免泄露 bot token
        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::notification(self.name(), e.without_url()))?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        let ok = body.get("ok").and_then(Value::as_bool).unwrap_or(false);

        if !status.is_success() || !ok {
            return Err(AppError::notification(self.name(), format!("HTTP {}: {}", status, body)).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        let text = format_message(&QuizAnnouncement {
            title: "🎯 New".to_string(),
            body: "Play now".to_string(),
            launch_url: "https://x/quiz/s".to_string(),
            slug: "s".to_string(),
        });
        assert_eq!(text, "🎯 New\n\nPlay now\n\n👉 https://x/quiz/s");
    }
}
