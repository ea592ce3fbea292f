//! OneSignal 推送渠道

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::AppError;
use crate::services::notification::{NotificationChannel, QuizAnnouncement};

const ENDPOINT: &str = "https://onesignal.com/api/v1/notifications";

pub struct OneSignalChannel {
    client: reqwest::Client,
    app_id: String,
    api_key: String,
    icon_url: String,
}

impl OneSignalChannel {
    pub fn new(app_id: &str, api_key: &str, site_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("无法创建 OneSignal HTTP 客户端")?;
        Ok(Self {
            client,
            app_id: app_id.trim().to_string(),
            api_key: api_key.trim().to_string(),
            icon_url: format!("{}/newlogo.png", site_url.trim_end_matches('/')),
        })
    }

    /// 推送给所有曾经活跃过的用户
    fn payload(&self, announcement: &QuizAnnouncement) -> Value {
        json!({
            "app_id": self.app_id,
            "filters": [
                { "field": "last_session", "relation": ">", "value": "0" }
            ],
            "headings": { "en": announcement.title },
            "contents": { "en": announcement.body },
            "url": announcement.launch_url,
            "isAnyWeb": true,
            "chrome_web_icon": self.icon_url,
            "chrome_web_badge": self.icon_url,
            "android_visibility": 1,
            "priority": 10
        })
    }
}

#[async_trait]
impl NotificationChannel for OneSignalChannel {
    fn name(&self) -> &str {
        "OneSignal"
    }

    async fn send(&self, announcement: &QuizAnnouncement) -> Result<()> {
        let response = self
            .client
            .post(ENDPOINT)
            .header("Authorization", format!("Basic {}", self.api_key))
            .json(&self.payload(announcement))
            .send()
            .await
            .map_err(|e| AppError::notification(self.name(), e))?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            return Err(AppError::notification(self.name(), format!("HTTP {}: {}", status, body)).into());
        }

        let recipients = body.get("recipients").and_then(Value::as_u64).unwrap_or(0);
        if recipients == 0 {
            warn!("⚠️ OneSignal 已接受请求但没有命中任何用户: {}", body);
        } else {
            info!("OneSignal 推送人数: {}", recipients);
        }
        Ok(())
    }
}
