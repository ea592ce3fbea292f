//! 通知服务 - 业务能力层
//!
//! 把"新测验上线"发送到所有已启用的渠道。
//! 发送失败只记录日志，不向调用方返回错误。

use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use tracing::{error, info, warn};

use crate::models::QuizPage;

/// 一条新测验通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizAnnouncement {
    pub title: String,
    pub body: String,
    pub launch_url: String,
    pub slug: String,
}

impl QuizAnnouncement {
    pub fn for_quiz(quiz: &QuizPage, source_name: &str, site_url: &str) -> Self {
        Self {
            title: format!("🎯 {} નવી ક્વિઝ ઉપલબ્ધ છે!", source_name),
            body: format!(
                "તારીખ {} {}ની ડેઈલી કરંટ અફેસ ક્વિઝ લાઈવ થઈ ગઈ છે. હમણાં જ રમો!",
                quiz.localized_date, source_name
            ),
            launch_url: format!("{}/quiz/{}", site_url.trim_end_matches('/'), quiz.slug),
            slug: quiz.slug.clone(),
        }
    }
}

/// 一个通知渠道
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn name(&self) -> &str;
    async fn send(&self, announcement: &QuizAnnouncement) -> Result<()>;
}

/// 通知分发器
#[derive(Default)]
pub struct NotificationDispatcher {
    channels: Vec<Box<dyn NotificationChannel>>,
}

impl NotificationDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(mut self, channel: Box<dyn NotificationChannel>) -> Self {
        self.channels.push(channel);
        self
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    /// 并发发送到所有渠道，返回成功的渠道数
    pub async fn dispatch(&self, announcement: &QuizAnnouncement) -> usize {
        if self.channels.is_empty() {
            warn!("没有启用任何通知渠道，跳过通知: {}", announcement.slug);
            return 0;
        }

        let results = join_all(self.channels.iter().map(|c| c.send(announcement))).await;

        let mut delivered = 0;
        for (channel, result) in self.channels.iter().zip(results) {
            match result {
                Ok(()) => {
                    info!("✅ [{}] 通知已发送: {}", channel.name(), announcement.slug);
                    delivered += 1;
                }
                Err(e) => error!("❌ [{}] 通知发送失败: {:#}", channel.name(), e),
            }
        }
        delivered
    }
}
