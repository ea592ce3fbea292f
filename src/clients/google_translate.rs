//! Google 翻译客户端
//!
//! 使用公开的 `translate_a/single` 接口（client=gtx），无需密钥

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use crate::error::AppError;
use crate::services::translation::TranslateBackend;

const ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

pub struct GoogleTranslator {
    client: reqwest::Client,
    source: String,
    target: String,
}

impl GoogleTranslator {
    /// 每个实例持有独立的连接池
    pub fn new(source: &str, target: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("无法创建翻译 HTTP 客户端")?;
        Ok(Self {
            client,
            source: source.to_string(),
            target: target.to_string(),
        })
    }
}

#[async_trait]
impl TranslateBackend for GoogleTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        let response = self
            .client
            .get(ENDPOINT)
            .query(&[
                ("client", "gtx"),
                ("sl", self.source.as_str()),
                ("tl", self.target.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| AppError::http(ENDPOINT, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::BadStatus {
                url: ENDPOINT.to_string(),
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| AppError::http(ENDPOINT, e))?;
        Ok(join_segments(&payload))
    }
}

/// 响应格式：`[[["译文", "原文", ...], ...], ...]`，按句拼接译文
fn join_segments(payload: &Value) -> String {
    payload
        .get(0)
        .and_then(Value::as_array)
        .map(|segments| {
            segments
                .iter()
                .filter_map(|s| s.get(0).and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default()
}
