//! GitHub Gist 客户端
//!
//! 检查点保存在一个 Gist 中的单个文件里

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde_json::{json, Value};

use crate::error::AppError;
use crate::services::checkpoint::BlobStore;

const API_BASE: &str = "https://api.github.com/gists";

pub struct GistBlobStore {
    client: reqwest::Client,
    gist_url: String,
    file_name: String,
}

impl GistBlobStore {
    pub fn new(token: &str, gist_id: &str, file_name: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("indiabix-quiz-scraper"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).context("无效的 GitHub token")?,
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("无法创建 GitHub HTTP 客户端")?;

        Ok(Self {
            client,
            gist_url: format!("{}/{}", API_BASE, gist_id),
            file_name: file_name.to_string(),
        })
    }
}

#[async_trait]
impl BlobStore for GistBlobStore {
    async fn read(&self) -> Result<Option<String>> {
        let response = self
            .client
            .get(&self.gist_url)
            .send()
            .await
            .map_err(|e| AppError::http(&self.gist_url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Checkpoint(format!("读取 Gist 失败: HTTP {}", status)).into());
        }

        let gist: Value = response
            .json()
            .await
            .map_err(|e| AppError::http(&self.gist_url, e))?;
        Ok(file_content(&gist, &self.file_name))
    }

    async fn write(&self, content: &str) -> Result<()> {
        let mut files = serde_json::Map::new();
        files.insert(self.file_name.clone(), json!({ "content": content }));
        let body = json!({ "files": files });

        let response = self
            .client
            .patch(&self.gist_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::http(&self.gist_url, e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Checkpoint(format!("更新 Gist 失败: HTTP {} {}", status, text)).into());
        }
        Ok(())
    }
}

/// Gist 中指定文件的内容，文件不存在时返回 `None`
fn file_content(gist: &Value, file_name: &str) -> Option<String> {
    gist.get("files")?
        .get(file_name)?
        .get("content")?
        .as_str()
        .map(str::to_string)
}
