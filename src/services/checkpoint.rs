//! 检查点服务 - 业务能力层
//!
//! 读写"已处理 URL 列表"。远端是一段 JSON 数组文本，整体覆盖写入，
//! 不做合并，只支持单实例运行。

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::AppError;
use crate::models::ProcessedUrlSet;

/// 远端文本块
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// 文本不存在时返回 `None`
    async fn read(&self) -> Result<Option<String>>;
    async fn write(&self, content: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct CheckpointStore {
    blob: Arc<dyn BlobStore>,
}

impl CheckpointStore {
    pub fn new(blob: Arc<dyn BlobStore>) -> Self {
        Self { blob }
    }

    /// 读取已处理列表，读取失败或内容损坏时返回空集合
    pub async fn load(&self) -> ProcessedUrlSet {
        let content = match self.blob.read().await {
            Ok(Some(content)) => content,
            Ok(None) => {
                info!("检查点不存在，视为首次运行");
                return ProcessedUrlSet::new();
            }
            Err(e) => {
                warn!("读取检查点失败: {:#}", e);
                return ProcessedUrlSet::new();
            }
        };

        match serde_json::from_str::<Vec<String>>(&content) {
            Ok(urls) => urls.into_iter().collect(),
            Err(e) => {
                warn!("检查点内容无法解析，视为空列表: {}", e);
                ProcessedUrlSet::new()
            }
        }
    }

    /// 整体覆盖写入
    pub async fn save(&self, processed: &ProcessedUrlSet) -> Result<()> {
        let content = serde_json::to_string_pretty(processed.as_slice()).map_err(AppError::from)?;
        self.blob
            .write(&content)
            .await
            .with_context(|| format!("写入检查点失败 ({} 条)", processed.len()))?;
        Ok(())
    }
}
