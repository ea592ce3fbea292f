//! 把列表页上当前所有的内容页标记为已处理
//!
//! 新部署时使用，避免第一次运行就回填全部历史测验

use std::sync::Arc;

use anyhow::Result;
use indiabix_quiz::clients::{HttpPageSource, PageSource};
use indiabix_quiz::orchestrator::gist_blob_store;
use indiabix_quiz::services::{CheckpointStore, UrlDiscovery};
use indiabix_quiz::{logger, Config, ProcessedUrlSet};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    logger::init();
    let config = Config::load()?;

    let source: Arc<dyn PageSource> = Arc::new(HttpPageSource::new(config.http_timeout())?);
    let discovery = UrlDiscovery::new(source, &config)?;

    info!("正在获取列表页: {}", config.listing_url);
    let mut urls: Vec<String> = discovery.list_all().await?.into_iter().collect();
    urls.sort();

    if urls.is_empty() {
        warn!("列表页上没有找到任何 URL，检查点保持不变");
        return Ok(());
    }

    let checkpoint = CheckpointStore::new(gist_blob_store(&config)?);
    let processed: ProcessedUrlSet = urls.into_iter().collect();
    checkpoint.save(&processed).await?;

    info!("✓ 已将 {} 个 URL 写入检查点", processed.len());
    Ok(())
}
