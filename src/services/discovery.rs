//! URL 发现 - 业务能力层
//!
//! 从列表页中找出尚未处理的内容页 URL

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::clients::http::PageSource;
use crate::config::Config;
use crate::models::ProcessedUrlSet;

fn content_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"/current-affairs/\d{4}-\d{2}-\d{2}$").expect("valid content url regex")
    })
}

fn link_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("div.card-style a.text-link").expect("valid css selector"))
}

/// 把链接规范化为绝对地址并去掉结尾的 `/`
pub fn normalize_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let absolute = base.join(href).ok()?;
    Some(absolute.as_str().trim_end_matches('/').to_string())
}

/// 列表页中所有符合 `.../YYYY-MM-DD` 的内容页 URL，去重后排除已处理的
pub fn extract_quiz_urls(html: &str, base: &Url, processed: &ProcessedUrlSet) -> HashSet<String> {
    let document = Html::parse_document(html);

    document
        .select(link_selector())
        .filter_map(|link| link.value().attr("href"))
        .filter_map(|href| normalize_link(base, href))
        .filter(|url| content_url_pattern().is_match(url))
        .filter(|url| !processed.contains(url))
        .collect()
}

/// URL 发现服务
pub struct UrlDiscovery {
    source: Arc<dyn PageSource>,
    listing_url: String,
    base: Url,
}

impl UrlDiscovery {
    pub fn new(source: Arc<dyn PageSource>, config: &Config) -> Result<Self> {
        let base = Url::parse(&config.content_base_url)
            .with_context(|| format!("无效的基准地址: {}", config.content_base_url))?;
        Ok(Self {
            source,
            listing_url: config.listing_url.clone(),
            base,
        })
    }

    /// 抓取列表页并返回未处理的 URL（无序）
    ///
    /// 抓取失败直接返回错误，由调用方中止本次运行
    pub async fn discover(&self, processed: &ProcessedUrlSet) -> Result<HashSet<String>> {
        let html = self
            .source
            .fetch(&self.listing_url)
            .await
            .with_context(|| format!("无法获取列表页: {}", self.listing_url))?;

        let urls = extract_quiz_urls(&html, &self.base, processed);
        debug!("列表页共发现 {} 个新 URL", urls.len());
        Ok(urls)
    }

    /// 列表页上当前所有的内容页 URL
    pub async fn list_all(&self) -> Result<HashSet<String>> {
        self.discover(&ProcessedUrlSet::new()).await
    }
}
