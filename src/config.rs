use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::AppError;

/// 程序配置
///
/// 加载顺序：默认值 → `QUIZ_CONFIG` 指向的 TOML 文件 → 环境变量
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- 来源站点 ---
    /// 列表页地址
    pub listing_url: String,
    /// 相对链接的解析基准
    pub content_base_url: String,
    /// 来源名称（用于标题）
    pub source_name: String,
    /// slug 前缀
    pub slug_prefix: String,
    /// HTTP 超时（秒）
    pub http_timeout_secs: u64,
    /// 两个页面之间的间隔（毫秒）
    pub page_delay_ms: u64,

    // --- 翻译 ---
    pub source_language: String,
    pub target_language: String,
    /// 单个页面内并发翻译的题目数
    pub translate_workers: usize,
    /// 首次重试等待（毫秒）
    pub retry_initial_delay_ms: u64,
    /// 最大重试等待（毫秒）
    pub retry_max_delay_ms: u64,
    /// 每连续失败多少次重建一次翻译客户端
    pub retry_refresh_every: usize,
    /// 最大尝试次数，不设置则无限重试
    pub translate_max_attempts: Option<usize>,

    // --- Supabase ---
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,

    // --- GitHub Gist 检查点 ---
    pub github_token: Option<String>,
    pub gist_id: Option<String>,
    pub checkpoint_file: String,

    // --- 通知 ---
    pub onesignal_app_id: Option<String>,
    pub onesignal_api_key: Option<String>,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    /// 前端站点地址（用于跳转链接和图标）
    pub site_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listing_url: "https://www.indiabix.com/current-affairs/questions-and-answers/"
                .to_string(),
            content_base_url: "https://www.indiabix.com/current-affairs/".to_string(),
            source_name: "IndiaBix".to_string(),
            slug_prefix: "indiabix".to_string(),
            http_timeout_secs: 30,
            page_delay_ms: 1000,
            source_language: "en".to_string(),
            target_language: "gu".to_string(),
            translate_workers: 5,
            retry_initial_delay_ms: 1000,
            retry_max_delay_ms: 30_000,
            retry_refresh_every: 5,
            translate_max_attempts: None,
            supabase_url: None,
            supabase_key: None,
            github_token: None,
            gist_id: None,
            checkpoint_file: "scraped_urls.json".to_string(),
            onesignal_app_id: None,
            onesignal_api_key: None,
            telegram_bot_token: None,
            telegram_chat_id: None,
            site_url: "https://currentadda.vercel.app".to_string(),
        }
    }
}

impl Config {
    /// 加载完整配置（.env → TOML → 环境变量）
    pub fn load() -> Result<Self> {
        // .env 不存在时忽略
        let _ = dotenvy::dotenv();

        let base = match std::env::var("QUIZ_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };

        Ok(base.with_env_overrides())
    }

    /// 从 TOML 文件加载，缺省字段使用默认值
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", path.display()))
    }

    /// 只使用默认值和环境变量
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 凭据和运行参数可以用环境变量覆盖，站点相关设置只来自 TOML
    fn with_env_overrides(self) -> Self {
        Self {
            http_timeout_secs: env_parse("HTTP_TIMEOUT_SECS").unwrap_or(self.http_timeout_secs),
            page_delay_ms: env_parse("PAGE_DELAY_MS").unwrap_or(self.page_delay_ms),
            translate_workers: env_parse("TRANSLATE_WORKERS").unwrap_or(self.translate_workers),
            translate_max_attempts: env_parse("TRANSLATE_MAX_ATTEMPTS").or(self.translate_max_attempts),
            supabase_url: env_string("SUPABASE_URL").or(self.supabase_url),
            supabase_key: env_string("SUPABASE_KEY").or(self.supabase_key),
            github_token: env_string("GH_TOKEN").or_else(|| env_string("GITHUB_TOKEN")).or(self.github_token),
            gist_id: env_string("GIST_ID").or(self.gist_id),
            onesignal_app_id: env_string("ONESIGNAL_APP_ID").or(self.onesignal_app_id),
            onesignal_api_key: env_string("ONESIGNAL_REST_API_KEY").or(self.onesignal_api_key),
            telegram_bot_token: env_string("TELEGRAM_BOT_TOKEN").or(self.telegram_bot_token),
            telegram_chat_id: env_string("TELEGRAM_CHAT_ID").or(self.telegram_chat_id),
            site_url: env_string("SITE_URL").unwrap_or(self.site_url),
            ..self
        }
    }

    /// 取出必需的配置项，缺失时报错
    pub fn require<'a>(
        value: &'a Option<String>,
        name: &'static str,
    ) -> Result<&'a str, AppError> {
        value
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or(AppError::MissingConfig(name))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

/// 读取环境变量，空白值视为未设置
fn env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env_string(name).and_then(|v| v.parse().ok())
}
