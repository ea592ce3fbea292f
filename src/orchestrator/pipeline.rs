//! 抓取任务 - 编排层
//!
//! ## 职责
//!
//! 1. **依赖装配**：根据配置创建所有外部客户端（或由调用方注入）
//! 2. **加载检查点**：读取已处理 URL 列表
//! 3. **URL 发现**：失败则中止整个运行
//! 4. **顺序处理**：按日期升序逐个交给 `QuizFlow`，两页之间短暂停顿
//! 5. **全局统计**：汇总所有 URL 的处理结果
//!
//! 不同 URL 之间从不并发；并发只发生在单页翻译内部。

use std::sync::Arc;

use anyhow::Result;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::clients::{
    GistBlobStore, GoogleTranslator, HttpPageSource, OneSignalChannel, PageSource, SupabaseStore,
    TelegramChannel,
};
use crate::config::Config;
use crate::models::ProcessedUrlSet;
use crate::services::{
    BackendFactory, BlobStore, CheckpointStore, NotificationDispatcher, QuizRepository, QuizStore,
    RetryPolicy, TranslateBackend, TranslationService, UrlDiscovery,
};
use crate::utils::logging::{log_startup, log_url_start, log_urls_discovered, print_final_stats};
use crate::workflow::{ProcessResult, QuizFlow};

/// 运行所需的外部依赖
pub struct Dependencies {
    pub source: Arc<dyn PageSource>,
    pub translator: TranslationService,
    pub store: Arc<dyn QuizStore>,
    pub checkpoint: Arc<dyn BlobStore>,
    pub notifier: NotificationDispatcher,
}

impl Dependencies {
    /// 根据配置创建真实的客户端
    ///
    /// Supabase 与 GitHub 凭据是必需的；通知凭据缺失时对应渠道不启用
    pub fn from_config(config: &Config) -> Result<Self> {
        let timeout = config.http_timeout();

        let source: Arc<dyn PageSource> = Arc::new(HttpPageSource::new(timeout)?);

        let store: Arc<dyn QuizStore> = Arc::new(SupabaseStore::new(
            Config::require(&config.supabase_url, "SUPABASE_URL")?,
            Config::require(&config.supabase_key, "SUPABASE_KEY")?,
            timeout,
        )?);

        let checkpoint = gist_blob_store(config)?;

        // 先创建一次，尽早暴露配置问题
        GoogleTranslator::new(&config.source_language, &config.target_language, timeout)?;
        let (source_lang, target_lang) =
            (config.source_language.clone(), config.target_language.clone());
        let factory: BackendFactory = Arc::new(move || -> Box<dyn TranslateBackend> {
            match GoogleTranslator::new(&source_lang, &target_lang, timeout) {
                Ok(translator) => Box::new(translator),
                Err(e) => Box::new(UnavailableBackend(format!("{:#}", e))),
            }
        });
        let translator = TranslationService::new(factory, RetryPolicy::from_config(config));

        Ok(Self {
            source,
            translator,
            store,
            checkpoint,
            notifier: notifier_from_config(config)?,
        })
    }
}

/// 创建 Gist 检查点存储
pub fn gist_blob_store(config: &Config) -> Result<Arc<dyn BlobStore>> {
    Ok(Arc::new(GistBlobStore::new(
        Config::require(&config.github_token, "GH_TOKEN")?,
        Config::require(&config.gist_id, "GIST_ID")?,
        &config.checkpoint_file,
        config.http_timeout(),
    )?))
}

/// 只启用凭据齐全的通知渠道
fn notifier_from_config(config: &Config) -> Result<NotificationDispatcher> {
    let mut dispatcher = NotificationDispatcher::new();
    let timeout = config.http_timeout();

    match (non_empty(&config.onesignal_app_id), non_empty(&config.onesignal_api_key)) {
        (Some(app_id), Some(api_key)) => {
            dispatcher = dispatcher.with_channel(Box::new(OneSignalChannel::new(
                app_id,
                api_key,
                &config.site_url,
                timeout,
            )?));
        }
        _ => warn!("OneSignal App ID 或 API Key 缺失，推送通知将被跳过"),
    }

    match (non_empty(&config.telegram_bot_token), non_empty(&config.telegram_chat_id)) {
        (Some(token), Some(chat_id)) => {
            dispatcher =
                dispatcher.with_channel(Box::new(TelegramChannel::new(token, chat_id, timeout)?));
        }
        _ => warn!("Telegram 凭据缺失，聊天通知将被跳过"),
    }

    Ok(dispatcher)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// 无法创建真实客户端时的占位后端，每次调用都失败，交给重试策略处理
struct UnavailableBackend(String);

#[async_trait::async_trait]
impl TranslateBackend for UnavailableBackend {
    async fn translate(&self, _text: &str) -> Result<String> {
        anyhow::bail!("翻译客户端不可用: {}", self.0)
    }
}

/// 运行统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub discovered: usize,
    pub completed: usize,
    pub no_content: usize,
    pub failed: usize,
    pub notified: usize,
}

/// 应用主结构
pub struct App {
    config: Config,
    discovery: UrlDiscovery,
    checkpoint: CheckpointStore,
    flow: QuizFlow,
}

impl App {
    /// 使用真实客户端初始化
    pub fn initialize(config: Config) -> Result<Self> {
        let deps = Dependencies::from_config(&config)?;
        Self::with_dependencies(config, deps)
    }

    /// 使用注入的依赖初始化
    pub fn with_dependencies(config: Config, deps: Dependencies) -> Result<Self> {
        let checkpoint = CheckpointStore::new(deps.checkpoint);
        let discovery = UrlDiscovery::new(deps.source.clone(), &config)?;
        let flow = QuizFlow::new(
            &config,
            deps.source,
            deps.translator,
            QuizRepository::new(deps.store),
            checkpoint.clone(),
            deps.notifier,
        );

        Ok(Self {
            config,
            discovery,
            checkpoint,
            flow,
        })
    }

    /// 运行一次完整的抓取任务
    ///
    /// 只有 URL 发现失败会返回错误；单个 URL 的失败记录在统计里
    pub async fn run(&self) -> Result<RunStats> {
        log_startup(&self.config);

        let mut processed = self.checkpoint.load().await;

        let mut new_urls: Vec<String> = self.discovery.discover(&processed).await?.into_iter().collect();
        // 日期升序，最旧的先处理
        new_urls.sort();

        log_urls_discovered(processed.len(), new_urls.len());

        let mut stats = RunStats {
            discovered: new_urls.len(),
            ..Default::default()
        };

        if new_urls.is_empty() {
            info!("没有新内容需要抓取");
            return Ok(stats);
        }

        self.process_urls(&new_urls, &mut processed, &mut stats).await;

        print_final_stats(&stats);
        Ok(stats)
    }

    async fn process_urls(
        &self,
        urls: &[String],
        processed: &mut ProcessedUrlSet,
        stats: &mut RunStats,
    ) {
        let total = urls.len();

        for (idx, url) in urls.iter().enumerate() {
            if idx > 0 {
                sleep(self.config.page_delay()).await;
            }
            log_url_start(idx + 1, total, url);

            match self.flow.run(url, processed).await {
                Ok(ProcessResult::Completed { slug, notified, .. }) => {
                    info!("✓ 处理、保存并记录完成: {} ({})", url, slug);
                    stats.completed += 1;
                    stats.notified += notified;
                }
                Ok(ProcessResult::NoContent) => {
                    stats.no_content += 1;
                }
                Err(e) => {
                    error!("❌ 处理失败 {}: {}", url, e);
                    stats.failed += 1;
                }
            }
        }
    }
}
