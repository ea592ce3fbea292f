//! 单个 URL 的处理流程 - 流程层
//!
//! 流程顺序：
//! 1. 抓取页面
//! 2. 解析题目（没有题目则跳过，不记录检查点）
//! 3. 翻译
//! 4. 写入数据库
//! 5. 记录检查点
//! 6. 发送通知（失败不回滚前面的步骤）

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::clients::http::PageSource;
use crate::config::Config;
use crate::models::ProcessedUrlSet;
use crate::services::{
    CheckpointStore, NotificationDispatcher, PageParser, QuizAnnouncement, QuizRepository,
    TranslationService, UpsertOutcome,
};
use crate::workflow::page_translation::translate_page;

/// 流程阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Parse,
    Translate,
    Persist,
    Checkpoint,
    Notify,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetch => "FETCH",
            Stage::Parse => "PARSE",
            Stage::Translate => "TRANSLATE",
            Stage::Persist => "PERSIST",
            Stage::Checkpoint => "CHECKPOINT",
            Stage::Notify => "NOTIFY",
        };
        f.write_str(name)
    }
}

/// 某个阶段失败，该 URL 不记录检查点
#[derive(Debug, Error)]
#[error("[{stage}] {error:#}")]
pub struct FlowError {
    pub stage: Stage,
    pub error: anyhow::Error,
}

trait StageExt<T> {
    fn at(self, stage: Stage) -> Result<T, FlowError>;
}

impl<T, E: Into<anyhow::Error>> StageExt<T> for Result<T, E> {
    fn at(self, stage: Stage) -> Result<T, FlowError> {
        self.map_err(|e| FlowError {
            stage,
            error: e.into(),
        })
    }
}

/// 处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessResult {
    /// 已写入数据库
    Completed {
        slug: String,
        outcome: UpsertOutcome,
        checkpointed: bool,
        notified: usize,
    },
    /// 页面上没有题目
    NoContent,
}

/// 单个 URL 的处理流程
pub struct QuizFlow {
    source: Arc<dyn PageSource>,
    parser: PageParser,
    translator: TranslationService,
    repository: QuizRepository,
    checkpoint: CheckpointStore,
    notifier: NotificationDispatcher,
    translate_workers: usize,
    source_name: String,
    site_url: String,
}

impl QuizFlow {
    pub fn new(
        config: &Config,
        source: Arc<dyn PageSource>,
        translator: TranslationService,
        repository: QuizRepository,
        checkpoint: CheckpointStore,
        notifier: NotificationDispatcher,
    ) -> Self {
        Self {
            source,
            parser: PageParser::new(config),
            translator,
            repository,
            checkpoint,
            notifier,
            translate_workers: config.translate_workers,
            source_name: config.source_name.clone(),
            site_url: config.site_url.clone(),
        }
    }

    /// 处理一个 URL
    ///
    /// 成功写入后立即把 URL 加入 `processed` 并保存检查点
    pub async fn run(
        &self,
        url: &str,
        processed: &mut ProcessedUrlSet,
    ) -> Result<ProcessResult, FlowError> {
        info!("抓取: {}", url);
        let html = self.source.fetch(url).await.at(Stage::Fetch)?;

        let page = self.parser.parse(url, &html).at(Stage::Parse)?;
        if page.questions.is_empty() {
            warn!("页面上没有题目: {}", url);
            return Ok(ProcessResult::NoContent);
        }
        info!("[{}] 解析出 {} 道题目，开始翻译", page.slug, page.questions.len());

        let quiz = translate_page(&self.translator, page, self.translate_workers)
            .await
            .at(Stage::Translate)?;

        let outcome = self.repository.upsert(&quiz).await.at(Stage::Persist)?;
        info!("[{}] ✓ 已写入数据库 ({:?})", quiz.slug, outcome);

        processed.insert(url);
        let checkpointed = match self.checkpoint.save(processed).await {
            Ok(()) => {
                info!("[{}] ✓ 检查点已更新", quiz.slug);
                true
            }
            Err(e) => {
                error!("[{}] [{}] {:#}", quiz.slug, Stage::Checkpoint, e);
                false
            }
        };

        let notified = if outcome.should_notify() {
            info!("[{}] 发送新测验通知", quiz.slug);
            let announcement = QuizAnnouncement::for_quiz(&quiz, &self.source_name, &self.site_url);
            let delivered = self.notifier.dispatch(&announcement).await;
            if delivered == 0 {
                warn!("[{}] [{}] 没有任何渠道送达", quiz.slug, Stage::Notify);
            }
            delivered
        } else {
            0
        };

        Ok(ProcessResult::Completed {
            slug: quiz.slug,
            outcome,
            checkpointed,
            notified,
        })
    }
}
