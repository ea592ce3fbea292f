//! 持久化服务 - 业务能力层
//!
//! 按 slug 对测验做 upsert：已存在则清空题目后重新写入，不存在则新建。

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, warn};

use crate::models::{QuestionRecord, QuizPage};

/// 数据库生成的测验主键（统一按字符串处理）
pub type QuizId = String;

/// 关系型存储的最小操作集合
#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn find_quiz_id(&self, slug: &str) -> Result<Option<QuizId>>;
    async fn insert_quiz(&self, quiz: &QuizPage) -> Result<QuizId>;
    async fn delete_quiz(&self, quiz_id: &QuizId) -> Result<()>;
    async fn delete_questions(&self, quiz_id: &QuizId) -> Result<()>;
    /// 批量写入，空列表不应调用
    async fn insert_questions(&self, quiz_id: &QuizId, questions: &[QuestionRecord]) -> Result<()>;
}

/// upsert 结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

impl UpsertOutcome {
    /// 更新也会重新通知，方便运营确认推送正常
    pub fn should_notify(self) -> bool {
        matches!(self, UpsertOutcome::Created | UpsertOutcome::Updated)
    }
}

pub struct QuizRepository {
    store: Arc<dyn QuizStore>,
}

impl QuizRepository {
    pub fn new(store: Arc<dyn QuizStore>) -> Self {
        Self { store }
    }

    /// 写入一个测验及其全部题目
    ///
    /// 任一步骤失败都返回错误，不会留下只写了一半的题目集合
    pub async fn upsert(&self, quiz: &QuizPage) -> Result<UpsertOutcome> {
        let existing = self
            .store
            .find_quiz_id(&quiz.slug)
            .await
            .with_context(|| format!("查询测验失败: {}", quiz.slug))?;

        let (quiz_id, outcome) = match existing {
            Some(quiz_id) => {
                info!("测验已存在: {}，替换题目...", quiz.slug);
                self.store
                    .delete_questions(&quiz_id)
                    .await
                    .with_context(|| format!("删除旧题目失败: {}", quiz.slug))?;
                (quiz_id, UpsertOutcome::Updated)
            }
            None => {
                let quiz_id = self
                    .store
                    .insert_quiz(quiz)
                    .await
                    .with_context(|| format!("新建测验失败: {}", quiz.slug))?;
                (quiz_id, UpsertOutcome::Created)
            }
        };

        if quiz.questions.is_empty() {
            return Ok(outcome);
        }

        if let Err(e) = self.store.insert_questions(&quiz_id, &quiz.questions).await {
            if outcome == UpsertOutcome::Created {
                if let Err(rollback) = self.store.delete_quiz(&quiz_id).await {
                    warn!("回滚新建测验 {} 失败: {:#}", quiz.slug, rollback);
                }
            }
            return Err(e.context(format!("写入题目失败: {}", quiz.slug)));
        }

        Ok(outcome)
    }
}
