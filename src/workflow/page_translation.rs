//! 页面翻译 - 流程层
//!
//! 一个页面内的题目并发翻译（固定并发数），结果按原顺序拼回

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::info;

use crate::models::{QuestionRecord, QuizPage};
use crate::services::TranslationService;

/// 翻译一道题的题干、解析和全部选项；答案和分类保持原样
pub async fn translate_question(
    translator: &TranslationService,
    question: QuestionRecord,
) -> Result<QuestionRecord> {
    info!("  开始翻译第 {} 题...", question.index);

    let text = translator.translate(&question.text).await?;
    let explanation = translator.translate(&question.explanation).await?;

    let mut options = question.options.clone();
    for value in options.values_mut() {
        *value = translator.translate(value).await?;
    }

    Ok(QuestionRecord {
        text,
        explanation,
        options,
        ..question
    })
}

/// 翻译整页
///
/// 全部题目翻译完成后才返回。任何一题失败则取消其余任务，
/// 等它们全部停止后整页失败
pub async fn translate_page(
    translator: &TranslationService,
    page: QuizPage,
    workers: usize,
) -> Result<QuizPage> {
    let QuizPage {
        title,
        slug,
        localized_date,
        iso_date,
        source_url,
        questions,
    } = page;

    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut slots: Vec<Option<QuestionRecord>> = (0..questions.len()).map(|_| None).collect();
    let mut tasks = JoinSet::new();

    for (position, question) in questions.into_iter().enumerate() {
        let semaphore = semaphore.clone();
        let translator = translator.clone();
        let index = question.index;

        tasks.spawn(async move {
            let result: Result<QuestionRecord> = async move {
                let _permit = semaphore.acquire_owned().await?;
                translate_question(&translator, question).await
            }
            .await;
            (position, index, result)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        let outcome = joined
            .context("翻译任务异常退出")
            .and_then(|(position, index, result)| {
                result
                    .with_context(|| format!("第 {} 题翻译失败", index))
                    .map(|question| (position, question))
            });

        match outcome {
            Ok((position, question)) => slots[position] = Some(question),
            Err(e) => {
                tasks.shutdown().await;
                return Err(e);
            }
        }
    }

    // 按页面位置拼回，与完成顺序无关
    Ok(QuizPage {
        title,
        slug,
        localized_date,
        iso_date,
        source_url,
        questions: slots.into_iter().flatten().collect(),
    })
}
