#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use indiabix_quiz::clients::PageSource;
use indiabix_quiz::services::{
    BackendFactory, BlobStore, NotificationChannel, NotificationDispatcher, QuizAnnouncement,
    QuizId, QuizStore, RetryPolicy, TranslateBackend, TranslationService,
};
use indiabix_quiz::{App, Config, Dependencies, QuestionRecord, QuizPage};

pub const LISTING: &str = "https://www.indiabix.com/current-affairs/questions-and-answers/";

pub fn content_url(date: &str) -> String {
    format!("https://www.indiabix.com/current-affairs/{}", date)
}

/// 预置 HTML 的假站点，记录抓取顺序
#[derive(Clone, Default)]
pub struct FakeSite {
    pages: Arc<Mutex<HashMap<String, String>>>,
    pub fetched: Arc<Mutex<Vec<String>>>,
}

impl FakeSite {
    pub fn page(self, url: &str, html: impl Into<String>) -> Self {
        self.pages.lock().unwrap().insert(url.to_string(), html.into());
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for FakeSite {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.fetched.lock().unwrap().push(url.to_string());
        match self.pages.lock().unwrap().get(url) {
            Some(html) => Ok(html.clone()),
            None => anyhow::bail!("HTTP 404 for {}", url),
        }
    }
}

/// 译文 = "gu:" + 原文
pub struct PrefixTranslator;

#[async_trait]
impl TranslateBackend for PrefixTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        Ok(format!("gu:{}", text))
    }
}

/// 含有 `marker` 的文本永远翻译失败，其余同 `PrefixTranslator`
pub struct RefusingTranslator {
    pub marker: &'static str,
}

#[async_trait]
impl TranslateBackend for RefusingTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        if text.contains(self.marker) {
            anyhow::bail!("service unavailable");
        }
        Ok(format!("gu:{}", text))
    }
}

pub fn prefix_factory() -> BackendFactory {
    Arc::new(|| Box::new(PrefixTranslator) as Box<dyn TranslateBackend>)
}

pub fn refusing_factory(marker: &'static str) -> BackendFactory {
    Arc::new(move || Box::new(RefusingTranslator { marker }) as Box<dyn TranslateBackend>)
}

/// 最多尝试 `attempts` 次，等待时间很短
pub fn capped_policy(attempts: usize) -> RetryPolicy {
    RetryPolicy {
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(2),
        max_attempts: Some(attempts),
        ..RetryPolicy::default()
    }
}

#[derive(Clone, Default)]
pub struct RecordingChannel {
    pub sent: Arc<Mutex<Vec<QuizAnnouncement>>>,
    pub fail: bool,
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, announcement: &QuizAnnouncement) -> Result<()> {
        self.sent.lock().unwrap().push(announcement.clone());
        if self.fail {
            anyhow::bail!("channel down");
        }
        Ok(())
    }
}

// ========== 内存存储 ==========

#[derive(Debug, Clone)]
pub struct StoredQuiz {
    pub id: QuizId,
    pub quiz: QuizPage,
}

#[derive(Default)]
struct MemoryState {
    next_id: u64,
    quizzes: Vec<StoredQuiz>,
    questions: Vec<(QuizId, QuestionRecord)>,
}

/// 内存中的关系存储，可以让题目写入失败
#[derive(Default, Clone)]
pub struct InMemoryQuizStore {
    state: Arc<Mutex<MemoryState>>,
    fail_question_inserts: Arc<AtomicBool>,
}

impl InMemoryQuizStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_question_inserts(&self, fail: bool) {
        self.fail_question_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn quizzes(&self) -> Vec<StoredQuiz> {
        self.state.lock().unwrap().quizzes.clone()
    }

    /// 某个 slug 下的题目，按写入顺序
    pub fn questions_for(&self, slug: &str) -> Vec<QuestionRecord> {
        let state = self.state.lock().unwrap();
        let Some(id) = state.quizzes.iter().find(|q| q.quiz.slug == slug).map(|q| &q.id) else {
            return Vec::new();
        };
        state
            .questions
            .iter()
            .filter(|(quiz_id, _)| quiz_id == id)
            .map(|(_, q)| q.clone())
            .collect()
    }
}

#[async_trait]
impl QuizStore for InMemoryQuizStore {
    async fn find_quiz_id(&self, slug: &str) -> Result<Option<QuizId>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .quizzes
            .iter()
            .find(|q| q.quiz.slug == slug)
            .map(|q| q.id.clone()))
    }

    async fn insert_quiz(&self, quiz: &QuizPage) -> Result<QuizId> {
        let mut state = self.state.lock().unwrap();
        if state.quizzes.iter().any(|q| q.quiz.slug == quiz.slug) {
            anyhow::bail!("duplicate slug {}", quiz.slug);
        }
        state.next_id += 1;
        let id = state.next_id.to_string();
        let mut meta = quiz.clone();
        meta.questions.clear();
        state.quizzes.push(StoredQuiz {
            id: id.clone(),
            quiz: meta,
        });
        Ok(id)
    }

    async fn delete_quiz(&self, quiz_id: &QuizId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.quizzes.retain(|q| &q.id != quiz_id);
        state.questions.retain(|(id, _)| id != quiz_id);
        Ok(())
    }

    async fn delete_questions(&self, quiz_id: &QuizId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.questions.retain(|(id, _)| id != quiz_id);
        Ok(())
    }

    async fn insert_questions(&self, quiz_id: &QuizId, questions: &[QuestionRecord]) -> Result<()> {
        if self.fail_question_inserts.load(Ordering::SeqCst) {
            anyhow::bail!("insert questions failed");
        }
        let mut state = self.state.lock().unwrap();
        state
            .questions
            .extend(questions.iter().map(|q| (quiz_id.clone(), q.clone())));
        Ok(())
    }
}

/// 内存中的检查点文本
#[derive(Default, Clone)]
pub struct InMemoryBlobStore {
    content: Arc<Mutex<Option<String>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: Arc::new(Mutex::new(Some(content.into()))),
        }
    }

    pub fn content(&self) -> Option<String> {
        self.content.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.content()
            .and_then(|c| serde_json::from_str(&c).ok())
            .unwrap_or_default()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn read(&self) -> Result<Option<String>> {
        Ok(self.content())
    }

    async fn write(&self, content: &str) -> Result<()> {
        *self.content.lock().unwrap() = Some(content.to_string());
        Ok(())
    }
}

// ========== 页面 ==========

pub fn listing_html(dates: &[&str]) -> String {
    let links: String = dates
        .iter()
        .map(|d| format!(r#"<a class="text-link" href="/current-affairs/{}/">{}</a>"#, d, d))
        .collect();
    format!(r#"<html><body><div class="card-style">{}</div></body></html>"#, links)
}

/// 生成含 `n` 道题的内容页，第 i 题题干为 `Question {i}`
pub fn content_html(n: usize) -> String {
    let containers: String = (1..=n)
        .map(|i| {
            format!(
                r#"<div class="bix-div-container">
                     <div class="bix-td-qtxt">Question {i}</div>
                     <div class="bix-opt-row">
                       <div class="bix-td-option"><span class="option-svg-letter-a"></span></div>
                       <div class="bix-td-option-val">Alpha {i}</div>
                     </div>
                     <div class="bix-opt-row">
                       <div class="bix-td-option">B.</div>
                       <div class="bix-td-option-val">Beta {i}</div>
                     </div>
                     <input type="hidden" class="jq-hdnakq" value="B">
                     <div class="bix-ans-description">Because {i}</div>
                   </div>"#
            )
        })
        .collect();
    format!("<html><body>{}</body></html>", containers)
}

pub struct Harness {
    pub site: FakeSite,
    pub store: InMemoryQuizStore,
    pub blob: InMemoryBlobStore,
    pub channel: RecordingChannel,
    pub translator: BackendFactory,
    pub retry: RetryPolicy,
}

impl Harness {
    pub fn new(site: FakeSite) -> Self {
        Self {
            site,
            store: InMemoryQuizStore::new(),
            blob: InMemoryBlobStore::new(),
            channel: RecordingChannel::default(),
            translator: prefix_factory(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn config() -> Config {
        let mut config = Config::default();
        config.page_delay_ms = 0;
        config
    }

    pub fn app(&self) -> App {
        let deps = Dependencies {
            source: Arc::new(self.site.clone()),
            translator: TranslationService::new(self.translator.clone(), self.retry.clone()),
            store: Arc::new(self.store.clone()),
            checkpoint: Arc::new(self.blob.clone()),
            notifier: NotificationDispatcher::new().with_channel(Box::new(self.channel.clone())),
        };
        App::with_dependencies(Self::config(), deps).unwrap()
    }

    pub fn notifications(&self) -> Vec<QuizAnnouncement> {
        self.channel.sent.lock().unwrap().clone()
    }
}
