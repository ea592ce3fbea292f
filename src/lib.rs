//! # IndiaBix Quiz
//!
//! 定时抓取 IndiaBix 时事测验，翻译成古吉拉特语后写入数据库，并推送新测验通知
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Clients）
//! - `clients/` - 每个外部服务一个实现，只暴露能力
//! - `HttpPageSource` / `GoogleTranslator` / `SupabaseStore` / `GistBlobStore`
//! - `OneSignalChannel` / `TelegramChannel`
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心流程顺序
//! - `UrlDiscovery` - 从列表页找出新 URL
//! - `PageParser` - HTML → `QuizPage`
//! - `TranslationService` - 带退避重试的单段文本翻译
//! - `QuizRepository` - 按 slug upsert
//! - `CheckpointStore` - 已处理 URL 列表
//! - `NotificationDispatcher` - 多渠道通知
//!
//! ### ③ 流程层（Workflow）
//! - `QuizFlow` - 单个 URL：抓取 → 解析 → 翻译 → 写库 → 检查点 → 通知
//! - `translate_page` - 单页内题目并发翻译
//!
//! ### ④ 编排层（Orchestration）
//! - `App` - 装配依赖、发现 URL、按顺序逐个处理、输出统计

pub mod clients;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{ProcessedUrlSet, QuestionRecord, QuizPage};
pub use orchestrator::{App, Dependencies, RunStats};
pub use workflow::{ProcessResult, QuizFlow};
