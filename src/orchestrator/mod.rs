//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! pipeline::App (发现 URL，按顺序处理 Vec<String>)
//!     ↓
//! workflow::QuizFlow (处理单个 URL)
//!     ↓
//! services (能力层：discovery / parser / translation / persistence / checkpoint / notification)
//!     ↓
//! clients (基础设施：HTTP / Google / Supabase / Gist / OneSignal / Telegram)
//! ```

pub mod pipeline;

pub use pipeline::{gist_blob_store, App, Dependencies, RunStats};
