pub mod checkpoint;
pub mod discovery;
pub mod notification;
pub mod page_parser;
pub mod persistence;
pub mod translation;

pub use checkpoint::{BlobStore, CheckpointStore};
pub use discovery::UrlDiscovery;
pub use notification::{NotificationChannel, NotificationDispatcher, QuizAnnouncement};
pub use page_parser::PageParser;
pub use persistence::{QuizId, QuizRepository, QuizStore, UpsertOutcome};
pub use translation::{BackendFactory, RetryPolicy, TranslateBackend, TranslationService};
