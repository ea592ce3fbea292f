//! 基础设施层：所有外部服务的具体实现

pub mod gist;
pub mod google_translate;
pub mod http;
pub mod onesignal;
pub mod supabase;
pub mod telegram;

pub use gist::GistBlobStore;
pub use google_translate::GoogleTranslator;
pub use http::{HttpPageSource, PageSource};
pub use onesignal::OneSignalChannel;
pub use supabase::SupabaseStore;
pub use telegram::TelegramChannel;
