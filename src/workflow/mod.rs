pub mod page_translation;
pub mod quiz_flow;

pub use page_translation::translate_page;
pub use quiz_flow::{FlowError, ProcessResult, QuizFlow, Stage};
