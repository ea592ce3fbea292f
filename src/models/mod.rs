pub mod quiz;
pub mod quiz_date;

pub use quiz::{ProcessedUrlSet, QuestionRecord, QuizPage};
pub use quiz_date::QuizDate;
