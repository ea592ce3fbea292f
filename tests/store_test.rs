mod common;

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use common::{InMemoryBlobStore, InMemoryQuizStore};
use indiabix_quiz::models::ProcessedUrlSet;
use indiabix_quiz::services::{BlobStore, CheckpointStore, QuizRepository, UpsertOutcome};
use indiabix_quiz::{QuestionRecord, QuizPage};

fn quiz(slug: &str, texts: &[&str]) -> QuizPage {
    QuizPage {
        title: "t".to_string(),
        slug: slug.to_string(),
        localized_date: "d".to_string(),
        iso_date: "2025-08-05".to_string(),
        source_url: "u".to_string(),
        questions: texts
            .iter()
            .enumerate()
            .map(|(i, t)| QuestionRecord {
                index: i + 1,
                text: t.to_string(),
                options: BTreeMap::new(),
                explanation: String::new(),
                answer: String::new(),
                category: "General".to_string(),
            })
            .collect(),
    }
}

#[tokio::test]
async fn test_upsert_replaces_questions() {
    let store = InMemoryQuizStore::new();
    let repo = QuizRepository::new(Arc::new(store.clone()));

    let first = repo.upsert(&quiz("s", &["a", "b", "c"])).await.unwrap();
    let second = repo.upsert(&quiz("s", &["x", "y"])).await.unwrap();

    assert_eq!(first, UpsertOutcome::Created);
    assert_eq!(second, UpsertOutcome::Updated);
    assert!(second.should_notify());
    assert_eq!(store.quizzes().len(), 1);
    let texts: Vec<_> = store.questions_for("s").into_iter().map(|q| q.text).collect();
    assert_eq!(texts, vec!["x", "y"]);
}

#[tokio::test]
async fn test_failed_create_rolls_back_quiz() {
    let store = InMemoryQuizStore::new();
    store.set_fail_question_inserts(true);
    let repo = QuizRepository::new(Arc::new(store.clone()));

    assert!(repo.upsert(&quiz("s", &["a"])).await.is_err());
    assert!(store.quizzes().is_empty());
}

#[tokio::test]
async fn test_empty_question_list_is_noop_insert() {
    let store = InMemoryQuizStore::new();
    store.set_fail_question_inserts(true);
    let repo = QuizRepository::new(Arc::new(store.clone()));

    assert_eq!(repo.upsert(&quiz("s", &[])).await.unwrap(), UpsertOutcome::Created);
    assert_eq!(store.quizzes().len(), 1);
}

struct BrokenBlob;

#[async_trait]
impl BlobStore for BrokenBlob {
    async fn read(&self) -> Result<Option<String>> {
        anyhow::bail!("network down")
    }
    async fn write(&self, _content: &str) -> Result<()> {
        anyhow::bail!("network down")
    }
}

#[tokio::test]
async fn test_checkpoint_load_missing_corrupt_and_failing() {
    let missing = CheckpointStore::new(Arc::new(InMemoryBlobStore::new()));
    assert!(missing.load().await.is_empty());

    let corrupt = CheckpointStore::new(Arc::new(InMemoryBlobStore::with_content("{not json")));
    assert!(corrupt.load().await.is_empty());

    let broken = CheckpointStore::new(Arc::new(BrokenBlob));
    assert!(broken.load().await.is_empty());
    tokio_test::assert_err!(broken.save(&ProcessedUrlSet::new()).await);
}

#[tokio::test]
async fn test_checkpoint_save_then_load() {
    let blob = InMemoryBlobStore::new();
    let store = CheckpointStore::new(Arc::new(blob.clone()));

    let mut set = ProcessedUrlSet::new();
    set.insert("https://a/2025-08-05");
    set.insert("https://a/2025-08-04");
    tokio_test::assert_ok!(store.save(&set).await);

    assert_eq!(blob.urls(), vec!["https://a/2025-08-05", "https://a/2025-08-04"]);
    let loaded = store.load().await;
    assert_eq!(loaded.as_slice(), set.as_slice());
}
