//! Supabase 客户端
//!
//! 通过 PostgREST 接口访问 `quizzes` / `questions` 两张表

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AppError;
use crate::models::{QuestionRecord, QuizPage};
use crate::services::persistence::{QuizId, QuizStore};

pub struct SupabaseStore {
    client: reqwest::Client,
    rest_url: String,
}

#[derive(Deserialize)]
struct IdRow {
    #[serde(deserialize_with = "deserialize_id")]
    id: QuizId,
}

#[derive(Serialize)]
struct QuestionRow<'a> {
    quiz_id: &'a str,
    #[serde(flatten)]
    question: &'a QuestionRecord,
}

impl SupabaseStore {
    pub fn new(url: &str, key: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(key).context("无效的 Supabase key")?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", key)).context("无效的 Supabase key")?,
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("无法创建 Supabase HTTP 客户端")?;

        Ok(Self {
            client,
            rest_url: format!("{}/rest/v1", url.trim_end_matches('/')),
        })
    }

    fn table(&self, name: &str) -> String {
        format!("{}/{}", self.rest_url, name)
    }

    async fn send(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response> {
        debug!("Supabase {}", operation);
        let response = request
            .send()
            .await
            .map_err(|e| AppError::store(operation, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::store(operation, format!("HTTP {}: {}", status, body)).into());
        }
        Ok(response)
    }

    async fn first_id(&self, operation: &str, response: reqwest::Response) -> Result<Option<QuizId>> {
        let rows: Vec<IdRow> = response
            .json()
            .await
            .map_err(|e| AppError::store(operation, e))?;
        Ok(rows.into_iter().next().map(|r| r.id))
    }
}

#[async_trait]
impl QuizStore for SupabaseStore {
    async fn find_quiz_id(&self, slug: &str) -> Result<Option<QuizId>> {
        let request = self
            .client
            .get(self.table("quizzes"))
            .query(&[("select", "id".to_string()), ("slug", format!("eq.{}", slug))]);
        let response = self.send("select quizzes", request).await?;
        self.first_id("select quizzes", response).await
    }

    async fn insert_quiz(&self, quiz: &QuizPage) -> Result<QuizId> {
        let request = self
            .client
            .post(self.table("quizzes"))
            .header("Prefer", "return=representation")
            .json(quiz);
        let response = self.send("insert quizzes", request).await?;
        self.first_id("insert quizzes", response)
            .await?
            .ok_or_else(|| AppError::store("insert quizzes", "响应中没有 id").into())
    }

    async fn delete_quiz(&self, quiz_id: &QuizId) -> Result<()> {
        let request = self
            .client
            .delete(self.table("quizzes"))
            .query(&[("id", format!("eq.{}", quiz_id))]);
        self.send("delete quizzes", request).await?;
        Ok(())
    }

    async fn delete_questions(&self, quiz_id: &QuizId) -> Result<()> {
        let request = self
            .client
            .delete(self.table("questions"))
            .query(&[("quiz_id", format!("eq.{}", quiz_id))]);
        self.send("delete questions", request).await?;
        Ok(())
    }

    async fn insert_questions(&self, quiz_id: &QuizId, questions: &[QuestionRecord]) -> Result<()> {
        let rows: Vec<QuestionRow> = questions
            .iter()
            .map(|question| QuestionRow { quiz_id, question })
            .collect();
        let request = self
            .client
            .post(self.table("questions"))
            .header("Prefer", "return=minimal")
            .json(&rows);
        self.send("insert questions", request).await?;
        Ok(())
    }
}

/// 主键可能是整数也可能是 uuid 字符串，统一转成字符串
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer id")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}
