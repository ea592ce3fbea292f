use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

/// 单道题目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// 在页面中的位置（从1开始）
    #[serde(rename = "q_index")]
    pub index: usize,
    pub text: String,
    /// 选项字母 → 选项内容
    pub options: BTreeMap<String, String>,
    pub explanation: String,
    /// 来源站点公布的答案，不翻译
    pub answer: String,
    pub category: String,
}

impl QuestionRecord {
    /// 答案是否落在选项字母之内（无选项或答案为空时视为一致）
    pub fn answer_in_options(&self) -> bool {
        self.options.is_empty() || self.answer.is_empty() || self.options.contains_key(&self.answer)
    }
}

/// 一天的测验
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizPage {
    pub title: String,
    pub slug: String,
    #[serde(rename = "date_str")]
    pub localized_date: String,
    #[serde(rename = "quiz_date")]
    pub iso_date: String,
    pub source_url: String,
    #[serde(skip)]
    pub questions: Vec<QuestionRecord>,
}

/// 已处理的来源 URL 集合
///
/// 对外保存为有序列表，内部额外维护一份索引用于快速判断
#[derive(Debug, Clone, Default)]
pub struct ProcessedUrlSet {
    urls: Vec<String>,
    index: HashSet<String>,
}

impl ProcessedUrlSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.index.contains(url)
    }

    /// 追加一个 URL，已存在时不重复追加
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if self.index.insert(url.clone()) {
            self.urls.push(url);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.urls
    }
}

impl FromIterator<String> for ProcessedUrlSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = Self::new();
        for url in iter {
            set.insert(url);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processed_set_tolerates_duplicates() {
        let set: ProcessedUrlSet = vec!["a".to_string(), "b".to_string(), "a".to_string()]
            .into_iter()
            .collect();
        assert_eq!(set.as_slice(), &["a".to_string(), "b".to_string()]);
        assert!(set.contains("b"));
    }

    #[test]
    fn test_answer_in_options() {
        let mut q = QuestionRecord {
            index: 1,
            text: String::new(),
            options: BTreeMap::from([("A".to_string(), "x".to_string())]),
            explanation: String::new(),
            answer: "A".to_string(),
            category: "General".to_string(),
        };
        assert!(q.answer_in_options());
        q.answer = "E".to_string();
        assert!(!q.answer_in_options());
        q.answer.clear();
        assert!(q.answer_in_options());
    }
}
