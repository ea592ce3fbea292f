//! 测验日期：ISO 日期、古吉拉特语显示日期和 slug

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

static GUJARATI_MONTHS: phf::Map<u32, &'static str> = phf::phf_map! {
    1u32 => "જાન્યુઆરી",
    2u32 => "ફેબ્રુઆરી",
    3u32 => "માર્ચ",
    4u32 => "એપ્રિલ",
    5u32 => "મે",
    6u32 => "જૂન",
    7u32 => "જુલાઈ",
    8u32 => "ઓગસ્ટ",
    9u32 => "સપ્ટેમ્બર",
    10u32 => "ઓક્ટોબર",
    11u32 => "નવેમ્બર",
    12u32 => "ડિસેમ્બર",
};

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d{4}-\d{2}-\d{2})").expect("valid date regex"))
}

/// 从 URL 中提取的测验日期
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizDate {
    iso: String,
}

impl QuizDate {
    /// 取 URL 中第一个 `YYYY-MM-DD`
    pub fn from_url(url: &str) -> Option<Self> {
        date_pattern().captures(url).map(|c| Self {
            iso: c[1].to_string(),
        })
    }

    pub fn iso(&self) -> &str {
        &self.iso
    }

    /// `2025-08-05` → `5 ઓગસ્ટ 2025`，无法解析时原样返回
    pub fn localized(&self) -> String {
        match NaiveDate::parse_from_str(&self.iso, "%Y-%m-%d") {
            Ok(date) => match GUJARATI_MONTHS.get(&date.month()) {
                Some(month) => format!("{} {} {}", date.day(), month, date.year()),
                None => self.iso.clone(),
            },
            Err(e) => {
                tracing::warn!("日期转换失败 {}: {}", self.iso, e);
                self.iso.clone()
            }
        }
    }

    /// 同一日期永远得到同一个 slug
    pub fn slug(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.iso)
    }
}
