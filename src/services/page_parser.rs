//! 页面解析 - 业务能力层
//!
//! 把一个内容页的 HTML 解析成未翻译的 `QuizPage`。
//! 单道题解析失败只丢弃该题，不影响整页。

use std::collections::BTreeMap;
use std::sync::OnceLock;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{QuestionRecord, QuizDate, QuizPage};

/// 页面上没有分类时使用的默认分类
pub const DEFAULT_CATEGORY: &str = "General";

struct Selectors {
    container: Selector,
    question_text: Selector,
    option_row: Selector,
    option_letter: Selector,
    option_value: Selector,
    span: Selector,
    answer_input: Selector,
    explanation: Selector,
    category_link: Selector,
}

fn selectors() -> &'static Selectors {
    static SELECTORS: OnceLock<Selectors> = OnceLock::new();
    SELECTORS.get_or_init(|| {
        let parse = |css: &str| Selector::parse(css).expect("valid css selector");
        Selectors {
            container: parse("div.bix-div-container"),
            question_text: parse("div.bix-td-qtxt"),
            option_row: parse("div.bix-opt-row"),
            option_letter: parse("div.bix-td-option"),
            option_value: parse("div.bix-td-option-val"),
            span: parse("span"),
            answer_input: parse("input.jq-hdnakq"),
            explanation: parse("div.bix-ans-description"),
            category_link: parse("div.explain-link a"),
        }
    })
}

/// 从原始元素中提取一个值的策略，按顺序尝试，第一个非空结果生效
pub type Extractor = fn(&ElementRef) -> Option<String>;

/// 选项字母：先看 CSS 类名，再看可见文字
pub const LETTER_STRATEGIES: &[Extractor] = &[letter_from_svg_class, letter_from_label];

/// 分类：题目下方的解释链接
pub const CATEGORY_STRATEGIES: &[Extractor] = &[category_from_explain_link];

pub fn first_match(strategies: &[Extractor], element: &ElementRef) -> Option<String> {
    strategies.iter().find_map(|strategy| strategy(element))
}

/// `<span class="option-svg-letter-a">` → `A`
pub fn letter_from_svg_class(element: &ElementRef) -> Option<String> {
    let span = element.select(&selectors().span).next()?;
    span.value()
        .classes()
        .find(|c| c.contains("option-svg-letter-"))
        .and_then(|c| c.rsplit('-').next())
        .map(str::to_uppercase)
        .filter(|letter| !letter.is_empty())
}

/// 可见文字 `A.` / `(B)` 去掉标点
pub fn letter_from_label(element: &ElementRef) -> Option<String> {
    let letter: String = element_text(element)
        .chars()
        .filter(|c| !c.is_ascii_punctuation() && !c.is_whitespace())
        .collect();
    Some(letter).filter(|l| !l.is_empty())
}

pub fn category_from_explain_link(element: &ElementRef) -> Option<String> {
    element
        .select(&selectors().category_link)
        .next()
        .map(|a| element_text(&a))
        .filter(|text| !text.is_empty())
}

/// 元素文本，连续空白压缩为一个空格
fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn child_text(container: &ElementRef, selector: &Selector) -> String {
    container
        .select(selector)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default()
}

/// 页面解析器
pub struct PageParser {
    slug_prefix: String,
    source_name: String,
}

impl PageParser {
    pub fn new(config: &Config) -> Self {
        Self::with_names(&config.slug_prefix, &config.source_name)
    }

    pub fn with_names(slug_prefix: &str, source_name: &str) -> Self {
        Self {
            slug_prefix: slug_prefix.to_string(),
            source_name: source_name.to_string(),
        }
    }

    /// 解析一个内容页
    ///
    /// URL 中没有日期时返回错误；没有题目时返回空的 `questions`，由调用方决定如何处理
    pub fn parse(&self, url: &str, html: &str) -> AppResult<QuizPage> {
        let date = QuizDate::from_url(url)
            .ok_or_else(|| AppError::Parse(format!("URL 中没有日期: {}", url)))?;
        let localized_date = date.localized();

        let document = Html::parse_document(html);
        let mut questions = Vec::new();

        for (idx, container) in document.select(&selectors().container).enumerate() {
            let index = idx + 1;
            match parse_question(index, &container) {
                Ok(question) => {
                    if !question.answer_in_options() {
                        warn!(
                            "  题目 {} 的答案 {:?} 不在选项 {:?} 中",
                            index,
                            question.answer,
                            question.options.keys().collect::<Vec<_>>()
                        );
                    }
                    questions.push(question);
                }
                Err(e) => warn!("  解析题目 {} 失败，已丢弃: {}", index, e),
            }
        }

        debug!("{} 解析出 {} 道题目", url, questions.len());

        Ok(QuizPage {
            title: format!("Current {} - {}", self.source_name, localized_date),
            slug: date.slug(&self.slug_prefix),
            localized_date,
            iso_date: date.iso().to_string(),
            source_url: url.to_string(),
            questions,
        })
    }
}

/// 解析单个题目容器
pub fn parse_question(index: usize, container: &ElementRef) -> AppResult<QuestionRecord> {
    let sel = selectors();

    let text = child_text(container, &sel.question_text);

    let mut options = BTreeMap::new();
    for row in container.select(&sel.option_row) {
        let (Some(letter_el), Some(value_el)) = (
            row.select(&sel.option_letter).next(),
            row.select(&sel.option_value).next(),
        ) else {
            continue;
        };
        let Some(letter) = first_match(LETTER_STRATEGIES, &letter_el) else {
            continue;
        };
        options.insert(letter, element_text(&value_el));
    }

    let answer = container
        .select(&sel.answer_input)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(|v| v.trim().to_string())
        .unwrap_or_default();

    let explanation = child_text(container, &sel.explanation);

    // 缺题干不算错误，只有整个容器都是空的才丢弃
    if text.is_empty() && options.is_empty() && answer.is_empty() && explanation.is_empty() {
        return Err(AppError::Parse("题目容器是空的".to_string()));
    }

    let category = first_match(CATEGORY_STRATEGIES, container)
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

    Ok(QuestionRecord {
        index,
        text,
        options,
        explanation,
        answer,
        category,
    })
}
