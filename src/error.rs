use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 网络请求失败
    #[error("请求失败 ({url}): {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// 服务端返回非成功状态码
    #[error("HTTP {status} ({url}): {body}")]
    BadStatus {
        url: String,
        status: u16,
        body: String,
    },

    /// 翻译重试次数耗尽（仅在配置了最大次数时出现）
    #[error("翻译失败，已尝试 {attempts} 次: {last_error}")]
    TranslationExhausted { attempts: usize, last_error: String },

    /// 翻译服务返回空结果
    #[error("翻译结果为空")]
    EmptyTranslation,

    /// 数据库操作失败
    #[error("数据库操作 {operation} 失败: {message}")]
    Store { operation: String, message: String },

    /// 检查点读写失败
    #[error("检查点错误: {0}")]
    Checkpoint(String),

    /// 通知渠道发送失败
    #[error("通知渠道 {channel} 发送失败: {message}")]
    Notification { channel: String, message: String },

    /// 缺少必需的配置项
    #[error("缺少配置项 {0}")]
    MissingConfig(&'static str),

    /// 页面解析失败
    #[error("页面解析失败: {0}")]
    Parse(String),

    /// JSON 解析失败
    #[error("JSON解析失败: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// 创建网络请求错误
    pub fn http(url: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Http {
            url: url.into(),
            source,
        }
    }

    /// 创建数据库操作错误
    pub fn store(operation: impl Into<String>, message: impl ToString) -> Self {
        AppError::Store {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    /// 创建通知渠道错误
    pub fn notification(channel: impl Into<String>, message: impl ToString) -> Self {
        AppError::Notification {
            channel: channel.into(),
            message: message.to_string(),
        }
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
