//! 翻译服务 - 业务能力层
//!
//! 只负责"翻译一段文本"，带指数退避重试。
//! 每次调用使用独立的后端实例，连续失败若干次后重建实例。

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::utils::logging::truncate_text;

/// 单次翻译调用（一段文本进，一段文本出）
#[async_trait]
pub trait TranslateBackend: Send + Sync {
    async fn translate(&self, text: &str) -> Result<String>;
}

/// 创建翻译后端实例
pub type BackendFactory = Arc<dyn Fn() -> Box<dyn TranslateBackend> + Send + Sync>;

/// 重试策略
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub jitter_min: f64,
    pub jitter_max: f64,
    /// 每连续失败多少次重建一次后端
    pub refresh_every: usize,
    /// `None` 表示一直重试直到成功
    pub max_attempts: Option<usize>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            jitter_min: 0.5,
            jitter_max: 1.5,
            refresh_every: 5,
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            initial_delay: Duration::from_millis(config.retry_initial_delay_ms),
            max_delay: Duration::from_millis(config.retry_max_delay_ms),
            refresh_every: config.retry_refresh_every,
            max_attempts: config.translate_max_attempts,
            ..Self::default()
        }
    }

    /// 第 `attempt` 次失败后的基础等待时间（未加抖动）
    pub fn base_delay(&self, attempt: usize) -> Duration {
        let exp = attempt.saturating_sub(1).min(31) as u32;
        self.initial_delay
            .saturating_mul(1u32 << exp)
            .min(self.max_delay)
    }

    /// 加上随机抖动后的等待时间
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let base = self.base_delay(attempt);
        if self.jitter_max <= self.jitter_min {
            return base.mul_f64(self.jitter_min.max(0.0));
        }
        let factor = rand::thread_rng().gen_range(self.jitter_min..=self.jitter_max);
        base.mul_f64(factor)
    }

    pub fn should_refresh(&self, attempt: usize) -> bool {
        self.refresh_every > 0 && attempt % self.refresh_every == 0
    }

    fn exhausted(&self, attempt: usize) -> bool {
        self.max_attempts.is_some_and(|max| attempt >= max)
    }
}

/// 翻译服务
///
/// 可以廉价 clone，供页面内并发翻译使用
#[derive(Clone)]
pub struct TranslationService {
    factory: BackendFactory,
    policy: RetryPolicy,
}

impl TranslationService {
    pub fn new(factory: BackendFactory, policy: RetryPolicy) -> Self {
        Self { factory, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// 翻译一段文本
    ///
    /// 空白输入直接返回空字符串，不调用远程服务。
    /// 远程失败或结果为空时按策略重试。
    pub async fn translate(&self, text: &str) -> Result<String> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(String::new());
        }

        let mut backend = (self.factory)();
        let mut attempts = 0usize;

        loop {
            let last_error = match backend.translate(text).await {
                Ok(result) if !result.is_empty() => {
                    debug!("翻译成功: {}", truncate_text(text, 30));
                    return Ok(result);
                }
                Ok(_) => AppError::EmptyTranslation.to_string(),
                Err(e) => e.to_string(),
            };

            attempts += 1;
            warn!(
                "    [第 {} 次] 翻译失败: {} 错误: {}",
                attempts,
                truncate_text(text, 30),
                last_error
            );

            if self.policy.exhausted(attempts) {
                return Err(AppError::TranslationExhausted {
                    attempts,
                    last_error,
                }
                .into());
            }

            let wait = self.policy.delay_for(attempts);
            warn!("    等待 {:.2}s 后重试...", wait.as_secs_f64());
            sleep(wait).await;

            if self.policy.should_refresh(attempts) {
                debug!("连续失败 {} 次，重建翻译客户端", attempts);
                backend = (self.factory)();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    /// 前 `failures` 次调用失败，之后成功
    struct FlakyBackend {
        calls: Arc<AtomicUsize>,
        failures: usize,
    }

    #[async_trait]
    impl TranslateBackend for FlakyBackend {
        async fn translate(&self, text: &str) -> Result<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                anyhow::bail!("boom {}", n);
            }
            Ok(format!("gu:{}", text))
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            initial_delay: Duration::from_millis(20),
            max_delay: Duration::from_millis(50),
            ..RetryPolicy::default()
        }
    }

    fn service(failures: usize, policy: RetryPolicy) -> (TranslationService, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let created = Arc::new(AtomicUsize::new(0));
        let (c, k) = (calls.clone(), created.clone());
        let factory: BackendFactory = Arc::new(move || {
            k.fetch_add(1, Ordering::SeqCst);
            Box::new(FlakyBackend {
                calls: c.clone(),
                failures,
            }) as Box<dyn TranslateBackend>
        });
        (TranslationService::new(factory, policy), calls, created)
    }

    #[tokio::test]
    async fn test_blank_input_skips_backend() {
        let (svc, calls, _) = service(0, fast_policy());
        assert_eq!(svc.translate("   ").await.unwrap(), "");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let (svc, calls, _) = service(2, fast_policy());
        let start = Instant::now();

        let result = svc.translate("  Who won?  ").await.unwrap();

        assert_eq!(result, "gu:Who won?");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_backend_recreated_every_fifth_failure() {
        let policy = RetryPolicy {
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            ..RetryPolicy::default()
        };
        let (svc, _, created) = service(10, policy);

        svc.translate("text").await.unwrap();

        // 初始 1 个 + 第 5、10 次失败后各重建 1 个
        assert_eq!(created.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_max_attempts_gives_up() {
        let policy = RetryPolicy {
            max_attempts: Some(3),
            ..fast_policy()
        };
        let (svc, calls, _) = service(usize::MAX, policy);

        let err = svc.translate("text").await.unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::TranslationExhausted { attempts: 3, .. })
        ));
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.base_delay(1), Duration::from_secs(1));
        assert_eq!(policy.base_delay(2), Duration::from_secs(2));
        assert_eq!(policy.base_delay(5), Duration::from_secs(16));
        assert_eq!(policy.base_delay(6), Duration::from_secs(30));
        assert_eq!(policy.base_delay(100), Duration::from_secs(30));

        for attempt in 1..8 {
            let d = policy.delay_for(attempt);
            let base = policy.base_delay(attempt);
            assert!(d >= base.mul_f64(0.5) && d <= base.mul_f64(1.5));
        }
    }
}
