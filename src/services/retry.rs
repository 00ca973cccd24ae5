//! # 재시도(Retry) 정책
//!
//! LLM API가 과부하(503)나 요청 한도 초과(429)로 응답할 때만
//! 지수 백오프(exponential backoff)와 무작위 지터(jitter)로 재시도합니다.
//! 그 외 에러는 즉시 호출자에게 전파됩니다.

use std::{future::Future, time::Duration};

use rand_core::{OsRng, RngCore};

/// 재시도할 가치가 있는 에러인지 알려주는 트레이트
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// 최초 시도를 포함한 최대 시도 횟수
    pub max_attempts: u32,
    /// 첫 재시도 전 대기 시간. 시도마다 두 배로 늘어납니다.
    pub base_delay: Duration,
    /// 대기 시간에 더해지는 무작위 지터의 상한 (미포함)
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_jitter: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// 지연 없이 바로 재시도하는 정책 (테스트용)
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_jitter: Duration::ZERO,
        }
    }

    /// `attempt`번째(0부터) 실패 후 대기할 시간: `2^attempt * base + [0, jitter)`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let backoff = self.base_delay.saturating_mul(2u32.saturating_pow(attempt));
        backoff + self.jitter()
    }

    fn jitter(&self) -> Duration {
        let max_ms = self.max_jitter.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(OsRng.next_u64() % max_ms)
    }

    /// 연산을 실행하고, 재시도 가능한 에러면 정책에 따라 다시 실행합니다.
    ///
    /// 재시도는 순차적으로 이루어지며, 마지막 시도의 에러가 그대로 반환됩니다.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        E: Retryable + std::fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt + 1 < max_attempts => {
                    let delay = self.delay_for(attempt);
                    tracing::warn!(
                        error = %e,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Model API overloaded, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
