//! 공용 HTTP 클라이언트
//!
//! ureq 의 Agent 는 Send + Sync 이므로 전역 하나를 공유한다.
//! 동기 요청은 호출 측에서 spawn_blocking 으로 감싼다.

pub mod retry;

use std::sync::OnceLock;
use std::time::Duration;

use ureq::Agent;

/// HTTP 요청 타임아웃
const HTTP_TIMEOUT_SECS: u64 = 30;

/// 전역 HTTP Agent
static HTTP_AGENT: OnceLock<Agent> = OnceLock::new();

/// 공유 Agent 핸들. 4xx/5xx 는 에러가 아니라 상태 코드로 받는다.
pub fn http_agent() -> &'static Agent {
    HTTP_AGENT.get_or_init(|| {
        Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(HTTP_TIMEOUT_SECS)))
            .http_status_as_error(false)
            .build()
            .into()
    })
}

/// spawn_blocking 안에서 수행한 동기 fetch 의 에러
#[derive(Debug, Clone)]
pub struct FetchError {
    pub retryable: bool,
    pub message: String,
}

impl FetchError {
    /// 전송 계층 에러 분류. 타임아웃/연결 문제는 재시도 대상.
    pub fn transport(err: &ureq::Error) -> Self {
        let message = format!("request failed: {}", err);
        let lower = message.to_lowercase();
        let retryable = lower.contains("timeout")
            || lower.contains("timed out")
            || lower.contains("connection")
            || lower.contains("host");
        FetchError { retryable, message }
    }

    /// HTTP 상태 코드 에러 분류. 429 와 5xx 는 재시도 대상.
    pub fn status(code: u16) -> Self {
        FetchError {
            retryable: code == 429 || code >= 500,
            message: format!("unexpected status {}", code),
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for FetchError {}
