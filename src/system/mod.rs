//! 시스템 수준 모듈
//!
//! 로깅 초기화가 여기 있다. 설정은 `crate::config` 쪽.

pub mod logging;
