//! 사용자 인터페이스 모듈 (CLI)

pub mod cli;
