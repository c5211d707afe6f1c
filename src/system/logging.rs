//! 로깅 시스템 초기화
//!
//! 설정에 따라 tracing 구독자를 구성한다. 파일 출력, 일 단위 로테이션,
//! JSON 포맷을 지원한다.

use tracing_appender::rolling;
use tracing_subscriber;

use crate::config::AppConfig;

/// 설정에 따라 로깅 시스템을 초기화한다
///
/// 프로그램 시작 시 설정 로드 직후에 한 번만 호출해야 한다.
///
/// # Returns
/// * `WorkerGuard` - 비동기 로그 기록이 flush 되도록 프로그램이 끝날 때까지
///   잡고 있어야 한다
///
/// # Panics
/// * 로그 appender 생성에 실패한 경우
/// * 전역 구독자 설정에 실패한 경우 (이미 초기화됨)
pub fn init_logging(config: &AppConfig) -> tracing_appender::non_blocking::WorkerGuard {
    let writer: Box<dyn std::io::Write + Send + Sync> =
        if let Some(ref log_file) = config.logging.file {
            if !log_file.is_empty() && config.logging.enable_rotation {
                // 일 단위 로테이션 파일
                let dir = std::path::Path::new(log_file)
                    .parent()
                    .unwrap_or(std::path::Path::new("."));
                let filename = std::path::Path::new(log_file)
                    .file_name()
                    .unwrap_or(std::ffi::OsStr::new("trendpress.log"));
                let filename_str = filename.to_str().unwrap_or("trendpress.log");
                let appender = rolling::Builder::new()
                    .rotation(rolling::Rotation::DAILY)
                    .filename_prefix(filename_str.trim_end_matches(".log"))
                    .filename_suffix("log")
                    .max_log_files(config.logging.max_backups as usize)
                    .build(dir)
                    .expect("Failed to create rolling log appender");
                Box::new(appender)
            } else if !log_file.is_empty() {
                // 로테이션 없이 파일에 이어쓰기
                let file = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(log_file)
                    .expect("Failed to open log file");
                Box::new(file)
            } else {
                // 파일명이 비어 있으면 콘솔로
                Box::new(std::io::stderr())
            }
        } else {
            Box::new(std::io::stderr())
        };

    let (non_blocking_writer, guard) = tracing_appender::non_blocking(writer);
    let filter = tracing_subscriber::EnvFilter::new(config.logging.level.clone());

    let subscriber_builder = tracing_subscriber::fmt()
        .with_writer(non_blocking_writer)
        .with_env_filter(filter)
        .with_level(true)
        .with_ansi(config.logging.file.as_ref().is_none_or(|f| f.is_empty()));

    if config.logging.format == "json" {
        subscriber_builder.json().init();
    } else {
        subscriber_builder.init();
    }

    guard
}
