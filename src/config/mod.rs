mod structs;

pub use structs::*;

use std::sync::OnceLock;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// 전역 설정 초기화. 경로를 주면 해당 TOML 파일을 우선 사용한다.
pub fn init_config(path: Option<&str>) -> &'static AppConfig {
    CONFIG.get_or_init(|| AppConfig::load(path))
}

/// 전역 설정 인스턴스
pub fn get_config() -> &'static AppConfig {
    CONFIG.get_or_init(|| AppConfig::load(None))
}
