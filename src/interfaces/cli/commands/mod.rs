//! CLI 명령 구현
//!
//! 각 하위 명령이 파일 하나씩을 가진다.

pub mod check;
pub mod config_management;
pub mod generate;
pub mod process_data;
pub mod tags;
pub mod weather;
