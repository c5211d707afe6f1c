//! CLI 인터페이스 모듈
//!
//! clap 으로 파싱된 명령을 실제 동작으로 연결한다.

pub mod commands;

use crate::cli::{Commands, ConfigCommands};
use commands::{check, config_management, generate, process_data, tags, weather};
use std::fmt;

#[derive(Debug)]
pub enum CliError {
    ConfigError(String),
    CommandError(String),
    PipelineError(String),
}

impl CliError {
    /// 색 없는 단순 출력
    pub fn format_simple(&self) -> String {
        match self {
            CliError::ConfigError(msg) => format!("설정 오류: {}", msg),
            CliError::CommandError(msg) => format!("명령 오류: {}", msg),
            CliError::PipelineError(msg) => format!("파이프라인 오류: {}", msg),
        }
    }

    /// 색 입힌 출력
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::ConfigError(msg) => {
                format!("{} {}", "설정 오류:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "명령 오류:".red().bold(), msg.white())
            }
            CliError::PipelineError(msg) => {
                format!("{} {}", "파이프라인 오류:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<crate::errors::TrendpressError> for CliError {
    fn from(err: crate::errors::TrendpressError) -> Self {
        CliError::CommandError(err.to_string())
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        // {:#} 은 원인 체인까지 한 줄로 붙여 준다
        CliError::PipelineError(format!("{:#}", err))
    }
}

/// clap 이 파싱한 명령을 실행한다
pub async fn run_cli_command(cmd: Commands) -> Result<(), CliError> {
    match cmd {
        Commands::Generate => generate::run_generate().await,

        Commands::Check => check::run_check(),

        Commands::Tags { deck } => tags::list_tags(deck),

        Commands::Weather { refresh } => weather::run_weather(refresh).await,

        Commands::ProcessData => process_data::run_process_data(),

        Commands::Config { action } => match action {
            ConfigCommands::Generate { output_path, force } => {
                config_management::config_generate(output_path, force)
            }
            ConfigCommands::Show => config_management::config_show(),
        },
    }
}
