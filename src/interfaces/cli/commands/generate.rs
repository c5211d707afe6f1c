//! generate 명령: 전체 파이프라인 실행

use crate::interfaces::cli::CliError;
use crate::pipeline;
use colored::Colorize;

pub async fn run_generate() -> Result<(), CliError> {
    let config = crate::config::get_config();

    println!("{}", "트렌드 리포트 자동 생성 시작".bold().green());
    println!("{}", "=".repeat(50).dimmed());

    let output = pipeline::run(config).await?;

    println!("{}", "=".repeat(50).dimmed());
    println!("{}", "리포트 생성 완료!".bold().green());
    println!("{} {}", "출력 파일:".cyan(), output.display());

    Ok(())
}
