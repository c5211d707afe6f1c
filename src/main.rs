use clap::Parser;
use trendpress::cli::{Cli, Commands};
use trendpress::config;
use trendpress::interfaces::cli::run_cli_command;
use trendpress::system::logging::init_logging;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::init_config(cli.config.as_deref());

    // 로그 가드는 프로그램 종료까지 잡고 있는다
    let _guard = init_logging(config);

    // 하위 명령 생략 시 전체 파이프라인 실행
    let command = cli.command.unwrap_or(Commands::Generate);

    if let Err(e) = run_cli_command(command).await {
        eprintln!("{}", e.format_colored());
        std::process::exit(1);
    }
}
