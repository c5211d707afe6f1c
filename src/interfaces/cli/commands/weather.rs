//! weather 명령: 기상 데이터 수집과 분석만 실행

use crate::interfaces::cli::CliError;
use crate::utils::month::Month;
use crate::weather::WeatherAnalyzer;
use chrono::{Datelike, Local};
use colored::Colorize;

pub async fn run_weather(refresh: bool) -> Result<(), CliError> {
    let config = crate::config::get_config();

    if config.kma.api_key.is_empty() {
        return Err(CliError::ConfigError(
            "KMA API 키가 없습니다. TP__KMA__API_KEY 또는 KMA_API_KEY 를 설정하세요.".to_string(),
        ));
    }

    let month: Month = config.report.month.parse()?;
    let analyzer = WeatherAnalyzer::from_config(&config.kma);
    let current_year = Local::now().year();

    let analysis = analyzer.analyze(month, current_year, refresh).await?;

    println!(
        "{}",
        format!("{}년 {} 기상 분석", analysis.year, month.label())
            .bold()
            .green()
    );
    println!("{}", "=".repeat(40).dimmed());

    match &analysis.stats {
        Some(stats) => {
            println!("{} {:.1}℃", "이번 달 평균기온:".cyan(), stats.current_temp);
            println!(
                "{} {:.1}℃ ({:+.1}℃, {:+.1}%)",
                format!("{}년 평균:", stats.total_years).cyan(),
                stats.historical_avg,
                stats.diff_from_avg,
                stats.pct_diff_from_avg
            );
            println!(
                "{} {:.1}℃ ({:+.1}℃, {:+.1}%)",
                "평년 평균:".cyan(),
                stats.normal_avg,
                stats.diff_from_normal,
                stats.pct_diff_from_normal
            );
            println!(
                "{} 최고 {:.1}℃ / 최저 {:.1}℃",
                "기간 범위:".cyan(),
                stats.max_temp,
                stats.min_temp
            );
            println!(
                "{} {}위 / {}년",
                "더운 순위:".cyan(),
                stats.rank,
                stats.total_years
            );
        }
        None => {
            println!(
                "{} {}",
                "⚠".yellow().bold(),
                analysis
                    .error
                    .as_deref()
                    .unwrap_or("알 수 없는 오류")
                    .yellow()
            );
        }
    }

    Ok(())
}
