//! 전체 파이프라인
//!
//! 데이터 처리 → 기상 분석 → 보고서 생성을 순서대로 실행한다.
//! 기상 분석은 실패해도 경고만 남기고 보고서 생성은 계속한다.

use std::path::PathBuf;

use anyhow::Context;
use chrono::{Datelike, Local};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::data;
use crate::report;
use crate::textgen::GeminiClient;
use crate::utils::Month;
use crate::weather::{WeatherAnalysis, WeatherAnalyzer};

/// 보고서 한 편을 끝까지 생성하고 완성된 덱 경로를 돌려준다.
pub async fn run(config: &AppConfig) -> anyhow::Result<PathBuf> {
    let month: Month = config
        .report
        .month
        .parse()
        .context("보고서 월 설정이 잘못되었습니다")?;

    info!("1단계: 데이터 처리");
    let groups = data::process_data(&config.data).context("데이터 처리 실패")?;

    info!("1.5단계: 기상 데이터 분석");
    let weather = fetch_weather(config, month).await;

    info!("2단계: 리포트 생성");
    let generator = GeminiClient::from_config(&config.gemini).context("Gemini 설정 오류")?;
    report::generate_report(
        &config.report.template_path,
        &config.report.output_path,
        &groups,
        month,
        &generator,
        &config.report.tag_config_path,
        weather,
    )
    .await
    .context("리포트 생성 실패")?;

    Ok(PathBuf::from(&config.report.output_path))
}

/// 기상 분석 결과를 가져온다. 키가 없거나 분석이 실패하면 None 으로
/// 계속 진행한다.
pub async fn fetch_weather(config: &AppConfig, month: Month) -> Option<WeatherAnalysis> {
    if config.kma.api_key.is_empty() {
        warn!("KMA API 키가 없어 기상 분석을 건너뜁니다.");
        return None;
    }

    let analyzer = WeatherAnalyzer::from_config(&config.kma);
    let current_year = Local::now().year();
    match analyzer.analyze(month, current_year, false).await {
        Ok(analysis) => match &analysis.stats {
            Some(stats) => {
                info!(
                    "{}년 {}월 평균기온: {}℃",
                    analysis.year, analysis.month, stats.current_temp
                );
                info!(
                    "{}년 평균: {}℃ (차이: {:+.1}℃)",
                    stats.total_years, stats.historical_avg, stats.diff_from_avg
                );
                Some(analysis)
            }
            None => {
                warn!(
                    "기상 데이터를 가져올 수 없습니다: {}",
                    analysis.error.as_deref().unwrap_or("알 수 없는 오류")
                );
                None
            }
        },
        Err(e) => {
            warn!("기상 데이터 분석 실패: {}", e);
            None
        }
    }
}
