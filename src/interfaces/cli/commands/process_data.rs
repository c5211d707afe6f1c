//! process-data 명령: CSV 전처리와 클러스터링만 실행

use crate::data::{self, Metric, NOISE_LABEL};
use crate::interfaces::cli::CliError;
use crate::utils::numbers::group_thousands;
use colored::Colorize;

pub fn run_process_data() -> Result<(), CliError> {
    let config = crate::config::get_config();

    println!("{}", "데이터 처리 시작".bold().green());

    let groups = data::process_data(&config.data)?;

    println!("{}", "데이터 처리 완료".bold().green());
    println!("{} {}", "프레이즈 그룹 수:".cyan(), groups.len());
    println!("{} {}", "저장 위치:".cyan(), config.data.json_output_path);
    println!();

    println!("{}", "노출수 상위 5개 그룹".bold());
    for group in data::top_groups_by(&groups, Metric::Impressions, 5) {
        println!(
            "  {} 노출 {}, 클릭 {}, CTR {:.2}%",
            group.phrase.green(),
            group_thousands(group.total_impressions),
            group_thousands(group.total_clicks),
            group.avg_ctr
        );
    }

    if let Some(noise) = groups.iter().find(|g| g.is_noise()) {
        println!();
        println!(
            "{} {}개 키워드",
            format!("{}:", NOISE_LABEL).dimmed(),
            noise.keywords.len()
        );
    }

    Ok(())
}
