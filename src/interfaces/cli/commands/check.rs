//! check 명령: 실행 전 준비 상태 점검

use crate::interfaces::cli::CliError;
use colored::Colorize;
use std::path::Path;

fn ok(label: &str, detail: &str) {
    println!("  {} {} {}", "✓".green().bold(), label, detail.dimmed());
}

fn warn_item(label: &str, detail: &str) {
    println!("  {} {} {}", "⚠".yellow().bold(), label, detail.yellow());
}

fn fail(label: &str, detail: &str) {
    println!("  {} {} {}", "✗".red().bold(), label, detail.red());
}

pub fn run_check() -> Result<(), CliError> {
    let config = crate::config::get_config();
    let mut fatal = 0usize;

    println!("{}", "실행 준비 상태 점검".bold().green());
    println!();

    // 프레이즈 그룹 JSON이 이미 있으면 CSV가 없어도 된다
    if Path::new(&config.data.json_output_path).is_file() {
        ok("프레이즈 그룹 JSON", &config.data.json_output_path);
    } else if Path::new(&config.data.csv_path).is_file() {
        ok("키워드 CSV", &config.data.csv_path);
    } else {
        fail(
            "입력 데이터",
            &format!(
                "{} 와 {} 둘 다 없습니다",
                config.data.csv_path, config.data.json_output_path
            ),
        );
        fatal += 1;
    }

    if Path::new(&config.report.template_path).is_file() {
        ok("템플릿 덱", &config.report.template_path);
    } else {
        fail(
            "템플릿 덱",
            &format!("{} 없음", config.report.template_path),
        );
        fatal += 1;
    }

    if Path::new(&config.report.tag_config_path).is_file() {
        ok("태그 설정", &config.report.tag_config_path);
    } else {
        warn_item(
            "태그 설정",
            &format!(
                "{} 없음 (빈 설정으로 진행)",
                config.report.tag_config_path
            ),
        );
    }

    if config.gemini.api_key.is_empty() {
        fail(
            "Gemini API 키",
            "TP__GEMINI__API_KEY 또는 GEMINI_API_KEY 필요",
        );
        fatal += 1;
    } else {
        ok("Gemini API 키", "설정됨");
    }

    if config.kma.api_key.is_empty() {
        warn_item("KMA API 키", "없음 (기상 분석은 건너뜁니다)");
    } else {
        ok("KMA API 키", "설정됨");
    }

    println!();
    if fatal == 0 {
        println!("{}", "모든 필수 항목 준비 완료".green().bold());
        Ok(())
    } else {
        Err(CliError::CommandError(format!(
            "{}개 항목이 준비되지 않았습니다",
            fatal
        )))
    }
}
