//! config 명령: 예시 설정 생성과 현재 설정 출력

use crate::config::AppConfig;
use crate::interfaces::cli::CliError;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// 예시 설정 파일을 만든다
pub fn config_generate(output_path: Option<String>, force: bool) -> Result<(), CliError> {
    let path = output_path.unwrap_or_else(|| "config.example.toml".to_string());

    if Path::new(&path).exists() && !force {
        println!("{} {}", "파일이 이미 있습니다:".yellow(), path);
        print!("덮어쓸까요? [y/N] ");
        io::stdout().flush().unwrap();

        let mut input = String::new();
        io::stdin().lock().read_line(&mut input).unwrap();

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("{}", "중단했습니다.".red());
            return Ok(());
        }
    }

    println!("{}", "설정 파일 생성 중...".cyan());

    AppConfig::default()
        .save_to_file(&path)
        .map_err(|e| CliError::CommandError(format!("설정 파일 생성 실패: {}", e)))?;

    println!(
        "{} {}",
        "✓".green().bold(),
        "설정 파일을 만들었습니다:".green()
    );
    println!("  {}", path);
    println!();
    println!(
        "{}",
        "API 키는 파일 대신 환경 변수(TP__GEMINI__API_KEY, TP__KMA__API_KEY)로 넣는 것을 권장합니다."
            .dimmed()
    );

    Ok(())
}

/// 현재 설정을 TOML로 출력한다 (API 키는 가린다)
pub fn config_show() -> Result<(), CliError> {
    let mut config = crate::config::get_config().clone();
    config.gemini.api_key = mask_key(&config.gemini.api_key);
    config.kma.api_key = mask_key(&config.kma.api_key);

    let rendered = toml::to_string_pretty(&config)
        .map_err(|e| CliError::CommandError(format!("설정 직렬화 실패: {}", e)))?;

    println!("{}", "현재 설정".bold().green());
    println!("{}", "=".repeat(40).dimmed());
    println!("{}", rendered);
    Ok(())
}

fn mask_key(key: &str) -> String {
    if key.is_empty() {
        String::new()
    } else if key.chars().count() <= 4 {
        "****".to_string()
    } else {
        let head: String = key.chars().take(4).collect();
        format!("{}****", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_key_hides_tail() {
        assert_eq!(mask_key(""), "");
        assert_eq!(mask_key("abc"), "****");
        assert_eq!(mask_key("abcd"), "****");
        assert_eq!(mask_key("abcdefgh"), "abcd****");
    }
}
