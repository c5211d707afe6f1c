//! tags 명령: 템플릿 덱에서 태그 마커 나열

use crate::deck::Deck;
use crate::interfaces::cli::CliError;
use crate::report::tags::{find_tags_in_slide, marker_token};
use colored::Colorize;

pub fn list_tags(deck_path: Option<String>) -> Result<(), CliError> {
    let config = crate::config::get_config();
    let path = deck_path.unwrap_or_else(|| config.report.template_path.clone());

    let deck = Deck::load(&path)?;

    println!("{} {}", "덱:".cyan(), path);
    println!("{} {}", "슬라이드 수:".cyan(), deck.slides.len());
    println!();

    let mut total = 0usize;
    for (idx, slide) in deck.slides.iter().enumerate() {
        let found = find_tags_in_slide(slide);
        if found.is_empty() {
            continue;
        }
        println!("{}", format!("슬라이드 {}", idx + 1).bold());
        for tag in &found {
            println!(
                "  {} {}",
                marker_token(&tag.tag).green(),
                format!("(도형 {}, {} 일치)", tag.shape_id, tag.source).dimmed()
            );
            total += 1;
        }
    }

    println!();
    println!("{} {}", "총 태그 수:".cyan(), total);
    Ok(())
}
