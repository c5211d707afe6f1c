//! LLM 응답의 마크다운 장식 제거
//!
//! 덱 텍스트 프레임에는 서식 없는 문장만 들어가야 한다.

use once_cell::sync::Lazy;
use regex::Regex;

static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#+\s*").unwrap());
static BOLD_STAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static BOLD_UNDERSCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"__([^_]+)__").unwrap());
static ITALIC_STAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*]+)\*").unwrap());
static ITALIC_UNDERSCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"_([^_]+)_").unwrap());

/// 헤딩/굵게/기울임 마크업을 벗겨내고 앞뒤 공백을 정리한다
pub fn clean_markdown(text: &str) -> String {
    let text = HEADING.replace_all(text, "");
    let text = BOLD_STAR.replace_all(&text, "$1");
    let text = BOLD_UNDERSCORE.replace_all(&text, "$1");
    let text = ITALIC_STAR.replace_all(&text, "$1");
    let text = ITALIC_UNDERSCORE.replace_all(&text, "$1");
    text.trim().to_string()
}

const QUOTE_CHARS: &[char] = &['"', '\'', '“', '”', '‘', '’'];

/// 양끝의 따옴표(직선/둥근) 제거
pub fn strip_outer_quotes(s: &str) -> &str {
    s.trim().trim_matches(QUOTE_CHARS)
}
