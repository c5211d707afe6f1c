//! 프롬프트 변수 치환
//!
//! 태그 설정의 prompt_template 안 `{이름}` 자리표시자를 채운다.
//! 모르는 변수는 지우지 않고 그대로 두고 경고만 남긴다. 템플릿을
//! 잘못 써도 문장이 통째로 사라지지 않게 하기 위한 규칙이다.

use std::collections::BTreeMap;

use chrono::{Datelike, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::data::{Metric, PhraseGroup, top_groups_by};
use crate::utils::Month;
use crate::weather::WeatherAnalysis;

/// 프레이즈 데이터가 아예 없을 때의 대체 문구
pub const NO_PHRASE_INFO: &str = "(프레이즈 정보 없음)";

static VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// 슬라이드 단위로 태그 사이에 공유되는 컨텍스트
#[derive(Debug, Clone, Default)]
pub struct SlideContext {
    pub weather: Option<WeatherAnalysis>,
    /// KEYWORD1_AREA 결과가 저장되어 INSIGHT 계열 태그에서 재사용된다
    pub insight_title: Option<String>,
    /// KEYWORD2_AREA 결과
    pub insight_title2: Option<String>,
}

impl SlideContext {
    pub fn new(weather: Option<WeatherAnalysis>) -> Self {
        Self {
            weather,
            insight_title: None,
            insight_title2: None,
        }
    }
}

fn f1(value: f64) -> String {
    format!("{:.1}", value)
}

/// "평균보다 N.N℃ 높았으며" 형태의 비교 구절
fn comparison_to_average(diff: f64) -> String {
    if diff > 0.0 {
        format!("평균보다 {:.1}℃ 높았으며", diff.abs())
    } else if diff < 0.0 {
        format!("평균보다 {:.1}℃ 낮았으며", diff.abs())
    } else {
        "평균과 유사했으며".to_string()
    }
}

/// "예년 대비 N.N℃ 높았습니다" 형태의 비교 문장
fn comparison_to_normal(diff: f64) -> String {
    if diff > 0.0 {
        format!("예년 대비 {:.1}℃ 높았습니다", diff.abs())
    } else if diff < 0.0 {
        format!("예년 대비 {:.1}℃ 낮았습니다", diff.abs())
    } else {
        "예년과 유사했습니다".to_string()
    }
}

fn names(groups: &[&PhraseGroup]) -> Vec<String> {
    groups.iter().map(|g| g.phrase.clone()).collect()
}

/// "- 프레이즈: 키워드1, 키워드2" 형태의 요약 블록
fn phrase_summary(groups: &[&PhraseGroup]) -> String {
    groups
        .iter()
        .map(|g| {
            let keywords = g.top_keywords(5);
            if keywords.is_empty() {
                format!("- {}: (키워드 정보 없음)", g.phrase)
            } else {
                format!("- {}: {}", g.phrase, keywords.join(", "))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// 태그 하나를 위한 치환 변수 테이블 구성
pub fn prompt_vars(
    tag_name: &str,
    groups: &[PhraseGroup],
    month: Month,
    ctx: &SlideContext,
) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();
    vars.insert("month".to_string(), month.label());
    vars.insert(
        "current_year".to_string(),
        Local::now().year().to_string(),
    );

    if let Some(title) = &ctx.insight_title {
        vars.insert("insight_title".to_string(), title.clone());
    }
    if let Some(title) = &ctx.insight_title2 {
        vars.insert("insight_title2".to_string(), title.clone());
    }

    if let Some(weather) = &ctx.weather {
        match &weather.stats {
            Some(stats) => {
                vars.insert("weather_current_temp".to_string(), f1(stats.current_temp));
                vars.insert(
                    "weather_historical_avg".to_string(),
                    f1(stats.historical_avg),
                );
                vars.insert("weather_diff_from_avg".to_string(), f1(stats.diff_from_avg));
                vars.insert(
                    "weather_pct_diff_from_avg".to_string(),
                    f1(stats.pct_diff_from_avg),
                );
                vars.insert("weather_normal_avg".to_string(), f1(stats.normal_avg));
                vars.insert(
                    "weather_diff_from_normal".to_string(),
                    f1(stats.diff_from_normal),
                );
                vars.insert(
                    "weather_pct_diff_from_normal".to_string(),
                    f1(stats.pct_diff_from_normal),
                );
                vars.insert("weather_rank".to_string(), stats.rank.to_string());
                vars.insert(
                    "weather_total_years".to_string(),
                    stats.total_years.to_string(),
                );
                vars.insert(
                    "weather_comparison".to_string(),
                    comparison_to_average(stats.diff_from_avg),
                );
                vars.insert(
                    "weather_normal_comparison".to_string(),
                    comparison_to_normal(stats.diff_from_normal),
                );
            }
            None => {
                // 분석 불가 시 기본값
                vars.insert("weather_current_temp".to_string(), "N/A".to_string());
                vars.insert("weather_historical_avg".to_string(), "N/A".to_string());
                vars.insert("weather_comparison".to_string(), String::new());
                vars.insert("weather_normal_comparison".to_string(), String::new());
            }
        }
    }

    let top_by_impressions = top_groups_by(groups, Metric::Impressions, 5);
    let top_by_ctr = top_groups_by(groups, Metric::Ctr, 5);
    if !top_by_impressions.is_empty() {
        vars.insert(
            "chart1_top_groups".to_string(),
            names(&top_by_impressions).join(", "),
        );
        vars.insert("ctr_top_groups".to_string(), names(&top_by_ctr).join(", "));
        vars.insert(
            "phrase_info_text".to_string(),
            phrase_summary(&top_by_impressions),
        );
        vars.insert(
            "phrase_info_text_ctr".to_string(),
            phrase_summary(&top_by_ctr),
        );

        // 인사이트 계열 태그에서만 쓰는 비교용 목록
        if tag_name == "INSIGHT1_AREA" || tag_name == "INSIGHT_TITLE_AREA" {
            vars.insert(
                "exposure_phrases".to_string(),
                names(&top_by_impressions).join(", "),
            );
            vars.insert("ctr_phrases".to_string(), names(&top_by_ctr).join(", "));
        }
    }

    vars.entry("phrase_info_text".to_string())
        .or_insert_with(|| NO_PHRASE_INFO.to_string());
    vars.entry("phrase_info_text_ctr".to_string())
        .or_insert_with(|| NO_PHRASE_INFO.to_string());

    vars
}

/// `{이름}` 자리표시자 치환. 테이블에 없는 이름은 그대로 두고 경고.
pub fn substitute(template: &str, vars: &BTreeMap<String, String>) -> String {
    VAR_PATTERN
        .replace_all(template, |caps: &regex::Captures| {
            let name = &caps[1];
            match vars.get(name) {
                Some(value) => value.clone(),
                None => {
                    warn!("프롬프트 변수 누락: {{{}}}", name);
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

/// 태그용 프롬프트 완성 (변수 테이블 구성 + 치환)
pub fn build_prompt(
    tag_name: &str,
    groups: &[PhraseGroup],
    month: Month,
    prompt_template: &str,
    ctx: &SlideContext,
) -> String {
    let vars = prompt_vars(tag_name, groups, month, ctx);
    substitute(prompt_template, &vars)
}

/// 인사이트 타이틀 생성용 고정 프롬프트
pub fn insight_title_prompt(month: Month, exposure_phrases: &str, ctr_phrases: &str) -> String {
    format!(
        "다음은 {month} 트렌드 리포트에서 발견된 데이터입니다:\n\n\
         전체적으로 노출수가 높았던 상위 5개 프레이즈:\n{exposure}\n\n\
         고객들이 특히 관심을 보인(CTR이 높은) 상위 5개 프레이즈:\n{ctr}\n\n\
         이 데이터를 바탕으로 트렌드 리포트의 핵심 인사이트를 하나 제시하는 타이틀을 작성해주세요.\n\n\
         작성 가이드:\n\
         1. 노출수 상위 프레이즈와 CTR 상위 프레이즈를 비교 분석하여 발견한 핵심 인사이트를 한 문장으로 표현\n\
         2. 고객들의 특별한 니즈나 트렌드를 드러내는 인사이트여야 함\n\
         3. 타이틀 형식으로 작성 (예: \"고객들은 실용적 뷰티에 집중한다\" 또는 \"은은하고 데일리한 제품이 고객의 선택\" 등)\n\
         4. 15-25자 정도의 간결한 타이틀\n\
         5. {month}의 계절적 특성도 고려\n\n\
         절대 금지사항:\n\
         - 수치 데이터(노출수, CTR, % 등)를 직접 언급하지 마세요\n\
         - 마크다운 문법(##, ** 등)은 사용하지 말고 순수 텍스트로만 작성\n\
         - 옵션을 제시하지 말고 바로 타이틀만 작성\n\
         - 설명이나 부연 설명 없이 타이틀만 작성\n\n\
         중요: 타이틀만 작성해주세요. 설명이나 부연 설명은 포함하지 마세요.",
        month = month.label(),
        exposure = exposure_phrases,
        ctr = ctr_phrases
    )
}
