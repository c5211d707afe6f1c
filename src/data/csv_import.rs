//! 키워드 CSV 임포트
//!
//! 대시보드 내보내기 CSV를 읽는다. 헤더는 한국어(소재명/노출수/클릭수)가
//! 기본이고 영어(keyword/impressions/clicks)도 허용한다. 손상된 행은
//! 행 번호와 함께 수집해 경고로 남기고, 한 행도 읽지 못했을 때만 실패한다.

use std::path::Path;

use tracing::warn;

use crate::errors::{Result, TrendpressError};

use super::KeywordRecord;

/// 필수 컬럼의 인덱스
struct ColumnIndex {
    keyword: usize,
    impressions: usize,
    clicks: usize,
}

fn resolve_columns(headers: &csv::StringRecord) -> Result<ColumnIndex> {
    let mut keyword = None;
    let mut impressions = None;
    let mut clicks = None;

    for (i, raw) in headers.iter().enumerate() {
        let name = raw.trim();
        match name {
            "소재명" => keyword = keyword.or(Some(i)),
            "노출수" => impressions = impressions.or(Some(i)),
            "클릭수" => clicks = clicks.or(Some(i)),
            _ => match name.to_ascii_lowercase().as_str() {
                "keyword" => keyword = keyword.or(Some(i)),
                "impressions" => impressions = impressions.or(Some(i)),
                "clicks" => clicks = clicks.or(Some(i)),
                _ => {}
            },
        }
    }

    match (keyword, impressions, clicks) {
        (Some(keyword), Some(impressions), Some(clicks)) => Ok(ColumnIndex {
            keyword,
            impressions,
            clicks,
        }),
        _ => {
            let mut missing = Vec::new();
            if keyword.is_none() {
                missing.push("소재명");
            }
            if impressions.is_none() {
                missing.push("노출수");
            }
            if clicks.is_none() {
                missing.push("클릭수");
            }
            Err(TrendpressError::csv_parse(format!(
                "필수 컬럼이 없습니다: {}",
                missing.join(", ")
            )))
        }
    }
}

/// 천 단위 쉼표가 섞인 수치 필드 파싱 ("1,234" -> 1234)
fn parse_count(field: &str) -> std::result::Result<u64, String> {
    let cleaned: String = field.chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Err("빈 수치 필드".to_string());
    }
    cleaned
        .parse::<u64>()
        .map_err(|_| format!("수치가 아닌 값: '{}'", field))
}

/// 키워드 CSV를 읽어 레코드 목록으로 반환
pub fn load_keyword_csv<P: AsRef<Path>>(path: P) -> Result<Vec<KeywordRecord>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(TrendpressError::not_found(format!(
            "CSV 파일이 없습니다: {}",
            path.display()
        )));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| {
            TrendpressError::csv_parse(format!("CSV 열기 실패 {}: {}", path.display(), e))
        })?;

    let headers = reader
        .headers()
        .map_err(|e| TrendpressError::csv_parse(format!("헤더 읽기 실패: {}", e)))?
        .clone();
    let columns = resolve_columns(&headers)?;

    let mut records = Vec::new();
    let mut errors = Vec::new();
    let mut row_number = 1; // 헤더가 1행

    for row in reader.records() {
        row_number += 1;

        let row = match row {
            Ok(row) => row,
            Err(e) => {
                errors.push(format!("{}행: {}", row_number, e));
                continue;
            }
        };

        let keyword = match row.get(columns.keyword) {
            Some(k) if !k.is_empty() => k.to_string(),
            _ => {
                errors.push(format!("{}행: 소재명이 비어 있습니다", row_number));
                continue;
            }
        };

        let impressions = match row.get(columns.impressions).map(parse_count) {
            Some(Ok(v)) => v,
            Some(Err(e)) => {
                errors.push(format!("{}행: 노출수 {}", row_number, e));
                continue;
            }
            None => {
                errors.push(format!("{}행: 노출수 컬럼이 없습니다", row_number));
                continue;
            }
        };

        let clicks = match row.get(columns.clicks).map(parse_count) {
            Some(Ok(v)) => v,
            Some(Err(e)) => {
                errors.push(format!("{}행: 클릭수 {}", row_number, e));
                continue;
            }
            None => {
                errors.push(format!("{}행: 클릭수 컬럼이 없습니다", row_number));
                continue;
            }
        };

        records.push(KeywordRecord::new(keyword, impressions, clicks));
    }

    if !errors.is_empty() {
        if records.is_empty() {
            return Err(TrendpressError::csv_parse(format!(
                "CSV에서 유효한 행을 찾지 못했습니다: {}",
                errors.join("; ")
            )));
        }
        warn!("CSV에서 {}개 행을 건너뜀: {}", errors.len(), errors.join("; "));
    }

    Ok(records)
}
