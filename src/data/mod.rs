//! 키워드 데이터 처리 파이프라인
//!
//! CSV 로드 → 전처리(중복 병합, 무효 행 제거) → 프레이즈 클러스터링 → JSON 내보내기.
//! 프레이즈 JSON이 이미 있으면 전체 단계를 건너뛰고 그대로 로드한다.

pub mod cluster;
pub mod csv_import;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, IntoEnumIterator};
use tracing::{info, warn};

use crate::config::DataConfig;
use crate::errors::{Result, TrendpressError};
use crate::utils::numbers::round2;

use cluster::{LexicalClusterer, PhraseClusterer};

/// 노이즈 그룹 라벨. 어떤 프레이즈에도 속하지 못한 키워드가 모인다.
pub const NOISE_LABEL: &str = "노이즈";

/// 전처리된 키워드 한 건
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRecord {
    pub keyword: String,
    pub impressions: u64,
    pub clicks: u64,
}

impl KeywordRecord {
    pub fn new<S: Into<String>>(keyword: S, impressions: u64, clicks: u64) -> Self {
        Self {
            keyword: keyword.into(),
            impressions,
            clicks,
        }
    }

    /// CTR(%) = 클릭수 / 노출수 × 100. 노출이 0이면 0.
    pub fn ctr(&self) -> f64 {
        if self.impressions == 0 {
            0.0
        } else {
            self.clicks as f64 / self.impressions as f64 * 100.0
        }
    }
}

/// 프레이즈 그룹에 속한 키워드 (JSON 직렬화용)
///
/// JSON 키는 한국어가 정본이고 영어 키는 역직렬화 별칭으로만 받는다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordEntry {
    #[serde(rename = "키워드", alias = "keyword")]
    pub keyword: String,
    #[serde(rename = "노출수", alias = "impressions")]
    pub impressions: u64,
    #[serde(rename = "클릭수", alias = "clicks")]
    pub clicks: u64,
    #[serde(rename = "CTR", alias = "ctr")]
    pub ctr: f64,
}

impl From<&KeywordRecord> for KeywordEntry {
    fn from(record: &KeywordRecord) -> Self {
        Self {
            keyword: record.keyword.clone(),
            impressions: record.impressions,
            clicks: record.clicks,
            ctr: round2(record.ctr()),
        }
    }
}

/// 프레이즈 그룹: 공통 토큰으로 묶인 키워드 집합과 집계치
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseGroup {
    #[serde(rename = "프레이즈", alias = "phrase")]
    pub phrase: String,
    #[serde(rename = "총 노출", alias = "total_impressions")]
    pub total_impressions: u64,
    #[serde(rename = "총 클릭", alias = "total_clicks")]
    pub total_clicks: u64,
    #[serde(rename = "평균 CTR", alias = "avg_ctr")]
    pub avg_ctr: f64,
    #[serde(rename = "키워드들", alias = "keywords", default)]
    pub keywords: Vec<KeywordEntry>,
}

impl PhraseGroup {
    /// 그룹 집계. 키워드는 노출수 내림차순으로 정렬해 담는다.
    pub fn from_records(phrase: &str, records: &[KeywordRecord]) -> Self {
        let mut keywords: Vec<KeywordEntry> = records.iter().map(KeywordEntry::from).collect();
        keywords.sort_by(|a, b| b.impressions.cmp(&a.impressions));

        let total_impressions = keywords.iter().map(|k| k.impressions).sum();
        let total_clicks = keywords.iter().map(|k| k.clicks).sum();
        let avg_ctr = if keywords.is_empty() {
            0.0
        } else {
            round2(keywords.iter().map(|k| k.ctr).sum::<f64>() / keywords.len() as f64)
        };

        Self {
            phrase: phrase.to_string(),
            total_impressions,
            total_clicks,
            avg_ctr,
            keywords,
        }
    }

    pub fn is_noise(&self) -> bool {
        self.phrase == NOISE_LABEL
    }

    /// 노출수 상위 n개 키워드 이름
    pub fn top_keywords(&self, n: usize) -> Vec<&str> {
        // keywords 는 이미 노출수 내림차순
        self.keywords.iter().take(n).map(|k| k.keyword.as_str()).collect()
    }
}

/// 그룹 선별 기준 지표
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Metric {
    #[default]
    Impressions,
    Clicks,
    Ctr,
}

impl Metric {
    /// 한국어/영어 표기 모두 허용
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "총 노출" | "노출수" | "impressions" => Some(Metric::Impressions),
            "총 클릭" | "클릭수" | "clicks" => Some(Metric::Clicks),
            "평균 CTR" | "CTR" | "ctr" => Some(Metric::Ctr),
            _ => None,
        }
    }

    /// 허용되는 지표 표기 목록 (영문 기준, 오류 메시지용)
    ///
    /// EnumIter 로 변형에서 자동 생성해 parse 와 어긋나지 않게 한다.
    pub fn allowed_names() -> String {
        Metric::iter()
            .map(|m| m.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn value(&self, group: &PhraseGroup) -> f64 {
        match self {
            Metric::Impressions => group.total_impressions as f64,
            Metric::Clicks => group.total_clicks as f64,
            Metric::Ctr => group.avg_ctr,
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Impressions => write!(f, "총 노출"),
            Metric::Clicks => write!(f, "총 클릭"),
            Metric::Ctr => write!(f, "평균 CTR"),
        }
    }
}

/// 노이즈를 제외하고 지표 내림차순 상위 n개 그룹
pub fn top_groups_by(groups: &[PhraseGroup], metric: Metric, n: usize) -> Vec<&PhraseGroup> {
    let mut filtered: Vec<&PhraseGroup> = groups.iter().filter(|g| !g.is_noise()).collect();
    filtered.sort_by(|a, b| {
        metric
            .value(b)
            .partial_cmp(&metric.value(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    filtered.truncate(n);
    filtered
}

/// 중복 키워드 병합(노출/클릭 합산) 후 노출과 클릭이 모두 0인 행 제거.
/// 첫 등장 순서를 유지한다.
pub fn preprocess(records: Vec<KeywordRecord>) -> Vec<KeywordRecord> {
    let mut merged: Vec<KeywordRecord> = Vec::with_capacity(records.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        match index.get(&record.keyword) {
            Some(&i) => {
                merged[i].impressions += record.impressions;
                merged[i].clicks += record.clicks;
            }
            None => {
                index.insert(record.keyword.clone(), merged.len());
                merged.push(record);
            }
        }
    }

    merged
        .into_iter()
        .filter(|r| r.impressions > 0 || r.clicks > 0)
        .collect()
}

/// 프레이즈 그룹 JSON 로드
pub fn load_phrase_groups<P: AsRef<Path>>(path: P) -> Result<Vec<PhraseGroup>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        TrendpressError::file_operation(format!("JSON 읽기 실패 {}: {}", path.display(), e))
    })?;
    let groups: Vec<PhraseGroup> = serde_json::from_str(&content)?;
    Ok(groups)
}

/// 프레이즈 그룹을 JSON으로 내보내기 (상위 디렉터리 자동 생성, pretty 출력)
pub fn export_phrase_groups<P: AsRef<Path>>(groups: &[PhraseGroup], path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(groups)?;
    fs::write(path, json)?;
    Ok(())
}

/// 데이터 처리 전체 단계 실행
///
/// 프레이즈 JSON이 이미 있으면 거기서 바로 로드한다. 없으면
/// CSV → 전처리 → 클러스터링 → JSON 내보내기 순으로 수행한다.
pub fn process_data(config: &DataConfig) -> Result<Vec<PhraseGroup>> {
    let json_path = Path::new(&config.json_output_path);

    if json_path.exists() {
        info!("기존 프레이즈 JSON 로드: {}", json_path.display());
        let groups = load_phrase_groups(json_path)?;
        info!("{}개 프레이즈 그룹 로드 완료", groups.len());
        return Ok(groups);
    }

    info!("키워드 CSV 로드: {}", config.csv_path);
    let records = csv_import::load_keyword_csv(&config.csv_path)?;
    info!("{}개 행 로드 완료", records.len());

    let records = preprocess(records);
    info!("전처리 완료: {}개 키워드", records.len());

    let clusterer = LexicalClusterer::new(config.min_cluster_size);
    let groups = clusterer.cluster(&records);

    if groups.is_empty() {
        warn!("프레이즈 그룹이 없습니다. JSON 내보내기를 건너뜁니다.");
        return Ok(groups);
    }

    export_phrase_groups(&groups, json_path)?;
    info!(
        "프레이즈 JSON 내보내기 완료: {} ({}개 그룹)",
        json_path.display(),
        groups.len()
    );
    Ok(groups)
}
