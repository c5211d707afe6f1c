//! 데이터 처리 파이프라인 통합 테스트
//!
//! CSV → 전처리 → 클러스터링 → JSON 내보내기 전 단계를 임시 디렉터리에서
//! 실행하고, JSON 캐시가 있을 때 건너뛰는 동작까지 확인한다.

use std::fs;

use tempfile::TempDir;

use trendpress::config::DataConfig;
use trendpress::data::{Metric, process_data, top_groups_by};

const SAMPLE_CSV: &str = "\
소재명,노출수,클릭수
원피스 겨울,300,6
원피스 겨울,200,4
원피스 여름,300,6
원피스 롱,200,2
니트 원피스,100,1
코트 남성,50,1
장갑,10,0
유령,0,0
";

fn data_config(dir: &TempDir) -> DataConfig {
    DataConfig {
        csv_path: dir.path().join("keywords.csv").to_string_lossy().to_string(),
        json_output_path: dir
            .path()
            .join("phrase_groups.json")
            .to_string_lossy()
            .to_string(),
        min_cluster_size: 3,
    }
}

#[test]
fn csv_to_groups_end_to_end() {
    let dir = TempDir::new().unwrap();
    let config = data_config(&dir);
    fs::write(&config.csv_path, SAMPLE_CSV).unwrap();

    let groups = process_data(&config).unwrap();

    // 원피스 그룹 + 노이즈
    assert_eq!(groups.len(), 2);

    let main = &groups[0];
    assert_eq!(main.phrase, "원피스·겨울");
    assert_eq!(main.keywords.len(), 4);
    // 중복 행(원피스 겨울 300+200)이 병합된 뒤 집계된다
    assert_eq!(main.total_impressions, 1100);
    assert_eq!(main.total_clicks, 19);
    assert!((main.avg_ctr - 1.5).abs() < 1e-9);
    assert_eq!(main.keywords[0].keyword, "원피스 겨울");
    assert_eq!(main.keywords[0].impressions, 500);

    // 노출/클릭 0인 행은 버려지고 남은 둘이 노이즈로 간다
    let noise = &groups[1];
    assert!(noise.is_noise());
    assert_eq!(noise.keywords.len(), 2);

    // JSON 파일이 한국어 키로 저장된다
    let json = fs::read_to_string(&config.json_output_path).unwrap();
    assert!(json.contains("\"프레이즈\""));
    assert!(json.contains("\"총 노출\""));
    assert!(json.contains("\"키워드들\""));
}

#[test]
fn existing_json_skips_csv() {
    let dir = TempDir::new().unwrap();
    let config = data_config(&dir);
    fs::write(&config.csv_path, SAMPLE_CSV).unwrap();

    let first = process_data(&config).unwrap();

    // CSV를 지워도 JSON 캐시에서 그대로 로드된다
    fs::remove_file(&config.csv_path).unwrap();
    let second = process_data(&config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn missing_inputs_fail() {
    let dir = TempDir::new().unwrap();
    let config = data_config(&dir);
    assert!(process_data(&config).is_err());
}

#[test]
fn empty_csv_gives_empty_groups() {
    let dir = TempDir::new().unwrap();
    let config = data_config(&dir);
    fs::write(&config.csv_path, "소재명,노출수,클릭수\n").unwrap();

    let groups = process_data(&config).unwrap();
    assert!(groups.is_empty());
    // 내보낼 것이 없으면 JSON도 만들지 않는다
    assert!(!std::path::Path::new(&config.json_output_path).exists());
}

#[test]
fn top_groups_selection_after_pipeline() {
    let dir = TempDir::new().unwrap();
    let config = data_config(&dir);
    fs::write(&config.csv_path, SAMPLE_CSV).unwrap();

    let groups = process_data(&config).unwrap();
    let top = top_groups_by(&groups, Metric::Impressions, 5);

    // 노이즈는 선별에서 빠진다
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].phrase, "원피스·겨울");
}
