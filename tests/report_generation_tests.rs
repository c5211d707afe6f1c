//! 리포트 생성 통합 테스트
//!
//! 템플릿 덱과 태그 설정을 임시 디렉터리에 만들고, 네트워크 없이
//! 스크립트 생성기로 전체 흐름을 검증한다.

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;

use trendpress::data::{KeywordRecord, PhraseGroup};
use trendpress::deck::{Deck, ShapeKind};
use trendpress::errors::{Result, TrendpressError};
use trendpress::report::generate_report;
use trendpress::textgen::TextGenerator;
use trendpress::utils::Month;
use trendpress::weather::{MonthlyTemp, analyze_records};

/// 프롬프트를 기록하고 정해진 답을 돌려주는 생성기
struct ScriptedGenerator {
    prompts: Mutex<Vec<String>>,
    response: String,
}

impl ScriptedGenerator {
    fn new(response: &str) -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            response: response.to_string(),
        }
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.response.clone())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// 프롬프트에 지정 문구가 들어 있으면 실패하는 생성기
struct FailingGenerator {
    fail_marker: String,
    calls: Mutex<Vec<String>>,
}

impl FailingGenerator {
    fn new(fail_marker: &str) -> Self {
        Self {
            fail_marker: fail_marker.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.calls.lock().unwrap().push(prompt.to_string());
        if prompt.contains(&self.fail_marker) {
            Err(TrendpressError::llm_api("모의 생성 실패"))
        } else {
            Ok("생성된 문장".to_string())
        }
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

fn month() -> Month {
    "10월".parse().unwrap()
}

/// 비노이즈 3개 + 노이즈 1개
fn sample_groups() -> Vec<PhraseGroup> {
    vec![
        PhraseGroup::from_records(
            "가을 원피스",
            &[
                KeywordRecord::new("가을 원피스 롱", 5000, 50),
                KeywordRecord::new("가을 원피스 니트", 3000, 90),
            ],
        ),
        PhraseGroup::from_records(
            "트렌치 코트",
            &[KeywordRecord::new("트렌치 코트 베이지", 2000, 80)],
        ),
        PhraseGroup::from_records("부츠", &[KeywordRecord::new("부츠 롱", 800, 8)]),
        PhraseGroup::from_records("노이즈", &[KeywordRecord::new("잡동사니", 100, 1)]),
    ]
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// 태그가 고루 들어간 2장짜리 템플릿
fn full_template() -> &'static str {
    r#"{
        "slides": [
            {
                "shapes": [
                    {
                        "id": 1,
                        "name": "{{TITLE_AREA}}",
                        "text_frame": {
                            "paragraphs": [{
                                "runs": [{
                                    "text": "{{TITLE_AREA}}",
                                    "font": { "size_pt": 32.0, "bold": true }
                                }]
                            }]
                        }
                    },
                    {
                        "id": 2,
                        "name": "subtitle",
                        "text_frame": {
                            "paragraphs": [{
                                "runs": [{
                                    "text": "{{SUBTITLE1_AREA}}",
                                    "font": { "size_pt": 20.0 }
                                }]
                            }]
                        }
                    },
                    {
                        "id": 3,
                        "name": "body",
                        "text_frame": {
                            "paragraphs": [{ "runs": [{ "text": "{{DESCRIPTION1_AREA}}" }] }]
                        }
                    },
                    {
                        "id": 4,
                        "name": "chart area",
                        "left": 457200,
                        "top": 1371600,
                        "width": 8229600,
                        "height": 5029200,
                        "text_frame": {
                            "paragraphs": [{ "runs": [{ "text": "{{CHART1_AREA}}" }] }]
                        }
                    },
                    {
                        "id": 5,
                        "name": "analysis",
                        "text_frame": {
                            "paragraphs": [{ "runs": [{ "text": "{{ANALYSIS_AREA}}" }] }]
                        }
                    },
                    {
                        "id": 6,
                        "name": "keyword",
                        "text_frame": {
                            "paragraphs": [{ "runs": [{ "text": "{{KEYWORD1_AREA}}" }] }]
                        }
                    }
                ]
            },
            {
                "shapes": [
                    {
                        "id": 1,
                        "name": "plain",
                        "text_frame": {
                            "paragraphs": [{ "runs": [{ "text": "태그 없는 슬라이드" }] }]
                        }
                    }
                ]
            }
        ]
    }"#
}

fn full_tag_config() -> &'static str {
    r#"{
        "TITLE_AREA": {
            "type": "text",
            "prompt_template": "{month} 월간 트렌드 리포트"
        },
        "SUBTITLE1_AREA": {
            "type": "text",
            "prompt_template": "{month} 실데이터 기반",
            "font_size": 16.0
        },
        "DESCRIPTION1_AREA": {
            "type": "text",
            "prompt_template": "{month} 요약: {phrase_info_text}",
            "font_bold": true,
            "length_guideline": { "chars_max": 100 }
        },
        "CHART1_AREA": {
            "type": "chart",
            "chart_type": "bubble",
            "metric": "총 노출"
        },
        "KEYWORD1_AREA": {
            "type": "text",
            "prompt_template": "{month} 핵심 키워드 한 줄"
        }
    }"#
}

#[tokio::test]
async fn fills_template_end_to_end() {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("template.deck.json");
    let tag_config = dir.path().join("tag_config.json");
    let output = dir.path().join("out/report.deck.json");

    write_file(&template, full_template());
    write_file(&tag_config, full_tag_config());

    let generator = ScriptedGenerator::new("생성된 본문");
    generate_report(
        template.to_str().unwrap(),
        output.to_str().unwrap(),
        &sample_groups(),
        month(),
        &generator,
        tag_config.to_str().unwrap(),
        None,
    )
    .await
    .unwrap();

    let deck = Deck::load(&output).unwrap();
    let slide = &deck.slides[0];

    // TITLE: 변수 치환만, 템플릿 서식 유지
    let title = slide.shape_by_id(1).unwrap().text_frame.as_ref().unwrap();
    assert_eq!(title.text(), "10월 월간 트렌드 리포트");
    assert_eq!(title.paragraphs[0].runs[0].font.size_pt, Some(32.0));
    assert_eq!(title.paragraphs[0].runs[0].font.bold, Some(true));

    // SUBTITLE1: 변수 치환 + 설정 서식 덧입힘
    let subtitle = slide.shape_by_id(2).unwrap().text_frame.as_ref().unwrap();
    assert_eq!(subtitle.text(), "10월 실데이터 기반");
    assert_eq!(subtitle.paragraphs[0].runs[0].font.size_pt, Some(16.0));

    // DESCRIPTION1: 생성기 결과 + bold
    let body = slide.shape_by_id(3).unwrap().text_frame.as_ref().unwrap();
    assert_eq!(body.text(), "생성된 본문");
    assert_eq!(body.paragraphs[0].runs[0].font.bold, Some(true));

    // 차트 마커는 제거되고 비노이즈 그룹 수만큼 버블이 생긴다
    assert!(slide.shape_by_id(4).is_none());
    let ovals = slide
        .shapes
        .iter()
        .filter(|s| s.kind == ShapeKind::Oval)
        .count();
    assert_eq!(ovals, 3);

    // 스킵 태그는 그대로
    let analysis = slide.shape_by_id(5).unwrap().text_frame.as_ref().unwrap();
    assert_eq!(analysis.text(), "{{ANALYSIS_AREA}}");

    // KEYWORD1: 사전 생성된 결과 삽입
    let keyword = slide.shape_by_id(6).unwrap().text_frame.as_ref().unwrap();
    assert_eq!(keyword.text(), "생성된 본문");

    // 태그 없는 슬라이드는 손대지 않는다
    let untouched = &deck.slides[1].shapes[0];
    assert_eq!(untouched.text_frame.as_ref().unwrap().text(), "태그 없는 슬라이드");

    // 생성기 호출: KEYWORD1 사전 생성 + DESCRIPTION1, TITLE/SUBTITLE 은 직접 치환
    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].starts_with("10월 핵심 키워드 한 줄"));
    assert!(prompts[1].starts_with("10월 요약: - 가을 원피스"));
    assert!(prompts[1].contains("길이 제한: 최대 100자"));
    assert!(prompts[1].contains("반드시 한국어로만 작성하세요"));
}

#[tokio::test]
async fn failing_tag_does_not_stop_other_tags() {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("template.deck.json");
    let tag_config = dir.path().join("tag_config.json");
    let output = dir.path().join("report.deck.json");

    write_file(
        &template,
        r#"{
            "slides": [{
                "shapes": [
                    {
                        "id": 1,
                        "name": "keyword",
                        "text_frame": { "paragraphs": [{ "runs": [{ "text": "{{KEYWORD1_AREA}}" }] }] }
                    },
                    {
                        "id": 2,
                        "name": "후기",
                        "text_frame": { "paragraphs": [{ "runs": [{ "text": "{{DESCRIPTION2_AREA}}" }] }] }
                    }
                ]
            }]
        }"#,
    );
    write_file(
        &tag_config,
        r#"{
            "KEYWORD1_AREA": { "type": "text", "prompt_template": "KEYWORD_FAIL 지시" },
            "DESCRIPTION2_AREA": { "type": "text", "prompt_template": "{month} 설명" }
        }"#,
    );

    let generator = FailingGenerator::new("KEYWORD_FAIL");
    generate_report(
        template.to_str().unwrap(),
        output.to_str().unwrap(),
        &sample_groups(),
        month(),
        &generator,
        tag_config.to_str().unwrap(),
        None,
    )
    .await
    .unwrap();

    let deck = Deck::load(&output).unwrap();
    let slide = &deck.slides[0];

    // 사전 생성 실패 후 일반 경로 재시도까지 실패해도 마커만 남고 끝난다
    let keyword = slide.shape_by_id(1).unwrap().text_frame.as_ref().unwrap();
    assert_eq!(keyword.text(), "{{KEYWORD1_AREA}}");

    // 다른 태그는 정상 처리
    let description = slide.shape_by_id(2).unwrap().text_frame.as_ref().unwrap();
    assert_eq!(description.text(), "생성된 문장");

    // KEYWORD1 은 사전 생성 1회 + 재시도 1회
    let keyword_calls = generator
        .calls()
        .iter()
        .filter(|p| p.contains("KEYWORD_FAIL"))
        .count();
    assert_eq!(keyword_calls, 2);
}

#[tokio::test]
async fn weather_context_flows_into_prompts() {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("template.deck.json");
    let output = dir.path().join("report.deck.json");

    write_file(
        &template,
        r#"{
            "slides": [{
                "shapes": [{
                    "id": 1,
                    "name": "weather",
                    "text_frame": { "paragraphs": [{ "runs": [{ "text": "{{DESCRIPTION2_AREA}}" }] }] }
                }]
            }]
        }"#,
    );
    let tag_config = dir.path().join("tag_config.json");
    write_file(
        &tag_config,
        r#"{
            "DESCRIPTION2_AREA": {
                "type": "text",
                "prompt_template": "{month} 평균기온 {weather_current_temp}℃, {weather_comparison}"
            }
        }"#,
    );

    let records = vec![
        MonthlyTemp::new("202310", 14.0),
        MonthlyTemp::new("202410", 15.0),
        MonthlyTemp::new("202510", 16.0),
    ];
    let weather = analyze_records(&records, 10, 2025);

    let generator = ScriptedGenerator::new("날씨 문단");
    generate_report(
        template.to_str().unwrap(),
        output.to_str().unwrap(),
        &sample_groups(),
        month(),
        &generator,
        tag_config.to_str().unwrap(),
        Some(weather),
    )
    .await
    .unwrap();

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].starts_with("10월 평균기온 16.0℃, 평균보다 1.0℃ 높았으며"));
}

#[tokio::test]
async fn missing_tag_config_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("template.deck.json");
    let output = dir.path().join("report.deck.json");

    write_file(
        &template,
        r#"{
            "slides": [{
                "shapes": [{
                    "id": 1,
                    "name": "body",
                    "text_frame": { "paragraphs": [{ "runs": [{ "text": "{{DESCRIPTION1_AREA}}" }] }] }
                }]
            }]
        }"#,
    );

    let generator = ScriptedGenerator::new("기본 설정 본문");
    generate_report(
        template.to_str().unwrap(),
        output.to_str().unwrap(),
        &sample_groups(),
        month(),
        &generator,
        dir.path().join("no_such_config.json").to_str().unwrap(),
        None,
    )
    .await
    .unwrap();

    let deck = Deck::load(&output).unwrap();
    let body = deck.slides[0].shapes[0].text_frame.as_ref().unwrap();
    assert_eq!(body.text(), "기본 설정 본문");
}

#[tokio::test]
async fn missing_template_is_an_error() {
    let dir = TempDir::new().unwrap();
    let generator = ScriptedGenerator::new("무관");

    let result = generate_report(
        dir.path().join("no_template.deck.json").to_str().unwrap(),
        dir.path().join("out.deck.json").to_str().unwrap(),
        &sample_groups(),
        month(),
        &generator,
        dir.path().join("no_config.json").to_str().unwrap(),
        None,
    )
    .await;

    assert!(result.is_err());
    assert!(generator.prompts().is_empty());
}
