//! trendpress - 월간 트렌드 리포트 덱 자동 생성기
//!
//! 검색 키워드 CSV를 프레이즈 단위로 묶고, 기상청 통계와 Gemini 생성 문구를
//! 더해 덱 JSON 템플릿의 `{{태그}}` 마커를 채운다.
//!
//! # 구성
//! - `data`: CSV 전처리와 프레이즈 클러스터링
//! - `weather`: 기상청(KMA) 월평균기온 수집과 20년 비교 분석
//! - `textgen`: 프롬프트 조립과 Gemini 텍스트 생성
//! - `chart`: 버블 차트 레이아웃과 도형 삽입
//! - `deck`: 덱 JSON 모델 (슬라이드, 도형, 텍스트 프레임)
//! - `report`: 태그 탐색과 슬라이드 채우기
//! - `pipeline`: 데이터 처리 → 기상 분석 → 리포트 생성 전체 흐름
//! - `interfaces`: CLI
//! - `config`: 설정 관리
//! - `system`: 로깅 초기화

pub mod chart;
pub mod cli;
pub mod config;
pub mod data;
pub mod deck;
pub mod errors;
pub mod interfaces;
pub mod net;
pub mod pipeline;
pub mod report;
pub mod system;
pub mod textgen;
pub mod utils;
pub mod weather;
