//! clap 기반 명령줄 정의

use clap::{Parser, Subcommand};

/// trendpress - 월간 트렌드 리포트 덱 자동 생성기
#[derive(Parser)]
#[command(name = "trendpress")]
#[command(version)]
#[command(about = "검색 키워드 데이터로 월간 트렌드 리포트 덱을 만든다", long_about = None)]
pub struct Cli {
    /// 설정 TOML 파일 경로 (기본: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// 사용 가능한 명령
#[derive(Subcommand)]
pub enum Commands {
    /// 전체 파이프라인 실행: 데이터 처리 → 기상 분석 → 리포트 생성 (기본 명령)
    Generate,

    /// 실행 전 준비 상태 점검 (입력 파일, API 키)
    Check,

    /// 템플릿 덱에서 발견되는 태그 나열
    Tags {
        /// 덱 JSON 경로 (기본: 설정의 template_path)
        deck: Option<String>,
    },

    /// 기상 데이터 수집과 분석만 실행
    Weather {
        /// 캐시를 무시하고 다시 수집
        #[arg(long)]
        refresh: bool,
    },

    /// 데이터 처리(전처리 + 클러스터링)만 실행
    ProcessData,

    /// 설정 관리
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// 설정 관리 명령
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// 예시 설정 파일 생성
    Generate {
        /// 출력 경로 (기본: config.example.toml)
        output_path: Option<String>,

        /// 확인 없이 덮어쓰기
        #[arg(long)]
        force: bool,
    },

    /// 현재 설정 출력 (API 키는 가려서 보여준다)
    Show,
}
