use serde::{Deserialize, Serialize};

/// 정적 설정 (TOML 파일 + 환경 변수)
///
/// 우선순위: ENV > config.toml > 기본값
/// ENV 프리픽스: TP, 구분자: __
/// 예: TP__GEMINI__API_KEY=..., TP__REPORT__MONTH=10월
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub kma: KmaConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// TOML 파일과 환경 변수에서 설정 로드
    ///
    /// 경로를 지정하지 않으면 config.toml 을 찾는다.
    pub fn load(path: Option<&str>) -> Self {
        use config::{Config, Environment, File};

        let path = path.unwrap_or("config.toml");

        let builder = Config::builder()
            // 1. TOML 파일 (없어도 무방)
            .add_source(File::with_name(path).required(false))
            // 2. 환경 변수 오버라이드, 프리픽스 TP, 구분자 __
            .add_source(
                Environment::with_prefix("TP")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config = match builder.build() {
            Ok(settings) => match settings.try_deserialize::<AppConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        };

        config.apply_legacy_env();
        config
    }

    /// 프리픽스 없는 레거시 환경 변수(GEMINI_API_KEY, KMA_API_KEY)도 인정한다.
    fn apply_legacy_env(&mut self) {
        if self.gemini.api_key.is_empty()
            && let Ok(key) = std::env::var("GEMINI_API_KEY")
        {
            self.gemini.api_key = key;
        }
        if self.kma.api_key.is_empty()
            && let Ok(key) = std::env::var("KMA_API_KEY")
        {
            self.kma.api_key = key;
        }
    }

    /// 예시 TOML 설정 문자열 생성
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 현재 설정을 TOML 파일로 저장
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> crate::errors::Result<()> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 보고서 생성 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// 보고서 대상 월, "10월" 형태
    #[serde(default = "default_month")]
    pub month: String,
    #[serde(default = "default_template_path")]
    pub template_path: String,
    #[serde(default = "default_tag_config_path")]
    pub tag_config_path: String,
    /// 완성된 덱 JSON을 쓸 경로
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

/// 키워드 데이터 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_csv_path")]
    pub csv_path: String,
    /// 프레이즈 그룹 JSON 경로. 파일이 이미 있으면 클러스터링을 건너뛴다.
    #[serde(default = "default_json_output_path")]
    pub json_output_path: String,
    #[serde(default = "default_min_cluster_size")]
    pub min_cluster_size: usize,
}

/// Gemini API 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API 키. 기본값 없음, TP__GEMINI__API_KEY 또는 GEMINI_API_KEY 로 주입
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_gemini_endpoint")]
    pub endpoint: String,
}

/// 기상청(KMA) API 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KmaConfig {
    /// API 키. 기본값 없음, TP__KMA__API_KEY 또는 KMA_API_KEY 로 주입
    #[serde(default)]
    pub api_key: String,
    /// 관측 지점 번호 (서울 108)
    #[serde(default = "default_kma_stn_id")]
    pub stn_id: String,
    #[serde(default = "default_kma_base_url")]
    pub base_url: String,
    /// 월별 기온 CSV 캐시를 둘 디렉터리
    #[serde(default = "default_kma_cache_dir")]
    pub cache_dir: String,
    /// 수집 시작 연도
    #[serde(default = "default_kma_start_year")]
    pub start_year: i32,
    /// 분석에 쓸 과거 연수
    #[serde(default = "default_kma_years_back")]
    pub years_back: usize,
    /// 연속 요청 사이 간격 (ms)
    #[serde(default = "default_kma_pacing_ms")]
    pub pacing_ms: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 로그 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_month() -> String {
    "10월".to_string()
}

fn default_template_path() -> String {
    "templates/report_template.deck.json".to_string()
}

fn default_tag_config_path() -> String {
    "tag_config.json".to_string()
}

fn default_output_path() -> String {
    "output/trend_report.deck.json".to_string()
}

fn default_csv_path() -> String {
    "data/keyword_data.csv".to_string()
}

fn default_json_output_path() -> String {
    "data/phrase_groups.json".to_string()
}

fn default_min_cluster_size() -> usize {
    5
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash-lite".to_string()
}

fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_kma_stn_id() -> String {
    "108".to_string()
}

fn default_kma_base_url() -> String {
    "https://apihub.kma.go.kr/api/typ01/url/sts_ta.php".to_string()
}

fn default_kma_cache_dir() -> String {
    "data".to_string()
}

fn default_kma_start_year() -> i32 {
    2000
}

fn default_kma_years_back() -> usize {
    20
}

fn default_kma_pacing_ms() -> u64 {
    300
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    500
}

fn default_retry_max_delay_ms() -> u64 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_file() -> Option<String> {
    None
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            month: default_month(),
            template_path: default_template_path(),
            tag_config_path: default_tag_config_path(),
            output_path: default_output_path(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            json_output_path: default_json_output_path(),
            min_cluster_size: default_min_cluster_size(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_gemini_model(),
            endpoint: default_gemini_endpoint(),
        }
    }
}

impl Default for KmaConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            stn_id: default_kma_stn_id(),
            base_url: default_kma_base_url(),
            cache_dir: default_kma_cache_dir(),
            start_year: default_kma_start_year(),
            years_back: default_kma_years_back(),
            pacing_ms: default_kma_pacing_ms(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: default_log_file(),
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
