use std::fmt;

#[derive(Debug, Clone)]
pub enum TrendpressError {
    Config(String),
    FileOperation(String),
    CsvParse(String),
    Serialization(String),
    Validation(String),
    NotFound(String),
    DateParse(String),
    WeatherApi(String),
    LlmApi(String),
    Template(String),
    Report(String),
}

impl TrendpressError {
    /// 에러 코드
    pub fn code(&self) -> &'static str {
        match self {
            TrendpressError::Config(_) => "E001",
            TrendpressError::FileOperation(_) => "E002",
            TrendpressError::CsvParse(_) => "E003",
            TrendpressError::Serialization(_) => "E004",
            TrendpressError::Validation(_) => "E005",
            TrendpressError::NotFound(_) => "E006",
            TrendpressError::DateParse(_) => "E007",
            TrendpressError::WeatherApi(_) => "E008",
            TrendpressError::LlmApi(_) => "E009",
            TrendpressError::Template(_) => "E010",
            TrendpressError::Report(_) => "E011",
        }
    }

    /// 에러 타입 이름
    pub fn error_type(&self) -> &'static str {
        match self {
            TrendpressError::Config(_) => "Configuration Error",
            TrendpressError::FileOperation(_) => "File Operation Error",
            TrendpressError::CsvParse(_) => "CSV Parse Error",
            TrendpressError::Serialization(_) => "Serialization Error",
            TrendpressError::Validation(_) => "Validation Error",
            TrendpressError::NotFound(_) => "Resource Not Found",
            TrendpressError::DateParse(_) => "Date Parse Error",
            TrendpressError::WeatherApi(_) => "Weather API Error",
            TrendpressError::LlmApi(_) => "LLM API Error",
            TrendpressError::Template(_) => "Template Error",
            TrendpressError::Report(_) => "Report Generation Error",
        }
    }

    /// 에러 상세 메시지
    pub fn message(&self) -> &str {
        match self {
            TrendpressError::Config(msg) => msg,
            TrendpressError::FileOperation(msg) => msg,
            TrendpressError::CsvParse(msg) => msg,
            TrendpressError::Serialization(msg) => msg,
            TrendpressError::Validation(msg) => msg,
            TrendpressError::NotFound(msg) => msg,
            TrendpressError::DateParse(msg) => msg,
            TrendpressError::WeatherApi(msg) => msg,
            TrendpressError::LlmApi(msg) => msg,
            TrendpressError::Template(msg) => msg,
            TrendpressError::Report(msg) => msg,
        }
    }

    /// 컬러 출력 포맷
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 단순 출력 포맷
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for TrendpressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for TrendpressError {}

// 편의 생성자
impl TrendpressError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        TrendpressError::Config(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        TrendpressError::FileOperation(msg.into())
    }

    pub fn csv_parse<T: Into<String>>(msg: T) -> Self {
        TrendpressError::CsvParse(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        TrendpressError::Serialization(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        TrendpressError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        TrendpressError::NotFound(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        TrendpressError::DateParse(msg.into())
    }

    pub fn weather_api<T: Into<String>>(msg: T) -> Self {
        TrendpressError::WeatherApi(msg.into())
    }

    pub fn llm_api<T: Into<String>>(msg: T) -> Self {
        TrendpressError::LlmApi(msg.into())
    }

    pub fn template<T: Into<String>>(msg: T) -> Self {
        TrendpressError::Template(msg.into())
    }

    pub fn report<T: Into<String>>(msg: T) -> Self {
        TrendpressError::Report(msg.into())
    }
}

impl From<std::io::Error> for TrendpressError {
    fn from(err: std::io::Error) -> Self {
        TrendpressError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for TrendpressError {
    fn from(err: serde_json::Error) -> Self {
        TrendpressError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for TrendpressError {
    fn from(err: csv::Error) -> Self {
        TrendpressError::CsvParse(err.to_string())
    }
}

impl From<chrono::ParseError> for TrendpressError {
    fn from(err: chrono::ParseError) -> Self {
        TrendpressError::DateParse(err.to_string())
    }
}

impl From<toml::ser::Error> for TrendpressError {
    fn from(err: toml::ser::Error) -> Self {
        TrendpressError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TrendpressError>;
