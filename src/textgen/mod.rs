//! LLM 텍스트 생성
//!
//! Gemini generateContent 엔드포인트를 사용한다. 생성기는 트레이트 뒤에
//! 두어 리포트 생성 로직을 네트워크 없이 검증할 수 있게 한다.

pub mod markdown;
pub mod prompt;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::config::GeminiConfig;
use crate::data::{Metric, PhraseGroup, top_groups_by};
use crate::errors::{Result, TrendpressError};
use crate::net::retry::{RetryConfig, with_retry};
use crate::net::{FetchError, http_agent};
use crate::utils::Month;

pub use markdown::{clean_markdown, strip_outer_quotes};
pub use prompt::SlideContext;

use prompt::{build_prompt, insight_title_prompt};

/// 모든 프롬프트 끝에 붙는 한국어 강제 지시문
const KOREAN_ONLY_SUFFIX: &str =
    "\n\n중요: 반드시 한국어로만 작성하세요. 영어나 다른 언어를 사용하지 마세요.";

/// 텍스트 생성기 추상화
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// 프롬프트 하나로 텍스트 한 편 생성
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// 로그용 생성기 이름
    fn name(&self) -> &'static str;
}

/// Gemini API 클라이언트
pub struct GeminiClient {
    api_key: String,
    model: String,
    endpoint: String,
    retry: RetryConfig,
}

impl GeminiClient {
    pub fn from_config(config: &GeminiConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(TrendpressError::config(
                "Gemini API 키가 없습니다. TP__GEMINI__API_KEY 또는 GEMINI_API_KEY 를 설정하세요.",
            ));
        }
        Ok(Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            retry: RetryConfig::default(),
        })
    }

    fn request_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.endpoint,
            self.model,
            urlencoding::encode(&self.api_key)
        )
    }

    /// 동기 POST. spawn_blocking 안에서 호출된다.
    fn post_sync(url: &str, body: Value) -> std::result::Result<String, FetchError> {
        let agent = http_agent();
        let response = agent
            .post(url)
            .send_json(body)
            .map_err(|e| FetchError::transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::status(status.as_u16()));
        }

        let parsed: Value = response.into_body().read_json().map_err(|e| FetchError {
            retryable: false,
            message: format!("응답 파싱 실패: {}", e),
        })?;

        extract_candidate_text(&parsed).ok_or_else(|| FetchError {
            retryable: false,
            message: "응답에 생성된 텍스트가 없습니다".to_string(),
        })
    }
}

/// candidates[0].content.parts[*].text 이어붙이기
fn extract_candidate_text(value: &Value) -> Option<String> {
    let parts = value
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();

    if text.trim().is_empty() { None } else { Some(text) }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = self.request_url();
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let text = with_retry(
            "gemini generateContent",
            self.retry,
            || {
                let url = url.clone();
                let body = body.clone();
                async move {
                    tokio::task::spawn_blocking(move || Self::post_sync(&url, body))
                        .await
                        .map_err(|e| FetchError {
                            retryable: false,
                            message: format!("작업 합류 실패: {}", e),
                        })?
                }
            },
            |e: &FetchError| e.retryable,
        )
        .await
        .map_err(|e| TrendpressError::llm_api(format!("Gemini 호출 실패: {}", e)))?;

        Ok(text)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

/// 태그 하나의 텍스트 생성 단계 전체
///
/// 인사이트 계열 태그는 먼저 타이틀을 만들어 컨텍스트에 저장한 뒤
/// 본문 프롬프트를 치환한다. 길이 가이드라인과 한국어 지시문을 붙이고,
/// 응답에서 마크다운을 벗겨 돌려준다.
pub async fn generate_for_tag(
    generator: &dyn TextGenerator,
    tag_name: &str,
    groups: &[PhraseGroup],
    month: Month,
    prompt_template: &str,
    length_guideline: Option<&str>,
    ctx: &mut SlideContext,
) -> Result<String> {
    if (tag_name == "INSIGHT1_AREA" || tag_name == "INSIGHT_TITLE_AREA")
        && ctx.insight_title.is_none()
    {
        let exposure = top_groups_by(groups, Metric::Impressions, 5);
        if !exposure.is_empty() {
            let ctr = top_groups_by(groups, Metric::Ctr, 5);
            let exposure_names = exposure
                .iter()
                .map(|g| g.phrase.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let ctr_names = ctr
                .iter()
                .map(|g| g.phrase.as_str())
                .collect::<Vec<_>>()
                .join(", ");

            info!("인사이트 타이틀 생성 중 ({})", generator.name());
            let raw = generator
                .generate(&insight_title_prompt(month, &exposure_names, &ctr_names))
                .await?;
            let title = strip_outer_quotes(&clean_markdown(&raw)).to_string();
            info!("인사이트 타이틀: {}", title);
            ctx.insight_title = Some(title);
        }
    }

    let mut full_prompt = build_prompt(tag_name, groups, month, prompt_template, ctx);
    if let Some(guideline) = length_guideline
        && !guideline.is_empty()
    {
        full_prompt.push_str("\n\n길이 제한: ");
        full_prompt.push_str(guideline);
    }
    full_prompt.push_str(KOREAN_ONLY_SUFFIX);

    debug!("텍스트 생성 중: {}", tag_name);
    let raw = generator.generate(&full_prompt).await?;
    Ok(clean_markdown(&raw))
}
