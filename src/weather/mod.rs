//! 기상청(KMA) 월 기온 수집과 분석
//!
//! sts_ta 허브 API에서 월평균기온(TA_MAVG)을 연월 단위로 수집해 CSV로
//! 캐시하고, 해당 월의 과거 20년치와 비교해 편차/순위 통계를 만든다.
//! 수집 실패는 월 단위로 건너뛰므로 일부 누락이 전체를 막지 않는다.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::KmaConfig;
use crate::errors::{Result, TrendpressError};
use crate::net::retry::{RetryConfig, with_retry};
use crate::net::{FetchError, http_agent};
use crate::utils::Month;
use crate::utils::numbers::round1;

/// 한 달치 관측값. TM은 "YYYYMM" 연월 문자열.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTemp {
    #[serde(rename = "TM")]
    pub tm: String,
    #[serde(rename = "TA_MAVG")]
    pub ta_mavg: f64,
}

impl MonthlyTemp {
    pub fn new<S: Into<String>>(tm: S, ta_mavg: f64) -> Self {
        Self {
            tm: tm.into(),
            ta_mavg,
        }
    }

    /// TM 앞 4자리를 연도로 해석. 형식이 깨졌으면 None.
    pub fn year(&self) -> Option<i32> {
        self.tm.get(0..4)?.parse().ok()
    }
}

/// 기온 비교 통계 (모두 소수 첫째 자리 반올림)
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherStats {
    pub current_temp: f64,
    pub historical_avg: f64,
    pub normal_avg: f64,
    pub diff_from_avg: f64,
    pub diff_from_normal: f64,
    pub pct_diff_from_avg: f64,
    pub pct_diff_from_normal: f64,
    pub max_temp: f64,
    pub min_temp: f64,
    /// 더운 순서 1위부터
    pub rank: usize,
    pub total_years: usize,
}

/// 기상 분석 결과. stats가 없으면 분석 불가 상태이며 사유가 error에 담긴다.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherAnalysis {
    pub year: i32,
    pub month: u32,
    pub stats: Option<WeatherStats>,
    pub error: Option<String>,
    /// 올해 데이터만 없을 때 대신 제공하는 과거 평균
    pub historical_avg: Option<f64>,
}

impl WeatherAnalysis {
    pub fn is_available(&self) -> bool {
        self.stats.is_some()
    }
}

/// sts_ta 응답 본문에서 TM/TA_MAVG 한 건 추출
///
/// 첫 줄이 '#'로 시작하는 헤더, 둘째 줄이 값이다. 공백으로 나눈 뒤
/// 짧은 쪽 길이에 맞춰 자르고, 두 컬럼 중 하나라도 없으면 None.
pub(crate) fn parse_sts_ta(body: &str) -> Option<MonthlyTemp> {
    let mut lines = body.trim().lines();
    let header_line = lines.next()?;
    let value_line = lines.next()?;

    let headers: Vec<&str> = header_line.trim_start_matches('#').split_whitespace().collect();
    let values: Vec<&str> = value_line.split_whitespace().collect();
    let width = headers.len().min(values.len());
    let headers = &headers[..width];
    let values = &values[..width];

    let tm_idx = headers.iter().position(|h| *h == "TM")?;
    let ta_idx = headers.iter().position(|h| *h == "TA_MAVG")?;

    let tm = values.get(tm_idx)?.to_string();
    let ta_mavg: f64 = values.get(ta_idx)?.parse().ok()?;

    Some(MonthlyTemp { tm, ta_mavg })
}

/// 대상 월만 남기고 최근 years_back년 범위로 거르기
pub fn filter_month_window(
    records: &[MonthlyTemp],
    month: u32,
    current_year: i32,
    years_back: usize,
) -> Vec<MonthlyTemp> {
    let suffix = format!("{:02}", month);
    let min_year = current_year - years_back as i32 + 1;

    records
        .iter()
        .filter(|r| r.tm.ends_with(&suffix) && r.tm.len() == 6)
        .filter(|r| r.year().is_some_and(|y| y >= min_year))
        .cloned()
        .collect()
}

/// 걸러진 월 데이터로 통계 계산. 순수 함수라 네트워크 없이 검증 가능.
pub fn analyze_records(records: &[MonthlyTemp], month: u32, current_year: i32) -> WeatherAnalysis {
    if records.is_empty() {
        return WeatherAnalysis {
            year: current_year,
            month,
            stats: None,
            error: Some("기상 데이터를 가져올 수 없습니다.".to_string()),
            historical_avg: None,
        };
    }

    let mean = records.iter().map(|r| r.ta_mavg).sum::<f64>() / records.len() as f64;

    let current_tm = format!("{}{:02}", current_year, month);
    let Some(current) = records.iter().find(|r| r.tm == current_tm) else {
        return WeatherAnalysis {
            year: current_year,
            month,
            stats: None,
            error: Some(format!("{}년 {}월 데이터가 없습니다.", current_year, month)),
            historical_avg: Some(round1(mean)),
        };
    };

    let current_temp = current.ta_mavg;
    // 예년 평균도 가용 데이터 전체 평균을 쓴다 (별도 평년값 API 미사용)
    let normal_avg = mean;
    let diff_from_avg = current_temp - mean;
    let diff_from_normal = current_temp - normal_avg;
    let pct_diff_from_avg = if mean != 0.0 {
        diff_from_avg / mean * 100.0
    } else {
        0.0
    };
    let pct_diff_from_normal = if normal_avg != 0.0 {
        diff_from_normal / normal_avg * 100.0
    } else {
        0.0
    };

    let max_temp = records.iter().map(|r| r.ta_mavg).fold(f64::MIN, f64::max);
    let min_temp = records.iter().map(|r| r.ta_mavg).fold(f64::MAX, f64::min);

    let mut ranked: Vec<&MonthlyTemp> = records.iter().collect();
    ranked.sort_by(|a, b| b.ta_mavg.partial_cmp(&a.ta_mavg).unwrap_or(Ordering::Equal));
    let rank = ranked
        .iter()
        .position(|r| r.tm == current_tm)
        .map_or(records.len(), |p| p + 1);

    WeatherAnalysis {
        year: current_year,
        month,
        stats: Some(WeatherStats {
            current_temp: round1(current_temp),
            historical_avg: round1(mean),
            normal_avg: round1(normal_avg),
            diff_from_avg: round1(diff_from_avg),
            diff_from_normal: round1(diff_from_normal),
            pct_diff_from_avg: round1(pct_diff_from_avg),
            pct_diff_from_normal: round1(pct_diff_from_normal),
            max_temp: round1(max_temp),
            min_temp: round1(min_temp),
            rank,
            total_years: records.len(),
        }),
        error: None,
        historical_avg: None,
    }
}

/// KMA 수집기 + 분석기
pub struct WeatherAnalyzer {
    api_key: String,
    stn_id: String,
    base_url: String,
    cache_dir: PathBuf,
    start_year: i32,
    years_back: usize,
    pacing: Duration,
    retry: RetryConfig,
}

impl WeatherAnalyzer {
    pub fn from_config(config: &KmaConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            stn_id: config.stn_id.clone(),
            base_url: config.base_url.clone(),
            cache_dir: PathBuf::from(&config.cache_dir),
            start_year: config.start_year,
            years_back: config.years_back,
            pacing: Duration::from_millis(config.pacing_ms),
            retry: RetryConfig {
                max_retries: config.retry_count,
                base_delay_ms: config.retry_base_delay_ms,
                max_delay_ms: config.retry_max_delay_ms,
            },
        }
    }

    /// 지점별 캐시 파일 경로
    pub fn cache_path(&self) -> PathBuf {
        self.cache_dir
            .join(format!("weather_data_stn{}.csv", self.stn_id))
    }

    fn monthly_url(&self, year: i32, month: u32) -> String {
        let tm = format!("{}{:02}", year, month);
        format!(
            "{}?tm1={}&tm2={}&stn_id={}&help=0&disp=1&authKey={}",
            self.base_url,
            tm,
            tm,
            urlencoding::encode(&self.stn_id),
            urlencoding::encode(&self.api_key)
        )
    }

    fn fetch_text_sync(url: &str) -> std::result::Result<String, FetchError> {
        let agent = http_agent();
        let response = agent.get(url).call().map_err(|e| FetchError::transport(&e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::status(status.as_u16()));
        }
        response.into_body().read_to_string().map_err(|e| FetchError {
            retryable: false,
            message: format!("응답 본문 읽기 실패: {}", e),
        })
    }

    /// 한 달치 기온 조회. 응답에 데이터가 없으면 Ok(None).
    pub async fn fetch_monthly_temp(&self, year: i32, month: u32) -> Result<Option<MonthlyTemp>> {
        let url = self.monthly_url(year, month);
        let name = format!("kma {}-{:02}", year, month);

        let body = with_retry(
            &name,
            self.retry,
            || {
                let url = url.clone();
                async move {
                    tokio::task::spawn_blocking(move || Self::fetch_text_sync(&url))
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
        .map_err(|e| {
            TrendpressError::weather_api(format!("{}년 {}월 기온 조회 실패: {}", year, month, e))
        })?;

        Ok(parse_sts_ta(&body))
    }

    fn read_cache(&self, path: &Path) -> Result<Vec<MonthlyTemp>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(TrendpressError::from)?;

        let mut records = Vec::new();
        for row in reader.deserialize::<MonthlyTemp>() {
            records.push(row.map_err(TrendpressError::from)?);
        }
        Ok(records)
    }

    fn write_cache(&self, path: &Path, records: &[MonthlyTemp]) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(path).map_err(TrendpressError::from)?;
        for record in records {
            writer.serialize(record).map_err(TrendpressError::from)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// 캐시가 있으면 캐시에서, 없으면 수집 시작 연도부터 이번 달까지 전부 수집
    pub async fn load_or_fetch_all(&self, force_refresh: bool) -> Result<Vec<MonthlyTemp>> {
        let cache = self.cache_path();

        if !force_refresh && cache.exists() {
            match self.read_cache(&cache) {
                Ok(records) => {
                    info!("기온 캐시 로드: {} ({}건)", cache.display(), records.len());
                    return Ok(records);
                }
                Err(e) => {
                    warn!("기온 캐시를 읽지 못해 다시 수집합니다: {}", e);
                }
            }
        }

        let now = Local::now();
        let current_year = now.year();
        let current_month = now.month();
        let total_months = (current_year - self.start_year) as u64 * 12 + current_month as u64;
        info!(
            "기온 데이터 수집 시작: {}년 1월 ~ {}년 {}월 (지점 {})",
            self.start_year, current_year, current_month, self.stn_id
        );

        let mut records = Vec::new();
        for year in self.start_year..=current_year {
            for month in 1..=12u32 {
                if year == current_year && month > current_month {
                    break;
                }

                match self.fetch_monthly_temp(year, month).await {
                    Ok(Some(record)) => {
                        records.push(record);
                        if records.len() % 12 == 0 {
                            info!("수집 진행: {}/{}개월", records.len(), total_months);
                        }
                    }
                    Ok(None) => debug!("{}년 {}월: 관측값 없음", year, month),
                    Err(e) => warn!("{}년 {}월 수집 건너뜀: {}", year, month, e),
                }

                // 허브 API 과부하 방지 간격
                tokio::time::sleep(self.pacing).await;
            }
        }

        if records.is_empty() {
            warn!("수집된 기온 데이터가 없습니다");
            return Ok(records);
        }

        self.write_cache(&cache, &records)?;
        info!("기온 캐시 저장: {} ({}건)", cache.display(), records.len());
        Ok(records)
    }

    /// 대상 월의 기온 분석 실행
    pub async fn analyze(
        &self,
        month: Month,
        current_year: i32,
        force_refresh: bool,
    ) -> Result<WeatherAnalysis> {
        let all = self.load_or_fetch_all(force_refresh).await?;
        let window = filter_month_window(&all, month.number(), current_year, self.years_back);
        debug!(
            "{} 분석 대상: {}개 연도 (전체 {}건)",
            month,
            window.len(),
            all.len()
        );
        Ok(analyze_records(&window, month.number(), current_year))
    }
}
