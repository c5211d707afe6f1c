//! 태그 설정과 태그 탐지
//!
//! 템플릿 도형 이름이나 텍스트에 들어 있는 `{{TAG_NAME}}` 마커를 찾고,
//! 태그별 처리 방법(타입, 프롬프트, 서식, 차트 옵션)을 JSON 설정에서 읽는다.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use crate::deck::{Rgb, Slide};
use crate::errors::Result;

static TAG_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{(\w+)\}\}").unwrap());

/// 태그 처리 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagKind {
    #[default]
    Text,
    Chart,
    List,
    Asset,
    Composite,
}

impl TagKind {
    /// 설정 문자열 해석. 모르는 값은 text 취급.
    pub fn parse(s: &str) -> TagKind {
        match s.trim().to_ascii_lowercase().as_str() {
            "chart" => TagKind::Chart,
            "list" => TagKind::List,
            "asset" => TagKind::Asset,
            "composite" => TagKind::Composite,
            _ => TagKind::Text,
        }
    }
}

impl std::fmt::Display for TagKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagKind::Text => write!(f, "text"),
            TagKind::Chart => write!(f, "chart"),
            TagKind::List => write!(f, "list"),
            TagKind::Asset => write!(f, "asset"),
            TagKind::Composite => write!(f, "composite"),
        }
    }
}

/// 생성 텍스트의 길이 가이드라인
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LengthGuideline {
    pub chars_max: Option<u32>,
    pub chars_approx: Option<u32>,
    pub lines: Option<u32>,
    pub lines_max: Option<u32>,
}

impl LengthGuideline {
    /// "최대 100자, 약 80자, 2줄" 형태의 안내문. 모두 비어 있으면 None.
    pub fn render(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(n) = self.chars_max {
            parts.push(format!("최대 {}자", n));
        }
        if let Some(n) = self.chars_approx {
            parts.push(format!("약 {}자", n));
        }
        if let Some(n) = self.lines {
            parts.push(format!("{}줄", n));
        }
        if let Some(n) = self.lines_max {
            parts.push(format!("최대 {}줄", n));
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// 태그 하나의 설정
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TagSettings {
    #[serde(rename = "type")]
    pub tag_type: Option<String>,
    pub prompt_template: String,
    pub font_size: Option<f32>,
    pub font_bold: Option<bool>,
    /// [r, g, b] 배열
    pub font_color: Option<Rgb>,
    pub alignment: Option<String>,
    pub length_guideline: LengthGuideline,
    /// 차트 종류. 예전 표기 chart_type 도 받는다.
    #[serde(alias = "chart_type")]
    pub chart_kind: Option<String>,
    pub metric: Option<String>,
    pub top_n: Option<usize>,
    pub color_metric: Option<String>,
    /// 슬라이드 없이 차트를 그릴 때 레이아웃을 쓸 경로
    pub output_path: Option<String>,
}

impl TagSettings {
    pub fn kind(&self) -> TagKind {
        self.tag_type
            .as_deref()
            .map(TagKind::parse)
            .unwrap_or_default()
    }
}

/// 태그 이름 -> 설정
pub type TagConfig = HashMap<String, TagSettings>;

/// 태그 설정 JSON 로드. 파일이 없으면 경고 후 빈 설정으로 진행한다.
pub fn load_tag_config<P: AsRef<Path>>(path: P) -> Result<TagConfig> {
    let path = path.as_ref();
    if !path.exists() {
        warn!("태그 설정 파일이 없습니다: {}. 빈 설정으로 진행합니다.", path.display());
        return Ok(TagConfig::new());
    }
    let content = fs::read_to_string(path)?;
    let config: TagConfig = serde_json::from_str(&content)?;
    Ok(config)
}

/// 태그가 발견된 위치
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagSource {
    /// 도형 이름
    ShapeName,
    /// 텍스트 프레임 내용
    Text,
}

impl std::fmt::Display for TagSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagSource::ShapeName => write!(f, "name"),
            TagSource::Text => write!(f, "text"),
        }
    }
}

/// 슬라이드에서 발견한 태그 하나
#[derive(Debug, Clone)]
pub struct FoundTag {
    pub tag: String,
    pub shape_id: u32,
    pub source: TagSource,
    /// 발견 당시의 도형 이름 또는 전체 텍스트
    pub original_text: String,
}

/// `{{TAG}}` 마커 문자열
pub fn marker_token(tag: &str) -> String {
    format!("{{{{{}}}}}", tag)
}

/// 슬라이드의 도형 이름과 텍스트에서 태그를 모두 찾는다.
/// 같은 도형에서 같은 태그가 이름과 텍스트 양쪽에 걸리면 한 번만 기록한다.
pub fn find_tags_in_slide(slide: &Slide) -> Vec<FoundTag> {
    let mut tags = Vec::new();
    let mut seen: HashSet<(String, u32)> = HashSet::new();

    for shape in &slide.shapes {
        for caps in TAG_PATTERN.captures_iter(&shape.name) {
            let tag = caps[1].to_string();
            if seen.insert((tag.clone(), shape.id)) {
                tags.push(FoundTag {
                    tag,
                    shape_id: shape.id,
                    source: TagSource::ShapeName,
                    original_text: shape.name.clone(),
                });
            }
        }

        if let Some(frame) = &shape.text_frame {
            let text = frame.text();
            for caps in TAG_PATTERN.captures_iter(&text) {
                let tag = caps[1].to_string();
                if seen.insert((tag.clone(), shape.id)) {
                    tags.push(FoundTag {
                        tag,
                        shape_id: shape.id,
                        source: TagSource::Text,
                        original_text: text.clone(),
                    });
                }
            }
        }
    }

    tags
}
