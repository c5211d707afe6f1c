//! JSON 덱 모델
//!
//! 보고서 문서 포맷. 슬라이드 안에 도형이 있고 도형 안에 텍스트 프레임이
//! 있는 구조를 그대로 JSON 으로 적는다. 좌표와 크기는 EMU, 글꼴 크기는
//! 포인트 단위.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, TrendpressError};

pub const EMU_PER_INCH: i64 = 914_400;
pub const EMU_PER_POINT: i64 = 12_700;

/// English Metric Unit 길이
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Emu(pub i64);

impl Emu {
    pub fn from_inches(inches: f64) -> Self {
        Emu((inches * EMU_PER_INCH as f64).round() as i64)
    }

    pub fn from_points(points: f64) -> Self {
        Emu((points * EMU_PER_POINT as f64).round() as i64)
    }

    pub fn inches(self) -> f64 {
        self.0 as f64 / EMU_PER_INCH as f64
    }

    pub fn points(self) -> f64 {
        self.0 as f64 / EMU_PER_POINT as f64
    }
}

/// RGB 색. JSON 에는 [r, g, b] 배열로 적는다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// 상대 휘도, 0~255 스케일
    pub fn luminance(self) -> f64 {
        0.2126 * self.0 as f64 + 0.7152 * self.1 as f64 + 0.0722 * self.2 as f64
    }
}

/// 도형 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Textbox,
    Oval,
}

/// 문단 정렬
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
    Justify,
}

impl Align {
    /// 태그 설정에 적힌 문자열 표기를 해석한다. 모르는 값은 None.
    pub fn parse(s: &str) -> Option<Align> {
        match s.to_lowercase().as_str() {
            "left" => Some(Align::Left),
            "center" => Some(Align::Center),
            "right" => Some(Align::Right),
            "justify" => Some(Align::Justify),
            _ => None,
        }
    }
}

/// 런 단위 글꼴 속성. None 인 속성은 템플릿 서식을 유지한다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Font {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_pt: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
}

impl Font {
    fn is_unset(&self) -> bool {
        self.size_pt.is_none() && self.bold.is_none() && self.color.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    #[serde(default, skip_serializing_if = "Font::is_unset")]
    pub font: Font,
}

impl Run {
    pub fn new<T: Into<String>>(text: T) -> Self {
        Run {
            text: text.into(),
            font: Font::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    #[serde(default)]
    pub runs: Vec<Run>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Align>,
}

impl Paragraph {
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextFrame {
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub word_wrap: bool,
}

impl TextFrame {
    /// 전체 텍스트. 문단은 개행으로 잇는다.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// 문단을 모두 비우고 빈 문단 하나만 남긴다.
    pub fn clear(&mut self) {
        self.paragraphs = vec![Paragraph::default()];
    }

    /// 텍스트 교체. 개행마다 새 문단을 만든다.
    pub fn set_text(&mut self, text: &str) {
        self.paragraphs = text
            .split('\n')
            .map(|line| Paragraph {
                runs: vec![Run::new(line)],
                alignment: None,
            })
            .collect();
        if self.paragraphs.is_empty() {
            self.paragraphs.push(Paragraph::default());
        }
    }

    /// 첫 문단 첫 런의 서식을 유지한 채 텍스트를 교체한다.
    /// 첫 문단의 나머지 런은 제거하고, 런이 없으면 통째로 교체한다.
    pub fn replace_text_keep_first_run(&mut self, text: &str) {
        if let Some(first_para) = self.paragraphs.first_mut()
            && !first_para.runs.is_empty()
        {
            first_para.runs.truncate(1);
            first_para.runs[0].text = text.to_string();
        } else {
            self.set_text(text);
        }
    }
}

/// 외곽선 속성
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub color: Rgb,
    pub width_pt: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// 슬라이드 안에서 고유한 번호. 0 이면 로드 시 자동 부여.
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: ShapeKind,
    #[serde(default)]
    pub left: Emu,
    #[serde(default)]
    pub top: Emu,
    #[serde(default)]
    pub width: Emu,
    #[serde(default)]
    pub height: Emu,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_frame: Option<TextFrame>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Rgb>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline: Option<Outline>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    #[serde(default)]
    pub shapes: Vec<Shape>,
}

impl Slide {
    pub fn shape_by_id(&self, id: u32) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn shape_by_id_mut(&mut self, id: u32) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id == id)
    }

    pub fn next_shape_id(&self) -> u32 {
        self.shapes.iter().map(|s| s.id).max().unwrap_or(0) + 1
    }

    /// z 순서를 유지한 채 도형 제거
    pub fn remove_shape(&mut self, id: u32) -> Option<Shape> {
        let pos = self.shapes.iter().position(|s| s.id == id)?;
        Some(self.shapes.remove(pos))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    #[serde(default)]
    pub slides: Vec<Slide>,
}

impl Deck {
    /// JSON 파일에서 덱을 읽는다. 번호가 없는 도형에는 번호를 부여한다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Deck> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            TrendpressError::file_operation(format!(
                "failed to read deck {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let mut deck: Deck = serde_json::from_str(&content)?;
        deck.assign_missing_ids();
        Ok(deck)
    }

    /// 덱을 JSON 파일로 저장한다. 필요하면 상위 디렉터리를 만든다.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content).map_err(|e| {
            TrendpressError::file_operation(format!(
                "failed to write deck {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Ok(())
    }

    fn assign_missing_ids(&mut self) {
        for slide in &mut self.slides {
            let mut next = slide.shapes.iter().map(|s| s.id).max().unwrap_or(0) + 1;
            for shape in &mut slide.shapes {
                if shape.id == 0 {
                    shape.id = next;
                    next += 1;
                }
            }
        }
    }
}
