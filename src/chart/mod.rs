//! 버블 차트
//!
//! 차트 태그가 가리키는 영역에 프레이즈 그룹을 원형 배치한 버블 도형으로
//! 그려 넣는다. 이미지 렌더링 없이 덱 도형만으로 차트를 만들고,
//! 슬라이드가 없으면 계산된 레이아웃을 JSON 파일로 남긴다.

use std::f64::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use serde::Serialize;
use tracing::{info, warn};

use crate::data::{top_groups_by, Metric, PhraseGroup};
use crate::deck::{
    Align, Emu, Font, Outline, Paragraph, Rgb, Run, Shape, ShapeKind, Slide, TextFrame,
};
use crate::errors::{Result, TrendpressError};
use crate::report::tags::{marker_token, TagSettings};
use crate::utils::numbers::group_thousands;

/// 배치 좌표를 흩뜨리는 난수 시드. 같은 데이터는 항상 같은 그림이 된다.
const LAYOUT_SEED: u64 = 42;

/// 그라데이션 양끝: 하늘색 -> 보라색
const COLOR_LOW: Rgb = Rgb(135, 206, 250);
const COLOR_HIGH: Rgb = Rgb(138, 43, 226);

/// 버블 지름 범위 (인치)
const DIAMETER_MIN_IN: f64 = 0.7;
const DIAMETER_MAX_IN: f64 = 1.8;

/// 태그 설정에서 뽑아낸 차트 옵션
#[derive(Debug, Clone, Copy)]
pub struct ChartSpec {
    pub metric: Metric,
    pub color_metric: Metric,
    pub top_n: usize,
}

impl ChartSpec {
    /// 버블 외 차트 종류와 알 수 없는 지표는 오류로 거른다.
    pub fn from_settings(settings: &TagSettings) -> Result<ChartSpec> {
        let kind = settings.chart_kind.as_deref().unwrap_or("bubble");
        if kind != "bubble" {
            return Err(TrendpressError::validation(format!(
                "지원하지 않는 차트 타입: {}",
                kind
            )));
        }

        let metric = match settings.metric.as_deref() {
            Some(s) => Metric::parse(s).ok_or_else(|| {
                TrendpressError::validation(format!(
                    "알 수 없는 차트 지표: {} (허용: {})",
                    s,
                    Metric::allowed_names()
                ))
            })?,
            None => Metric::default(),
        };
        let color_metric = match settings.color_metric.as_deref() {
            Some(s) => Metric::parse(s).ok_or_else(|| {
                TrendpressError::validation(format!(
                    "알 수 없는 색상 지표: {} (허용: {})",
                    s,
                    Metric::allowed_names()
                ))
            })?,
            None => Metric::Ctr,
        };

        Ok(ChartSpec {
            metric,
            color_metric,
            top_n: settings.top_n.unwrap_or(10),
        })
    }
}

/// 버블 하나의 배치 결과. 좌표는 0~6 캔버스, 크기는 10~100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BubblePlacement {
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

/// 지표 값들을 원형으로 배치한다.
///
/// 크기는 10~100으로 정규화(전부 같으면 50), 각도는 균등 분할하고
/// 반지름에 고정 시드 난수를 섞어 흩뜨린 뒤 축마다 0~6으로 다시 펼친다.
pub fn layout_bubbles(values: &[f64]) -> Vec<BubblePlacement> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }

    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let sizes: Vec<f64> = if max == min {
        vec![50.0; n]
    } else {
        values
            .iter()
            .map(|v| 10.0 + (v - min) / (max - min) * 90.0)
            .collect()
    };

    let mut rng = StdRng::seed_from_u64(LAYOUT_SEED);
    let mut xs = Vec::with_capacity(n);
    let mut ys = Vec::with_capacity(n);
    for i in 0..n {
        let angle = 2.0 * PI * i as f64 / n as f64;
        let radius: f64 = rng.random_range(0.4..0.9);
        xs.push(angle.cos() * radius);
        ys.push(angle.sin() * radius);
    }
    spread_axis(&mut xs);
    spread_axis(&mut ys);

    (0..n)
        .map(|i| BubblePlacement {
            x: xs[i],
            y: ys[i],
            size: sizes[i],
        })
        .collect()
}

/// 축 좌표를 0~6 범위로 펼친다. 전부 같은 값이면 그대로 둔다.
fn spread_axis(values: &mut [f64]) {
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    if max == min {
        return;
    }
    for v in values.iter_mut() {
        *v = (*v - min) / (max - min) * 6.0;
    }
}

/// 지표 값에 따라 하늘색~보라색 사이를 보간한다.
pub fn color_for_value(value: f64, min: f64, max: f64) -> Rgb {
    let ratio = if max == min {
        0.5
    } else {
        (value - min) / (max - min)
    };
    let channel =
        |low: u8, high: u8| (low as f64 + (high as f64 - low as f64) * ratio) as u8;
    Rgb(
        channel(COLOR_LOW.0, COLOR_HIGH.0),
        channel(COLOR_LOW.1, COLOR_HIGH.1),
        channel(COLOR_LOW.2, COLOR_HIGH.2),
    )
}

/// 크기(10~100)를 지름으로 변환
fn size_to_diameter(size: f64) -> Emu {
    Emu::from_inches(DIAMETER_MIN_IN + (size - 10.0) / 90.0 * (DIAMETER_MAX_IN - DIAMETER_MIN_IN))
}

/// 0~6 좌표를 마커 영역 안의 캔버스 좌표로 옮긴다. y축은 아래로 증가.
fn canvas_x(left: Emu, width: Emu, x: f64) -> Emu {
    Emu((left.0 as f64 + width.0 as f64 * ((x + 2.0) / 10.0)) as i64)
}

fn canvas_y(top: Emu, height: Emu, y: f64) -> Emu {
    Emu((top.0 as f64 + height.0 as f64 * (1.0 - (y + 2.0) / 10.0)) as i64)
}

/// 버블 안에 넣을 라벨. 긴 프레이즈는 두 줄로 나눈다.
fn bubble_label(phrase: &str, metric: Metric, value: f64) -> String {
    let char_count = phrase.chars().count();
    let phrase_text = if char_count > 15 {
        if let Some((head, tail)) = phrase.split_once('·') {
            format!("{}\n·{}", head, tail)
        } else if char_count > 20 {
            let mid = char_count / 2;
            let split_at = phrase
                .char_indices()
                .nth(mid)
                .map(|(i, _)| i)
                .unwrap_or(phrase.len());
            format!("{}\n{}", &phrase[..split_at], &phrase[split_at..])
        } else {
            phrase.to_string()
        }
    } else {
        phrase.to_string()
    };

    let value_text = match metric {
        Metric::Ctr => format!("{:.1}%", value),
        _ => group_thousands(value as u64),
    };
    format!("{}\n{}", phrase_text, value_text)
}

/// 텍스트보다 먼저, 이름은 그 다음으로 마커 토큰을 찾는다.
fn find_marker_shape(slide: &Slide, token: &str) -> Option<u32> {
    for shape in &slide.shapes {
        if let Some(frame) = &shape.text_frame
            && frame.text().contains(token)
        {
            return Some(shape.id);
        }
        if shape.name.contains(token) {
            return Some(shape.id);
        }
    }
    None
}

fn take_marker_shape(slide: &mut Slide, token: &str) -> Option<Shape> {
    let id = find_marker_shape(slide, token)?;
    slide.remove_shape(id)
}

fn default_chart_rect() -> (Emu, Emu, Emu, Emu) {
    (
        Emu::from_inches(0.5),
        Emu::from_inches(1.5),
        Emu::from_inches(9.0),
        Emu::from_inches(5.5),
    )
}

/// 슬라이드에 버블 차트를 도형으로 그린다.
///
/// 마커 도형이 있으면 그 자리를 쓰고 마커는 제거한다. 없으면 기본
/// 위치에 그린다. 큰 버블부터 그려서 작은 버블이 항상 위에 보인다.
pub fn insert_bubble_chart(
    slide: &mut Slide,
    groups: &[PhraseGroup],
    spec: &ChartSpec,
    marker: &str,
) -> Result<()> {
    let rows = top_groups_by(groups, spec.metric, spec.top_n);
    if rows.is_empty() {
        warn!("표시할 차트 데이터가 없습니다.");
        return Ok(());
    }

    let (left, top, width, height) = match take_marker_shape(slide, marker) {
        Some(shape) => {
            info!("차트 영역 마커 발견: {}", marker);
            (shape.left, shape.top, shape.width, shape.height)
        }
        None => {
            warn!("차트 영역 마커를 찾지 못했습니다. 기본 위치를 사용합니다: {}", marker);
            default_chart_rect()
        }
    };

    let values: Vec<f64> = rows.iter().map(|g| spec.metric.value(g)).collect();
    let placements = layout_bubbles(&values);

    let color_values: Vec<f64> = rows.iter().map(|g| spec.color_metric.value(g)).collect();
    let color_min = color_values.iter().cloned().fold(f64::INFINITY, f64::min);
    let color_max = color_values
        .iter()
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max);

    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by(|&a, &b| {
        placements[b]
            .size
            .partial_cmp(&placements[a].size)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for i in order {
        let placement = placements[i];
        let d = size_to_diameter(placement.size);
        let cx = canvas_x(left, width, placement.x);
        let cy = canvas_y(top, height, placement.y);

        let fill = color_for_value(color_values[i], color_min, color_max);
        let text_color = if fill.luminance() < 140.0 {
            Rgb(255, 255, 255)
        } else {
            Rgb(0, 0, 0)
        };
        let font_pt = ((d.inches() * 8.0) as i32).clamp(9, 18) as f32;

        let label = bubble_label(&rows[i].phrase, spec.metric, values[i]);
        let paragraphs = label
            .split('\n')
            .map(|line| Paragraph {
                runs: vec![Run {
                    text: line.to_string(),
                    font: Font {
                        size_pt: Some(font_pt),
                        bold: Some(false),
                        color: Some(text_color),
                    },
                }],
                alignment: Some(Align::Center),
            })
            .collect();

        let id = slide.next_shape_id();
        slide.shapes.push(Shape {
            id,
            name: String::new(),
            kind: ShapeKind::Oval,
            left: Emu(cx.0 - d.0 / 2),
            top: Emu(cy.0 - d.0 / 2),
            width: d,
            height: d,
            text_frame: Some(TextFrame {
                paragraphs,
                word_wrap: true,
            }),
            fill: Some(fill),
            outline: Some(Outline {
                color: Rgb(255, 255, 255),
                width_pt: 0.75,
            }),
        });
    }

    info!("버블 차트 생성 완료: {}개 버블", rows.len());
    Ok(())
}

#[derive(Serialize)]
struct LayoutBubble<'a> {
    phrase: &'a str,
    value: f64,
    x: f64,
    y: f64,
    size: f64,
    diameter_in: f64,
    color: Rgb,
}

#[derive(Serialize)]
struct LayoutArtifact<'a> {
    metric: String,
    top_n: usize,
    bubbles: Vec<LayoutBubble<'a>>,
}

/// 슬라이드 없이 호출됐을 때 계산된 레이아웃을 JSON으로 남긴다.
fn write_layout_artifact(path: &Path, groups: &[PhraseGroup], spec: &ChartSpec) -> Result<()> {
    let rows = top_groups_by(groups, spec.metric, spec.top_n);
    let values: Vec<f64> = rows.iter().map(|g| spec.metric.value(g)).collect();
    let placements = layout_bubbles(&values);

    let color_values: Vec<f64> = rows.iter().map(|g| spec.color_metric.value(g)).collect();
    let color_min = color_values.iter().cloned().fold(f64::INFINITY, f64::min);
    let color_max = color_values
        .iter()
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max);

    let bubbles = rows
        .iter()
        .enumerate()
        .map(|(i, group)| LayoutBubble {
            phrase: &group.phrase,
            value: values[i],
            x: placements[i].x,
            y: placements[i].y,
            size: placements[i].size,
            diameter_in: size_to_diameter(placements[i].size).inches(),
            color: color_for_value(color_values[i], color_min, color_max),
        })
        .collect();

    let artifact = LayoutArtifact {
        metric: spec.metric.to_string(),
        top_n: spec.top_n,
        bubbles,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(&artifact)?)?;
    info!("버블 차트 레이아웃 저장: {}", path.display());
    Ok(())
}

/// 태그 설정대로 차트를 만든다.
///
/// 슬라이드가 주어지면 거기에 그리고 None 을, 없으면 레이아웃 JSON 파일을
/// 만들고 그 경로를 돌려준다.
pub fn chart_for_tag(
    slide: Option<&mut Slide>,
    groups: &[PhraseGroup],
    settings: &TagSettings,
    tag_name: &str,
) -> Result<Option<PathBuf>> {
    let spec = ChartSpec::from_settings(settings)?;

    match slide {
        Some(slide) => {
            insert_bubble_chart(slide, groups, &spec, &marker_token(tag_name))?;
            Ok(None)
        }
        None => {
            let path = settings
                .output_path
                .clone()
                .unwrap_or_else(|| format!("chart_{}.json", tag_name));
            let path = PathBuf::from(path);
            write_layout_artifact(&path, groups, &spec)?;
            Ok(Some(path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::KeywordRecord;

    fn group(phrase: &str, imp: u64, clicks: u64) -> PhraseGroup {
        PhraseGroup::from_records(phrase, &[KeywordRecord::new(format!("{} 키워드", phrase), imp, clicks)])
    }

    fn marker_slide() -> Slide {
        Slide {
            shapes: vec![Shape {
                id: 1,
                name: "{{CHART1_AREA}}".to_string(),
                left: Emu::from_inches(1.0),
                top: Emu::from_inches(1.0),
                width: Emu::from_inches(8.0),
                height: Emu::from_inches(5.0),
                ..Shape::default()
            }],
        }
    }

    #[test]
    fn layout_is_deterministic() {
        let values = [10.0, 250.0, 30.0, 990.0];
        assert_eq!(layout_bubbles(&values), layout_bubbles(&values));
    }

    #[test]
    fn layout_sizes_and_coords_in_range() {
        let values = [5.0, 100.0, 40.0, 77.0, 12.0];
        let placements = layout_bubbles(&values);
        assert_eq!(placements.len(), 5);
        for p in &placements {
            assert!((10.0..=100.0).contains(&p.size));
            assert!((0.0..=6.0).contains(&p.x));
            assert!((0.0..=6.0).contains(&p.y));
        }
        // 최소/최대 값이 크기 양끝에 닿는다
        assert_eq!(placements[0].size, 10.0);
        assert_eq!(placements[1].size, 100.0);
    }

    #[test]
    fn equal_values_get_mid_size() {
        let placements = layout_bubbles(&[7.0, 7.0, 7.0]);
        assert!(placements.iter().all(|p| p.size == 50.0));
    }

    #[test]
    fn color_interpolates_between_endpoints() {
        assert_eq!(color_for_value(0.0, 0.0, 1.0), COLOR_LOW);
        assert_eq!(color_for_value(1.0, 0.0, 1.0), COLOR_HIGH);
        // 범위가 없으면 중간색
        assert_eq!(color_for_value(3.0, 3.0, 3.0), Rgb(136, 124, 238));
    }

    #[test]
    fn label_splits_long_phrases() {
        // 짧으면 그대로
        assert_eq!(
            bubble_label("겨울 코트", Metric::Impressions, 12345.0),
            "겨울 코트\n12,345"
        );
        // 15자 초과 + 가운뎃점이 있으면 점 앞에서 나눈다
        assert_eq!(
            bubble_label("기나긴 프레이즈 라벨 하나·꼬리 부분", Metric::Clicks, 99.0),
            "기나긴 프레이즈 라벨 하나\n·꼬리 부분\n99"
        );
        // 15자 초과 20자 이하, 점 없음: 나누지 않는다
        let seventeen = "가나다라마바사아자차카타파하거너더";
        assert_eq!(seventeen.chars().count(), 17);
        assert_eq!(
            bubble_label(seventeen, Metric::Clicks, 1.0),
            format!("{}\n1", seventeen)
        );
        // 20자 초과, 점 없음: 가운데에서 나눈다
        let long = "가나다라마바사아자차카타파하거너더러머버서";
        assert_eq!(long.chars().count(), 21);
        let label = bubble_label(long, Metric::Clicks, 1.0);
        assert_eq!(label, "가나다라마바사아자차\n카타파하거너더러머버서\n1");
    }

    #[test]
    fn ctr_metric_formats_percent() {
        assert_eq!(bubble_label("니트", Metric::Ctr, 3.456), "니트\n3.5%");
    }

    #[test]
    fn chart_replaces_marker_with_bubbles() {
        let mut slide = marker_slide();
        let groups = vec![
            group("패딩", 1000, 30),
            group("니트", 500, 20),
            group(crate::data::NOISE_LABEL, 9999, 1),
        ];
        let settings = TagSettings::default();

        let artifact = chart_for_tag(Some(&mut slide), &groups, &settings, "CHART1_AREA").unwrap();
        assert!(artifact.is_none());

        // 마커는 사라지고 버블 2개(노이즈 제외)가 생겼다
        assert!(!slide.shapes.iter().any(|s| s.name.contains("{{CHART1_AREA}}")));
        let ovals: Vec<&Shape> = slide
            .shapes
            .iter()
            .filter(|s| s.kind == ShapeKind::Oval)
            .collect();
        assert_eq!(ovals.len(), 2);
        for oval in ovals {
            assert!(oval.fill.is_some());
            assert!(oval.outline.is_some());
            let frame = oval.text_frame.as_ref().unwrap();
            assert!(frame.word_wrap);
            assert!(frame
                .paragraphs
                .iter()
                .all(|p| p.alignment == Some(Align::Center)));
        }
    }

    #[test]
    fn bubbles_stay_inside_marker_area() {
        let mut slide = marker_slide();
        let groups: Vec<PhraseGroup> =
            (0..6).map(|i| group(&format!("그룹{}", i), 100 * (i + 1), i)).collect();
        let settings = TagSettings::default();

        chart_for_tag(Some(&mut slide), &groups, &settings, "CHART1_AREA").unwrap();

        // 영역: 1~9in x 1~6in. 중심은 안쪽 20~80% 구간에 놓인다.
        for shape in slide.shapes.iter().filter(|s| s.kind == ShapeKind::Oval) {
            let cx = shape.left.inches() + shape.width.inches() / 2.0;
            let cy = shape.top.inches() + shape.height.inches() / 2.0;
            assert!(cx >= 1.0 + 8.0 * 0.2 - 1e-4 && cx <= 1.0 + 8.0 * 0.8 + 1e-4);
            assert!(cy >= 1.0 + 5.0 * 0.2 - 1e-4 && cy <= 1.0 + 5.0 * 0.8 + 1e-4);
        }
    }

    #[test]
    fn empty_data_leaves_slide_untouched() {
        let mut slide = marker_slide();
        let groups = vec![group(crate::data::NOISE_LABEL, 100, 1)];
        let settings = TagSettings::default();

        chart_for_tag(Some(&mut slide), &groups, &settings, "CHART1_AREA").unwrap();

        assert_eq!(slide.shapes.len(), 1);
        assert!(slide.shapes[0].name.contains("{{CHART1_AREA}}"));
    }

    #[test]
    fn missing_marker_uses_default_area() {
        let mut slide = Slide::default();
        let groups = vec![group("니트", 100, 5)];
        let settings = TagSettings::default();

        chart_for_tag(Some(&mut slide), &groups, &settings, "CHART1_AREA").unwrap();
        assert_eq!(slide.shapes.len(), 1);
        assert_eq!(slide.shapes[0].kind, ShapeKind::Oval);
    }

    #[test]
    fn rejects_unsupported_chart_kind() {
        let settings = TagSettings {
            chart_kind: Some("pie".to_string()),
            ..TagSettings::default()
        };
        let err = ChartSpec::from_settings(&settings).unwrap_err();
        assert!(err.to_string().contains("지원하지 않는 차트 타입"));
    }

    #[test]
    fn rejects_unknown_metric() {
        let settings = TagSettings {
            metric: Some("방문수".to_string()),
            ..TagSettings::default()
        };
        let err = ChartSpec::from_settings(&settings).unwrap_err();
        // 오류 메시지에 허용 표기를 나열한다
        assert!(err.to_string().contains("impressions, clicks, ctr"));
    }

    #[test]
    fn metric_names_accept_english() {
        let settings = TagSettings {
            metric: Some("clicks".to_string()),
            color_metric: Some("ctr".to_string()),
            top_n: Some(3),
            ..TagSettings::default()
        };
        let spec = ChartSpec::from_settings(&settings).unwrap();
        assert_eq!(spec.metric, Metric::Clicks);
        assert_eq!(spec.color_metric, Metric::Ctr);
        assert_eq!(spec.top_n, 3);
    }

    #[test]
    fn no_slide_writes_layout_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("charts/chart_test.json");
        let settings = TagSettings {
            output_path: Some(out.to_string_lossy().into_owned()),
            ..TagSettings::default()
        };
        let groups = vec![group("패딩", 1000, 30), group("니트", 500, 20)];

        let path = chart_for_tag(None, &groups, &settings, "CHART1_AREA")
            .unwrap()
            .unwrap();
        assert_eq!(path, out);

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["metric"], "총 노출");
        assert_eq!(parsed["bubbles"].as_array().unwrap().len(), 2);
        assert_eq!(parsed["bubbles"][0]["phrase"], "패딩");
    }
}
