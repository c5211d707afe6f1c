//! 보고서 생성
//!
//! 템플릿 덱을 읽어 슬라이드마다 `{{TAG}}` 마커를 찾고, 태그 종류에 따라
//! 텍스트 생성·차트 삽입·서식 적용을 수행한 뒤 완성된 덱을 저장한다.
//! 태그 하나가 실패해도 나머지 태그 처리는 계속된다.

pub mod styling;
pub mod tags;

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::chart;
use crate::data::PhraseGroup;
use crate::deck::{Deck, Slide};
use crate::errors::Result;
use crate::textgen::{self, SlideContext, TextGenerator};
use crate::utils::Month;
use crate::weather::WeatherAnalysis;

use styling::apply_styling;
use tags::{FoundTag, TagConfig, TagKind, TagSettings, find_tags_in_slide, load_tag_config};

/// 텍스트 생성 없이 건너뛰는 태그
const SKIP_TAGS: [&str; 2] = ["ANALYSIS_AREA", "PRODUCT_AREA"];

/// 변수만 치환해 그대로 꽂는 태그 (생성기 호출 없음)
const DIRECT_TAGS: [&str; 2] = ["TITLE_AREA", "SUBTITLE1_AREA"];

/// 문단을 비우고 새 텍스트와 설정 서식을 적용한다.
/// 텍스트 프레임이 없는 도형이면 false.
fn set_styled_text(slide: &mut Slide, shape_id: u32, settings: &TagSettings, text: &str) -> bool {
    if let Some(shape) = slide.shape_by_id_mut(shape_id)
        && let Some(frame) = shape.text_frame.as_mut()
    {
        frame.set_text(text);
        apply_styling(frame, settings);
        true
    } else {
        false
    }
}

/// 태그별 삽입 규칙대로 텍스트를 꽂는다.
///
/// TITLE_AREA 는 템플릿 서식을 그대로 유지하고, SUBTITLE1_AREA 와
/// DESCRIPTION2_AREA 는 서식을 유지한 채 설정 서식을 덧입힌다.
/// 나머지는 내용을 비우고 새로 채운다.
fn insert_tag_text(slide: &mut Slide, found: &FoundTag, settings: &TagSettings, text: &str) -> bool {
    let Some(shape) = slide.shape_by_id_mut(found.shape_id) else {
        return false;
    };
    let Some(frame) = shape.text_frame.as_mut() else {
        return false;
    };

    match found.tag.as_str() {
        "TITLE_AREA" => frame.replace_text_keep_first_run(text),
        "SUBTITLE1_AREA" | "DESCRIPTION2_AREA" => {
            frame.replace_text_keep_first_run(text);
            apply_styling(frame, settings);
        }
        _ => {
            frame.set_text(text);
            apply_styling(frame, settings);
        }
    }
    true
}

/// 태그 하나 처리
async fn process_tag(
    slide: &mut Slide,
    found: &FoundTag,
    tag_config: &TagConfig,
    groups: &[PhraseGroup],
    month: Month,
    generator: &dyn TextGenerator,
    ctx: &mut SlideContext,
) -> Result<()> {
    let tag = found.tag.as_str();

    if SKIP_TAGS.contains(&tag) {
        info!("태그 스킵: {}", tag);
        return Ok(());
    }

    let default_settings = TagSettings::default();
    let settings = tag_config.get(tag).unwrap_or(&default_settings);
    let guideline = settings.length_guideline.render();

    match settings.kind() {
        TagKind::Chart => {
            chart::chart_for_tag(Some(slide), groups, settings, tag)?;
            info!("차트 삽입 완료: {}", tag);
        }
        TagKind::Asset => {
            // 에셋(이미지 등) 생성은 지원하지 않는다. 마커는 그대로 둔다.
            info!("에셋 생성 필요: {}", tag);
        }
        TagKind::Composite => {
            info!("복합 타입 처리 필요: {}", tag);
        }
        TagKind::List => {
            let text = textgen::generate_for_tag(
                generator,
                tag,
                groups,
                month,
                &settings.prompt_template,
                guideline.as_deref(),
                ctx,
            )
            .await?;
            if set_styled_text(slide, found.shape_id, settings, &text) {
                info!("리스트 삽입: {}", tag);
            }
        }
        TagKind::Text => {
            let text = if DIRECT_TAGS.contains(&tag) {
                // 생성기 호출 없이 prompt_template 의 변수만 채워서 그대로 쓴다
                let mut vars = BTreeMap::new();
                vars.insert("month".to_string(), month.label());
                textgen::prompt::substitute(&settings.prompt_template, &vars)
            } else {
                textgen::generate_for_tag(
                    generator,
                    tag,
                    groups,
                    month,
                    &settings.prompt_template,
                    guideline.as_deref(),
                    ctx,
                )
                .await?
            };

            if insert_tag_text(slide, found, settings, &text) {
                info!("텍스트 삽입: {}", tag);
            }
        }
    }

    Ok(())
}

/// KEYWORD 태그의 텍스트를 미리 생성한다. 실패하면 경고만 남기고 None 을
/// 돌려주어 본 처리 루프가 일반 경로로 다시 시도하게 한다.
async fn pregenerate_keyword(
    tag_name: &str,
    found: &[FoundTag],
    tag_config: &TagConfig,
    groups: &[PhraseGroup],
    month: Month,
    generator: &dyn TextGenerator,
    ctx: &mut SlideContext,
) -> Option<String> {
    if !found.iter().any(|t| t.tag == tag_name) {
        return None;
    }

    let default_settings = TagSettings::default();
    let settings = tag_config.get(tag_name).unwrap_or(&default_settings);
    let guideline = settings.length_guideline.render();

    match textgen::generate_for_tag(
        generator,
        tag_name,
        groups,
        month,
        &settings.prompt_template,
        guideline.as_deref(),
        ctx,
    )
    .await
    {
        Ok(text) => Some(text),
        Err(e) => {
            warn!("{} 처리 실패: {}", tag_name, e);
            None
        }
    }
}

/// 보고서 생성 메인 흐름
///
/// 템플릿 로드 → 태그 설정 로드 → 슬라이드별 태그 처리 → 저장.
/// KEYWORD1/KEYWORD2 태그는 먼저 생성해 결과를 슬라이드 컨텍스트의
/// 인사이트 타이틀로 실어 두고, 나머지 태그가 이를 재사용한다.
pub async fn generate_report(
    template_path: &str,
    output_path: &str,
    groups: &[PhraseGroup],
    month: Month,
    generator: &dyn TextGenerator,
    tag_config_path: &str,
    weather: Option<WeatherAnalysis>,
) -> Result<()> {
    info!("템플릿 로드: {}", template_path);
    let mut deck = Deck::load(template_path)?;

    let tag_config = load_tag_config(tag_config_path)?;

    if let Some(parent) = Path::new(output_path).parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }

    info!("총 슬라이드 수: {}", deck.slides.len());

    for (slide_idx, slide) in deck.slides.iter_mut().enumerate() {
        let found = find_tags_in_slide(slide);
        if found.is_empty() {
            debug!("슬라이드 {}: 태그 없음", slide_idx + 1);
            continue;
        }

        let tag_names: Vec<&str> = found.iter().map(|t| t.tag.as_str()).collect();
        info!("슬라이드 {}: 발견된 태그 {:?}", slide_idx + 1, tag_names);

        let mut ctx = SlideContext::new(weather.clone());

        let keyword1_text = pregenerate_keyword(
            "KEYWORD1_AREA",
            &found,
            &tag_config,
            groups,
            month,
            generator,
            &mut ctx,
        )
        .await;
        if let Some(text) = &keyword1_text {
            info!("KEYWORD1_AREA 결과를 insight_title 로 저장: {}", text);
            ctx.insight_title = Some(text.clone());
        }

        let keyword2_text = pregenerate_keyword(
            "KEYWORD2_AREA",
            &found,
            &tag_config,
            groups,
            month,
            generator,
            &mut ctx,
        )
        .await;
        if let Some(text) = &keyword2_text {
            info!("KEYWORD2_AREA 결과를 insight_title2 로 저장: {}", text);
            ctx.insight_title2 = Some(text.clone());
        }

        for tag in &found {
            // 사전 생성된 KEYWORD 텍스트는 바로 꽂는다. 사전 생성이 실패한
            // KEYWORD 태그는 아래 일반 경로에서 다시 시도된다.
            let pregenerated = match tag.tag.as_str() {
                "KEYWORD1_AREA" => keyword1_text.as_deref(),
                "KEYWORD2_AREA" => keyword2_text.as_deref(),
                _ => None,
            };

            if let Some(text) = pregenerated {
                let default_settings = TagSettings::default();
                let settings = tag_config.get(tag.tag.as_str()).unwrap_or(&default_settings);
                if set_styled_text(slide, tag.shape_id, settings, text) {
                    info!("텍스트 삽입: {}", tag.tag);
                }
                continue;
            }

            if let Err(e) =
                process_tag(slide, tag, &tag_config, groups, month, generator, &mut ctx).await
            {
                error!("태그 처리 실패 ({}): {}", tag.tag, e);
            }
        }
    }

    deck.save(output_path)?;
    info!("리포트 저장 완료: {}", output_path);
    Ok(())
}
