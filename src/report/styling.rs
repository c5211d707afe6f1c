//! 태그 설정에 적힌 서식을 텍스트 프레임에 적용

use crate::deck::{Align, TextFrame};
use crate::report::tags::TagSettings;

/// 정렬은 문단 단위, 글꼴 크기/굵기/색은 런 단위로 덮어쓴다.
/// 설정에 없는 속성은 건드리지 않는다.
pub fn apply_styling(frame: &mut TextFrame, settings: &TagSettings) {
    let alignment = settings.alignment.as_deref().and_then(Align::parse);

    for paragraph in &mut frame.paragraphs {
        if let Some(align) = alignment {
            paragraph.alignment = Some(align);
        }
        for run in &mut paragraph.runs {
            if let Some(size) = settings.font_size {
                run.font.size_pt = Some(size);
            }
            if let Some(bold) = settings.font_bold {
                run.font.bold = Some(bold);
            }
            if let Some(color) = settings.font_color {
                run.font.color = Some(color);
            }
        }
    }
}
