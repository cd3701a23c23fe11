//! 분석 결과 오버레이 렌더링.
//!
//! 요소 유형별 색상으로 경계 상자, 중심점, 라벨 태그를 그리고
//! 좌상단에 분석 시간 배너를 표시한다. 입력 프레임과 분석 결과는 변경하지 않는다.

use image::{Rgba, RgbaImage};

use guiagent_core::models::analysis::{AnalysisResult, Element, ElementKind};

/// 경계 상자 두께 (픽셀)
const BOX_THICKNESS: i32 = 2;

/// 중심점 반지름 (픽셀)
const CENTER_RADIUS: i32 = 5;

/// 배너 위치
const BANNER_ORIGIN: (i32, i32) = (10, 10);

const BANNER_COLOR: [u8; 4] = [0, 255, 0, 255];
const TAG_TEXT_COLOR: [u8; 4] = [0, 0, 0, 255];

/// 요소 유형별 색상 (RGBA)
pub fn kind_colour(kind: ElementKind) -> [u8; 4] {
    match kind {
        ElementKind::Button => [0, 255, 0, 255],
        ElementKind::Text => [255, 255, 0, 255],
        ElementKind::Icon => [255, 0, 255, 255],
        ElementKind::Image => [0, 255, 255, 255],
    }
}

/// 라벨 태그 문자열: `"{label} ({confidence:.2})"`
pub fn tag_text(element: &Element) -> String {
    format!("{} ({:.2})", element.label, element.confidence)
}

/// 분석 결과를 프레임 복사본 위에 그린다
///
/// 실패한 결과는 그리지 않고 원본과 같은 프레임을 반환한다.
pub fn render_overlay(frame: &RgbaImage, result: &AnalysisResult) -> RgbaImage {
    let mut canvas = frame.clone();
    if !result.success {
        return canvas;
    }

    let scale: u32 = if canvas.width() > 1600 { 2 } else { 1 };

    for element in &result.elements {
        draw_element(&mut canvas, element, scale);
    }

    let banner = format!("Analysis: {:.2}s", result.analysis_time);
    draw_text(
        &mut canvas,
        BANNER_ORIGIN.0,
        BANNER_ORIGIN.1,
        &banner,
        BANNER_COLOR,
        scale,
    );

    canvas
}

fn draw_element(canvas: &mut RgbaImage, element: &Element, scale: u32) {
    let colour = kind_colour(element.kind);
    let bbox = element.bounding_box;

    draw_rect(canvas, bbox.x1, bbox.y1, bbox.x2, bbox.y2, colour, BOX_THICKNESS);
    fill_circle(canvas, element.center.0, element.center.1, CENTER_RADIUS, colour);

    if element.label.is_empty() {
        return;
    }

    let text = tag_text(element);
    let pad = 2 * scale as i32;
    let tag_w = text_width(&text, scale) + pad * 2;
    let tag_h = glyph_height(scale) + pad * 2;
    let tag_y = (bbox.y1 - tag_h).max(0);

    fill_rect(canvas, bbox.x1, tag_y, bbox.x1 + tag_w, tag_y + tag_h, colour);
    draw_text(canvas, bbox.x1 + pad, tag_y + pad, &text, TAG_TEXT_COLOR, scale);
}

// ── 그리기 기본 연산 ────────────────────────────────────────

fn glyph_step(scale: u32) -> i32 {
    (5 * scale + 1) as i32
}

fn glyph_height(scale: u32) -> i32 {
    (5 * scale) as i32
}

/// 텍스트 폭: 글꼴에 없는 문자도 한 칸을 차지한다
fn text_width(text: &str, scale: u32) -> i32 {
    let count = i32::try_from(text.chars().count()).unwrap_or(i32::MAX);
    count.saturating_mul(glyph_step(scale))
}

fn put(canvas: &mut RgbaImage, x: i32, y: i32, colour: [u8; 4]) {
    let (w, h) = canvas.dimensions();
    if x < 0 || y < 0 || x as u32 >= w || y as u32 >= h {
        return;
    }
    let p = canvas.get_pixel_mut(x as u32, y as u32);
    let a = colour[3] as f32 / 255.0;
    *p = Rgba([
        (p[0] as f32 * (1.0 - a) + colour[0] as f32 * a).round() as u8,
        (p[1] as f32 * (1.0 - a) + colour[1] as f32 * a).round() as u8,
        (p[2] as f32 * (1.0 - a) + colour[2] as f32 * a).round() as u8,
        255,
    ]);
}

fn draw_rect(canvas: &mut RgbaImage, x1: i32, y1: i32, x2: i32, y2: i32, colour: [u8; 4], thickness: i32) {
    for t in 0..thickness {
        for x in x1..=x2 {
            put(canvas, x, y1 + t, colour);
            put(canvas, x, y2 - t, colour);
        }
        for y in y1..=y2 {
            put(canvas, x1 + t, y, colour);
            put(canvas, x2 - t, y, colour);
        }
    }
}

fn fill_rect(canvas: &mut RgbaImage, x1: i32, y1: i32, x2: i32, y2: i32, colour: [u8; 4]) {
    let (w, h) = canvas.dimensions();
    let x_end = x2.min(w as i32 - 1);
    let y_end = y2.min(h as i32 - 1);
    for y in y1.max(0)..=y_end {
        for x in x1.max(0)..=x_end {
            put(canvas, x, y, colour);
        }
    }
}

fn fill_circle(canvas: &mut RgbaImage, cx: i32, cy: i32, radius: i32, colour: [u8; 4]) {
    let r2 = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= r2 {
                put(canvas, cx + dx, cy + dy, colour);
            }
        }
    }
}

fn draw_text(canvas: &mut RgbaImage, x: i32, y: i32, text: &str, colour: [u8; 4], scale: u32) {
    let step = glyph_step(scale);
    for (i, c) in text.chars().enumerate() {
        let gx = x.saturating_add((i as i32).saturating_mul(step));
        if gx >= canvas.width() as i32 {
            break;
        }
        if let Some(glyph) = glyph_for(c) {
            draw_glyph(canvas, &glyph, gx, y, colour, scale);
        }
    }
}

fn draw_glyph(canvas: &mut RgbaImage, glyph: &[u8; 5], px: i32, py: i32, colour: [u8; 4], scale: u32) {
    let s = scale as i32;
    for (row, &bits) in glyph.iter().enumerate() {
        for bit in 0..5 {
            if (bits >> (4 - bit)) & 1 == 0 {
                continue;
            }
            for sy in 0..s {
                for sx in 0..s {
                    put(canvas, px + bit * s + sx, py + row as i32 * s + sy, colour);
                }
            }
        }
    }
}

/// 5×5 비트맵 글리프 (영문 대문자로 표시, 미지원 문자는 빈 칸)
fn glyph_for(c: char) -> Option<[u8; 5]> {
    let upper = c.to_ascii_uppercase();
    match upper {
        '0'..='9' => Some(MINI_FONT[(upper as u8 - b'0') as usize]),
        'A'..='Z' => Some(MINI_FONT[10 + (upper as u8 - b'A') as usize]),
        ':' => Some([0b00000, 0b00100, 0b00000, 0b00100, 0b00000]),
        '.' => Some([0b00000, 0b00000, 0b00000, 0b00000, 0b00100]),
        '(' => Some([0b00010, 0b00100, 0b00100, 0b00100, 0b00010]),
        ')' => Some([0b01000, 0b00100, 0b00100, 0b00100, 0b01000]),
        '-' => Some([0b00000, 0b00000, 0b01110, 0b00000, 0b00000]),
        '_' => Some([0b00000, 0b00000, 0b00000, 0b00000, 0b11111]),
        _ => None,
    }
}

const MINI_FONT: [[u8; 5]; 36] = [
    [0b01110, 0b10001, 0b10001, 0b10001, 0b01110], // 0
    [0b00100, 0b01100, 0b00100, 0b00100, 0b01110], // 1
    [0b01110, 0b10001, 0b00110, 0b01000, 0b11111], // 2
    [0b11110, 0b00001, 0b00110, 0b00001, 0b11110], // 3
    [0b00110, 0b01010, 0b10010, 0b11111, 0b00010], // 4
    [0b11111, 0b10000, 0b11110, 0b00001, 0b11110], // 5
    [0b01110, 0b10000, 0b11110, 0b10001, 0b01110], // 6
    [0b11111, 0b00001, 0b00010, 0b00100, 0b00100], // 7
    [0b01110, 0b10001, 0b01110, 0b10001, 0b01110], // 8
    [0b01110, 0b10001, 0b01111, 0b00001, 0b01110], // 9
    [0b01110, 0b10001, 0b11111, 0b10001, 0b10001], // A
    [0b11110, 0b10001, 0b11110, 0b10001, 0b11110], // B
    [0b01110, 0b10000, 0b10000, 0b10000, 0b01110], // C
    [0b11100, 0b10010, 0b10001, 0b10010, 0b11100], // D
    [0b11111, 0b10000, 0b11110, 0b10000, 0b11111], // E
    [0b11111, 0b10000, 0b11110, 0b10000, 0b10000], // F
    [0b01110, 0b10000, 0b10011, 0b10001, 0b01110], // G
    [0b10001, 0b10001, 0b11111, 0b10001, 0b10001], // H
    [0b01110, 0b00100, 0b00100, 0b00100, 0b01110], // I
    [0b00111, 0b00010, 0b00010, 0b10010, 0b01100], // J
    [0b10001, 0b10010, 0b11100, 0b10010, 0b10001], // K
    [0b10000, 0b10000, 0b10000, 0b10000, 0b11111], // L
    [0b10001, 0b11011, 0b10101, 0b10001, 0b10001], // M
    [0b10001, 0b11001, 0b10101, 0b10011, 0b10001], // N
    [0b01110, 0b10001, 0b10001, 0b10001, 0b01110], // O
    [0b11110, 0b10001, 0b11110, 0b10000, 0b10000], // P
    [0b01110, 0b10001, 0b10101, 0b10010, 0b01101], // Q
    [0b11110, 0b10001, 0b11110, 0b10010, 0b10001], // R
    [0b01111, 0b10000, 0b01110, 0b00001, 0b11110], // S
    [0b11111, 0b00100, 0b00100, 0b00100, 0b00100], // T
    [0b10001, 0b10001, 0b10001, 0b10001, 0b01110], // U
    [0b10001, 0b10001, 0b10001, 0b01010, 0b00100], // V
    [0b10001, 0b10001, 0b10101, 0b11011, 0b10001], // W
    [0b10001, 0b01010, 0b00100, 0b01010, 0b10001], // X
    [0b10001, 0b01010, 0b00100, 0b00100, 0b00100], // Y
    [0b11111, 0b00010, 0b00100, 0b01000, 0b11111], // Z
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{ScreenAnalyzer, SyntheticAnalyzer};
    use guiagent_core::models::analysis::BoundingBox;

    fn blank(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([20, 20, 20, 255]))
    }

    #[test]
    fn failed_result_returns_unchanged_frame() {
        let frame = blank(64, 48);
        let out = render_overlay(&frame, &AnalysisResult::failed("no model"));
        assert_eq!(out, frame);
    }

    #[test]
    fn overlay_does_not_modify_inputs() {
        let frame = blank(640, 480);
        let result = SyntheticAnalyzer::new().analyze(&frame);
        let before = result.clone();
        let out = render_overlay(&frame, &result);
        assert_eq!(result, before);
        assert_eq!(frame, blank(640, 480));
        assert_ne!(out, frame);
        assert_eq!(out.dimensions(), frame.dimensions());
    }

    #[test]
    fn draws_box_and_center_in_kind_colour() {
        let frame = blank(200, 200);
        let element = Element::new(
            ElementKind::Button,
            "",
            BoundingBox::new(50, 60, 150, 140),
            0.9,
            "",
        );
        let result = AnalysisResult::succeeded(vec![element], Vec::new());
        let out = render_overlay(&frame, &result);

        let green = Rgba([0, 255, 0, 255]);
        assert_eq!(*out.get_pixel(100, 60), green);
        assert_eq!(*out.get_pixel(50, 100), green);
        assert_eq!(*out.get_pixel(100, 100), green);
        assert_eq!(*out.get_pixel(120, 120), Rgba([20, 20, 20, 255]));
    }

    #[test]
    fn tag_text_formats_confidence() {
        let element = Element::new(
            ElementKind::Icon,
            "사용자 아이콘",
            BoundingBox::new(0, 0, 10, 10),
            0.88,
            "",
        );
        assert_eq!(tag_text(&element), "사용자 아이콘 (0.88)");
    }

    #[test]
    fn text_width_counts_unsupported_glyphs() {
        assert_eq!(text_width("신청", 1), text_width("AB", 1));
        assert_eq!(text_width("AB", 2), 22);
    }

    #[test]
    fn elements_near_edges_do_not_panic() {
        let frame = blank(20, 20);
        let element = Element::new(
            ElementKind::Image,
            "edge label that is much wider than the frame",
            BoundingBox::new(0, 0, 19, 19),
            0.5,
            "",
        )
        .with_center(19, 19);
        let result = AnalysisResult::succeeded(vec![element], Vec::new());
        let out = render_overlay(&frame, &result);
        assert_eq!(out.dimensions(), (20, 20));
    }

    #[test]
    fn kind_colours_are_distinct() {
        let colours = [
            kind_colour(ElementKind::Button),
            kind_colour(ElementKind::Text),
            kind_colour(ElementKind::Icon),
            kind_colour(ElementKind::Image),
        ];
        for (i, a) in colours.iter().enumerate() {
            for b in &colours[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
