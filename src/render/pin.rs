use tiny_skia::{FillRule, LineCap, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::foundation::error::{ReportError, ReportResult};
use crate::foundation::style::{PriorityPalette, Rgba};
use crate::model::project::Priority;

/// Glow disc radius relative to the base radius.
const GLOW_SCALE: f32 = 1.5;
/// Glow opacity, ~20%.
const GLOW_ALPHA: u8 = 51;
/// Ring stroke width relative to the base radius.
const RING_SCALE: f32 = 0.2;

/// Stroked polyline segments for decimal digits on a unit box (width 0.6,
/// height 1.0, y down). Seven strokes, one bit each in [`DIGIT_SEGMENTS`].
const SEGMENTS: [[(f32, f32); 2]; 7] = [
    [(0.0, 0.0), (0.6, 0.0)], // top
    [(0.6, 0.0), (0.6, 0.5)], // upper right
    [(0.6, 0.5), (0.6, 1.0)], // lower right
    [(0.0, 1.0), (0.6, 1.0)], // bottom
    [(0.0, 0.5), (0.0, 1.0)], // lower left
    [(0.0, 0.0), (0.0, 0.5)], // upper left
    [(0.0, 0.5), (0.6, 0.5)], // middle
];

/// Per-digit segment masks, bit `i` selects `SEGMENTS[i]`.
const DIGIT_SEGMENTS: [u8; 10] = [
    0b011_1111, // 0
    0b000_0110, // 1
    0b101_1011, // 2
    0b100_1111, // 3
    0b110_0110, // 4
    0b110_1101, // 5
    0b111_1101, // 6
    0b000_0111, // 7
    0b111_1111, // 8
    0b110_1111, // 9
];

const DIGIT_WIDTH: f32 = 0.6;
const DIGIT_SPACING: f32 = 0.3;

/// Base pin radius for a raster target.
///
/// Scales with the larger target dimension so markers stay proportionate on
/// small previews and full-resolution plans alike.
pub fn base_radius(target_width: u32, target_height: u32, radius_frac: f32) -> f32 {
    (target_width.max(target_height) as f32 * radius_frac).max(1.0)
}

/// Draw one location marker onto `pixmap`.
///
/// Paint order, each pass over the prior: translucent glow disc, solid
/// priority-colored disc, white ring, white numeric label. Mutates the target
/// surface only.
pub fn draw_pin(
    pixmap: &mut Pixmap,
    px: f32,
    py: f32,
    label: &str,
    priority: Priority,
    radius: f32,
    palette: &PriorityPalette,
) -> ReportResult<()> {
    if !(px.is_finite() && py.is_finite()) || radius <= 0.0 {
        return Err(ReportError::render(format!(
            "degenerate pin geometry at ({px}, {py}), radius {radius}"
        )));
    }

    let color = palette.color_for(priority);

    fill_circle(pixmap, px, py, radius * GLOW_SCALE, color.with_alpha(GLOW_ALPHA))?;
    fill_circle(pixmap, px, py, radius, color)?;
    stroke_circle(pixmap, px, py, radius, radius * RING_SCALE, Rgba::rgb(255, 255, 255))?;
    draw_label(pixmap, px, py, label, radius)?;

    Ok(())
}

fn solid_paint(color: Rgba) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn fill_circle(pixmap: &mut Pixmap, cx: f32, cy: f32, r: f32, color: Rgba) -> ReportResult<()> {
    let mut pb = PathBuilder::new();
    pb.push_circle(cx, cy, r);
    let path = pb
        .finish()
        .ok_or_else(|| ReportError::render("pin disc path construction failed"))?;
    pixmap.fill_path(
        &path,
        &solid_paint(color),
        FillRule::Winding,
        Transform::identity(),
        None,
    );
    Ok(())
}

fn stroke_circle(
    pixmap: &mut Pixmap,
    cx: f32,
    cy: f32,
    r: f32,
    width: f32,
    color: Rgba,
) -> ReportResult<()> {
    let mut pb = PathBuilder::new();
    pb.push_circle(cx, cy, r);
    let path = pb
        .finish()
        .ok_or_else(|| ReportError::render("pin ring path construction failed"))?;
    let stroke = Stroke {
        width,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &solid_paint(color), &stroke, Transform::identity(), None);
    Ok(())
}

/// Draw the display-index label centered on the pin.
///
/// Digits are stroked plotter-style glyphs with round caps, white, sized so
/// the glyph height equals the base radius. Only decimal digits occur in
/// labels; anything else is skipped.
fn draw_label(pixmap: &mut Pixmap, cx: f32, cy: f32, label: &str, radius: f32) -> ReportResult<()> {
    let digits: Vec<usize> = label
        .chars()
        .filter_map(|c| c.to_digit(10).map(|d| d as usize))
        .collect();
    if digits.is_empty() {
        return Ok(());
    }

    let h = radius;
    let n = digits.len() as f32;
    let group_w = (n * DIGIT_WIDTH + (n - 1.0) * DIGIT_SPACING) * h;
    let top = cy - h / 2.0;

    let mut pb = PathBuilder::new();
    for (i, digit) in digits.iter().enumerate() {
        let left = cx - group_w / 2.0 + i as f32 * (DIGIT_WIDTH + DIGIT_SPACING) * h;
        let mask = DIGIT_SEGMENTS[*digit];
        for (bit, seg) in SEGMENTS.iter().enumerate() {
            if mask & (1 << bit) == 0 {
                continue;
            }
            let [(x0, y0), (x1, y1)] = *seg;
            pb.move_to(left + x0 * h, top + y0 * h);
            pb.line_to(left + x1 * h, top + y1 * h);
        }
    }
    let path = pb
        .finish()
        .ok_or_else(|| ReportError::render("pin label path construction failed"))?;

    let stroke = Stroke {
        width: h * 0.2,
        line_cap: LineCap::Round,
        ..Stroke::default()
    };
    pixmap.stroke_path(
        &path,
        &solid_paint(Rgba::rgb(255, 255, 255)),
        &stroke,
        Transform::identity(),
        None,
    );
    Ok(())
}
