//! Advance widths for the builtin PDF Helvetica faces.
//!
//! Values are thousandths of an em from the Adobe base-14 AFM data, ASCII
//! range only; anything outside it falls back to an average advance. Widths
//! feed the wrap pass, which must know line counts before anything is drawn.

/// One point expressed in millimeters.
pub const PT_TO_MM: f32 = 0.352_778;

/// The two builtin faces the report uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontKind {
    Regular,
    Bold,
}

/// Fallback advance for characters outside the table.
const DEFAULT_WIDTH: u16 = 556;

/// Helvetica advances for ASCII 0x20..=0x7E.
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333,
    278, 278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278,
    584, 584, 584, 556, 1015, 667, 667, 722, 722, 667, 611, 778, 722, 278,
    500, 667, 556, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 278, 278, 278, 469, 556, 333, 556, 556, 500, 556, 556,
    278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333, 500,
    278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold advances for ASCII 0x20..=0x7E.
#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333,
    278, 278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333,
    584, 584, 584, 611, 975, 722, 722, 722, 722, 667, 611, 778, 722, 278,
    556, 722, 611, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 333, 278, 333, 584, 556, 333, 556, 611, 556, 611, 556,
    333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389, 556,
    333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Advance of a single character in thousandths of an em.
fn char_width(c: char, font: FontKind) -> u16 {
    let table = match font {
        FontKind::Regular => &HELVETICA,
        FontKind::Bold => &HELVETICA_BOLD,
    };
    let code = c as u32;
    if (0x20..=0x7E).contains(&code) {
        table[(code - 0x20) as usize]
    } else {
        DEFAULT_WIDTH
    }
}

/// Width of `text` in points at the given font size.
pub fn text_width_pt(text: &str, font: FontKind, size_pt: f32) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(c, font))).sum();
    units as f32 / 1000.0 * size_pt
}

/// Width of `text` in page millimeters at the given font size.
pub fn text_width_mm(text: &str, font: FontKind, size_pt: f32) -> f32 {
    text_width_pt(text, font, size_pt) * PT_TO_MM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_is_additive_over_chars() {
        let ab = text_width_pt("ab", FontKind::Regular, 10.0);
        let a = text_width_pt("a", FontKind::Regular, 10.0);
        let b = text_width_pt("b", FontKind::Regular, 10.0);
        assert!((ab - (a + b)).abs() < 1e-4);
    }

    #[test]
    fn width_scales_linearly_with_size() {
        let at10 = text_width_pt("inspection", FontKind::Regular, 10.0);
        let at20 = text_width_pt("inspection", FontKind::Regular, 20.0);
        assert!((at20 - 2.0 * at10).abs() < 1e-3);
    }

    #[test]
    fn bold_is_no_narrower_than_regular() {
        let r = text_width_pt("Finding #12", FontKind::Regular, 12.0);
        let b = text_width_pt("Finding #12", FontKind::Bold, 12.0);
        assert!(b >= r);
    }

    #[test]
    fn digits_share_a_fixed_advance() {
        let w0 = text_width_pt("0", FontKind::Regular, 10.0);
        for d in ["1", "2", "3", "4", "5", "6", "7", "8", "9"] {
            assert_eq!(text_width_pt(d, FontKind::Regular, 10.0), w0);
        }
    }

    #[test]
    fn non_ascii_falls_back_to_average() {
        assert_eq!(
            text_width_pt("é", FontKind::Regular, 10.0),
            f32::from(DEFAULT_WIDTH) / 1000.0 * 10.0
        );
    }
}
