use serde::{Deserialize, Serialize};

use crate::foundation::error::{ReportError, ReportResult};
use crate::model::project::Priority;

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same color with a replaced alpha channel.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
    pub fn parse_hex(s: &str) -> ReportResult<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        if !s.is_ascii() {
            return Err(ReportError::validation(
                "hex color must be #RRGGBB or #RRGGBBAA",
            ));
        }

        fn hex_byte(pair: &str) -> ReportResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| ReportError::validation(format!("invalid hex byte \"{pair}\"")))
        }

        match s.len() {
            6 => Ok(Self {
                r: hex_byte(&s[0..2])?,
                g: hex_byte(&s[2..4])?,
                b: hex_byte(&s[4..6])?,
                a: 255,
            }),
            8 => Ok(Self {
                r: hex_byte(&s[0..2])?,
                g: hex_byte(&s[2..4])?,
                b: hex_byte(&s[4..6])?,
                a: hex_byte(&s[6..8])?,
            }),
            _ => Err(ReportError::validation(
                "hex color must be #RRGGBB or #RRGGBBAA",
            )),
        }
    }

    /// Channels as normalized floats, for PDF fill/outline colors.
    pub fn to_f32(self) -> (f32, f32, f32) {
        (
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }
}

/// Fixed priority color coding used on pins and in the detail section.
///
/// Medium and Low share one color; the mapping is exhaustive over the four
/// priorities and has no fifth case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityPalette {
    pub critical: Rgba,
    pub high: Rgba,
    pub standard: Rgba,
}

impl PriorityPalette {
    pub fn color_for(&self, priority: Priority) -> Rgba {
        match priority {
            Priority::Critical => self.critical,
            Priority::High => self.high,
            Priority::Medium | Priority::Low => self.standard,
        }
    }
}

impl Default for PriorityPalette {
    fn default() -> Self {
        Self {
            critical: Rgba::rgb(0xdc, 0x26, 0x26),
            high: Rgba::rgb(0xf9, 0x73, 0x16),
            standard: Rgba::rgb(0x25, 0x63, 0xeb),
        }
    }
}

/// All page and marker styling in one place.
///
/// Every component reads from this struct; none carry their own styling
/// literals. Lengths are millimeters on the page, font sizes are points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportStyle {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
    /// Baseline-to-baseline distance for body text.
    pub line_height_mm: f32,
    /// Vertical gap between finding blocks in the detail section.
    pub block_gap_mm: f32,

    pub title_font_pt: f32,
    pub header_font_pt: f32,
    pub body_font_pt: f32,
    pub meta_font_pt: f32,

    /// Square photo cell edge length.
    pub photo_cell_mm: f32,
    /// Gap between photo cells, both axes.
    pub photo_gap_mm: f32,
    /// Photos per grid row before wrapping.
    pub photos_per_row: usize,

    /// Pin base radius as a fraction of the larger plan dimension.
    pub pin_radius_frac: f32,
    /// JPEG quality for flattened plan images.
    pub plan_jpeg_quality: u8,

    pub palette: PriorityPalette,
}

impl Default for ReportStyle {
    fn default() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 15.0,
            line_height_mm: 4.6,
            block_gap_mm: 6.0,
            title_font_pt: 22.0,
            header_font_pt: 12.0,
            body_font_pt: 10.0,
            meta_font_pt: 8.5,
            photo_cell_mm: 50.0,
            photo_gap_mm: 4.0,
            photos_per_row: 3,
            pin_radius_frac: 0.015,
            plan_jpeg_quality: 85,
            palette: PriorityPalette::default(),
        }
    }
}

impl ReportStyle {
    /// Horizontal space available for content between the page margins.
    pub fn content_width_mm(&self) -> f32 {
        self.page_width_mm - 2.0 * self.margin_mm
    }
}
