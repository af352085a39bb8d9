use crate::foundation::style::ReportStyle;
use crate::layout::metrics::{FontKind, text_width_mm};
use crate::model::project::Observation;

/// Greedy word wrap of `text` into lines no wider than `max_width_mm`.
///
/// Words that do not fit on an empty line are hard-broken by character so a
/// single oversized token cannot overflow the content box. Empty input wraps
/// to zero lines.
pub fn wrap_text(text: &str, font: FontKind, size_pt: f32, max_width_mm: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width_mm(&candidate, font, size_pt) <= max_width_mm {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if text_width_mm(word, font, size_pt) <= max_width_mm {
            current = word.to_string();
        } else {
            current = break_long_word(word, font, size_pt, max_width_mm, &mut lines);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Split an oversized word by character; returns the trailing fragment.
fn break_long_word(
    word: &str,
    font: FontKind,
    size_pt: f32,
    max_width_mm: f32,
    lines: &mut Vec<String>,
) -> String {
    let mut fragment = String::new();
    for c in word.chars() {
        let mut candidate = fragment.clone();
        candidate.push(c);
        if !fragment.is_empty() && text_width_mm(&candidate, font, size_pt) > max_width_mm {
            lines.push(std::mem::take(&mut fragment));
            fragment.push(c);
        } else {
            fragment = candidate;
        }
    }
    fragment
}

/// Height of a wrapped text block: line count times line height.
pub fn text_height_mm(lines: usize, line_height_mm: f32) -> f32 {
    lines as f32 * line_height_mm
}

/// Height of a photo grid flowed left-to-right into fixed square cells.
///
/// `ceil(count / per_row)` rows, each `cell + gap` tall; zero photos occupy
/// no height.
pub fn photo_grid_height_mm(count: usize, style: &ReportStyle) -> f32 {
    if count == 0 {
        return 0.0;
    }
    let rows = count.div_ceil(style.photos_per_row);
    rows as f32 * (style.photo_cell_mm + style.photo_gap_mm)
}

/// Vertical cursor over one page, measured from the top edge in millimeters.
///
/// The cursor model enforces the atomic-block policy: callers measure a full
/// block first, then ask [`PageCursor::fits`]; a block that does not fit
/// starts a new page, never a partial placement.
#[derive(Clone, Copy, Debug)]
pub struct PageCursor {
    y_mm: f32,
    page_height_mm: f32,
    margin_mm: f32,
}

impl PageCursor {
    pub fn new(style: &ReportStyle) -> Self {
        Self {
            y_mm: style.margin_mm,
            page_height_mm: style.page_height_mm,
            margin_mm: style.margin_mm,
        }
    }

    /// Current vertical position from the top of the page.
    pub fn y_mm(&self) -> f32 {
        self.y_mm
    }

    /// Space left above the bottom margin.
    pub fn remaining_mm(&self) -> f32 {
        self.page_height_mm - self.margin_mm - self.y_mm
    }

    pub fn fits(&self, height_mm: f32) -> bool {
        height_mm <= self.remaining_mm()
    }

    pub fn advance(&mut self, height_mm: f32) {
        self.y_mm += height_mm;
    }

    /// Reset to the top margin of a fresh page.
    pub fn start_page(&mut self) {
        self.y_mm = self.margin_mm;
    }
}

/// Measured geometry of one finding's detail block.
///
/// Computed in full before placement; the block is placed on the current page
/// only if `total_mm` fits in the remaining space, otherwise deferred whole
/// to a new page.
#[derive(Clone, Debug)]
pub struct BlockMetrics {
    pub header_mm: f32,
    pub meta_mm: f32,
    /// Pre-wrapped description lines at body size.
    pub note_lines: Vec<String>,
    pub note_mm: f32,
    pub grid_mm: f32,
    pub gap_mm: f32,
}

impl BlockMetrics {
    pub fn total_mm(&self) -> f32 {
        self.header_mm + self.meta_mm + self.note_mm + self.grid_mm + self.gap_mm
    }
}

/// Measure a finding's full detail block for the given style.
pub fn measure_block(observation: &Observation, style: &ReportStyle) -> BlockMetrics {
    let note_lines = wrap_text(
        &observation.note,
        FontKind::Regular,
        style.body_font_pt,
        style.content_width_mm(),
    );
    let note_mm = text_height_mm(note_lines.len(), style.line_height_mm);
    let grid_mm = photo_grid_height_mm(observation.photos.len(), style);

    BlockMetrics {
        header_mm: style.line_height_mm * 1.4,
        meta_mm: style.line_height_mm,
        note_lines,
        note_mm,
        grid_mm,
        gap_mm: style.block_gap_mm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::project::Priority;
    use chrono::Utc;

    fn style() -> ReportStyle {
        ReportStyle::default()
    }

    fn obs_with(note: &str, photos: usize) -> Observation {
        Observation {
            id: "o".to_string(),
            note: note.to_string(),
            priority: Priority::Low,
            plan_id: None,
            pin: None,
            photos: vec![vec![0u8]; photos],
            trade: String::new(),
            assignee: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn short_text_stays_on_one_line() {
        let lines = wrap_text("one line", FontKind::Regular, 10.0, 100.0);
        assert_eq!(lines, vec!["one line".to_string()]);
    }

    #[test]
    fn wrapped_lines_respect_the_content_width() {
        let text = "water intrusion visible along the north stairwell wall near level two";
        let lines = wrap_text(text, FontKind::Regular, 10.0, 40.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width_mm(line, FontKind::Regular, 10.0) <= 40.0, "line too wide: {line}");
        }
        // No content lost.
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn empty_text_wraps_to_zero_lines() {
        assert!(wrap_text("", FontKind::Regular, 10.0, 50.0).is_empty());
        assert!(wrap_text("   ", FontKind::Regular, 10.0, 50.0).is_empty());
    }

    #[test]
    fn oversized_word_is_hard_broken() {
        let word = "x".repeat(300);
        let lines = wrap_text(&word, FontKind::Regular, 10.0, 30.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width_mm(line, FontKind::Regular, 10.0) <= 30.0);
        }
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn text_height_is_lines_times_line_height() {
        assert_eq!(text_height_mm(0, 4.6), 0.0);
        assert_eq!(text_height_mm(7, 4.6), 7.0 * 4.6);
    }

    #[test]
    fn grid_height_follows_ceil_rows() {
        let s = style();
        let row = s.photo_cell_mm + s.photo_gap_mm;
        assert_eq!(photo_grid_height_mm(0, &s), 0.0);
        assert_eq!(photo_grid_height_mm(1, &s), row);
        assert_eq!(photo_grid_height_mm(3, &s), row);
        assert_eq!(photo_grid_height_mm(4, &s), 2.0 * row);
        // 7 photos flow as 3-3-1 across three rows.
        assert_eq!(photo_grid_height_mm(7, &s), 3.0 * row);
    }

    #[test]
    fn cursor_tracks_remaining_space() {
        let s = style();
        let mut cursor = PageCursor::new(&s);
        let full = s.page_height_mm - 2.0 * s.margin_mm;
        assert_eq!(cursor.remaining_mm(), full);
        assert!(cursor.fits(full));
        assert!(!cursor.fits(full + 0.1));

        cursor.advance(100.0);
        assert_eq!(cursor.remaining_mm(), full - 100.0);
        cursor.start_page();
        assert_eq!(cursor.remaining_mm(), full);
    }

    #[test]
    fn block_that_does_not_fit_is_deferred_whole() {
        let s = style();
        let block = measure_block(&obs_with("short note", 4), &s);
        let mut cursor = PageCursor::new(&s);
        // Leave just under the block's height on the page.
        cursor.advance(cursor.remaining_mm() - block.total_mm() + 1.0);
        assert!(!cursor.fits(block.total_mm()));
        cursor.start_page();
        assert!(cursor.fits(block.total_mm()));
    }

    #[test]
    fn block_height_sums_all_parts() {
        let s = style();
        let block = measure_block(&obs_with("a few words of note text", 7), &s);
        let expected = block.header_mm + block.meta_mm + block.note_mm + block.grid_mm + block.gap_mm;
        assert_eq!(block.total_mm(), expected);
        assert_eq!(block.grid_mm, photo_grid_height_mm(7, &s));
        assert_eq!(
            block.note_mm,
            text_height_mm(block.note_lines.len(), s.line_height_mm)
        );
    }
}
