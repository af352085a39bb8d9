use std::io::{BufWriter, Cursor};

use chrono::{DateTime, Utc};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::*;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::foundation::error::{ReportError, ReportResult};
use crate::foundation::style::{ReportStyle, Rgba};
use crate::layout::engine::{BlockMetrics, PageCursor, measure_block};
use crate::layout::metrics::{FontKind, PT_TO_MM};
use crate::model::snapshot::{NumberedObservation, ProjectSnapshot};
use crate::render::plan::{ComposedPlan, compose_plan};
use crate::report::naming::artifact_file_name;

const META_GRAY: Rgba = Rgba::rgb(115, 115, 115);
const PLACEHOLDER_GRAY: Rgba = Rgba::rgb(229, 229, 229);

/// The finished multi-page document, ready for the save/download collaborator.
#[derive(Clone, Debug)]
pub struct ReportArtifact {
    /// Deterministic file name derived from the project name.
    pub file_name: String,
    /// Encoded PDF bytes.
    pub bytes: Vec<u8>,
    pub page_count: usize,
    /// Plans that produced a map page, in stored order.
    pub map_plan_ids: Vec<String>,
}

/// Assemble the full report from a snapshot: cover, map pages, detail pages.
///
/// Page phases run in strict order with no backtracking. Per-item failures
/// (one plan, one photo) are absorbed at the item boundary and logged; any
/// other failure aborts the run and no artifact is produced. Callers are
/// expected to have checked for an empty observation set already; see
/// [`crate::export_report`].
#[tracing::instrument(skip_all, fields(project = %snapshot.project.id))]
pub fn assemble_report(
    snapshot: &ProjectSnapshot,
    style: &ReportStyle,
    generated_at: DateTime<Utc>,
) -> ReportResult<ReportArtifact> {
    snapshot.validate()?;

    let mut writer = DocumentWriter::new(snapshot.project.name.clone(), style)?;

    writer.cover_page(snapshot, generated_at);
    let map_plan_ids = writer.map_pages(snapshot)?;
    writer.detail_pages(snapshot);

    let page_count = writer.page_count;
    let bytes = writer.finish()?;
    debug!(pages = page_count, "report assembled");

    Ok(ReportArtifact {
        file_name: artifact_file_name(&snapshot.project.name),
        bytes,
        page_count,
        map_plan_ids,
    })
}

/// Page-producing state: current layer, top-down cursor, loaded fonts.
struct DocumentWriter<'a> {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    cursor: PageCursor,
    style: &'a ReportStyle,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    page_count: usize,
}

impl<'a> DocumentWriter<'a> {
    fn new(title: String, style: &'a ReportStyle) -> ReportResult<Self> {
        let (doc, page, layer) = PdfDocument::new(
            title,
            Mm(style.page_width_mm),
            Mm(style.page_height_mm),
            "content",
        );
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::render(format!("builtin font: {e}")))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::render(format!("builtin font: {e}")))?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            cursor: PageCursor::new(style),
            style,
            regular,
            bold,
            page_count: 1,
        })
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(
            Mm(self.style.page_width_mm),
            Mm(self.style.page_height_mm),
            "content",
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor.start_page();
        self.page_count += 1;
    }

    fn font(&self, kind: FontKind) -> &IndirectFontRef {
        match kind {
            FontKind::Regular => &self.regular,
            FontKind::Bold => &self.bold,
        }
    }

    fn set_fill(&self, color: Rgba) {
        let (r, g, b) = color.to_f32();
        self.layer
            .set_fill_color(Color::Rgb(printpdf::Rgb::new(r, g, b, None)));
    }

    /// Draw one line of text whose top edge sits at `y_top_mm` from the page
    /// top. The PDF origin is bottom-left, so the baseline is converted here.
    fn text(&self, text: &str, kind: FontKind, size_pt: f32, x_mm: f32, y_top_mm: f32) {
        let baseline_from_top = y_top_mm + size_pt * PT_TO_MM * 0.8;
        let y = self.style.page_height_mm - baseline_from_top;
        self.layer
            .use_text(text, size_pt, Mm(x_mm), Mm(y), self.font(kind));
    }

    /// One text line at the cursor, advancing by `advance_mm`.
    fn line(&mut self, text: &str, kind: FontKind, size_pt: f32, advance_mm: f32) {
        self.text(text, kind, size_pt, self.style.margin_mm, self.cursor.y_mm());
        self.cursor.advance(advance_mm);
    }

    fn filled_rect(&self, x_mm: f32, y_top_mm: f32, w_mm: f32, h_mm: f32, color: Rgba) {
        let top = self.style.page_height_mm - y_top_mm;
        let bottom = top - h_mm;
        let points = vec![
            (Point::new(Mm(x_mm), Mm(bottom)), false),
            (Point::new(Mm(x_mm + w_mm), Mm(bottom)), false),
            (Point::new(Mm(x_mm + w_mm), Mm(top)), false),
            (Point::new(Mm(x_mm), Mm(top)), false),
        ];
        self.set_fill(color);
        self.layer.add_polygon(Polygon {
            rings: vec![points],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
        self.set_fill(Rgba::rgb(0, 0, 0));
    }

    /// Embed an RGB raster fitted into a box, top-left anchored, centered on
    /// the horizontal axis of the box.
    fn place_image(
        &self,
        rgb: ::image::RgbImage,
        x_mm: f32,
        y_top_mm: f32,
        max_w_mm: f32,
        max_h_mm: f32,
    ) {
        let (w_px, h_px) = rgb.dimensions();
        if w_px == 0 || h_px == 0 {
            return;
        }
        let aspect = h_px as f32 / w_px as f32;
        let mut w_mm = max_w_mm;
        let mut h_mm = w_mm * aspect;
        if h_mm > max_h_mm {
            h_mm = max_h_mm;
            w_mm = h_mm / aspect;
        }
        let dpi = w_px as f32 * 25.4 / w_mm;
        let x = x_mm + (max_w_mm - w_mm) / 2.0;
        let y = self.style.page_height_mm - y_top_mm - h_mm;

        let xobject = ImageXObject {
            width: Px(w_px as usize),
            height: Px(h_px as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: false,
            image_data: rgb.into_raw(),
            image_filter: None,
            clipping_bbox: None,
            smask: None,
        };
        Image::from(xobject).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(x)),
                translate_y: Some(Mm(y)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
    }

    // Phase 1: cover/summary.
    fn cover_page(&mut self, snapshot: &ProjectSnapshot, generated_at: DateTime<Utc>) {
        let s = self.style;
        let title_advance = s.title_font_pt * PT_TO_MM * 1.5;
        let header_advance = s.header_font_pt * PT_TO_MM * 1.5;

        self.line("Inspection Report", FontKind::Bold, s.title_font_pt, title_advance);
        self.line(
            &snapshot.project.name,
            FontKind::Bold,
            s.header_font_pt,
            header_advance,
        );
        self.cursor.advance(s.line_height_mm);

        let body = s.body_font_pt;
        let lh = s.line_height_mm;
        let lines = [
            format!("Location: {}", snapshot.project.location),
            format!("Inspector: {}", snapshot.project.inspector),
            format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M UTC")),
            format!("Total findings: {}", snapshot.observations.len()),
        ];
        for text in &lines {
            self.line(text, FontKind::Regular, body, lh);
        }

        if let Some(weather) = &snapshot.weather {
            self.cursor.advance(lh);
            self.line("Site Weather", FontKind::Bold, s.header_font_pt, header_advance);
            let rows = [
                format!("Temperature: {:.1} \u{b0}C", weather.temp_c),
                format!("Condition: {}", weather.condition),
                format!("Humidity: {:.0}%", weather.humidity),
                format!("Wind: {}", weather.wind),
            ];
            for text in &rows {
                self.line(text, FontKind::Regular, body, lh);
            }
        }
    }

    // Phase 2: one page per plan with at least one associated finding.
    //
    // Compositing runs in parallel; page emission follows the plans' stored
    // order regardless. A plan that fails to composite is skipped without a
    // page and the rest of the document continues.
    fn map_pages(&mut self, snapshot: &ProjectSnapshot) -> ReportResult<Vec<String>> {
        let candidates = snapshot.plans_with_findings();
        // The document handle is single-threaded; only the pure compositing
        // step fans out. Results come back in stored plan order.
        let style = self.style;
        let composited: Vec<ReportResult<ComposedPlan>> = candidates
            .par_iter()
            .map(|plan| compose_plan(plan, &snapshot.observations_for_plan(&plan.id), style))
            .collect();

        let mut emitted = Vec::new();
        for (plan, result) in candidates.iter().zip(composited) {
            let composed = match result {
                Ok(composed) => composed,
                Err(err) => {
                    warn!(plan = %plan.id, error = %err, "skipping plan page");
                    continue;
                }
            };
            self.new_page();
            let s = self.style;
            let header_advance = s.header_font_pt * PT_TO_MM * 1.6;
            self.line(&plan.name, FontKind::Bold, s.header_font_pt, header_advance);
            self.place_image(
                composed.to_rgb8(),
                s.margin_mm,
                self.cursor.y_mm(),
                s.content_width_mm(),
                self.cursor.remaining_mm(),
            );
            emitted.push(plan.id.clone());
        }
        Ok(emitted)
    }

    // Phase 3: detail blocks for every finding, canonical order.
    fn detail_pages(&mut self, snapshot: &ProjectSnapshot) {
        self.new_page();
        let s = self.style;
        self.line(
            "Findings",
            FontKind::Bold,
            s.header_font_pt,
            s.header_font_pt * PT_TO_MM * 1.8,
        );

        for numbered in snapshot.numbered_observations() {
            let block = measure_block(numbered.observation, s);
            if !self.cursor.fits(block.total_mm()) {
                self.new_page();
            }
            if let Err(err) = self.finding_block(snapshot, &numbered, &block) {
                warn!(
                    observation = %numbered.observation.id,
                    error = %err,
                    "skipping finding block"
                );
            }
        }
    }

    /// Draw one finding's atomic block at the cursor.
    fn finding_block(
        &mut self,
        snapshot: &ProjectSnapshot,
        numbered: &NumberedObservation<'_>,
        block: &BlockMetrics,
    ) -> ReportResult<()> {
        let s = self.style;
        let obs = numbered.observation;

        let mut header = format!("#{}  {}", numbered.number, obs.priority.label());
        if !obs.trade.is_empty() {
            header.push_str(" \u{2014} ");
            header.push_str(&obs.trade);
        }
        self.set_fill(s.palette.color_for(obs.priority));
        self.line(&header, FontKind::Bold, s.header_font_pt, block.header_mm);
        self.set_fill(Rgba::rgb(0, 0, 0));

        let mut meta = Vec::new();
        if let Some(plan_id) = &obs.plan_id
            && let Some(plan) = snapshot.plans.iter().find(|p| &p.id == plan_id)
        {
            meta.push(format!("Plan: {}", plan.name));
        }
        if !obs.assignee.is_empty() {
            meta.push(format!("Assigned: {}", obs.assignee));
        }
        meta.push(format!("Recorded: {}", obs.created_at.format("%Y-%m-%d")));
        self.set_fill(META_GRAY);
        self.line(&meta.join("   \u{b7}   "), FontKind::Regular, s.meta_font_pt, block.meta_mm);
        self.set_fill(Rgba::rgb(0, 0, 0));

        for text in &block.note_lines {
            self.line(text, FontKind::Regular, s.body_font_pt, s.line_height_mm);
        }

        self.photo_grid(obs.id.as_str(), &obs.photos, block.grid_mm);
        self.cursor.advance(block.gap_mm);
        Ok(())
    }

    /// Flow photos left-to-right into fixed square cells, wrapping after
    /// `photos_per_row`. A photo that fails to decode gets a placeholder cell
    /// so the grid geometry stays as measured.
    fn photo_grid(&mut self, observation_id: &str, photos: &[Vec<u8>], grid_mm: f32) {
        if photos.is_empty() {
            return;
        }
        let s = self.style;
        let cell = s.photo_cell_mm;
        let gap = s.photo_gap_mm;

        for (i, payload) in photos.iter().enumerate() {
            let col = i % s.photos_per_row;
            let row = i / s.photos_per_row;
            let x = s.margin_mm + col as f32 * (cell + gap);
            let y = self.cursor.y_mm() + row as f32 * (cell + gap);

            match ::image::load_from_memory(payload) {
                Ok(img) => self.place_image(img.to_rgb8(), x, y, cell, cell),
                Err(err) => {
                    warn!(
                        observation = %observation_id,
                        photo = i,
                        error = %err,
                        "photo decode failed, placing placeholder"
                    );
                    self.filled_rect(x, y, cell, cell, PLACEHOLDER_GRAY);
                }
            }
        }
        self.cursor.advance(grid_mm);
    }

    // Phase 4: hand the encoded document back as bytes.
    fn finish(self) -> ReportResult<Vec<u8>> {
        let mut bytes = Vec::new();
        {
            let mut writer = BufWriter::new(Cursor::new(&mut bytes));
            self.doc
                .save(&mut writer)
                .map_err(|e| ReportError::render(format!("pdf serialization: {e}")))?;
        }
        Ok(bytes)
    }
}
