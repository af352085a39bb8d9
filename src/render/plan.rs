use std::io::Cursor;

use tiny_skia::Pixmap;

use crate::foundation::error::{ReportError, ReportResult};
use crate::foundation::style::ReportStyle;
use crate::model::project::FloorPlan;
use crate::model::snapshot::NumberedObservation;
use crate::render::mapper::map_pin;
use crate::render::pin::{base_radius, draw_pin};

/// A flattened plan raster with all pins burned in.
///
/// The original plan asset is never mutated; this is a derived artifact at
/// the plan's native resolution.
#[derive(Clone, Debug)]
pub struct ComposedPlan {
    pub width: u32,
    pub height: u32,
    pixmap: Pixmap,
}

impl ComposedPlan {
    /// Flattened pixels as straight-alpha RGBA, row-major.
    pub fn to_rgba8(&self) -> image::RgbaImage {
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for px in self.pixmap.pixels() {
            let c = px.demultiply();
            out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        // Buffer length matches dimensions by construction.
        image::RgbaImage::from_raw(self.width, self.height, out)
            .expect("pixmap dimensions match buffer")
    }

    /// Flattened pixels with alpha dropped, for JPEG/PDF embedding.
    pub fn to_rgb8(&self) -> image::RgbImage {
        image::DynamicImage::ImageRgba8(self.to_rgba8()).to_rgb8()
    }

    /// Encode the flattened raster as lossy JPEG.
    pub fn encode_jpeg(&self, quality: u8) -> ReportResult<Vec<u8>> {
        let rgb = self.to_rgb8();
        let mut buf = Vec::new();
        let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
            Cursor::new(&mut buf),
            quality,
        );
        encoder
            .encode(
                rgb.as_raw(),
                self.width,
                self.height,
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| ReportError::render(format!("jpeg encode failed: {e}")))?;
        Ok(buf)
    }
}

/// Composite a floor plan with every located observation assigned to it.
///
/// The surface matches the plan's native pixel dimensions exactly (print
/// quality is preserved, never scaled down). Observations without a pin are
/// skipped silently; an absent pin means the finding has no map location
/// and draws nothing. Output is
/// deterministic for identical inputs.
///
/// A payload that fails to decode fails only this plan; the caller decides
/// whether to continue with the rest of the document.
pub fn compose_plan(
    plan: &FloorPlan,
    observations: &[NumberedObservation<'_>],
    style: &ReportStyle,
) -> ReportResult<ComposedPlan> {
    let base = image::load_from_memory(&plan.image_data)
        .map_err(|e| ReportError::decode(format!("plan '{}' image: {e}", plan.id)))?
        .to_rgba8();
    let (width, height) = base.dimensions();

    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        ReportError::render(format!("plan '{}' has empty dimensions", plan.id))
    })?;
    copy_premultiplied(&base, &mut pixmap);

    let radius = base_radius(width, height, style.pin_radius_frac);
    for numbered in observations {
        let Some(coord) = numbered.observation.pin else {
            continue;
        };
        let (px, py) = map_pin(coord, width, height);
        draw_pin(
            &mut pixmap,
            px,
            py,
            &numbered.number.to_string(),
            numbered.observation.priority,
            radius,
            &style.palette,
        )?;
    }

    Ok(ComposedPlan {
        width,
        height,
        pixmap,
    })
}

/// Copy straight-alpha pixels into the premultiplied pixmap storage.
fn copy_premultiplied(src: &image::RgbaImage, dst: &mut Pixmap) {
    fn premul(c: u8, a: u8) -> u8 {
        (((u16::from(c) * u16::from(a)) + 127) / 255) as u8
    }

    let data = dst.data_mut();
    for (i, px) in src.pixels().enumerate() {
        let [r, g, b, a] = px.0;
        let o = i * 4;
        data[o] = premul(r, a);
        data[o + 1] = premul(g, a);
        data[o + 2] = premul(b, a);
        data[o + 3] = a;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::project::{Observation, PinCoord, Priority};
    use chrono::Utc;
    use std::io::Cursor;

    fn png_plan(id: &str, w: u32, h: u32) -> FloorPlan {
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba([240, 240, 240, 255]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        FloorPlan {
            id: id.to_string(),
            name: format!("Plan {id}"),
            image_data: buf,
        }
    }

    fn located_obs(id: &str, plan_id: &str, x: f64, y: f64) -> Observation {
        Observation {
            id: id.to_string(),
            note: String::new(),
            priority: Priority::Critical,
            plan_id: Some(plan_id.to_string()),
            pin: Some(PinCoord { x, y }),
            photos: vec![],
            trade: String::new(),
            assignee: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn output_matches_native_dimensions() {
        let plan = png_plan("p1", 320, 180);
        let composed = compose_plan(&plan, &[], &ReportStyle::default()).unwrap();
        assert_eq!((composed.width, composed.height), (320, 180));
    }

    #[test]
    fn pin_paints_at_mapped_position() {
        let plan = png_plan("p1", 400, 400);
        let obs = located_obs("o1", "p1", 50.0, 50.0);
        let numbered = [NumberedObservation {
            number: 1,
            observation: &obs,
        }];
        let composed = compose_plan(&plan, &numbered, &ReportStyle::default()).unwrap();
        let rgba = composed.to_rgba8();

        // Disc interior left of center: red-dominant over the gray base.
        let p = rgba.get_pixel(196, 200);
        assert!(p[0] > 200 && p[0] > p[2], "expected critical red, got {p:?}");
        // Far corner untouched.
        assert_eq!(rgba.get_pixel(4, 4).0, [240, 240, 240, 255]);
    }

    #[test]
    fn unlocated_observation_never_pins() {
        let plan = png_plan("p1", 200, 200);
        let mut obs = located_obs("o1", "p1", 50.0, 50.0);
        obs.pin = None;
        let numbered = [NumberedObservation {
            number: 1,
            observation: &obs,
        }];
        let composed = compose_plan(&plan, &numbered, &ReportStyle::default()).unwrap();
        let rgba = composed.to_rgba8();
        assert!(
            rgba.pixels().all(|p| p.0 == [240, 240, 240, 255]),
            "plan must be untouched when no observation has coordinates"
        );
    }

    #[test]
    fn compositing_is_deterministic() {
        let plan = png_plan("p1", 300, 220);
        let a_obs = located_obs("o1", "p1", 20.0, 30.0);
        let b_obs = located_obs("o2", "p1", 80.0, 70.0);
        let numbered = [
            NumberedObservation {
                number: 1,
                observation: &a_obs,
            },
            NumberedObservation {
                number: 2,
                observation: &b_obs,
            },
        ];
        let style = ReportStyle::default();
        let first = compose_plan(&plan, &numbered, &style).unwrap();
        let second = compose_plan(&plan, &numbered, &style).unwrap();
        assert_eq!(first.to_rgba8().as_raw(), second.to_rgba8().as_raw());
    }

    #[test]
    fn corrupt_payload_fails_decode_only() {
        let plan = FloorPlan {
            id: "bad".to_string(),
            name: "Bad".to_string(),
            image_data: vec![0xde, 0xad, 0xbe, 0xef],
        };
        let err = compose_plan(&plan, &[], &ReportStyle::default()).unwrap_err();
        assert!(matches!(err, ReportError::Decode(_)));
    }

    #[test]
    fn jpeg_roundtrip_preserves_dimensions() {
        let plan = png_plan("p1", 128, 96);
        let composed = compose_plan(&plan, &[], &ReportStyle::default()).unwrap();
        let jpeg = composed.encode_jpeg(85).unwrap();
        let back = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((back.width(), back.height()), (128, 96));
    }
}
