use crate::model::project::PinCoord;

/// Map a normalized pin position onto a raster target.
///
/// `coord` is in percent of the target's dimensions, so the same pin maps to
/// the same relative position at any resolution (on-screen preview or full
/// native plan size). Pure; callers treat an absent pin as "not drawn", never
/// as an error.
pub fn map_pin(coord: PinCoord, target_width: u32, target_height: u32) -> (f32, f32) {
    let px = (coord.x / 100.0) * f64::from(target_width);
    let py = (coord.y / 100.0) * f64::from(target_height);
    (px as f32, py as f32)
}
