use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::foundation::error::{ReportError, ReportResult};

/// Photo count the record store caps new observations at. The engine itself
/// renders whatever the snapshot carries; the grid wraps at any count.
pub const MAX_PHOTOS_PER_OBSERVATION: usize = 5;

/// Fixed ordinal severity, `Critical` highest.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Uppercase tag used in detail-block headers.
    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Critical => "CRITICAL",
        }
    }
}

/// Pin position as a percentage of the referenced plan's dimensions.
///
/// Both axes are in `[0, 100]` regardless of the plan's pixel size, so a pin
/// stays correctly placed at any target resolution.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PinCoord {
    pub x: f64,
    pub y: f64,
}

impl PinCoord {
    pub fn new(x: f64, y: f64) -> ReportResult<Self> {
        let coord = Self { x, y };
        coord.validate()?;
        Ok(coord)
    }

    pub fn validate(self) -> ReportResult<()> {
        let in_range = |v: f64| v.is_finite() && (0.0..=100.0).contains(&v);
        if !in_range(self.x) || !in_range(self.y) {
            return Err(ReportError::validation(format!(
                "pin coordinates must be within [0,100], got ({}, {})",
                self.x, self.y
            )));
        }
        Ok(())
    }
}

/// Project identity fields shown on the cover page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub location: String,
    pub inspector: String,
    pub modified_at: DateTime<Utc>,
}

/// A floor-plan raster that findings can be pinned to.
///
/// `image_data` is an opaque encoded payload (PNG/JPEG); it is decoded at
/// composite time and never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloorPlan {
    pub id: String,
    pub name: String,
    pub image_data: Vec<u8>,
}

/// One recorded inspection finding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub id: String,
    pub note: String,
    pub priority: Priority,
    /// Plan this finding is pinned to. Set if and only if `pin` is set.
    #[serde(default)]
    pub plan_id: Option<String>,
    #[serde(default)]
    pub pin: Option<PinCoord>,
    /// Encoded photo payloads. The record store caps new captures at
    /// [`MAX_PHOTOS_PER_OBSERVATION`]; rendering accepts any count.
    #[serde(default)]
    pub photos: Vec<Vec<u8>>,
    #[serde(default)]
    pub trade: String,
    #[serde(default)]
    pub assignee: String,
    pub created_at: DateTime<Utc>,
}

impl Observation {
    /// Enforce the pin pairing invariant: plan reference and coordinates are
    /// set together or not at all.
    pub fn validate(&self) -> ReportResult<()> {
        match (&self.plan_id, &self.pin) {
            (Some(_), None) => {
                return Err(ReportError::validation(format!(
                    "observation '{}' has a plan reference but no pin coordinates",
                    self.id
                )));
            }
            (None, Some(_)) => {
                return Err(ReportError::validation(format!(
                    "observation '{}' has pin coordinates but no plan reference",
                    self.id
                )));
            }
            _ => {}
        }
        if let Some(pin) = self.pin {
            pin.validate()?;
        }
        Ok(())
    }
}

/// Optional site weather snapshot for the cover page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    /// Temperature in degrees Celsius.
    pub temp_c: f64,
    pub condition: String,
    /// Relative humidity in percent.
    pub humidity: f64,
    pub wind: String,
}
