use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use tracing::info;

use crate::foundation::error::ReportResult;
use crate::foundation::style::ReportStyle;
use crate::model::snapshot::ProjectSnapshot;
use crate::report::assembler::{ReportArtifact, assemble_report};

/// Single-flight gate for report generation.
///
/// The caller owns the gate; the engine itself holds no global state. At most
/// one run is in flight per gate: [`ExportGate::try_begin`] hands out a
/// permit, and a second invocation while one is live sees `None` and is
/// reported as [`ExportOutcome::Busy`] rather than interleaved.
#[derive(Debug, Default)]
pub struct ExportGate {
    in_flight: AtomicBool,
}

impl ExportGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the gate, or `None` if a run is already in flight.
    pub fn try_begin(&self) -> Option<ExportPermit<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ExportPermit { gate: self })
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Releases the gate on drop, including on error paths.
#[derive(Debug)]
pub struct ExportPermit<'a> {
    gate: &'a ExportGate,
}

impl Drop for ExportPermit<'_> {
    fn drop(&mut self) {
        self.gate.in_flight.store(false, Ordering::Release);
    }
}

/// Result of one generation attempt.
#[derive(Clone, Debug)]
pub enum ExportOutcome {
    /// A complete document was produced.
    Completed(ReportArtifact),
    /// Zero findings to report: not an error, generation never starts.
    NothingToExport,
    /// Another run holds the gate; this invocation was ignored.
    Busy,
}

/// Generate a report from a read-only project snapshot.
///
/// The snapshot must not be mutated for the duration of the run; that is the
/// caller's responsibility (the editing UI is expected to hold off during
/// export). Per-item render failures inside are absorbed and logged; only
/// whole-run failures surface as `Err`, and then no artifact exists.
pub fn export_report(
    gate: &ExportGate,
    snapshot: &ProjectSnapshot,
    style: &ReportStyle,
) -> ReportResult<ExportOutcome> {
    let Some(_permit) = gate.try_begin() else {
        info!(project = %snapshot.project.id, "export already in flight, ignoring");
        return Ok(ExportOutcome::Busy);
    };

    if snapshot.observations.is_empty() {
        info!(project = %snapshot.project.id, "nothing to export");
        return Ok(ExportOutcome::NothingToExport);
    }

    let artifact = assemble_report(snapshot, style, Utc::now())?;
    info!(
        project = %snapshot.project.id,
        file = %artifact.file_name,
        pages = artifact.page_count,
        "export complete"
    );
    Ok(ExportOutcome::Completed(artifact))
}
