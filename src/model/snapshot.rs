use serde::{Deserialize, Serialize};

use crate::foundation::error::{ReportError, ReportResult};
use crate::model::project::{FloorPlan, Observation, Project, Weather};

/// Read-only snapshot of one project's records, taken for the duration of a
/// single report-generation run.
///
/// `plans` and `observations` are in their canonical stored order. For
/// observations that order is the insertion sequence (newest first) and it is
/// the single source of truth for display numbering; any sorted browsing view
/// the editing UI shows is irrelevant here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub project: Project,
    pub plans: Vec<FloorPlan>,
    pub observations: Vec<Observation>,
    #[serde(default)]
    pub weather: Option<Weather>,
}

/// An observation paired with its display number.
///
/// Numbers are assigned once per generation run from canonical order, dense
/// `1..=N`, and used both on map pins and in the detail section.
#[derive(Clone, Copy, Debug)]
pub struct NumberedObservation<'a> {
    pub number: usize,
    pub observation: &'a Observation,
}

impl ProjectSnapshot {
    /// Validate per-record invariants plus cross-record references.
    pub fn validate(&self) -> ReportResult<()> {
        for obs in &self.observations {
            obs.validate()?;
            if let Some(plan_id) = &obs.plan_id
                && !self.plans.iter().any(|p| &p.id == plan_id)
            {
                return Err(ReportError::validation(format!(
                    "observation '{}' references unknown plan '{plan_id}'",
                    obs.id
                )));
            }
        }
        Ok(())
    }

    /// All observations with display numbers assigned from canonical order.
    pub fn numbered_observations(&self) -> Vec<NumberedObservation<'_>> {
        self.observations
            .iter()
            .enumerate()
            .map(|(i, observation)| NumberedObservation {
                number: i + 1,
                observation,
            })
            .collect()
    }

    /// Numbered observations associated with one plan, canonical order.
    pub fn observations_for_plan(&self, plan_id: &str) -> Vec<NumberedObservation<'_>> {
        self.numbered_observations()
            .into_iter()
            .filter(|n| n.observation.plan_id.as_deref() == Some(plan_id))
            .collect()
    }

    /// Plans that will produce a map page: stored order, at least one
    /// associated finding.
    pub fn plans_with_findings(&self) -> Vec<&FloorPlan> {
        self.plans
            .iter()
            .filter(|plan| {
                self.observations
                    .iter()
                    .any(|o| o.plan_id.as_deref() == Some(plan.id.as_str()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::project::{PinCoord, Priority};
    use chrono::Utc;

    fn plan(id: &str) -> FloorPlan {
        FloorPlan {
            id: id.to_string(),
            name: format!("Plan {id}"),
            image_data: vec![],
        }
    }

    fn obs(id: &str, plan_id: Option<&str>) -> Observation {
        Observation {
            id: id.to_string(),
            note: String::new(),
            priority: Priority::Medium,
            plan_id: plan_id.map(str::to_string),
            pin: plan_id.map(|_| PinCoord { x: 50.0, y: 50.0 }),
            photos: vec![],
            trade: String::new(),
            assignee: String::new(),
            created_at: Utc::now(),
        }
    }

    fn snapshot(plans: Vec<FloorPlan>, observations: Vec<Observation>) -> ProjectSnapshot {
        ProjectSnapshot {
            project: Project {
                id: "prj".to_string(),
                name: "Test Project".to_string(),
                location: "Site A".to_string(),
                inspector: "R. Vasquez".to_string(),
                modified_at: Utc::now(),
            },
            plans,
            observations,
            weather: None,
        }
    }

    #[test]
    fn numbering_is_dense_and_follows_stored_order() {
        let snap = snapshot(vec![], vec![obs("a", None), obs("b", None), obs("c", None)]);
        let numbered = snap.numbered_observations();
        let numbers: Vec<usize> = numbered.iter().map(|n| n.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(numbered[0].observation.id, "a");
        assert_eq!(numbered[2].observation.id, "c");
    }

    #[test]
    fn per_plan_filter_keeps_global_numbers() {
        let snap = snapshot(
            vec![plan("p1"), plan("p2")],
            vec![obs("a", Some("p2")), obs("b", None), obs("c", Some("p1"))],
        );
        let on_p1 = snap.observations_for_plan("p1");
        assert_eq!(on_p1.len(), 1);
        // Display number stays the project-wide one, not a per-plan index.
        assert_eq!(on_p1[0].number, 3);
    }

    #[test]
    fn plans_without_findings_are_excluded() {
        let snap = snapshot(
            vec![plan("p1"), plan("p2"), plan("p3")],
            vec![obs("a", Some("p3")), obs("b", Some("p1"))],
        );
        let with = snap.plans_with_findings();
        let ids: Vec<&str> = with.iter().map(|p| p.id.as_str()).collect();
        // Stored plan order, not observation order.
        assert_eq!(ids, vec!["p1", "p3"]);
    }

    #[test]
    fn validate_rejects_unknown_plan_reference() {
        let snap = snapshot(vec![plan("p1")], vec![obs("a", Some("p2"))]);
        assert!(snap.validate().is_err());
    }
}
