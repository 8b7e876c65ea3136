//! Runs at most one journey at a time and keeps the last completed one.

use serde::Serialize;

use super::templates::{find_template, Journey, StepStatus};
use crate::utilities::errors::{CoreError, Result};

/// Result of starting a journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyStarted {
    pub journey_id: String,
    pub name: String,
    /// Name of the journey this one replaced, if any.
    pub abandoned: Option<String>,
}

/// Result of one `advance` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAdvance {
    /// Moved on to the next step.
    Next { completed: String, current: String },
    /// The last step was completed and the journey finished.
    Finished { completed: String, journey_name: String },
}

#[derive(Debug, Clone, Default)]
pub struct JourneyStepper {
    active: Option<Journey>,
    last_completed: Option<Journey>,
}

impl JourneyStepper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&Journey> {
        self.active.as_ref()
    }

    pub fn last_completed(&self) -> Option<&Journey> {
        self.last_completed.as_ref()
    }

    pub fn current_instruction(&self) -> Option<&str> {
        self.active
            .as_ref()
            .and_then(Journey::current_step)
            .map(|s| s.instruction.as_str())
    }

    /// Load `template_id` and make its first step active.
    pub fn start(&mut self, template_id: &str) -> Result<JourneyStarted> {
        let mut journey = find_template(template_id).ok_or_else(|| CoreError::UnknownJourney {
            template_id: template_id.to_string(),
        })?;
        if let Some(first) = journey.steps.first_mut() {
            first.status = StepStatus::Active;
        }
        let started = JourneyStarted {
            journey_id: journey.id.clone(),
            name: journey.name.clone(),
            abandoned: self.active.take().map(|j| j.name),
        };
        self.active = Some(journey);
        Ok(started)
    }

    /// Complete the current step. Finishes the journey after the last one.
    /// `None` without an active journey.
    pub fn advance(&mut self) -> Option<StepAdvance> {
        let journey = self.active.as_mut()?;
        let index = journey.current_step_index;
        let step = journey.steps.get_mut(index)?;
        step.status = StepStatus::Completed;
        let completed = step.label.clone();

        journey.current_step_index = index + 1;
        if let Some(next) = journey.steps.get_mut(index + 1) {
            next.status = StepStatus::Active;
            return Some(StepAdvance::Next {
                completed,
                current: next.label.clone(),
            });
        }
        let journey_name = self.finish()?;
        Some(StepAdvance::Finished { completed, journey_name })
    }

    /// End the active journey now. Returns its name.
    pub fn complete(&mut self) -> Option<String> {
        self.finish()
    }

    fn finish(&mut self) -> Option<String> {
        let mut journey = self.active.take()?;
        journey.is_completed = true;
        let name = journey.name.clone();
        self.last_completed = Some(journey);
        Some(name)
    }
}
