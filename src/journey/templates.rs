//! Built-in journey catalog.

use serde::{Deserialize, Serialize};

/// Lifecycle of one journey step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Active,
    Completed,
}

impl Default for StepStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// One ordered step of a journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyStep {
    pub id: String,
    pub label: String,
    pub instruction: String,
    /// Host-side signal expected before advancing. Never evaluated here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_condition: Option<String>,
    #[serde(default)]
    pub status: StepStatus,
}

impl JourneyStep {
    fn new(id: &str, label: &str, instruction: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            instruction: instruction.to_string(),
            trigger_condition: None,
            status: StepStatus::Pending,
        }
    }

    fn on(mut self, condition: &str) -> Self {
        self.trigger_condition = Some(condition.to_string());
        self
    }
}

/// A guided task sequence, either a template or a running instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Journey {
    pub id: String,
    pub name: String,
    pub steps: Vec<JourneyStep>,
    pub current_step_index: usize,
    pub is_completed: bool,
}

impl Journey {
    fn template(id: &str, name: &str, steps: Vec<JourneyStep>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            steps,
            current_step_index: 0,
            is_completed: false,
        }
    }

    pub fn current_step(&self) -> Option<&JourneyStep> {
        if self.is_completed {
            return None;
        }
        self.steps.get(self.current_step_index)
    }

    pub fn completed_steps(&self) -> usize {
        self.steps.iter().filter(|s| s.status == StepStatus::Completed).count()
    }
}

/// Every built-in template, in catalog order.
pub fn journey_templates() -> Vec<Journey> {
    vec![
        Journey::template(
            "onboarding",
            "Getting Started",
            vec![
                JourneyStep::new("welcome", "Meet your agent", "Say hello and tell the agent what you work on."),
                JourneyStep::new("choose-mode", "Pick a mode", "Try /captain or /phantom to see how the persona changes."),
                JourneyStep::new("first-task", "Ask a real question", "Ask for an analysis or a plan related to your work."),
                JourneyStep::new("review-skills", "Review progress", "Open the skills panel and check what leveled up."),
            ],
        ),
        Journey::template(
            "carbon-audit",
            "Carbon Audit",
            vec![
                JourneyStep::new("scope", "Define scope", "Choose the facilities and reporting year to include."),
                JourneyStep::new("collect-data", "Collect activity data", "Upload fuel, electricity and travel records.")
                    .on("data_uploaded"),
                JourneyStep::new("calculate", "Calculate emissions", "Run the emission factor calculation for scopes 1 to 3.")
                    .on("calculation_complete"),
                JourneyStep::new("hotspots", "Review hotspots", "Inspect the largest emission sources and their trends."),
                JourneyStep::new("targets", "Set reduction targets", "Agree a reduction target and export the audit report.")
                    .on("report_exported"),
            ],
        ),
        Journey::template(
            "supplier-review",
            "Supplier Review",
            vec![
                JourneyStep::new("select", "Select supplier", "Pick the supplier to review from the register."),
                JourneyStep::new("questionnaire", "Send questionnaire", "Send the sustainability questionnaire and wait for answers.")
                    .on("questionnaire_returned"),
                JourneyStep::new("risk-score", "Score risk", "Compute the supplier risk score from the answers.")
                    .on("score_computed"),
                JourneyStep::new("decision", "Record decision", "Approve, remediate or offboard the supplier."),
            ],
        ),
    ]
}

/// Look up a template by id, case-insensitively.
pub fn find_template(template_id: &str) -> Option<Journey> {
    let wanted = template_id.trim().to_lowercase();
    journey_templates().into_iter().find(|j| j.id == wanted)
}
