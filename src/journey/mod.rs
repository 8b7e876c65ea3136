//! Guided task sequences bound to named templates.

pub mod stepper;
pub mod templates;

pub use stepper::{JourneyStarted, JourneyStepper, StepAdvance};
pub use templates::{find_template, journey_templates, Journey, JourneyStep, StepStatus};
