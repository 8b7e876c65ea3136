//! # Adaptive Agent Core
//!
//! Session state machine for a multi-persona assistant. One [`AgentCore`]
//! owns the active behavioral mode and its persona, a pending mode
//! suggestion, skill and agent progression, guided journeys, a simulated
//! system health cycle, extracted action items and an activity log.
//!
//! All timed behavior (the second phase of a mode switch, health decay and
//! recovery) runs on a virtual clock. Hosts drive it with
//! [`AgentCore::advance`], or with [`core::spawn_clock`] under tokio.
//!
//! ```no_run
//! use std::time::Duration;
//! use adaptive_agent_core::{AgentCore, AgentMode};
//!
//! let mut core = AgentCore::default();
//! core.process_universal_input("the api latency log shows errors", None);
//! assert_eq!(core.pending_suggestion(), Some(AgentMode::Phantom));
//! core.confirm_suggestion();
//! core.advance(Duration::from_millis(800));
//! ```

pub mod actions;
pub mod core;
pub mod events;
pub mod health;
pub mod intent;
pub mod interfaces;
pub mod journey;
pub mod logs;
pub mod persona;
pub mod scheduler;
pub mod server;
pub mod skills;
pub mod utilities;

pub use crate::core::{AgentCore, InputOutcome, ThemePreferences};
pub use actions::{ActionItem, ActionPriority, ActionStatus};
pub use events::{CoreEvent, EventEnvelope};
pub use health::HealthState;
pub use interfaces::{KeyValueStore, Notifier};
pub use journey::{Journey, JourneyStep};
pub use logs::{LogEntry, LogSource, LogType};
pub use persona::{AgentMode, Persona, PersonaDraft};
pub use skills::{AgentLevel, LevelGain, Skill, SkillAward};
pub use utilities::config::CoreConfig;
pub use utilities::errors::{CoreError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
