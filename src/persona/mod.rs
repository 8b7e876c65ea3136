//! Persona system: identities, the mode registry, and the two-phase mode
//! switcher.
//!
//! ```text
//! AgentMode { companion, captain, phantom, custom }
//!   ↓ resolves through
//! ModeRegistry (built-ins + custom personas + active custom id)
//!   ↓ owned by
//! ModeSwitcher (pending suggestion, begin_switch → SwitchTicket)
//! ```

pub mod profile;
pub mod registry;
pub mod switcher;

pub use profile::{built_in_persona, companion_persona, AgentMode, Persona, PersonaDraft};
pub use registry::{ModeRegistry, RemoveOutcome};
pub use switcher::{ModeSwitcher, SwitchNotice, SwitchTicket};
