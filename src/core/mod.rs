//! The agent core: one owned session object composing every component.
//!
//! ```text
//! process_universal_input(text, view)
//!   ├── command?  → execute directly (switch, train, feed, crash, journey …)
//!   └── otherwise → skill triggers → classifier → pending suggestion
//!                                              → action extractor
//! advance(elapsed) → TimerQueue → switch phase two / health chain
//! every change     → LogLedger + EventHub (+ store, + notifier)
//! ```

pub mod agent;
pub mod clock;
pub mod diagnostics;
pub mod input;

pub use agent::{keys, AgentCore, ThemePreferences};
pub use clock::{shared, spawn_clock, SharedCore};
pub use diagnostics::DiagnosticsReport;
pub use input::InputOutcome;
