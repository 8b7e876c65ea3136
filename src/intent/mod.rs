//! Intent detection over free text: the mode classifier and the explicit
//! command parser.

pub mod classifier;
pub mod commands;

pub use classifier::{classify, score, view_prior, IntentScores};
pub use commands::{parse_command, Command};
