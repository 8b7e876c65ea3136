//! HTTP surface for the agent core.
//!
//! Exposes the core operations as JSON endpoints over a shared
//! [`SharedCore`](crate::core::SharedCore). The binary drives the timer
//! queue with [`spawn_clock`](crate::core::spawn_clock).

pub mod routes;

pub use routes::{app_router, AppState, SessionSnapshot};
