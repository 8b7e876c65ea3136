//! Utility modules: configuration, errors, file IO, console output and
//! keyword matching.

pub mod config;
pub mod errors;
pub mod file_handler;
pub mod printer;
pub mod string_utils;
