//! Process management for the inference server.
//!
//! This module provides:
//! - Server command composition and process replacement (`launcher`)
//! - Foreground children with signal forwarding (`relay`)

pub mod launcher;
pub mod relay;

pub use launcher::{LaunchError, ServerLauncher};
pub use relay::run_foreground;
