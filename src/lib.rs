#![cfg_attr(not(test), no_std)]

#[cfg(target_os = "none")]
pub mod hardware;
pub mod note;
pub mod settings;
pub mod telemetry;

/// The capacity of the period window. Larger configured windows are rejected.
pub const MAX_WINDOW: usize = 32;
