//! Frequency capture from edge interrupts.
//!
//! An interrupt handler timestamps every qualifying edge of a periodic input with a free
//! running tick counter and feeds the elapsed periods into a bounded aggregation window.
//! A foreground task polls the window and, once it is full, reduces it to a single
//! frequency estimate.
//!
//! # Design
//! The state shared between the two contexts lives in a [Channel]: the [EdgeTimer] that
//! remembers the previous edge and a [Window] that collects periods. Every shared scalar is
//! a single atomic cell with exactly one writer (the interrupt) and one reader (the
//! foreground), so neither side ever blocks or locks.
//!
//! The foreground owns a [FreqCapture] which borrows the channel, arms the interrupt line and
//! converts the aggregated period into Hertz using the current tick rate of the [Clock].
#![cfg_attr(not(test), no_std)]

mod capture;
pub use capture::*;
mod config;
pub use config::*;
mod edge;
pub use edge::*;
mod estimate;
pub use estimate::*;
mod window;
pub use window::*;

#[cfg(test)]
pub mod testing;

/// A value of the free running hardware tick counter.
///
/// The counter wraps at `u32::MAX`. A value of zero is reserved as the "no previous edge"
/// marker of the [EdgeTimer].
pub type Tick = u32;
