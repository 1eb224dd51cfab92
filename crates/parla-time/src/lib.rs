//! Parla Time - Frame timing primitives
//!
//! This crate implements the timing discipline of the render loop:
//! - Frame clocks
//! - Keyed, cancellable one-shot timers for self-expiring state
//! - Frame throttling (skip a tick when the minimum interval has not elapsed)

pub mod clock;
pub mod timer;
pub mod throttle;

pub use clock::*;
pub use timer::*;
pub use throttle::*;
