//! Parla Core - Fundamental types and primitives
//!
//! This crate defines the core types shared by every Parla crate:
//! - Frame time (FrameTime)
//! - Face geometry and the fixed landmark schema
//! - Speech events consumed by the animation core
//! - Error taxonomy
//! - Injectable randomness

pub mod time;
pub mod geometry;
pub mod event;
pub mod random;
pub mod error;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

pub use time::*;
pub use geometry::*;
pub use event::*;
pub use random::*;
pub use error::*;
