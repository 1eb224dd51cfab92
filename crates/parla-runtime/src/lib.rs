//! Parla Runtime - Session orchestration and the frame loop
//!
//! This crate ties the animation core together. Every rendered frame runs
//! the same stages:
//! 1. Expire expression timers
//! 2. Advance pose and head motion
//! 3. Blink
//! 4. Expression overrides
//! 5. Restore the base photo, clear the canvas, draw features
//! 6. Lighting
//! 7. Shader effects
//! 8. Present, with the detection overlay on top until it fades
//! 9. Passive decay
//!
//! The host calls `AnimationSession::on_frame` from its frame callback, or
//! lets `FrameDriver` multiplex frames with the speech event stream.

pub mod config;
pub mod logging;
pub mod status;
pub mod detector;
pub mod scheduler;
pub mod session;
pub mod driver;

pub use config::*;
pub use logging::*;
pub use status::*;
pub use detector::*;
pub use scheduler::*;
pub use session::*;
pub use driver::*;
