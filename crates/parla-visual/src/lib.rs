//! Parla Visual - The animated face
//!
//! Everything drawn on top of the photo lives here:
//! - Pose/Transform Engine: pseudo-3D head pose and its 2D affine
//! - Expression State Machine: speech-driven flags, parameters and blinks
//! - Feature Renderer: mouth, eyes and eyebrows from raw landmarks
//! - Post-Processing: lighting, blur, chromatic aberration, vignette
//! - Detection Overlay: the found face, shown briefly after detection
//!
//! # Frame pipeline
//!
//! ```text
//! Expression + Pose → Feature Renderer → Post-Processing → Surface
//! ```
//!
//! Drawing goes through the `Surface` trait; `DisplayList` records the
//! draw calls for inspection.

pub mod pose;
pub mod expression;
pub mod blink;
pub mod surface;
pub mod display_list;
pub mod render;
pub mod lighting;
pub mod detection;

pub use pose::*;
pub use expression::*;
pub use blink::*;
pub use surface::*;
pub use display_list::*;
pub use render::*;
pub use lighting::*;
pub use detection::*;
