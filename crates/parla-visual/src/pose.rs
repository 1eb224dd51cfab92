//! Pose/Transform Engine - pseudo-3D head pose
//!
//! The head is never modelled in 3D. A pose is three small rotations plus a
//! forward translation, advanced by closed-form oscillators over time, and
//! flattened into a 2D affine for the renderer. The flattening is a fixed
//! approximation of the Euler rotation matrix: the z-row is dropped and
//! the result is scaled by distance, nothing is projected.

use kurbo::{Affine, Point, Vec2};

use parla_core::{FrameTime, ParlaError, ParlaResult};

/// Default perspective distance
pub const DEFAULT_PERSPECTIVE: f64 = 1000.0;

/// Head pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Rotation about the horizontal axis (nod), radians
    pub rotate_x: f64,
    /// Rotation about the vertical axis (turn), radians
    pub rotate_y: f64,
    /// Rotation about the view axis (tilt), radians
    pub rotate_z: f64,
    /// Forward translation
    pub translate_z: f64,
    /// Perspective distance (> 0)
    pub(crate) perspective: f64,
    pub scale: f64,
}

impl Default for Pose {
    fn default() -> Self {
        Self::neutral()
    }
}

impl Pose {
    /// Resting pose
    pub fn neutral() -> Self {
        Self {
            rotate_x: 0.0,
            rotate_y: 0.0,
            rotate_z: 0.0,
            translate_z: 0.0,
            perspective: DEFAULT_PERSPECTIVE,
            scale: 1.0,
        }
    }

    /// Same pose with another perspective distance
    pub fn with_perspective(mut self, perspective: f64) -> ParlaResult<Self> {
        if !(perspective > 0.0) || !perspective.is_finite() {
            return Err(ParlaError::InvalidPerspective(perspective));
        }
        self.perspective = perspective;
        Ok(self)
    }

    pub fn perspective(&self) -> f64 {
        self.perspective
    }

    /// Scale factor from forward translation
    pub fn depth_scale(&self) -> f64 {
        1.0 + self.translate_z / self.perspective * 0.1
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::neutral()
    }
}

/// Which oscillator drives the pose this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoseMode {
    /// Slow drift while waiting
    Idle,
    /// Fast nod gesture
    Nodding,
    /// Fast turn gesture
    Turning,
    /// Gentle sway and breathing while speaking
    Speaking,
}

impl PoseMode {
    /// Mode while speaking: nodding wins over turning, either over sway
    pub fn from_flags(nodding: bool, turning: bool) -> Self {
        if nodding {
            PoseMode::Nodding
        } else if turning {
            PoseMode::Turning
        } else {
            PoseMode::Speaking
        }
    }
}

/// Advance the pose to `time`
pub fn advance_pose(pose: &Pose, mode: PoseMode, time: FrameTime) -> Pose {
    let t = time.as_millis_f64();
    let mut next = *pose;

    match mode {
        PoseMode::Idle => {
            next.rotate_x = (t / 3000.0).sin() * 0.02;
            next.rotate_y = (t / 4000.0).sin() * 0.02;
            next.rotate_z = (t / 5000.0).sin() * 0.01;
            next.translate_z = (t / 2000.0).sin() * 3.0;
        }
        PoseMode::Nodding => {
            next.rotate_x = (t / 200.0).sin() * 0.1;
        }
        PoseMode::Turning => {
            next.rotate_y = (t / 300.0).sin() * 0.15;
        }
        PoseMode::Speaking => {
            next.rotate_x = (t / 2000.0).sin() * 0.03;
            next.rotate_y = (t / 3000.0).sin() * 0.03;
            next.rotate_z = (t / 4000.0).sin() * 0.01;
            // Breathing
            next.translate_z = (t / 1500.0).sin() * 5.0;
        }
    }

    next
}

/// 2D head motion applied to eyes and eyebrows on top of the pose
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HeadMotion {
    /// Rotation, radians
    pub tilt: f64,
    /// Horizontal stretch, added to 1
    pub turn: f64,
    pub forward: f64,
}

impl HeadMotion {
    /// T(c)·R(tilt)·S(1+turn, 1)·T(−c)
    pub fn about(&self, center: Point) -> Affine {
        let c = center.to_vec2();
        Affine::translate(c)
            * Affine::rotate(self.tilt)
            * Affine::scale_non_uniform(1.0 + self.turn, 1.0)
            * Affine::translate(-c)
    }
}

/// Head motion for this tick. `pose` must already be advanced.
pub fn head_motion(pose: &Pose, mode: PoseMode, time: FrameTime, previous: HeadMotion) -> HeadMotion {
    let t = time.as_millis_f64();
    match mode {
        PoseMode::Idle => previous,
        PoseMode::Nodding => HeadMotion {
            tilt: (t / 200.0).sin() * 0.05,
            ..previous
        },
        PoseMode::Turning => HeadMotion {
            turn: (t / 300.0).sin() * 0.05,
            ..previous
        },
        PoseMode::Speaking => HeadMotion {
            tilt: pose.rotate_z,
            turn: pose.rotate_y,
            forward: pose.translate_z,
        },
    }
}

/// Linear part of the flattened pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseAffine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    /// Depth scale already folded into a..d
    pub scale: f64,
}

/// Flatten a pose into a 2D affine with zero translation
///
/// Not the full 3D rotation product: `d` is `cos(x)·cos(z)` and the
/// matrix's `sin(x)·sin(y)·sin(z)` term is left out. Head motion is tuned
/// to this shear; do not replace it with the exact product.
pub fn compose_affine(pose: &Pose) -> PoseAffine {
    let (sx, cx) = pose.rotate_x.sin_cos();
    let (sy, cy) = pose.rotate_y.sin_cos();
    let (sz, cz) = pose.rotate_z.sin_cos();
    let s = pose.depth_scale();

    PoseAffine {
        a: s * cy * cz,
        b: s * (sx * sy * cz + cx * sz),
        c: -s * sy,
        d: s * cx * cz,
        scale: s,
    }
}

impl PoseAffine {
    pub const IDENTITY: PoseAffine = PoseAffine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        scale: 1.0,
    };

    /// As a kurbo affine, translation zero
    pub fn to_affine(&self) -> Affine {
        Affine::new([self.a, self.b, self.c, self.d, 0.0, 0.0])
    }

    /// (a, b, c, d, scale, translation)
    pub fn coefficients(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.scale, 0.0]
    }

    /// T(center)·M·T(−center)
    pub fn about(&self, center: Point) -> Affine {
        let c: Vec2 = center.to_vec2();
        Affine::translate(c) * self.to_affine() * Affine::translate(-c)
    }
}
