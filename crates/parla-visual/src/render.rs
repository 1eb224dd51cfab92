//! Feature Renderer - mouth, eyes and eyebrows
//!
//! Features are drawn anchored at the surface center, not at the face's
//! position in the photo. Every point is re-centered on the mouth centroid,
//! offset to the surface center and magnified by
//! `surface_size / (face_size * 3)`. On top of that base scale the mouth is
//! magnified 2x; eyes and eyebrows sit twice as far out again and size
//! their radii at the mouth magnification.
//!
//! Shapes are recomputed from raw landmarks every frame.

use std::f64::consts::PI;

use kurbo::{Arc, BezPath, Ellipse, Point, Shape, Size, Vec2};

use parla_core::{
    FaceGeometry, FeatureGroup, MOUTH_LEFT_CORNER, MOUTH_LOWER_LIP_CENTER, MOUTH_RIGHT_CORNER,
};

use crate::{compose_affine, ExpressionState, Pose, Rgba, Surface};

/// Mouth magnification over the base scale
pub const MOUTH_MAGNIFICATION: f64 = 2.0;
/// Extra magnification of eye and eyebrow positions
pub const FEATURE_SPREAD: f64 = 2.0;

/// Curve flattening tolerance, in pixels
const TOLERANCE: f64 = 0.1;

const MOUTH_FILL: Rgba = Rgba::new(255, 0, 0, 0.7);
const MOUTH_STROKE: Rgba = Rgba::new(0, 0, 0, 0.8);
const TEETH_FILL: Rgba = Rgba::new(255, 255, 255, 0.9);
const TONGUE_FILL: Rgba = Rgba::new(255, 150, 150, 0.8);
const EYE_FILL: Rgba = Rgba::new(255, 255, 255, 0.9);
const EYE_STROKE: Rgba = Rgba::new(0, 0, 0, 0.8);
const PUPIL_FILL: Rgba = Rgba::new(0, 0, 0, 0.9);
const BROW_STROKE: Rgba = Rgba::new(0, 0, 0, 0.8);

/// Where features land on the surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureLayout {
    /// Surface center
    pub center: Point,
    /// `surface_size / (face_size * 3)` per axis
    pub base_scale: Vec2,
    /// Mouth centroid in image coordinates
    pub anchor: Point,
}

impl FeatureLayout {
    pub fn new(surface: Size, geometry: &FaceGeometry) -> Self {
        let face = geometry.face_size();
        Self {
            center: Point::new(surface.width / 2.0, surface.height / 2.0),
            base_scale: Vec2::new(
                surface.width / (face.width * 3.0),
                surface.height / (face.height * 3.0),
            ),
            anchor: geometry.centroid(FeatureGroup::Mouth),
        }
    }

    /// Scale of mouth points, and of eye radii
    pub fn mouth_scale(&self) -> Vec2 {
        self.base_scale * MOUTH_MAGNIFICATION
    }

    /// Scale of eye and eyebrow positions
    pub fn feature_scale(&self) -> Vec2 {
        self.mouth_scale() * FEATURE_SPREAD
    }

    /// Map an image point onto the surface
    pub fn place(&self, p: Point, scale: Vec2) -> Point {
        Point::new(
            self.center.x + (p.x - self.anchor.x) * scale.x,
            self.center.y + (p.y - self.anchor.y) * scale.y,
        )
    }
}

/// Mouth outline plus optional teeth and tongue
#[derive(Debug, Clone)]
pub struct MouthShape {
    pub outline: BezPath,
    /// Present when openness > 0.3
    pub teeth: Option<BezPath>,
    /// Present when openness > 0.5
    pub tongue: Option<BezPath>,
}

/// Build the mouth for `openness`
pub fn mouth_shape(geometry: &FaceGeometry, layout: &FeatureLayout, openness: f64) -> MouthShape {
    let points = geometry.mouth();
    let scale = layout.mouth_scale();
    let place = |p: Point| layout.place(p, scale);

    let mut outline = BezPath::new();
    outline.move_to(place(points[MOUTH_LEFT_CORNER]));
    // Upper lip
    for &p in &points[1..7] {
        outline.line_to(place(p));
    }
    // Right side drops in surface pixels
    for &p in &points[7..12] {
        outline.line_to(place(p) + Vec2::new(0.0, openness * 20.0));
    }
    // Lower lip bulges in image units
    for (i, &p) in points.iter().enumerate().skip(12) {
        let drop = openness * 15.0 * ((i - 12) as f64 / 8.0 * PI).sin();
        outline.line_to(place(Point::new(p.x, p.y + drop)));
    }
    outline.close_path();

    let teeth = (openness > 0.3).then(|| {
        let left = place(points[MOUTH_LEFT_CORNER]);
        let right = place(points[MOUTH_RIGHT_CORNER]);

        let mut teeth = BezPath::new();
        teeth.move_to(left + Vec2::new(2.0, 2.0));
        for &p in &points[1..7] {
            teeth.line_to(place(p) + Vec2::new(0.0, 2.0));
        }
        teeth.line_to(right + Vec2::new(0.0, openness * 10.0));
        teeth.line_to(left + Vec2::new(0.0, openness * 10.0));
        teeth.close_path();
        teeth
    });

    let tongue = (openness > 0.5).then(|| {
        let width = (points[MOUTH_RIGHT_CORNER].x - points[MOUTH_LEFT_CORNER].x) * 0.7;
        let lower_lip = points[MOUTH_LOWER_LIP_CENTER];
        let center = Point::new(
            layout.center.x,
            layout.center.y + (lower_lip.y - layout.anchor.y) * scale.y - 5.0,
        );
        // Lower half ellipse
        let arc = Arc {
            center,
            radii: Vec2::new(width * scale.x / 2.0, openness * 10.0),
            start_angle: 0.0,
            sweep_angle: PI,
            x_rotation: 0.0,
        };
        let mut tongue = arc.to_path(TOLERANCE);
        tongue.close_path();
        tongue
    });

    MouthShape {
        outline,
        teeth,
        tongue,
    }
}

/// One eye: white and pupil
#[derive(Debug, Clone, Copy)]
pub struct EyeShape {
    pub white: Ellipse,
    pub pupil: Ellipse,
}

/// Left and right eye for `openness`
pub fn eye_shapes(geometry: &FaceGeometry, layout: &FeatureLayout, openness: f64) -> [EyeShape; 2] {
    let eye = |group: FeatureGroup| {
        let center = layout.place(geometry.centroid(group), layout.feature_scale());
        let extent = geometry.extent(group);
        let scale = layout.mouth_scale();
        let radii = Vec2::new(extent.width * scale.x, extent.height * scale.y * openness);

        EyeShape {
            white: Ellipse::new(center, radii, 0.0),
            pupil: Ellipse::new(center, radii * 0.3, 0.0),
        }
    };

    [eye(FeatureGroup::LeftEye), eye(FeatureGroup::RightEye)]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BrowSide {
    Left,
    Right,
}

/// Vertical lift of brow point `i`, in image units per unit of raise.
/// The left brow lifts its outer half more, the right brow its inner half.
fn brow_lift(side: BrowSide, i: usize, len: usize) -> f64 {
    let half = len as f64 / 2.0;
    match (side, i) {
        (BrowSide::Left, 0) => 10.0,
        (BrowSide::Right, 0) => 15.0,
        (BrowSide::Left, _) if (i as f64) < half => 5.0,
        (BrowSide::Left, _) => 15.0,
        (BrowSide::Right, _) if (i as f64) > half => 5.0,
        (BrowSide::Right, _) => 15.0,
    }
}

/// Left and right eyebrow polylines for `raise`
pub fn eyebrow_paths(geometry: &FaceGeometry, layout: &FeatureLayout, raise: f64) -> [BezPath; 2] {
    let brow = |group: FeatureGroup, side: BrowSide| {
        let points = geometry.group(group);
        let mut path = BezPath::new();
        for (i, &p) in points.iter().enumerate() {
            let lifted = Point::new(p.x, p.y - raise * brow_lift(side, i, points.len()));
            let placed = layout.place(lifted, layout.feature_scale());
            if i == 0 {
                path.move_to(placed);
            } else {
                path.line_to(placed);
            }
        }
        path
    };

    [
        brow(FeatureGroup::LeftEyebrow, BrowSide::Left),
        brow(FeatureGroup::RightEyebrow, BrowSide::Right),
    ]
}

/// Draws the animated features onto a surface
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureRenderer;

impl FeatureRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Draw mouth, eyes and eyebrows for this frame.
    ///
    /// Everything is drawn inside the pose transform about the surface
    /// center; eyes and eyebrows additionally apply the head tilt/turn.
    pub fn draw<S: Surface>(
        &self,
        surface: &mut S,
        geometry: &FaceGeometry,
        pose: &Pose,
        expression: &ExpressionState,
    ) {
        let layout = FeatureLayout::new(surface.size(), geometry);
        let head = expression.head.about(layout.center);

        surface.save();
        surface.transform(compose_affine(pose).about(layout.center));

        let mouth = mouth_shape(geometry, &layout, expression.mouth_openness);
        surface.fill_path(&mouth.outline, MOUTH_FILL);
        surface.stroke_path(&mouth.outline, MOUTH_STROKE, 2.0);
        if let Some(teeth) = &mouth.teeth {
            surface.fill_path(teeth, TEETH_FILL);
        }
        if let Some(tongue) = &mouth.tongue {
            surface.fill_path(tongue, TONGUE_FILL);
        }

        surface.save();
        surface.transform(head);
        let eyes = eye_shapes(geometry, &layout, expression.eye_openness);
        for eye in &eyes {
            let white = eye.white.to_path(TOLERANCE);
            surface.fill_path(&white, EYE_FILL);
            surface.stroke_path(&white, EYE_STROKE, 1.0);
        }
        for eye in &eyes {
            surface.fill_path(&eye.pupil.to_path(TOLERANCE), PUPIL_FILL);
        }
        surface.restore();

        surface.save();
        surface.transform(head);
        for brow in eyebrow_paths(geometry, &layout, expression.eyebrow_raise) {
            surface.stroke_path(&brow, BROW_STROKE, 3.0);
        }
        surface.restore();

        surface.restore();
    }
}
