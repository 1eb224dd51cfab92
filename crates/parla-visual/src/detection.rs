//! Detection overlay - face box and mouth outline shown after a face is
//! found, held briefly and then faded out

use std::time::Duration;

use kurbo::{BezPath, Point, Rect, Shape, Size, Vec2};
use parla_core::{FaceGeometry, FrameTime};

use crate::{Rgba, Surface};

pub const DETECTION_LABEL: &str = "Rostro Detectado";

const OVERLAY_STROKE: Rgba = Rgba::new(0, 255, 0, 1.0);
const OVERLAY_LINE_WIDTH: f64 = 2.0;
const LABEL_FILL: Rgba = Rgba::new(0, 255, 0, 0.7);
const LABEL_SIZE_PX: f64 = 14.0;
/// Label baseline above the face box
const LABEL_LIFT: f64 = 5.0;

/// Hold-then-fade schedule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayTiming {
    /// Full opacity from the first drawn frame
    pub hold: Duration,
    /// Opacity removed per fade interval
    pub fade_step: f64,
    pub fade_interval: Duration,
}

impl Default for OverlayTiming {
    fn default() -> Self {
        Self {
            hold: Duration::from_millis(2000),
            fade_step: 0.05,
            fade_interval: Duration::from_millis(50),
        }
    }
}

impl OverlayTiming {
    /// Opacity `elapsed` after the overlay first showed; `None` once it
    /// has faded to nothing
    pub fn opacity(&self, elapsed: Duration) -> Option<f64> {
        let Some(fading) = elapsed.checked_sub(self.hold) else {
            return Some(1.0);
        };
        let interval = self.fade_interval.as_millis().max(1);
        let steps = (fading.as_millis() / interval) as f64;
        let opacity = 1.0 - steps * self.fade_step;
        (opacity > 1e-9).then_some(opacity)
    }
}

/// Detection result drawn over the display in surface coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionOverlay {
    face_box: Rect,
    mouth: Vec<Point>,
    timing: OverlayTiming,
    shown_at: Option<FrameTime>,
}

impl DetectionOverlay {
    /// `scale` maps detector image coordinates onto the surface
    pub fn new(geometry: &FaceGeometry, scale: Vec2, timing: OverlayTiming) -> Self {
        let place = |p: Point| Point::new(p.x * scale.x, p.y * scale.y);
        let face_box = geometry.face_box();
        Self {
            face_box: Rect::from_points(
                place(Point::new(face_box.x0, face_box.y0)),
                place(Point::new(face_box.x1, face_box.y1)),
            ),
            mouth: geometry.mouth().iter().copied().map(place).collect(),
            timing,
            shown_at: None,
        }
    }

    /// Surface size over image size, per axis. Unit scale for an empty
    /// image.
    pub fn scale_between(surface: Size, image: Size) -> Vec2 {
        if image.width <= 0.0 || image.height <= 0.0 {
            return Vec2::new(1.0, 1.0);
        }
        Vec2::new(surface.width / image.width, surface.height / image.height)
    }

    pub fn face_box(&self) -> Rect {
        self.face_box
    }

    pub fn shown_at(&self) -> Option<FrameTime> {
        self.shown_at
    }

    /// Opacity at `now`. The clock starts with the first draw.
    pub fn opacity(&self, now: FrameTime) -> Option<f64> {
        match self.shown_at {
            Some(shown_at) => self.timing.opacity(now - shown_at),
            None => Some(1.0),
        }
    }

    /// Draw at the current opacity. Returns false, drawing nothing, once
    /// the overlay has faded out.
    pub fn draw<S: Surface>(&mut self, surface: &mut S, now: FrameTime) -> bool {
        let shown_at = *self.shown_at.get_or_insert(now);
        let Some(alpha) = self.timing.opacity(now - shown_at) else {
            tracing::debug!("detection overlay faded");
            return false;
        };

        let stroke = OVERLAY_STROKE.with_alpha(OVERLAY_STROKE.a * alpha);
        surface.stroke_path(&self.face_box.to_path(0.1), stroke, OVERLAY_LINE_WIDTH);

        if let Some((first, rest)) = self.mouth.split_first() {
            let mut outline = BezPath::new();
            outline.move_to(*first);
            for p in rest {
                outline.line_to(*p);
            }
            outline.close_path();
            surface.stroke_path(&outline, stroke, OVERLAY_LINE_WIDTH);
        }

        surface.fill_text(
            DETECTION_LABEL,
            Point::new(self.face_box.x0, self.face_box.y0 - LABEL_LIFT),
            LABEL_SIZE_PX,
            LABEL_FILL.with_alpha(LABEL_FILL.a * alpha),
        );
        true
    }
}
