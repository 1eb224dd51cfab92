//! Display surface abstraction
//!
//! The core never touches pixels directly. A `Surface` is a 2D raster
//! target with a transform stack, path fill/stroke, text, radial
//! gradients, blend modes and whole-surface snapshots.

use kurbo::{Affine, BezPath, Point, Size, Vec2};

/// Straight-alpha color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity [0.0 - 1.0]
    pub a: f64,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 1.0);
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 1.0);
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0.0);

    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with another opacity
    pub const fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }
}

/// Compositing operator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    #[default]
    SourceOver,
    Overlay,
    Screen,
    Multiply,
}

/// Gradient color stop at `offset` in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f64,
    pub color: Rgba,
}

/// Two-circle radial gradient, interpolating from the start circle to the
/// end circle
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub start: Point,
    pub start_radius: f64,
    pub end: Point,
    pub end_radius: f64,
    pub stops: Vec<ColorStop>,
}

impl RadialGradient {
    pub fn new(start: Point, start_radius: f64, end: Point, end_radius: f64) -> Self {
        Self {
            start,
            start_radius,
            end,
            end_radius,
            stops: Vec::new(),
        }
    }

    pub fn with_stop(mut self, offset: f64, color: Rgba) -> Self {
        self.stops.push(ColorStop {
            offset: offset.clamp(0.0, 1.0),
            color,
        });
        self
    }
}

/// How a snapshot is drawn back onto a surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerOptions {
    pub alpha: f64,
    pub blend: BlendMode,
    /// Gaussian blur radius in pixels, 0 for none
    pub blur_px: f64,
    /// Color multiplied into the copy
    pub tint: Option<Rgba>,
}

impl Default for LayerOptions {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            blend: BlendMode::SourceOver,
            blur_px: 0.0,
            tint: None,
        }
    }
}

/// A 2D raster target
pub trait Surface {
    /// Whole-surface pixel copy
    type Snapshot: Clone;

    /// Size in pixels
    fn size(&self) -> Size;

    /// A new empty surface of the same size
    fn new_layer(&self) -> Self
    where
        Self: Sized;

    /// Clear every pixel to transparent
    fn clear(&mut self);

    /// Push the current transform
    fn save(&mut self);

    /// Pop the transform pushed by the matching `save`
    fn restore(&mut self);

    /// Post-multiply the current transform
    fn transform(&mut self, affine: Affine);

    fn fill_path(&mut self, path: &BezPath, color: Rgba);

    fn stroke_path(&mut self, path: &BezPath, color: Rgba, width: f64);

    /// Draw `text` with its baseline starting at `origin`
    fn fill_text(&mut self, text: &str, origin: Point, size_px: f64, color: Rgba);

    /// Fill the whole surface with a gradient
    fn fill_gradient(&mut self, gradient: &RadialGradient, blend: BlendMode);

    fn snapshot(&self) -> Self::Snapshot;

    /// Replace every pixel with the snapshot
    fn put_snapshot(&mut self, snapshot: &Self::Snapshot);

    /// Draw the snapshot at `offset`
    fn draw_snapshot(&mut self, snapshot: &Self::Snapshot, offset: Vec2, options: LayerOptions);

    /// Draw `layer` over this surface
    fn composite(&mut self, layer: &Self)
    where
        Self: Sized;

    /// Center point
    fn center(&self) -> Point {
        let size = self.size();
        Point::new(size.width / 2.0, size.height / 2.0)
    }
}
