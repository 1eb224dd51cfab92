//! Recording surface
//!
//! `DisplayList` implements `Surface` by recording draw operations with the
//! transform active when they were issued. Headless hosts and tests use it
//! to inspect exactly what a frame drew.

use std::cell::Cell;

use kurbo::{Affine, BezPath, Point, Size, Vec2};

use crate::{BlendMode, LayerOptions, RadialGradient, Rgba, Surface};

/// One recorded draw operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillPath {
        path: BezPath,
        color: Rgba,
        transform: Affine,
    },
    StrokePath {
        path: BezPath,
        color: Rgba,
        width: f64,
        transform: Affine,
    },
    FillText {
        text: String,
        origin: Point,
        size_px: f64,
        color: Rgba,
        transform: Affine,
    },
    FillGradient {
        gradient: RadialGradient,
        blend: BlendMode,
        transform: Affine,
    },
    /// Surface contents replaced by snapshot `id`
    PutSnapshot { id: u64 },
    DrawSnapshot {
        id: u64,
        offset: Vec2,
        options: LayerOptions,
        transform: Affine,
    },
    /// Another surface drawn on top
    Composite { ops: Vec<DrawOp> },
}

/// Snapshot of a `DisplayList`
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySnapshot {
    pub id: u64,
    pub ops: Vec<DrawOp>,
}

/// Recording surface
#[derive(Debug, Clone)]
pub struct DisplayList {
    size: Size,
    ops: Vec<DrawOp>,
    transform: Affine,
    stack: Vec<Affine>,
    next_snapshot: Cell<u64>,
}

impl DisplayList {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            ops: Vec::new(),
            transform: Affine::IDENTITY,
            stack: Vec::new(),
            next_snapshot: Cell::new(0),
        }
    }

    /// Operations since the last clear or snapshot restore
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn current_transform(&self) -> Affine {
        self.transform
    }

    /// Number of unmatched `save` calls
    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    /// Snapshot-draws, in order, as (options, offset)
    pub fn snapshot_draws(&self) -> Vec<(LayerOptions, Vec2)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::DrawSnapshot { options, offset, .. } => Some((*options, *offset)),
                _ => None,
            })
            .collect()
    }

    /// Text draws, in order
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Gradient fills, in order
    pub fn gradient_fills(&self) -> Vec<(&RadialGradient, BlendMode)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillGradient { gradient, blend, .. } => Some((gradient, *blend)),
                _ => None,
            })
            .collect()
    }
}

impl Surface for DisplayList {
    type Snapshot = DisplaySnapshot;

    fn size(&self) -> Size {
        self.size
    }

    fn new_layer(&self) -> Self {
        Self::new(self.size)
    }

    fn clear(&mut self) {
        self.ops.clear();
    }

    fn save(&mut self) {
        self.stack.push(self.transform);
    }

    fn restore(&mut self) {
        match self.stack.pop() {
            Some(transform) => self.transform = transform,
            None => tracing::warn!("restore without matching save"),
        }
    }

    fn transform(&mut self, affine: Affine) {
        self.transform = self.transform * affine;
    }

    fn fill_path(&mut self, path: &BezPath, color: Rgba) {
        self.ops.push(DrawOp::FillPath {
            path: path.clone(),
            color,
            transform: self.transform,
        });
    }

    fn stroke_path(&mut self, path: &BezPath, color: Rgba, width: f64) {
        self.ops.push(DrawOp::StrokePath {
            path: path.clone(),
            color,
            width,
            transform: self.transform,
        });
    }

    fn fill_text(&mut self, text: &str, origin: Point, size_px: f64, color: Rgba) {
        self.ops.push(DrawOp::FillText {
            text: text.to_string(),
            origin,
            size_px,
            color,
            transform: self.transform,
        });
    }

    fn fill_gradient(&mut self, gradient: &RadialGradient, blend: BlendMode) {
        self.ops.push(DrawOp::FillGradient {
            gradient: gradient.clone(),
            blend,
            transform: self.transform,
        });
    }

    fn snapshot(&self) -> DisplaySnapshot {
        let id = self.next_snapshot.get();
        self.next_snapshot.set(id + 1);
        DisplaySnapshot {
            id,
            ops: self.ops.clone(),
        }
    }

    fn put_snapshot(&mut self, snapshot: &DisplaySnapshot) {
        self.ops.clear();
        self.ops.push(DrawOp::PutSnapshot { id: snapshot.id });
    }

    fn draw_snapshot(&mut self, snapshot: &DisplaySnapshot, offset: Vec2, options: LayerOptions) {
        self.ops.push(DrawOp::DrawSnapshot {
            id: snapshot.id,
            offset,
            options,
            transform: self.transform,
        });
    }

    fn composite(&mut self, layer: &Self) {
        self.ops.push(DrawOp::Composite {
            ops: layer.ops.clone(),
        });
    }
}
