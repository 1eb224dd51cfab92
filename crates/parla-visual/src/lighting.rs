//! Post-Processing - lighting and shader-like effects
//!
//! Runs after the features are drawn, in surface space:
//!
//! 1. Lighting: an overlay gradient from a key light that drifts with time
//!    and follows the head, plus a counter-shadow on the opposite side
//! 2. Shader: blur, chromatic aberration, vignette, always in that order

use kurbo::{Point, Size, Vec2};

use parla_core::FrameTime;

use crate::{BlendMode, LayerOptions, Pose, RadialGradient, Rgba, Surface};

/// Post-processing tuning
#[derive(Debug, Clone)]
pub struct PostProcessConfig {
    /// Apply the lighting pass
    pub lighting: bool,
    /// Apply the shader pass
    pub shader: bool,
    /// Key light drift amplitude in pixels (x, y)
    pub light_drift: Vec2,
    /// Key light drift period divisor, milliseconds
    pub light_drift_period_ms: f64,
    /// How far head rotation pushes the light, as a fraction of surface size
    pub light_follow: f64,
    /// Inner gradient radius in pixels
    pub light_inner_radius: f64,
    /// Outer gradient radius as a fraction of surface width
    pub light_outer_radius: f64,
    /// Depth-of-field blur radius in pixels
    pub blur_px: f64,
    /// Opacity of each chromatic copy
    pub aberration_alpha: f64,
    /// Chromatic offset in pixels per radian of head turn
    pub aberration_gain: f64,
    /// Vignette start and end radius, as fractions of surface width
    pub vignette_inner: f64,
    pub vignette_outer: f64,
    pub vignette_alpha: f64,
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        Self {
            lighting: true,
            shader: true,
            light_drift: Vec2::new(50.0, 30.0),
            light_drift_period_ms: 2000.0,
            light_follow: 0.3,
            light_inner_radius: 10.0,
            light_outer_radius: 0.8,
            blur_px: 1.0,
            aberration_alpha: 0.3,
            aberration_gain: 2.0,
            vignette_inner: 0.3,
            vignette_outer: 0.7,
            vignette_alpha: 0.3,
        }
    }
}

impl PostProcessConfig {
    /// No post-processing at all
    pub fn flat() -> Self {
        Self {
            lighting: false,
            shader: false,
            ..Default::default()
        }
    }
}

const RED_TINT: Rgba = Rgba::new(255, 0, 0, 1.0);
const BLUE_TINT: Rgba = Rgba::new(0, 0, 255, 1.0);

/// Applies lighting and shader passes to a surface
#[derive(Debug, Clone, Default)]
pub struct PostProcessor {
    config: PostProcessConfig,
}

impl PostProcessor {
    pub fn new(config: PostProcessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PostProcessConfig {
        &self.config
    }

    /// Lighting then shader, each if enabled
    pub fn apply<S: Surface>(&self, surface: &mut S, pose: &Pose, time: FrameTime) {
        if self.config.lighting {
            self.apply_lighting(surface, pose, time);
        }
        if self.config.shader {
            self.apply_shader(surface, pose);
        }
    }

    /// Key light position for this frame
    pub fn light_position(&self, size: Size, pose: &Pose, time: FrameTime) -> Point {
        let t = time.as_millis_f64() / self.config.light_drift_period_ms;
        let follow = self.config.light_follow;
        Point::new(
            size.width / 2.0
                + t.sin() * self.config.light_drift.x
                + (pose.rotate_y * 5.0).sin() * size.width * follow,
            size.height / 2.0
                + t.cos() * self.config.light_drift.y
                + (pose.rotate_x * 5.0).sin() * size.height * follow,
        )
    }

    /// Overlay key light and counter-shadow
    pub fn apply_lighting<S: Surface>(&self, surface: &mut S, pose: &Pose, time: FrameTime) {
        let size = surface.size();
        let center = surface.center();
        let light = self.light_position(size, pose, time);
        let inner = self.config.light_inner_radius;
        let outer = size.width * self.config.light_outer_radius;

        let key = RadialGradient::new(light, inner, center, outer)
            .with_stop(0.0, Rgba::WHITE.with_alpha(0.15))
            .with_stop(0.5, Rgba::WHITE.with_alpha(0.05))
            .with_stop(1.0, Rgba::BLACK.with_alpha(0.2));
        surface.fill_gradient(&key, BlendMode::Overlay);

        let shadow_at = Point::new(size.width - light.x, size.height - light.y);
        let shadow = RadialGradient::new(shadow_at, inner, center, outer)
            .with_stop(0.0, Rgba::BLACK.with_alpha(0.2))
            .with_stop(0.5, Rgba::BLACK.with_alpha(0.1))
            .with_stop(1.0, Rgba::TRANSPARENT);
        surface.fill_gradient(&shadow, BlendMode::Overlay);
    }

    /// Blur, chromatic aberration, vignette
    pub fn apply_shader<S: Surface>(&self, surface: &mut S, pose: &Pose) {
        let snapshot = surface.snapshot();

        // Stage 1: depth-of-field blur
        surface.draw_snapshot(
            &snapshot,
            Vec2::ZERO,
            LayerOptions {
                blur_px: self.config.blur_px,
                ..Default::default()
            },
        );

        // Stage 2: chromatic aberration, stronger as the head turns
        let shift = pose.rotate_y.abs() * self.config.aberration_gain;
        for (offset, tint) in [(shift, RED_TINT), (-shift, BLUE_TINT)] {
            surface.draw_snapshot(
                &snapshot,
                Vec2::new(offset, 0.0),
                LayerOptions {
                    alpha: self.config.aberration_alpha,
                    blend: BlendMode::Screen,
                    blur_px: 0.0,
                    tint: Some(tint),
                },
            );
        }

        // Stage 3: vignette
        let size = surface.size();
        let center = surface.center();
        let vignette = RadialGradient::new(
            center,
            size.width * self.config.vignette_inner,
            center,
            size.width * self.config.vignette_outer,
        )
        .with_stop(0.0, Rgba::TRANSPARENT)
        .with_stop(1.0, Rgba::BLACK.with_alpha(self.config.vignette_alpha));
        surface.fill_gradient(&vignette, BlendMode::Multiply);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DisplayList, DrawOp};

    fn surface() -> DisplayList {
        DisplayList::new(Size::new(400.0, 300.0))
    }

    #[test]
    fn test_shader_order() {
        let mut surface = surface();
        let pose = Pose {
            rotate_y: -0.1,
            ..Pose::neutral()
        };

        PostProcessor::default().apply_shader(&mut surface, &pose);

        let draws = surface.snapshot_draws();
        assert_eq!(draws.len(), 3);

        // Blur first
        assert_eq!(draws[0].0.blur_px, 1.0);
        assert_eq!(draws[0].0.blend, BlendMode::SourceOver);
        assert_eq!(draws[0].1, Vec2::ZERO);

        // Then the two chromatic copies
        for (options, _) in &draws[1..] {
            assert_eq!(options.blend, BlendMode::Screen);
            assert_eq!(options.alpha, 0.3);
        }
        assert!((draws[1].1.x - 0.2).abs() < 1e-12);
        assert!((draws[2].1.x + 0.2).abs() < 1e-12);
        assert_eq!(draws[1].0.tint, Some(RED_TINT));
        assert_eq!(draws[2].0.tint, Some(BLUE_TINT));

        // Vignette last
        assert!(matches!(
            surface.ops().last(),
            Some(DrawOp::FillGradient {
                blend: BlendMode::Multiply,
                ..
            })
        ));
        let (vignette, _) = surface.gradient_fills()[0];
        assert_eq!(vignette.start_radius, 120.0);
        assert_eq!(vignette.end_radius, 280.0);
    }

    #[test]
    fn test_lighting_gradients() {
        let mut surface = surface();
        let processor = PostProcessor::default();

        processor.apply_lighting(&mut surface, &Pose::neutral(), FrameTime::ZERO);

        let fills = surface.gradient_fills();
        assert_eq!(fills.len(), 2);

        // At rest the light sits 30px below center
        let (key, blend) = fills[0];
        assert_eq!(blend, BlendMode::Overlay);
        assert_eq!(key.start, Point::new(200.0, 180.0));
        assert_eq!(key.start_radius, 10.0);
        assert_eq!(key.end, Point::new(200.0, 150.0));
        assert_eq!(key.end_radius, 320.0);
        assert_eq!(key.stops[0].color, Rgba::WHITE.with_alpha(0.15));
        assert_eq!(key.stops[2].color, Rgba::BLACK.with_alpha(0.2));

        // Shadow mirrors the light through the center
        let (shadow, _) = fills[1];
        assert_eq!(shadow.start, Point::new(200.0, 120.0));
        assert_eq!(shadow.stops[2].color, Rgba::TRANSPARENT);
    }

    #[test]
    fn test_light_follows_head() {
        let processor = PostProcessor::default();
        let size = Size::new(400.0, 300.0);
        let turned = Pose {
            rotate_y: 0.1,
            ..Pose::neutral()
        };

        let rest = processor.light_position(size, &Pose::neutral(), FrameTime::ZERO);
        let moved = processor.light_position(size, &turned, FrameTime::ZERO);
        assert!((moved.x - rest.x - (0.5f64).sin() * 120.0).abs() < 1e-9);
        assert_eq!(moved.y, rest.y);
    }

    #[test]
    fn test_full_pass_and_flat_preset() {
        let mut surface = surface();
        PostProcessor::default().apply(&mut surface, &Pose::neutral(), FrameTime::from_millis(40));
        // 2 lighting fills, 3 snapshot draws, vignette
        assert_eq!(surface.ops().len(), 6);
        assert!(matches!(surface.ops()[2], DrawOp::DrawSnapshot { .. }));

        let mut surface = self::surface();
        PostProcessor::new(PostProcessConfig::flat()).apply(
            &mut surface,
            &Pose::neutral(),
            FrameTime::ZERO,
        );
        assert!(surface.ops().is_empty());
    }
}
