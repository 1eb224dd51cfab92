//! Animation session
//!
//! Owns everything one avatar needs: surfaces, face geometry, pose,
//! expression state, the frame scheduler and the random source. Speech
//! events and frame callbacks are the only inputs; both arrive on the same
//! task, so there is no locking.

use kurbo::Vec2;
use parla_core::{FaceGeometry, FrameTime, ParlaError, ParlaResult, RandomSource, SpeechEvent};
use parla_visual::{
    advance_pose, head_motion, DetectionOverlay, ExpressionConfig, ExpressionEngine,
    ExpressionState, FeatureRenderer, OverlayTiming, Pose, PoseMode, PostProcessConfig,
    PostProcessor, Surface,
};
use parla_voice::Utterance;

use crate::{
    AvatarImage, FaceDetector, FrameOutcome, FrameScheduler, LoopMode, SchedulerConfig,
    SchedulerStats, StatusMessage,
};

/// Session tuning
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub scheduler: SchedulerConfig,
    pub expression: ExpressionConfig,
    pub post_process: PostProcessConfig,
    /// Per-frame chance of a spontaneous blink while idle
    pub idle_blink_chance: f64,
    /// Face box shown after a face loads; `None` to skip it
    pub detection_overlay: Option<OverlayTiming>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            expression: ExpressionConfig::default(),
            post_process: PostProcessConfig::default(),
            idle_blink_chance: 0.005,
            detection_overlay: Some(OverlayTiming::default()),
        }
    }
}

/// One animated avatar
pub struct AnimationSession<S: Surface, R: RandomSource> {
    /// Surface showing the photo
    display: S,
    /// Feature layer composited over the photo
    canvas: Option<S>,
    /// Photo as loaded, restored every frame
    base: Option<S::Snapshot>,
    geometry: Option<FaceGeometry>,
    pose: Pose,
    expression: ExpressionEngine,
    renderer: FeatureRenderer,
    post: PostProcessor,
    scheduler: FrameScheduler,
    rng: R,
    status: Option<StatusMessage>,
    utterance: Option<Utterance>,
    overlay: Option<DetectionOverlay>,
    overlay_timing: Option<OverlayTiming>,
    idle_blink_chance: f64,
}

impl<S: Surface, R: RandomSource> AnimationSession<S, R> {
    /// Session over `display`, which already shows the avatar photo
    pub fn new(display: S, config: SessionConfig, rng: R) -> Self {
        Self {
            display,
            canvas: None,
            base: None,
            geometry: None,
            pose: Pose::neutral(),
            expression: ExpressionEngine::new(config.expression),
            renderer: FeatureRenderer::new(),
            post: PostProcessor::new(config.post_process),
            scheduler: FrameScheduler::new(config.scheduler),
            rng,
            status: None,
            utterance: None,
            overlay: None,
            overlay_timing: config.detection_overlay,
            idle_blink_chance: config.idle_blink_chance,
        }
    }

    /// Install face geometry, given in display coordinates, and start the
    /// idle loop
    pub fn load_face(&mut self, geometry: FaceGeometry) {
        self.install(geometry, Vec2::new(1.0, 1.0));
    }

    /// Run the detector over `image`, which the display shows scaled to
    /// its own size, and load the result. On failure the previous face is
    /// gone, the status shows the error and no loop runs.
    pub async fn detect_and_load<D: FaceDetector>(
        &mut self,
        detector: &D,
        image: &AvatarImage,
    ) -> ParlaResult<()> {
        self.unload();
        self.status = Some(StatusMessage::Detecting);
        tracing::debug!(width = image.width(), height = image.height(), "detecting face");

        match detector.detect(image).await {
            Ok(geometry) => {
                let scale = DetectionOverlay::scale_between(self.display.size(), image.size());
                self.install(geometry, scale);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "face detection failed");
                self.status = Some(StatusMessage::from_error(&e));
                Err(e)
            }
        }
    }

    /// Swap the photo: drop the current face, then let `paint` draw the
    /// new photo onto the bare display
    pub fn replace_photo(&mut self, paint: impl FnOnce(&mut S)) {
        self.unload();
        self.display.clear();
        self.status = Some(StatusMessage::LoadingImage);
        paint(&mut self.display);
        tracing::debug!(size = ?self.display.size(), "photo replaced");
    }

    /// Stop animating and forget the face. The display keeps the photo as
    /// it was before the first frame.
    pub fn unload(&mut self) {
        self.scheduler.stop();
        if let Some(base) = self.base.take() {
            self.display.put_snapshot(&base);
        }
        self.canvas = None;
        self.geometry = None;
        self.utterance = None;
        self.overlay = None;
        self.pose = Pose::neutral();
        self.expression.reset();
    }

    fn install(&mut self, geometry: FaceGeometry, overlay_scale: Vec2) {
        // A reload snapshots the photo, not the last composited frame
        self.scheduler.stop();
        if let Some(base) = self.base.take() {
            self.display.put_snapshot(&base);
        }

        self.canvas = Some(self.display.new_layer());
        self.base = Some(self.display.snapshot());
        self.overlay = self
            .overlay_timing
            .map(|timing| DetectionOverlay::new(&geometry, overlay_scale, timing));
        self.geometry = Some(geometry);
        self.pose = Pose::neutral();
        self.expression.reset();
        self.utterance = None;
        self.status = Some(StatusMessage::FaceReady);
        self.scheduler.start_idle();
        tracing::info!("face loaded");
    }

    /// Prepare for a new utterance and switch to the speech loop
    pub fn begin_utterance(&mut self, utterance: Utterance) -> ParlaResult<()> {
        if self.geometry.is_none() {
            tracing::warn!("utterance requested before a face was loaded");
            return Err(ParlaError::MissingGeometry);
        }

        self.expression.reset();
        self.pose = Pose::neutral();
        tracing::info!(id = utterance.id.0, "utterance started");
        self.utterance = Some(utterance);
        self.status = Some(StatusMessage::Speaking);
        self.scheduler.start_speech();
        Ok(())
    }

    /// Feed one speech event of the current utterance
    pub fn handle_speech_event(&mut self, event: SpeechEvent, now: FrameTime) {
        match event {
            SpeechEvent::Start => tracing::debug!("speech playback started"),
            SpeechEvent::Boundary { kind, char_index } => {
                let Some(utterance) = &self.utterance else {
                    tracing::debug!(?kind, char_index, "boundary without an utterance");
                    return;
                };
                tracing::debug!(?kind, char_index, "speech boundary");
                self.expression
                    .on_boundary(kind, utterance.text(), now, &mut self.rng);
            }
            SpeechEvent::End => {
                tracing::info!("speech finished");
                self.scheduler.schedule_idle_return(now);
                self.status = Some(StatusMessage::Finished);
            }
            SpeechEvent::Error(message) => {
                tracing::warn!(%message, "speech synthesis failed");
                self.scheduler.stop();
                self.status = Some(StatusMessage::SpeechFailed);
            }
        }
    }

    /// Frame callback
    pub fn on_frame(&mut self, now: FrameTime) -> FrameOutcome {
        let outcome = self.scheduler.begin_frame(now);
        let FrameOutcome::Rendered(mode) = outcome else {
            return outcome;
        };
        let (Some(geometry), Some(canvas), Some(base)) =
            (&self.geometry, &mut self.canvas, &self.base)
        else {
            tracing::warn!("frame requested before a face was loaded");
            return FrameOutcome::MissingGeometry;
        };

        // Stage 1: expire self-clearing expression state
        self.expression.expire(now);

        // Stage 2: pose and head motion
        let pose_mode = match mode {
            LoopMode::Speech => self.expression.state().speaking_pose_mode(),
            _ => PoseMode::Idle,
        };
        self.pose = advance_pose(&self.pose, pose_mode, now);
        let head = head_motion(&self.pose, pose_mode, now, self.expression.state().head);
        self.expression.set_head(head);

        // Stage 3: blink
        let spontaneous = if mode == LoopMode::Idle {
            self.idle_blink_chance
        } else {
            0.0
        };
        if self.expression.maybe_blink(now, &mut self.rng, spontaneous) {
            self.scheduler.record_blink();
        }

        // Stage 4: expression overrides
        self.expression.apply_overrides(&mut self.rng);

        // Stage 5: photo, then features on a clean canvas
        self.display.put_snapshot(base);
        canvas.clear();
        self.renderer
            .draw(canvas, geometry, &self.pose, self.expression.state());

        // Stage 6-7: lighting and shader
        self.post.apply(canvas, &self.pose, now);

        // Stage 8: present, then the detection overlay until it fades
        self.display.composite(canvas);
        if let Some(overlay) = &mut self.overlay {
            if !overlay.draw(&mut self.display, now) {
                self.overlay = None;
            }
        }

        // Stage 9: passive decay
        self.expression.decay();

        outcome
    }

    /// Stop animating
    pub fn stop(&mut self) {
        self.scheduler.stop();
    }

    pub fn is_animating(&self) -> bool {
        self.scheduler.is_animating()
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.scheduler.mode()
    }

    pub fn stats(&self) -> SchedulerStats {
        self.scheduler.stats()
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn expression(&self) -> &ExpressionState {
        self.expression.state()
    }

    pub fn geometry(&self) -> Option<&FaceGeometry> {
        self.geometry.as_ref()
    }

    pub fn utterance(&self) -> Option<&Utterance> {
        self.utterance.as_ref()
    }

    pub fn display(&self) -> &S {
        &self.display
    }

    pub fn canvas(&self) -> Option<&S> {
        self.canvas.as_ref()
    }

    pub fn detection_overlay(&self) -> Option<&DetectionOverlay> {
        self.overlay.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticDetector;
    use kurbo::{Rect, Shape, Size};
    use parla_core::fixtures::sample_geometry;
    use parla_core::SequenceRandom;
    use parla_visual::{DisplayList, DrawOp, ExpressionFlag, Rgba, DETECTION_LABEL, MOUTH_REST};
    use parla_voice::VoiceOptions;

    fn ms(millis: u64) -> FrameTime {
        FrameTime::from_millis(millis)
    }

    fn session() -> AnimationSession<DisplayList, SequenceRandom> {
        session_with(SessionConfig::default())
    }

    fn session_with(config: SessionConfig) -> AnimationSession<DisplayList, SequenceRandom> {
        AnimationSession::new(
            DisplayList::new(Size::new(480.0, 510.0)),
            config,
            SequenceRandom::constant(0.9),
        )
    }

    fn without_overlay() -> AnimationSession<DisplayList, SequenceRandom> {
        session_with(SessionConfig {
            detection_overlay: None,
            ..Default::default()
        })
    }

    fn utterance(text: &str) -> Utterance {
        Utterance::new(text, VoiceOptions::default()).unwrap()
    }

    #[test]
    fn test_nothing_runs_before_a_face() {
        let mut session = session();
        assert!(!session.is_animating());
        assert_eq!(session.on_frame(ms(0)), FrameOutcome::Stopped);
        assert_eq!(
            session.begin_utterance(utterance("Hola")),
            Err(ParlaError::MissingGeometry)
        );
        assert!(session.display().ops().is_empty());
    }

    #[test]
    fn test_load_face_starts_idle() {
        let mut session = without_overlay();
        session.load_face(sample_geometry());

        assert_eq!(session.loop_mode(), LoopMode::Idle);
        assert_eq!(session.status(), Some(&StatusMessage::FaceReady));
        assert_eq!(session.on_frame(ms(0)), FrameOutcome::Rendered(LoopMode::Idle));

        // Photo restored, then the feature layer on top
        let ops = session.display().ops();
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[0], DrawOp::PutSnapshot { .. }));
        assert!(matches!(&ops[1], DrawOp::Composite { ops } if !ops.is_empty()));
    }

    #[test]
    fn test_frame_restores_photo_each_time() {
        let mut session = without_overlay();
        session.load_face(sample_geometry());
        session.on_frame(ms(0));
        session.on_frame(ms(50));

        // No accumulation across frames
        assert_eq!(session.display().ops().len(), 2);
        let canvas_ops = session.canvas().unwrap().ops().len();
        session.on_frame(ms(100));
        assert_eq!(session.canvas().unwrap().ops().len(), canvas_ops);
    }

    #[test]
    fn test_idle_mouth_settles_at_rest() {
        let mut session = session();
        session.load_face(sample_geometry());
        for i in 0..200 {
            session.on_frame(ms(i * 50));
        }
        assert!((session.expression().mouth_openness - MOUTH_REST).abs() < 1e-9);
        assert_eq!(session.stats().rendered, 200);
    }

    #[test]
    fn test_speech_flow() {
        let mut session = session();
        session.load_face(sample_geometry());
        session.on_frame(ms(0));

        session.begin_utterance(utterance("¿Vienes mañana?")).unwrap();
        assert_eq!(session.loop_mode(), LoopMode::Speech);
        assert_eq!(session.status().map(|s| s.to_string()).as_deref(), Some("Hablando..."));

        session.handle_speech_event(SpeechEvent::Start, ms(10));
        session.handle_speech_event(SpeechEvent::word(0), ms(40));
        assert!(session.expression().mouth_openness > MOUTH_REST);
        assert!(session.expression().flags.get(ExpressionFlag::Surprised));

        assert_eq!(session.on_frame(ms(40)), FrameOutcome::Rendered(LoopMode::Speech));

        session.handle_speech_event(SpeechEvent::End, ms(600));
        assert_eq!(session.status(), Some(&StatusMessage::Finished));
        assert_eq!(session.on_frame(ms(1000)), FrameOutcome::Rendered(LoopMode::Speech));
        assert_eq!(session.on_frame(ms(1100)), FrameOutcome::Rendered(LoopMode::Idle));
    }

    #[test]
    fn test_speech_error_stops_loop() {
        let mut session = session();
        session.load_face(sample_geometry());
        session.begin_utterance(utterance("Hola")).unwrap();

        session.handle_speech_event(SpeechEvent::Error("synthesis-failed".into()), ms(100));
        assert!(!session.is_animating());
        assert_eq!(session.status(), Some(&StatusMessage::SpeechFailed));
        assert_eq!(session.on_frame(ms(200)), FrameOutcome::Stopped);
    }

    #[test]
    fn test_new_utterance_resets_expression() {
        let mut session = session();
        session.load_face(sample_geometry());
        session.begin_utterance(utterance("¡Genial!")).unwrap();
        session.handle_speech_event(SpeechEvent::word(0), ms(0));
        assert!(session.expression().flags.any());
        session.on_frame(ms(400));
        assert!(!session.pose().is_neutral());

        session.begin_utterance(utterance("Hola")).unwrap();
        assert!(!session.expression().flags.any());
        let pose = session.pose();
        assert_eq!(
            (pose.rotate_x, pose.rotate_y, pose.rotate_z, pose.translate_z),
            (0.0, 0.0, 0.0, 0.0)
        );
        assert_eq!(pose.perspective(), 1000.0);
        assert_eq!(pose.scale, 1.0);
        assert_eq!(session.stats().transitions, 2);
    }

    #[test]
    fn test_reload_snapshots_photo_not_frame() {
        let mut session = session();
        session.load_face(sample_geometry());
        session.on_frame(ms(0));
        assert!(session
            .display()
            .ops()
            .iter()
            .any(|op| matches!(op, DrawOp::Composite { .. })));

        // Same photo, new landmarks: the old frame is stripped first
        session.load_face(sample_geometry());
        assert_eq!(session.display().ops(), &[DrawOp::PutSnapshot { id: 0 }]);
        assert_eq!(session.loop_mode(), LoopMode::Idle);
        assert_eq!(session.stats().transitions, 3);

        session.on_frame(ms(100));
        let ops = session.display().ops();
        assert_eq!(ops[0], DrawOp::PutSnapshot { id: 1 });
        assert_eq!(
            ops.iter()
                .filter(|op| matches!(op, DrawOp::Composite { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn test_replace_photo() {
        let mut session = session();
        session.load_face(sample_geometry());
        session.begin_utterance(utterance("Hola")).unwrap();
        session.on_frame(ms(0));

        let photo = Rect::new(0.0, 0.0, 480.0, 510.0).to_path(0.1);
        session.replace_photo(|display| display.fill_path(&photo, Rgba::BLACK));
        assert!(!session.is_animating());
        assert_eq!(session.status(), Some(&StatusMessage::LoadingImage));
        assert!(session.geometry().is_none());
        assert!(session.utterance().is_none());
        assert!(session.canvas().is_none());
        assert!(matches!(session.display().ops(), [DrawOp::FillPath { .. }]));
        assert_eq!(session.on_frame(ms(100)), FrameOutcome::Stopped);
    }

    #[test]
    fn test_overlay_fades_out() {
        let mut session = session();
        session.load_face(sample_geometry());

        session.on_frame(ms(0));
        assert_eq!(session.display().texts(), vec![DETECTION_LABEL]);
        session.on_frame(ms(2950));
        assert_eq!(session.display().texts(), vec![DETECTION_LABEL]);
        assert!(session.detection_overlay().is_some());

        session.on_frame(ms(3000));
        assert!(session.display().texts().is_empty());
        assert!(session.detection_overlay().is_none());

        let mut quiet = without_overlay();
        quiet.load_face(sample_geometry());
        quiet.on_frame(ms(0));
        assert!(quiet.display().texts().is_empty());
    }

    #[tokio::test]
    async fn test_detection_failure_never_starts_loop() {
        let mut session = session();
        let image = AvatarImage::filled(480, 510, [0, 0, 0, 255]).unwrap();

        let result = session
            .detect_and_load(&StaticDetector::no_face(), &image)
            .await;
        assert_eq!(result, Err(ParlaError::NoFaceFound));
        assert!(!session.is_animating());
        assert_eq!(session.status(), Some(&StatusMessage::NoFace));

        let result = session
            .detect_and_load(
                &StaticDetector::failing(ParlaError::DetectorLoad("weights".into())),
                &image,
            )
            .await;
        assert!(result.is_err());
        assert!(!session.is_animating());
        assert_eq!(session.status(), Some(&StatusMessage::DetectorLoadFailed));

        session
            .detect_and_load(&StaticDetector::found(sample_geometry()), &image)
            .await
            .unwrap();
        assert_eq!(session.loop_mode(), LoopMode::Idle);
        assert_eq!(session.geometry(), Some(&sample_geometry()));
    }

    #[tokio::test]
    async fn test_failed_redetect_unloads_face() {
        let mut session = session();
        let image = AvatarImage::filled(480, 510, [0, 0, 0, 255]).unwrap();
        session.load_face(sample_geometry());
        session.begin_utterance(utterance("Hola")).unwrap();
        session.on_frame(ms(0));

        let result = session
            .detect_and_load(&StaticDetector::no_face(), &image)
            .await;
        assert_eq!(result, Err(ParlaError::NoFaceFound));
        assert!(!session.is_animating());
        assert!(session.geometry().is_none());
        assert!(session.canvas().is_none());
        assert!(session.utterance().is_none());
        assert!(session.detection_overlay().is_none());
        assert_eq!(session.status(), Some(&StatusMessage::NoFace));
        // The photo without the last frame's features
        assert_eq!(session.display().ops(), &[DrawOp::PutSnapshot { id: 0 }]);
        assert_eq!(session.on_frame(ms(100)), FrameOutcome::Stopped);
    }

    #[tokio::test]
    async fn test_detected_overlay_scaled_to_display() {
        let mut session = session();
        let image = AvatarImage::filled(960, 1020, [0, 0, 0, 255]).unwrap();
        session
            .detect_and_load(&StaticDetector::found(sample_geometry()), &image)
            .await
            .unwrap();

        let source = sample_geometry().face_box();
        let face_box = session.detection_overlay().unwrap().face_box();
        assert_eq!(face_box.x0, source.x0 * 0.5);
        assert_eq!(face_box.y1, source.y1 * 0.5);
    }
}
