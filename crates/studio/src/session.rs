use std::{path::PathBuf, sync::Arc};

use compositor::{FrameInputs, RenderMode, RenderParams, render_into};
use image::{RgbImage, RgbaImage};
use ink_kit_common::{BrushState, LightingState, StylePreset, StyleProfile, Transform, Viewport, ViewportPoint};
use segmentation::{
    JobPoll, SegmentationError, SegmentationJob, SegmentationMask, SegmentationModel,
    SegmentationProgress, SegmentationStage, Segmenter,
};
use tracing::{debug, info, warn};

use crate::{
    command::EditorCommand,
    config::SessionConfig,
    erasure::ErasureCanvas,
    error::{Result, StudioError},
    export::Exporter,
    gesture::{Gesture, InteractionMode, TransformController},
    store::AssetStore,
    view::ViewState,
};

/// One editing session: the assets, the interactive state and the last
/// rendered frame.
///
/// All mutation goes through `&mut self` between frames; only segmentation
/// runs elsewhere, and its result is picked up by [`Session::poll_segmentation`]
/// or [`Session::settle`].
pub struct Session {
    config: SessionConfig,
    store: AssetStore,
    controller: TransformController,
    erasure: ErasureCanvas,
    style: StylePreset,
    lighting: LightingState,
    render_mode: RenderMode,
    view: ViewState,
    segmenter: Segmenter,
    pending: Option<SegmentationJob>,
    progress: SegmentationProgress,
    status: String,
    frame: Option<RgbaImage>,
    exporter: Exporter,
}

impl Session {
    /// Build a session with the bundled skin-tone model. Must be called from
    /// within a tokio runtime.
    pub fn new(config: SessionConfig) -> Result<Self> {
        let pipeline = config.segmentation.pipeline_builder().build();
        Self::with_segmenter(config, Segmenter::from_current(pipeline)?)
    }

    /// Build a session around a specific segmentation model
    pub fn with_model(config: SessionConfig, model: Box<dyn SegmentationModel>) -> Result<Self> {
        let pipeline = config.segmentation.pipeline_builder().with_boxed_model(model).build();
        Self::with_segmenter(config, Segmenter::from_current(pipeline)?)
    }

    pub fn with_segmenter(config: SessionConfig, segmenter: Segmenter) -> Result<Self> {
        config.validate()?;
        let controller = TransformController::new(Transform::default().with_warp(config.cylindrical_warp));
        let mut erasure = ErasureCanvas::default();
        erasure.set_brush(BrushState::new(config.brush_radius));

        info!(model = segmenter.pipeline().model_name(), style = %config.style, "Session created");
        Ok(Self {
            style: config.style,
            lighting: LightingState::new(config.light_angle),
            exporter: Exporter::new(config.export.clone()),
            config,
            store: AssetStore::new(),
            controller,
            erasure,
            render_mode: RenderMode::default(),
            view: ViewState::default(),
            segmenter,
            pending: None,
            progress: SegmentationProgress::default(),
            status: String::new(),
            frame: None,
        })
    }

    // -- assets ----------------------------------------------------------

    /// Replace the photograph and start segmenting it. Any segmentation
    /// still running for the previous photograph is superseded.
    pub fn set_photograph(&mut self, photo: RgbImage) -> Result<()> {
        let photo = self.store.set_photo(photo)?;
        self.start_segmentation(photo);
        Ok(())
    }

    /// Decode and install a photograph; on failure the current one stays
    pub fn set_photograph_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let photo = self.store.set_photo_bytes(bytes)?;
        self.start_segmentation(photo);
        Ok(())
    }

    /// Replace the overlay, recentering it and clearing erasure
    pub fn set_tattoo(&mut self, tattoo: RgbaImage) -> Result<()> {
        self.store.set_tattoo(tattoo)?;
        self.on_tattoo_replaced();
        Ok(())
    }

    pub fn set_tattoo_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.store.set_tattoo_bytes(bytes)?;
        self.on_tattoo_replaced();
        Ok(())
    }

    fn on_tattoo_replaced(&mut self) {
        self.controller.reset();
        self.erasure.clear();
    }

    fn start_segmentation(&mut self, photo: Arc<RgbImage>) {
        self.erasure.clear();
        self.frame = None;
        let job = self.segmenter.submit(photo);
        debug!(generation = job.generation(), "Segmentation started");
        self.progress = job.progress();
        self.status = self.progress.status.clone();
        self.pending = Some(job);
    }

    fn apply_mask(&mut self, mask: SegmentationMask) {
        let (width, height) = mask.dimensions();
        self.erasure.resize(width, height);
        self.status = if mask.is_fallback() {
            "Body not detected, using full frame".to_string()
        } else {
            SegmentationStage::Complete.default_status().to_string()
        };
        self.progress = SegmentationProgress::with_status(SegmentationStage::Complete, self.status.clone());
        info!(width, height, fallback = mask.is_fallback(), "Mask applied");
        self.store.set_mask(mask);
    }

    fn fallback_mask(&self, reason: &SegmentationError) -> Option<SegmentationMask> {
        let photo = self.store.photo()?;
        let (w, h) = self
            .segmenter
            .pipeline()
            .working_dimensions(photo.width(), photo.height());
        Some(SegmentationMask::full_frame(w, h, reason.to_string()))
    }

    /// Pick up a finished segmentation without blocking. Returns true when a
    /// new mask was applied.
    pub fn poll_segmentation(&mut self) -> bool {
        let Some(job) = self.pending.as_mut() else {
            return false;
        };
        let progress = job.progress();
        match job.try_take() {
            JobPoll::Pending => {
                self.status = progress.status.clone();
                self.progress = progress;
                false
            }
            JobPoll::Ready(mask) => {
                self.pending = None;
                self.apply_mask(mask);
                true
            }
            JobPoll::Superseded => {
                debug!("Dropped superseded segmentation job");
                self.pending = None;
                false
            }
            JobPoll::Lost => {
                self.pending = None;
                let reason = SegmentationError::Inference("segmentation worker stopped".into());
                warn!(error = %reason, "Segmentation lost, using full-frame mask");
                match self.fallback_mask(&reason) {
                    Some(mask) => {
                        self.apply_mask(mask);
                        true
                    }
                    None => false,
                }
            }
        }
    }

    /// Wait for the outstanding segmentation, if any, and apply it
    pub async fn settle(&mut self) -> Result<()> {
        let Some(job) = self.pending.take() else {
            return Ok(());
        };
        match job.wait().await {
            Ok(mask) => self.apply_mask(mask),
            Err(SegmentationError::Cancelled) => debug!("Segmentation superseded while waiting"),
            Err(e) => {
                warn!(error = %e, "Segmentation lost, using full-frame mask");
                if let Some(mask) = self.fallback_mask(&e) {
                    self.apply_mask(mask);
                }
            }
        }
        Ok(())
    }

    /// A frame can be rendered: photograph present and its mask applied
    pub fn is_ready(&self) -> bool {
        self.pending.is_none() && self.store.photo().is_some() && self.store.mask().is_some()
    }

    pub fn progress(&self) -> &SegmentationProgress {
        &self.progress
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    // -- interaction -----------------------------------------------------

    pub fn interaction_mode(&self) -> InteractionMode {
        self.view.interaction_mode()
    }

    pub fn set_mode(&mut self, mode: InteractionMode) {
        self.view.set_mode(mode);
        self.controller.set_mode(self.view.interaction_mode());
        if mode != InteractionMode::Erase {
            self.erasure.end_stroke();
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    /// Returns whether the transform changed
    pub fn apply_gesture(&mut self, gesture: &Gesture) -> bool {
        self.controller.set_mode(self.view.interaction_mode());
        self.controller.apply(gesture)
    }

    pub fn transform(&self) -> Transform {
        self.controller.transform()
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.controller.set_scale(scale);
    }

    pub fn set_cylindrical_warp(&mut self, warp: f32) {
        self.controller.set_cylindrical_warp(warp);
    }

    pub fn reset_transform(&mut self) {
        self.controller.reset();
    }

    pub fn style(&self) -> StylePreset {
        self.style
    }

    pub fn set_style(&mut self, style: StylePreset) {
        self.style = style;
    }

    pub fn lighting(&self) -> LightingState {
        self.lighting
    }

    pub fn set_light_angle(&mut self, degrees: f32) {
        self.lighting = LightingState::new(degrees);
    }

    pub fn brush(&self) -> BrushState {
        self.erasure.brush()
    }

    pub fn set_brush_radius(&mut self, radius: f32) {
        self.erasure.set_brush(BrushState::new(radius));
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.erasure.set_viewport(viewport);
    }

    /// Start an erasure stroke. Only honored in erase mode.
    pub fn begin_stroke(&mut self, point: ViewportPoint) -> bool {
        if self.interaction_mode() != InteractionMode::Erase {
            debug!("Ignoring stroke outside erase mode");
            return false;
        }
        self.erasure.begin_stroke(point);
        true
    }

    pub fn extend_stroke(&mut self, point: ViewportPoint) -> bool {
        if self.interaction_mode() != InteractionMode::Erase {
            return false;
        }
        self.erasure.extend_stroke(point);
        true
    }

    pub fn end_stroke(&mut self) {
        self.erasure.end_stroke();
    }

    pub fn clear_erasure(&mut self) {
        self.erasure.clear();
    }

    pub fn erasure(&self) -> &ErasureCanvas {
        &self.erasure
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.render_mode = mode;
    }

    pub fn store(&self) -> &AssetStore {
        &self.store
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // -- rendering -------------------------------------------------------

    pub fn style_profile(&self) -> StyleProfile {
        self.style.profile()
    }

    /// Parameters the next frame is rendered with. The view's debug toggle
    /// overrides the render mode.
    pub fn render_params(&self) -> RenderParams {
        RenderParams {
            transform: self.controller.transform(),
            style: self.style_profile(),
            lighting: self.lighting,
            mode: if self.view.debug { RenderMode::MaskDebug } else { self.render_mode },
        }
    }

    /// Render the current state into the frame buffer
    pub fn render(&mut self) -> Result<&RgbaImage> {
        let photo = self.store.photo().ok_or(StudioError::NoPhotograph)?;
        if self.pending.is_some() {
            return Err(StudioError::SegmentationPending);
        }
        let mask = self.store.mask().ok_or(StudioError::SegmentationPending)?;

        let mut inputs = FrameInputs::new(photo, &mask.image).with_erasure(self.erasure.buffer());
        if let Some(tattoo) = self.store.tattoo() {
            inputs = inputs.with_tattoo(tattoo);
        }
        let params = self.render_params();
        let frame = self.frame.get_or_insert_with(|| RgbaImage::new(0, 0));
        render_into(&inputs, &params, frame);
        Ok(frame)
    }

    /// Last rendered frame
    pub fn frame(&self) -> Option<&RgbaImage> {
        self.frame.as_ref()
    }

    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    /// Write the last rendered frame to the export directory
    pub fn export_composite(&self) -> Result<PathBuf> {
        let frame = self.frame.as_ref().ok_or(StudioError::NoFrame)?;
        self.exporter.export(frame)
    }

    // -- scripting -------------------------------------------------------

    pub fn execute(&mut self, command: &EditorCommand) -> Result<()> {
        debug!(command = %command, "Executing editor command");
        match command {
            EditorCommand::Gesture(gesture) => {
                self.apply_gesture(gesture);
            }
            EditorCommand::SetMode { mode } => self.set_mode(*mode),
            EditorCommand::SetStyle { style } => self.set_style(*style),
            EditorCommand::SetLightAngle { degrees } => self.set_light_angle(*degrees),
            EditorCommand::SetCylindricalWarp { warp } => self.set_cylindrical_warp(*warp),
            EditorCommand::SetScale { scale } => self.set_scale(*scale),
            EditorCommand::SetBrushRadius { radius } => self.set_brush_radius(*radius),
            EditorCommand::SetViewport(viewport) => self.set_viewport(*viewport),
            EditorCommand::BeginStroke { x, y } => {
                self.begin_stroke(ViewportPoint::new(*x, *y));
            }
            EditorCommand::ExtendStroke { x, y } => {
                self.extend_stroke(ViewportPoint::new(*x, *y));
            }
            EditorCommand::EndStroke => self.end_stroke(),
            EditorCommand::ClearErasure => self.clear_erasure(),
            EditorCommand::SetRenderMode { mode } => self.set_render_mode(*mode),
            EditorCommand::ResetTransform => self.reset_transform(),
        }
        Ok(())
    }

    pub fn execute_all<'a>(&mut self, commands: impl IntoIterator<Item = &'a EditorCommand>) -> Result<()> {
        for command in commands {
            self.execute(command)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba};

    fn create_test_photo() -> RgbImage {
        let mut photo = RgbImage::from_pixel(60, 40, Rgb([30, 200, 40]));
        for y in 5..35 {
            for x in 10..50 {
                photo.put_pixel(x, y, Rgb([224, 172, 140]));
            }
        }
        photo
    }

    #[tokio::test]
    async fn test_render_requires_mask() {
        let mut session = Session::new(SessionConfig::default()).unwrap();
        assert!(matches!(session.render(), Err(StudioError::NoPhotograph)));

        session.set_photograph(create_test_photo()).unwrap();
        assert!(matches!(session.render(), Err(StudioError::SegmentationPending)));
        assert!(!session.is_ready());

        session.settle().await.unwrap();
        assert!(session.is_ready());
        assert_eq!(session.progress().percent, 100);
        assert_eq!(session.render().unwrap().dimensions(), (60, 40));
    }

    #[tokio::test]
    async fn test_strokes_only_in_erase_mode() {
        let mut session = Session::new(SessionConfig::default()).unwrap();
        session.set_photograph(create_test_photo()).unwrap();
        session.settle().await.unwrap();

        assert!(!session.begin_stroke(ViewportPoint::new(30.0, 20.0)));
        assert!(session.erasure().is_blank());

        session.set_mode(InteractionMode::Erase);
        assert!(session.begin_stroke(ViewportPoint::new(30.0, 20.0)));
        session.end_stroke();
        assert!(!session.erasure().is_blank());

        // transform gestures are locked meanwhile
        assert!(!session.apply_gesture(&Gesture::Drag { dx: 40.0, dy: 0.0 }));
        session.set_mode(InteractionMode::Transform);
        assert!(session.apply_gesture(&Gesture::Drag { dx: 40.0, dy: 0.0 }));
    }

    #[tokio::test]
    async fn test_erasure_matches_mask_resolution() {
        let mut config = SessionConfig::default();
        config.segmentation.max_side = 30;
        let mut session = Session::new(config).unwrap();
        session.set_photograph(create_test_photo()).unwrap();
        session.settle().await.unwrap();

        assert_eq!(session.store().mask().unwrap().dimensions(), (30, 20));
        assert_eq!(session.erasure().dimensions(), (30, 20));
    }

    #[tokio::test]
    async fn test_execute_script() {
        let mut session = Session::new(SessionConfig::default()).unwrap();
        session.set_photograph(create_test_photo()).unwrap();
        session.set_tattoo(RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255]))).unwrap();
        session.settle().await.unwrap();

        let script = vec![
            EditorCommand::SetStyle { style: StylePreset::Aged },
            EditorCommand::SetLightAngle { degrees: 400.0 },
            EditorCommand::SetScale { scale: 0.6 },
            EditorCommand::SetCylindricalWarp { warp: 0.9 },
            EditorCommand::SetBrushRadius { radius: 500.0 },
            EditorCommand::Gesture(Gesture::Wheel { delta_y: 10.0, modifier: true }),
        ];
        session.execute_all(&script).unwrap();

        assert_eq!(session.style(), StylePreset::Aged);
        assert_eq!(session.lighting().angle_degrees, 40.0);
        assert_eq!(session.transform().scale, 0.6);
        assert_eq!(session.transform().cylindrical_warp, 0.9);
        assert_eq!(session.brush().radius, 100.0);
        assert!((session.transform().rotation - 0.1).abs() < 1e-6);

        session.execute(&EditorCommand::ResetTransform).unwrap();
        assert_eq!(session.transform().scale, 0.3);
        assert_eq!(session.transform().cylindrical_warp, 0.9);
    }

    #[tokio::test]
    async fn test_debug_toggle_overrides_mode() {
        let mut session = Session::new(SessionConfig::default()).unwrap();
        session.set_render_mode(RenderMode::TattooOnly);
        assert_eq!(session.render_params().mode, RenderMode::TattooOnly);
        session.view_mut().toggle_debug();
        assert_eq!(session.render_params().mode, RenderMode::MaskDebug);
    }

    #[tokio::test]
    async fn test_export_needs_a_frame() {
        let session = Session::new(SessionConfig::default()).unwrap();
        assert!(matches!(session.export_composite(), Err(StudioError::NoFrame)));
    }

    #[test]
    fn test_session_needs_runtime() {
        assert!(matches!(
            Session::new(SessionConfig::default()),
            Err(StudioError::Segmentation(SegmentationError::NoRuntime))
        ));
    }
}
