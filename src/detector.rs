use crate::{
    asset_cache::SessionContext,
    config::{DetectionConfig, RenderConfig},
    detection::{build_detections, Detection},
    engine::{Backend, BackendScope, InferenceEngine},
    error::{DetectError, RenderPreconditionError},
    image_source::ImageSource,
    inference::{infer, OutputLayout},
    preprocess::Preprocessor,
    render::{render, RenderStyle},
    score_reducer,
    suppressor::{suppress, NmsConfig},
    surface::DrawingSurface,
};
use std::sync::Arc;
use tracing::instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    Rendered(usize),
    Aborted,
    Failed,
}

pub struct Detector<E: InferenceEngine> {
    engine: Arc<E>,
    session: SessionContext<E::Model>,
    preprocessor: Preprocessor,
    layout: OutputLayout,
    nms: NmsConfig,
    style: RenderStyle,
    last_detections: Vec<Detection>,
}

impl<E: InferenceEngine> Detector<E> {
    pub fn new(
        engine: Arc<E>,
        session: SessionContext<E::Model>,
        detection: &DetectionConfig,
        render: &RenderConfig,
    ) -> Self {
        Self {
            engine,
            session,
            preprocessor: Preprocessor::new(detection.input_width, detection.input_height),
            layout: OutputLayout {
                scores: detection.scores_output,
                boxes: detection.boxes_output,
            },
            nms: detection.get_nms_config(),
            style: RenderStyle::from(render),
            last_detections: Vec::new(),
        }
    }

    pub fn last_detections(&self) -> &[Detection] {
        &self.last_detections
    }

    /// Runs one pass and draws its result.
    ///
    /// On error nothing is drawn and the previous detections stay in place.
    pub async fn detect_frame<I, S>(
        &mut self,
        images: &I,
        surface: &mut S,
    ) -> Result<&[Detection], DetectError>
    where
        I: ImageSource + ?Sized,
        S: DrawingSurface + ?Sized,
    {
        let frame = images
            .current()
            .ok_or(RenderPreconditionError::ImageUnavailable)?;
        if !surface.is_available() {
            return Err(RenderPreconditionError::SurfaceUnavailable.into());
        }

        let input = self.preprocessor.preprocess(&frame.image)?;
        drop(frame);
        let raw = infer(&*self.engine, &*self.session.model, &input, self.layout).await?;
        drop(input);

        let reduced = score_reducer::reduce(&raw.scores);
        let (max_scores, _) = score_reducer::split(&reduced);
        let selected = {
            let _cpu = BackendScope::acquire(&*self.engine, Backend::Cpu);
            suppress(&raw.boxes, &max_scores, &self.nms)
        };

        // the image may have been swapped or resized while inference was running
        let frame = images
            .current()
            .ok_or(RenderPreconditionError::ImageUnavailable)?;
        let detections = build_detections(
            &raw.boxes,
            &reduced,
            &selected,
            &self.session.labels,
            frame.display_width,
            frame.display_height,
        );
        for detection in &detections {
            tracing::debug!(
                "Detection: class={} ({}), score={:.3}, rect=({:.1}, {:.1}, {:.1}, {:.1})",
                detection.class_name,
                detection.class_index,
                detection.score,
                detection.rect.x,
                detection.rect.y,
                detection.rect.w,
                detection.rect.h
            );
        }

        render(
            &detections,
            surface,
            frame.display_width,
            frame.display_height,
            &self.style,
        )?;
        self.last_detections = detections;

        Ok(&self.last_detections)
    }

    #[instrument(skip_all)]
    pub async fn run_pass<I, S>(&mut self, images: &I, surface: &mut S) -> PassOutcome
    where
        I: ImageSource + ?Sized,
        S: DrawingSurface + ?Sized,
    {
        match self.detect_frame(images, surface).await {
            Ok(detections) => {
                tracing::info!("Rendered {} detections", detections.len());
                PassOutcome::Rendered(detections.len())
            }
            Err(DetectError::Precondition(e)) => {
                tracing::debug!("Detection pass aborted: {}", e);
                PassOutcome::Aborted
            }
            Err(e) => {
                tracing::error!("Error during object detection: {}", e);
                PassOutcome::Failed
            }
        }
    }
}
