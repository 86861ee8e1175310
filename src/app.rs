use crate::{
    asset_cache::AssetCache,
    config::Config,
    detector::{Detector, PassOutcome},
    image_source::StillImage,
    ort_engine::OrtEngine,
    session::{SessionState, LOADING_MESSAGE, LOAD_FAILED_MESSAGE},
    source::LocalAssetSource,
    store::FsModelStore,
    surface::ImageSurface,
};
use std::{error::Error, sync::Arc};

pub async fn start_app(config: Config) -> Result<(), Box<dyn Error>> {
    let engine = Arc::new(OrtEngine::new());
    let cache = AssetCache::new(
        engine.clone(),
        LocalAssetSource::new(&config.assets.base_dir),
        FsModelStore::new(&config.assets.cache_dir),
        &config.assets,
    );

    tracing::info!("{}", LOADING_MESSAGE);
    let state = SessionState::load(&cache).await;
    if let Some(message) = state.status_message() {
        tracing::error!("{}", message);
    }
    let context = state.context().cloned().ok_or(LOAD_FAILED_MESSAGE)?;

    let images = StillImage::new();
    let picture = image::open(&config.demo.input_image)?;
    images.load(picture.clone());
    if let (Some(width), Some(height)) = (config.demo.display_width, config.demo.display_height) {
        images.set_display_size(width, height);
    }

    let mut surface = match &config.render.font_path {
        Some(path) => ImageSurface::from_font_file(path)?,
        None => {
            tracing::warn!("No font configured, labels will not be drawn");
            ImageSurface::new(None)
        }
    };

    let mut detector = Detector::new(engine, context, &config.detection, &config.render);
    match detector.run_pass(&images, &mut surface).await {
        PassOutcome::Rendered(count) => {
            surface
                .composite_onto(&picture)
                .save(&config.demo.output_image)?;
            for detection in detector.last_detections() {
                tracing::info!("Found {} ({:.4})", detection.class_name, detection.score);
            }
            tracing::info!(
                "Wrote {} detections to {:?}",
                count,
                config.demo.output_image
            );
            Ok(())
        }
        outcome => Err(format!("Detection pass did not complete: {:?}", outcome).into()),
    }
}
