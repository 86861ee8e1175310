mod detection;
mod geometry;
mod image_source;
mod ort_engine;
mod surface;
mod tensor;

pub mod app;
pub mod asset_cache;
pub mod config;
pub mod detector;
pub mod engine;
pub mod error;
pub mod inference;
pub mod labels;
pub mod preprocess;
pub mod render;
pub mod score_reducer;
pub mod session;
pub mod source;
pub mod store;
pub mod suppressor;

pub use app::start_app;
pub use detection::Detection;
pub use geometry::{to_display_rect, Rect};
pub use image_source::{DisplayedImage, ImageSource, StillImage};
pub use ort_engine::{OrtEngine, OrtModel};
pub use surface::{DrawingSurface, ImageSurface};
pub use tensor::{BoxTensor, ScoreTensor};
