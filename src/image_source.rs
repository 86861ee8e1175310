use image::DynamicImage;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct DisplayedImage {
    pub image: Arc<DynamicImage>,
    pub display_width: u32,
    pub display_height: u32,
}

pub trait ImageSource: Send + Sync {
    fn current(&self) -> Option<DisplayedImage>;
}

#[derive(Debug, Default)]
pub struct StillImage {
    inner: RwLock<Option<DisplayedImage>>,
}

impl StillImage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self, image: DynamicImage) {
        *self.inner.write() = Some(DisplayedImage {
            display_width: image.width(),
            display_height: image.height(),
            image: Arc::new(image),
        });
    }

    pub fn set_display_size(&self, width: u32, height: u32) {
        if let Some(shown) = self.inner.write().as_mut() {
            shown.display_width = width;
            shown.display_height = height;
        }
    }

    pub fn unload(&self) {
        *self.inner.write() = None;
    }
}

impl ImageSource for StillImage {
    fn current(&self) -> Option<DisplayedImage> {
        self.inner.read().clone()
    }
}
