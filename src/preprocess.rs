use crate::error::InferenceError;
use image::{imageops::FilterType, DynamicImage};
use ndarray::{Array, Array4};

#[derive(Debug, Clone, Copy)]
pub struct Preprocessor {
    width: u32,
    height: u32,
}

impl Preprocessor {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn preprocess(&self, image: &DynamicImage) -> Result<Array4<i32>, InferenceError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(InferenceError::EmptyImage);
        }

        let resized = image
            .resize_exact(self.width, self.height, FilterType::Triangle)
            .into_rgb8();

        let mut input = Array::zeros((1, self.height as usize, self.width as usize, 3));
        for (x, y, pixel) in resized.enumerate_pixels() {
            let [r, g, b] = pixel.0;
            let (x, y) = (x as usize, y as usize);
            input[[0, y, x, 0]] = r as i32;
            input[[0, y, x, 1]] = g as i32;
            input[[0, y, x, 2]] = b as i32;
        }

        Ok(input)
    }
}
