use crate::geometry::Rect;
use ab_glyph::{FontArc, PxScale};
use image::{imageops, DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};

// average glyph advance as a fraction of the font size when no font is loaded
const FALLBACK_CHAR_WIDTH: f32 = 0.6;

pub trait DrawingSurface {
    /// False once the surface has been detached and must not be drawn on.
    fn is_available(&self) -> bool {
        true
    }
    fn resize(&mut self, width: u32, height: u32);
    fn clear(&mut self);
    fn stroke_rect(&mut self, rect: Rect, color: [u8; 3], line_width: u32);
    fn fill_rect(&mut self, rect: Rect, color: [u8; 3]);
    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: [u8; 3], font_size: f32);
    fn measure_text(&self, text: &str, font_size: f32) -> f32;
}

pub struct ImageSurface {
    buffer: RgbaImage,
    font: Option<FontArc>,
}

impl ImageSurface {
    pub fn new(font: Option<FontArc>) -> Self {
        Self {
            buffer: RgbaImage::new(0, 0),
            font,
        }
    }

    pub fn from_font_file(path: &std::path::Path) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        let font = FontArc::try_from_vec(data)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        Ok(Self::new(Some(font)))
    }

    pub fn composite_onto(&self, base: &DynamicImage) -> RgbaImage {
        let (width, height) = self.buffer.dimensions();
        let mut canvas = base
            .resize_exact(width, height, imageops::FilterType::Triangle)
            .into_rgba8();
        imageops::overlay(&mut canvas, &self.buffer, 0, 0);
        canvas
    }
}

fn clip_to_buffer(rect: Rect, width: u32, height: u32) -> Option<imageproc::rect::Rect> {
    if ![rect.x, rect.y, rect.w, rect.h].iter().all(|v| v.is_finite()) {
        return None;
    }
    let left = rect.x.round().max(0.0);
    let top = rect.y.round().max(0.0);
    let right = (rect.x + rect.w).round().min(width as f32);
    let bottom = (rect.y + rect.h).round().min(height as f32);
    if right - left < 1.0 || bottom - top < 1.0 {
        return None;
    }
    Some(
        imageproc::rect::Rect::at(left as i32, top as i32)
            .of_size((right - left) as u32, (bottom - top) as u32),
    )
}

fn opaque(color: [u8; 3]) -> Rgba<u8> {
    Rgba([color[0], color[1], color[2], 255])
}

impl DrawingSurface for ImageSurface {
    fn resize(&mut self, width: u32, height: u32) {
        self.buffer = RgbaImage::new(width, height);
    }

    fn clear(&mut self) {
        self.buffer.pixels_mut().for_each(|p| *p = Rgba([0, 0, 0, 0]));
    }

    fn stroke_rect(&mut self, rect: Rect, color: [u8; 3], line_width: u32) {
        let line = line_width.max(1) as f32;
        let edges = [
            Rect { h: line, ..rect },
            Rect {
                y: rect.y + rect.h - line,
                h: line,
                ..rect
            },
            Rect { w: line, ..rect },
            Rect {
                x: rect.x + rect.w - line,
                w: line,
                ..rect
            },
        ];
        for edge in edges {
            self.fill_rect(edge, color);
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: [u8; 3]) {
        let (width, height) = self.buffer.dimensions();
        if let Some(r) = clip_to_buffer(rect, width, height) {
            draw_filled_rect_mut(&mut self.buffer, r, opaque(color));
        }
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: [u8; 3], font_size: f32) {
        let (width, height) = self.buffer.dimensions();
        let visible = x.is_finite()
            && y.is_finite()
            && x < width as f32
            && y < height as f32
            && x + self.measure_text(text, font_size) > 0.0
            && y + font_size > 0.0;
        if !visible {
            return;
        }
        match &self.font {
            Some(font) => draw_text_mut(
                &mut self.buffer,
                opaque(color),
                x.round() as i32,
                y.round() as i32,
                PxScale::from(font_size),
                font,
                text,
            ),
            None => tracing::debug!("No font loaded, skipping label {:?}", text),
        }
    }

    fn measure_text(&self, text: &str, font_size: f32) -> f32 {
        match &self.font {
            Some(font) => text_size(PxScale::from(font_size), font, text).0 as f32,
            None => text.chars().count() as f32 * font_size * FALLBACK_CHAR_WIDTH,
        }
    }
}
