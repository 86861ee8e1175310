use crate::{
    config::RenderConfig,
    detection::Detection,
    error::RenderPreconditionError,
    geometry::Rect,
    surface::DrawingSurface,
};

const SCORE_DIGITS: usize = 4;
const LABEL_PADDING: f32 = 4.0;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderStyle {
    pub box_color: [u8; 3],
    pub text_color: [u8; 3],
    pub line_width: u32,
    pub font_size: f32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self::from(&RenderConfig::default())
    }
}

impl From<&RenderConfig> for RenderStyle {
    fn from(config: &RenderConfig) -> Self {
        Self {
            box_color: config.box_color,
            text_color: config.text_color,
            line_width: config.line_width,
            font_size: config.font_size,
        }
    }
}

pub fn label_text(detection: &Detection) -> String {
    format!(
        "{}, score: {:.*}",
        detection.class_name, SCORE_DIGITS, detection.score
    )
}

/// Draws `detections` onto `surface` sized to the displayed image.
///
/// Boxes and label backgrounds go down first, then every label's text, so no
/// outline ever covers a label. Nothing is touched if the surface is gone.
pub fn render<S: DrawingSurface + ?Sized>(
    detections: &[Detection],
    surface: &mut S,
    display_width: u32,
    display_height: u32,
    style: &RenderStyle,
) -> Result<(), RenderPreconditionError> {
    if !surface.is_available() {
        return Err(RenderPreconditionError::SurfaceUnavailable);
    }

    surface.resize(display_width, display_height);
    surface.clear();

    for detection in detections {
        let Rect { x, y, .. } = detection.rect;
        surface.stroke_rect(detection.rect, style.box_color, style.line_width);

        let text_width = surface.measure_text(&label_text(detection), style.font_size);
        let background = Rect {
            x,
            y,
            w: text_width + LABEL_PADDING,
            h: style.font_size + LABEL_PADDING,
        };
        surface.fill_rect(background, style.box_color);
    }

    for detection in detections {
        surface.fill_text(
            &label_text(detection),
            detection.rect.x,
            detection.rect.y,
            style.text_color,
            style.font_size,
        );
    }

    Ok(())
}
