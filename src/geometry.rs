#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// Maps a normalized `[min_y, min_x, max_y, max_x]` box onto a `width x height` surface.
///
/// Values outside `[0, 1]` pass through unclamped. Swapped corners are reordered
/// so the resulting width and height are never negative.
pub fn to_display_rect(bbox: [f32; 4], width: f32, height: f32) -> Rect {
    let [y1, x1, y2, x2] = bbox;
    let (min_x, max_x) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
    let (min_y, max_y) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };

    Rect {
        x: min_x * width,
        y: min_y * height,
        w: (max_x - min_x) * width,
        h: (max_y - min_y) * height,
    }
}
