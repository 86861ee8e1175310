use crate::{
    geometry::{to_display_rect, Rect},
    labels::LabelTable,
    score_reducer::ReducedScore,
    tensor::BoxTensor,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub rect: Rect,
    pub class_name: String,
    pub class_index: usize,
    pub score: f32,
}

pub fn build_detections(
    boxes: &BoxTensor,
    reduced: &[ReducedScore],
    selected: &[usize],
    labels: &LabelTable,
    display_width: u32,
    display_height: u32,
) -> Vec<Detection> {
    selected
        .iter()
        .map(|&location| {
            let best = reduced[location];
            Detection {
                rect: to_display_rect(
                    boxes.get(location),
                    display_width as f32,
                    display_height as f32,
                ),
                class_name: labels.name_or_unknown(best.class_index),
                class_index: best.class_index,
                score: best.max_score,
            }
        })
        .collect()
}
