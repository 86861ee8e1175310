use crate::{
    engine::InferenceEngine,
    error::InferenceError,
    tensor::{BoxTensor, ScoreTensor},
};
use ndarray::{Array4, ArrayD};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputLayout {
    pub scores: usize,
    pub boxes: usize,
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self { scores: 0, boxes: 1 }
    }
}

#[derive(Debug, Clone)]
pub struct RawOutputs {
    pub scores: ScoreTensor,
    pub boxes: BoxTensor,
}

pub async fn infer<E: InferenceEngine + ?Sized>(
    engine: &E,
    model: &E::Model,
    input: &Array4<i32>,
    layout: OutputLayout,
) -> Result<RawOutputs, InferenceError> {
    let outputs = engine.execute(model, input).await?;
    let expected = layout.scores.max(layout.boxes) + 1;
    if outputs.len() < expected {
        return Err(InferenceError::MissingOutput {
            expected,
            got: outputs.len(),
        });
    }

    split_outputs(&outputs[layout.scores], &outputs[layout.boxes])
}

fn split_outputs(scores: &ArrayD<f32>, boxes: &ArrayD<f32>) -> Result<RawOutputs, InferenceError> {
    let score_shape = scores.shape().to_vec();
    let (num_locations, num_classes) = match score_shape.as_slice() {
        [1, n, c] | [n, c] if *c > 0 => (*n, *c),
        _ => {
            return Err(InferenceError::BadShape {
                name: "scores",
                shape: score_shape,
            })
        }
    };

    let box_shape = boxes.shape().to_vec();
    let box_locations = match box_shape.as_slice() {
        [1, n, 1, 4] | [1, n, 4] | [n, 4] => *n,
        _ => {
            return Err(InferenceError::BadShape {
                name: "boxes",
                shape: box_shape,
            })
        }
    };

    if box_locations != num_locations {
        return Err(InferenceError::LocationMismatch {
            scores: num_locations,
            boxes: box_locations,
        });
    }

    let score_values = scores.as_standard_layout().iter().copied().collect();
    let box_values = boxes.as_standard_layout().iter().copied().collect();

    Ok(RawOutputs {
        scores: ScoreTensor::new(score_values, num_locations, num_classes)?,
        boxes: BoxTensor::new(box_values, num_locations)?,
    })
}
