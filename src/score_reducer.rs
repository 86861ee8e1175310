use crate::tensor::ScoreTensor;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReducedScore {
    pub max_score: f32,
    pub class_index: usize,
}

/// Reduces every location's class scores to its best `(score, class)` pair.
///
/// The scan only moves on a strictly greater score, so ties keep the lowest
/// class index. Locations are never skipped, even when every score is non-positive.
pub fn reduce(scores: &ScoreTensor) -> Vec<ReducedScore> {
    scores
        .rows()
        .map(|row| {
            let (class_index, max_score) = row
                .iter()
                .copied()
                .enumerate()
                .reduce(|accum, entry| if entry.1 > accum.1 { entry } else { accum })
                .unwrap_or((0, f32::NEG_INFINITY));
            ReducedScore {
                max_score,
                class_index,
            }
        })
        .collect()
}

pub fn split(reduced: &[ReducedScore]) -> (Vec<f32>, Vec<usize>) {
    reduced
        .iter()
        .map(|r| (r.max_score, r.class_index))
        .unzip()
}
