use crate::tensor::BoxTensor;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NmsConfig {
    pub max_outputs: usize,
    pub iou_threshold: f32,
    pub score_threshold: f32,
}

impl Default for NmsConfig {
    fn default() -> Self {
        Self {
            max_outputs: 20,
            iou_threshold: 0.5,
            score_threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Corners {
    y1: f32,
    x1: f32,
    y2: f32,
    x2: f32,
}

impl Corners {
    fn from_box(b: [f32; 4]) -> Self {
        Self {
            y1: b[0].min(b[2]),
            x1: b[1].min(b[3]),
            y2: b[0].max(b[2]),
            x2: b[1].max(b[3]),
        }
    }

    fn area(&self) -> f32 {
        (self.y2 - self.y1) * (self.x2 - self.x1)
    }
}

fn intersection(box1: &Corners, box2: &Corners) -> f32 {
    let h = (box1.y2.min(box2.y2) - box1.y1.max(box2.y1)).max(0.0);
    let w = (box1.x2.min(box2.x2) - box1.x1.max(box2.x1)).max(0.0);
    h * w
}

pub fn iou(box1: [f32; 4], box2: [f32; 4]) -> f32 {
    let box1 = Corners::from_box(box1);
    let box2 = Corners::from_box(box2);
    let (area1, area2) = (box1.area(), box2.area());
    if area1 <= 0.0 || area2 <= 0.0 {
        return 0.0;
    }
    let inter = intersection(&box1, &box2);
    inter / (area1 + area2 - inter)
}

/// Greedy non-max suppression.
///
/// Returns indices into the original location order, highest score first.
/// Equal scores keep their original relative order.
pub fn suppress(boxes: &BoxTensor, max_scores: &[f32], config: &NmsConfig) -> Vec<usize> {
    let num_locations = boxes.num_locations().min(max_scores.len());

    let mut candidates: Vec<(usize, f32)> = (0..num_locations)
        .map(|i| (i, max_scores[i]))
        .filter(|(_, score)| *score >= config.score_threshold)
        .collect();
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut selected: Vec<usize> = Vec::with_capacity(config.max_outputs.min(candidates.len()));
    for (index, _) in candidates {
        if selected.len() >= config.max_outputs {
            break;
        }
        let candidate = boxes.get(index);
        let overlaps = selected
            .iter()
            .any(|&kept| iou(boxes.get(kept), candidate) >= config.iou_threshold);
        if !overlaps {
            selected.push(index);
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn boxes(rows: &[[f32; 4]]) -> BoxTensor {
        BoxTensor::new(rows.iter().flatten().copied().collect(), rows.len()).unwrap()
    }

    #[test]
    fn test_iou() {
        let a = [0.0, 0.0, 1.0, 1.0];
        let b = [0.0, 0.5, 1.0, 1.5];

        assert!((iou(a, a) - 1.0).abs() < 1e-6);
        assert!((iou(a, b) - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(iou(a, [2.0, 2.0, 3.0, 3.0]), 0.0);
        assert_eq!(iou(a, [0.5, 0.5, 0.5, 0.9]), 0.0);
        // flipped corners describe the same box
        assert!((iou(a, [1.0, 1.0, 0.0, 0.0]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_suppresses_overlapping_lower_score() {
        let b = boxes(&[
            [0.0, 0.0, 0.5, 0.5],
            [0.0, 0.01, 0.5, 0.51],
            [0.6, 0.6, 0.9, 0.9],
        ]);
        let selected = suppress(&b, &[0.8, 0.9, 0.7], &NmsConfig::default());

        assert_eq!(selected, vec![1, 2]);
    }

    #[test]
    fn test_score_threshold_and_order() {
        let b = boxes(&[
            [0.0, 0.0, 0.1, 0.1],
            [0.2, 0.2, 0.3, 0.3],
            [0.4, 0.4, 0.5, 0.5],
            [0.6, 0.6, 0.7, 0.7],
        ]);
        let scores = [0.55, 0.2, 0.95, 0.5];
        let selected = suppress(&b, &scores, &NmsConfig::default());

        assert_eq!(selected, vec![2, 0, 3]);
        assert!(selected.iter().all(|&i| scores[i] >= 0.5));
    }

    #[test]
    fn test_max_outputs_cap() {
        let rows: Vec<[f32; 4]> = (0..50)
            .map(|i| {
                let o = i as f32 * 0.02;
                [o, o, o + 0.01, o + 0.01]
            })
            .collect();
        let scores: Vec<f32> = (0..50).map(|i| 0.5 + i as f32 * 0.01).collect();
        let config = NmsConfig::default();
        let selected = suppress(&boxes(&rows), &scores, &config);

        assert_eq!(selected.len(), config.max_outputs);
        assert_eq!(selected[0], 49);

        let none = suppress(
            &boxes(&rows),
            &scores,
            &NmsConfig {
                max_outputs: 0,
                ..config
            },
        );
        assert!(none.is_empty());
    }

    #[test]
    fn test_no_selected_pair_overlaps() {
        let rows: Vec<[f32; 4]> = (0..30)
            .map(|i| {
                let o = (i % 10) as f32 * 0.05;
                let s = 0.2 + (i / 10) as f32 * 0.05;
                [o, o, o + s, o + s]
            })
            .collect();
        let scores: Vec<f32> = (0..30).map(|i| ((i * 7) % 30) as f32 / 30.0).collect();
        let config = NmsConfig {
            max_outputs: 100,
            ..NmsConfig::default()
        };
        let selected = suppress(&boxes(&rows), &scores, &config);

        for (n, &i) in selected.iter().enumerate() {
            for &j in &selected[n + 1..] {
                assert!(iou(rows[i], rows[j]) < config.iou_threshold);
            }
        }
    }

    #[test]
    fn test_selected_set_invariant_under_permutation() {
        let rows = [
            [0.0, 0.0, 0.4, 0.4],
            [0.05, 0.05, 0.45, 0.45],
            [0.5, 0.5, 0.9, 0.9],
            [0.52, 0.52, 0.92, 0.92],
            [0.0, 0.6, 0.3, 0.9],
        ];
        let scores = [0.9, 0.85, 0.6, 0.75, 0.7];
        let config = NmsConfig::default();
        let baseline: BTreeSet<usize> = suppress(&boxes(&rows), &scores, &config)
            .into_iter()
            .collect();

        let permutation = [3, 0, 4, 2, 1];
        let permuted_rows: Vec<[f32; 4]> = permutation.iter().map(|&i| rows[i]).collect();
        let permuted_scores: Vec<f32> = permutation.iter().map(|&i| scores[i]).collect();
        let permuted: BTreeSet<usize> =
            suppress(&boxes(&permuted_rows), &permuted_scores, &config)
                .into_iter()
                .map(|i| permutation[i])
                .collect();

        assert_eq!(baseline, permuted);
        assert_eq!(baseline, BTreeSet::from([0, 3, 4]));
    }
}
