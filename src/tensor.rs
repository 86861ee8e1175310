use crate::error::InferenceError;
use ndarray::{Array2, ArrayView1, Axis};

#[derive(Debug, Clone)]
pub struct ScoreTensor {
    data: Array2<f32>,
}

impl ScoreTensor {
    pub fn new(
        values: Vec<f32>,
        num_locations: usize,
        num_classes: usize,
    ) -> Result<Self, InferenceError> {
        if num_classes == 0 {
            return Err(InferenceError::BadShape {
                name: "scores",
                shape: vec![num_locations, num_classes],
            });
        }
        let data = Array2::from_shape_vec((num_locations, num_classes), values)?;
        Ok(Self { data })
    }

    pub fn num_locations(&self) -> usize {
        self.data.nrows()
    }

    pub fn num_classes(&self) -> usize {
        self.data.ncols()
    }

    pub fn rows(&self) -> impl Iterator<Item = ArrayView1<'_, f32>> {
        self.data.axis_iter(Axis(0))
    }
}

#[derive(Debug, Clone)]
pub struct BoxTensor {
    data: Array2<f32>,
}

impl BoxTensor {
    pub fn new(values: Vec<f32>, num_locations: usize) -> Result<Self, InferenceError> {
        let data = Array2::from_shape_vec((num_locations, 4), values)?;
        Ok(Self { data })
    }

    pub fn num_locations(&self) -> usize {
        self.data.nrows()
    }

    pub fn get(&self, location: usize) -> [f32; 4] {
        let row = self.data.row(location);
        [row[0], row[1], row[2], row[3]]
    }
}
