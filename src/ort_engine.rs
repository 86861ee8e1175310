use crate::{
    engine::InferenceEngine,
    error::{InferenceError, ModelLoadError},
};
use async_trait::async_trait;
use ndarray::{Array4, ArrayD};
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::TensorRef,
};
use std::sync::Mutex;

pub struct OrtModel {
    session: Mutex<Session>,
    output_names: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct OrtEngine {}

impl OrtEngine {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl InferenceEngine for OrtEngine {
    type Model = OrtModel;

    async fn load_model(&self, bytes: &[u8]) -> Result<OrtModel, ModelLoadError> {
        let session = Session::builder()
            .and_then(|builder| builder.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|builder| builder.commit_from_memory(bytes))
            .map_err(|e| ModelLoadError::Deserialize(e.to_string()))?;

        let output_names: Vec<String> = session
            .outputs
            .iter()
            .map(|output| output.name.clone())
            .collect();
        tracing::info!(
            "Created ONNX session from {} bytes, outputs: {:?}",
            bytes.len(),
            output_names
        );

        Ok(OrtModel {
            session: Mutex::new(session),
            output_names,
        })
    }

    async fn execute(
        &self,
        model: &OrtModel,
        input: &Array4<i32>,
    ) -> Result<Vec<ArrayD<f32>>, InferenceError> {
        let mut session = model
            .session
            .lock()
            .map_err(|e| InferenceError::Engine(format!("session mutex poisoned: {}", e)))?;

        let owned_buffer;
        let input_view = if input.view().is_standard_layout() {
            input.view()
        } else {
            owned_buffer = input.as_standard_layout().to_owned();
            owned_buffer.view()
        };

        let tensor_ref = TensorRef::from_array_view(input_view)?;
        let outputs = session.run(ort::inputs![tensor_ref])?;

        let mut tensors = Vec::with_capacity(model.output_names.len());
        for name in &model.output_names {
            let (shape, data) = outputs[name.as_str()].try_extract_tensor::<f32>()?;
            tensors.push(ArrayD::from_shape_vec(shape.to_ixdyn(), data.to_vec())?);
        }

        tracing::debug!("Inference produced {} output tensors", tensors.len());
        Ok(tensors)
    }
}
