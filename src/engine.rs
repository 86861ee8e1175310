use crate::error::{InferenceError, ModelLoadError};
use async_trait::async_trait;
use ndarray::{Array4, ArrayD};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Accelerated,
    Cpu,
}

#[async_trait]
pub trait InferenceEngine: Send + Sync + 'static {
    type Model: Send + Sync + 'static;

    async fn load_model(&self, bytes: &[u8]) -> Result<Self::Model, ModelLoadError>;

    async fn execute(
        &self,
        model: &Self::Model,
        input: &Array4<i32>,
    ) -> Result<Vec<ArrayD<f32>>, InferenceError>;

    fn backend(&self) -> Backend {
        Backend::Cpu
    }

    fn set_backend(&self, _backend: Backend) {}
}

/// Holds an engine on a given backend and restores the previous one on drop.
pub struct BackendScope<'a, E: InferenceEngine + ?Sized> {
    engine: &'a E,
    previous: Backend,
}

impl<'a, E: InferenceEngine + ?Sized> BackendScope<'a, E> {
    pub fn acquire(engine: &'a E, backend: Backend) -> Self {
        let previous = engine.backend();
        if previous != backend {
            tracing::debug!("Switching backend {:?} -> {:?}", previous, backend);
            engine.set_backend(backend);
        }
        Self { engine, previous }
    }
}

impl<E: InferenceEngine + ?Sized> Drop for BackendScope<'_, E> {
    fn drop(&mut self) {
        if self.engine.backend() != self.previous {
            self.engine.set_backend(self.previous);
        }
    }
}
