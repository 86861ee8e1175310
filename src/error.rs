use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("Failed to fetch asset {url}: {source}")]
    FetchFailed {
        url: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid asset url {0}: {1}")]
    InvalidUrl(String, url::ParseError),
    #[error("Failed to read cached model {key}: {source}")]
    CacheReadFailed {
        key: String,
        #[source]
        source: PersistenceError,
    },
    #[error("Failed to deserialize model: {0}")]
    Deserialize(String),
    #[error("Failed to parse label table: {0}")]
    InvalidLabels(#[from] serde_json::Error),
    #[error("Label table is empty")]
    EmptyLabels,
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Model store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No model stored under key {0}")]
    Missing(String),
    #[error("Invalid model key {0:?}")]
    InvalidKey(String),
}

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Source image has no pixels")]
    EmptyImage,
    #[error("Inference engine failed: {0}")]
    Engine(String),
    #[error("Engine returned {got} outputs, expected at least {expected}")]
    MissingOutput { expected: usize, got: usize },
    #[error("Unexpected {name} tensor shape {shape:?}")]
    BadShape { name: &'static str, shape: Vec<usize> },
    #[error("Location count mismatch: {scores} score rows, {boxes} boxes")]
    LocationMismatch { scores: usize, boxes: usize },
    #[error("Tensor layout error: {0}")]
    Layout(#[from] ndarray::ShapeError),
}

impl From<ort::Error> for InferenceError {
    fn from(err: ort::Error) -> Self {
        InferenceError::Engine(err.to_string())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RenderPreconditionError {
    #[error("Image source is not available")]
    ImageUnavailable,
    #[error("Drawing surface is not available")]
    SurfaceUnavailable,
}

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),
    #[error("Render precondition failed: {0}")]
    Precondition(#[from] RenderPreconditionError),
}
