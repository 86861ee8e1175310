use crate::{
    asset_cache::{AssetCache, SessionContext},
    engine::InferenceEngine,
    source::AssetSource,
    store::ModelStore,
};

pub const LOADING_MESSAGE: &str = "Loading Model. This may take a moment on the first visit...";
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load model. Please try refreshing the page.";

pub enum SessionState<M> {
    Loading,
    Ready(SessionContext<M>),
    Failed(String),
}

impl<M> SessionState<M> {
    pub async fn load<E, S, P>(cache: &AssetCache<E, S, P>) -> Self
    where
        E: InferenceEngine<Model = M>,
        S: AssetSource,
        P: ModelStore,
    {
        match cache.acquire().await {
            Ok(context) => SessionState::Ready(context),
            Err(e) => {
                tracing::error!("Failed to load or process model: {}", e);
                SessionState::Failed(e.to_string())
            }
        }
    }

    pub fn context(&self) -> Option<&SessionContext<M>> {
        match self {
            SessionState::Ready(context) => Some(context),
            _ => None,
        }
    }

    pub fn status_message(&self) -> Option<&'static str> {
        match self {
            SessionState::Loading => Some(LOADING_MESSAGE),
            SessionState::Ready(_) => None,
            SessionState::Failed(_) => Some(LOAD_FAILED_MESSAGE),
        }
    }
}
