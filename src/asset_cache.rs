use crate::{
    config::AssetsConfig,
    engine::InferenceEngine,
    error::ModelLoadError,
    labels::LabelTable,
    source::AssetSource,
    store::ModelStore,
};
use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::OnceCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSource {
    Cached,
    Remote,
}

pub struct SessionContext<M> {
    pub model: Arc<M>,
    pub labels: Arc<LabelTable>,
    pub source: ModelSource,
}

impl<M> Clone for SessionContext<M> {
    fn clone(&self) -> Self {
        Self {
            model: self.model.clone(),
            labels: self.labels.clone(),
            source: self.source,
        }
    }
}

pub struct AssetCache<E: InferenceEngine, S: AssetSource, P: ModelStore> {
    engine: Arc<E>,
    source: S,
    store: P,
    model_url: String,
    labels_url: String,
    model_key: String,
    session: OnceCell<SessionContext<E::Model>>,
}

impl<E: InferenceEngine, S: AssetSource, P: ModelStore> AssetCache<E, S, P> {
    pub fn new(engine: Arc<E>, source: S, store: P, assets: &AssetsConfig) -> Self {
        Self {
            engine,
            source,
            store,
            model_url: assets.model_url.clone(),
            labels_url: assets.labels_url.clone(),
            model_key: assets.model_key.clone(),
            session: OnceCell::new(),
        }
    }

    /// Loads model and labels once. Later and concurrent calls share the first result.
    pub async fn acquire(&self) -> Result<SessionContext<E::Model>, ModelLoadError> {
        let session = self
            .session
            .get_or_try_init(|| async {
                let (model, source, fresh) = self.resolve_model().await?;
                let labels = self.acquire_labels().await?;
                if let Some(bytes) = fresh {
                    self.persist(&bytes).await;
                }
                tracing::info!(
                    "Session ready: model from {:?}, {} labels",
                    source,
                    labels.len()
                );
                Ok::<_, ModelLoadError>(SessionContext {
                    model: Arc::new(model),
                    labels: Arc::new(labels),
                    source,
                })
            })
            .await?;

        Ok(session.clone())
    }

    pub async fn acquire_model(&self) -> Result<(Arc<E::Model>, ModelSource), ModelLoadError> {
        let session = self.acquire().await?;
        Ok((session.model, session.source))
    }

    pub async fn acquire_labels(&self) -> Result<LabelTable, ModelLoadError> {
        let data = self.source.fetch(&self.labels_url).await?;
        LabelTable::from_json(&data)
    }

    async fn resolve_model(&self) -> Result<(E::Model, ModelSource, Option<Bytes>), ModelLoadError> {
        let cached = match self.store.exists(&self.model_key).await {
            Ok(exists) => exists,
            Err(e) => {
                tracing::warn!("Model cache lookup failed, using remote: {}", e);
                false
            }
        };

        if cached {
            let bytes = self
                .store
                .load(&self.model_key)
                .await
                .map_err(|source| ModelLoadError::CacheReadFailed {
                    key: self.model_key.clone(),
                    source,
                })?;
            let model = self.engine.load_model(&bytes).await?;
            tracing::info!("Loaded model from cache");
            return Ok((model, ModelSource::Cached, None));
        }

        tracing::info!("Loading model from remote for the first time: {}", self.model_url);
        let bytes = self.source.fetch(&self.model_url).await?;
        let model = self.engine.load_model(&bytes).await?;
        Ok((model, ModelSource::Remote, Some(bytes)))
    }

    async fn persist(&self, bytes: &[u8]) {
        match self.store.save(&self.model_key, bytes).await {
            Ok(()) => tracing::info!("Model saved to cache under {}", self.model_key),
            Err(e) => tracing::warn!("Failed to save model to cache, continuing: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{InferenceError, PersistenceError},
        store::tests::MemoryStore,
    };
    use async_trait::async_trait;
    use ndarray::{Array4, ArrayD};
    use parking_lot::Mutex;
    use std::collections::HashMap;

    const MODEL_URL: &str = "https://cdn.example.com/detection/model.onnx";
    const LABELS_URL: &str = "https://cdn.example.com/detection/labels.json";

    struct CountingSource {
        assets: HashMap<String, Bytes>,
        fetches: Mutex<Vec<String>>,
    }

    impl CountingSource {
        fn new() -> Self {
            let mut assets = HashMap::new();
            assets.insert(MODEL_URL.to_string(), Bytes::from_static(b"weights-v1"));
            assets.insert(
                LABELS_URL.to_string(),
                Bytes::from_static(br#"["cat", "dog"]"#),
            );
            Self {
                assets,
                fetches: Mutex::new(vec![]),
            }
        }

        fn count(&self, url: &str) -> usize {
            self.fetches.lock().iter().filter(|f| f.as_str() == url).count()
        }
    }

    #[async_trait]
    impl AssetSource for CountingSource {
        async fn fetch(&self, location: &str) -> Result<Bytes, ModelLoadError> {
            self.fetches.lock().push(location.to_string());
            tokio::task::yield_now().await;
            self.assets
                .get(location)
                .cloned()
                .ok_or_else(|| ModelLoadError::FetchFailed {
                    url: location.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "404"),
                })
        }
    }

    struct TextEngine;

    #[async_trait]
    impl InferenceEngine for TextEngine {
        type Model = String;

        async fn load_model(&self, bytes: &[u8]) -> Result<String, ModelLoadError> {
            String::from_utf8(bytes.to_vec())
                .map_err(|e| ModelLoadError::Deserialize(e.to_string()))
        }

        async fn execute(
            &self,
            _model: &String,
            _input: &Array4<i32>,
        ) -> Result<Vec<ArrayD<f32>>, InferenceError> {
            Ok(vec![])
        }
    }

    fn assets() -> AssetsConfig {
        AssetsConfig {
            model_url: MODEL_URL.to_string(),
            labels_url: LABELS_URL.to_string(),
            cache_dir: ".cache".into(),
            model_key: "animal_detector".to_string(),
            base_dir: ".".into(),
        }
    }

    fn cache(
        source: &Arc<CountingSource>,
        store: &Arc<MemoryStore>,
    ) -> AssetCache<TextEngine, Arc<CountingSource>, Arc<MemoryStore>> {
        AssetCache::new(Arc::new(TextEngine), source.clone(), store.clone(), &assets())
    }

    #[tokio::test]
    async fn test_cold_then_warm_session() {
        let store = Arc::new(MemoryStore::default());

        let source = Arc::new(CountingSource::new());
        let first = cache(&source, &store).acquire().await.unwrap();
        assert_eq!(first.source, ModelSource::Remote);
        assert_eq!(first.model.as_str(), "weights-v1");
        assert_eq!(&first.labels[1], "dog");
        assert_eq!(source.count(MODEL_URL), 1);
        assert_eq!(source.count(LABELS_URL), 1);
        assert_eq!(*store.saves.lock(), 1);

        let source = Arc::new(CountingSource::new());
        let second = cache(&source, &store).acquire().await.unwrap();
        assert_eq!(second.source, ModelSource::Cached);
        assert_eq!(second.model.as_str(), "weights-v1");
        assert_eq!(source.count(MODEL_URL), 0);
        assert_eq!(source.count(LABELS_URL), 1);
        assert_eq!(*store.saves.lock(), 1);
    }

    #[tokio::test]
    async fn test_acquire_is_idempotent() {
        let store = Arc::new(MemoryStore::default());
        let source = Arc::new(CountingSource::new());
        let cache = cache(&source, &store);

        let (a, b) = tokio::join!(cache.acquire(), cache.acquire());
        let (a, b) = (a.unwrap(), b.unwrap());
        let (model, _) = cache.acquire_model().await.unwrap();

        assert!(cache.session.initialized());
        assert!(Arc::ptr_eq(&a.model, &b.model));
        assert!(Arc::ptr_eq(&a.model, &model));
        assert_eq!(source.count(MODEL_URL), 1);
        assert_eq!(source.count(LABELS_URL), 1);
    }

    #[tokio::test]
    async fn test_persist_failure_is_not_fatal() {
        let store = Arc::new(MemoryStore {
            fail_saves: true,
            ..MemoryStore::default()
        });
        let source = Arc::new(CountingSource::new());
        let session = cache(&source, &store).acquire().await.unwrap();

        assert_eq!(session.source, ModelSource::Remote);
        assert_eq!(*store.saves.lock(), 1);
        assert!(store.entries.lock().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failures_fail_acquisition() {
        let store = Arc::new(MemoryStore::default());
        let mut source = CountingSource::new();
        source.assets.remove(LABELS_URL);
        let source = Arc::new(source);
        let cache = cache(&source, &store);

        assert!(matches!(
            cache.acquire().await,
            Err(ModelLoadError::FetchFailed { .. })
        ));
        assert!(!cache.session.initialized());
        assert_eq!(*store.saves.lock(), 0);

        let mut source = CountingSource::new();
        source.assets.remove(MODEL_URL);
        let source = Arc::new(source);
        let result = AssetCache::new(Arc::new(TextEngine), source.clone(), store.clone(), &assets())
            .acquire_model()
            .await;
        assert!(matches!(result, Err(ModelLoadError::FetchFailed { .. })));
        assert_eq!(source.count(LABELS_URL), 0);
    }

    #[tokio::test]
    async fn test_corrupt_cache_entry_is_a_load_error() {
        let store = Arc::new(MemoryStore::default());
        store
            .entries
            .lock()
            .insert("animal_detector".to_string(), Bytes::from_static(&[0xff, 0xfe]));
        let source = Arc::new(CountingSource::new());
        let result = cache(&source, &store).acquire().await;

        assert!(matches!(result, Err(ModelLoadError::Deserialize(_))));
        assert_eq!(source.count(MODEL_URL), 0);
    }

    #[tokio::test]
    async fn test_missing_cache_entry_reports_key() {
        struct PhantomStore;

        #[async_trait]
        impl ModelStore for PhantomStore {
            async fn exists(&self, _key: &str) -> Result<bool, PersistenceError> {
                Ok(true)
            }

            async fn load(&self, key: &str) -> Result<Bytes, PersistenceError> {
                Err(PersistenceError::Missing(key.to_string()))
            }

            async fn save(&self, _key: &str, _model: &[u8]) -> Result<(), PersistenceError> {
                Ok(())
            }
        }

        let source = Arc::new(CountingSource::new());
        let cache = AssetCache::new(Arc::new(TextEngine), source, PhantomStore, &assets());

        match cache.acquire().await {
            Err(ModelLoadError::CacheReadFailed { key, .. }) => assert_eq!(key, "animal_detector"),
            other => panic!("unexpected result: {:?}", other.map(|s| s.source)),
        }
    }
}
