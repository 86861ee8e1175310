use crate::error::ModelLoadError;
use async_trait::async_trait;
use bytes::Bytes;
use std::{path::PathBuf, sync::Arc};
use url::Url;

#[async_trait]
pub trait AssetSource: Send + Sync + 'static {
    async fn fetch(&self, location: &str) -> Result<Bytes, ModelLoadError>;
}

#[async_trait]
impl<T: AssetSource + ?Sized> AssetSource for Arc<T> {
    async fn fetch(&self, location: &str) -> Result<Bytes, ModelLoadError> {
        (**self).fetch(location).await
    }
}

#[derive(Debug, Clone)]
pub struct LocalAssetSource {
    base_dir: PathBuf,
}

impl LocalAssetSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn resolve(&self, location: &str) -> Result<PathBuf, ModelLoadError> {
        match Url::parse(location) {
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map_err(|_| ModelLoadError::FetchFailed {
                    url: location.to_string(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        "file url has no local path",
                    ),
                }),
            Ok(url) => Err(ModelLoadError::FetchFailed {
                url: location.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::Unsupported,
                    format!("unsupported scheme {}", url.scheme()),
                ),
            }),
            Err(url::ParseError::RelativeUrlWithoutBase) => Ok(self.base_dir.join(location)),
            Err(e) => Err(ModelLoadError::InvalidUrl(location.to_string(), e)),
        }
    }
}

#[async_trait]
impl AssetSource for LocalAssetSource {
    async fn fetch(&self, location: &str) -> Result<Bytes, ModelLoadError> {
        let path = self.resolve(location)?;
        tracing::debug!("Fetching asset {} from {:?}", location, path);
        let data = tokio::fs::read(&path)
            .await
            .map_err(|source| ModelLoadError::FetchFailed {
                url: location.to_string(),
                source,
            })?;
        Ok(Bytes::from(data))
    }
}
