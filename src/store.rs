use crate::error::PersistenceError;
use async_trait::async_trait;
use bytes::Bytes;
use std::{path::PathBuf, sync::Arc};

#[async_trait]
pub trait ModelStore: Send + Sync + 'static {
    async fn exists(&self, key: &str) -> Result<bool, PersistenceError>;
    async fn load(&self, key: &str) -> Result<Bytes, PersistenceError>;
    async fn save(&self, key: &str, model: &[u8]) -> Result<(), PersistenceError>;
}

#[async_trait]
impl<T: ModelStore + ?Sized> ModelStore for Arc<T> {
    async fn exists(&self, key: &str) -> Result<bool, PersistenceError> {
        (**self).exists(key).await
    }

    async fn load(&self, key: &str) -> Result<Bytes, PersistenceError> {
        (**self).load(key).await
    }

    async fn save(&self, key: &str, model: &[u8]) -> Result<(), PersistenceError> {
        (**self).save(key, model).await
    }
}

#[derive(Debug, Clone)]
pub struct FsModelStore {
    dir: PathBuf,
}

impl FsModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, PersistenceError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(PersistenceError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.model", key)))
    }
}

#[async_trait]
impl ModelStore for FsModelStore {
    async fn exists(&self, key: &str) -> Result<bool, PersistenceError> {
        let path = self.path_for(key)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    async fn load(&self, key: &str) -> Result<Bytes, PersistenceError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PersistenceError::Missing(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, key: &str, model: &[u8]) -> Result<(), PersistenceError> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        // entries are replaced atomically
        let tmp = path.with_extension("model.tmp");
        tokio::fs::write(&tmp, model).await?;
        tokio::fs::rename(&tmp, &path).await?;

        tracing::debug!("Stored {} bytes under {:?}", model.len(), path);
        Ok(())
    }
}
