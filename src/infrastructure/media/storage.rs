use std::{io::ErrorKind, path::{Path, PathBuf}};

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use crate::errors::ImageError;

/// Named files grouped in one directory per property.
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Writes `bytes` as `file_name` in the property's directory, creating it if needed.
    async fn write(&self, property_id: &Uuid, file_name: &str, bytes: &[u8]) -> Result<(), ImageError>;

    /// Removes every file of the property whose name starts with `prefix`.
    /// Drops the directory once it is empty. Missing files are not an error.
    async fn remove_by_prefix(&self, property_id: &Uuid, prefix: &str) -> Result<usize, ImageError>;

    /// File names currently stored for the property, sorted.
    async fn list(&self, property_id: &Uuid) -> Result<Vec<String>, ImageError>;

    /// Readiness check for the admin health endpoint.
    async fn check_writable(&self) -> Result<(), ImageError>;
}

#[derive(Debug, Clone)]
pub struct LocalImageStorage {
    root: PathBuf,
}

impl LocalImageStorage {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        LocalImageStorage { root: upload_dir.into() }
    }

    pub fn property_dir(&self, property_id: &Uuid) -> PathBuf {
        self.root.join("properties").join(property_id.to_string())
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name)
        && name != "."
        && name != ".."
}

#[async_trait]
impl ImageStorage for LocalImageStorage {
    async fn write(&self, property_id: &Uuid, file_name: &str, bytes: &[u8]) -> Result<(), ImageError> {
        if !is_plain_file_name(file_name) {
            return Err(ImageError::Storage(format!("refusing to write '{}'", file_name)));
        }

        let dir = self.property_dir(property_id);
        fs::create_dir_all(&dir).await?;
        fs::write(dir.join(file_name), bytes).await?;

        tracing::debug!(%property_id, file_name, size = bytes.len(), "image file written");
        Ok(())
    }

    async fn remove_by_prefix(&self, property_id: &Uuid, prefix: &str) -> Result<usize, ImageError> {
        if prefix.is_empty() {
            return Err(ImageError::Storage("empty file prefix".into()));
        }

        let dir = self.property_dir(property_id);
        let mut removed = 0;

        for name in list_dir(&dir).await? {
            if !name.starts_with(prefix) {
                continue;
            }
            match fs::remove_file(dir.join(&name)).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        if list_dir(&dir).await?.is_empty() {
            match fs::remove_dir(&dir).await {
                Ok(()) => tracing::debug!(%property_id, "empty image directory removed"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                // a concurrent upload may have just written into it
                Err(e) if e.kind() == ErrorKind::DirectoryNotEmpty => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(removed)
    }

    async fn list(&self, property_id: &Uuid) -> Result<Vec<String>, ImageError> {
        list_dir(&self.property_dir(property_id)).await
    }

    async fn check_writable(&self) -> Result<(), ImageError> {
        fs::create_dir_all(&self.root).await?;
        let marker = self.root.join(format!(".write-check-{}", Uuid::new_v4().simple()));
        fs::write(&marker, b"ok").await?;
        fs::remove_file(&marker).await?;
        Ok(())
    }
}

/// Sorted file names of `dir`; a missing directory lists as empty.
async fn list_dir(dir: &Path) -> Result<Vec<String>, ImageError> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}
