//! Image variant pipeline: one upload in, four files out (original, large,
//! medium, thumbnail) under the owning property's directory.
//!
//! A save either materializes the whole family or nothing. Every file of an
//! upload shares a generated stem, so cleanup and deletion are prefix matches
//! scoped to that stem.

pub mod processing;
pub mod storage;

use std::{path::Path, sync::Arc};

use uuid::Uuid;

use crate::{
    entities::image::StoredImage,
    errors::ImageError,
    utils::filename::{allowed_extension, sanitize_filename},
};
use processing::{render_all, EncodedVariant, VariantKind, VariantSpec, DEFAULT_VARIANTS, OUTPUT_CONTENT_TYPE};
use storage::ImageStorage;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub allowed_extensions: Vec<String>,
    pub variants: Vec<VariantSpec>,
}

impl PipelineConfig {
    pub fn new(allowed_extensions: Vec<String>) -> Self {
        PipelineConfig {
            allowed_extensions,
            variants: DEFAULT_VARIANTS.to_vec(),
        }
    }
}

pub struct ImageVariantPipeline<S>
where
    S: ImageStorage,
{
    storage: Arc<S>,
    config: Arc<PipelineConfig>,
}

impl<S> Clone for ImageVariantPipeline<S>
where
    S: ImageStorage,
{
    fn clone(&self) -> Self {
        ImageVariantPipeline {
            storage: Arc::clone(&self.storage),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S> ImageVariantPipeline<S>
where
    S: ImageStorage + 'static,
{
    pub fn new(storage: S, config: PipelineConfig) -> Self {
        ImageVariantPipeline {
            storage: Arc::new(storage),
            config: Arc::new(config),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Validates, renders and stores one upload.
    ///
    /// The extension is checked before the content is looked at. If anything
    /// fails after the first write, every file carrying this upload's stem is
    /// removed before the error is returned.
    pub async fn save(
        &self,
        property_id: &Uuid,
        original_filename: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredImage, ImageError> {
        allowed_extension(original_filename, &self.config.allowed_extensions)?;

        let variants = self.config.variants.clone();
        let rendered = tokio::task::spawn_blocking(move || render_all(&bytes, &variants))
            .await
            .map_err(|e| ImageError::Encode(format!("image worker failed: {}", e)))??;

        let stem = Uuid::new_v4().simple().to_string();

        if let Err(e) = self.write_family(property_id, &stem, &rendered).await {
            tracing::error!(%property_id, stem, error = %e, "storing image variants failed, cleaning up");
            self.cleanup(property_id, &stem).await;
            return Err(e);
        }

        let main = rendered
            .iter()
            .find(|v| v.kind == VariantKind::Large)
            .or_else(|| rendered.iter().find(|v| v.kind == VariantKind::Original))
            .ok_or_else(|| ImageError::Encode("no variant rendered".into()))?;

        let stored = StoredImage {
            stored_filename: main.kind.file_name(&stem),
            original_filename: sanitize_filename(original_filename),
            file_size: main.bytes.len() as u64,
            content_type: OUTPUT_CONTENT_TYPE.to_string(),
            width: main.width,
            height: main.height,
        };

        tracing::info!(
            %property_id,
            stored_filename = %stored.stored_filename,
            width = stored.width,
            height = stored.height,
            "image stored"
        );
        Ok(stored)
    }

    /// Removes the original and every variant of a stored image.
    pub async fn delete(&self, property_id: &Uuid, stored_filename: &str) -> Result<usize, ImageError> {
        let stem = stem_of(stored_filename)?;
        let removed = self.storage.remove_by_prefix(property_id, stem).await?;
        tracing::info!(%property_id, stored_filename, removed, "image files deleted");
        Ok(removed)
    }

    /// Removes the files of an upload whose metadata could not be recorded.
    pub async fn discard(&self, property_id: &Uuid, stored: &StoredImage) {
        if let Ok(stem) = stem_of(&stored.stored_filename) {
            self.cleanup(property_id, stem).await;
        }
    }

    async fn write_family(
        &self,
        property_id: &Uuid,
        stem: &str,
        rendered: &[EncodedVariant],
    ) -> Result<(), ImageError> {
        for variant in rendered {
            self.storage
                .write(property_id, &variant.kind.file_name(stem), &variant.bytes)
                .await?;
        }
        Ok(())
    }

    async fn cleanup(&self, property_id: &Uuid, stem: &str) {
        if let Err(e) = self.storage.remove_by_prefix(property_id, stem).await {
            tracing::error!(%property_id, stem, error = %e, "cleanup of partial upload failed");
        }
    }
}

/// The generated stem shared by every file of an image family.
fn stem_of(stored_filename: &str) -> Result<&str, ImageError> {
    Path::new(stored_filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty() && !s.contains('_'))
        .ok_or_else(|| ImageError::Storage(format!("invalid stored file name '{}'", stored_filename)))
}
