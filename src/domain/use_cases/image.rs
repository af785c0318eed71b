use uuid::Uuid;

use crate::{
    entities::{
        image::{ImageDeletedResponse, PropertyImage},
        token::Actor,
    },
    errors::AppError,
    media::{storage::ImageStorage, ImageVariantPipeline},
    repositories::{image::PropertyImageRepository, property::PropertyRepository},
    use_cases::property::owned_property,
    utils::valid_uuid::valid_uuid,
};

pub struct ImageHandler<I, P, S>
where
    I: PropertyImageRepository,
    P: PropertyRepository,
    S: ImageStorage + 'static,
{
    pub image_repo: I,
    pub property_repo: P,
    pub pipeline: ImageVariantPipeline<S>,
}

impl<I, P, S> ImageHandler<I, P, S>
where
    I: PropertyImageRepository,
    P: PropertyRepository,
    S: ImageStorage + 'static,
{
    pub fn new(image_repo: I, property_repo: P, pipeline: ImageVariantPipeline<S>) -> Self {
        ImageHandler { image_repo, property_repo, pipeline }
    }

    /// Runs the upload through the variant pipeline and records its metadata.
    /// If the row cannot be written, the files just stored are removed.
    pub async fn upload_image(
        &self,
        actor: &Actor,
        property_id: &str,
        original_filename: &str,
        bytes: Vec<u8>,
    ) -> Result<PropertyImage, AppError> {
        let id = valid_uuid(property_id)?;
        owned_property(&self.property_repo, actor, &id).await?;

        let stored = self.pipeline.save(&id, original_filename, bytes).await?;

        match self.image_repo.insert_image(&stored.clone().into_insert(id)).await {
            Ok(image) => Ok(image),
            Err(e) => {
                tracing::error!(property_id = %id, error = %e, "image metadata not recorded, removing files");
                self.pipeline.discard(&id, &stored).await;
                Err(e)
            }
        }
    }

    pub async fn list_images(&self, property_id: &str) -> Result<Vec<PropertyImage>, AppError> {
        let id = valid_uuid(property_id)?;
        self.image_repo.list_images(&id).await
    }

    pub async fn set_primary(&self, actor: &Actor, property_id: &str, image_id: &str) -> Result<PropertyImage, AppError> {
        let property_id = valid_uuid(property_id)?;
        let image_id = valid_uuid(image_id)?;
        owned_property(&self.property_repo, actor, &property_id).await?;

        self.image_repo.set_primary(&property_id, &image_id).await
    }

    /// Deletes the row first, then every file of the image family.
    pub async fn delete_image(
        &self,
        actor: &Actor,
        property_id: &str,
        image_id: &str,
    ) -> Result<ImageDeletedResponse, AppError> {
        let property_id = valid_uuid(property_id)?;
        let image_id = valid_uuid(image_id)?;
        owned_property(&self.property_repo, actor, &property_id).await?;

        let (deleted, promoted_primary) = self.image_repo.delete_image(&property_id, &image_id).await?;
        self.pipeline.delete(&property_id, &deleted.stored_filename).await?;

        Ok(ImageDeletedResponse { id: deleted.id, promoted_primary })
    }

    /// Removes the files of images whose rows are already gone. Failures are
    /// logged and the remaining images are still processed.
    pub async fn purge_files(&self, property_id: &Uuid, images: &[PropertyImage]) -> usize {
        let mut removed = 0;
        for image in images {
            match self.pipeline.delete(property_id, &image.stored_filename).await {
                Ok(count) => removed += count,
                Err(e) => tracing::error!(
                    %property_id,
                    stored_filename = %image.stored_filename,
                    error = %e,
                    "image files not purged"
                ),
            }
        }
        removed
    }
}
