use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    entities::image::{PropertyImage, PropertyImageInsert},
    errors::AppError,
    repositories::sqlx_repo::SqlxPropertyImageRepo,
};

const IMAGE_COLUMNS: &str = "id, property_id, stored_filename, original_filename, file_size, \
    content_type, width, height, is_primary, position, created_at";

#[async_trait]
pub trait PropertyImageRepository: Send + Sync {
    /// Records an upload. The first image of a property becomes its primary.
    async fn insert_image(&self, image: &PropertyImageInsert) -> Result<PropertyImage, AppError>;
    async fn list_images(&self, property_id: &Uuid) -> Result<Vec<PropertyImage>, AppError>;
    /// Makes `image_id` the only primary image of the property.
    async fn set_primary(&self, property_id: &Uuid, image_id: &Uuid) -> Result<PropertyImage, AppError>;
    /// Deletes the row; if it was primary, the oldest remaining image is
    /// promoted and its id returned.
    async fn delete_image(
        &self,
        property_id: &Uuid,
        image_id: &Uuid,
    ) -> Result<(PropertyImage, Option<Uuid>), AppError>;
}

impl SqlxPropertyImageRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxPropertyImageRepo { pool }
    }
}

#[async_trait]
impl PropertyImageRepository for SqlxPropertyImageRepo {
    async fn insert_image(&self, image: &PropertyImageInsert) -> Result<PropertyImage, AppError> {
        let mut tx = self.pool.begin().await?;

        // serializes concurrent uploads to the same property
        sqlx::query("SELECT id FROM properties WHERE id = $1 FOR UPDATE")
            .bind(image.property_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Property not found".to_string()))?;

        let (has_primary, next_position): (bool, i32) = sqlx::query_as(
            r#"SELECT
                COALESCE(BOOL_OR(is_primary), FALSE),
                COALESCE(MAX(position) + 1, 0)
            FROM property_images
            WHERE property_id = $1"#,
        )
        .bind(image.property_id)
        .fetch_one(&mut *tx)
        .await?;

        let inserted = sqlx::query_as::<_, PropertyImage>(&format!(
            r#"INSERT INTO property_images (
                property_id, stored_filename, original_filename, file_size,
                content_type, width, height, is_primary, position
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {IMAGE_COLUMNS}"#
        ))
        .bind(image.property_id)
        .bind(&image.stored_filename)
        .bind(&image.original_filename)
        .bind(image.file_size)
        .bind(&image.content_type)
        .bind(image.width)
        .bind(image.height)
        .bind(!has_primary)
        .bind(next_position)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(inserted)
    }

    async fn list_images(&self, property_id: &Uuid) -> Result<Vec<PropertyImage>, AppError> {
        sqlx::query_as::<_, PropertyImage>(&format!(
            "SELECT {IMAGE_COLUMNS} FROM property_images WHERE property_id = $1 \
             ORDER BY is_primary DESC, position ASC, created_at ASC"
        ))
        .bind(property_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn set_primary(&self, property_id: &Uuid, image_id: &Uuid) -> Result<PropertyImage, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE property_images SET is_primary = FALSE WHERE property_id = $1 AND is_primary")
            .bind(property_id)
            .execute(&mut *tx)
            .await?;

        let image = sqlx::query_as::<_, PropertyImage>(&format!(
            "UPDATE property_images SET is_primary = TRUE \
             WHERE id = $1 AND property_id = $2 RETURNING {IMAGE_COLUMNS}"
        ))
        .bind(image_id)
        .bind(property_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

        tx.commit().await?;
        Ok(image)
    }

    async fn delete_image(
        &self,
        property_id: &Uuid,
        image_id: &Uuid,
    ) -> Result<(PropertyImage, Option<Uuid>), AppError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query_as::<_, PropertyImage>(&format!(
            "DELETE FROM property_images WHERE id = $1 AND property_id = $2 RETURNING {IMAGE_COLUMNS}"
        ))
        .bind(image_id)
        .bind(property_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

        let promoted = if deleted.is_primary {
            sqlx::query_scalar::<_, Uuid>(
                r#"UPDATE property_images SET is_primary = TRUE
                WHERE id = (
                    SELECT id FROM property_images
                    WHERE property_id = $1
                    ORDER BY created_at ASC, position ASC
                    LIMIT 1
                )
                RETURNING id"#,
            )
            .bind(property_id)
            .fetch_optional(&mut *tx)
            .await?
        } else {
            None
        };

        tx.commit().await?;
        Ok((deleted, promoted))
    }
}
