use chrono::NaiveDate;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        image::PropertyImage,
        property::{
            FavoriteToggleResponse, NewPropertyRequest, Property, PropertyCreatedResponse,
            PropertyDetailResponse, PropertyListResponse, PropertySearchQuery, UpdatePropertyRequest,
        },
        token::Actor,
    },
    errors::AppError,
    repositories::{image::PropertyImageRepository, property::PropertyRepository},
    utils::valid_uuid::valid_uuid,
};

/// Loads a property the actor is allowed to manage.
pub(crate) async fn owned_property<P>(repo: &P, actor: &Actor, property_id: &Uuid) -> Result<Property, AppError>
where
    P: PropertyRepository + ?Sized,
{
    let property = repo
        .get_property(property_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Property not found".to_string()))?;

    if !actor.can_manage(&property.owner_id) {
        tracing::warn!(user_id = %actor.user_id, %property_id, "property access denied");
        return Err(AppError::ForbiddenAccess);
    }
    Ok(property)
}

pub struct PropertyHandler<P, I>
where
    P: PropertyRepository,
    I: PropertyImageRepository,
{
    pub property_repo: P,
    pub image_repo: I,
}

impl<P, I> PropertyHandler<P, I>
where
    P: PropertyRepository,
    I: PropertyImageRepository,
{
    pub fn new(property_repo: P, image_repo: I) -> Self {
        PropertyHandler { property_repo, image_repo }
    }

    pub async fn create_property(
        &self,
        actor: &Actor,
        request: NewPropertyRequest,
    ) -> Result<PropertyCreatedResponse, AppError> {
        request.validate()?;

        let insert = request.prepare_for_insert(actor.user_id);
        let id = self.property_repo.create_property(&insert).await?;
        tracing::info!(property_id = %id, owner_id = %actor.user_id, "property listed");

        Ok(PropertyCreatedResponse {
            id,
            message: "Property created successfully".to_string(),
        })
    }

    pub async fn search(
        &self,
        query: PropertySearchQuery,
        today: NaiveDate,
    ) -> Result<PropertyListResponse, AppError> {
        query.validate()?;

        let (items, total) = self.property_repo.search_properties(&query, today).await?;

        Ok(PropertyListResponse {
            items,
            page: query.page(),
            per_page: query.per_page(),
            total,
        })
    }

    /// Listing with its images. Counts as a view.
    pub async fn get_property_detail(&self, property_id: &str) -> Result<PropertyDetailResponse, AppError> {
        let id = valid_uuid(property_id)?;

        let mut property = self
            .property_repo
            .get_property(&id)
            .await?
            .ok_or_else(|| AppError::NotFound("Property not found".to_string()))?;

        match self.property_repo.increment_view_count(&id).await {
            Ok(()) => property.view_count += 1,
            Err(e) => tracing::warn!(property_id = %id, error = %e, "view count not updated"),
        }

        let images = self.image_repo.list_images(&id).await?;
        Ok(PropertyDetailResponse { property, images })
    }

    /// Owner or admin edits a listing. Only the fields sent are changed.
    pub async fn update_property(
        &self,
        actor: &Actor,
        property_id: &str,
        request: UpdatePropertyRequest,
    ) -> Result<Property, AppError> {
        let id = valid_uuid(property_id)?;
        request.validate()?;
        if request.is_empty() {
            return Err(AppError::validation("body", "No fields to update"));
        }

        owned_property(&self.property_repo, actor, &id).await?;

        let changes = request.prepare_for_update();
        let updated = self.property_repo.update_property(&id, &changes).await?;
        tracing::info!(property_id = %id, user_id = %actor.user_id, "property updated");
        Ok(updated)
    }

    pub async fn toggle_availability(&self, actor: &Actor, property_id: &str) -> Result<Property, AppError> {
        let id = valid_uuid(property_id)?;
        let property = owned_property(&self.property_repo, actor, &id).await?;

        let updated = self
            .property_repo
            .set_availability(&id, !property.is_available)
            .await?;
        tracing::info!(property_id = %id, is_available = updated.is_available, "availability toggled");
        Ok(updated)
    }

    /// Deletes the listing and returns the images that were attached to it,
    /// so their files can be purged.
    pub async fn delete_property(&self, actor: &Actor, property_id: &str) -> Result<(Uuid, Vec<PropertyImage>), AppError> {
        let id = valid_uuid(property_id)?;
        owned_property(&self.property_repo, actor, &id).await?;

        let images = self.image_repo.list_images(&id).await?;
        self.property_repo.delete_property(&id).await?;
        tracing::info!(property_id = %id, images = images.len(), "property deleted");

        Ok((id, images))
    }

    pub async fn toggle_favorite(&self, actor: &Actor, property_id: &str) -> Result<FavoriteToggleResponse, AppError> {
        let id = valid_uuid(property_id)?;

        if self.property_repo.get_property(&id).await?.is_none() {
            return Err(AppError::NotFound("Property not found".to_string()));
        }

        let favorited = self.property_repo.toggle_favorite(&actor.user_id, &id).await?;
        Ok(FavoriteToggleResponse { property_id: id, favorited })
    }

    pub async fn list_favorites(&self, actor: &Actor) -> Result<Vec<Property>, AppError> {
        self.property_repo.list_favorites(&actor.user_id).await
    }
}
