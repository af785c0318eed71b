use actix_multipart::form::MultipartForm;
use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::image::PropertyImageUpload,
    errors::AppError,
    use_cases::extractors::AuthClaims,
    AppState,
};

#[instrument(skip(state))]
pub async fn list_property_images(
    property_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let images = state.image_handler.list_images(&property_id).await?;
    Ok(HttpResponse::Ok().json(images))
}

/// Multipart upload with a single `image` part.
#[instrument(skip(claims, state, form))]
pub async fn upload_property_image(
    claims: AuthClaims,
    property_id: web::Path<String>,
    state: web::Data<AppState>,
    MultipartForm(form): MultipartForm<PropertyImageUpload>,
) -> Result<impl Responder, AppError> {
    let actor = claims.actor()?;

    let original_filename = form.image.file_name.clone().unwrap_or_default();
    let bytes = tokio::fs::read(form.image.file.path())
        .await
        .map_err(|e| AppError::InternalError(format!("Could not read uploaded file: {}", e)))?;

    let image = state
        .image_handler
        .upload_image(&actor, &property_id, &original_filename, bytes)
        .await?;

    Ok(HttpResponse::Created().json(image))
}

#[instrument(skip(claims, state))]
pub async fn set_primary_image(
    claims: AuthClaims,
    path: web::Path<(String, String)>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let actor = claims.actor()?;
    let (property_id, image_id) = path.into_inner();
    let image = state
        .image_handler
        .set_primary(&actor, &property_id, &image_id)
        .await?;
    Ok(HttpResponse::Ok().json(image))
}

#[instrument(skip(claims, state))]
pub async fn delete_property_image(
    claims: AuthClaims,
    path: web::Path<(String, String)>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let actor = claims.actor()?;
    let (property_id, image_id) = path.into_inner();
    let response = state
        .image_handler
        .delete_image(&actor, &property_id, &image_id)
        .await?;
    Ok(HttpResponse::Ok().json(response))
}
