use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use tracing::instrument;

use crate::{
    entities::property::{NewPropertyRequest, PropertySearchQuery, UpdatePropertyRequest},
    errors::AppError,
    use_cases::extractors::AuthClaims,
    AppState,
};

#[instrument(skip(state, query))]
pub async fn search_properties(
    state: web::Data<AppState>,
    query: web::Query<PropertySearchQuery>,
) -> Result<impl Responder, AppError> {
    let today = Utc::now().date_naive();
    let listing = state.property_handler.search(query.into_inner(), today).await?;
    Ok(HttpResponse::Ok().json(listing))
}

#[instrument(skip(claims, state, data))]
pub async fn create_property(
    claims: AuthClaims,
    state: web::Data<AppState>,
    data: web::Json<NewPropertyRequest>,
) -> Result<impl Responder, AppError> {
    let actor = claims.actor()?;
    let response = state
        .property_handler
        .create_property(&actor, data.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(response))
}

#[instrument(skip(state))]
pub async fn get_property(
    property_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let detail = state.property_handler.get_property_detail(&property_id).await?;
    Ok(HttpResponse::Ok().json(detail))
}

#[instrument(skip(claims, state, data))]
pub async fn update_property(
    claims: AuthClaims,
    property_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<UpdatePropertyRequest>,
) -> Result<impl Responder, AppError> {
    let actor = claims.actor()?;
    let property = state
        .property_handler
        .update_property(&actor, &property_id, data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(property))
}

#[instrument(skip(claims, state))]
pub async fn toggle_availability(
    claims: AuthClaims,
    property_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let actor = claims.actor()?;
    let property = state
        .property_handler
        .toggle_availability(&actor, &property_id)
        .await?;
    Ok(HttpResponse::Ok().json(property))
}

/// Deletes the listing, then the files of every image it had.
#[instrument(skip(claims, state))]
pub async fn delete_property(
    claims: AuthClaims,
    property_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let actor = claims.actor()?;
    let (id, images) = state.property_handler.delete_property(&actor, &property_id).await?;
    state.image_handler.purge_files(&id, &images).await;
    Ok(HttpResponse::NoContent().finish())
}

#[instrument(skip(claims, state))]
pub async fn toggle_favorite(
    claims: AuthClaims,
    property_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let actor = claims.actor()?;
    let response = state.property_handler.toggle_favorite(&actor, &property_id).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[instrument(skip(claims, state))]
pub async fn list_favorites(
    claims: AuthClaims,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let actor = claims.actor()?;
    let favorites = state.property_handler.list_favorites(&actor).await?;
    Ok(HttpResponse::Ok().json(favorites))
}
