use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use tracing::instrument;

use crate::{
    entities::booking::{AvailabilityQuery, BookingCreatedResponse, NewBookingRequest, UpdateBookingStatusRequest},
    errors::AppError,
    use_cases::extractors::AuthClaims,
    AppState,
};

#[instrument(skip(state))]
pub async fn check_availability(
    property_id: web::Path<String>,
    query: web::Query<AvailabilityQuery>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let response = state
        .booking_handler
        .check_availability(&property_id, query.start_date, query.end_date)
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[instrument(skip(claims, state, data))]
pub async fn request_booking(
    claims: AuthClaims,
    property_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<NewBookingRequest>,
) -> Result<impl Responder, AppError> {
    let actor = claims.actor()?;
    let today = Utc::now().date_naive();

    let booking = state
        .booking_handler
        .request_booking(&actor, &property_id, data.into_inner(), today)
        .await?;

    Ok(HttpResponse::Created().json(BookingCreatedResponse {
        message: "Booking requested, awaiting confirmation".to_string(),
        booking,
    }))
}

#[instrument(skip(claims, state))]
pub async fn my_bookings(
    claims: AuthClaims,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let actor = claims.actor()?;
    let bookings = state.booking_handler.list_my_bookings(&actor).await?;
    Ok(HttpResponse::Ok().json(bookings))
}

#[instrument(skip(claims, state))]
pub async fn hosted_bookings(
    claims: AuthClaims,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let actor = claims.actor()?;
    let bookings = state.booking_handler.list_hosted_bookings(&actor).await?;
    Ok(HttpResponse::Ok().json(bookings))
}

#[instrument(skip(claims, state))]
pub async fn get_booking(
    claims: AuthClaims,
    booking_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let actor = claims.actor()?;
    let booking = state.booking_handler.get_booking(&actor, &booking_id).await?;
    Ok(HttpResponse::Ok().json(booking))
}

#[instrument(skip(claims, state, data))]
pub async fn update_booking_status(
    claims: AuthClaims,
    booking_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<UpdateBookingStatusRequest>,
) -> Result<impl Responder, AppError> {
    let actor = claims.actor()?;
    let booking = state
        .booking_handler
        .update_status(&actor, &booking_id, data.status)
        .await?;
    Ok(HttpResponse::Ok().json(booking))
}
