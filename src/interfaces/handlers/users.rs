use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{errors::AppError, use_cases::extractors::AuthClaims, AppState};

#[instrument(skip(claims, state))]
pub async fn me(
    claims: AuthClaims,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let actor = claims.actor()?;
    let user = state.auth_handler.me(&actor.user_id).await?;
    Ok(HttpResponse::Ok().json(user))
}
