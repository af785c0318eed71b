use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, ResponseError,
};
use futures_util::future::{ok, Ready, LocalBoxFuture};
use std::{rc::Rc, task::{Context, Poll}};

use crate::{
    entities::token::Claims,
    errors::AuthError,
    repositories::token::TokenServiceRepository,
    AppState,
};

const API_PREFIX: &str = "/api/v1";

pub struct AuthMiddleware;

impl<S> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Rc::new(service),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            if is_public_route(req.path(), req.method().as_str()) {
                return service.call(req).await;
            }

            let claims = match get_valid_claims(&req) {
                Ok(claims) => claims,
                Err(e) => {
                    tracing::warn!(path = %req.path(), error = %e, "request rejected by auth middleware");
                    let response = e.error_response();
                    return Ok(req.into_response(response));
                }
            };

            if is_admin_route(req.path()) && !claims.admin {
                tracing::warn!(path = %req.path(), user = %claims.sub, "admin access required");
                let response = AuthError::Forbidden("Admin access required".into()).error_response();
                return Ok(req.into_response(response));
            }

            req.extensions_mut().insert(claims);
            service.call(req).await
        })
    }
}

/// Routes reachable without a token: the banner, the auth endpoints and
/// every read of the listing catalogue.
fn is_public_route(path: &str, method: &str) -> bool {
    if method == "OPTIONS" {
        return true;
    }

    let Some(api_path) = path.strip_prefix(API_PREFIX) else {
        return path == "/" && method == "GET";
    };

    match method {
        "POST" => matches!(api_path, "/auth/login" | "/auth/register" | "/auth/refresh"),
        "GET" => api_path == "/properties" || api_path.starts_with("/properties/"),
        _ => false,
    }
}

fn is_admin_route(path: &str) -> bool {
    path.strip_prefix(API_PREFIX)
        .is_some_and(|p| p == "/admin" || p.starts_with("/admin/"))
}

fn extract_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| {
            let parts: Vec<&str> = header.split_whitespace().collect();
            if parts.len() == 2 && parts[0].eq_ignore_ascii_case("bearer") {
                Some(parts[1].to_string())
            } else {
                None
            }
        })
}

fn get_valid_claims(req: &ServiceRequest) -> Result<Claims, AuthError> {
    let state = req.app_data::<web::Data<AppState>>()
        .ok_or_else(|| {
            tracing::error!("AppState missing in middleware");
            AuthError::MissingJwtService
        })?;

    let token = extract_token(req).ok_or(AuthError::MissingCredentials)?;
    let decoded = state.auth_handler.token_service.decode_jwt(&token)?;
    Ok(decoded.claims)
}
