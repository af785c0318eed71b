use actix_web::web;

use crate::handlers::home::home;

mod admin;
mod auth;
mod bookings;
mod json_error;
mod properties;
mod users;

pub use json_error::upload_form_config;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home);

    cfg.service(
        web::scope("/api/v1")
            .configure(auth::config_routes)
            .configure(admin::config_routes)
            .configure(users::config_routes)
            .configure(properties::config_routes)
            .configure(bookings::config_routes)
    );

    cfg.configure(json_error::config_routes);
}
