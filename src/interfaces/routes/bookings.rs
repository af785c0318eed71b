use actix_web::web;

use crate::handlers::bookings;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookings")
            .service(
                web::resource("/mine")
                    .route(web::get().to(bookings::my_bookings))
            )
            .service(
                web::resource("/hosted")
                    .route(web::get().to(bookings::hosted_bookings))
            )
            .service(
                web::resource("/{booking_id}")
                    .route(web::get().to(bookings::get_booking))
            )
            .service(
                web::resource("/{booking_id}/status")
                    .route(web::patch().to(bookings::update_booking_status))
            )
    );
}
