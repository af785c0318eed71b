use actix_web::web;

use crate::handlers::{bookings, images, properties};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/favorites")
            .route(web::get().to(properties::list_favorites))
    );

    cfg.service(
        web::scope("/properties")
            .service(
                web::resource("")
                    .route(web::get().to(properties::search_properties))
                    .route(web::post().to(properties::create_property))
            )
            .service(
                web::resource("/{property_id}")
                    .route(web::get().to(properties::get_property))
                    .route(web::patch().to(properties::update_property))
                    .route(web::delete().to(properties::delete_property))
            )
            .service(
                web::resource("/{property_id}/availability")
                    .route(web::get().to(bookings::check_availability))
                    .route(web::patch().to(properties::toggle_availability))
            )
            .service(
                web::resource("/{property_id}/favorite")
                    .route(web::post().to(properties::toggle_favorite))
            )
            .service(
                web::resource("/{property_id}/bookings")
                    .route(web::post().to(bookings::request_booking))
            )
            .service(
                web::resource("/{property_id}/images")
                    .route(web::get().to(images::list_property_images))
                    .route(web::post().to(images::upload_property_image))
            )
            .service(
                web::resource("/{property_id}/images/{image_id}")
                    .route(web::delete().to(images::delete_property_image))
            )
            .service(
                web::resource("/{property_id}/images/{image_id}/primary")
                    .route(web::post().to(images::set_primary_image))
            )
    );
}
