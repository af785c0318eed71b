mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;

pub use domain::{availability, entities, use_cases};
pub use interfaces::{handlers, repositories, middlewares, routes};
pub use infrastructure::{auth, db, media, utils};

use auth::jwt::JwtService;
use media::{storage::LocalImageStorage, ImageVariantPipeline, PipelineConfig};
use repositories::sqlx_repo::{SqlxBookingRepo, SqlxPropertyImageRepo, SqlxPropertyRepo, SqlxUserRepo};
use use_cases::{auth::AuthHandler, booking::BookingHandler, image::ImageHandler, property::PropertyHandler};

pub type AppAuthHandler = AuthHandler<SqlxUserRepo, JwtService>;
pub type AppPropertyHandler = PropertyHandler<SqlxPropertyRepo, SqlxPropertyImageRepo>;
pub type AppImageHandler = ImageHandler<SqlxPropertyImageRepo, SqlxPropertyRepo, LocalImageStorage>;
pub type AppBookingHandler = BookingHandler<SqlxBookingRepo, SqlxPropertyRepo>;

pub struct AppState {
    pub auth_handler: AppAuthHandler,
    pub property_handler: AppPropertyHandler,
    pub image_handler: AppImageHandler,
    pub booking_handler: AppBookingHandler,
}

impl AppState {
    pub fn new(config: &settings::AppConfig, pool: sqlx::PgPool) -> Self {
        let property_repo = SqlxPropertyRepo::new(pool.clone());
        let image_repo = SqlxPropertyImageRepo::new(pool.clone());

        let pipeline = ImageVariantPipeline::new(
            LocalImageStorage::new(&config.upload_dir),
            PipelineConfig::new(config.allowed_image_extensions.clone()),
        );

        AppState {
            auth_handler: AuthHandler::new(SqlxUserRepo::new(pool.clone()), JwtService::new(config)),
            property_handler: PropertyHandler::new(property_repo.clone(), image_repo.clone()),
            image_handler: ImageHandler::new(image_repo, property_repo.clone(), pipeline),
            booking_handler: BookingHandler::new(SqlxBookingRepo::new(pool), property_repo),
        }
    }
}
