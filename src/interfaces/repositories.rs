pub mod booking;
pub mod image;
pub mod property;
pub mod sqlx_repo;
pub mod token;
pub mod user;
