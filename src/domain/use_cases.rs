pub mod auth;
pub mod booking;
pub mod extractors;
pub mod image;
pub mod property;
