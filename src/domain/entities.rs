pub mod booking;
pub mod image;
pub mod property;
pub mod token;
pub mod user;
