pub mod auth;
pub mod bookings;
pub mod home;
pub mod images;
pub mod properties;
pub mod system;
pub mod users;
