pub mod filename;
pub mod valid_uuid;
