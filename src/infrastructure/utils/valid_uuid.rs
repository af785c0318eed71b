use uuid::Uuid;

use crate::errors::AppError;

/// Parses a path or body identifier, rejecting it before any query runs.
pub fn valid_uuid(id: &str) -> Result<Uuid, AppError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(AppError::InvalidInput("Missing identifier".to_string()));
    }
    Uuid::parse_str(id).map_err(|_| AppError::InvalidInput("Invalid UUID format".to_string()))
}
