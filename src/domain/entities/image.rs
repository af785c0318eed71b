use actix_multipart::form::{tempfile::TempFile, MultipartForm};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PropertyImage {
    pub id: Uuid,
    pub property_id: Uuid,
    pub stored_filename: String, // large/main variant, `<stem>.jpg`
    pub original_filename: String,
    pub file_size: i64, // bytes
    pub content_type: String,
    pub width: i32,
    pub height: i32,
    pub is_primary: bool,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct PropertyImageInsert {
    pub property_id: Uuid,
    pub stored_filename: String,
    pub original_filename: String,
    pub file_size: i64,
    pub content_type: String,
    pub width: i32,
    pub height: i32,
}

/// Metadata of the representative variant produced by one upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredImage {
    pub stored_filename: String,
    pub original_filename: String,
    pub file_size: u64,
    pub content_type: String,
    pub width: u32,
    pub height: u32,
}

impl StoredImage {
    pub fn into_insert(self, property_id: Uuid) -> PropertyImageInsert {
        PropertyImageInsert {
            property_id,
            stored_filename: self.stored_filename,
            original_filename: self.original_filename,
            file_size: self.file_size as i64,
            content_type: self.content_type,
            width: self.width as i32,
            height: self.height as i32,
        }
    }
}

#[derive(Debug, MultipartForm)]
pub struct PropertyImageUpload {
    #[multipart(rename = "image")]
    pub image: TempFile,
}

#[derive(Debug, Serialize)]
pub struct ImageDeletedResponse {
    pub id: Uuid,
    pub promoted_primary: Option<Uuid>,
}
