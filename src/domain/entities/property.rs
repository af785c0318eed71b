use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::entities::image::PropertyImage;

// ───── Constants ──────────────────────────────────────────────────────
const MIN_TITLE_LENGTH: u64 = 5;
const MAX_TITLE_LENGTH: u64 = 200;
const MAX_DESCRIPTION_LENGTH: u64 = 5000;
pub const DEFAULT_PER_PAGE: u32 = 12;
pub const MAX_PER_PAGE: u32 = 50;

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "property_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Apartment,
    House,
    Studio,
    Room,
    Commercial,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Property {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub property_type: PropertyType,
    pub price: f64,
    pub rooms: i32,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area: Option<f64>,
    pub has_kitchen: bool,
    pub has_parking: bool,
    pub has_garden: bool,
    pub has_balcony: bool,
    pub has_pool: bool,
    pub is_furnished: bool,
    pub address: String,
    pub city: String,
    pub state: Option<String>,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_available: bool,
    pub is_featured: bool,
    pub available_from: Option<NaiveDate>,
    pub min_stay_months: i32,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Amenity flags shared by listings and search filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Amenities {
    pub has_kitchen: bool,
    pub has_parking: bool,
    pub has_garden: bool,
    pub has_balcony: bool,
    pub has_pool: bool,
    pub is_furnished: bool,
}

#[derive(Debug, Clone)]
pub struct PropertyInsert {
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub property_type: PropertyType,
    pub price: f64,
    pub rooms: i32,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area: Option<f64>,
    pub amenities: Amenities,
    pub address: String,
    pub city: String,
    pub state: Option<String>,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub available_from: Option<NaiveDate>,
    pub min_stay_months: i32,
}

// ───── Input & Validation Requests ──────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct NewPropertyRequest {
    #[validate(length(min = MIN_TITLE_LENGTH, max = MAX_TITLE_LENGTH))]
    pub title: String,

    #[validate(length(max = MAX_DESCRIPTION_LENGTH))]
    pub description: Option<String>,

    pub property_type: PropertyType,

    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,

    #[validate(range(min = 1, max = 100))]
    pub rooms: i32,

    #[validate(range(min = 0, max = 100))]
    pub bedrooms: Option<i32>,

    #[validate(range(min = 0, max = 50))]
    pub bathrooms: Option<i32>,

    #[validate(range(min = 1.0, message = "Area must be positive"))]
    pub area: Option<f64>,

    #[serde(default)]
    pub amenities: Amenities,

    #[validate(length(min = 5, max = 300))]
    pub address: String,

    #[validate(length(min = 2, max = 100))]
    pub city: String,

    #[validate(length(max = 100))]
    pub state: Option<String>,

    #[validate(length(min = 2, max = 100))]
    pub country: Option<String>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,

    pub available_from: Option<NaiveDate>,

    #[validate(range(min = 1, max = 60))]
    pub min_stay_months: Option<i32>,
}

impl NewPropertyRequest {
    pub fn prepare_for_insert(self, owner_id: Uuid) -> PropertyInsert {
        PropertyInsert {
            owner_id,
            title: self.title.trim().to_string(),
            description: self.description,
            property_type: self.property_type,
            price: self.price,
            rooms: self.rooms,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            area: self.area,
            amenities: self.amenities,
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state,
            country: self.country.unwrap_or_else(|| "Haiti".to_string()),
            latitude: self.latitude,
            longitude: self.longitude,
            available_from: self.available_from,
            min_stay_months: self.min_stay_months.unwrap_or(12),
        }
    }
}

/// Partial edit of a listing. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdatePropertyRequest {
    #[validate(length(min = MIN_TITLE_LENGTH, max = MAX_TITLE_LENGTH))]
    pub title: Option<String>,

    #[validate(length(max = MAX_DESCRIPTION_LENGTH))]
    pub description: Option<String>,

    pub property_type: Option<PropertyType>,

    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,

    #[validate(range(min = 1, max = 100))]
    pub rooms: Option<i32>,

    #[validate(range(min = 0, max = 100))]
    pub bedrooms: Option<i32>,

    #[validate(range(min = 0, max = 50))]
    pub bathrooms: Option<i32>,

    #[validate(range(min = 1.0, message = "Area must be positive"))]
    pub area: Option<f64>,

    pub has_kitchen: Option<bool>,
    pub has_parking: Option<bool>,
    pub has_garden: Option<bool>,
    pub has_balcony: Option<bool>,
    pub has_pool: Option<bool>,
    pub is_furnished: Option<bool>,

    #[validate(length(min = 5, max = 300))]
    pub address: Option<String>,

    #[validate(length(min = 2, max = 100))]
    pub city: Option<String>,

    #[validate(length(max = 100))]
    pub state: Option<String>,

    #[validate(length(min = 2, max = 100))]
    pub country: Option<String>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,

    pub available_from: Option<NaiveDate>,

    #[validate(range(min = 1, max = 60))]
    pub min_stay_months: Option<i32>,
}

impl UpdatePropertyRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.property_type.is_none()
            && self.price.is_none()
            && self.rooms.is_none()
            && self.bedrooms.is_none()
            && self.bathrooms.is_none()
            && self.area.is_none()
            && self.has_kitchen.is_none()
            && self.has_parking.is_none()
            && self.has_garden.is_none()
            && self.has_balcony.is_none()
            && self.has_pool.is_none()
            && self.is_furnished.is_none()
            && self.address.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.country.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.available_from.is_none()
            && self.min_stay_months.is_none()
    }

    pub fn prepare_for_update(self) -> Self {
        let trim = |value: Option<String>| value.map(|v| v.trim().to_string());
        UpdatePropertyRequest {
            title: trim(self.title),
            address: trim(self.address),
            city: trim(self.city),
            state: trim(self.state),
            country: trim(self.country),
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    AreaDesc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Newest => " ORDER BY created_at DESC",
            SortOrder::PriceAsc => " ORDER BY price ASC, created_at DESC",
            SortOrder::PriceDesc => " ORDER BY price DESC, created_at DESC",
            SortOrder::AreaDesc => " ORDER BY area DESC NULLS LAST, created_at DESC",
        }
    }
}

/// Every filter the listing search understands.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[validate(schema(function = validate_price_bounds))]
#[serde(default)]
pub struct PropertySearchQuery {
    pub property_type: Option<PropertyType>,

    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,

    #[validate(range(min = 0.0))]
    pub min_price: Option<f64>,

    #[validate(range(min = 0.0))]
    pub max_price: Option<f64>,

    #[validate(range(min = 1, max = 100))]
    pub min_rooms: Option<i32>,

    pub has_kitchen: Option<bool>,
    pub has_parking: Option<bool>,
    pub has_garden: Option<bool>,
    pub has_balcony: Option<bool>,
    pub has_pool: Option<bool>,
    pub is_furnished: Option<bool>,

    /// Only listings whose `available_from` is today or earlier.
    pub available_now: Option<bool>,

    pub sort_by: SortOrder,

    #[validate(range(min = 1))]
    pub page: Option<u32>,

    #[validate(range(min = 1, max = MAX_PER_PAGE))]
    pub per_page: Option<u32>,
}

fn validate_price_bounds(query: &PropertySearchQuery) -> Result<(), ValidationError> {
    match (query.min_price, query.max_price) {
        (Some(min), Some(max)) if min > max => {
            let mut err = ValidationError::new("price_bounds");
            err.message = Some("min_price cannot exceed max_price".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

impl PropertySearchQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> u32 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE)
    }

    pub fn offset(&self) -> i64 {
        (self.page().saturating_sub(1) as i64) * (self.per_page() as i64)
    }

    /// Columns of the amenity filters that were switched on.
    pub fn required_amenities(&self) -> Vec<&'static str> {
        [
            ("has_kitchen", self.has_kitchen),
            ("has_parking", self.has_parking),
            ("has_garden", self.has_garden),
            ("has_balcony", self.has_balcony),
            ("has_pool", self.has_pool),
            ("is_furnished", self.is_furnished),
        ]
        .into_iter()
        .filter_map(|(column, flag)| (flag == Some(true)).then_some(column))
        .collect()
    }
}

// ───── API Response Models ──────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct PropertyCreatedResponse {
    pub id: Uuid,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct PropertyListResponse {
    pub items: Vec<Property>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct PropertyDetailResponse {
    #[serde(flatten)]
    pub property: Property,
    pub images: Vec<PropertyImage>,
}

#[derive(Debug, Serialize)]
pub struct FavoriteToggleResponse {
    pub property_id: Uuid,
    pub favorited: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_is_clamped() {
        let query = PropertySearchQuery {
            page: Some(0),
            per_page: Some(500),
            ..Default::default()
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.per_page(), MAX_PER_PAGE);
        assert_eq!(query.offset(), 0);

        let query = PropertySearchQuery { page: Some(3), ..Default::default() };
        assert_eq!(query.offset(), 2 * DEFAULT_PER_PAGE as i64);
    }

    #[test]
    fn inverted_price_bounds_fail_validation() {
        let query = PropertySearchQuery {
            min_price: Some(500.0),
            max_price: Some(100.0),
            ..Default::default()
        };
        assert!(query.validate().is_err());
    }

    #[test]
    fn only_enabled_amenities_are_required() {
        let query = PropertySearchQuery {
            has_pool: Some(true),
            has_garden: Some(false),
            is_furnished: Some(true),
            ..Default::default()
        };
        assert_eq!(query.required_amenities(), vec!["has_pool", "is_furnished"]);
    }

    #[test]
    fn partial_update_validates_only_present_fields() {
        assert!(UpdatePropertyRequest::default().is_empty());
        assert!(UpdatePropertyRequest::default().validate().is_ok());

        let update = UpdatePropertyRequest { price: Some(-1.0), ..Default::default() };
        assert!(!update.is_empty());
        assert!(update.validate().is_err());

        let update = UpdatePropertyRequest { title: Some("  Villa with a view  ".into()), ..Default::default() }
            .prepare_for_update();
        assert_eq!(update.title.as_deref(), Some("Villa with a view"));
    }
}
