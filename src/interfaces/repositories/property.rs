use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    entities::property::{Property, PropertyInsert, PropertySearchQuery, UpdatePropertyRequest},
    errors::AppError,
    repositories::sqlx_repo::SqlxPropertyRepo,
};

const PROPERTY_COLUMNS: &str = "id, owner_id, title, description, property_type, price, rooms, \
    bedrooms, bathrooms, area, has_kitchen, has_parking, has_garden, has_balcony, has_pool, \
    is_furnished, address, city, state, country, latitude, longitude, is_available, is_featured, \
    available_from, min_stay_months, view_count, created_at, updated_at";

#[async_trait]
pub trait PropertyRepository: Send + Sync {
    async fn create_property(&self, property: &PropertyInsert) -> Result<Uuid, AppError>;
    async fn get_property(&self, id: &Uuid) -> Result<Option<Property>, AppError>;
    /// One page of available listings matching `query`, plus the total match count.
    async fn search_properties(
        &self,
        query: &PropertySearchQuery,
        today: NaiveDate,
    ) -> Result<(Vec<Property>, i64), AppError>;
    async fn increment_view_count(&self, id: &Uuid) -> Result<(), AppError>;
    /// Writes only the fields present in `changes`.
    async fn update_property(&self, id: &Uuid, changes: &UpdatePropertyRequest) -> Result<Property, AppError>;
    async fn set_availability(&self, id: &Uuid, is_available: bool) -> Result<Property, AppError>;
    async fn delete_property(&self, id: &Uuid) -> Result<(), AppError>;
    async fn count_properties(&self) -> Result<u64, AppError>;
    /// Adds or removes the favorite; returns whether it is now set.
    async fn toggle_favorite(&self, user_id: &Uuid, property_id: &Uuid) -> Result<bool, AppError>;
    async fn list_favorites(&self, user_id: &Uuid) -> Result<Vec<Property>, AppError>;
}

impl SqlxPropertyRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxPropertyRepo { pool }
    }
}

/// Appends the WHERE clause shared by the page query and the count query.
fn push_search_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    query: &PropertySearchQuery,
    today: NaiveDate,
) {
    builder.push(" WHERE is_available = TRUE");

    if let Some(kind) = query.property_type {
        builder.push(" AND property_type = ").push_bind(kind);
    }
    if let Some(city) = query.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        builder
            .push(" AND LOWER(city) LIKE ")
            .push_bind(format!("%{}%", city.to_lowercase()));
    }
    if let Some(min) = query.min_price {
        builder.push(" AND price >= ").push_bind(min);
    }
    if let Some(max) = query.max_price {
        builder.push(" AND price <= ").push_bind(max);
    }
    if let Some(rooms) = query.min_rooms {
        builder.push(" AND rooms >= ").push_bind(rooms);
    }
    // column names come from a fixed list, never from the request
    for column in query.required_amenities() {
        builder.push(" AND ").push(column).push(" = TRUE");
    }
    if query.available_now == Some(true) {
        builder
            .push(" AND (available_from IS NULL OR available_from <= ")
            .push_bind(today)
            .push(")");
    }
}

/// `UPDATE ... SET` with one bound assignment per present field.
fn build_update_query<'a>(id: &Uuid, changes: &'a UpdatePropertyRequest) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new("UPDATE properties SET ");
    let mut set = builder.separated(", ");
    set.push("updated_at = NOW()");

    if let Some(title) = &changes.title {
        set.push("title = ").push_bind_unseparated(title);
    }
    if let Some(description) = &changes.description {
        set.push("description = ").push_bind_unseparated(description);
    }
    if let Some(kind) = changes.property_type {
        set.push("property_type = ").push_bind_unseparated(kind);
    }
    if let Some(price) = changes.price {
        set.push("price = ").push_bind_unseparated(price);
    }
    if let Some(rooms) = changes.rooms {
        set.push("rooms = ").push_bind_unseparated(rooms);
    }
    if let Some(bedrooms) = changes.bedrooms {
        set.push("bedrooms = ").push_bind_unseparated(bedrooms);
    }
    if let Some(bathrooms) = changes.bathrooms {
        set.push("bathrooms = ").push_bind_unseparated(bathrooms);
    }
    if let Some(area) = changes.area {
        set.push("area = ").push_bind_unseparated(area);
    }
    // column names come from a fixed list, never from the request
    for (column, flag) in [
        ("has_kitchen", changes.has_kitchen),
        ("has_parking", changes.has_parking),
        ("has_garden", changes.has_garden),
        ("has_balcony", changes.has_balcony),
        ("has_pool", changes.has_pool),
        ("is_furnished", changes.is_furnished),
    ] {
        if let Some(flag) = flag {
            set.push(column).push_unseparated(" = ").push_bind_unseparated(flag);
        }
    }
    if let Some(address) = &changes.address {
        set.push("address = ").push_bind_unseparated(address);
    }
    if let Some(city) = &changes.city {
        set.push("city = ").push_bind_unseparated(city);
    }
    if let Some(state) = &changes.state {
        set.push("state = ").push_bind_unseparated(state);
    }
    if let Some(country) = &changes.country {
        set.push("country = ").push_bind_unseparated(country);
    }
    if let Some(latitude) = changes.latitude {
        set.push("latitude = ").push_bind_unseparated(latitude);
    }
    if let Some(longitude) = changes.longitude {
        set.push("longitude = ").push_bind_unseparated(longitude);
    }
    if let Some(available_from) = changes.available_from {
        set.push("available_from = ").push_bind_unseparated(available_from);
    }
    if let Some(months) = changes.min_stay_months {
        set.push("min_stay_months = ").push_bind_unseparated(months);
    }

    builder
        .push(" WHERE id = ")
        .push_bind(*id)
        .push(format!(" RETURNING {PROPERTY_COLUMNS}"));
    builder
}

#[async_trait]
impl PropertyRepository for SqlxPropertyRepo {
    async fn create_property(&self, property: &PropertyInsert) -> Result<Uuid, AppError> {
        let id: Uuid = sqlx::query_scalar(
            r#"INSERT INTO properties (
                owner_id, title, description, property_type, price, rooms,
                bedrooms, bathrooms, area,
                has_kitchen, has_parking, has_garden, has_balcony, has_pool, is_furnished,
                address, city, state, country, latitude, longitude,
                available_from, min_stay_months
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    $16, $17, $18, $19, $20, $21, $22, $23)
            RETURNING id
            "#,
        )
        .bind(property.owner_id)
        .bind(&property.title)
        .bind(&property.description)
        .bind(property.property_type)
        .bind(property.price)
        .bind(property.rooms)
        .bind(property.bedrooms)
        .bind(property.bathrooms)
        .bind(property.area)
        .bind(property.amenities.has_kitchen)
        .bind(property.amenities.has_parking)
        .bind(property.amenities.has_garden)
        .bind(property.amenities.has_balcony)
        .bind(property.amenities.has_pool)
        .bind(property.amenities.is_furnished)
        .bind(&property.address)
        .bind(&property.city)
        .bind(&property.state)
        .bind(&property.country)
        .bind(property.latitude)
        .bind(property.longitude)
        .bind(property.available_from)
        .bind(property.min_stay_months)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn get_property(&self, id: &Uuid) -> Result<Option<Property>, AppError> {
        sqlx::query_as::<_, Property>(&format!("SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn search_properties(
        &self,
        query: &PropertySearchQuery,
        today: NaiveDate,
    ) -> Result<(Vec<Property>, i64), AppError> {
        let mut count_builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM properties");
        push_search_filters(&mut count_builder, query, today);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {PROPERTY_COLUMNS} FROM properties"));
        push_search_filters(&mut builder, query, today);
        builder
            .push(query.sort_by.as_sql())
            .push(" LIMIT ")
            .push_bind(query.per_page() as i64)
            .push(" OFFSET ")
            .push_bind(query.offset());

        let items = builder
            .build_query_as::<Property>()
            .fetch_all(&self.pool)
            .await?;

        Ok((items, total))
    }

    async fn increment_view_count(&self, id: &Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE properties SET view_count = view_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_property(&self, id: &Uuid, changes: &UpdatePropertyRequest) -> Result<Property, AppError> {
        build_update_query(id, changes)
            .build_query_as::<Property>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Property not found".to_string()))
    }

    async fn set_availability(&self, id: &Uuid, is_available: bool) -> Result<Property, AppError> {
        sqlx::query_as::<_, Property>(&format!(
            "UPDATE properties SET is_available = $2, updated_at = NOW() WHERE id = $1 RETURNING {PROPERTY_COLUMNS}"
        ))
        .bind(id)
        .bind(is_available)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Property not found".to_string()))
    }

    async fn delete_property(&self, id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Property not found".to_string()));
        }
        Ok(())
    }

    async fn count_properties(&self) -> Result<u64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM properties")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn toggle_favorite(&self, user_id: &Uuid, property_id: &Uuid) -> Result<bool, AppError> {
        let removed = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND property_id = $2")
            .bind(user_id)
            .bind(property_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if removed > 0 {
            return Ok(false);
        }

        sqlx::query(
            "INSERT INTO favorites (user_id, property_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(property_id)
        .execute(&self.pool)
        .await?;

        Ok(true)
    }

    async fn list_favorites(&self, user_id: &Uuid) -> Result<Vec<Property>, AppError> {
        let columns = PROPERTY_COLUMNS
            .split(", ")
            .map(|c| format!("p.{}", c.trim()))
            .collect::<Vec<_>>()
            .join(", ");

        sqlx::query_as::<_, Property>(&format!(
            "SELECT {columns} FROM properties p \
             JOIN favorites f ON f.property_id = p.id \
             WHERE f.user_id = $1 \
             ORDER BY f.created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)
    }
}
