#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use mockall::mock;
use rental_backend::{
    availability::{first_conflict, DateRange},
    entities::{
        booking::{Booking, BookingInsert, BookingStatus},
        image::{PropertyImage, PropertyImageInsert},
        property::{Property, PropertyInsert, PropertySearchQuery, PropertyType, UpdatePropertyRequest},
        token::Actor,
        user::{User, UserInsert},
    },
    errors::AppError,
    media::processing::encode_jpeg,
    repositories::{
        booking::BookingRepository,
        image::PropertyImageRepository,
        property::PropertyRepository,
        user::UserRepository,
    },
};
use image::{Rgb, RgbImage};
use uuid::Uuid;

// ───── Mocks ─────────────────────────────────────────────────────────

mock! {
    pub PropertyRepo {}

    #[async_trait]
    impl PropertyRepository for PropertyRepo {
        async fn create_property(&self, property: &PropertyInsert) -> Result<Uuid, AppError>;
        async fn get_property(&self, id: &Uuid) -> Result<Option<Property>, AppError>;
        async fn search_properties(
            &self,
            query: &PropertySearchQuery,
            today: NaiveDate,
        ) -> Result<(Vec<Property>, i64), AppError>;
        async fn increment_view_count(&self, id: &Uuid) -> Result<(), AppError>;
        async fn update_property(&self, id: &Uuid, changes: &UpdatePropertyRequest) -> Result<Property, AppError>;
        async fn set_availability(&self, id: &Uuid, is_available: bool) -> Result<Property, AppError>;
        async fn delete_property(&self, id: &Uuid) -> Result<(), AppError>;
        async fn count_properties(&self) -> Result<u64, AppError>;
        async fn toggle_favorite(&self, user_id: &Uuid, property_id: &Uuid) -> Result<bool, AppError>;
        async fn list_favorites(&self, user_id: &Uuid) -> Result<Vec<Property>, AppError>;
    }
}

mock! {
    pub ImageRepo {}

    #[async_trait]
    impl PropertyImageRepository for ImageRepo {
        async fn insert_image(&self, image: &PropertyImageInsert) -> Result<PropertyImage, AppError>;
        async fn list_images(&self, property_id: &Uuid) -> Result<Vec<PropertyImage>, AppError>;
        async fn set_primary(&self, property_id: &Uuid, image_id: &Uuid) -> Result<PropertyImage, AppError>;
        async fn delete_image(
            &self,
            property_id: &Uuid,
            image_id: &Uuid,
        ) -> Result<(PropertyImage, Option<Uuid>), AppError>;
    }
}

mock! {
    pub UserRepo {}

    #[async_trait]
    impl UserRepository for UserRepo {
        async fn check_connection(&self) -> Result<(), AppError>;
        async fn count_users(&self) -> Result<u64, AppError>;
        async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
        async fn create_user(&self, user: &UserInsert) -> Result<Uuid, AppError>;
        async fn get_user_by_id(&self, id: &Uuid) -> Result<Option<User>, AppError>;
    }
}

// ───── In-memory booking store ─────────────────────────────────────

/// Booking store that applies the same overlap rule as the SQL repository,
/// so sequences of requests can be checked end to end.
#[derive(Default)]
pub struct InMemoryBookingRepo {
    bookings: Mutex<Vec<Booking>>,
}

impl InMemoryBookingRepo {
    pub fn with(bookings: Vec<Booking>) -> Self {
        InMemoryBookingRepo { bookings: Mutex::new(bookings) }
    }

    pub fn snapshot(&self) -> Vec<Booking> {
        self.bookings.lock().unwrap().clone()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepo {
    async fn find_overlapping(&self, property_id: &Uuid, range: &DateRange) -> Result<Vec<Booking>, AppError> {
        Ok(self
            .bookings
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.property_id == *property_id && b.status.is_occupying())
            .filter(|b| b.range().is_some_and(|r| r.overlaps(range)))
            .cloned()
            .collect())
    }

    async fn create_booking_if_available(&self, booking: &BookingInsert) -> Result<Booking, AppError> {
        let requested = DateRange::new(booking.start_date, booking.end_date)?;
        let mut bookings = self.bookings.lock().unwrap();

        if first_conflict(&booking.property_id, &requested, bookings.iter()).is_some() {
            return Err(AppError::Conflict("The property is already booked for these dates".into()));
        }

        let created = Booking {
            id: Uuid::new_v4(),
            property_id: booking.property_id,
            user_id: booking.user_id,
            start_date: booking.start_date,
            end_date: booking.end_date,
            guests: booking.guests,
            notes: booking.notes.clone(),
            status: BookingStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        bookings.push(created.clone());
        Ok(created)
    }

    async fn get_booking(&self, id: &Uuid) -> Result<Option<Booking>, AppError> {
        Ok(self.bookings.lock().unwrap().iter().find(|b| b.id == *id).cloned())
    }

    async fn list_for_user(&self, user_id: &Uuid) -> Result<Vec<Booking>, AppError> {
        Ok(self
            .bookings
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.user_id == *user_id)
            .cloned()
            .collect())
    }

    async fn list_for_owner(&self, _owner_id: &Uuid) -> Result<Vec<Booking>, AppError> {
        Ok(self.snapshot())
    }

    async fn update_status(&self, id: &Uuid, from: BookingStatus, to: BookingStatus) -> Result<Booking, AppError> {
        let mut bookings = self.bookings.lock().unwrap();
        let booking = bookings
            .iter_mut()
            .find(|b| b.id == *id && b.status == from)
            .ok_or_else(|| AppError::Conflict("Booking status changed".into()))?;
        booking.status = to;
        booking.updated_at = Utc::now();
        Ok(booking.clone())
    }

    async fn complete_elapsed_bookings(&self, today: NaiveDate) -> Result<u64, AppError> {
        let mut count = 0;
        for booking in self.bookings.lock().unwrap().iter_mut() {
            if booking.status == BookingStatus::Confirmed && booking.end_date <= today {
                booking.status = BookingStatus::Completed;
                count += 1;
            }
        }
        Ok(count)
    }

    async fn count_bookings(&self) -> Result<u64, AppError> {
        Ok(self.bookings.lock().unwrap().len() as u64)
    }
}

// ───── Fixtures ────────────────────────────────────────────────────

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn actor(user_id: Uuid) -> Actor {
    Actor { user_id, is_admin: false }
}

pub fn admin() -> Actor {
    Actor { user_id: Uuid::new_v4(), is_admin: true }
}

pub fn property(id: Uuid, owner_id: Uuid) -> Property {
    Property {
        id,
        owner_id,
        title: "Appartement vue mer".into(),
        description: Some("Deux chambres près de la plage".into()),
        property_type: PropertyType::Apartment,
        price: 850.0,
        rooms: 4,
        bedrooms: Some(2),
        bathrooms: Some(1),
        area: Some(75.0),
        has_kitchen: true,
        has_parking: false,
        has_garden: false,
        has_balcony: true,
        has_pool: false,
        is_furnished: true,
        address: "12 Rue Capois".into(),
        city: "Port-au-Prince".into(),
        state: Some("Ouest".into()),
        country: "Haiti".into(),
        latitude: None,
        longitude: None,
        is_available: true,
        is_featured: false,
        available_from: None,
        min_stay_months: 1,
        view_count: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn booking(property_id: Uuid, start: &str, end: &str, status: BookingStatus) -> Booking {
    Booking {
        id: Uuid::new_v4(),
        property_id,
        user_id: Uuid::new_v4(),
        start_date: date(start),
        end_date: date(end),
        guests: 2,
        notes: None,
        status,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Property repository that always returns `property`.
pub fn property_repo_returning(property: Property) -> MockPropertyRepo {
    let mut repo = MockPropertyRepo::new();
    repo.expect_get_property()
        .returning(move |_| Ok(Some(property.clone())));
    repo
}

pub fn image_row(insert: &PropertyImageInsert, is_primary: bool) -> PropertyImage {
    PropertyImage {
        id: Uuid::new_v4(),
        property_id: insert.property_id,
        stored_filename: insert.stored_filename.clone(),
        original_filename: insert.original_filename.clone(),
        file_size: insert.file_size,
        content_type: insert.content_type.clone(),
        width: insert.width,
        height: insert.height,
        is_primary,
        position: 0,
        created_at: Utc::now(),
    }
}

// ───── Images ──────────────────────────────────────────────────────

/// Top half green, bottom half magenta.
pub fn two_tone_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |_, y| {
        if y < height / 2 { Rgb([30, 200, 30]) } else { Rgb([200, 30, 200]) }
    });
    encode_jpeg(&img, 90).unwrap()
}

/// Inserts an APP1 segment with a single EXIF orientation entry after SOI.
pub fn exif_oriented(jpeg: &[u8], orientation: u16) -> Vec<u8> {
    let mut ifd = Vec::new();
    ifd.extend_from_slice(b"MM\0*");
    ifd.extend_from_slice(&8u32.to_be_bytes());
    ifd.extend_from_slice(&1u16.to_be_bytes());
    ifd.extend_from_slice(&0x0112u16.to_be_bytes());
    ifd.extend_from_slice(&3u16.to_be_bytes());
    ifd.extend_from_slice(&1u32.to_be_bytes());
    ifd.extend_from_slice(&orientation.to_be_bytes());
    ifd.extend_from_slice(&[0, 0]);
    ifd.extend_from_slice(&0u32.to_be_bytes());

    let mut app1 = b"Exif\0\0".to_vec();
    app1.extend_from_slice(&ifd);

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((app1.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&app1);
    out.extend_from_slice(&jpeg[2..]);
    out
}
