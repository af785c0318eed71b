use chrono::NaiveDate;
use validator::Validate;

use crate::{
    domain::availability::{is_range_available, DateRange, MAX_STAY_NIGHTS},
    entities::{
        booking::{AvailabilityResponse, Booking, BookingInsert, BookingStatus, NewBookingRequest},
        token::Actor,
    },
    errors::AppError,
    repositories::{booking::BookingRepository, property::PropertyRepository},
    utils::valid_uuid::valid_uuid,
};

pub struct BookingHandler<B, P>
where
    B: BookingRepository,
    P: PropertyRepository,
{
    pub booking_repo: B,
    pub property_repo: P,
}

impl<B, P> BookingHandler<B, P>
where
    B: BookingRepository,
    P: PropertyRepository,
{
    pub fn new(booking_repo: B, property_repo: P) -> Self {
        BookingHandler { booking_repo, property_repo }
    }

    /// Whether `[start_date, end_date)` is free of pending or confirmed bookings.
    /// Read only; the identifier and the range are checked before any query.
    pub async fn check_availability(
        &self,
        property_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<AvailabilityResponse, AppError> {
        let id = valid_uuid(property_id)?;
        let range = DateRange::new(start_date, end_date)?;

        if self.property_repo.get_property(&id).await?.is_none() {
            return Err(AppError::NotFound("Property not found".to_string()));
        }

        let overlapping = self.booking_repo.find_overlapping(&id, &range).await?;

        Ok(AvailabilityResponse {
            property_id: id,
            start_date,
            end_date,
            nights: range.nights(),
            available: is_range_available(&id, &range, &overlapping),
        })
    }

    /// Creates a pending booking if the stay is valid and the dates are free.
    pub async fn request_booking(
        &self,
        actor: &Actor,
        property_id: &str,
        request: NewBookingRequest,
        today: NaiveDate,
    ) -> Result<Booking, AppError> {
        let id = valid_uuid(property_id)?;
        request.validate()?;

        let range = DateRange::new(request.start_date, request.end_date)?;
        if range.start() < today {
            return Err(AppError::validation("start_date", "Start date cannot be in the past"));
        }
        if range.nights() > MAX_STAY_NIGHTS {
            return Err(AppError::validation(
                "end_date",
                format!("A stay cannot exceed {} nights", MAX_STAY_NIGHTS),
            ));
        }

        let property = self
            .property_repo
            .get_property(&id)
            .await?
            .ok_or_else(|| AppError::NotFound("Property not found".to_string()))?;

        if !property.is_available {
            return Err(AppError::Conflict("This property is not accepting bookings".to_string()));
        }

        let insert = BookingInsert {
            property_id: id,
            user_id: actor.user_id,
            start_date: range.start(),
            end_date: range.end(),
            guests: request.guests,
            notes: request.notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        };

        let booking = self.booking_repo.create_booking_if_available(&insert).await?;
        tracing::info!(
            booking_id = %booking.id,
            property_id = %id,
            nights = range.nights(),
            "booking requested"
        );
        Ok(booking)
    }

    /// Visible to the guest, the property owner and admins.
    pub async fn get_booking(&self, actor: &Actor, booking_id: &str) -> Result<Booking, AppError> {
        let id = valid_uuid(booking_id)?;
        let booking = self
            .booking_repo
            .get_booking(&id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        if booking.user_id == actor.user_id || actor.is_admin {
            return Ok(booking);
        }

        match self.property_repo.get_property(&booking.property_id).await? {
            Some(property) if property.owner_id == actor.user_id => Ok(booking),
            _ => Err(AppError::ForbiddenAccess),
        }
    }

    pub async fn list_my_bookings(&self, actor: &Actor) -> Result<Vec<Booking>, AppError> {
        self.booking_repo.list_for_user(&actor.user_id).await
    }

    pub async fn list_hosted_bookings(&self, actor: &Actor) -> Result<Vec<Booking>, AppError> {
        self.booking_repo.list_for_owner(&actor.user_id).await
    }

    /// Owner or admin moves a booking along its lifecycle. Terminal states never re-open.
    pub async fn update_status(
        &self,
        actor: &Actor,
        booking_id: &str,
        next: BookingStatus,
    ) -> Result<Booking, AppError> {
        let id = valid_uuid(booking_id)?;
        let booking = self
            .booking_repo
            .get_booking(&id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        let property = self
            .property_repo
            .get_property(&booking.property_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Property not found".to_string()))?;

        if !actor.can_manage(&property.owner_id) {
            return Err(AppError::ForbiddenAccess);
        }

        if !booking.status.can_transition_to(next) {
            return Err(AppError::Conflict(format!(
                "Cannot change a {:?} booking to {:?}",
                booking.status, next
            ).to_lowercase()));
        }

        let updated = self.booking_repo.update_status(&id, booking.status, next).await?;
        tracing::info!(booking_id = %id, from = ?booking.status, to = ?next, "booking status changed");
        Ok(updated)
    }
}
