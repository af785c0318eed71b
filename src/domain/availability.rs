//! Date-range arithmetic behind booking availability.
//!
//! Stays are half-open: `[start, end)` where `end` is the checkout day, so a
//! booking ending on the 10th and another starting on the 10th can coexist.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{entities::booking::{Booking, BookingStatus}, errors::AppError};

pub const MAX_STAY_NIGHTS: i64 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Builds a non-empty half-open range. `start == end` is rejected, a
    /// zero-night stay is not a request that can be "available".
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        if start >= end {
            return Err(AppError::validation(
                "end_date",
                "End date must be after the start date",
            ));
        }
        Ok(DateRange { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn nights(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// `[s1,e1)` and `[s2,e2)` overlap iff `s1 < e2 && s2 < e1`.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl BookingStatus {
    /// Pending and confirmed bookings hold their dates.
    pub fn is_occupying(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
    }

    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Cancelled) | (Confirmed, Completed)
        )
    }
}

impl Booking {
    pub fn range(&self) -> Option<DateRange> {
        DateRange::new(self.start_date, self.end_date).ok()
    }
}

/// Returns the first occupying booking of `property_id` that overlaps `requested`.
pub fn first_conflict<'a, I>(property_id: &uuid::Uuid, requested: &DateRange, bookings: I) -> Option<&'a Booking>
where
    I: IntoIterator<Item = &'a Booking>,
{
    bookings.into_iter().find(|booking| {
        booking.property_id == *property_id
            && booking.status.is_occupying()
            && booking.range().is_some_and(|range| range.overlaps(requested))
    })
}

pub fn is_range_available<'a, I>(property_id: &uuid::Uuid, requested: &DateRange, bookings: I) -> bool
where
    I: IntoIterator<Item = &'a Booking>,
{
    first_conflict(property_id, requested, bookings).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::new(date(start), date(end)).unwrap()
    }

    fn booking(property_id: Uuid, start: &str, end: &str, status: BookingStatus) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            property_id,
            user_id: Uuid::new_v4(),
            start_date: date(start),
            end_date: date(end),
            guests: 1,
            notes: None,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn zero_length_and_inverted_ranges_are_invalid() {
        assert!(matches!(
            DateRange::new(date("2024-06-01"), date("2024-06-01")),
            Err(AppError::ValidationError(_))
        ));
        assert!(DateRange::new(date("2024-06-05"), date("2024-06-01")).is_err());
    }

    #[test]
    fn overlap_is_symmetric_and_half_open() {
        let a = range("2024-06-01", "2024-06-10");
        let b = range("2024-06-10", "2024-06-15");
        let c = range("2024-06-09", "2024-06-11");

        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
        assert!(a.overlaps(&c) && c.overlaps(&a));
        assert!(b.overlaps(&c) && c.overlaps(&b));
    }

    #[test]
    fn confirmed_booking_blocks_contained_and_partial_requests() {
        let property = Uuid::new_v4();
        let existing = vec![booking(property, "2024-06-01", "2024-06-10", BookingStatus::Confirmed)];

        // contained
        assert!(!is_range_available(&property, &range("2024-06-05", "2024-06-07"), &existing));
        // back-to-back
        assert!(is_range_available(&property, &range("2024-06-10", "2024-06-15"), &existing));
        // partial overlap at start
        assert!(!is_range_available(&property, &range("2024-05-25", "2024-06-02"), &existing));
        // partial overlap at end
        assert!(!is_range_available(&property, &range("2024-06-09", "2024-06-20"), &existing));
        // request swallows the booking
        assert!(!is_range_available(&property, &range("2024-05-01", "2024-07-01"), &existing));
        // ends exactly where the booking starts
        assert!(is_range_available(&property, &range("2024-05-20", "2024-06-01"), &existing));
    }

    #[test]
    fn cancelled_and_completed_bookings_never_block() {
        let property = Uuid::new_v4();
        let existing = vec![
            booking(property, "2024-06-01", "2024-06-10", BookingStatus::Cancelled),
            booking(property, "2024-06-01", "2024-06-10", BookingStatus::Completed),
        ];

        assert!(is_range_available(&property, &range("2024-06-01", "2024-06-10"), &existing));
    }

    #[test]
    fn pending_bookings_block() {
        let property = Uuid::new_v4();
        let existing = vec![booking(property, "2024-06-01", "2024-06-10", BookingStatus::Pending)];

        let conflict = first_conflict(&property, &range("2024-06-03", "2024-06-04"), &existing);
        assert_eq!(conflict.map(|b| b.id), Some(existing[0].id));
    }

    #[test]
    fn other_properties_do_not_block() {
        let property = Uuid::new_v4();
        let existing = vec![booking(Uuid::new_v4(), "2024-06-01", "2024-06-10", BookingStatus::Confirmed)];

        assert!(is_range_available(&property, &range("2024-06-01", "2024-06-10"), &existing));
    }

    #[test]
    fn accepted_bookings_never_overlap() {
        // Greedy acceptance over a fixed request stream keeps the accepted set disjoint
        let property = Uuid::new_v4();
        let requests = [
            ("2024-06-01", "2024-06-05"),
            ("2024-06-03", "2024-06-08"),
            ("2024-06-05", "2024-06-09"),
            ("2024-06-08", "2024-06-12"),
            ("2024-06-09", "2024-06-10"),
            ("2024-05-28", "2024-06-02"),
            ("2024-06-12", "2024-06-13"),
        ];

        let mut accepted: Vec<Booking> = Vec::new();
        for (start, end) in requests {
            let requested = range(start, end);
            if is_range_available(&property, &requested, &accepted) {
                accepted.push(booking(property, start, end, BookingStatus::Confirmed));
            }
        }

        assert_eq!(accepted.len(), 4);
        for (i, a) in accepted.iter().enumerate() {
            for b in accepted.iter().skip(i + 1) {
                assert!(!a.range().unwrap().overlaps(&b.range().unwrap()));
            }
        }
    }

    #[test]
    fn status_transitions_follow_the_lifecycle() {
        use BookingStatus::*;

        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Cancelled.can_transition_to(Confirmed));
        assert!(!Completed.can_transition_to(Pending));
        assert!(Cancelled.is_terminal() && Completed.is_terminal());
    }
}
