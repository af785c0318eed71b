mod test_utils;

use rental_backend::{
    entities::booking::{BookingStatus, NewBookingRequest},
    errors::AppError,
    repositories::booking::BookingRepository,
    use_cases::booking::BookingHandler,
};
use test_utils::*;
use uuid::Uuid;

const TODAY: &str = "2024-05-01";

fn request(start: &str, end: &str) -> NewBookingRequest {
    NewBookingRequest {
        start_date: date(start),
        end_date: date(end),
        guests: 2,
        notes: None,
    }
}

fn handler_with(
    property_id: Uuid,
    owner_id: Uuid,
    existing: Vec<rental_backend::entities::booking::Booking>,
) -> BookingHandler<InMemoryBookingRepo, MockPropertyRepo> {
    BookingHandler::new(
        InMemoryBookingRepo::with(existing),
        property_repo_returning(property(property_id, owner_id)),
    )
}

#[tokio::test]
async fn june_stay_blocks_overlapping_requests_only() {
    let property_id = Uuid::new_v4();
    let existing = booking(property_id, "2024-06-01", "2024-06-10", BookingStatus::Confirmed);
    let handler = handler_with(property_id, Uuid::new_v4(), vec![existing]);
    let id = property_id.to_string();

    let inside = handler.check_availability(&id, date("2024-06-05"), date("2024-06-07")).await.unwrap();
    let after = handler.check_availability(&id, date("2024-06-10"), date("2024-06-15")).await.unwrap();
    let straddling = handler.check_availability(&id, date("2024-05-25"), date("2024-06-02")).await.unwrap();

    assert!(!inside.available);
    assert!(after.available);
    assert_eq!(after.nights, 5);
    assert!(!straddling.available);
}

#[tokio::test]
async fn back_to_back_stays_are_both_accepted() {
    let property_id = Uuid::new_v4();
    let handler = handler_with(property_id, Uuid::new_v4(), vec![]);
    let guest = actor(Uuid::new_v4());
    let today = date(TODAY);
    let id = property_id.to_string();

    let first = handler.request_booking(&guest, &id, request("2024-07-01", "2024-07-05"), today).await;
    let second = handler.request_booking(&guest, &id, request("2024-07-05", "2024-07-09"), today).await;

    assert!(first.is_ok());
    let second = second.unwrap();
    assert_eq!(second.status, BookingStatus::Pending);
    assert_eq!(handler.booking_repo.snapshot().len(), 2);
}

#[tokio::test]
async fn nested_request_is_rejected_with_conflict() {
    let property_id = Uuid::new_v4();
    let existing = booking(property_id, "2024-08-01", "2024-08-31", BookingStatus::Pending);
    let handler = handler_with(property_id, Uuid::new_v4(), vec![existing]);

    let result = handler
        .request_booking(&actor(Uuid::new_v4()), &property_id.to_string(), request("2024-08-10", "2024-08-12"), date(TODAY))
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert_eq!(handler.booking_repo.snapshot().len(), 1);
}

#[tokio::test]
async fn cancelled_and_completed_stays_never_block() {
    let property_id = Uuid::new_v4();
    let handler = handler_with(property_id, Uuid::new_v4(), vec![
        booking(property_id, "2024-06-01", "2024-06-10", BookingStatus::Cancelled),
        booking(property_id, "2024-06-01", "2024-06-10", BookingStatus::Completed),
    ]);

    let check = handler
        .check_availability(&property_id.to_string(), date("2024-06-03"), date("2024-06-04"))
        .await
        .unwrap();
    assert!(check.available);

    let created = handler
        .request_booking(&actor(Uuid::new_v4()), &property_id.to_string(), request("2024-06-02", "2024-06-08"), date(TODAY))
        .await;
    assert!(created.is_ok());
}

#[tokio::test]
async fn bookings_on_other_properties_do_not_count() {
    let property_id = Uuid::new_v4();
    let neighbour = Uuid::new_v4();
    let handler = handler_with(property_id, Uuid::new_v4(), vec![
        booking(neighbour, "2024-06-01", "2024-06-10", BookingStatus::Confirmed),
    ]);

    let check = handler
        .check_availability(&property_id.to_string(), date("2024-06-01"), date("2024-06-10"))
        .await
        .unwrap();
    assert!(check.available);
}

#[tokio::test]
async fn accepted_requests_never_overlap() {
    let property_id = Uuid::new_v4();
    let handler = handler_with(property_id, Uuid::new_v4(), vec![]);
    let guest = actor(Uuid::new_v4());
    let id = property_id.to_string();

    let requests = [
        ("2024-09-01", "2024-09-05"),
        ("2024-09-03", "2024-09-04"),
        ("2024-09-05", "2024-09-08"),
        ("2024-08-28", "2024-09-02"),
        ("2024-09-07", "2024-09-12"),
        ("2024-09-08", "2024-09-10"),
        ("2024-08-20", "2024-08-28"),
    ];

    let mut accepted = 0;
    for (start, end) in requests {
        if handler.request_booking(&guest, &id, request(start, end), date(TODAY)).await.is_ok() {
            accepted += 1;
        }
    }

    let stored = handler.booking_repo.snapshot();
    assert_eq!(accepted, 4);
    for (i, a) in stored.iter().enumerate() {
        for b in stored.iter().skip(i + 1) {
            assert!(!a.range().unwrap().overlaps(&b.range().unwrap()), "{:?} overlaps {:?}", a, b);
        }
    }
}

#[tokio::test]
async fn malformed_input_is_rejected_before_any_lookup() {
    // no expectations: any repository call would panic
    let handler = BookingHandler::new(InMemoryBookingRepo::default(), MockPropertyRepo::new());

    let missing_id = handler.check_availability("", date("2024-06-01"), date("2024-06-02")).await;
    assert!(matches!(missing_id, Err(AppError::InvalidInput(_))));

    let id = Uuid::new_v4().to_string();
    let zero_nights = handler.check_availability(&id, date("2024-06-01"), date("2024-06-01")).await;
    let reversed = handler.check_availability(&id, date("2024-06-05"), date("2024-06-01")).await;
    assert!(matches!(zero_nights, Err(AppError::ValidationError(_))));
    assert!(matches!(reversed, Err(AppError::ValidationError(_))));
}

#[tokio::test]
async fn past_or_overlong_stays_are_refused() {
    let property_id = Uuid::new_v4();
    let handler = handler_with(property_id, Uuid::new_v4(), vec![]);
    let guest = actor(Uuid::new_v4());
    let id = property_id.to_string();

    let past = handler.request_booking(&guest, &id, request("2024-04-20", "2024-04-25"), date(TODAY)).await;
    let overlong = handler.request_booking(&guest, &id, request("2024-06-01", "2025-06-02"), date(TODAY)).await;
    let no_guests = handler
        .request_booking(&guest, &id, NewBookingRequest { guests: 0, ..request("2024-06-01", "2024-06-03") }, date(TODAY))
        .await;

    assert!(matches!(past, Err(AppError::ValidationError(_))));
    assert!(matches!(overlong, Err(AppError::ValidationError(_))));
    assert!(matches!(no_guests, Err(AppError::ValidationError(_))));
    assert!(handler.booking_repo.snapshot().is_empty());
}

#[tokio::test]
async fn unavailable_listing_refuses_bookings() {
    let property_id = Uuid::new_v4();
    let mut listing = property(property_id, Uuid::new_v4());
    listing.is_available = false;
    let handler = BookingHandler::new(InMemoryBookingRepo::default(), property_repo_returning(listing));

    let result = handler
        .request_booking(&actor(Uuid::new_v4()), &property_id.to_string(), request("2024-06-01", "2024-06-03"), date(TODAY))
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn owner_walks_a_booking_through_its_lifecycle() {
    let property_id = Uuid::new_v4();
    let owner = Uuid::new_v4();
    let pending = booking(property_id, "2024-06-01", "2024-06-10", BookingStatus::Pending);
    let booking_id = pending.id.to_string();
    let handler = handler_with(property_id, owner, vec![pending]);
    let host = actor(owner);

    let confirmed = handler.update_status(&host, &booking_id, BookingStatus::Confirmed).await.unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);

    let completed = handler.update_status(&host, &booking_id, BookingStatus::Completed).await.unwrap();
    assert_eq!(completed.status, BookingStatus::Completed);

    // terminal states never re-open
    let reopened = handler.update_status(&host, &booking_id, BookingStatus::Pending).await;
    assert!(matches!(reopened, Err(AppError::Conflict(_))));
    let cancelled = handler.update_status(&host, &booking_id, BookingStatus::Cancelled).await;
    assert!(matches!(cancelled, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn strangers_cannot_change_or_read_a_booking() {
    let property_id = Uuid::new_v4();
    let pending = booking(property_id, "2024-06-01", "2024-06-10", BookingStatus::Pending);
    let booking_id = pending.id.to_string();
    let guest = pending.user_id;
    let handler = handler_with(property_id, Uuid::new_v4(), vec![pending]);
    let stranger = actor(Uuid::new_v4());

    let update = handler.update_status(&stranger, &booking_id, BookingStatus::Confirmed).await;
    let read = handler.get_booking(&stranger, &booking_id).await;
    assert!(matches!(update, Err(AppError::ForbiddenAccess)));
    assert!(matches!(read, Err(AppError::ForbiddenAccess)));

    assert!(handler.get_booking(&actor(guest), &booking_id).await.is_ok());
    assert!(handler.update_status(&admin(), &booking_id, BookingStatus::Cancelled).await.is_ok());
}

#[tokio::test]
async fn elapsed_confirmed_stays_are_completed() {
    let property_id = Uuid::new_v4();
    let repo = InMemoryBookingRepo::with(vec![
        booking(property_id, "2024-06-01", "2024-06-10", BookingStatus::Confirmed),
        booking(property_id, "2024-06-10", "2024-06-20", BookingStatus::Confirmed),
        booking(property_id, "2024-05-01", "2024-05-03", BookingStatus::Pending),
    ]);

    let completed = repo.complete_elapsed_bookings(date("2024-06-10")).await.unwrap();

    assert_eq!(completed, 1);
    let statuses: Vec<_> = repo.snapshot().iter().map(|b| b.status).collect();
    assert_eq!(statuses, vec![BookingStatus::Completed, BookingStatus::Confirmed, BookingStatus::Pending]);
}
