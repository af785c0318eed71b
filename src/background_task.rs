use chrono::Utc;
use tokio::time::{interval, Duration};

use crate::{constants::BOOKING_SWEEP_INTERVAL_SECS, repositories::booking::BookingRepository};

/// Marks confirmed stays whose checkout day has come as completed, once a day.
pub async fn start_booking_completion_task<R>(repo: R)
where
    R: BookingRepository + 'static,
{
    let mut interval = interval(Duration::from_secs(BOOKING_SWEEP_INTERVAL_SECS));

    loop {
        interval.tick().await;

        let today = Utc::now().date_naive();
        match repo.complete_elapsed_bookings(today).await {
            Ok(0) => tracing::debug!("No elapsed bookings to complete"),
            Ok(count) => tracing::info!("Completed {} elapsed bookings", count),
            Err(e) => tracing::error!("Booking completion sweep failed: {}", e),
        }
    }
}
