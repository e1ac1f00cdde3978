use axum::{
    routing::{get, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::booking::{
    approve_booking, cancel_booking, check_availability, complete_booking, create_booking,
    reject_booking, show_booking, show_booking_list, show_calendar,
};

pub fn build_booking_routers() -> Router<AppRegistry> {
    let booking_routers = Router::new()
        .route("/", post(create_booking))
        .route("/", get(show_booking_list))
        .route("/calendar", get(show_calendar))
        .route("/availability", get(check_availability))
        .route("/:booking_id", get(show_booking))
        .route("/:booking_id/approve", post(approve_booking))
        .route("/:booking_id/reject", post(reject_booking))
        .route("/:booking_id/cancel", post(cancel_booking))
        .route("/:booking_id/complete", post(complete_booking));

    Router::new().nest("/bookings", booking_routers)
}
