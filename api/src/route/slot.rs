use axum::{routing::get, Router};
use registry::AppRegistry;

use crate::handler::slot::{find_or_create_slot, show_available_slots, show_slot_list};

pub fn build_slot_routers() -> Router<AppRegistry> {
    let slot_routers = Router::new()
        .route("/", get(show_slot_list))
        .route("/find_or_create", get(find_or_create_slot));

    let workspace_routers =
        Router::new().route("/:workspace_id/available-slots", get(show_available_slots));

    Router::new()
        .nest("/slots", slot_routers)
        .nest("/workspaces", workspace_routers)
}
