use axum::{Router, routing::{get, post}};
use crate::{AppState, controllers::order_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/orders", get(order_controller::orders))
        .route("/newOrder", get(order_controller::new_order))
        .route("/editOrder/:id", get(order_controller::edit_order))
        .route("/saveOrder", post(order_controller::save_order))
}
