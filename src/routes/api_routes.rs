use axum::{Router, routing::{delete, get, post, put}};
use crate::{AppState, controllers::api_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/users", get(api_controller::all_users))
        .route("/api/users/:id", get(api_controller::one_user))
        .route("/api/users/new", post(api_controller::new_user))
        .route("/api/users/update/:id", put(api_controller::update_user))
        .route("/api/users/delete/:id", delete(api_controller::delete_user))
        .route("/api/users/:id/deposit", post(api_controller::deposit))
        .route("/api/users/:id/withdraw", post(api_controller::withdraw))
        .route("/api/users/username/:username", get(api_controller::user_by_username))
        .route("/api/users/low-balance/:threshold", get(api_controller::low_balance_users))
        .route("/api/orders", get(api_controller::all_orders))
        .route("/api/orders/:id", get(api_controller::one_order))
        .route("/api/orders/new", post(api_controller::new_order))
        .route("/api/orders/update/:id", put(api_controller::update_order))
        .route("/api/orders/delete/:id", delete(api_controller::delete_order))
        .route("/api/orders/item/:item", get(api_controller::orders_by_item))
        .route("/api/orders/price/:price", get(api_controller::orders_by_price))
}
