use axum::{Router, routing::{get, post}};
use crate::{AppState, controllers::user_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/", get(user_controller::index))
        .route("/newUser", get(user_controller::new_user))
        .route("/editUser/:id", get(user_controller::edit_user))
        .route("/saveUser", post(user_controller::save_user))
        .route("/users/:id/handle_balance", get(user_controller::handle_balance))
        .route("/users/:id/deposit", post(user_controller::deposit))
        .route("/users/:id/withdraw", post(user_controller::withdraw))
}
