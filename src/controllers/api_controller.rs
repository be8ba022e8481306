//! JSON endpoints under `/api`.
//!
//! Lookups by id answer `null` on a miss; service errors become
//! `{"message": ...}` bodies through `ServiceError`'s `IntoResponse`.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    error::ServiceError,
    models::{Item, Order, User},
    services::{order_service, user_service},
};

type ApiResult<T> = Result<Json<T>, ServiceError>;

// ---------------- Users ----------------

pub async fn all_users(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    Ok(Json(user_service::get_all_users(&state).await?))
}

pub async fn one_user(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Option<User>> {
    Ok(Json(user_service::get_user_by_id(&state, id).await?))
}

pub async fn user_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Option<User>> {
    Ok(Json(user_service::find_user_by_username(&state, &username).await?))
}

pub async fn low_balance_users(
    State(state): State<AppState>,
    Path(threshold): Path<i64>,
) -> ApiResult<Vec<User>> {
    Ok(Json(user_service::get_users_with_low_balance(&state, threshold).await?))
}

pub async fn new_user(State(state): State<AppState>, Json(user): Json<User>) -> ApiResult<User> {
    Ok(Json(user_service::insert_new_user(&state, user).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(user): Json<User>,
) -> ApiResult<User> {
    Ok(Json(user_service::update_user_by_id(&state, id, user).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    user_service::delete_user_by_id(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/users/:id/deposit  (body: bare JSON number)
pub async fn deposit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(amount): Json<i64>,
) -> Result<StatusCode, ServiceError> {
    user_service::deposit(&state, id, amount).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn withdraw(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(amount): Json<i64>,
) -> Result<StatusCode, ServiceError> {
    user_service::withdraw(&state, id, amount).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------- Orders ----------------

pub async fn all_orders(State(state): State<AppState>) -> ApiResult<Vec<Order>> {
    Ok(Json(order_service::get_all_orders(&state).await?))
}

pub async fn one_order(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Option<Order>> {
    Ok(Json(order_service::get_order_by_id(&state, id).await?))
}

pub async fn orders_by_item(
    State(state): State<AppState>,
    Path(item): Path<Item>,
) -> ApiResult<Vec<Order>> {
    Ok(Json(order_service::get_orders_by_item(&state, item).await?))
}

pub async fn orders_by_price(
    State(state): State<AppState>,
    Path(price): Path<i64>,
) -> ApiResult<Vec<Order>> {
    Ok(Json(order_service::get_orders_by_price(&state, price).await?))
}

pub async fn new_order(State(state): State<AppState>, Json(order): Json<Order>) -> ApiResult<Order> {
    Ok(Json(order_service::insert_new_order(&state, order).await?))
}

pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(order): Json<Order>,
) -> ApiResult<Order> {
    Ok(Json(order_service::update_order_by_id(&state, id, order).await?))
}

pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    order_service::delete_order_by_id(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
