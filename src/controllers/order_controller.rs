use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState,
    error::ServiceError,
    models::{Item, Order},
    render,
    services::{order_service, user_service},
};

fn page(
    state: &AppState,
    status: StatusCode,
    title: &str,
    tpl: &str,
    ctx: serde_json::Value,
    error: Option<&str>,
) -> Response {
    match render::render_page(state, title, tpl, ctx, error) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
    }
}

fn bare_error(err: ServiceError) -> Response {
    if let ServiceError::Store(e) = &err {
        tracing::error!(error = %e, "store failure");
    }
    (err.status(), Html(err.public_message())).into_response()
}

async fn orders_page(state: &AppState, status: StatusCode, error: Option<&str>) -> Response {
    let orders = match order_service::get_all_orders(state).await {
        Ok(o) => o,
        Err(e) => return bare_error(e),
    };

    let message = if orders.is_empty() { "No order to show" } else { "" };

    page(
        state,
        status,
        "Orders",
        "all_orders",
        json!({ "orders": orders, "message": message }),
        error,
    )
}

async fn service_failure(state: &AppState, err: ServiceError) -> Response {
    if matches!(err, ServiceError::Store(_)) {
        return bare_error(err);
    }

    orders_page(state, err.status(), Some(&err.public_message())).await
}

async fn order_form_page(
    state: &AppState,
    status: StatusCode,
    order: serde_json::Value,
    message: &str,
    error: Option<&str>,
) -> Response {
    // owners to pick from
    let users = match user_service::get_all_users(state).await {
        Ok(u) => u,
        Err(e) => return bare_error(e),
    };

    page(
        state,
        status,
        "Edit Order",
        "edit_order",
        json!({
            "order": order,
            "users": users,
            "items": Item::ALL,
            "message": message,
        }),
        error,
    )
}

// GET /orders
pub async fn orders(State(state): State<AppState>) -> Response {
    orders_page(&state, StatusCode::OK, None).await
}

// GET /newOrder
pub async fn new_order(State(state): State<AppState>) -> Response {
    order_form_page(&state, StatusCode::OK, json!({}), "", None).await
}

// GET /editOrder/:id
pub async fn edit_order(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let order = match order_service::get_order_by_id(&state, id).await {
        Ok(o) => o,
        Err(e) => return service_failure(&state, e).await,
    };

    let message = match order {
        Some(_) => String::new(),
        None => format!("No order found with id: {id}"),
    };

    order_form_page(&state, StatusCode::OK, json!(order), &message, None).await
}

#[derive(Deserialize)]
pub struct OrderForm {
    #[serde(default)]
    pub id: Option<String>,
    pub item: String,
    pub price: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

fn optional_i64(raw: Option<&str>, what: &str) -> Result<Option<i64>, String> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s.parse::<i64>().map(Some).map_err(|_| format!("Invalid {what}.")),
    }
}

fn validate_order_form(form: &OrderForm) -> Result<(Option<i64>, Order), String> {
    let id = optional_i64(form.id.as_deref(), "id")?;
    let user_id = optional_i64(form.user_id.as_deref(), "user")?;
    let item: Item = form.item.parse()?;
    let price: i64 = form
        .price
        .trim()
        .parse()
        .map_err(|_| "Price must be a whole number.".to_string())?;

    Ok((id, Order::new(id, item, price, user_id)))
}

// POST /saveOrder  (insert when the id field is empty, update otherwise)
pub async fn save_order(State(state): State<AppState>, Form(form): Form<OrderForm>) -> Response {
    let (id, order) = match validate_order_form(&form) {
        Ok(v) => v,
        Err(msg) => {
            let values = json!({
                "id": form.id,
                "item": form.item,
                "price": form.price,
            });
            return order_form_page(&state, StatusCode::BAD_REQUEST, values, "", Some(&msg)).await;
        }
    };

    let saved = match id {
        None => order_service::insert_new_order(&state, order).await,
        Some(id) => order_service::update_order_by_id(&state, id, order).await,
    };

    match saved {
        Ok(_) => Redirect::to("/orders").into_response(),
        Err(e) => service_failure(&state, e).await,
    }
}
