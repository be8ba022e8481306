use std::sync::LazyLock;

use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState,
    error::ServiceError,
    models::User,
    render,
    services::user_service,
};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

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

/// Users table, optionally topped with an error banner.
async fn users_page(state: &AppState, status: StatusCode, error: Option<&str>) -> Response {
    let users = match user_service::get_all_users(state).await {
        Ok(u) => u,
        Err(e) => return bare_error(e),
    };

    let message = if users.is_empty() { "No user to show" } else { "" };

    page(
        state,
        status,
        "Users",
        "index",
        json!({ "users": users, "message": message }),
        error,
    )
}

// used when even the users table cannot be loaded
fn bare_error(err: ServiceError) -> Response {
    if let ServiceError::Store(e) = &err {
        tracing::error!(error = %e, "store failure");
    }
    (err.status(), Html(err.public_message())).into_response()
}

async fn service_failure(state: &AppState, err: ServiceError) -> Response {
    if matches!(err, ServiceError::Store(_)) {
        return bare_error(err);
    }

    users_page(state, err.status(), Some(&err.public_message())).await
}

// GET /
pub async fn index(State(state): State<AppState>) -> Response {
    users_page(&state, StatusCode::OK, None).await
}

// GET /newUser
pub async fn new_user(State(state): State<AppState>) -> Response {
    page(
        &state,
        StatusCode::OK,
        "Edit User",
        "edit_user",
        json!({ "user": { "balance": 0 }, "message": "" }),
        None,
    )
}

// GET /editUser/:id
pub async fn edit_user(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let user = match user_service::get_user_by_id(&state, id).await {
        Ok(u) => u,
        Err(e) => return service_failure(&state, e).await,
    };

    let message = match user {
        Some(_) => String::new(),
        None => format!("No user found with id: {id}"),
    };

    page(
        &state,
        StatusCode::OK,
        "Edit User",
        "edit_user",
        json!({ "user": user, "message": message }),
        None,
    )
}

#[derive(Deserialize)]
pub struct UserForm {
    #[serde(default)]
    pub id: Option<String>,
    pub username: String,
    pub name: String,
    pub email: String,
    pub balance: String,
}

fn parse_id(raw: Option<&str>) -> Result<Option<i64>, String> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse::<i64>()
            .map(Some)
            .map_err(|_| "Invalid id.".to_string()),
    }
}

fn validate_user_form(form: &UserForm) -> Result<(Option<i64>, User), String> {
    let id = parse_id(form.id.as_deref())?;

    let username = form.username.trim();
    if username.is_empty() {
        return Err("Username is required.".to_string());
    }

    let email = form.email.trim();
    if !EMAIL_RE.is_match(email) {
        return Err("Please enter a valid email address.".to_string());
    }

    let balance: i64 = form
        .balance
        .trim()
        .parse()
        .map_err(|_| "Balance must be a whole number.".to_string())?;

    Ok((id, User::new(id, username, form.name.trim(), email, balance)))
}

// POST /saveUser  (insert when the id field is empty, update otherwise)
pub async fn save_user(State(state): State<AppState>, Form(form): Form<UserForm>) -> Response {
    let (id, user) = match validate_user_form(&form) {
        Ok(v) => v,
        Err(msg) => {
            return page(
                &state,
                StatusCode::BAD_REQUEST,
                "Edit User",
                "edit_user",
                json!({
                    "user": {
                        "id": form.id,
                        "username": form.username,
                        "name": form.name,
                        "email": form.email,
                        "balance": form.balance,
                    },
                    "message": "",
                }),
                Some(&msg),
            );
        }
    };

    let saved = match id {
        None => user_service::insert_new_user(&state, user).await,
        Some(id) => user_service::update_user_by_id(&state, id, user).await,
    };

    match saved {
        Ok(_) => Redirect::to("/").into_response(),
        Err(e) => service_failure(&state, e).await,
    }
}

// GET /users/:id/handle_balance
pub async fn handle_balance(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let user = match user_service::get_user_by_id(&state, id).await {
        Ok(u) => u,
        Err(e) => return service_failure(&state, e).await,
    };

    let message = match user {
        Some(_) => String::new(),
        None => format!("No user found with id: {id}"),
    };

    page(
        &state,
        StatusCode::OK,
        "Handle Balance",
        "handle_balance",
        json!({ "user": user, "message": message }),
        None,
    )
}

#[derive(Deserialize)]
pub struct AmountForm {
    pub amount: String,
}

fn parse_amount(form: &AmountForm) -> Option<i64> {
    form.amount.trim().parse().ok()
}

// POST /users/:id/deposit
pub async fn deposit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<AmountForm>,
) -> Response {
    let Some(amount) = parse_amount(&form) else {
        return users_page(
            &state,
            StatusCode::BAD_REQUEST,
            Some("There was an error with the amount!"),
        )
        .await;
    };

    match user_service::deposit(&state, id, amount).await {
        Ok(()) => Redirect::to("/").into_response(),
        Err(e) => service_failure(&state, e).await,
    }
}

// POST /users/:id/withdraw
pub async fn withdraw(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<AmountForm>,
) -> Response {
    let Some(amount) = parse_amount(&form) else {
        return users_page(
            &state,
            StatusCode::BAD_REQUEST,
            Some("There was an error with the amount!"),
        )
        .await;
    };

    match user_service::withdraw(&state, id, amount).await {
        Ok(()) => Redirect::to("/").into_response(),
        Err(e) => service_failure(&state, e).await,
    }
}
