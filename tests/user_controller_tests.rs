use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    routing::{get, post},
};
use http_body_util::BodyExt;
use ecommerce_manager::{
    AppState, config, controllers::user_controller, models::User, repositories::MemoryStore,
    routes, services::user_service,
};
use tower::ServiceExt;

fn test_state() -> AppState {
    AppState::new(Arc::new(MemoryStore::new()), config::load())
}

async fn response_body_string(res: axum::response::Response) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).to_string()
}

fn form_post(uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.into()))
        .unwrap()
}

async fn seed_user(state: &AppState, balance: i64) -> i64 {
    let user = User::new(None, "alice", "Alice", "alice@example.com", balance);
    user_service::insert_new_user(state, user).await.unwrap().id.unwrap()
}

#[tokio::test]
async fn index_without_users_shows_placeholder() {
    let app = routes::app(test_state());

    let req = Request::builder().uri("/").body(Body::empty()).unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("No user to show"));
    assert!(!body.contains("user_table"));
}

#[tokio::test]
async fn index_lists_users_with_their_links() {
    let state = test_state();
    let id = seed_user(&state, 250).await;
    let app = routes::app(state);

    let req = Request::builder().uri("/").body(Body::empty()).unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("user_table"));
    assert!(body.contains("alice@example.com"));
    assert!(body.contains(&format!("/editUser/{id}")));
    assert!(body.contains(&format!("/users/{id}/handle_balance")));
}

#[tokio::test]
async fn edit_user_for_unknown_id_renders_message() {
    let state = test_state();
    let app = Router::new()
        .route("/editUser/:id", get(user_controller::edit_user))
        .with_state(state);

    let req = Request::builder().uri("/editUser/42").body(Body::empty()).unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("No user found with id: 42"));
}

#[tokio::test]
async fn save_user_without_id_inserts_and_redirects() {
    let state = test_state();
    let app = Router::new()
        .route("/saveUser", post(user_controller::save_user))
        .with_state(state.clone());

    let req = form_post(
        "/saveUser",
        "id=&username=bob&name=Bob&email=bob%40example.com&balance=300",
    );
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[header::LOCATION], "/");

    let saved = user_service::find_user_by_username(&state, "bob").await.unwrap().unwrap();
    assert_eq!(saved.balance, 300);
    assert_eq!(saved.email, "bob@example.com");
}

#[tokio::test]
async fn save_user_with_id_updates_in_place() {
    let state = test_state();
    let id = seed_user(&state, 10).await;
    let app = Router::new()
        .route("/saveUser", post(user_controller::save_user))
        .with_state(state.clone());

    let body = format!("id={id}&username=alice&name=Alice+B&email=alice%40example.com&balance=20");
    let res = app.oneshot(form_post("/saveUser", body)).await.unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let users = user_service::get_all_users(&state).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].name, "Alice B");
    assert_eq!(users[0].balance, 20);
}

#[tokio::test]
async fn save_user_invalid_email_renders_error() {
    let app = Router::new()
        .route("/saveUser", post(user_controller::save_user))
        .with_state(test_state());

    let req = form_post("/saveUser", "username=bob&name=Bob&email=not-an-email&balance=1");
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = response_body_string(res).await;
    assert!(body.contains("valid email"));
    assert!(body.contains("user_form"));
}

#[tokio::test]
async fn save_user_non_numeric_balance_renders_error() {
    let app = Router::new()
        .route("/saveUser", post(user_controller::save_user))
        .with_state(test_state());

    let req = form_post("/saveUser", "username=bob&name=Bob&email=bob%40example.com&balance=lots");
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = response_body_string(res).await;
    assert!(body.contains("Balance must be a whole number."));
}

#[tokio::test]
async fn handle_balance_shows_current_balance() {
    let state = test_state();
    let id = seed_user(&state, 1234).await;
    let app = routes::app(state);

    let req = Request::builder()
        .uri(format!("/users/{id}/handle_balance"))
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains(&format!("User ID: {id}")));
    assert!(body.contains("Balance: 1234"));
    assert!(body.contains("deposit_form"));
    assert!(body.contains("withdraw_form"));
}

#[tokio::test]
async fn deposit_then_withdraw_through_forms() {
    let state = test_state();
    let id = seed_user(&state, 100).await;
    let app = routes::app(state.clone());

    let res = app
        .clone()
        .oneshot(form_post(&format!("/users/{id}/deposit"), "amount=50"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let res = app
        .oneshot(form_post(&format!("/users/{id}/withdraw"), "amount=150"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let user = user_service::get_user_by_id(&state, id).await.unwrap().unwrap();
    assert_eq!(user.balance, 0);
}

#[tokio::test]
async fn withdraw_over_balance_renders_error() {
    let state = test_state();
    let id = seed_user(&state, 10).await;
    let app = routes::app(state.clone());

    let res = app
        .oneshot(form_post(&format!("/users/{id}/withdraw"), "amount=11"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = response_body_string(res).await;
    assert!(body.contains("Not enough balance to perform withdraw"));

    let user = user_service::get_user_by_id(&state, id).await.unwrap().unwrap();
    assert_eq!(user.balance, 10);
}

#[tokio::test]
async fn deposit_negative_amount_renders_error() {
    let state = test_state();
    let id = seed_user(&state, 10).await;
    let app = routes::app(state);

    let res = app
        .oneshot(form_post(&format!("/users/{id}/deposit"), "amount=-5"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = response_body_string(res).await;
    assert!(body.contains("Deposit amount cannot be negative"));
}

#[tokio::test]
async fn deposit_invalid_amount_renders_error() {
    let state = test_state();
    let id = seed_user(&state, 10).await;
    let app = routes::app(state);

    let res = app
        .oneshot(form_post(&format!("/users/{id}/deposit"), "amount=notanumber"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = response_body_string(res).await.to_lowercase();
    assert!(body.contains("error with the amount"));
}

#[tokio::test]
async fn deposit_for_unknown_user_is_404() {
    let app = routes::app(test_state());

    let res = app
        .oneshot(form_post("/users/99/deposit", "amount=5"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body = response_body_string(res).await;
    assert!(body.contains("User not found"));
}
