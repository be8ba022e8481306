use serde_json::json;

use crate::AppState;

/// Wraps an already rendered page body in the base layout.
pub fn render_full(
    state: &AppState,
    title: &str,
    body_html: String,
    error: Option<&str>,
) -> Result<String, String> {
    let ctx = json!({
        "title": title,
        "body": body_html,
        "error": error,
    });

    state
        .hbs
        .render("layouts/base", &ctx)
        .map_err(|e| e.to_string())
}

/// Renders `pages/{page}` with `ctx` and wraps it in the layout.
pub fn render_page(
    state: &AppState,
    title: &str,
    page: &str,
    ctx: serde_json::Value,
    error: Option<&str>,
) -> Result<String, String> {
    let body = state
        .hbs
        .render(&format!("pages/{page}"), &ctx)
        .map_err(|e| e.to_string())?;

    render_full(state, title, body, error)
}
