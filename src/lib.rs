//! Library entrypoint for the e-commerce manager.
//!
//! `main.rs` only wires configuration, logging and the store together; the
//! integration tests under `tests/` build the same router over an in-memory
//! store.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod models;
pub mod repositories;
pub mod services;

#[path = "views/render.rs"]
pub mod render;
#[path = "views/templates.rs"]
pub mod templates;

pub mod controllers;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub hbs: templates::Hbs,
    pub store: Arc<dyn repositories::Store>,
    pub settings: config::Settings,
}

impl AppState {
    pub fn new(store: Arc<dyn repositories::Store>, settings: config::Settings) -> Self {
        Self {
            hbs: templates::build_handlebars(),
            store,
            settings,
        }
    }
}
