use std::{net::SocketAddr, sync::Arc};

use tracing_subscriber::EnvFilter;

use ecommerce_manager::{
    AppState,
    config::{self, StoreKind},
    repositories::{MemoryStore, MongoStore, Store},
    routes,
};

#[tokio::main]
async fn main() {
    let settings = config::load();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .init();

    let store: Arc<dyn Store> = match settings.store {
        StoreKind::Memory => {
            tracing::warn!("using the in-memory store, data is lost on exit");
            Arc::new(MemoryStore::new())
        }
        StoreKind::Mongo => {
            let mongo = MongoStore::connect(&settings.mongodb_uri, &settings.mongodb_db)
                .await
                .expect("Failed to connect to MongoDB");
            mongo
                .ensure_indexes()
                .await
                .expect("Failed to prepare MongoDB collections");
            tracing::info!(db = %settings.mongodb_db, "using the mongodb store");
            Arc::new(mongo)
        }
    };

    let host = settings
        .host
        .parse::<std::net::IpAddr>()
        .expect("HOST must be an IP address");
    let addr = SocketAddr::from((host, settings.port));

    let app = routes::app(AppState::new(store, settings));

    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("server error");
}
