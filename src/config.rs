use std::env;

/// Which storage backend the server runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Mongo,
    Memory,
}

impl StoreKind {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Some(StoreKind::Mongo),
            "memory" | "mem" => Some(StoreKind::Memory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub store: StoreKind,
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub host: String,
    pub port: u16,

    // default filter when RUST_LOG is unset
    pub log_filter: String,
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    // unknown values fall back to mongo; main logs the backend it picked
    let store = env::var("STORE")
        .ok()
        .and_then(|s| StoreKind::parse(&s))
        .unwrap_or(StoreKind::Mongo);

    let mongodb_uri = env::var("MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

    let mongodb_db = env::var("MONGODB_DB")
        .unwrap_or_else(|_| "ecommerce".to_string());

    let host = env::var("HOST")
        .unwrap_or_else(|_| "127.0.0.1".to_string());

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let log_filter = env::var("LOG_FILTER").unwrap_or_else(|_| "info,tower_http=info".to_string());

    Settings {
        store,
        mongodb_uri,
        mongodb_db,
        host,
        port,
        log_filter,
    }
}
