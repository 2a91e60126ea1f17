use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use hemascreen::api::server;
use hemascreen::api::types::ApiContext;
use hemascreen::catalog::ReferenceCatalog;
use hemascreen::config;
use hemascreen::db::sqlite::open_database;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let port = std::env::var("SERVER_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(config::DEFAULT_PORT);

    let data_dir = config::data_dir();
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!("Failed to create data directory {:?}: {}", data_dir, e);
        std::process::exit(1);
    }

    let conn = match open_database(&config::db_path()) {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    let catalog = match std::env::var("HEMASCREEN_CATALOG_DIR") {
        Ok(dir) => match ReferenceCatalog::load(&PathBuf::from(dir)) {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::error!("Failed to load reference catalog: {}", e);
                std::process::exit(1);
            }
        },
        Err(_) => ReferenceCatalog::builtin(),
    };
    tracing::info!("Reference catalog loaded: {} entries", catalog.len());

    let ctx = ApiContext::new(conn, catalog);

    if let Err(e) = server::serve(port, ctx).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
