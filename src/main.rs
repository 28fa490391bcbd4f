use std::net::SocketAddr;
use std::sync::Arc;

use lang_vote::config::{Config, MEMORY_STORE_URL};
use lang_vote::db::{Database, MemoryStore, VoteStore};
use lang_vote::{AppState, router};
use log::{error, info, warn};

#[tokio::main]
async fn main() {
    // Initialize logging
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };

    // Initialize vote store
    let store: Arc<dyn VoteStore> = if config.database_url == MEMORY_STORE_URL {
        warn!("Using in-memory vote store, votes will not survive a restart");
        Arc::new(MemoryStore::new())
    } else {
        match Database::new(&config.database_url).await {
            Ok(db) => Arc::new(db),
            Err(e) => {
                error!("Failed to initialize database: {}", e);
                return;
            }
        }
    };

    match store.count().await {
        Ok(total) => info!("Vote store ready with {} vote(s)", total),
        Err(e) => warn!("Vote store is up but could not be counted: {}", e),
    }

    let app = router(AppState::new(store, config.admin));

    let addr = SocketAddr::new(config.bind_addr, config.port);
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            return;
        }
    };
    info!("Listening on {}", addr);

    if let Err(why) = axum::serve(listener, app).await {
        error!("Server error: {:?}", why);
    }
}
