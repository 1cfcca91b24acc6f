mod config;
mod db;
mod error;
mod handlers;
mod models;
mod voting;

use config::Config;
use db::VoteStore;
use error::StartupError;
use handlers::AppState;
use log::{error, info};
use std::process;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() {
    // Initialize logging
    dotenvy::dotenv().ok();
    env_logger::init();

    let result = match Config::from_env() {
        Ok(config) => run(config).await,
        Err(e) => Err(e.into()),
    };

    // Supervisors need a failing status to tell this apart from a clean shutdown
    if let Err(e) = result {
        error!("{}", e);
        process::exit(1);
    }

    info!("Server shut down");
}

async fn build_state(config: &Config) -> Result<Arc<AppState>, StartupError> {
    // Roster and destinations are fixed for the lifetime of the process
    let catalog = Arc::new(config.load_catalog()?);
    info!(
        "Catalog loaded: {} voters, {} destinations",
        catalog.voters.len(),
        catalog.destinations.len()
    );

    let backend = db::connect(&config.store).await?;

    Ok(Arc::new(AppState {
        store: VoteStore::new(backend, Arc::clone(&catalog)),
        catalog,
    }))
}

async fn run(config: Config) -> Result<(), StartupError> {
    let state = build_state(&config).await?;
    let app = handlers::router(state);

    let address = config.address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;
    info!("Server running on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreKind;
    use crate::error::ConfigError;
    use std::path::PathBuf;

    fn config(catalog_path: Option<&str>) -> Config {
        Config {
            bind_address: "127.0.0.1".into(),
            port: 0,
            store: StoreKind::Memory,
            catalog_path: catalog_path.map(PathBuf::from),
        }
    }

    #[tokio::test]
    async fn missing_catalog_fails_startup() {
        let result = run(config(Some("/nonexistent/catalog.json"))).await;
        assert!(matches!(
            result,
            Err(StartupError::Config(ConfigError::CatalogRead { .. }))
        ));
    }

    #[tokio::test]
    async fn unreachable_store_fails_startup() {
        let mut config = config(None);
        config.store = StoreKind::Sqlite("sqlite:/nonexistent/dir/vote.db".into());
        assert!(matches!(
            build_state(&config).await,
            Err(StartupError::Store(_))
        ));
    }

    #[tokio::test]
    async fn builds_state_from_builtin_catalog() {
        let state = build_state(&config(None)).await.unwrap();
        assert_eq!(state.catalog.voters.len(), 4);
        assert!(state.store.fetch_all_ballots().await.unwrap().is_empty());
    }
}
