//! Bookshelf application library
//!
//! Wires the books module onto the kernel and HTTP crates.

pub mod modules;
pub mod utils;

use std::sync::Arc;

use anyhow::Context;
use bookshelf_kernel::{
    settings::{DatabaseBackend, DatabaseSettings, Settings},
    InitCtx, ModuleRegistry,
};

use modules::books::store::{InMemoryBookStore, MongoBookStore, SharedBookStore};

/// Build the book store selected by `database.backend`
pub async fn connect_store(settings: &DatabaseSettings) -> anyhow::Result<SharedBookStore> {
    match settings.backend {
        DatabaseBackend::Mongo => {
            let database = bookshelf_db::connect(settings).await?;
            Ok(Arc::new(MongoBookStore::new(&database)))
        }
        DatabaseBackend::Memory => {
            tracing::warn!("using the in-memory book store; data is lost on restart");
            Ok(Arc::new(InMemoryBookStore::new()))
        }
    }
}

/// Registry with every application module registered against `store`
pub fn build_registry(settings: &Settings, store: SharedBookStore) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, settings, store)?;
    Ok(registry)
}

/// Run the server until Ctrl-C / SIGTERM
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let store = connect_store(&settings.database)
        .await
        .context("failed to initialize book store")?;
    let registry = build_registry(&settings, store)?;

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let served = bookshelf_http::start_server(&registry, &settings, shutdown_signal()).await;

    registry.stop_modules().await?;
    served
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
