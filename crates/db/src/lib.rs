//! MongoDB connection factory.
//!
//! The returned [`Database`] handle is cheap to clone and is handed to the
//! stores that need it; nothing here keeps a process-wide connection.

use std::time::Duration;

use anyhow::Context;
use bookshelf_kernel::settings::DatabaseSettings;
use mongodb::{bson::doc, options::ClientOptions, Client, Database};

const APP_NAME: &str = "bookshelf";

/// Connect to MongoDB and verify the server answers a `ping`.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Database> {
    let mut options = ClientOptions::parse(settings.uri.as_str())
        .await
        .with_context(|| "failed to parse database.uri")?;
    options.app_name = Some(APP_NAME.to_string());
    options.connect_timeout = Some(Duration::from_millis(settings.connect_timeout_ms));
    options.server_selection_timeout = Some(Duration::from_millis(settings.connect_timeout_ms));

    let client = Client::with_options(options).context("failed to build MongoDB client")?;
    let database = client.database(&settings.name);

    database
        .run_command(doc! { "ping": 1 })
        .await
        .with_context(|| format!("database '{}' did not answer ping", settings.name))?;

    tracing::info!(target: "bookshelf-db", database = %settings.name, "connected to MongoDB");
    Ok(database)
}
