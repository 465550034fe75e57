//! Document store connector.
//!
//! Builds a MongoDB client from [`DatabaseConfig`], verifies it with a ping
//! and hands out a handle scoped to the configured database and collection.

use std::time::Duration;

use configs::DatabaseConfig;
use mongodb::{bson::doc, options::ClientOptions, Client, Collection};
use tracing::info;

use crate::{car::Car, errors::ModelError};

/// Shared store handle. Cloning is cheap; the driver pools connections internally.
#[derive(Clone, Debug)]
pub struct StoreHandle {
    client: Client,
    cars: Collection<Car>,
}

impl StoreHandle {
    pub fn cars(&self) -> Collection<Car> {
        self.cars.clone()
    }

    /// Liveness check against the `admin` database.
    pub async fn ping(&self) -> Result<(), ModelError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| ModelError::Unreachable(e.to_string()))?;
        Ok(())
    }
}

/// Connect with explicit settings. Fails if the endpoint does not answer a ping.
pub async fn connect_with_config(cfg: &DatabaseConfig) -> Result<StoreHandle, ModelError> {
    let mut options = ClientOptions::parse(cfg.uri.as_str())
        .await
        .map_err(|e| ModelError::InvalidUri(e.to_string()))?;
    options.app_name = Some(cfg.app_name.clone());
    options.server_selection_timeout = Some(Duration::from_secs(cfg.server_selection_timeout_secs));

    let client = Client::with_options(options).map_err(|e| ModelError::InvalidUri(e.to_string()))?;
    let cars = client.database(&cfg.database).collection::<Car>(&cfg.collection);
    let handle = StoreHandle { client, cars };
    handle.ping().await?;

    info!(database = %cfg.database, collection = %cfg.collection, "connected to document store");
    Ok(handle)
}
