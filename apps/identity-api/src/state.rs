//! Shared application state.

use mongodb::{Client, Database};

/// Cloned into each router that needs it; MongoDB handles share one pool.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// Present only for the MongoDB store
    pub mongo: Option<MongoHandles>,
}

#[derive(Clone)]
pub struct MongoHandles {
    pub client: Client,
    pub db: Database,
}
