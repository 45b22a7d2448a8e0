//! Shipping quote service for rental carts delivered on several dates.

pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod shipping;

use std::sync::Arc;

use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

pub use routes::create_router;
