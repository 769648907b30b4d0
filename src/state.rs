//! Application state management
//!
//! Contains shared state accessible across all handlers. Nothing in here is
//! mutable: entities live upstream and the session lives in cookies.

use crate::api::ApiClient;
use crate::config::Settings;
use crate::error::{AppError, AppResult};
use crate::views::Views;
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// Loaded configuration
    pub settings: Settings,

    /// Client for the upstream REST API
    pub api: ApiClient,

    /// Template registry
    pub views: Views,
}

impl AppState {
    pub fn new(settings: Settings) -> AppResult<Self> {
        let api = ApiClient::new(&settings.api)
            .map_err(|e| AppError::Config(format!("HTTP client: {}", e)))?;
        let views = Views::new()?;

        Ok(Self {
            settings,
            api,
            views,
        })
    }

    /// Whether cookies should carry the `Secure` flag
    pub fn secure_cookies(&self) -> bool {
        self.settings.cookie.secure
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
