//! Shared services, built once per page from the configuration
//!
//! Views and reducers receive these by `Rc` at construction time; there is
//! no ambient registry to pull from, and no lazy resolution to fail later.

use std::rc::Rc;

use serde_json::Value;

use crate::config::AppConfig;
use crate::debug::DebugLog;
use crate::errors::Errors;
use crate::http::Http;
use crate::storage::Storage;
use crate::store::DispatchHandle;

/// The shared service set for one page.
pub struct Services {
    /// Error sink.
    pub errors: Errors,
    /// Session/local storage.
    pub storage: Storage,
    /// HTTP requests.
    pub http: Http,
    /// Debug logging.
    pub debug: DebugLog,
    config: Rc<AppConfig>,
    input: Value,
}

impl Services {
    /// Build every service from the configuration and captured app input.
    pub fn build(config: Rc<AppConfig>, input: Value) -> Rc<Self> {
        Rc::new(Self {
            errors: Errors::new(config.errors.clone()),
            storage: Storage::new(&config.storage),
            http: Http::new(config.http.request.clone()),
            debug: DebugLog::new(config.debug.sink.clone()),
            config: config.clone(),
            input,
        })
    }

    /// The application configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The application input captured at page load.
    pub fn app_input(&self) -> &Value {
        &self.input
    }
}

/// What a view or reducer needs to participate in the reduce pipeline:
/// the shared services plus a dispatch handle into the page's store.
#[derive(Clone)]
pub struct Env {
    /// Shared services.
    pub services: Rc<Services>,
    /// Handle for dispatching into the page's store.
    pub dispatch: DispatchHandle,
}
