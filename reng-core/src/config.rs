//! Application configuration
//!
//! One plain struct threaded through page construction. Test escape hatches
//! (reducer overrides, action notification, request overrides, storage
//! seeds) all live here; nothing is pulled from ambient globals.

use std::collections::HashMap;
use std::rc::Rc;

use serde_json::{Map, Value};

use crate::debug::DebugSink;
use crate::errors::ErrorHook;
use crate::http::RequestOverride;
use crate::store::{ActionNotify, ReducerOverride};

/// Navigation override: receives the target URL.
pub type NavigateFn = Rc<dyn Fn(&str)>;

/// Render callback invoked after every state change.
pub type TickFn = Rc<dyn Fn()>;

/// Page-level options.
#[derive(Default)]
pub struct PageConfig {
    /// The page title.
    pub title: Option<String>,
    /// Override for `Page::navigate`.
    pub navigate: Option<NavigateFn>,
    /// Render callback fired by the store's change listener.
    pub on_tick: Option<TickFn>,
}

/// Store options.
#[derive(Default)]
pub struct StoreConfig {
    /// Per-kind reducer overrides for deterministic tests: a function, or a
    /// literal patch shallow-merged onto state.
    pub reducer: HashMap<String, ReducerOverride>,
    /// Notification hook invoked after each dispatched action.
    pub action: Option<ActionNotify>,
}

/// HTTP options.
#[derive(Default)]
pub struct HttpConfig {
    /// Request override answering requests without the network.
    pub request: Option<RequestOverride>,
}

/// Storage options.
#[derive(Default)]
pub struct StorageConfig {
    /// Values seeded into session storage.
    pub session: Map<String, Value>,
    /// Values seeded into local storage.
    pub local: Map<String, Value>,
}

/// Debug logging options.
#[derive(Default)]
pub struct DebugConfig {
    /// Custom sink for debug entries; defaults to `tracing`.
    pub sink: Option<DebugSink>,
}

/// Configuration values for the application.
#[derive(Default)]
pub struct AppConfig {
    /// Page options.
    pub page: PageConfig,
    /// Store options.
    pub store: StoreConfig,
    /// HTTP options.
    pub http: HttpConfig,
    /// Storage options.
    pub storage: StorageConfig,
    /// Debug logging options.
    pub debug: DebugConfig,
    /// Error-handling override.
    pub errors: Option<ErrorHook>,
}

impl AppConfig {
    /// An empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.page.title = Some(title.into());
        self
    }

    /// Register a reducer override for one action kind.
    pub fn reducer_override(mut self, kind: impl Into<String>, value: ReducerOverride) -> Self {
        self.store.reducer.insert(kind.into(), value);
        self
    }

    /// Set the action-notification hook.
    pub fn action_notify(mut self, notify: ActionNotify) -> Self {
        self.store.action = Some(notify);
        self
    }

    /// Set the HTTP request override.
    pub fn request_override(mut self, request: RequestOverride) -> Self {
        self.http.request = Some(request);
        self
    }

    /// Seed a session storage value.
    pub fn session_item(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.storage.session.insert(key.into(), value.into());
        self
    }

    /// Seed a local storage value.
    pub fn local_item(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.storage.local.insert(key.into(), value.into());
        self
    }
}
