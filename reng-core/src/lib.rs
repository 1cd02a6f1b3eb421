//! Core types for reng
//!
//! This crate provides a convenience layer over a component view tree and a
//! Redux-style store: views declare their state slices, reducers declare
//! explicit action routes, and one store per page owns the state and pushes
//! every change back into the view tree.
//!
//! # Core Concepts
//!
//! - **Action**: a kind string plus a dynamic JSON payload
//! - **Routes**: explicit action-kind → handler tables
//! - **Slices**: declarative per-key composition of child reducers
//! - **Reducer**: a stateful per-view controller with an init transition
//! - **Store**: queue-before-init, sync and deferred dispatch, change listener
//! - **Page**: assembles configuration, services, store, and the root view
//!
//! # Basic Example
//!
//! ```
//! use reng_core::prelude::*;
//! use serde_json::json;
//!
//! let count = ReducerDef::builder()
//!     .route("Increment", |_ctx, state, _action| {
//!         json!(state.as_i64().unwrap_or(0) + 1)
//!     })
//!     .build()
//!     .unwrap();
//!
//! let slices = Slices::new().child("count", count).literal("title", "Count");
//! let mut page = Page::load(slices, json!({"count": 0}), AppConfig::new());
//!
//! page.dispatch_sync(Action::new("Increment"));
//! assert_eq!(page.state(), json!({"count": 1, "title": "Count"}));
//! ```
//!
//! # Async Handler Pattern
//!
//! Route handlers are synchronous; async work (HTTP, timers) goes through
//! the context's task manager and reports back as a follow-up action:
//!
//! ```ignore
//! .route("Fetch", |ctx, state, _action| {
//!     let http = ctx.http().clone();
//!     ctx.tasks().spawn("fetch", async move {
//!         match http.request(HttpRequest::get("http://host/items")).await {
//!             Ok(items) => Action::new("DidFetch").with("args", items),
//!             Err(e) => Action::new("DidFetchError").with("args", json!(e.to_string())),
//!         }
//!     });
//!     state
//! })
//! ```
//!
//! The follow-up arrives like any other deferred action on the next pump
//! turn. The `Did*` naming convention identifies result actions.

pub mod action;
pub mod compose;
pub mod config;
pub mod debug;
pub mod errors;
pub mod http;
pub mod page;
pub mod reducer;
pub mod routes;
pub mod services;
pub mod storage;
pub mod store;
pub mod tasks;
pub mod testing;
pub mod view;

pub use action::{Action, INIT_KIND};
pub use compose::{Composed, Slice, Slices};
pub use config::{
    AppConfig, DebugConfig, HttpConfig, NavigateFn, PageConfig, StorageConfig, StoreConfig, TickFn,
};
pub use debug::{DebugLog, DebugLogger, DebugSink};
pub use errors::{ErrorHook, Errors};
pub use http::{Http, HttpError, HttpRequest, RequestFn, RequestOverride, RouteReply};
pub use page::Page;
pub use reducer::{Reducer, ReducerCtx, ReducerDef, ReducerDefBuilder};
pub use routes::{DefError, Handler, Routes, RoutesBuilder};
pub use services::{Env, Services};
pub use storage::{Storage, StorageArea};
pub use store::{
    ActionNotice, ActionNotify, DispatchHandle, NotifyFn, ReducerOverride, Store,
};
pub use tasks::{TaskKey, TaskManager};
pub use view::{EmitTarget, Emitter, View, ViewBinding};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::action::{Action, INIT_KIND};
    pub use crate::compose::{Slice, Slices};
    pub use crate::config::AppConfig;
    pub use crate::http::{HttpRequest, RequestOverride, RouteReply};
    pub use crate::page::Page;
    pub use crate::reducer::{ReducerCtx, ReducerDef};
    pub use crate::store::{ActionNotify, DispatchHandle, ReducerOverride, Store};
    pub use crate::view::{EmitTarget, Emitter, View, ViewBinding};
}
