//! reng: views, reducers, and one store per page
//!
//! A convenience layer over a component view tree and a Redux-style store.
//! Views declare the state slices they own, reducers declare explicit
//! action routes, and the page's store queues, reduces, and pushes every
//! state change back into the view tree.
//!
//! # Example
//! ```
//! use reng::prelude::*;
//! use serde_json::json;
//!
//! let count = ReducerDef::builder()
//!     .route("Increment", |_ctx, state, _action| {
//!         json!(state.as_i64().unwrap_or(0) + 1)
//!     })
//!     .build()
//!     .unwrap();
//!
//! let slices = Slices::new().child("count", count);
//! let mut page = Page::load(slices, json!({"count": 4}), AppConfig::new());
//! page.dispatch_sync(Action::new("Increment"));
//! assert_eq!(page.state(), json!({"count": 5}));
//! ```

// Re-export everything from core
pub use reng_core::*;

/// Prelude for convenient imports
pub mod prelude {
    pub use reng_core::prelude::*;

    // Services
    pub use reng_core::{DebugLog, Env, Errors, Http, HttpError, Services, Storage};

    // Tasks
    pub use reng_core::tasks::{TaskKey, TaskManager};

    // Test harness
    pub use reng_core::testing::{ActionRecorder, ReducerView, TestHarness};
}
