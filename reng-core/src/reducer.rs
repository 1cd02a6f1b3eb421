//! Per-view reducers: definition objects, contexts, and the reduce pipeline

use std::rc::Rc;

use serde_json::{json, Map, Value};

use crate::action::Action;
use crate::compose::{Composed, Slices};
use crate::routes::{DefError, Handler, Routes, RoutesBuilder};
use crate::services::{Env, Services};
use crate::store::DispatchHandle;
use crate::tasks::TaskManager;

/// Hook invoked once, right after a reducer instance is constructed.
pub type InitHook = Rc<dyn Fn(&mut ReducerCtx)>;

/// A reducer definition: explicit routes, slice composition, and an optional
/// construction hook, declared up front and shared (`Rc`) between every
/// instance built from it.
///
/// # Example
/// ```
/// use reng_core::ReducerDef;
/// use serde_json::json;
///
/// let def = ReducerDef::builder()
///     .route("Increment", |_ctx, state, _action| {
///         json!(state.as_i64().unwrap_or(0) + 1)
///     })
///     .build()
///     .unwrap();
/// assert_eq!(def.routes().len(), 1);
/// ```
pub struct ReducerDef {
    routes: Routes,
    slices: Slices,
    on_init: Option<InitHook>,
}

impl ReducerDef {
    /// Start building a definition.
    pub fn builder() -> ReducerDefBuilder {
        ReducerDefBuilder::default()
    }

    /// The route table.
    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    /// The declared slice composition.
    pub fn slices(&self) -> &Slices {
        &self.slices
    }
}

impl std::fmt::Debug for ReducerDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReducerDef")
            .field("routes", &self.routes)
            .field("slices", &self.slices)
            .field("has_on_init", &self.on_init.is_some())
            .finish()
    }
}

/// Builder for [`ReducerDef`].
#[derive(Default)]
pub struct ReducerDefBuilder {
    routes: RoutesBuilder,
    slices: Slices,
    on_init: Option<InitHook>,
}

impl ReducerDefBuilder {
    /// Register a route handler for an action kind.
    pub fn route<F>(mut self, kind: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut ReducerCtx, Value, &Action) -> Value + 'static,
    {
        self.routes = self.routes.on(kind, handler);
        self
    }

    /// Declare the slice composition.
    pub fn slices(mut self, slices: Slices) -> Self {
        self.slices = slices;
        self
    }

    /// Set the construction hook.
    pub fn on_init<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut ReducerCtx) + 'static,
    {
        self.on_init = Some(Rc::new(hook));
        self
    }

    /// Build the shared definition. Fails on duplicate or empty route kinds.
    pub fn build(self) -> Result<Rc<ReducerDef>, DefError> {
        Ok(Rc::new(ReducerDef {
            routes: self.routes.build()?,
            slices: self.slices,
            on_init: self.on_init,
        }))
    }
}

/// Context handed to every route handler and init hook.
///
/// Carries the shared services (resolved once at construction), a dispatch
/// handle for follow-up actions, a task manager for async work, and a
/// reducer-local `data` scratch value that lives as long as the reducer.
pub struct ReducerCtx {
    services: Rc<Services>,
    dispatch: DispatchHandle,
    tasks: TaskManager,
    /// Reducer-local scratch data, not part of the store state.
    pub data: Value,
}

impl ReducerCtx {
    fn new(env: Env) -> Self {
        let tasks = TaskManager::new(env.dispatch.clone());
        Self {
            services: env.services,
            dispatch: env.dispatch,
            tasks,
            data: json!({}),
        }
    }

    /// The shared services for this page.
    pub fn services(&self) -> &Services {
        &self.services
    }

    /// The HTTP service. `Http` is `Clone + Send`, so handlers can move a
    /// copy into spawned tasks.
    pub fn http(&self) -> &crate::http::Http {
        &self.services.http
    }

    /// The errors service.
    pub fn errors(&self) -> &crate::errors::Errors {
        &self.services.errors
    }

    /// The storage service.
    pub fn storage(&self) -> &crate::storage::Storage {
        &self.services.storage
    }

    /// The debug logging service.
    pub fn debug(&self) -> &crate::debug::DebugLog {
        &self.services.debug
    }

    /// The application configuration.
    pub fn config(&self) -> &crate::config::AppConfig {
        self.services.config()
    }

    /// The application input captured at page load.
    pub fn app_input(&self) -> &Value {
        self.services.app_input()
    }

    /// A cloneable dispatch handle for follow-up actions.
    pub fn handle(&self) -> DispatchHandle {
        self.dispatch.clone()
    }

    /// Dispatch a follow-up action (deferred, fire-and-forget).
    pub fn dispatch(&self, action: Action) {
        self.dispatch.dispatch(action);
    }

    /// Dispatch a follow-up event action with an `args` payload, the way
    /// async handlers report completion.
    pub fn emit(&self, kind: impl Into<String>, args: Value) {
        self.dispatch.dispatch(Action::new(kind).with("args", args));
    }

    /// The keyed task manager for this reducer's async work.
    pub fn tasks(&mut self) -> &mut TaskManager {
        &mut self.tasks
    }
}

/// A stateful reducer instance bound to one view.
///
/// Two conceptual states: uninitialized (just constructed) and active (after
/// the reserved init action has been seen once). `reduce` answers the init
/// action with the configured initial state; every other action runs the
/// composed children first and then the matched route handler, if any.
pub struct Reducer {
    initial: Value,
    routes: Routes,
    composed: Composed,
    ctx: ReducerCtx,
}

impl Reducer {
    /// Instantiate a reducer from a definition.
    ///
    /// `initial` defaults to an empty object. `owner_input` seeds the
    /// definition's child slices and is threaded down to nested children,
    /// mirroring how a view's input feeds its whole reducer tree.
    pub fn new(def: &Rc<ReducerDef>, env: Env, initial: Option<Value>, owner_input: &Value) -> Self {
        let composed = def.slices.compose(&env, owner_input);
        let mut ctx = ReducerCtx::new(env);
        if let Some(hook) = &def.on_init {
            hook(&mut ctx);
        }
        Self {
            initial: initial.unwrap_or_else(|| Value::Object(Map::new())),
            routes: def.routes.clone(),
            composed,
            ctx,
        }
    }

    /// The configured initial state.
    pub fn initial_state(&self) -> &Value {
        &self.initial
    }

    /// The reducer context (services, dispatch, scratch data).
    pub fn ctx(&self) -> &ReducerCtx {
        &self.ctx
    }

    /// Mutable access to the reducer context.
    pub fn ctx_mut(&mut self) -> &mut ReducerCtx {
        &mut self.ctx
    }

    /// Execute an action against the state, returning the new state.
    pub fn reduce(&mut self, state: &Value, action: &Action) -> Value {
        if action.is_init() {
            return self.initial.clone();
        }
        self.handle_action(state, action)
    }

    /// Composed children run first, unconditionally; then the matched route
    /// handler receives the post-composition state. No match is a no-op.
    fn handle_action(&mut self, state: &Value, action: &Action) -> Value {
        let result = self.composed.reduce(state, action);
        let handler: Option<Handler> = self.routes.get(action.kind()).cloned();
        match handler {
            Some(handler) => handler(&mut self.ctx, result, action),
            None => result,
        }
    }
}
