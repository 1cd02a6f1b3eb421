//! Page assembly: configuration, services, store, and root view
//!
//! `Page::load` is the one place the pieces meet. It builds the services
//! from the configuration, creates the store over the captured input,
//! constructs the root view against the resulting environment, binds the
//! view to the store, and initializes the store so queued actions replay.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::action::Action;
use crate::compose::Slices;
use crate::config::{AppConfig, TickFn};
use crate::services::{Env, Services};
use crate::store::{DispatchHandle, Store};
use crate::view::{Emitter, View, ViewBinding};

/// A loaded page: one store, one service set, one root view.
pub struct Page {
    services: Rc<Services>,
    store: Store,
    root: Rc<dyn ViewBinding>,
    view: Option<Rc<View>>,
    title: RefCell<String>,
    tick_running: Rc<Cell<bool>>,
}

/// Run the render callback unless a tick is already in progress. The guard
/// is shared between [`Page::tick`] and the store's change listener, so a
/// render that triggers another state change cannot recurse into itself.
fn guarded_tick(guard: &Cell<bool>, on_tick: &TickFn) {
    if guard.get() {
        return;
    }
    guard.set(true);
    on_tick();
    guard.set(false);
}

impl Page {
    /// Load a page whose root view is built from a slice map. The view's
    /// emitter dispatches into the store, so emitted events become actions.
    pub fn load(slices: Slices, input: Value, config: AppConfig) -> Self {
        let view_slot = Rc::new(RefCell::new(None));
        let capture = view_slot.clone();
        let mut page = Self::load_with(input.clone(), config, move |env| {
            let view = View::new(env)
                .with_slices(slices)
                .with_emitter(Emitter::dispatching())
                .with_input(input)
                .shared();
            *capture.borrow_mut() = Some(view.clone());
            view
        });
        page.view = view_slot.borrow_mut().take();
        page
    }

    /// Load a page with a caller-built root view.
    pub fn load_with<F, V>(input: Value, config: AppConfig, build_view: F) -> Self
    where
        F: FnOnce(Env) -> Rc<V>,
        V: ViewBinding + 'static,
    {
        let config = Rc::new(config);
        let services = Services::build(config.clone(), input.clone());
        let mut store = Store::new(input)
            .with_overrides(config.store.reducer.clone())
            .with_notify(config.store.action.clone());

        let env = Env {
            services: services.clone(),
            dispatch: store.handle(),
        };
        let root: Rc<dyn ViewBinding> = build_view(env);
        store.bind_view(root.clone());
        let tick_running = Rc::new(Cell::new(false));
        if let Some(on_tick) = &config.page.on_tick {
            let on_tick = on_tick.clone();
            let guard = tick_running.clone();
            store.set_ticker(Rc::new(move || guarded_tick(&guard, &on_tick)));
        }
        store.init();

        let title = config.page.title.clone().unwrap_or_default();
        Self {
            services,
            store,
            root,
            view: None,
            title: RefCell::new(title),
            tick_running,
        }
    }

    /// The shared services for this page.
    pub fn services(&self) -> &Rc<Services> {
        &self.services
    }

    /// The root view, when it was built by [`Page::load`].
    pub fn view(&self) -> Option<&Rc<View>> {
        self.view.as_ref()
    }

    /// The root view binding.
    pub fn root(&self) -> &Rc<dyn ViewBinding> {
        &self.root
    }

    /// The current store state.
    pub fn state(&self) -> Value {
        self.store.state()
    }

    /// A dispatch handle into this page's store.
    pub fn handle(&self) -> DispatchHandle {
        self.store.handle()
    }

    /// Dispatch an action (deferred).
    pub fn dispatch(&self, action: Action) {
        self.store.dispatch(action);
    }

    /// Dispatch an action synchronously.
    pub fn dispatch_sync(&mut self, action: Action) {
        self.store.dispatch_sync(action);
    }

    /// Deliver currently queued deferred actions. Returns how many ran.
    pub fn pump(&mut self) -> usize {
        self.store.pump()
    }

    /// Drive the page's store until cancelled.
    pub async fn run(&mut self, cancel: CancellationToken) {
        self.store.run(cancel).await;
    }

    /// The page title.
    pub fn title(&self) -> String {
        self.title.borrow().clone()
    }

    /// Set the page title.
    pub fn set_title(&self, value: impl Into<String>) {
        *self.title.borrow_mut() = value.into();
    }

    /// Run the configured render tick. Reentrant calls are ignored, both
    /// here and on the store's change-listener path, which shares the same
    /// guard.
    pub fn tick(&self) {
        if let Some(on_tick) = &self.services.config().page.on_tick {
            guarded_tick(&self.tick_running, on_tick);
        }
    }

    /// Navigate to a URL through the configured navigation override. With
    /// no override the request is only logged; there is no browser here.
    pub fn navigate(&self, url: &str) {
        match &self.services.config().page.navigate {
            Some(navigate) => navigate(url),
            None => tracing::info!(%url, "navigate requested without a handler"),
        }
    }
}
