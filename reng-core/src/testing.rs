//! Test utilities for exercising pages and reducers headlessly
//!
//! Nothing here touches a renderer. A harness loads a real page (real
//! store, real services) with the action-notification hook wired to a
//! recorder, so tests drive semantic actions and assert on state and on
//! the actions that flowed through.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::action::Action;
use crate::compose::Slices;
use crate::config::AppConfig;
use crate::page::Page;
use crate::reducer::{Reducer, ReducerDef};
use crate::services::{Env, Services};
use crate::store::{ActionNotice, ActionNotify, DispatchHandle};
use crate::view::ViewBinding;

/// A minimal environment for unit-testing reducers and views without a
/// store: default services plus a dispatch handle backed by a raw channel.
/// The receiver lets the test observe everything dispatched.
pub fn test_env() -> (Env, mpsc::UnboundedReceiver<Action>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let env = Env {
        services: Services::build(Rc::new(AppConfig::new()), Value::Object(serde_json::Map::new())),
        dispatch: DispatchHandle::from_sender(tx),
    };
    (env, rx)
}

/// Records every action notice flowing through a store.
#[derive(Clone, Default)]
pub struct ActionRecorder {
    seen: Rc<RefCell<Vec<ActionNotice>>>,
}

impl ActionRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// The notification hook to install in a store configuration.
    pub fn notify(&self) -> ActionNotify {
        let seen = self.seen.clone();
        ActionNotify::All(Rc::new(move |notice: &ActionNotice| {
            seen.borrow_mut().push(notice.clone());
        }))
    }

    /// Every recorded notice, in order.
    pub fn notices(&self) -> Vec<ActionNotice> {
        self.seen.borrow().clone()
    }

    /// The recorded action kinds, in order.
    pub fn kinds(&self) -> Vec<String> {
        self.seen.borrow().iter().map(|n| n.action.clone()).collect()
    }

    /// The most recent notice for the given kind.
    pub fn last(&self, kind: &str) -> Option<ActionNotice> {
        self.seen
            .borrow()
            .iter()
            .rev()
            .find(|n| n.action == kind)
            .cloned()
    }

    /// Whether the given kind was recorded at least once.
    pub fn contains(&self, kind: &str) -> bool {
        self.seen.borrow().iter().any(|n| n.action == kind)
    }

    /// How many notices were recorded.
    pub fn len(&self) -> usize {
        self.seen.borrow().len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.seen.borrow().is_empty()
    }
}

/// A loaded page plus an action recorder, for end-to-end tests.
pub struct TestHarness {
    page: Page,
    recorder: ActionRecorder,
}

impl TestHarness {
    /// Load a page from a slice map, recording every dispatched action.
    pub fn load(slices: Slices, input: Value, config: AppConfig) -> Self {
        let recorder = ActionRecorder::new();
        let page = Page::load(slices, input, config.action_notify(recorder.notify()));
        Self { page, recorder }
    }

    /// Load a page around a single reducer definition, the way a view
    /// hosting exactly that reducer would.
    pub fn load_reducer(def: Rc<ReducerDef>, input: Value, config: AppConfig) -> Self {
        let recorder = ActionRecorder::new();
        let config = config.action_notify(recorder.notify());
        let page = Page::load_with(input.clone(), config, move |env| {
            Rc::new(ReducerView::new(&def, env, input))
        });
        Self { page, recorder }
    }

    /// The page under test.
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// The action recorder.
    pub fn recorder(&self) -> &ActionRecorder {
        &self.recorder
    }

    /// The current store state.
    pub fn state(&self) -> Value {
        self.page.state()
    }

    /// Dispatch an action synchronously.
    pub fn dispatch_sync(&mut self, action: Action) {
        self.page.dispatch_sync(action);
    }

    /// Dispatch an action (deferred).
    pub fn dispatch(&self, action: Action) {
        self.page.dispatch(action);
    }

    /// Deliver currently queued deferred actions.
    pub fn pump(&mut self) -> usize {
        self.page.pump()
    }

    /// Pump until no more deferred actions arrive. Yields between rounds
    /// so spawned tasks can complete and dispatch their follow-ups.
    pub async fn settle(&mut self) {
        loop {
            tokio::time::sleep(Duration::from_millis(5)).await;
            if self.page.pump() == 0 {
                break;
            }
        }
    }

    /// Pump until an action of the given kind has been recorded, up to
    /// `timeout`. Returns its notice, or `None` on timeout.
    pub async fn wait_for(&mut self, kind: &str, timeout: Duration) -> Option<ActionNotice> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            self.page.pump();
            if let Some(notice) = self.recorder.last(kind) {
                return Some(notice);
            }
            if tokio::time::Instant::now() >= deadline {
                return None;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

/// A view binding that hosts one reducer, so a store can drive it directly.
pub struct ReducerView {
    input: RefCell<Value>,
    reducer: RefCell<Reducer>,
}

impl ReducerView {
    /// Build the binding, seeding the reducer's initial state from `input`.
    pub fn new(def: &Rc<ReducerDef>, env: Env, input: Value) -> Self {
        let reducer = Reducer::new(def, env, Some(input.clone()), &input);
        Self {
            input: RefCell::new(input),
            reducer: RefCell::new(reducer),
        }
    }
}

impl ViewBinding for ReducerView {
    fn set_input(&self, value: Value) {
        *self.input.borrow_mut() = value;
    }

    fn input(&self) -> Value {
        self.input.borrow().clone()
    }

    fn do_reduce(&self, state: &Value, action: &Action) -> Value {
        self.reducer.borrow_mut().reduce(state, action)
    }
}
