//! Centralized state store: queued, deferred, and synchronous dispatch
//!
//! One store per page. All state transitions funnel through it, one action
//! at a time:
//!
//! - `dispatch` defers delivery to a later pump turn (fire-and-forget),
//! - `dispatch_sync` delivers immediately,
//! - actions dispatched before `init` are queued and replayed, in order,
//!   once the store comes up,
//! - after every state change the bound view receives the new state as its
//!   input and the page's tick callback runs.
//!
//! Test escape hatches: a per-kind reducer-override map that bypasses the
//! view-driven reduction, and an action-notification hook observing each
//! dispatched kind.

use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::action::Action;
use crate::view::ViewBinding;

/// Reducer override for one action kind.
#[derive(Clone)]
pub enum ReducerOverride {
    /// Shallow-merge this literal patch onto the state.
    Patch(Value),
    /// Replace the reduction with this function.
    Replace(Rc<dyn Fn(&Value, &Action) -> Value>),
}

/// What the action-notification hook receives.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionNotice {
    /// The state after the action was applied.
    pub state: Value,
    /// The kind of the action that was applied.
    pub action: String,
}

/// Notification callback.
pub type NotifyFn = Rc<dyn Fn(&ActionNotice)>;

/// Action-notification hook: a catch-all function or a per-kind map.
#[derive(Clone)]
pub enum ActionNotify {
    /// Invoked for every dispatched action.
    All(NotifyFn),
    /// Invoked only for the listed kinds.
    PerAction(HashMap<String, NotifyFn>),
}

impl ActionNotify {
    fn notify(&self, notice: &ActionNotice) {
        match self {
            ActionNotify::All(hook) => hook(notice),
            ActionNotify::PerAction(map) => {
                if let Some(hook) = map.get(&notice.action) {
                    hook(notice);
                }
            }
        }
    }
}

/// A cloneable, `Send` handle for dispatching into a store from anywhere
/// (views, reducers, and spawned async tasks).
#[derive(Clone)]
pub struct DispatchHandle {
    tx: mpsc::UnboundedSender<Action>,
}

impl DispatchHandle {
    pub(crate) fn from_sender(tx: mpsc::UnboundedSender<Action>) -> Self {
        Self { tx }
    }

    /// Dispatch an action (deferred, fire-and-forget).
    pub fn dispatch(&self, action: Action) {
        let _ = self.tx.send(action);
    }

    /// Dispatch a follow-up event action with an `args` payload.
    pub fn emit(&self, kind: impl Into<String>, args: Value) {
        self.dispatch(Action::new(kind).with("args", args));
    }
}

/// The single owner of current application state for a page.
pub struct Store {
    state: Option<Value>,
    replay: VecDeque<Action>,
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Action>,
    view: Option<Rc<dyn ViewBinding>>,
    ticker: Option<Rc<dyn Fn()>>,
    input: Value,
    overrides: HashMap<String, ReducerOverride>,
    notify: Option<ActionNotify>,
    last_kind: Option<String>,
}

impl Store {
    /// Create a store capturing the application input. The store is not
    /// live until [`Store::init`] runs; earlier dispatches are queued.
    pub fn new(input: Value) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: None,
            replay: VecDeque::new(),
            tx,
            rx,
            view: None,
            ticker: None,
            input,
            overrides: HashMap::new(),
            notify: None,
            last_kind: None,
        }
    }

    /// Set the per-kind reducer overrides.
    pub fn with_overrides(mut self, overrides: HashMap<String, ReducerOverride>) -> Self {
        self.overrides = overrides;
        self
    }

    /// Set the action-notification hook.
    pub fn with_notify(mut self, notify: Option<ActionNotify>) -> Self {
        self.notify = notify;
        self
    }

    /// Bind the view whose composed reduce drives this store and whose
    /// input receives every new state.
    pub fn bind_view(&mut self, view: Rc<dyn ViewBinding>) {
        self.view = Some(view);
    }

    /// Set the tick callback fired after each state change.
    pub fn set_ticker(&mut self, ticker: Rc<dyn Fn()>) {
        self.ticker = Some(ticker);
    }

    /// A dispatch handle for async producers.
    pub fn handle(&self) -> DispatchHandle {
        DispatchHandle {
            tx: self.tx.clone(),
        }
    }

    /// (Re)initialize the store: seed state from the bound view's reduce
    /// of the captured input under the init action, then replay queued
    /// actions in FIFO order. Idempotent; calling again reseeds cleanly.
    pub fn init(&mut self) {
        let seed = match &self.view {
            Some(view) => view.do_reduce(&self.input, &Action::init()),
            None => Value::Object(Map::new()),
        };
        tracing::debug!(queued = self.replay.len(), "store initialized");
        self.state = Some(seed);

        let queued: Vec<Action> = self.replay.drain(..).collect();
        for action in queued {
            self.apply(action);
        }
    }

    /// Whether `init` has run.
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// The current state, or an empty object before initialization.
    pub fn state(&self) -> Value {
        self.state
            .clone()
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    /// The kind of the most recently applied action.
    pub fn last_action(&self) -> Option<&str> {
        self.last_kind.as_deref()
    }

    /// Dispatch an action. Delivery is deferred to the next pump turn;
    /// callers observe eventual, not immediate, consistency.
    pub fn dispatch(&self, action: Action) {
        let _ = self.tx.send(action);
    }

    /// Dispatch an action immediately, synchronously. The full
    /// reduce/listener chain completes before this returns.
    pub fn dispatch_sync(&mut self, action: Action) {
        self.deliver(action);
    }

    /// Run one scheduler turn: drain currently queued deferred actions in
    /// FIFO order. Returns how many actions were delivered.
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok(action) = self.rx.try_recv() {
            self.deliver(action);
            delivered += 1;
        }
        delivered
    }

    /// Drive the store until cancelled, delivering deferred actions as
    /// they arrive.
    pub async fn run(&mut self, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                maybe_action = self.rx.recv() => match maybe_action {
                    Some(action) => self.deliver(action),
                    None => break,
                },
            }
        }
    }

    /// Deliver an action: queue it when the store is not yet live,
    /// otherwise reduce and notify.
    fn deliver(&mut self, action: Action) {
        if self.state.is_none() {
            tracing::debug!(kind = %action.kind(), "store not initialized; queueing action");
            self.replay.push_back(action);
            return;
        }
        self.apply(action);
    }

    fn apply(&mut self, action: Action) {
        tracing::trace!(kind = %action.kind(), "applying action");
        let previous = self.state.take().unwrap_or_else(|| Value::Object(Map::new()));
        let next = self.reduce_state(previous, &action);
        self.state = Some(next);
        self.after_change();
    }

    /// The top-level reduce: overrides win, then the bound view's composed
    /// reduce; with no view the state passes through unchanged.
    fn reduce_state(&mut self, state: Value, action: &Action) -> Value {
        self.last_kind = Some(action.kind().to_string());

        if let Some(over) = self.overrides.get(action.kind()) {
            return match over {
                ReducerOverride::Replace(reduce) => reduce(&state, action),
                ReducerOverride::Patch(patch) => shallow_merge(state, patch),
            };
        }
        match &self.view {
            Some(view) => view.do_reduce(&state, action),
            None => state,
        }
    }

    /// Change listener: push the new state into the view's input, request
    /// a render tick, then fire the action-notification hook.
    fn after_change(&mut self) {
        let state = self.state();
        if let Some(view) = &self.view {
            view.set_input(state.clone());
        }
        if let Some(ticker) = &self.ticker {
            ticker();
        }
        if let (Some(notify), Some(kind)) = (&self.notify, &self.last_kind) {
            notify.notify(&ActionNotice {
                state,
                action: kind.clone(),
            });
        }
    }
}

/// Shallow-merge a literal patch onto a state object. Non-object patches
/// replace the state wholesale.
fn shallow_merge(state: Value, patch: &Value) -> Value {
    match patch {
        Value::Object(fields) => {
            let mut merged = match state {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            for (key, value) in fields {
                merged.insert(key.clone(), value.clone());
            }
            Value::Object(merged)
        }
        other => other.clone(),
    }
}
