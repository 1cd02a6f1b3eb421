//! Views and the view-to-store binding
//!
//! A [`View`] owns an input value (pushed by the store after every change),
//! a declared slice composition, an event emitter, and view-local scratch
//! data. The [`ViewBinding`] trait is the narrow surface the store needs:
//! set the input, read it back, and delegate reduce calls into the view's
//! composed pipeline.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::{json, Value};

use crate::action::Action;
use crate::compose::{Composed, Slices};
use crate::reducer::{Reducer, ReducerDef};
use crate::services::Env;

/// What the store needs from its bound root view.
pub trait ViewBinding {
    /// Receive the new state as this view's input.
    fn set_input(&self, value: Value);

    /// The current input.
    fn input(&self) -> Value;

    /// Delegate a store reduce call into this view's composed pipeline.
    fn do_reduce(&self, state: &Value, action: &Action) -> Value;
}

/// Where an emitted event goes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmitTarget {
    /// Deliver to manual subscriptions only.
    #[default]
    Event,
    /// Dispatch into the store only.
    Dispatch,
    /// Both of the above.
    Both,
}

/// Emitter configuration for a view: a default target, per-event target
/// overrides, and an event rename map applied before targeting.
#[derive(Clone, Debug, Default)]
pub struct Emitter {
    default_target: EmitTarget,
    per_event: HashMap<String, EmitTarget>,
    rename: HashMap<String, String>,
}

impl Emitter {
    /// The default configuration: every event goes to subscriptions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for an emitter dispatching every event into the store.
    pub fn dispatching() -> Self {
        Self::new().target(EmitTarget::Dispatch)
    }

    /// Set the default target.
    pub fn target(mut self, target: EmitTarget) -> Self {
        self.default_target = target;
        self
    }

    /// Override the target for one event kind (matched after renaming).
    pub fn target_for(mut self, kind: impl Into<String>, target: EmitTarget) -> Self {
        self.per_event.insert(kind.into(), target);
        self
    }

    /// Rename an event kind before it is targeted or delivered.
    pub fn rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.rename.insert(from.into(), to.into());
        self
    }

    fn resolve(&self, kind: &str) -> (String, EmitTarget) {
        let kind = self
            .rename
            .get(kind)
            .cloned()
            .unwrap_or_else(|| kind.to_string());
        let target = self
            .per_event
            .get(&kind)
            .copied()
            .unwrap_or(self.default_target);
        (kind, target)
    }
}

/// Callback registered through [`View::subscribe`].
pub type Subscription = Rc<dyn Fn(&Action)>;

/// A view participating in the reduce pipeline.
pub struct View {
    env: Env,
    input: RefCell<Value>,
    slices: Slices,
    composed: RefCell<Option<Composed>>,
    emitter: Emitter,
    subscriptions: RefCell<HashMap<String, Vec<Subscription>>>,
    data: RefCell<Value>,
}

impl View {
    /// Create a view bound to the given environment.
    pub fn new(env: Env) -> Self {
        Self {
            env,
            input: RefCell::new(Value::Object(serde_json::Map::new())),
            slices: Slices::new(),
            composed: RefCell::new(None),
            emitter: Emitter::new(),
            subscriptions: RefCell::new(HashMap::new()),
            data: RefCell::new(json!({})),
        }
    }

    /// Declare this view's slice composition.
    pub fn with_slices(mut self, slices: Slices) -> Self {
        self.slices = slices;
        self
    }

    /// Set the emitter configuration.
    pub fn with_emitter(mut self, emitter: Emitter) -> Self {
        self.emitter = emitter;
        self
    }

    /// Set the initial input value.
    pub fn with_input(self, input: Value) -> Self {
        *self.input.borrow_mut() = input;
        self
    }

    /// Finish construction, producing the shared handle the rest of the
    /// page holds.
    pub fn shared(self) -> Rc<Self> {
        Rc::new(self)
    }

    /// The environment this view was built with.
    pub fn env(&self) -> &Env {
        &self.env
    }

    /// View-local scratch data, not part of the store state.
    pub fn data(&self) -> Ref<'_, Value> {
        self.data.borrow()
    }

    /// Mutable access to the view-local scratch data.
    pub fn data_mut(&self) -> RefMut<'_, Value> {
        self.data.borrow_mut()
    }

    /// Instantiate a reducer from a definition, bound to this view's
    /// environment and seeded from its current input.
    pub fn create_reducer(&self, def: &Rc<ReducerDef>, initial: Option<Value>) -> Reducer {
        let input = self.input();
        Reducer::new(def, self.env.clone(), initial, &input)
    }

    /// Subscribe to an emitted event kind (post-rename).
    pub fn subscribe<F>(&self, kind: impl Into<String>, callback: F)
    where
        F: Fn(&Action) + 'static,
    {
        self.subscriptions
            .borrow_mut()
            .entry(kind.into())
            .or_default()
            .push(Rc::new(callback));
    }

    /// Emit a semantic event. The emitter configuration decides whether it
    /// is dispatched into the store; manual subscriptions always fire.
    pub fn emit(&self, kind: &str, args: Value) {
        let (kind, target) = self.emitter.resolve(kind);
        let action = Action::new(kind.clone()).with("args", args);

        if matches!(target, EmitTarget::Dispatch | EmitTarget::Both) {
            self.env.dispatch.dispatch(action.clone());
        }
        let callbacks = self
            .subscriptions
            .borrow()
            .get(&kind)
            .cloned()
            .unwrap_or_default();
        for callback in callbacks {
            callback(&action);
        }
    }

    fn with_composed<R>(&self, f: impl FnOnce(&mut Composed) -> R) -> R {
        let mut slot = self.composed.borrow_mut();
        let composed = slot.get_or_insert_with(|| {
            let input = self.input.borrow();
            self.slices.compose(&self.env, &input)
        });
        f(composed)
    }
}

impl ViewBinding for View {
    fn set_input(&self, value: Value) {
        *self.input.borrow_mut() = value;
    }

    fn input(&self) -> Value {
        self.input.borrow().clone()
    }

    fn do_reduce(&self, state: &Value, action: &Action) -> Value {
        self.with_composed(|composed| composed.reduce(state, action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_env;

    fn count_def() -> Rc<ReducerDef> {
        ReducerDef::builder()
            .route("Increment", |_ctx, state, _action| {
                json!(state.as_i64().unwrap_or(0) + 1)
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_do_reduce_runs_composed_slices() {
        let (env, _rx) = test_env();
        let view = View::new(env)
            .with_slices(Slices::new().child("count", count_def()).literal("title", "Count"))
            .with_input(json!({"count": 2}))
            .shared();

        let seed = view.do_reduce(&json!({"count": 2}), &Action::init());
        assert_eq!(seed, json!({"count": 2, "title": "Count"}));

        let next = view.do_reduce(&seed, &Action::new("Increment"));
        assert_eq!(next, json!({"count": 3, "title": "Count"}));
    }

    #[test]
    fn test_emit_event_target_reaches_subscriptions_only() {
        let (env, mut rx) = test_env();
        let view = View::new(env).shared();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        view.subscribe("Picked", move |action: &Action| {
            sink.borrow_mut().push(action.clone());
        });

        view.emit("Picked", json!({"id": 4}));
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0].args(), Some(&json!({"id": 4})));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_emit_dispatch_target_reaches_store() {
        let (env, mut rx) = test_env();
        let view = View::new(env)
            .with_emitter(Emitter::dispatching())
            .shared();

        view.emit("Increment", json!(null));
        let action = rx.try_recv().unwrap();
        assert_eq!(action.kind(), "Increment");
    }

    #[test]
    fn test_emitter_rename_and_per_event_target() {
        let (env, mut rx) = test_env();
        let emitter = Emitter::new()
            .rename("clicked", "Increment")
            .target_for("Increment", EmitTarget::Both);
        let view = View::new(env).with_emitter(emitter).shared();

        let seen = Rc::new(RefCell::new(0));
        let sink = seen.clone();
        view.subscribe("Increment", move |_action: &Action| {
            *sink.borrow_mut() += 1;
        });

        view.emit("clicked", json!(null));
        assert_eq!(rx.try_recv().unwrap().kind(), "Increment");
        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn test_set_input_replaces_value() {
        let (env, _rx) = test_env();
        let view = View::new(env).shared();
        assert_eq!(view.input(), json!({}));

        view.set_input(json!({"count": 9}));
        assert_eq!(view.input(), json!({"count": 9}));
    }
}
