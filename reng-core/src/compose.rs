//! Slice composition: one declarative map, one composed reduce function
//!
//! A [`Slices`] map declares, per state key, either a literal value or a
//! nested reducer definition. Composing it against an owner's input eagerly
//! instantiates one child [`Reducer`] per nested slice (seeded with the
//! owner input's corresponding slice) and yields a [`Composed`] reduce that:
//!
//! 1. starts from a shallow copy of the incoming state,
//! 2. overwrites each nested slice with that child's reduce output,
//! 3. overwrites each literal slice with the literal, verbatim, every call,
//! 4. returns the merged object.
//!
//! An empty map composes to the identity function.

use std::collections::BTreeMap;
use std::rc::Rc;

use serde_json::{Map, Value};

use crate::action::Action;
use crate::reducer::{Reducer, ReducerDef};
use crate::services::Env;

/// One entry in a slice map.
#[derive(Clone)]
pub enum Slice {
    /// A constant overlaid onto the slice on every reduce call.
    Literal(Value),
    /// A nested reducer definition owning the slice.
    Child(Rc<ReducerDef>),
}

impl std::fmt::Debug for Slice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Slice::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Slice::Child(_) => f.debug_tuple("Child").finish(),
        }
    }
}

/// Declarative map from state-slice key to [`Slice`].
#[derive(Clone, Debug, Default)]
pub struct Slices {
    map: BTreeMap<String, Slice>,
}

impl Slices {
    /// An empty slice map (composes to identity).
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a literal slice.
    pub fn literal(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.map.insert(key.into(), Slice::Literal(value.into()));
        self
    }

    /// Declare a nested-reducer slice.
    pub fn child(mut self, key: impl Into<String>, def: Rc<ReducerDef>) -> Self {
        self.map.insert(key.into(), Slice::Child(def));
        self
    }

    /// Whether no slices are declared.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The declared slice keys, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    /// Compose this map against an owner's input, instantiating child
    /// reducers bound to `env` and seeded from `owner_input`'s slices.
    pub fn compose(&self, env: &Env, owner_input: &Value) -> Composed {
        let mut children = Vec::new();
        let mut literals = Vec::new();
        for (key, slice) in &self.map {
            match slice {
                Slice::Child(def) => {
                    let initial = owner_input.get(key).cloned();
                    children.push((
                        key.clone(),
                        Reducer::new(def, env.clone(), initial, owner_input),
                    ));
                }
                Slice::Literal(value) => literals.push((key.clone(), value.clone())),
            }
        }
        Composed { children, literals }
    }
}

/// A composed reduce function produced by [`Slices::compose`].
pub struct Composed {
    children: Vec<(String, Reducer)>,
    literals: Vec<(String, Value)>,
}

impl Composed {
    /// The identity composition (no slices declared).
    pub fn identity() -> Self {
        Self {
            children: Vec::new(),
            literals: Vec::new(),
        }
    }

    /// Whether this composition passes state through unchanged.
    pub fn is_identity(&self) -> bool {
        self.children.is_empty() && self.literals.is_empty()
    }

    /// Run the composed reduce. Pure given the children are pure; no
    /// declared slice key is ever dropped from the result.
    pub fn reduce(&mut self, state: &Value, action: &Action) -> Value {
        if self.is_identity() {
            return state.clone();
        }

        let mut result = match state {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        for (key, child) in &mut self.children {
            let slice = state.get(key.as_str()).cloned().unwrap_or(Value::Null);
            result.insert(key.clone(), child.reduce(&slice, action));
        }
        for (key, literal) in &self.literals {
            result.insert(key.clone(), literal.clone());
        }
        Value::Object(result)
    }
}
