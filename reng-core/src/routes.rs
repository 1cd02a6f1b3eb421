//! Explicit action routing: kind -> handler tables built at definition time
//!
//! A route table maps an action kind to the handler closure that runs after
//! slice composition. Tables are declared up front with [`RoutesBuilder`]
//! rather than discovered by reflection, so a duplicate registration is a
//! configuration error instead of a silent override.

use std::collections::BTreeMap;
use std::rc::Rc;

use serde_json::Value;
use thiserror::Error;

use crate::action::Action;
use crate::reducer::ReducerCtx;

/// Error raised while building a reducer definition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DefError {
    /// Two handlers map to the same normalized action kind.
    #[error("duplicate route for action kind `{0}`")]
    DuplicateRoute(String),
    /// A route was registered with an empty kind.
    #[error("route kind must not be empty")]
    EmptyKind,
}

/// A route handler.
///
/// Receives the reducer context, the post-composition state, and the action;
/// returns the next state. Handlers are shared (`Rc`) so one definition can
/// instantiate any number of reducers.
pub type Handler = Rc<dyn Fn(&mut ReducerCtx, Value, &Action) -> Value>;

/// Normalize an action kind for routing: every embedded `.` becomes `_`,
/// so dotted/namespaced kinds route to the same handler as their
/// underscore form.
pub fn normalize_kind(kind: &str) -> String {
    kind.replace('.', "_")
}

/// An immutable table from normalized action kind to handler.
#[derive(Clone, Default)]
pub struct Routes {
    table: BTreeMap<String, Handler>,
}

impl Routes {
    /// Start building a route table.
    pub fn builder() -> RoutesBuilder {
        RoutesBuilder::default()
    }

    /// Look up the handler for an action kind, normalizing first.
    pub fn get(&self, kind: &str) -> Option<&Handler> {
        self.table.get(&normalize_kind(kind))
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the table has no routes.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// The registered (normalized) kinds, in sorted order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for Routes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Routes")
            .field("kinds", &self.table.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`Routes`].
#[derive(Default)]
pub struct RoutesBuilder {
    entries: Vec<(String, Handler)>,
}

impl RoutesBuilder {
    /// Register a handler for an action kind.
    pub fn on<F>(mut self, kind: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut ReducerCtx, Value, &Action) -> Value + 'static,
    {
        self.entries.push((kind.into(), Rc::new(handler)));
        self
    }

    /// Build the table, rejecting empty and duplicate kinds.
    pub fn build(self) -> Result<Routes, DefError> {
        let mut table = BTreeMap::new();
        for (kind, handler) in self.entries {
            if kind.is_empty() {
                return Err(DefError::EmptyKind);
            }
            let normalized = normalize_kind(&kind);
            if table.insert(normalized.clone(), handler).is_some() {
                return Err(DefError::DuplicateRoute(normalized));
            }
        }
        Ok(Routes { table })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passthrough() -> impl Fn(&mut ReducerCtx, Value, &Action) -> Value {
        |_ctx, state, _action| state
    }

    #[test]
    fn test_lookup_normalizes_dots() {
        let routes = Routes::builder()
            .on("Ns_Save", passthrough())
            .build()
            .unwrap();

        assert!(routes.get("Ns_Save").is_some());
        assert!(routes.get("Ns.Save").is_some());
        assert!(routes.get("Other").is_none());
    }

    #[test]
    fn test_duplicate_after_normalization_is_an_error() {
        let result = Routes::builder()
            .on("Ns.Save", passthrough())
            .on("Ns_Save", passthrough())
            .build();

        assert_eq!(
            result.err(),
            Some(DefError::DuplicateRoute("Ns_Save".into()))
        );
    }

    #[test]
    fn test_empty_kind_is_an_error() {
        let result = Routes::builder().on("", passthrough()).build();
        assert_eq!(result.err(), Some(DefError::EmptyKind));
    }

    #[test]
    fn test_kinds_are_sorted() {
        let routes = Routes::builder()
            .on("B", passthrough())
            .on("A", passthrough())
            .build()
            .unwrap();
        let kinds: Vec<_> = routes.kinds().collect();
        assert_eq!(kinds, vec!["A", "B"]);
    }
}
