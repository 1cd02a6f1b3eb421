//! Shared error-handling service
//!
//! Async action handlers convert their failures into follow-up failure
//! actions; the paired handler routes the carried error here.

use std::rc::Rc;

/// Override hook for error handling, set through the app configuration.
pub type ErrorHook = Rc<dyn Fn(&str)>;

/// The page-wide error sink.
///
/// With no override configured, errors go to the `tracing` error level.
pub struct Errors {
    hook: Option<ErrorHook>,
}

impl Errors {
    /// Create the service, optionally with an override hook.
    pub fn new(hook: Option<ErrorHook>) -> Self {
        Self { hook }
    }

    /// Handle an error message. Empty messages are ignored.
    pub fn handle(&self, message: &str) {
        if message.is_empty() {
            return;
        }
        match &self.hook {
            Some(hook) => hook(message),
            None => tracing::error!(error = %message, "unhandled application error"),
        }
    }

    /// Handle any displayable error value.
    pub fn handle_error(&self, err: &dyn std::fmt::Display) {
        self.handle(&err.to_string());
    }
}

impl Default for Errors {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_override_hook_receives_message() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let errors = Errors::new(Some(Rc::new(move |msg: &str| {
            sink.borrow_mut().push(msg.to_string());
        })));

        errors.handle("boom");
        errors.handle("");
        assert_eq!(*seen.borrow(), vec!["boom".to_string()]);
    }

    #[test]
    fn test_default_does_not_panic() {
        Errors::default().handle("logged via tracing");
    }
}
