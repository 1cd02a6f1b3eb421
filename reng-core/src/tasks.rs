//! Keyed async tasks that report back through dispatch
//!
//! Route handlers kick off async work (HTTP calls, timers) here. Each task
//! is registered under a key; spawning with a key that is already running
//! cancels the previous task first. A completed task's action is dispatched
//! into the page's store, where it arrives like any other deferred action.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use tokio::task::{AbortHandle, JoinHandle};

use crate::action::Action;
use crate::store::DispatchHandle;

/// Identifies a task for cancellation and replacement.
///
/// Tasks with the same key are mutually exclusive: spawning a new task
/// under a running key cancels the existing task.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TaskKey(String);

impl TaskKey {
    /// Create a new task key.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the key name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for TaskKey {
    fn from(s: &'static str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TaskKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Manages async task lifecycle with automatic cancellation.
pub struct TaskManager {
    tasks: HashMap<TaskKey, AbortHandle>,
    dispatch: DispatchHandle,
}

impl TaskManager {
    /// Create a task manager reporting completions through `dispatch`.
    pub fn new(dispatch: DispatchHandle) -> Self {
        Self {
            tasks: HashMap::new(),
            dispatch,
        }
    }

    /// Spawn a task, cancelling any existing task with the same key.
    ///
    /// The future's action is dispatched when the task completes. A task
    /// cancelled before completion dispatches nothing.
    pub fn spawn<F>(&mut self, key: impl Into<TaskKey>, future: F) -> &mut Self
    where
        F: Future<Output = Action> + Send + 'static,
    {
        let key = key.into();
        self.cancel(&key);

        let dispatch = self.dispatch.clone();
        let handle: JoinHandle<()> = tokio::spawn(async move {
            dispatch.dispatch(future.await);
        });

        self.tasks.insert(key, handle.abort_handle());
        self
    }

    /// Spawn a task with debounce: wait for `duration` before executing.
    ///
    /// Calling again with the same key before the duration expires cancels
    /// the pending task and restarts the timer.
    pub fn debounce<F>(
        &mut self,
        key: impl Into<TaskKey>,
        duration: Duration,
        future: F,
    ) -> &mut Self
    where
        F: Future<Output = Action> + Send + 'static,
    {
        let key = key.into();
        self.cancel(&key);

        let dispatch = self.dispatch.clone();
        let handle: JoinHandle<()> = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            dispatch.dispatch(future.await);
        });

        self.tasks.insert(key, handle.abort_handle());
        self
    }

    /// Cancel a task by key. No-op when nothing runs under the key.
    pub fn cancel(&mut self, key: &TaskKey) {
        if let Some(handle) = self.tasks.remove(key) {
            handle.abort();
        }
    }

    /// Cancel all running tasks.
    pub fn cancel_all(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }

    /// Whether a task with the given key is currently registered.
    pub fn is_running(&self, key: &TaskKey) -> bool {
        self.tasks.contains_key(key)
    }

    /// The number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no tasks are registered.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_env;
    use serde_json::json;

    #[test]
    fn test_task_key() {
        let k1 = TaskKey::new("fetch");
        let k2 = TaskKey::from("fetch");
        let k3: TaskKey = "fetch".into();

        assert_eq!(k1, k2);
        assert_eq!(k2, k3);
        assert_eq!(k1.name(), "fetch");
    }

    #[tokio::test]
    async fn test_spawn_dispatches_completion() {
        let (env, mut rx) = test_env();
        let mut tasks = TaskManager::new(env.dispatch.clone());

        tasks.spawn("fetch", async { Action::new("DidFetch").with("args", json!(42)) });

        let action = tokio::time::timeout(Duration::from_millis(100), rx.recv())
            .await
            .expect("timeout")
            .expect("channel closed");
        assert_eq!(action.kind(), "DidFetch");
        assert_eq!(action.args(), Some(&json!(42)));
    }

    #[tokio::test]
    async fn test_spawn_cancels_previous_under_same_key() {
        let (env, mut rx) = test_env();
        let mut tasks = TaskManager::new(env.dispatch.clone());

        tasks.spawn("fetch", async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Action::new("First")
        });
        tasks.spawn("fetch", async { Action::new("Second") });

        let action = tokio::time::timeout(Duration::from_millis(200), rx.recv())
            .await
            .expect("timeout")
            .expect("channel closed");
        assert_eq!(action.kind(), "Second");
    }

    #[tokio::test]
    async fn test_debounce_waits_and_resets() {
        let (env, mut rx) = test_env();
        let mut tasks = TaskManager::new(env.dispatch.clone());

        tasks.debounce("search", Duration::from_millis(50), async { Action::new("One") });
        tokio::time::sleep(Duration::from_millis(30)).await;
        tasks.debounce("search", Duration::from_millis(50), async { Action::new("Two") });

        let action = tokio::time::timeout(Duration::from_millis(150), rx.recv())
            .await
            .expect("timeout")
            .expect("channel closed");
        assert_eq!(action.kind(), "Two");
    }

    #[tokio::test]
    async fn test_cancel_suppresses_completion() {
        let (env, mut rx) = test_env();
        let mut tasks = TaskManager::new(env.dispatch.clone());

        tasks.spawn("slow", async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Action::new("Never")
        });
        assert!(tasks.is_running(&TaskKey::new("slow")));

        tasks.cancel(&TaskKey::new("slow"));
        assert!(!tasks.is_running(&TaskKey::new("slow")));

        let result = tokio::time::timeout(Duration::from_millis(150), rx.recv()).await;
        assert!(result.is_err() || result.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cancel_all() {
        let (env, _rx) = test_env();
        let mut tasks = TaskManager::new(env.dispatch.clone());

        tasks.spawn("a", async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Action::new("A")
        });
        tasks.spawn("b", async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Action::new("B")
        });
        assert_eq!(tasks.len(), 2);

        tasks.cancel_all();
        assert!(tasks.is_empty());
    }
}
