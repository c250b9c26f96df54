//! Graceful Shutdown Registry
//!
//! Named async cleanup actions registered during startup and executed in
//! reverse registration order when the process stops, each bounded by a
//! timeout so one hung resource cannot stall the rest.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::time::timeout;

type CleanupFn = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send + 'static>;

/// Registry of cleanup actions, run last-registered-first.
#[derive(Default)]
pub struct CleanupRegistry {
    actions: Mutex<Vec<(String, CleanupFn)>>,
}

impl CleanupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named cleanup action.
    pub fn register<F, Fut>(&self, name: &str, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut actions = self.actions.lock().expect("cleanup registry poisoned");
        actions.push((name.to_string(), Box::new(move || Box::pin(action()))));
    }

    /// Run every registered action in reverse order.
    ///
    /// Each action gets `each_timeout`; a timed-out action is logged and
    /// skipped, the remaining actions still run.
    pub async fn run_all(&self, each_timeout: Duration) {
        let mut actions: Vec<(String, CleanupFn)> = {
            let mut guard = self.actions.lock().expect("cleanup registry poisoned");
            guard.drain(..).collect()
        };

        while let Some((name, action)) = actions.pop() {
            match timeout(each_timeout, action()).await {
                Ok(()) => tracing::info!(name = %name, "cleanup complete"),
                Err(_) => tracing::warn!(name = %name, "cleanup timed out"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn runs_in_reverse_registration_order() {
        let registry = CleanupRegistry::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for name in ["pool", "storage", "metrics"] {
            let order = Arc::clone(&order);
            registry.register(name, move || async move {
                order.lock().unwrap().push(name);
            });
        }

        registry.run_all(Duration::from_secs(1)).await;
        assert_eq!(*order.lock().unwrap(), vec!["metrics", "storage", "pool"]);
    }

    #[tokio::test]
    async fn hung_action_does_not_block_the_rest() {
        let registry = CleanupRegistry::new();
        let ran = Arc::new(Mutex::new(false));

        {
            let ran = Arc::clone(&ran);
            registry.register("fast", move || async move {
                *ran.lock().unwrap() = true;
            });
        }
        registry.register("hung", || async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        registry.run_all(Duration::from_millis(50)).await;
        assert!(*ran.lock().unwrap());
    }

    #[tokio::test]
    async fn run_all_is_idempotent() {
        let registry = CleanupRegistry::new();
        let count = Arc::new(Mutex::new(0));

        {
            let count = Arc::clone(&count);
            registry.register("once", move || async move {
                *count.lock().unwrap() += 1;
            });
        }

        registry.run_all(Duration::from_secs(1)).await;
        registry.run_all(Duration::from_secs(1)).await;
        assert_eq!(*count.lock().unwrap(), 1);
    }
}
