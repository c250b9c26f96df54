//! Bounded Worker Pool
//!
//! Generic async task pool: a fixed number of workers pull boxed futures from
//! a buffered queue, each task runs under a per-task timeout, and shutdown
//! drains whatever is in flight within a bounded window. Reusable background
//! utility; the request path does not depend on it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::timeout;

type Job = BoxFuture<'static, ()>;

/// Worker pool tuning knobs.
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    /// Number of concurrent workers.
    pub workers: usize,

    /// Capacity of the pending-task queue.
    pub queue_depth: usize,

    /// Upper bound on a single task's run time.
    pub task_timeout: Duration,

    /// How long shutdown waits for each worker to drain.
    pub shutdown_timeout: Duration,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_depth: 64,
            task_timeout: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(10),
        }
    }
}

/// Worker pool submission errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WorkerPoolError {
    #[error("Task queue is full")]
    QueueFull,

    #[error("Worker pool is shut down")]
    Closed,
}

/// Fixed-size pool of async workers fed by a bounded queue.
pub struct WorkerPool {
    tx: mpsc::Sender<Job>,
    workers: Vec<JoinHandle<()>>,
    shutdown_timeout: Duration,
}

impl WorkerPool {
    /// Spawn the workers and return the pool handle.
    pub fn new(config: WorkerPoolConfig) -> Self {
        let (tx, rx) = mpsc::channel::<Job>(config.queue_depth.max(1));
        let rx = Arc::new(Mutex::new(rx));

        let workers = (0..config.workers.max(1))
            .map(|worker_id| {
                let rx = Arc::clone(&rx);
                let task_timeout = config.task_timeout;
                tokio::spawn(async move {
                    loop {
                        // Hold the queue lock only while waiting for a job.
                        let job = { rx.lock().await.recv().await };
                        match job {
                            Some(job) => {
                                if timeout(task_timeout, job).await.is_err() {
                                    tracing::warn!(worker_id, "task exceeded timeout, cancelled");
                                }
                            }
                            None => break,
                        }
                    }
                })
            })
            .collect();

        Self {
            tx,
            workers,
            shutdown_timeout: config.shutdown_timeout,
        }
    }

    /// Queue a task, waiting for queue space if necessary.
    pub async fn spawn<F>(&self, task: F) -> Result<(), WorkerPoolError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tx
            .send(Box::pin(task))
            .await
            .map_err(|_| WorkerPoolError::Closed)
    }

    /// Queue a task without waiting; fails when the queue is at capacity.
    pub fn try_spawn<F>(&self, task: F) -> Result<(), WorkerPoolError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tx.try_send(Box::pin(task)).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => WorkerPoolError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => WorkerPoolError::Closed,
        })
    }

    /// Number of tasks currently waiting in the queue.
    pub fn queued(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    /// Stop accepting work and drain in-flight tasks.
    ///
    /// Workers that do not finish within the shutdown timeout are aborted.
    pub async fn shutdown(self) {
        drop(self.tx);

        for handle in self.workers {
            let abort = handle.abort_handle();
            if timeout(self.shutdown_timeout, handle).await.is_err() {
                tracing::warn!("worker did not drain within shutdown timeout, aborting");
                abort.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn small_pool(workers: usize, queue_depth: usize) -> WorkerPool {
        WorkerPool::new(WorkerPoolConfig {
            workers,
            queue_depth,
            task_timeout: Duration::from_millis(200),
            shutdown_timeout: Duration::from_secs(1),
        })
    }

    #[tokio::test]
    async fn runs_all_queued_tasks() {
        let pool = small_pool(2, 16);
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..10 {
            let counter = Arc::clone(&counter);
            pool.spawn(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await
            .unwrap();
        }

        pool.shutdown().await;
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn try_spawn_fails_when_queue_is_full() {
        let pool = small_pool(1, 1);
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());

        // Occupy the single worker until released.
        {
            let started = Arc::clone(&started);
            let release = Arc::clone(&release);
            pool.spawn(async move {
                started.notify_one();
                release.notified().await;
            })
            .await
            .unwrap();
        }
        started.notified().await;

        // One slot in the queue, then capacity.
        pool.try_spawn(async {}).unwrap();
        assert_eq!(pool.try_spawn(async {}), Err(WorkerPoolError::QueueFull));

        release.notify_one();
        pool.shutdown().await;
    }

    #[tokio::test]
    async fn slow_task_is_cancelled_and_worker_survives() {
        let pool = small_pool(1, 4);
        let slow_finished = Arc::new(AtomicUsize::new(0));
        let fast_finished = Arc::new(AtomicUsize::new(0));

        {
            let slow_finished = Arc::clone(&slow_finished);
            pool.spawn(async move {
                tokio::time::sleep(Duration::from_secs(30)).await;
                slow_finished.fetch_add(1, Ordering::SeqCst);
            })
            .await
            .unwrap();
        }
        {
            let fast_finished = Arc::clone(&fast_finished);
            pool.spawn(async move {
                fast_finished.fetch_add(1, Ordering::SeqCst);
            })
            .await
            .unwrap();
        }

        pool.shutdown().await;
        assert_eq!(slow_finished.load(Ordering::SeqCst), 0);
        assert_eq!(fast_finished.load(Ordering::SeqCst), 1);
    }
}
