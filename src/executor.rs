use std::thread;

use log::warn;

pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs fire-and-forget work off the caller's path.
pub trait BackgroundExecutor: Send + Sync {
    fn spawn(&self, task: Task);
}

/// Runs each task on a detached OS thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadExecutor;

impl BackgroundExecutor for ThreadExecutor {
    fn spawn(&self, task: Task) {
        if let Err(e) = thread::Builder::new()
            .name("unscramble-bg".to_string())
            .spawn(task)
        {
            warn!("could not start background task: {e}");
        }
    }
}

/// Runs each task immediately on the calling thread.
///
/// For targets without threads (wasm32) and for deterministic tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineExecutor;

impl BackgroundExecutor for InlineExecutor {
    fn spawn(&self, task: Task) {
        task();
    }
}

/// Executor used when the host does not supply one.
pub fn default_executor() -> Box<dyn BackgroundExecutor> {
    if cfg!(target_arch = "wasm32") {
        Box::new(InlineExecutor)
    } else {
        Box::new(ThreadExecutor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn inline_executor_runs_before_returning() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&counter);

        InlineExecutor.spawn(Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn thread_executor_runs_task_on_another_thread() {
        let caller = thread::current().id();
        let (tx, rx) = mpsc::channel();

        ThreadExecutor.spawn(Box::new(move || {
            let _ = tx.send(thread::current().id());
        }));

        let worker = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_ne!(worker, caller);
    }
}
