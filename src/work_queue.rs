//! A fixed-size worker pool with a completion barrier.
//!
//! Tasks are boxed closures sent over a `crossbeam_channel` to a fixed set of
//! named worker threads. A pending counter, incremented before a task is sent
//! and decremented after it has run, backs [`WorkQueue::finish`]: once the
//! counter reaches zero no task is queued or running.
//!
//! A task may enqueue further tasks through a [`Spawner`]. The child is
//! counted before the parent's own count is released, so `finish` also waits
//! for everything spawned transitively.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use stemdex::work_queue::WorkQueue;
//!
//! let queue = WorkQueue::new(4).unwrap();
//! let hits = Arc::new(AtomicUsize::new(0));
//!
//! for _ in 0..10 {
//!     let hits = Arc::clone(&hits);
//!     queue
//!         .execute(move || {
//!             hits.fetch_add(1, Ordering::SeqCst);
//!             Ok(())
//!         })
//!         .unwrap();
//! }
//!
//! queue.finish();
//! assert_eq!(hits.load(Ordering::SeqCst), 10);
//! ```

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, error};
use parking_lot::{Condvar, Mutex};

use crate::error::{Result, SearchError};

type Job = Box<dyn FnOnce() -> Result<()> + Send + 'static>;

enum Message {
    Run(Job),
    Terminate,
}

/// Counters describing the work a queue has seen so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkQueueStats {
    /// Tasks accepted by `execute`.
    pub submitted: u64,

    /// Tasks that returned `Ok`.
    pub completed: u64,

    /// Tasks that returned `Err` or panicked.
    pub failed: u64,
}

#[derive(Debug, Default)]
struct State {
    pending: usize,
    closed: bool,
}

/// State shared by the queue, its spawners and its workers.
struct Shared {
    state: Mutex<State>,
    idle: Condvar,
    sender: Sender<Message>,
    submitted: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
}

impl Shared {
    fn execute(&self, job: Job) -> Result<()> {
        // The closed check and the increment share one critical section with
        // shutdown, so no task can slip in behind the terminate messages.
        let mut state = self.state.lock();
        if state.closed {
            return Err(SearchError::invalid_operation(
                "work queue has been shut down",
            ));
        }
        state.pending += 1;
        self.submitted.fetch_add(1, Ordering::Relaxed);

        if self.sender.send(Message::Run(job)).is_err() {
            state.pending -= 1;
            return Err(SearchError::internal("work queue channel disconnected"));
        }
        Ok(())
    }

    fn wait_idle(&self) -> parking_lot::MutexGuard<'_, State> {
        let mut state = self.state.lock();
        while state.pending > 0 {
            self.idle.wait(&mut state);
        }
        state
    }

    fn task_done(&self) {
        let mut state = self.state.lock();
        state.pending -= 1;
        if state.pending == 0 {
            self.idle.notify_all();
        }
    }

    fn run(&self, job: Job) {
        match panic::catch_unwind(AssertUnwindSafe(job)) {
            Ok(Ok(())) => {
                self.completed.fetch_add(1, Ordering::Relaxed);
            }
            Ok(Err(e)) => {
                error!("task failed: {e}");
                self.failed.fetch_add(1, Ordering::Relaxed);
            }
            Err(payload) => {
                error!("task panicked: {}", panic_message(payload.as_ref()));
                self.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.task_done();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}

/// A pool of worker threads executing fallible tasks.
///
/// The queue is shut down when dropped. Because shutdown waits for the queue
/// to go idle, the last handle to a queue must not be dropped from inside one
/// of its own tasks.
pub struct WorkQueue {
    shared: Arc<Shared>,
    workers: Mutex<Vec<thread::JoinHandle<()>>>,
    size: usize,
}

impl WorkQueue {
    /// Start a queue with `threads` workers named `work-queue-{i}`.
    pub fn new(threads: usize) -> Result<Self> {
        if threads == 0 {
            return Err(SearchError::invalid_argument(
                "work queue needs at least one thread",
            ));
        }

        let (sender, receiver) = unbounded();
        let shared = Arc::new(Shared {
            state: Mutex::new(State::default()),
            idle: Condvar::new(),
            sender,
            submitted: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        });

        let queue = WorkQueue {
            shared,
            workers: Mutex::new(Vec::with_capacity(threads)),
            size: threads,
        };

        // On a spawn failure, dropping `queue` terminates the workers
        // started so far.
        for worker_id in 0..threads {
            let handle =
                Self::spawn_worker(worker_id, receiver.clone(), Arc::clone(&queue.shared))?;
            queue.workers.lock().push(handle);
        }
        debug!("started work queue with {threads} workers");

        Ok(queue)
    }

    fn spawn_worker(
        worker_id: usize,
        receiver: Receiver<Message>,
        shared: Arc<Shared>,
    ) -> Result<thread::JoinHandle<()>> {
        let handle = thread::Builder::new()
            .name(format!("work-queue-{worker_id}"))
            .spawn(move || {
                while let Ok(message) = receiver.recv() {
                    match message {
                        Message::Run(job) => shared.run(job),
                        Message::Terminate => break,
                    }
                }
            })?;

        Ok(handle)
    }

    /// Queue `task` for execution on a worker.
    ///
    /// Fails once [`shutdown`](Self::shutdown) has started.
    pub fn execute<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        self.shared.execute(Box::new(task))
    }

    /// A handle that tasks can carry to queue further work.
    pub fn spawner(&self) -> Spawner {
        Spawner {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Block until no task is queued or running.
    ///
    /// Calling this from inside a task of the same queue deadlocks, since the
    /// calling task itself is still pending.
    pub fn finish(&self) {
        drop(self.shared.wait_idle());
    }

    /// Wait for the queue to go idle, refuse new tasks and join every worker.
    ///
    /// Tasks already running are never interrupted. Calling this again is a
    /// no-op.
    pub fn shutdown(&self) {
        let mut workers = self.workers.lock();
        if workers.is_empty() {
            return;
        }

        {
            let mut state = self.shared.wait_idle();
            state.closed = true;
        }

        for _ in 0..workers.len() {
            // Workers only exit on Terminate, so the channel is still open.
            let _ = self.shared.sender.send(Message::Terminate);
        }
        for worker in workers.drain(..) {
            if worker.join().is_err() {
                error!("work queue worker exited abnormally");
            }
        }
        debug!("work queue shut down");
    }

    /// Number of worker threads.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Snapshot of the task counters.
    pub fn stats(&self) -> WorkQueueStats {
        WorkQueueStats {
            submitted: self.shared.submitted.load(Ordering::Relaxed),
            completed: self.shared.completed.load(Ordering::Relaxed),
            failed: self.shared.failed.load(Ordering::Relaxed),
        }
    }
}

impl Drop for WorkQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for WorkQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkQueue")
            .field("size", &self.size)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

/// Cloneable submission handle for a [`WorkQueue`].
///
/// A spawner does not keep the workers alive; once the queue shuts down,
/// [`execute`](Spawner::execute) fails.
#[derive(Clone)]
pub struct Spawner {
    shared: Arc<Shared>,
}

impl Spawner {
    /// Queue `task` on the originating queue.
    pub fn execute<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        self.shared.execute(Box::new(task))
    }
}

impl fmt::Debug for Spawner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spawner").finish_non_exhaustive()
    }
}
