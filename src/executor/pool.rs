//! The worker pool: submission policy, elastic scaling, and shutdown.

use super::queue::TaskQueue;
use super::task::{FnTask, Task, TaskCell};
use super::worker::{self, WorkerId, WorkerRecord};
use crate::config::{PoolConfig, PoolMode, SUBMIT_TIMEOUT, TASK_QUEUE_MAX, THREAD_SIZE_MAX};
use crate::error::{Error, Result};
use crate::handle::{Rendezvous, ResultHandle};
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// State guarded by the pool's one mutex: the task queue, the worker
/// map, and the configuration they read.
pub(crate) struct PoolState {
    pub(crate) queue: TaskQueue,
    pub(crate) workers: HashMap<WorkerId, WorkerRecord>,
    pub(crate) config: PoolConfig,
    pub(crate) init_threads: usize,
}

/// Everything workers and the pool facade share.
///
/// The counters are atomic so observers read them lock-free; they are
/// only mutated adjacent to a critical section on `state`, which is what
/// keeps the elastic growth decision race-free.
pub(crate) struct Shared {
    pub(crate) state: Mutex<PoolState>,
    pub(crate) not_full: Condvar,
    pub(crate) not_empty: Condvar,
    pub(crate) exit: Condvar,
    pub(crate) running: AtomicBool,
    pub(crate) task_count: AtomicUsize,
    pub(crate) cur_threads: AtomicUsize,
    pub(crate) idle_threads: AtomicUsize,
    pub(crate) tasks_executed: AtomicU64,
    next_worker_id: AtomicUsize,
}

impl Shared {
    /// Insert a record and launch a detached worker thread for it.
    ///
    /// The join handle is dropped on purpose: workers erase their own
    /// record and the destructor synchronizes on the census instead.
    pub(crate) fn spawn_worker(self: &Arc<Self>, state: &mut PoolState) -> Result<WorkerId> {
        let id = self.next_worker_id.fetch_add(1, Ordering::Relaxed);
        let name = format!("{}-{}", state.config.thread_name_prefix, id);

        let mut builder = thread::Builder::new().name(name);
        if let Some(stack_size) = state.config.stack_size {
            builder = builder.stack_size(stack_size);
        }

        state.workers.insert(id, WorkerRecord::new(id));

        let shared = Arc::clone(self);
        match builder.spawn(move || worker::run(shared, id)) {
            Ok(_detached) => Ok(id),
            Err(err) => {
                state.workers.remove(&id);
                Err(Error::executor(format!("failed to spawn worker: {err}")))
            }
        }
    }
}

/// A bounded worker pool.
///
/// Tasks are admitted onto a bounded FIFO queue and executed by a set of
/// long-lived worker threads. In [`PoolMode::Fixed`] the worker count is
/// the start-time size for the pool's lifetime; in [`PoolMode::Elastic`]
/// it grows on backlog up to a ceiling and shrinks back toward the floor
/// as workers idle out.
///
/// Dropping the pool shuts it down: workers finish their in-flight task
/// and exit, and anything still queued is discarded with its handle
/// delivering the empty sentinel.
pub struct ThreadPool {
    shared: Arc<Shared>,
}

impl ThreadPool {
    /// Create a pool with the default configuration, not yet started.
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    /// Create a pool from a configuration, typically built with
    /// [`PoolConfig::builder`].
    pub fn with_config(config: PoolConfig) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(PoolState {
                queue: TaskQueue::with_limit(config.task_queue_max),
                workers: HashMap::new(),
                config,
                init_threads: 0,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            exit: Condvar::new(),
            running: AtomicBool::new(false),
            task_count: AtomicUsize::new(0),
            cur_threads: AtomicUsize::new(0),
            idle_threads: AtomicUsize::new(0),
            tasks_executed: AtomicU64::new(0),
            next_worker_id: AtomicUsize::new(0),
        });
        Self { shared }
    }

    /// Set the worker-lifecycle policy. Pre-start only; misuse is logged
    /// to stderr and ignored.
    pub fn set_mode(&self, mode: PoolMode) {
        if self.is_running() {
            eprintln!("crew: pool is running, cannot set mode");
            return;
        }
        self.shared.state.lock().config.mode = mode;
    }

    /// Bound the pending-task queue, `1..=TASK_QUEUE_MAX`. Pre-start
    /// only; misuse is logged to stderr and ignored.
    pub fn set_task_queue_max(&self, max: usize) {
        if self.is_running() {
            eprintln!("crew: pool is running, cannot set task queue limit");
            return;
        }
        if max == 0 || max > TASK_QUEUE_MAX {
            eprintln!("crew: invalid task queue limit {max}");
            return;
        }
        let mut state = self.shared.state.lock();
        state.config.task_queue_max = max;
        state.queue.set_limit(max);
    }

    /// Cap the elastic-mode worker census, `1..=THREAD_SIZE_MAX`.
    /// Pre-start and elastic mode only; misuse is logged to stderr and
    /// ignored.
    pub fn set_thread_size_max(&self, max: usize) {
        if self.is_running() {
            eprintln!("crew: pool is running, cannot set thread ceiling");
            return;
        }
        let mut state = self.shared.state.lock();
        if state.config.mode != PoolMode::Elastic {
            eprintln!("crew: thread ceiling only applies in elastic mode");
            return;
        }
        if max == 0 || max > THREAD_SIZE_MAX {
            eprintln!("crew: invalid thread ceiling {max}");
            return;
        }
        state.config.thread_size_max = max;
    }

    /// Start the pool with one worker per detected hardware thread.
    pub fn start_default(&self) -> Result<()> {
        self.start(num_cpus::get())
    }

    /// Start the pool with `init_threads` workers. That count is the
    /// floor in elastic mode and the lifetime census in fixed mode.
    pub fn start(&self, init_threads: usize) -> Result<()> {
        if init_threads == 0 {
            return Err(Error::config("init_threads must be at least 1"));
        }
        if self.shared.running.swap(true, Ordering::AcqRel) {
            return Err(Error::AlreadyStarted);
        }

        let mut state = self.shared.state.lock();
        state.init_threads = init_threads;
        self.shared.cur_threads.store(init_threads, Ordering::Release);

        for _ in 0..init_threads {
            match self.shared.spawn_worker(&mut state) {
                Ok(_) => {
                    self.shared.idle_threads.fetch_add(1, Ordering::AcqRel);
                }
                Err(err) => {
                    // census reflects what actually launched
                    self.shared
                        .cur_threads
                        .store(state.workers.len(), Ordering::Release);
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    /// Submit a task for execution and receive a handle for its result.
    ///
    /// Blocks at most one second waiting for queue room; on admission
    /// timeout the returned handle is invalid and its
    /// [`wait`](ResultHandle::wait) yields the empty sentinel without
    /// blocking.
    pub fn submit<T: Task + 'static>(&self, task: T) -> ResultHandle {
        let rendezvous = Arc::new(Rendezvous::new());
        if self.admit(Box::new(task), Some(rendezvous.clone())) {
            ResultHandle::valid(rendezvous)
        } else {
            ResultHandle::invalid()
        }
    }

    /// Submit a closure for execution; its return value becomes the
    /// handle's payload.
    pub fn submit_fn<F, R>(&self, f: F) -> ResultHandle
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        self.submit(FnTask::new(f))
    }

    /// Fire-and-forget submission: no handle is attached and the
    /// closure's effect is its only output. Returns whether the task was
    /// admitted.
    pub fn execute<F>(&self, f: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        self.admit(Box::new(FnTask::new(f)), None)
    }

    fn admit(&self, task: Box<dyn Task>, rendezvous: Option<Arc<Rendezvous>>) -> bool {
        let shared = &self.shared;
        let mut state = shared.state.lock();

        let deadline = Instant::now() + SUBMIT_TIMEOUT;
        while !state.queue.has_room() {
            if shared.not_full.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }
        if !state.queue.has_room() {
            eprintln!("crew: task queue is full, submission rejected");
            return false;
        }

        state.queue.push(TaskCell::new(task, rendezvous));
        shared.task_count.fetch_add(1, Ordering::AcqRel);
        shared.not_empty.notify_all();

        // backlog pressure: one new worker per admitted submission that
        // observes more pending tasks than idle workers
        if state.config.mode == PoolMode::Elastic
            && shared.running.load(Ordering::Acquire)
            && shared.task_count.load(Ordering::Acquire) > shared.idle_threads.load(Ordering::Acquire)
            && shared.cur_threads.load(Ordering::Acquire) < state.config.thread_size_max
        {
            match shared.spawn_worker(&mut state) {
                Ok(_) => {
                    shared.cur_threads.fetch_add(1, Ordering::AcqRel);
                    shared.idle_threads.fetch_add(1, Ordering::AcqRel);
                }
                Err(err) => eprintln!("crew: {err}"),
            }
        }

        true
    }

    /// Stop the pool and wait for every worker to exit.
    ///
    /// Workers finish the task they are executing; tasks still queued
    /// are discarded, each delivering the empty sentinel to its handle.
    /// Called automatically on drop.
    pub fn shutdown(&self) {
        let was_running = self.shared.running.swap(false, Ordering::AcqRel);
        let mut state = self.shared.state.lock();

        if was_running {
            self.shared.not_empty.notify_all();
            while self.shared.cur_threads.load(Ordering::Acquire) != 0 {
                self.shared.exit.wait(&mut state);
            }
        }

        for cell in state.queue.drain() {
            cell.abandon();
        }
        self.shared.task_count.store(0, Ordering::Release);
    }

    /// Whether the pool has been started and not yet shut down.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Number of live worker threads.
    pub fn current_threads(&self) -> usize {
        self.shared.cur_threads.load(Ordering::Acquire)
    }

    /// Number of live workers not currently executing a task.
    pub fn idle_threads(&self) -> usize {
        self.shared.idle_threads.load(Ordering::Acquire)
    }

    /// Number of tasks admitted but not yet picked up by a worker.
    pub fn queued_tasks(&self) -> usize {
        self.shared.task_count.load(Ordering::Acquire)
    }

    /// Total tasks executed over the pool's lifetime.
    pub fn tasks_executed(&self) -> u64 {
        self.shared.tasks_executed.load(Ordering::Relaxed)
    }
}

impl Default for ThreadPool {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPool")
            .field("running", &self.is_running())
            .field("current_threads", &self.current_threads())
            .field("idle_threads", &self.idle_threads())
            .field("queued_tasks", &self.queued_tasks())
            .finish()
    }
}
