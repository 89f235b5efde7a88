// worker thread loop
use super::pool::Shared;
use crate::config::{PoolMode, ELASTIC_WAIT_SLICE, IDLE_TIMEOUT};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

pub(crate) type WorkerId = usize;

/// Bookkeeping entry for one live worker thread. A record exists in the
/// pool's map iff an OS thread is executing [`run`] for that id.
#[derive(Debug)]
pub(crate) struct WorkerRecord {
    pub(crate) id: WorkerId,
}

impl WorkerRecord {
    pub(crate) fn new(id: WorkerId) -> Self {
        Self { id }
    }
}

// main loop; the thread is detached, so returning is termination
pub(crate) fn run(shared: Arc<Shared>, id: WorkerId) {
    let mut last_active = Instant::now();

    loop {
        let cell = {
            let mut state = shared.state.lock();

            loop {
                // shutdown wins over pending work: queued tasks are
                // dropped, not drained
                if !shared.running.load(Ordering::Acquire) {
                    state.workers.remove(&id);
                    shared.cur_threads.fetch_sub(1, Ordering::AcqRel);
                    shared.exit.notify_all();
                    return;
                }

                if !state.queue.is_empty() {
                    break;
                }

                if state.config.mode == PoolMode::Elastic {
                    let timed_out = shared
                        .not_empty
                        .wait_for(&mut state, ELASTIC_WAIT_SLICE)
                        .timed_out();

                    // self-retire once idle past the timeout, floor permitting
                    if timed_out
                        && last_active.elapsed() > IDLE_TIMEOUT
                        && shared.cur_threads.load(Ordering::Acquire) > state.init_threads
                    {
                        state.workers.remove(&id);
                        shared.cur_threads.fetch_sub(1, Ordering::AcqRel);
                        shared.idle_threads.fetch_sub(1, Ordering::AcqRel);
                        return;
                    }
                } else {
                    shared.not_empty.wait(&mut state);
                }
            }

            shared.idle_threads.fetch_sub(1, Ordering::AcqRel);
            let cell = state.queue.pop().expect("queue checked non-empty under lock");
            shared.task_count.fetch_sub(1, Ordering::AcqRel);

            if !state.queue.is_empty() {
                shared.not_empty.notify_all();
            }
            shared.not_full.notify_all();
            cell
        };

        // lock released; run the body
        cell.execute();

        shared.tasks_executed.fetch_add(1, Ordering::Relaxed);
        shared.idle_threads.fetch_add(1, Ordering::AcqRel);
        last_active = Instant::now();
    }
}
