//! Bounded concurrent scheduler for pitch analysis
//!
//! A fixed-size pool of [`AnalysisWorker`]s fed from an unbounded FIFO
//! queue. Dispatch runs on the runtime, never inside the submitter's stack
//! frame, so a task stays cancelable until a worker actually claims it.
//! Completion order is latency-dependent, not FIFO. There is no retry and
//! no per-call timeout; a hung engine call occupies its pool slot
//! indefinitely.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use log::debug;
use tokio::sync::oneshot;

use crate::engine::PitchEngine;
use crate::error::{FrqError, Result};
use crate::track::FrequencyTrack;
use crate::worker::{AnalysisWorker, GenerationRequest};

struct QueuedTask {
    request: GenerationRequest,
    task_index: usize,
    tx: oneshot::Sender<Result<Option<FrequencyTrack>>>,
}

struct PoolState {
    queue: VecDeque<QueuedTask>,
    busy: Vec<bool>,
}

struct PoolShared {
    workers: Vec<Arc<AnalysisWorker>>,
    state: Mutex<PoolState>,
}

/// Single-resolution future for one submitted generation task
///
/// Resolves to the generated track (`Ok(Some)`), an engine no-result
/// (`Ok(None)`), or the task's failure — including [`FrqError::Canceled`]
/// when the task was removed from the queue before dispatch.
pub struct TrackFuture {
    rx: oneshot::Receiver<Result<Option<FrequencyTrack>>>,
}

impl Future for TrackFuture {
    type Output = Result<Option<FrequencyTrack>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(FrqError::AnalysisFailure {
                reason: "worker dropped the task".to_string(),
            })),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Fixed-size pool of analysis workers with a FIFO task queue
#[derive(Clone)]
pub struct WorkerPool {
    shared: Arc<PoolShared>,
}

impl WorkerPool {
    /// Create a pool of `pool_size` workers over one shared engine
    ///
    /// The size is fixed for the pool's lifetime.
    pub fn new(engine: Arc<dyn PitchEngine>, pool_size: usize) -> Self {
        assert!(pool_size > 0, "worker pool needs at least one worker");
        let workers = (0..pool_size)
            .map(|_| Arc::new(AnalysisWorker::new(Arc::clone(&engine))))
            .collect();
        WorkerPool {
            shared: Arc::new(PoolShared {
                workers,
                state: Mutex::new(PoolState {
                    queue: VecDeque::new(),
                    busy: vec![false; pool_size],
                }),
            }),
        }
    }

    /// Queue one generation task and schedule a dispatch pass
    ///
    /// Must be called within a tokio runtime. `task_index` is the caller's
    /// correlation key for [`WorkerPool::cancel`]; several tasks may share
    /// one index.
    pub fn submit(&self, request: GenerationRequest, task_index: usize) -> TrackFuture {
        let (tx, rx) = oneshot::channel();
        {
            let mut state = self.shared.state.lock().expect("pool state lock poisoned");
            state.queue.push_back(QueuedTask {
                request,
                task_index,
                tx,
            });
        }
        debug!("task {} queued", task_index);
        PoolShared::schedule(Arc::clone(&self.shared));
        TrackFuture { rx }
    }

    /// Reject every still-queued task with `Canceled` and empty the queue
    ///
    /// In-flight tasks are unaffected and still settle. Returns the number
    /// of tasks rejected.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<QueuedTask> = {
            let mut state = self.shared.state.lock().expect("pool state lock poisoned");
            state.queue.drain(..).collect()
        };
        let count = drained.len();
        for task in drained {
            let _ = task.tx.send(Err(FrqError::Canceled));
        }
        if count > 0 {
            debug!("canceled {} queued task(s)", count);
        }
        count
    }

    /// Reject queued tasks with the given index
    ///
    /// At-most-once semantics: a task already handed to a worker is not
    /// affected and settles through the engine path. Returns the number of
    /// tasks rejected.
    pub fn cancel(&self, task_index: usize) -> usize {
        let removed: Vec<QueuedTask> = {
            let mut state = self.shared.state.lock().expect("pool state lock poisoned");
            let mut remaining = VecDeque::with_capacity(state.queue.len());
            let mut removed = Vec::new();
            while let Some(task) = state.queue.pop_front() {
                if task.task_index == task_index {
                    removed.push(task);
                } else {
                    remaining.push_back(task);
                }
            }
            state.queue = remaining;
            removed
        };
        let count = removed.len();
        for task in removed {
            let _ = task.tx.send(Err(FrqError::Canceled));
        }
        count
    }

    /// Number of workers in the pool
    pub fn pool_size(&self) -> usize {
        self.shared.workers.len()
    }

    /// Number of tasks still waiting for a worker
    pub fn queued_len(&self) -> usize {
        self.shared
            .state
            .lock()
            .expect("pool state lock poisoned")
            .queue
            .len()
    }

    /// Number of workers currently running an analysis
    pub fn busy_count(&self) -> usize {
        self.shared
            .state
            .lock()
            .expect("pool state lock poisoned")
            .busy
            .iter()
            .filter(|busy| **busy)
            .count()
    }
}

impl PoolShared {
    /// Schedule a dispatch pass on the runtime
    fn schedule(shared: Arc<PoolShared>) {
        tokio::spawn(async move {
            PoolShared::dispatch(shared);
        });
    }

    /// Hand queued tasks to idle workers until one side runs out
    ///
    /// Runs after every submit and every completion; the queue and busy
    /// flags are only touched under the state lock, in short critical
    /// sections.
    fn dispatch(shared: Arc<PoolShared>) {
        loop {
            let (slot, task) = {
                let mut state = shared.state.lock().expect("pool state lock poisoned");
                if state.queue.is_empty() {
                    return;
                }
                let Some(slot) = state.busy.iter().position(|busy| !busy) else {
                    return;
                };
                let Some(task) = state.queue.pop_front() else {
                    return;
                };
                state.busy[slot] = true;
                (slot, task)
            };

            let worker = Arc::clone(&shared.workers[slot]);
            let shared_done = Arc::clone(&shared);
            tokio::spawn(async move {
                let task_index = task.task_index;
                debug!("task {} dispatched to worker {}", task_index, slot);
                let result = worker.process(task.request).await;
                if task.tx.send(result).is_err() {
                    debug!("task {} settled but its caller went away", task_index);
                }
                {
                    let mut state = shared_done.state.lock().expect("pool state lock poisoned");
                    state.busy[slot] = false;
                }
                PoolShared::dispatch(shared_done);
            });
        }
    }
}
