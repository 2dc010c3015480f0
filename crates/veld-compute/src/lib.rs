//! Bounded worker pool for offloading chunk generation work.
//!
//! Jobs are closures producing a result value; completed results are drained
//! on the coordinating thread once per frame, in arrival order. The pool
//! never delivers results from a worker thread, so all world mutation stays
//! on the thread that owns the world.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::debug;

type Job<R> = Box<dyn FnOnce() -> R + Send + 'static>;

/// A fixed pool of worker threads producing results of type `R`.
///
/// Submission is unbounded; callers that need backpressure gate on
/// [`ComputeQueue::in_flight`]. Dropping the queue closes the job channel,
/// which lets the workers exit after finishing what they already picked up.
pub struct ComputeQueue<R> {
    job_sender: Sender<Job<R>>,
    result_receiver: Receiver<R>,
    in_flight: Arc<AtomicUsize>,
}

impl<R: Send + 'static> ComputeQueue<R> {
    /// Create a pool with an explicit worker count (minimum one).
    pub fn new(thread_count: usize) -> Self {
        let thread_count = thread_count.max(1);
        let (job_sender, job_receiver) = unbounded::<Job<R>>();
        let (result_sender, result_receiver) = unbounded::<R>();
        let in_flight = Arc::new(AtomicUsize::new(0));

        for worker in 0..thread_count {
            let jobs = job_receiver.clone();
            let results = result_sender.clone();
            let in_flight = Arc::clone(&in_flight);

            std::thread::Builder::new()
                .name(format!("terrain-compute-{worker}"))
                .spawn(move || {
                    while let Ok(job) = jobs.recv() {
                        let result = job();
                        // The receiver side may already be gone during
                        // shutdown; the result is simply discarded then.
                        let _ = results.send(result);
                        in_flight.fetch_sub(1, Ordering::Relaxed);
                    }
                })
                .expect("failed to spawn terrain compute worker");
        }

        debug!(thread_count, "compute queue started");
        Self {
            job_sender,
            result_receiver,
            in_flight,
        }
    }

    /// Create a pool sized for the current machine, leaving headroom for the
    /// coordinating thread and the renderer.
    pub fn with_default_threads() -> Self {
        let cpus = num_cpus::get().max(2);
        Self::new((cpus - 2).max(1))
    }

    /// Queue a job for background execution.
    pub fn submit(&self, job: impl FnOnce() -> R + Send + 'static) {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        // Workers only stop once this sender is dropped, so the channel
        // cannot be disconnected here.
        let _ = self.job_sender.send(Box::new(job));
    }

    /// Drain every completed result, in arrival order. Call once per frame
    /// on the coordinating thread.
    pub fn drain_completed(&self) -> Vec<R> {
        self.result_receiver.try_iter().collect()
    }

    /// Number of jobs submitted but not yet completed.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Whether no submitted job is still queued or executing. Completed
    /// results may still be waiting to be drained.
    pub fn is_idle(&self) -> bool {
        self.in_flight() == 0
    }
}
