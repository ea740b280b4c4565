//! Fixed-size worker pool and batch-drain barrier
//!
//! The pool is a set of named OS threads consuming jobs from a shared
//! channel; every engine call is blocking, so there is no async runtime
//! underneath. Batch draining uses a counting wait-group: submit N units,
//! block until all N have signalled completion.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Pool of `W` worker threads. Dropping the pool closes the channel and
/// joins every worker.
pub struct WorkerPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..size)
            .map(|i| {
                let receiver = Arc::clone(&receiver);
                thread::Builder::new()
                    .name(format!("flowbench-worker-{i}"))
                    .spawn(move || worker_loop(&receiver))
                    .expect("failed to spawn benchmark worker thread")
            })
            .collect();

        Self {
            sender: Some(sender),
            workers,
        }
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queues a job; workers pick it up in arrival order.
    pub fn submit(&self, job: impl FnOnce() + Send + 'static) {
        if let Some(sender) = &self.sender {
            // Send only fails once every worker has exited, which cannot
            // happen while the pool is alive and the channel open.
            let _ = sender.send(Box::new(job));
        }
    }
}

fn worker_loop(receiver: &Mutex<Receiver<Job>>) {
    loop {
        let job = {
            let guard = receiver.lock().unwrap_or_else(|e| e.into_inner());
            guard.recv()
        };
        match job {
            Ok(job) => job(),
            Err(_) => break,
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.sender.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

/// Counting barrier for batch draining.
#[derive(Clone)]
pub struct WaitGroup {
    inner: Arc<(Mutex<usize>, Condvar)>,
}

impl WaitGroup {
    pub fn new(count: usize) -> Self {
        Self {
            inner: Arc::new((Mutex::new(count), Condvar::new())),
        }
    }

    /// Signals one unit of work as finished.
    pub fn done(&self) {
        let (count, condvar) = &*self.inner;
        let mut count = count.lock().unwrap_or_else(|e| e.into_inner());
        *count = count.saturating_sub(1);
        if *count == 0 {
            condvar.notify_all();
        }
    }

    /// Blocks until every unit has signalled.
    pub fn wait(&self) {
        let (count, condvar) = &*self.inner;
        let mut count = count.lock().unwrap_or_else(|e| e.into_inner());
        while *count > 0 {
            count = condvar
                .wait(count)
                .unwrap_or_else(|e| e.into_inner());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_pool_runs_all_jobs() {
        let pool = WorkerPool::new(4);
        let counter = Arc::new(AtomicUsize::new(0));
        let wg = WaitGroup::new(100);

        for _ in 0..100 {
            let counter = Arc::clone(&counter);
            let wg = wg.clone();
            pool.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                wg.done();
            });
        }

        wg.wait();
        assert_eq!(counter.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn test_single_worker_pool() {
        let pool = WorkerPool::new(1);
        assert_eq!(pool.size(), 1);

        let counter = Arc::new(AtomicUsize::new(0));
        let wg = WaitGroup::new(10);
        for _ in 0..10 {
            let counter = Arc::clone(&counter);
            let wg = wg.clone();
            pool.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                wg.done();
            });
        }

        wg.wait();
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_wait_group_zero_does_not_block() {
        WaitGroup::new(0).wait();
    }

    #[test]
    fn test_drop_joins_workers() {
        let pool = WorkerPool::new(2);
        let wg = WaitGroup::new(1);
        let wg2 = wg.clone();
        pool.submit(move || wg2.done());
        wg.wait();
        drop(pool);
    }
}
