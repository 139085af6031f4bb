//! A fixed-size pool of loader threads, fed through a FIFO injector queue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_deque as deque;

/// The number of loader threads of a default `AssetManager`.
pub const DEFAULT_LOADERS: usize = 4;

type Job = Box<dyn FnOnce() + Send + 'static>;

struct Shared {
    injector: Mutex<deque::Worker<Job>>,
    stealer: deque::Stealer<Job>,
    watcher: Watcher,
    terminated: AtomicBool,
}

struct Watcher(Mutex<()>, Condvar);

impl Watcher {
    #[inline]
    fn wait_timeout(&self, ms: u64) {
        let v = self.0.lock().unwrap();
        let _ = self.1.wait_timeout(v, Duration::from_millis(ms));
    }

    #[inline]
    fn notify_one(&self) {
        self.1.notify_one()
    }

    #[inline]
    fn notify_all(&self) {
        self.1.notify_all()
    }
}

pub(crate) struct LoaderPool {
    shared: Arc<Shared>,
    threads: Vec<JoinHandle<()>>,
}

impl LoaderPool {
    pub fn new(num: usize) -> Self {
        let (w, s) = deque::fifo();
        let shared = Arc::new(Shared {
            injector: Mutex::new(w),
            stealer: s,
            watcher: Watcher(Mutex::new(()), Condvar::new()),
            terminated: AtomicBool::new(false),
        });

        let mut threads = Vec::with_capacity(num);
        for i in 0..num {
            let sh = shared.clone();
            let result = thread::Builder::new()
                .name(format!("asset-loader-{}", i))
                .spawn(move || LoaderPool::main_loop(&sh));

            match result {
                Ok(handle) => threads.push(handle),
                Err(err) => warn!("[LoaderPool] could not spawn loader thread {}. {}", i, err),
            }
        }

        LoaderPool { shared, threads }
    }

    /// Gets the number of running loader threads.
    #[inline]
    pub fn len(&self) -> usize {
        self.threads.len()
    }

    /// Pushes a job into the queue, it will be taken by whatever loader has nothing to do.
    pub fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let injector = self.shared.injector.lock().unwrap();
            injector.push(Box::new(job));
        }

        self.shared.watcher.notify_one();
    }

    fn main_loop(shared: &Shared) {
        let mut ms = 1;

        loop {
            if let Some(job) = shared.stealer.steal() {
                job();
                ms = 1;
                continue;
            }

            // The queue is drained before leaving, so pending waits always complete.
            if shared.terminated.load(Ordering::Acquire) {
                return;
            }

            shared.watcher.wait_timeout(ms);
            ms = (ms * 2).min(48);
        }
    }
}

impl Drop for LoaderPool {
    fn drop(&mut self) {
        self.shared.terminated.store(true, Ordering::Release);
        self.shared.watcher.notify_all();

        let current = thread::current().id();
        for handle in self.threads.drain(..) {
            if handle.thread().id() != current {
                let _ = handle.join();
            }
        }
    }
}
