// workers.rs
use log::warn;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkerError {
    #[error("could not start worker pool: {0}")]
    Pool(String),
    #[error("worker thread panicked")]
    Panicked,
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

/// Shared stop flag. Long jobs poll it between units of work and bail out
/// once it is set.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Run `f` over `items` on a dedicated pool of at most `max_workers` threads.
///
/// Results come back in input order. A panic in `f` resumes on the caller.
pub fn map_bounded<T, R, F>(items: &[T], max_workers: usize, f: F) -> Result<Vec<R>, WorkerError>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let pool = ThreadPoolBuilder::new()
        .num_threads(max_workers.clamp(1, items.len()))
        .build()
        .map_err(|e| WorkerError::Pool(e.to_string()))?;

    Ok(pool.install(|| items.par_iter().map(|item| f(item)).collect()))
}

/// Run `f` on its own thread and wait at most `limit` for it.
///
/// On timeout the job's token is cancelled and the job gets `grace` to wind
/// down. Its result is discarded either way.
pub fn run_with_timeout<T, F>(limit: Duration, grace: Duration, f: F) -> Result<T, WorkerError>
where
    T: Send + 'static,
    F: FnOnce(&CancelToken) -> T + Send + 'static,
{
    let token = CancelToken::new();
    let job_token = token.clone();
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let _ = tx.send(f(&job_token));
    });

    match rx.recv_timeout(limit) {
        Ok(value) => Ok(value),
        Err(mpsc::RecvTimeoutError::Timeout) => {
            token.cancel();
            if let Err(mpsc::RecvTimeoutError::Timeout) = rx.recv_timeout(grace) {
                warn!("Cancelled job still running {grace:?} after its deadline");
            }
            Err(WorkerError::TimedOut(limit))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(WorkerError::Panicked),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Instant;

    #[test]
    fn keeps_input_order() {
        let items: Vec<u64> = (0..25).collect();
        let out = map_bounded(&items, 4, |n| {
            std::thread::sleep(Duration::from_millis((25 - n) % 5));
            n * 2
        })
        .unwrap();
        assert_eq!(out, items.iter().map(|n| n * 2).collect::<Vec<_>>());
    }

    #[test]
    fn runs_concurrently_up_to_the_bound() {
        let items = [0u8; 4];
        let start = Instant::now();
        map_bounded(&items, 4, |_| std::thread::sleep(Duration::from_millis(200))).unwrap();
        assert!(start.elapsed() < Duration::from_millis(700));
    }

    #[test]
    fn empty_input_is_empty_output() {
        let items: [u8; 0] = [];
        assert!(map_bounded(&items, 8, |x| *x).unwrap().is_empty());
    }

    #[test]
    fn timeout_is_distinct_from_success() {
        let quick = run_with_timeout(Duration::from_secs(5), Duration::ZERO, |_| 7);
        assert_eq!(quick, Ok(7));
        let slow = run_with_timeout(Duration::from_millis(50), Duration::ZERO, |_| {
            std::thread::sleep(Duration::from_millis(500));
            1
        });
        assert_eq!(slow, Err(WorkerError::TimedOut(Duration::from_millis(50))));
    }

    #[test]
    fn timed_out_job_stops_working() {
        let steps = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&steps);

        let result = run_with_timeout(Duration::from_millis(75), Duration::from_secs(2), move |cancel| {
            for _ in 0..10 {
                if cancel.is_cancelled() {
                    return false;
                }
                std::thread::sleep(Duration::from_millis(50));
                counter.fetch_add(1, Ordering::SeqCst);
            }
            true
        });
        assert_eq!(result, Err(WorkerError::TimedOut(Duration::from_millis(75))));

        let at_return = steps.load(Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(300));
        assert_eq!(steps.load(Ordering::SeqCst), at_return);
        assert!(at_return < 10);
    }

    #[test]
    fn panicking_job_is_reported() {
        let result: Result<u8, _> = run_with_timeout(Duration::from_secs(5), Duration::ZERO, |_| {
            panic!("boom");
        });
        assert_eq!(result, Err(WorkerError::Panicked));
    }
}
