use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

/// Observability counters shared by the workers of a batch.
///
/// The counters are only read for logging; nothing in the solving path depends on them, so
/// relaxed loads and stores suffice.
#[derive(Debug)]
pub struct Progress {
    /// Per worker, `0` when idle and `index + 1` while solving problem `index`.
    current: Vec<AtomicUsize>,
    completed: AtomicUsize,
    num_problems: usize,
}

impl Progress {
    pub fn new(num_workers: usize, num_problems: usize) -> Progress {
        Progress {
            current: (0..num_workers).map(|_| AtomicUsize::new(0)).collect(),
            completed: AtomicUsize::new(0),
            num_problems,
        }
    }

    pub fn start(&self, worker: usize, problem: usize) {
        self.current[worker].store(problem + 1, Ordering::Relaxed);
    }

    pub fn finish(&self, worker: usize) {
        self.current[worker].store(0, Ordering::Relaxed);
        let _ = self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn num_problems(&self) -> usize {
        self.num_problems
    }

    /// The indices of the problems which are being solved right now, in worker order.
    pub fn in_progress(&self) -> Vec<usize> {
        self.current
            .iter()
            .filter_map(|marker| marker.load(Ordering::Relaxed).checked_sub(1))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_workers_are_not_reported() {
        let progress = Progress::new(3, 10);

        progress.start(0, 0);
        progress.start(2, 7);

        assert_eq!(progress.in_progress(), vec![0, 7]);
        assert_eq!(progress.completed(), 0);
    }

    #[test]
    fn finishing_clears_the_marker_and_counts() {
        let progress = Progress::new(1, 2);

        progress.start(0, 1);
        progress.finish(0);

        assert!(progress.in_progress().is_empty());
        assert_eq!(progress.completed(), 1);
        assert_eq!(progress.num_problems(), 2);
    }
}
