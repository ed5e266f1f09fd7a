//! Progress reporting for long clip passes.

use tracing::debug;

/// Receives progress from the clipper.
///
/// `start` announces the amount of work in a pass, `update` reports a chunk of
/// it done. Units are scenes for scene passes and faces for face passes.
pub trait ProgressObserver {
    fn start(&mut self, total: u64);
    fn update(&mut self, done: u64);
}

/// Discards all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressObserver for NullProgress {
    fn start(&mut self, _total: u64) {}
    fn update(&mut self, _done: u64) {}
}

/// Emits progress as `debug` events and keeps a running count.
#[derive(Debug, Clone, Default)]
pub struct LogProgress {
    total: u64,
    done: u64,
}

impl LogProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn done(&self) -> u64 {
        self.done
    }
}

impl ProgressObserver for LogProgress {
    fn start(&mut self, total: u64) {
        self.total = total;
        self.done = 0;
        debug!(total, "clip pass started");
    }

    fn update(&mut self, done: u64) {
        self.done += done;
        debug!(done = self.done, total = self.total, "clip progress");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_progress_accumulates() {
        let mut progress = LogProgress::new();
        progress.start(5);
        progress.update(2);
        progress.update(1);
        assert_eq!(progress.total(), 5);
        assert_eq!(progress.done(), 3);
        progress.start(1);
        assert_eq!(progress.done(), 0);
    }
}
