//! Progress reporting for stitch runs

use std::sync::Arc;

use tokio::sync::watch;

/// Writer side of a plan-scoped progress channel.
///
/// Values are fractions in `[0.0, 1.0]`. Updates that would move the
/// value backwards are ignored, so observers only ever see progress grow.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    tx: Arc<watch::Sender<f64>>,
}

impl ProgressReporter {
    /// Create a reporter and the receiver observers subscribe through
    pub fn channel() -> (Self, watch::Receiver<f64>) {
        let (tx, rx) = watch::channel(0.0);
        (Self { tx: Arc::new(tx) }, rx)
    }

    /// Reporter nobody listens to
    pub fn detached() -> Self {
        Self::channel().0
    }

    /// Report a completed fraction
    pub fn report(&self, fraction: f64) {
        if !fraction.is_finite() {
            return;
        }
        let fraction = fraction.clamp(0.0, 1.0);
        self.tx.send_if_modified(|current| {
            if fraction > *current {
                *current = fraction;
                true
            } else {
                false
            }
        });
    }

    /// Report progress as processed seconds out of a known total
    pub fn report_seconds(&self, done_seconds: f64, total_seconds: f64) {
        if total_seconds > 0.0 {
            self.report(done_seconds / total_seconds);
        }
    }

    pub fn complete(&self) {
        self.report(1.0);
    }

    /// Last reported fraction
    pub fn current(&self) -> f64 {
        *self.tx.borrow()
    }

    /// Subscribe another observer
    pub fn subscribe(&self) -> watch::Receiver<f64> {
        self.tx.subscribe()
    }
}
