use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OwnedSemaphorePermit;
use tokio::sync::Semaphore;

const FAILURE_PENALTY: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

/// Single-admission gate shared by every outbound lookup in the process.
///
/// Holding an [`Admission`] is the right to have one request in flight. The
/// permit is not returned when the request finishes but after a hold time
/// (`base` on success, `3 * base` on failure). Waiters queue on the
/// semaphore in FIFO order.
#[derive(Clone)]
pub struct RateLimiter {
    gate: Option<Arc<Semaphore>>,
    base: Duration,
}

pub struct Admission {
    permit: Option<OwnedSemaphorePermit>,
    base: Duration,
}

impl RateLimiter {

    pub fn new(base: Duration) -> Self {
        let gate = if base.is_zero() {
            None
        } else {
            Some(Arc::new(Semaphore::new(1)))
        };
        Self { gate, base }
    }

    pub fn is_enabled(&self) -> bool {
        self.gate.is_some()
    }

    pub async fn admit(&self) -> Admission {
        let permit = match &self.gate {
            // never closed, so acquire only fails if someone closes it on purpose
            Some(gate) => gate.clone().acquire_owned().await.ok(),
            None => None,
        };
        Admission { permit, base: self.base }
    }
}

impl Admission {

    pub fn hold_time(&self, outcome: Outcome) -> Duration {
        match outcome {
            Outcome::Success => self.base,
            Outcome::Failure => self.base.saturating_mul(FAILURE_PENALTY),
        }
    }

    /// Schedules the gate to reopen; returns immediately.
    pub fn release(self, outcome: Outcome) {
        let hold = self.hold_time(outcome);
        if let Some(permit) = self.permit {
            tracing::trace!("rate limit hold {:?} after {:?}", hold, outcome);
            tokio::spawn(async move {
                tokio::time::sleep(hold).await;
                drop(permit);
            });
        }
    }
}
