use crate::error::{CheckoutError, Result};
use std::sync::atomic::{AtomicU8, Ordering};

/// Where the payment form is in its submit cycle.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Failed,
    Succeeded,
}

const IDLE: u8 = 0;
const SUBMITTING: u8 = 1;
const FAILED: u8 = 2;
// Failed, and the submit control stays disabled.
const FAILED_LOCKED: u8 = 3;
const SUCCEEDED: u8 = 4;

/// Lock-free gate around the submit control.
///
/// `try_begin` is the only way into `Submitting`, so at most one submission
/// is in flight no matter how many callers race on it.
#[derive(Debug, Default)]
pub struct SubmissionGate {
    state: AtomicU8,
}

impl SubmissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SubmissionState {
        match self.state.load(Ordering::Acquire) {
            IDLE => SubmissionState::Idle,
            SUBMITTING => SubmissionState::Submitting,
            FAILED | FAILED_LOCKED => SubmissionState::Failed,
            _ => SubmissionState::Succeeded,
        }
    }

    /// Whether a new submission may start.
    pub fn is_enabled(&self) -> bool {
        matches!(self.state.load(Ordering::Acquire), IDLE | FAILED)
    }

    /// Moves `Idle`/`Failed` to `Submitting`.
    pub fn try_begin(&self) -> Result<()> {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            match current {
                IDLE | FAILED => {}
                SUBMITTING => return Err(CheckoutError::AlreadySubmitting),
                _ => return Err(CheckoutError::SubmissionLocked),
            }
            match self.state.compare_exchange_weak(
                current,
                SUBMITTING,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(()),
                Err(actual) => current = actual,
            }
        }
    }

    /// Returns to `Idle` without recording a failure.
    pub fn abandon(&self) {
        self.finish(IDLE);
    }

    /// Records a failed attempt. `reenable` decides whether the control can
    /// be used again.
    pub fn fail(&self, reenable: bool) {
        self.finish(if reenable { FAILED } else { FAILED_LOCKED });
    }

    pub fn succeed(&self) {
        self.finish(SUCCEEDED);
    }

    fn finish(&self, next: u8) {
        // Only the holder of `Submitting` may leave it.
        let _ = self
            .state
            .compare_exchange(SUBMITTING, next, Ordering::AcqRel, Ordering::Acquire);
    }
}
