/// How long the celebration stays up after a solve
pub const CELEBRATE_MS: u64 = 4500;
/// How long the "not quite" banner stays up after the first wrong check
pub const OOPS_MS: u64 = 3500;

/// A single-shot flag that switches itself off after a delay
///
/// Time comes from the caller as a monotonic millisecond clock. Triggering
/// again replaces the pending deadline, so an older trigger can never clear
/// a newer one early.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlashTimer {
    deadline_ms: Option<u64>,
}

impl FlashTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&mut self, now_ms: u64, duration_ms: u64) {
        self.deadline_ms = Some(now_ms.saturating_add(duration_ms));
    }

    pub fn cancel(&mut self) {
        self.deadline_ms = None;
    }

    pub fn is_active(&self, now_ms: u64) -> bool {
        self.deadline_ms.is_some_and(|deadline| now_ms < deadline)
    }

    /// Drop an elapsed deadline; returns true if the flag just switched off
    pub fn expire(&mut self, now_ms: u64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                true
            }
            _ => false,
        }
    }

    /// Fraction of the flash left, from 1.0 down to 0.0
    pub fn remaining_fraction(&self, now_ms: u64, duration_ms: u64) -> f32 {
        match self.deadline_ms {
            Some(deadline) if duration_ms > 0 && now_ms < deadline => {
                (deadline - now_ms) as f32 / duration_ms as f32
            }
            _ => 0.0,
        }
    }
}
