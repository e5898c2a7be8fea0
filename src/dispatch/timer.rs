use std::time::{Duration, Instant};

/// Deadline after which an open menu is retracted.
///
/// The timer never fires by itself: the dispatch loop asks whether it is
/// due before waiting for the next command, so expiry is always handled on
/// the loop's own turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InactivityTimer {
    timeout: Option<Duration>,
    deadline: Option<Instant>,
}

impl InactivityTimer {
    /// A timer expiring `timeout` after being armed. `None` or a zero
    /// duration disables it.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout: timeout.filter(|timeout| !timeout.is_zero()),
            deadline: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.timeout.is_some()
    }

    pub fn arm(&mut self, now: Instant) {
        self.deadline = self.timeout.map(|timeout| now + timeout);
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Time left until the deadline, `None` when disarmed.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}
