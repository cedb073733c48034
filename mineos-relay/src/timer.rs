/// One-shot timer polled by the hosting scheduler.
///
/// Times are milliseconds on the same clock the router is ticked with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timer {
    deadline: Option<u64>,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm to fire `timeout` ms after `now`, replacing any previous deadline
    pub fn start(&mut self, now: u64, timeout: u64) {
        self.deadline = Some(now.saturating_add(timeout));
    }

    pub fn stop(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_due(&self, now: u64) -> bool {
        matches!(self.deadline, Some(deadline) if now >= deadline)
    }
}
