/// One-shot delay that coalesces a burst of requests into a single firing.
///
/// The first `arm` after a firing schedules the next one `delay_ms` later;
/// arms while already scheduled are absorbed and do not push the deadline.
#[derive(Debug, Clone)]
pub struct RebuildThrottle {
    delay_ms: u64,
    due_at: Option<u64>,
}

impl RebuildThrottle {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            due_at: None,
        }
    }

    /// Schedule a firing unless one is pending. Returns true if newly scheduled.
    pub fn arm(&mut self, now_ms: u64) -> bool {
        if self.due_at.is_some() {
            return false;
        }
        self.due_at = Some(now_ms.saturating_add(self.delay_ms));
        true
    }

    /// Returns true exactly once per scheduled firing, when its deadline passes.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.due_at {
            Some(due) if now_ms >= due => {
                self.due_at = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.due_at.is_some()
    }

    pub fn due_at(&self) -> Option<u64> {
        self.due_at
    }

    /// Drop a pending firing (used when its work was done some other way).
    pub fn clear(&mut self) {
        self.due_at = None;
    }
}
