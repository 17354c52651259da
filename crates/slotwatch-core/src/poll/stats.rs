use super::Outcome;

/// Attempt counters for one monitoring session. `failed <= total` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    total: u64,
    failed: u64,
}

impl PollStats {
    pub fn record(&mut self, outcome: Outcome) {
        self.total += 1;
        if outcome.is_failure() {
            self.failed += 1;
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }

    /// Share of failed attempts in percent; 0 when nothing was attempted.
    pub fn failure_percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        100.0 * self.failed as f64 / self.total as f64
    }
}
