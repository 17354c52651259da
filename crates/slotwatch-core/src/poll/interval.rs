use crate::config::{PollConfig, MAX_WAIT_SECS};
use rand::Rng;
use std::time::Duration;

/// Closed interval the pause between polls is drawn from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SleepRange {
    min_secs: f64,
    max_secs: f64,
}

impl SleepRange {
    /// Returns `None` unless `0 <= min <= max <= MAX_WAIT_SECS`.
    pub fn new(min_secs: f64, max_secs: f64) -> Option<Self> {
        let valid = min_secs.is_finite()
            && max_secs.is_finite()
            && 0.0 <= min_secs
            && min_secs <= max_secs
            && max_secs <= MAX_WAIT_SECS as f64;
        valid.then_some(Self { min_secs, max_secs })
    }

    pub fn min(&self) -> Duration {
        Duration::from_secs_f64(self.min_secs)
    }

    pub fn max(&self) -> Duration {
        Duration::from_secs_f64(self.max_secs)
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> Duration {
        if self.min_secs == self.max_secs {
            return self.min();
        }
        Duration::from_secs_f64(rng.gen_range(self.min_secs..=self.max_secs))
    }
}

impl Default for SleepRange {
    fn default() -> Self {
        Self {
            min_secs: 60.0,
            max_secs: 90.0,
        }
    }
}

impl TryFrom<&PollConfig> for SleepRange {
    type Error = anyhow::Error;

    fn try_from(cfg: &PollConfig) -> Result<Self, Self::Error> {
        Self::new(cfg.min_sleep_secs, cfg.max_sleep_secs).ok_or_else(|| {
            anyhow::anyhow!(
                "invalid poll sleep range [{}, {}]",
                cfg.min_sleep_secs,
                cfg.max_sleep_secs
            )
        })
    }
}
