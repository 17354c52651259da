//! Poll loop: fetch, classify, pause, repeat until a slot shows up or a stop
//! is requested.

use super::{Outcome, PollStats, SleepRange};
use crate::control::{Sleeper, Wake};
use crate::fetch::{Fetch, FetchResult};
use crate::notify::{NotificationSink, NotifyError};
use crate::target::PollTarget;
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    AvailabilityFound,
    UserInterrupted,
}

/// Final state of a monitoring session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollReport {
    pub reason: Termination,
    pub stats: PollStats,
}

#[derive(Debug, Error)]
pub enum PollError {
    /// A slot was found but the notification failed.
    #[error("slot found but notification failed: {source}")]
    Notify {
        stats: PollStats,
        #[source]
        source: NotifyError,
    },
}

pub struct PollLoop<F, N, S> {
    target: PollTarget,
    fetcher: F,
    sink: N,
    sleeper: S,
    range: SleepRange,
    rng: StdRng,
    stats: PollStats,
}

impl<F: Fetch, N: NotificationSink, S: Sleeper> PollLoop<F, N, S> {
    pub fn new(target: PollTarget, fetcher: F, sink: N, sleeper: S, range: SleepRange) -> Self {
        Self {
            target,
            fetcher,
            sink,
            sleeper,
            range,
            rng: StdRng::from_entropy(),
            stats: PollStats::default(),
        }
    }

    /// Fixed seed for the pause generator, for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Poll until termination, then log the failure share.
    pub fn run(mut self) -> Result<PollReport, PollError> {
        tracing::info!(
            "Monitoring service: {} (code: {}) at {}",
            self.target.service,
            self.target.code,
            self.target.main_url
        );
        if let Some(refresh) = &self.target.refresh_url {
            tracing::debug!("refresh page: {}", refresh);
        }

        let mut notify_result = Ok(());
        let reason = loop {
            match self.step() {
                Step::Continue => continue,
                Step::Found(body) => {
                    notify_result = self.sink.notify(&body, &self.target.main_url);
                    break Termination::AvailabilityFound;
                }
                Step::Interrupted => {
                    tracing::info!("interrupted by the user");
                    break Termination::UserInterrupted;
                }
            }
        };

        tracing::info!(
            "Share of failed requests: {:.0}%",
            self.stats.failure_percentage()
        );

        match notify_result {
            Ok(()) => Ok(PollReport {
                reason,
                stats: self.stats,
            }),
            Err(source) => Err(PollError::Notify {
                stats: self.stats,
                source,
            }),
        }
    }

    /// One iteration: fetch, classify, and pause unless the loop is done.
    fn step(&mut self) -> Step {
        if self.sleeper.is_stopped() {
            return Step::Interrupted;
        }
        let result = self.fetcher.fetch(&self.target.main_url);
        let Some(outcome) = Outcome::classify(&result, &self.target) else {
            return Step::Interrupted;
        };
        self.stats.record(outcome);

        let pause = match outcome {
            Outcome::AvailabilityDetected => {
                tracing::info!("The appointment is probably available.");
                return match result {
                    FetchResult::Response(response) => Step::Found(response.body),
                    _ => Step::Found(Vec::new()),
                };
            }
            Outcome::ServerError => {
                let pause = self.range.sample(&mut self.rng);
                match &result {
                    FetchResult::Response(r) => tracing::warn!(
                        "HTTP status {}, waiting for {:.1} seconds",
                        r.status,
                        pause.as_secs_f64()
                    ),
                    FetchResult::NetworkError(e) => tracing::warn!(
                        "request failed: {}, waiting for {:.1} seconds",
                        e,
                        pause.as_secs_f64()
                    ),
                    FetchResult::Interrupted => {}
                }
                pause
            }
            Outcome::NoAvailability => {
                let pause = self.range.sample(&mut self.rng);
                tracing::info!(
                    "\"{}\", waiting for {:.1} seconds",
                    self.target.no_availability_marker,
                    pause.as_secs_f64()
                );
                pause
            }
        };

        match self.sleeper.sleep(pause) {
            Wake::Elapsed => Step::Continue,
            Wake::Stopped => Step::Interrupted,
        }
    }
}

enum Step {
    Continue,
    Found(Vec<u8>),
    Interrupted,
}
