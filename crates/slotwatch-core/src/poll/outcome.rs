use crate::fetch::FetchResult;
use crate::target::PollTarget;

/// Classification of one completed poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Network failure or any status other than 200.
    ServerError,
    /// 200, and the page still says there is nothing to book.
    NoAvailability,
    /// 200 without the marker text.
    AvailabilityDetected,
}

impl Outcome {
    /// Classify a fetch result. `Interrupted` is not a poll and has no outcome.
    pub fn classify(result: &FetchResult, target: &PollTarget) -> Option<Outcome> {
        match result {
            FetchResult::Interrupted => None,
            FetchResult::NetworkError(_) => Some(Outcome::ServerError),
            FetchResult::Response(r) if r.status != 200 => Some(Outcome::ServerError),
            FetchResult::Response(r) if target.shows_no_availability(&r.text()) => {
                Some(Outcome::NoAvailability)
            }
            FetchResult::Response(_) => Some(Outcome::AvailabilityDetected),
        }
    }

    pub fn is_failure(self) -> bool {
        self == Outcome::ServerError
    }
}
