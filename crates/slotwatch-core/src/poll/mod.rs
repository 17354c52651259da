//! The polling loop and the small values it works with.

mod interval;
mod outcome;
mod run;
mod stats;

pub use interval::SleepRange;
pub use outcome::Outcome;
pub use run::{PollError, PollLoop, PollReport, Termination};
pub use stats::PollStats;
