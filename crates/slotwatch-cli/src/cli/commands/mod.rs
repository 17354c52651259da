//! CLI command handlers.

mod list_services;
mod watch;

pub use list_services::run_list_services;
pub use watch::run_watch;
#[cfg(test)]
pub(crate) use watch::forward_interrupts;
