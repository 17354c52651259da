pub mod config;
pub mod logging;

pub mod control;
pub mod fetch;
pub mod notify;
pub mod poll;
pub mod retry;
pub mod target;
