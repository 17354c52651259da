//! The page being watched: URLs for one configured service plus the marker text.

use crate::config::{SlotwatchConfig, CODE_PLACEHOLDER};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("unknown service {name:?} (available: {})", .available.join(", "))]
    UnknownService { name: String, available: Vec<String> },
}

/// Immutable description of what one poll fetches and how its page is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollTarget {
    pub service: String,
    pub code: String,
    pub main_url: String,
    pub refresh_url: Option<String>,
    pub no_availability_marker: String,
}

impl PollTarget {
    /// Resolve `service` (or the configured default) against the config.
    pub fn from_config(cfg: &SlotwatchConfig, service: Option<&str>) -> Result<Self, TargetError> {
        let name = service.unwrap_or(&cfg.default_service);
        let code = cfg
            .services
            .get(name)
            .ok_or_else(|| TargetError::UnknownService {
                name: name.to_string(),
                available: cfg.services.keys().cloned().collect(),
            })?;
        Ok(Self {
            service: name.to_string(),
            code: code.clone(),
            main_url: cfg.main_url_template.replace(CODE_PLACEHOLDER, code),
            refresh_url: cfg
                .refresh_url_template
                .as_ref()
                .map(|t| t.replace(CODE_PLACEHOLDER, code)),
            no_availability_marker: cfg.no_availability_marker.clone(),
        })
    }

    /// True when the decoded page still contains the "no appointments" text.
    pub fn shows_no_availability(&self, page: &str) -> bool {
        !self.no_availability_marker.is_empty() && page.contains(&self.no_availability_marker)
    }
}
