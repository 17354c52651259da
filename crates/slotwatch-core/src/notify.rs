//! What happens once a slot shows up: keep the page and open the booking site.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("saving detected page: {0}")]
    Persist(#[source] std::io::Error),
    #[error("launching {opener}: {source}")]
    Launch {
        opener: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{opener} exited with {status}")]
    Opener { opener: String, status: ExitStatus },
}

/// Called once, on the poll that found availability.
pub trait NotificationSink {
    fn notify(&mut self, body: &[u8], url: &str) -> Result<(), NotifyError>;
}

impl<N: NotificationSink + ?Sized> NotificationSink for &mut N {
    fn notify(&mut self, body: &[u8], url: &str) -> Result<(), NotifyError> {
        (**self).notify(body, url)
    }
}

/// Command that opens a URL in the desktop's default browser.
pub fn default_opener() -> Vec<String> {
    let parts: &[&str] = if cfg!(target_os = "macos") {
        &["open"]
    } else if cfg!(windows) {
        &["cmd", "/C", "start", ""]
    } else {
        &["xdg-open"]
    };
    parts.iter().map(|s| s.to_string()).collect()
}

/// Writes the page to a kept `.html` temp file, then opens the URL.
#[derive(Debug, Clone)]
pub struct BrowserSink {
    opener: Vec<String>,
    dir: Option<PathBuf>,
    saved: Option<PathBuf>,
}

impl Default for BrowserSink {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserSink {
    pub fn new() -> Self {
        Self {
            opener: default_opener(),
            dir: None,
            saved: None,
        }
    }

    /// Replace the opener command; the URL is appended as the last argument.
    pub fn with_opener<I, S>(mut self, opener: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.opener = opener.into_iter().map(Into::into).collect();
        self
    }

    /// Save pages under `dir` instead of the system temp dir.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Path of the last saved page.
    pub fn saved_page(&self) -> Option<&Path> {
        self.saved.as_deref()
    }

    fn persist(&self, body: &[u8]) -> std::io::Result<PathBuf> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("slotwatch-").suffix(".html");
        let mut file = match &self.dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(body)?;
        file.flush()?;
        let (_, path) = file.keep().map_err(|e| e.error)?;
        Ok(path)
    }

    fn open(&self, url: &str) -> Result<(), NotifyError> {
        let Some((program, args)) = self.opener.split_first() else {
            tracing::warn!("no opener configured, not opening {}", url);
            return Ok(());
        };
        let status = Command::new(program)
            .args(args)
            .arg(url)
            .status()
            .map_err(|source| NotifyError::Launch {
                opener: program.clone(),
                source,
            })?;
        if !status.success() {
            return Err(NotifyError::Opener {
                opener: program.clone(),
                status,
            });
        }
        Ok(())
    }
}

impl NotificationSink for BrowserSink {
    fn notify(&mut self, body: &[u8], url: &str) -> Result<(), NotifyError> {
        let path = self.persist(body).map_err(NotifyError::Persist)?;
        tracing::info!("See the page here: {}", path.display());
        self.saved = Some(path);
        tracing::info!("Opening the page in the browser and exiting.");
        self.open(url)
    }
}
