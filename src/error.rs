//! Error type for everything outside the physics core
//!
//! Stepping never fails. Only loading settings and levels can.

use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Reading a settings or level file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Level written for a different format version.
    #[error("unsupported level version {found} (expected {expected})")]
    UnsupportedLevelVersion { found: u32, expected: u32 },

    /// Level parsed but describes something the simulation cannot run.
    #[error("invalid level: {0}")]
    InvalidLevel(String),

    /// Settings parsed but are out of range.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

impl Error {
    #[inline]
    pub fn is_version_mismatch(&self) -> bool {
        matches!(self, Error::UnsupportedLevelVersion { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
