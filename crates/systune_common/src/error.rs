//! Error types for systune.
//!
//! Probe failures and missing tools are not errors here: they degrade
//! to field text by design. Only the advisory round trip is fatal to a
//! run.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SystuneError {
    #[error("Advisory backend unavailable: {0}")]
    AdvisoryUnavailable(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
