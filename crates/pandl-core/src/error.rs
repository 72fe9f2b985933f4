//! Error taxonomy for the core.
//!
//! Every per-magnet failure is caught and folded into the dispatch report;
//! nothing here may abort a batch or terminate the process.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PandlError {
    /// Non-success HTTP status or a response body without the expected shape.
    #[error("drive API error: {0}")]
    Api(String),

    /// The selection tiers found nothing worth downloading in this torrent.
    #[error("no file meets the selection criteria")]
    NoEligibleFiles,

    /// The capture subprocess produced no matching line before the deadline.
    #[error("credential capture timed out after {0}s")]
    CaptureTimeout(u64),

    /// The capture subprocess could not be started or exited early.
    #[error("credential capture failed: {0}")]
    CaptureError(String),

    /// Malformed structured callback data from the transport.
    #[error("malformed callback data: {0:?}")]
    Parse(String),
}

impl From<reqwest::Error> for PandlError {
    fn from(err: reqwest::Error) -> Self {
        PandlError::Api(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PandlError>;
