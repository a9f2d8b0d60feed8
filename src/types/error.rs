//! Structured errors for the facial-animation synthesizers
//!
//! None of these are fatal: the caller decides the degraded behavior
//! (typically skipping facial animation and carrying on).

use thiserror::Error;

/// Errors returned by the blink and lip-sync synthesizers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FacialError {
    /// start() while the synthesizer is already active; state unchanged
    #[error("lip sync is already running")]
    AlreadyRunning,

    /// stop() while the synthesizer is inactive; state unchanged
    #[error("lip sync is already stopped")]
    AlreadyStopped,

    /// The expression sink reported itself unavailable
    #[error("expression sink not available")]
    SinkUnavailable,
}

impl FacialError {
    /// Numeric code carried alongside the message in API responses
    pub fn code(&self) -> u16 {
        match self {
            FacialError::AlreadyRunning => 300,
            FacialError::AlreadyStopped => 301,
            FacialError::SinkUnavailable => 302,
        }
    }
}
