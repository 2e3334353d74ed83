// src/common/error.rs

use std::io;

/// Failure classes of the analyzer communication layer.
///
/// The device contract never surfaces these directly: handshakes fold them
/// into a [`ConnectStatus`](crate::device::ConnectStatus) and sampling folds
/// them into error-sentinel readings. They are the currency of the internal
/// single-attempt helpers and of the configuration loader.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    /// Socket creation or serial port open failed.
    #[error("transport unavailable: {0}")]
    ResourceUnavailable(String),

    /// No reply arrived within the per-attempt bound.
    #[error("operation timed out")]
    Timeout,

    /// I/O failure other than a timeout.
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    /// A reply arrived but failed the acknowledgement or identification check.
    #[error("unexpected reply from device")]
    ProtocolMismatch,

    /// A payload was present but did not hold a number where one was expected.
    #[error("payload is not numeric: {0:?}")]
    ParseFailure(String),

    /// A byte that is not an uppercase ASCII hex digit where a BCC character was expected.
    #[error("invalid BCC character: {0:#04x}")]
    InvalidCharacter(u8),

    /// Command frame does not fit the fixed frame buffer.
    #[error("frame overflow: needed {needed}, capacity {capacity}")]
    FrameOverflow { needed: usize, capacity: usize },

    /// Configuration could not be parsed or holds an unusable value.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AnalyzerError {
    /// Classifies an I/O error from a transport, separating timeouts from other failures.
    ///
    /// Sockets with a read timeout report `WouldBlock` on Unix and `TimedOut` on Windows.
    pub fn from_io(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => AnalyzerError::Timeout,
            _ => AnalyzerError::Transport(err),
        }
    }

    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, AnalyzerError::Timeout)
    }
}

pub type Result<T> = core::result::Result<T, AnalyzerError>;
