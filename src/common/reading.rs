// src/common/reading.rs

use super::error::AnalyzerError;
use core::fmt;

/// Value substituted for a channel whose reading could not be obtained.
pub const ERROR_SENTINEL: &str = "-100";

/// Text reported for a channel whose measurement was clamped at zero.
pub const CLAMPED_ZERO: &str = "0.0";

/// One normalized sample: a field per declared channel, in declared order.
///
/// Fields keep the device's own textual representation; numbers are never
/// re-formatted. `Display` joins them with `;`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    fields: Vec<String>,
}

impl Reading {
    /// All channels set to [`ERROR_SENTINEL`].
    pub fn sentinel(channels: usize) -> Self {
        Reading { fields: vec![ERROR_SENTINEL.to_string(); channels] }
    }

    /// All channels set to [`CLAMPED_ZERO`].
    pub fn zeroed(channels: usize) -> Self {
        Reading { fields: vec![CLAMPED_ZERO.to_string(); channels] }
    }

    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Reading { fields: fields.into_iter().map(Into::into).collect() }
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// True when every channel carries the error sentinel.
    pub fn is_sentinel(&self) -> bool {
        !self.fields.is_empty() && self.fields.iter().all(|f| f == ERROR_SENTINEL)
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            f.write_str(field)?;
        }
        Ok(())
    }
}

/// Parses a numeric token the way the analyzers format them: surrounding
/// ASCII whitespace is tolerated, anything else must be a float literal.
pub fn parse_number(token: &str) -> Option<f64> {
    token.trim().parse::<f64>().ok()
}

/// Like [`parse_number`], but names the offending token on failure.
pub fn require_number(token: &str) -> Result<f64, AnalyzerError> {
    parse_number(token).ok_or_else(|| AnalyzerError::ParseFailure(token.to_string()))
}
