// src/polled/sampler.rs

use super::PolledAnalyzer;
use crate::common::{
    error::AnalyzerError,
    hal_traits::{DatagramLink, Delay},
    reading::{parse_number, require_number, Reading, CLAMPED_ZERO},
    response::parse_ack_reply,
};

impl<L, D> PolledAnalyzer<L, D>
where
    L: DatagramLink,
    D: Delay,
{
    /// Polls the device for one reading, retrying silently within the budget.
    pub(super) fn poll_reading(&mut self) -> Reading {
        let channels = self.descriptor.channels();
        if !self.transport.is_open() {
            tracing::debug!(device = %self.descriptor.device_type, "sample on a closed session");
            return Reading::sentinel(channels);
        }

        let max_attempts = self.descriptor.max_attempts;
        for attempt in 1..=max_attempts {
            match self.sample_once(channels) {
                Ok(reading) => {
                    if reading.is_sentinel() {
                        tracing::warn!(device = %self.descriptor.device_type, "unparsable measurement payload");
                    }
                    return reading;
                }
                Err(e) => {
                    tracing::debug!(device = %self.descriptor.device_type, attempt, error = %e, "sample attempt failed");
                }
            }

            if attempt < max_attempts {
                self.delay.delay(self.descriptor.retry_backoff);
            }
        }

        tracing::warn!(
            device = %self.descriptor.device_type,
            attempts = max_attempts,
            "no measurement, reporting sentinel"
        );
        Reading::sentinel(channels)
    }

    fn sample_once(&mut self, channels: usize) -> Result<Reading, AnalyzerError> {
        let reply = self.transport.exchange()?;
        let ack = parse_ack_reply(reply, &self.descriptor.layout)?;
        self.status = ack.status_char();
        self.alarm = Some(ack.alarm_string());
        Ok(parse_payload(ack.payload, channels))
    }
}

/// Normalizes a measurement payload into a reading of `channels` fields.
///
/// Tokens are separated by single spaces. The leading token decides for the
/// whole reading: if it is not a number every channel becomes the sentinel.
/// Otherwise each token is reported verbatim, except that a token holding a
/// negative number is reported as `0.0`.
///
/// # Examples
///
/// ```
/// use airsense::polled::parse_payload;
///
/// assert_eq!(parse_payload(b"-5.0 3.2 7.1", 3).to_string(), "0.0;3.2;7.1");
/// assert_eq!(parse_payload(b"abc 1.0 2.0", 3).to_string(), "-100;-100;-100");
/// ```
pub fn parse_payload(payload: &[u8], channels: usize) -> Reading {
    match normalize_payload(payload, channels) {
        Ok(reading) => reading,
        Err(e) => {
            tracing::debug!(error = %e, "payload degraded to sentinel");
            Reading::sentinel(channels)
        }
    }
}

fn normalize_payload(payload: &[u8], channels: usize) -> Result<Reading, AnalyzerError> {
    let text = core::str::from_utf8(payload)
        .map_err(|_| AnalyzerError::ParseFailure(String::from_utf8_lossy(payload).into_owned()))?;

    let tokens: Vec<&str> = text
        .split(' ')
        .take(channels)
        .map(|t| t.trim_matches(|c: char| c.is_ascii_whitespace() || c.is_ascii_control()))
        .collect();
    if tokens.len() < channels {
        return Err(AnalyzerError::ParseFailure(text.to_string()));
    }
    if let Some(leading) = tokens.first() {
        require_number(leading)?;
    }

    Ok(Reading::from_fields(tokens.into_iter().map(|token| match parse_number(token) {
        Some(value) if value < 0.0 => CLAMPED_ZERO,
        _ => token,
    })))
}
