// src/streaming/identify.rs

use super::capture::{read_line, SerialReader};
use super::StreamingAnalyzer;
use crate::common::{
    error::AnalyzerError,
    hal_traits::{Delay, SerialOpener},
    timing,
};
use std::io::Write;

impl<O, D> StreamingAnalyzer<O, D>
where
    O: SerialOpener,
    D: Delay,
{
    /// Writes the identify command until the device answers with its
    /// identification line or the budget runs out.
    ///
    /// The reader is left open either way; the caller decides its fate.
    pub(super) fn identify(
        &mut self,
        reader: &mut SerialReader,
        command: u8,
        id_line: &str,
    ) -> Result<(), AnalyzerError> {
        let max_attempts = self.descriptor.max_attempts;
        let mut last_error = AnalyzerError::Timeout;

        for attempt in 1..=max_attempts {
            match identify_once(reader, command, id_line.as_bytes()) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::debug!(device = %self.descriptor.device_type, attempt, error = %e, "identify attempt failed");
                    last_error = e;
                }
            }

            if attempt < max_attempts {
                self.delay.delay(self.descriptor.retry_backoff);
            }
        }
        Err(last_error)
    }
}

fn identify_once(reader: &mut SerialReader, command: u8, expected: &[u8]) -> Result<(), AnalyzerError> {
    let channel = reader.get_mut();
    channel.write_all(&[command])?;
    channel.flush()?;
    let line = read_line(reader, timing::SERIAL_MAX_LINE)?;
    if line.is_empty() {
        Err(AnalyzerError::Timeout)
    } else if line == expected {
        Ok(())
    } else {
        Err(AnalyzerError::ProtocolMismatch)
    }
}
