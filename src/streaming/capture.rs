// src/streaming/capture.rs

use crate::common::{
    error::AnalyzerError,
    hal_traits::SerialChannel,
    reading::{require_number, Reading},
    timing,
};
use core::time::Duration;
use parking_lot::RwLock;
use std::io::{self, BufRead, BufReader, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Lines this short (a bare terminator, say) carry no measurement.
const MIN_LINE_LEN: usize = 2;

/// Buffered view of an open serial channel. Identification and capture use
/// the same reader, so bytes buffered during identify are not lost.
pub(super) type SerialReader = BufReader<Box<dyn SerialChannel>>;

pub(super) fn serial_reader(channel: Box<dyn SerialChannel>) -> SerialReader {
    BufReader::with_capacity(timing::SERIAL_MAX_LINE, channel)
}

/// Reads bytes up to and including `\n`.
///
/// A read timeout ends the line early: whatever arrived so far is returned,
/// possibly nothing. At most `max_len` bytes are collected.
pub(super) fn read_line<R: BufRead + ?Sized>(reader: &mut R, max_len: usize) -> io::Result<Vec<u8>> {
    let mut line = Vec::new();
    let limit = u64::try_from(max_len).unwrap_or(u64::MAX);
    match Read::take(&mut *reader, limit).read_until(b'\n', &mut line) {
        Ok(_) => Ok(line),
        // `read_until` keeps what it consumed before the error
        Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => Ok(line),
        Err(e) => Err(e),
    }
}

/// Turns one comma-separated output line into a reading.
///
/// Returns `None` for lines too short to hold data; the cache is left alone.
/// The first field must be numeric, and the first `channels` fields are kept
/// verbatim. Anything else yields an all-sentinel reading.
pub(super) fn parse_line(line: &[u8], channels: usize) -> Option<Reading> {
    if line.len() <= MIN_LINE_LEN {
        return None;
    }
    let reading = split_fields(line, channels).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "line degraded to sentinel");
        Reading::sentinel(channels)
    });
    Some(reading)
}

fn split_fields(line: &[u8], channels: usize) -> Result<Reading, AnalyzerError> {
    let text = core::str::from_utf8(line)
        .map_err(|_| AnalyzerError::ParseFailure(String::from_utf8_lossy(line).into_owned()))?;

    let fields: Vec<&str> = text
        .split(',')
        .take(channels)
        .map(|f| f.trim_matches(|c: char| c.is_ascii_whitespace() || c.is_ascii_control()))
        .collect();
    if let Some(leading) = fields.first() {
        require_number(leading)?;
    }
    if fields.len() < channels {
        return Err(AnalyzerError::ParseFailure(text.trim_end().to_string()));
    }
    Ok(Reading::from_fields(fields))
}

/// Background reader: owns the channel and refreshes the shared reading
/// until `capturing` is cleared. Returning drops the channel, which closes
/// the port.
pub(super) struct CaptureLoop {
    pub reader: SerialReader,
    pub capturing: Arc<AtomicBool>,
    pub latest: Arc<RwLock<Reading>>,
    pub channels: usize,
    pub max_line: usize,
    /// Pause after a hard read error so a dead port does not spin.
    pub error_pause: Duration,
    pub device: String,
}

impl CaptureLoop {
    pub fn run(mut self) {
        tracing::debug!(device = %self.device, "capture started");

        while self.capturing.load(Ordering::Acquire) {
            match read_line(&mut self.reader, self.max_line) {
                Ok(line) => {
                    if let Some(reading) = parse_line(&line, self.channels) {
                        if reading.is_sentinel() {
                            tracing::debug!(device = %self.device, line = %String::from_utf8_lossy(&line), "unparsable line");
                        }
                        *self.latest.write() = reading;
                    }
                }
                Err(e) => {
                    tracing::warn!(device = %self.device, error = %e, "serial read failed");
                    *self.latest.write() = Reading::sentinel(self.channels);
                    std::thread::sleep(self.error_pause);
                }
            }
        }

        tracing::debug!(device = %self.device, "capture stopped, releasing port");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::SerialScript;
    use std::time::Instant;

    #[test]
    fn test_read_line_stops_at_newline() {
        let script = SerialScript::new();
        script.push_bytes(b"12.5,400\r\nnext");
        let mut channel = BufReader::new(script.channel());

        assert_eq!(read_line(&mut channel, 256).unwrap(), b"12.5,400\r\n");
        // Remainder arrives, then the quiet line times out
        assert_eq!(read_line(&mut channel, 256).unwrap(), b"next");
        assert_eq!(read_line(&mut channel, 256).unwrap(), b"");
    }

    #[test]
    fn test_read_line_bounded() {
        let script = SerialScript::new();
        script.push_bytes(b"abcdefgh\n");
        let mut channel = BufReader::new(script.channel());
        assert_eq!(read_line(&mut channel, 4).unwrap(), b"abcd");
    }

    #[test]
    fn test_read_line_propagates_hard_errors() {
        let script = SerialScript::new();
        script.push_fail(io::ErrorKind::BrokenPipe);
        let mut channel = BufReader::new(script.channel());
        assert_eq!(read_line(&mut channel, 256).unwrap_err().kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_parse_line_keeps_first_two_fields() {
        let line = b"12.5,400,22.0,1013,0.8,0.0,01/02/21,10:00:00\r\n";
        assert_eq!(parse_line(line, 2).unwrap().to_string(), "12.5;400");
    }

    #[test]
    fn test_parse_line_bad_leading_field() {
        assert_eq!(parse_line(b"x,400\r\n", 2).unwrap().to_string(), "-100;-100");
        assert_eq!(parse_line(b"Ozone,CO2(ppm)\r\n", 2).unwrap().to_string(), "-100;-100");
    }

    #[test]
    fn test_parse_line_missing_second_field() {
        assert_eq!(parse_line(b"12.5\r\n", 2).unwrap().to_string(), "-100;-100");
    }

    #[test]
    fn test_parse_line_ignores_short_lines() {
        assert_eq!(parse_line(b"", 2), None);
        assert_eq!(parse_line(b"\r\n", 2), None);
    }

    #[test]
    fn test_parse_line_not_utf8() {
        assert!(parse_line(&[0xfe, b'1', b',', b'2', b'\n'], 2).unwrap().is_sentinel());
    }

    #[test]
    fn test_loop_updates_cache_and_stops() {
        let script = SerialScript::new();
        script.push_line("1.0,2.0,x\r\n");
        script.push_fail(io::ErrorKind::BrokenPipe);
        script.push_line("3.0,4.0\r\n");

        let capturing = Arc::new(AtomicBool::new(true));
        let latest = Arc::new(RwLock::new(Reading::zeroed(2)));
        let capture = CaptureLoop {
            reader: serial_reader(Box::new(script.channel())),
            capturing: capturing.clone(),
            latest: latest.clone(),
            channels: 2,
            max_line: 256,
            error_pause: Duration::from_millis(1),
            device: "2B-GO3".into(),
        };
        let handle = std::thread::spawn(move || capture.run());

        let deadline = Instant::now() + Duration::from_secs(2);
        while script.pending() > 0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(latest.read().to_string(), "3.0;4.0");

        capturing.store(false, Ordering::Release);
        handle.join().unwrap();
        assert_eq!(script.live_channels(), 0, "finished loop must close the port");
    }

    #[test]
    fn test_partial_line_survives_timeout() {
        let script = SerialScript::new();
        script.push_bytes(b"12.5,4");
        let mut reader = serial_reader(Box::new(script.channel()));
        assert_eq!(read_line(&mut reader, 256).unwrap(), b"12.5,4");

        script.push_bytes(b"00\r\n13.0,401\r\n");
        assert_eq!(read_line(&mut reader, 256).unwrap(), b"00\r\n");
        // Second line is already buffered; no further read is needed
        let reads = script.read_calls();
        assert_eq!(read_line(&mut reader, 256).unwrap(), b"13.0,401\r\n");
        assert_eq!(script.read_calls(), reads);
    }
}
