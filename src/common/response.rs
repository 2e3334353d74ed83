// src/common/response.rs

use super::error::AnalyzerError;
use super::frame::ACK;
use core::ops::Range;

/// Byte offsets of the fixed-layout acknowledgement reply.
///
/// ```text
/// 0      1..5      ..   13      14..16   16   17..
/// ACK    identity       status  alarm         payload (space separated)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyLayout {
    pub identity: Range<usize>,
    pub status: usize,
    pub alarm: Range<usize>,
    pub payload: usize,
}

impl ReplyLayout {
    /// Layout shared by the datagram analyzer families.
    pub const STANDARD: ReplyLayout = ReplyLayout {
        identity: 1..5,
        status: 13,
        alarm: 14..16,
        payload: 17,
    };

    /// Shortest reply that holds every field plus at least one payload byte.
    pub fn min_len(&self) -> usize {
        let fixed = self.identity.end.max(self.status + 1).max(self.alarm.end);
        fixed.max(self.payload + 1)
    }
}

impl Default for ReplyLayout {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Fields of a positive reply, borrowed from the receive buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AckReply<'a> {
    pub identity: &'a [u8],
    pub status: u8,
    pub alarm: &'a [u8],
    pub payload: &'a [u8],
}

impl AckReply<'_> {
    pub fn identity_string(&self) -> String {
        String::from_utf8_lossy(self.identity).into_owned()
    }

    pub fn status_char(&self) -> char {
        char::from(self.status)
    }

    pub fn alarm_string(&self) -> String {
        String::from_utf8_lossy(self.alarm).into_owned()
    }
}

/// Checks the acknowledgement byte and slices the fixed fields out of a reply.
///
/// # Returns
///
/// * `Ok(AckReply)` if the reply starts with ACK and is long enough for `layout`.
/// * `Err(AnalyzerError::ProtocolMismatch)` for empty, non-ACK or truncated replies.
pub fn parse_ack_reply<'a>(reply: &'a [u8], layout: &ReplyLayout) -> Result<AckReply<'a>, AnalyzerError> {
    match reply.first() {
        Some(&ACK) => {}
        _ => return Err(AnalyzerError::ProtocolMismatch),
    }
    if reply.len() < layout.min_len() {
        return Err(AnalyzerError::ProtocolMismatch);
    }

    Ok(AckReply {
        identity: &reply[layout.identity.clone()],
        status: reply[layout.status],
        alarm: &reply[layout.alarm.clone()],
        payload: &reply[layout.payload..],
    })
}

#[cfg(test)]
pub(crate) fn sample_reply(identity: &[u8; 4], status: u8, alarm: &[u8; 2], payload: &str) -> Vec<u8> {
    let mut reply = Vec::with_capacity(18 + payload.len());
    reply.push(ACK);
    reply.extend_from_slice(identity);
    reply.extend_from_slice(b"        "); // 5..13, unused by the driver
    reply.push(status);
    reply.extend_from_slice(alarm);
    reply.push(b' ');
    reply.extend_from_slice(payload.as_bytes());
    reply
}
