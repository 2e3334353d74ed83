// src/common/frame.rs

use super::bcc;
use super::error::AnalyzerError;
use arrayvec::ArrayVec;

/// Start-of-text marker opening every command frame.
pub const STX: u8 = 0x02;
/// End-of-text marker closing every command frame.
pub const ETX: u8 = 0x03;
/// Acknowledgement byte leading a positive reply.
pub const ACK: u8 = 0x06;

/// Command code requesting identification, status and the current measurement.
pub const READ_COMMAND: &[u8; 2] = b"16";

/// Fixed capacity of a command frame. Family IDs are four characters, so the
/// frames on the wire are 10 bytes; the headroom covers configured IDs.
pub const MAX_FRAME_LEN: usize = 32;

pub type CommandFrame = ArrayVec<u8, MAX_FRAME_LEN>;

/// Builds `STX | id | "16" | bcc-hi | bcc-lo | ETX`.
///
/// The BCC covers everything after the start marker up to the command code.
pub fn build_command_frame(id: &str) -> Result<CommandFrame, AnalyzerError> {
    let needed = 1 + id.len() + READ_COMMAND.len() + 2 + 1;
    if needed > MAX_FRAME_LEN {
        return Err(AnalyzerError::FrameOverflow { needed, capacity: MAX_FRAME_LEN });
    }

    let mut frame = CommandFrame::new();
    frame.push(STX);
    frame.extend(id.bytes());
    frame.extend(READ_COMMAND.iter().copied());
    let check = bcc::compute(&frame);
    frame.extend(check);
    frame.push(ETX);
    Ok(frame)
}

/// Splits a received command frame back into its ID and command code,
/// verifying the markers and the BCC characters.
///
/// Devices never send this shape; the function exists for simulators and tests
/// that stand in for the analyzer side of the link.
pub fn parse_command_frame(frame: &[u8]) -> Result<(&[u8], &[u8]), AnalyzerError> {
    // STX + 2-byte code + 2 BCC + ETX at minimum
    if frame.len() < 6 || frame[0] != STX || frame[frame.len() - 1] != ETX {
        return Err(AnalyzerError::ProtocolMismatch);
    }
    let bcc_start = frame.len() - 3;
    let body = &frame[..bcc_start];
    let received = bcc::decode_bcc_ascii([frame[bcc_start], frame[bcc_start + 1]])?;
    let calculated = bcc::calculate_bcc(&body[1..]);
    if received != calculated {
        return Err(AnalyzerError::ProtocolMismatch);
    }
    let code_start = body.len() - READ_COMMAND.len();
    Ok((&body[1..code_start], &body[code_start..]))
}
