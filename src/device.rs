// src/device.rs

//! The contract shared by every analyzer variant.

use crate::common::{descriptor::ConnectionType, reading::Reading};
use core::fmt;

/// Outcome of [`Analyzer::connect`].
///
/// Only [`ConnectStatus::Connected`] means the device is usable. The failure
/// variants tell apart why a datagram handshake gave up; the serial family
/// only ever reports `NotFound` on failure.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ConnectStatus {
    /// Socket could not be created, serial path refused or unopenable, or the
    /// device never identified itself.
    NotFound,
    Connected,
    /// Every attempt of the budget ended without a reply; the last one timed out.
    TimeoutExhausted,
    /// The budget ran out and the last attempt failed with an I/O error.
    TransportErrorExhausted,
    /// The budget ran out and the last reply was not an acknowledgement.
    NoAckExhausted,
}

impl ConnectStatus {
    /// Integer code used by schedulers and logs: `1` is the only success.
    pub const fn code(&self) -> u8 {
        match self {
            ConnectStatus::NotFound => 0,
            ConnectStatus::Connected => 1,
            ConnectStatus::TimeoutExhausted => 2,
            ConnectStatus::TransportErrorExhausted => 3,
            ConnectStatus::NoAckExhausted => 4,
        }
    }

    #[inline]
    pub const fn is_connected(&self) -> bool {
        matches!(self, ConnectStatus::Connected)
    }
}

impl fmt::Display for ConnectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ConnectStatus::NotFound => "not found",
            ConnectStatus::Connected => "connected",
            ConnectStatus::TimeoutExhausted => "no reply (timeout)",
            ConnectStatus::TransportErrorExhausted => "transport error",
            ConnectStatus::NoAckExhausted => "not acknowledged",
        };
        f.write_str(text)
    }
}

/// Where a device is reached: network endpoint and port, or serial path and baud rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub endpoint: String,
    pub port_or_baud: u32,
}

/// Uniform interface over every analyzer family.
///
/// Implementations never fail visibly: connection problems surface as a
/// [`ConnectStatus`], sampling problems as error-sentinel fields in the
/// returned [`Reading`].
pub trait Analyzer {
    /// Runs the handshake and, for streaming devices, starts capturing.
    ///
    /// Network analyzers use their configured endpoint and ignore `port`;
    /// serial analyzers need the serial path in `port`.
    fn connect(&mut self, port: Option<&str>) -> ConnectStatus;

    /// Returns one reading with exactly one field per declared channel.
    fn sample(&mut self) -> Reading;

    fn connection_params(&self) -> ConnectionParams;

    fn connection_type(&self) -> ConnectionType;

    /// Identity discovered by the handshake; empty until a handshake succeeds.
    fn identity(&self) -> &str;

    /// Unit labels of the channels, joined by `;`.
    fn sensors(&self) -> &str;

    fn device_type(&self) -> &str;

    /// Last status character reported by the device, for families that report one.
    fn status(&self) -> Option<char> {
        None
    }

    /// Last alarm code pair reported by the device, for families that report one.
    fn alarm(&self) -> Option<&str> {
        None
    }

    /// Releases the transport. Idempotent.
    fn terminate(&mut self);
}
