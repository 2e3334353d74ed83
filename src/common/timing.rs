// src/common/timing.rs

use core::time::Duration;

// Values below are the factory defaults of the supported analyzers. Each
// DeviceDescriptor carries its own copy so installations can override them.

// === Datagram family (AC32 / AF22) ===

/// Bound on waiting for one reply datagram.
pub const SOCKET_TIMEOUT: Duration = Duration::from_secs(2);
/// Attempts per connect or sample call.
pub const DATAGRAM_MAX_ATTEMPTS: u32 = 4;
/// Pause after a failed attempt before the next one.
pub const DATAGRAM_RETRY_BACKOFF: Duration = Duration::from_millis(200);
/// Receive buffer for one reply datagram.
pub const DATAGRAM_RECV_BUFFER: usize = 1024;

// === Serial streaming family (GO3) ===

/// Read timeout of the serial channel; also bounds how long the capture
/// thread takes to notice a terminate request.
pub const SERIAL_TIMEOUT: Duration = Duration::from_secs(2);
/// Identification attempts during connect.
pub const SERIAL_MAX_ATTEMPTS: u32 = 6;
/// Pause after a failed identification attempt.
pub const SERIAL_RETRY_BACKOFF: Duration = Duration::from_millis(500);
/// Longest line accepted from the serial channel before it is cut.
pub const SERIAL_MAX_LINE: usize = 256;
