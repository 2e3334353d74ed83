// src/common/hal_traits.rs

use core::time::Duration;
use std::io::{self, Read, Write};

/// Abstraction for the pauses between retry attempts.
///
/// Injected so tests can observe backoff without sleeping.
pub trait Delay {
    /// Delay for at least the specified number of milliseconds.
    fn delay_ms(&mut self, ms: u32);

    /// Delay for at least `duration`, rounded down to whole milliseconds.
    fn delay(&mut self, duration: Duration) {
        let ms = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        self.delay_ms(ms);
    }
}

/// Blocking delay on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl Delay for StdDelay {
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

/// A connectionless datagram endpoint owned by one device session.
///
/// The link holds at most one socket. `open` creates it, `close` releases it,
/// and `close` must be safe to call any number of times.
pub trait DatagramLink {
    /// Creates the socket used to talk to `address:port`.
    ///
    /// `timeout` bounds every subsequent `recv`.
    fn open(&mut self, address: &str, port: u16, timeout: Duration) -> io::Result<()>;

    fn is_open(&self) -> bool;

    /// Sends one datagram holding `frame` to the remote endpoint.
    fn send(&mut self, frame: &[u8]) -> io::Result<()>;

    /// Waits for one datagram and copies it into `buf`.
    ///
    /// A receive that outlives the timeout fails with `WouldBlock` or `TimedOut`.
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    fn close(&mut self);
}

/// A byte channel to a serial device, movable to the capture thread.
///
/// Reads are expected to give up after the channel's timeout with
/// `ErrorKind::TimedOut` (or `WouldBlock`).
pub trait SerialChannel: Read + Write + Send {}

impl<T: Read + Write + Send + ?Sized> SerialChannel for T {}

/// Opens serial channels by path.
pub trait SerialOpener {
    fn open(&self, path: &str, baud_rate: u32, timeout: Duration) -> io::Result<Box<dyn SerialChannel>>;
}
