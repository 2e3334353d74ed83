// src/polled/transport.rs

use crate::common::{
    error::AnalyzerError,
    frame::{build_command_frame, CommandFrame},
    hal_traits::DatagramLink,
    timing,
};
use core::time::Duration;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

/// One framed request/response attempt over a [`DatagramLink`].
///
/// The command frame is fixed per family, so it is built once. `exchange`
/// never retries; retry policy belongs to the handshake and the sampler.
#[derive(Debug)]
pub struct FramedTransport<L> {
    link: L,
    frame: CommandFrame,
    buffer: Vec<u8>,
}

impl<L: DatagramLink> FramedTransport<L> {
    pub fn new(link: L, id: &str) -> Result<Self, AnalyzerError> {
        Ok(FramedTransport {
            link,
            frame: build_command_frame(id)?,
            buffer: vec![0u8; timing::DATAGRAM_RECV_BUFFER],
        })
    }

    /// Creates the socket. Failure here is never retried.
    pub fn open(&mut self, address: &str, port: u16, timeout: Duration) -> Result<(), AnalyzerError> {
        self.link
            .open(address, port, timeout)
            .map_err(|e| AnalyzerError::ResourceUnavailable(format!("{}:{}: {}", address, port, e)))
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.link.is_open()
    }

    /// Sends the command frame and waits for one reply datagram.
    ///
    /// # Returns
    ///
    /// * `Ok(reply)` borrowed from the internal receive buffer.
    /// * `Err(AnalyzerError::Timeout)` if nothing arrived within the link timeout.
    /// * `Err(AnalyzerError::Transport)` for any other I/O failure.
    pub fn exchange(&mut self) -> Result<&[u8], AnalyzerError> {
        if !self.link.is_open() {
            return Err(AnalyzerError::Transport(io::Error::from(io::ErrorKind::NotConnected)));
        }
        self.link.send(&self.frame).map_err(AnalyzerError::from_io)?;
        let len = self.link.recv(&mut self.buffer).map_err(AnalyzerError::from_io)?;
        Ok(&self.buffer[..len.min(self.buffer.len())])
    }

    pub fn close(&mut self) {
        self.link.close();
    }

    pub fn link(&self) -> &L {
        &self.link
    }
}

/// [`DatagramLink`] over a `std::net::UdpSocket` bound to an ephemeral local port.
#[derive(Debug, Default)]
pub struct UdpLink {
    socket: Option<UdpSocket>,
    remote: Option<SocketAddr>,
}

impl UdpLink {
    pub fn new() -> Self {
        Self::default()
    }

    fn parts(&self) -> io::Result<(&UdpSocket, SocketAddr)> {
        match (&self.socket, self.remote) {
            (Some(socket), Some(remote)) => Ok((socket, remote)),
            _ => Err(io::Error::from(io::ErrorKind::NotConnected)),
        }
    }
}

impl DatagramLink for UdpLink {
    fn open(&mut self, address: &str, port: u16, timeout: Duration) -> io::Result<()> {
        self.close();

        let remote = (address, port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "address did not resolve"))?;
        let local: SocketAddr = if remote.is_ipv4() {
            ([0u8; 4], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };

        let socket = UdpSocket::bind(local)?;
        socket.set_read_timeout(Some(timeout))?;
        self.socket = Some(socket);
        self.remote = Some(remote);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.socket.is_some()
    }

    fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        let (socket, remote) = self.parts()?;
        socket.send_to(frame, remote)?;
        Ok(())
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let (socket, _) = self.parts()?;
        let (len, _from) = socket.recv_from(buf)?;
        Ok(len)
    }

    fn close(&mut self) {
        // Dropping the socket closes it
        self.socket = None;
        self.remote = None;
    }
}
