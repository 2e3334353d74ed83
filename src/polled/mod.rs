// src/polled/mod.rs

//! Request/response analyzers reached over UDP (AC32, AF22).

mod handshake;
mod sampler;
pub mod transport;

pub use sampler::parse_payload;
pub use transport::{FramedTransport, UdpLink};

use crate::common::{
    descriptor::{ConnectionType, DeviceDescriptor, Medium},
    error::AnalyzerError,
    hal_traits::{DatagramLink, Delay, StdDelay},
    reading::Reading,
};
use crate::device::{Analyzer, ConnectStatus, ConnectionParams};

/// Status character reported before the first reply.
pub const UNKNOWN_STATUS: char = 'U';

/// A datagram analyzer session: handshake, then synchronous polling.
///
/// One generic engine serves every datagram family; the descriptor supplies
/// the identifier, channel count, reply layout and retry budget.
#[derive(Debug)]
pub struct PolledAnalyzer<L, D>
where
    L: DatagramLink,
    D: Delay,
{
    descriptor: DeviceDescriptor,
    transport: FramedTransport<L>,
    delay: D,
    identity: String,
    status: char,
    alarm: Option<String>,
}

impl<L, D> PolledAnalyzer<L, D>
where
    L: DatagramLink,
    D: Delay,
{
    /// Builds a session for a network descriptor. No I/O happens until `connect`.
    pub fn new(descriptor: DeviceDescriptor, link: L, delay: D) -> Result<Self, AnalyzerError> {
        if !matches!(descriptor.medium, Medium::Network { .. }) {
            return Err(AnalyzerError::Config(format!(
                "{} is not a network analyzer",
                descriptor.device_type
            )));
        }
        let transport = FramedTransport::new(link, &descriptor.id_string)?;
        Ok(PolledAnalyzer {
            descriptor,
            transport,
            delay,
            identity: String::new(),
            status: UNKNOWN_STATUS,
            alarm: None,
        })
    }

    pub fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    pub fn link(&self) -> &L {
        self.transport.link()
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }

    pub fn is_open(&self) -> bool {
        self.transport.is_open()
    }

    fn endpoint(&self) -> (&str, u16) {
        match &self.descriptor.medium {
            Medium::Network { address, port } => (address.as_str(), *port),
            // `new` only accepts network descriptors
            Medium::Serial { .. } => ("", 0),
        }
    }
}

impl PolledAnalyzer<UdpLink, StdDelay> {
    /// Session for a descriptor over a real UDP socket.
    pub fn udp(descriptor: DeviceDescriptor) -> Result<Self, AnalyzerError> {
        Self::new(descriptor, UdpLink::new(), StdDelay)
    }

    /// Environnement AC32 (NO, NOx, NO2) with factory settings.
    pub fn ac32() -> Result<Self, AnalyzerError> {
        Self::udp(DeviceDescriptor::ac32())
    }

    /// Environnement AF22 (SO2) with factory settings.
    pub fn af22() -> Result<Self, AnalyzerError> {
        Self::udp(DeviceDescriptor::af22())
    }
}

impl<L, D> Analyzer for PolledAnalyzer<L, D>
where
    L: DatagramLink,
    D: Delay,
{
    fn connect(&mut self, port: Option<&str>) -> ConnectStatus {
        if let Some(port) = port {
            tracing::debug!(device = %self.descriptor.device_type, port, "port ignored, using configured endpoint");
        }
        self.run_handshake()
    }

    fn sample(&mut self) -> Reading {
        self.poll_reading()
    }

    fn connection_params(&self) -> ConnectionParams {
        let (address, port) = self.endpoint();
        ConnectionParams { endpoint: address.to_string(), port_or_baud: u32::from(port) }
    }

    fn connection_type(&self) -> ConnectionType {
        self.descriptor.connection_type()
    }

    fn identity(&self) -> &str {
        &self.identity
    }

    fn sensors(&self) -> &str {
        &self.descriptor.sensors
    }

    fn device_type(&self) -> &str {
        &self.descriptor.device_type
    }

    fn status(&self) -> Option<char> {
        Some(self.status)
    }

    fn alarm(&self) -> Option<&str> {
        self.alarm.as_deref()
    }

    fn terminate(&mut self) {
        if self.transport.is_open() {
            tracing::info!(device = %self.descriptor.device_type, "releasing socket");
        }
        self.transport.close();
    }
}

impl<L, D> Drop for PolledAnalyzer<L, D>
where
    L: DatagramLink,
    D: Delay,
{
    fn drop(&mut self) {
        self.transport.close();
    }
}
