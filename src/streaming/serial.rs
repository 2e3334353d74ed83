// src/streaming/serial.rs

use crate::common::hal_traits::{SerialChannel, SerialOpener};
use core::time::Duration;
use serialport::FlowControl;
use std::io;

/// Opens operating-system serial ports through the `serialport` crate.
///
/// Ports are opened 8N1 without flow control; `timeout` bounds every read.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSerial;

impl SerialOpener for SystemSerial {
    fn open(&self, path: &str, baud_rate: u32, timeout: Duration) -> io::Result<Box<dyn SerialChannel>> {
        let port = serialport::new(path, baud_rate)
            .timeout(timeout)
            .flow_control(FlowControl::None)
            .open()
            .map_err(io::Error::from)?;
        Ok(Box::new(port))
    }
}
