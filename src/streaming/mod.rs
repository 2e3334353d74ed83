// src/streaming/mod.rs

//! Analyzers that stream measurement lines over a serial port (GO3).
//!
//! After identification a dedicated thread owns the port and keeps the most
//! recent reading in a shared cache; `sample` only reads that cache.
//!
//! Stopping a session clears the capture flag and joins the thread, so the
//! port is closed when `terminate`, `connect` or `drop` return. The wait is
//! bounded by one read timeout, plus the error pause if the last read failed.

mod capture;
mod identify;
#[cfg(feature = "serial")]
pub mod serial;

#[cfg(feature = "serial")]
pub use serial::SystemSerial;

use crate::common::{
    descriptor::{ConnectionType, DeviceDescriptor, Medium},
    error::AnalyzerError,
    hal_traits::{Delay, SerialOpener},
    reading::Reading,
    timing,
};
use crate::device::{Analyzer, ConnectStatus, ConnectionParams};
use capture::{serial_reader, CaptureLoop};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// A serial analyzer session with a background capture thread.
pub struct StreamingAnalyzer<O, D>
where
    O: SerialOpener,
    D: Delay,
{
    descriptor: DeviceDescriptor,
    opener: O,
    delay: D,
    identity: String,
    /// Path of the last successful connect.
    path: Option<String>,
    /// Fresh flag per session so a late reader never sees a later session's `true`.
    capturing: Arc<AtomicBool>,
    latest: Arc<RwLock<Reading>>,
    reader: Option<JoinHandle<()>>,
}

impl<O, D> StreamingAnalyzer<O, D>
where
    O: SerialOpener,
    D: Delay,
{
    /// Builds a session for a serial descriptor. No port is touched until `connect`.
    pub fn new(descriptor: DeviceDescriptor, opener: O, delay: D) -> Result<Self, AnalyzerError> {
        if !matches!(descriptor.medium, Medium::Serial { .. }) {
            return Err(AnalyzerError::Config(format!(
                "{} is not a serial analyzer",
                descriptor.device_type
            )));
        }
        let latest = Reading::zeroed(descriptor.channels());
        Ok(StreamingAnalyzer {
            descriptor,
            opener,
            delay,
            identity: String::new(),
            path: None,
            capturing: Arc::new(AtomicBool::new(false)),
            latest: Arc::new(RwLock::new(latest)),
            reader: None,
        })
    }

    pub fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    pub fn opener(&self) -> &O {
        &self.opener
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// True between a successful `connect` and `terminate`.
    pub fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::Acquire)
    }

    /// True while a capture thread is attached to this session.
    pub fn reader_running(&self) -> bool {
        self.reader.as_ref().map_or(false, |h| !h.is_finished())
    }

    fn baud_rate(&self) -> u32 {
        match &self.descriptor.medium {
            Medium::Serial { baud_rate, .. } => *baud_rate,
            // `new` only accepts serial descriptors
            Medium::Network { .. } => 0,
        }
    }

    fn is_rejected(&self, path: &str) -> bool {
        match &self.descriptor.medium {
            Medium::Serial { rejected_paths, .. } => rejected_paths.iter().any(|r| path.contains(r.as_str())),
            Medium::Network { .. } => true,
        }
    }

    /// Clears the flag and waits for the reader to drop the port.
    fn stop_capture(&mut self) {
        if self.capturing.swap(false, Ordering::AcqRel) {
            tracing::info!(device = %self.descriptor.device_type, identity = %self.identity, "capture stopping");
        }
        if let Some(handle) = self.reader.take() {
            if handle.join().is_err() {
                tracing::warn!(device = %self.descriptor.device_type, "capture thread panicked");
            }
            tracing::debug!(device = %self.descriptor.device_type, "serial port released");
        }
    }

    fn open_and_capture(&mut self, path: &str) -> ConnectStatus {
        let (baud_rate, identify_command, id_line) = match &self.descriptor.medium {
            Medium::Serial { baud_rate, identify_command, id_line, .. } => {
                (*baud_rate, *identify_command, id_line.clone())
            }
            Medium::Network { .. } => return ConnectStatus::NotFound,
        };

        let mut reader = match self.opener.open(path, baud_rate, self.descriptor.timeout) {
            Ok(channel) => serial_reader(channel),
            Err(e) => {
                tracing::warn!(device = %self.descriptor.device_type, path, error = %e, "cannot open serial port");
                return ConnectStatus::NotFound;
            }
        };

        if let Err(e) = self.identify(&mut reader, identify_command, &id_line) {
            tracing::warn!(
                device = %self.descriptor.device_type,
                path,
                attempts = self.descriptor.max_attempts,
                error = %e,
                "device did not identify, releasing port"
            );
            return ConnectStatus::NotFound;
        }

        let segment = path.rsplit('/').next().unwrap_or(path);
        let identity = format!("{}-{}", self.descriptor.device_type, segment);
        let capturing = Arc::new(AtomicBool::new(true));
        let capture = CaptureLoop {
            reader,
            capturing: capturing.clone(),
            latest: self.latest.clone(),
            channels: self.descriptor.channels(),
            max_line: timing::SERIAL_MAX_LINE,
            error_pause: self.descriptor.retry_backoff,
            device: identity.clone(),
        };

        let spawned = std::thread::Builder::new()
            .name(format!("{}-capture", identity))
            .spawn(move || capture.run());
        match spawned {
            Ok(handle) => {
                tracing::info!(device = %self.descriptor.device_type, %identity, path, "analyzer connected, capturing");
                self.capturing = capturing;
                self.reader = Some(handle);
                self.identity = identity;
                self.path = Some(path.to_string());
                ConnectStatus::Connected
            }
            Err(e) => {
                tracing::warn!(device = %self.descriptor.device_type, error = %e, "cannot start capture thread");
                ConnectStatus::NotFound
            }
        }
    }
}

#[cfg(feature = "serial")]
impl StreamingAnalyzer<SystemSerial, crate::common::hal_traits::StdDelay> {
    /// Session for a descriptor over real serial ports.
    pub fn system(descriptor: DeviceDescriptor) -> Result<Self, AnalyzerError> {
        Self::new(descriptor, SystemSerial, crate::common::hal_traits::StdDelay)
    }

    /// 2B Technologies GO3 with factory settings.
    pub fn go3() -> Result<Self, AnalyzerError> {
        Self::system(DeviceDescriptor::go3())
    }
}

impl<O, D> Analyzer for StreamingAnalyzer<O, D>
where
    O: SerialOpener,
    D: Delay,
{
    fn connect(&mut self, port: Option<&str>) -> ConnectStatus {
        self.stop_capture();
        self.identity.clear();

        let path = match port {
            Some(path) => path,
            None => {
                tracing::warn!(device = %self.descriptor.device_type, "no serial path given");
                return ConnectStatus::NotFound;
            }
        };
        if self.is_rejected(path) {
            tracing::debug!(device = %self.descriptor.device_type, path, "path excluded for this family");
            return ConnectStatus::NotFound;
        }
        self.open_and_capture(path)
    }

    fn sample(&mut self) -> Reading {
        self.latest.read().clone()
    }

    fn connection_params(&self) -> ConnectionParams {
        ConnectionParams {
            endpoint: self.path.clone().unwrap_or_default(),
            port_or_baud: self.baud_rate(),
        }
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

    fn terminate(&mut self) {
        self.stop_capture();
    }
}

impl<O, D> Drop for StreamingAnalyzer<O, D>
where
    O: SerialOpener,
    D: Delay,
{
    fn drop(&mut self) {
        self.stop_capture();
    }
}
