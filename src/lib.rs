// src/lib.rs

//! Communication layer for environmental gas analyzers.
//!
//! Two transport families sit behind one [`Analyzer`] contract:
//!
//! * [`PolledAnalyzer`] drives request/response analyzers over UDP with
//!   BCC-checksummed command frames (Environnement AC32 and AF22).
//! * [`StreamingAnalyzer`] identifies a continuously reporting analyzer on a
//!   serial port and caches its latest line from a background thread (2B GO3).
//!
//! Errors never escape the contract: connects report a [`ConnectStatus`],
//! samples report `-100` in every channel that could not be read.

pub mod common;
pub mod config;
pub mod device;
pub mod polled;
pub mod streaming;

#[cfg(test)]
mod mock;

// Re-export key types for convenience
pub use common::{AnalyzerError, DeviceDescriptor, Family, Reading};
pub use config::AnalyzerConfig;
pub use device::{Analyzer, ConnectStatus, ConnectionParams};
pub use polled::PolledAnalyzer;
pub use streaming::StreamingAnalyzer;
