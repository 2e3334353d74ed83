// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod bcc;
pub mod descriptor;
pub mod error;
pub mod frame;
pub mod hal_traits;
pub mod reading;
pub mod response;
pub mod timing;

// --- Re-export key types/traits/functions for easier access ---

// From bcc.rs
pub use bcc::{calculate_bcc, decode_bcc_ascii, encode_bcc_ascii};

// From descriptor.rs
pub use descriptor::{ConnectionType, DeviceDescriptor, Family, Medium};

// From error.rs
pub use error::AnalyzerError;

// From frame.rs
pub use frame::{build_command_frame, CommandFrame, ACK, ETX, STX};

// From hal_traits.rs
pub use hal_traits::{DatagramLink, Delay, SerialChannel, SerialOpener, StdDelay};

// From reading.rs
pub use reading::{Reading, ERROR_SENTINEL};

// From response.rs
pub use response::{parse_ack_reply, AckReply, ReplyLayout};

// timing.rs constants are reached through common::timing::*
