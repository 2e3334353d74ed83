// src/common/descriptor.rs

use super::response::ReplyLayout;
use super::timing;
use core::fmt;
use core::time::Duration;
use serde::Deserialize;

/// The analyzer families this crate knows how to drive.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    /// Environnement AC32 NO/NOx/NO2 analyzer (UDP).
    Ac32,
    /// Environnement AF22 SO2 analyzer (UDP).
    Af22,
    /// 2B Technologies GO3 ozone/CO2 monitor (serial, continuous output).
    Go3,
}

/// How a family is reached, with the medium-specific defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Medium {
    Network {
        address: String,
        port: u16,
    },
    Serial {
        baud_rate: u32,
        /// Byte written to request the identification line.
        identify_command: u8,
        /// Exact line, terminator included, that identifies the device.
        id_line: String,
        /// Path fragments of serial devices this family never lives on.
        rejected_paths: Vec<String>,
    },
}

/// Reported connection kind; the textual forms are what loggers downstream expect.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ConnectionType {
    Eth,
    Usb,
}

impl ConnectionType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConnectionType::Eth => "eth",
            ConnectionType::Usb => "usb",
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-family protocol constants. Built once, never mutated by a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub family: Family,
    /// Identifier sent inside every command frame (datagram families).
    pub id_string: String,
    pub device_type: String,
    /// Unit labels, one per channel, joined by `;`.
    pub sensors: String,
    pub medium: Medium,
    pub max_attempts: u32,
    pub retry_backoff: Duration,
    /// Per-attempt receive timeout.
    pub timeout: Duration,
    pub layout: ReplyLayout,
}

impl DeviceDescriptor {
    pub fn ac32() -> Self {
        DeviceDescriptor {
            family: Family::Ac32,
            id_string: "AC32".into(),
            device_type: "ENVIRONNEMENT-AC32".into(),
            sensors: "no[ppb];nox[ppb];no2[ppb]".into(),
            medium: Medium::Network { address: "192.168.20.43".into(), port: 8000 },
            max_attempts: timing::DATAGRAM_MAX_ATTEMPTS,
            retry_backoff: timing::DATAGRAM_RETRY_BACKOFF,
            timeout: timing::SOCKET_TIMEOUT,
            layout: ReplyLayout::STANDARD,
        }
    }

    pub fn af22() -> Self {
        DeviceDescriptor {
            family: Family::Af22,
            id_string: "AF22".into(),
            device_type: "ENVIRONNEMENT-AF22".into(),
            sensors: "so2[ppb]".into(),
            medium: Medium::Network { address: "192.168.20.42".into(), port: 8000 },
            max_attempts: timing::DATAGRAM_MAX_ATTEMPTS,
            retry_backoff: timing::DATAGRAM_RETRY_BACKOFF,
            timeout: timing::SOCKET_TIMEOUT,
            layout: ReplyLayout::STANDARD,
        }
    }

    pub fn go3() -> Self {
        DeviceDescriptor {
            family: Family::Go3,
            id_string: "GO3".into(),
            device_type: "2B-GO3".into(),
            sensors: "o3[ppb];co2[ppm]".into(),
            medium: Medium::Serial {
                baud_rate: 2400,
                identify_command: b'h',
                id_line: "Ozone,CO2(ppm),Temperature,Pressure,Flow,PDV,Date,Time\r\n".into(),
                rejected_paths: vec!["ttyACM".into(), "ttyAMA".into()],
            },
            max_attempts: timing::SERIAL_MAX_ATTEMPTS,
            retry_backoff: timing::SERIAL_RETRY_BACKOFF,
            timeout: timing::SERIAL_TIMEOUT,
            layout: ReplyLayout::STANDARD,
        }
    }

    pub fn for_family(family: Family) -> Self {
        match family {
            Family::Ac32 => Self::ac32(),
            Family::Af22 => Self::af22(),
            Family::Go3 => Self::go3(),
        }
    }

    /// Number of channels, one per unit label.
    pub fn channels(&self) -> usize {
        self.sensors.split(';').count()
    }

    pub fn connection_type(&self) -> ConnectionType {
        match self.medium {
            Medium::Network { .. } => ConnectionType::Eth,
            Medium::Serial { .. } => ConnectionType::Usb,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_counts() {
        assert_eq!(DeviceDescriptor::af22().channels(), 1);
        assert_eq!(DeviceDescriptor::go3().channels(), 2);
        assert_eq!(DeviceDescriptor::ac32().channels(), 3);
    }

    #[test]
    fn test_connection_types() {
        assert_eq!(DeviceDescriptor::ac32().connection_type().as_str(), "eth");
        assert_eq!(DeviceDescriptor::af22().connection_type(), ConnectionType::Eth);
        assert_eq!(DeviceDescriptor::go3().connection_type().to_string(), "usb");
    }

    #[test]
    fn test_factory_timing() {
        let ac32 = DeviceDescriptor::ac32();
        assert_eq!(ac32.max_attempts, 4);
        assert_eq!(ac32.retry_backoff, Duration::from_millis(200));
        assert_eq!(ac32.timeout, Duration::from_secs(2));

        let go3 = DeviceDescriptor::go3();
        assert_eq!(go3.max_attempts, 6);
        assert_eq!(go3.retry_backoff, Duration::from_millis(500));
    }

    #[test]
    fn test_for_family_round_trips() {
        for family in [Family::Ac32, Family::Af22, Family::Go3] {
            assert_eq!(DeviceDescriptor::for_family(family).family, family);
        }
    }
}
