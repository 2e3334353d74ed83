// src/config.rs

use crate::common::{
    descriptor::{DeviceDescriptor, Family, Medium},
    error::AnalyzerError,
};
use core::time::Duration;
use serde::Deserialize;
use std::path::Path;

/// Installation-specific values for one family. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FamilyOverrides {
    pub address: Option<String>,
    pub port: Option<u16>,
    pub id_string: Option<String>,
    pub baud_rate: Option<u32>,
    pub max_attempts: Option<u32>,
    pub retry_backoff_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
}

/// Overrides for the built-in descriptors, one optional table per family.
///
/// ```toml
/// [ac32]
/// address = "10.0.0.5"
///
/// [go3]
/// baud_rate = 9600
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    pub ac32: Option<FamilyOverrides>,
    pub af22: Option<FamilyOverrides>,
    pub go3: Option<FamilyOverrides>,
}

impl AnalyzerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, AnalyzerError> {
        let config: AnalyzerConfig =
            toml::from_str(text).map_err(|e| AnalyzerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AnalyzerError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| AnalyzerError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    pub fn overrides(&self, family: Family) -> Option<&FamilyOverrides> {
        match family {
            Family::Ac32 => self.ac32.as_ref(),
            Family::Af22 => self.af22.as_ref(),
            Family::Go3 => self.go3.as_ref(),
        }
    }

    /// The built-in descriptor for `family` with this configuration applied.
    pub fn descriptor(&self, family: Family) -> DeviceDescriptor {
        let mut descriptor = DeviceDescriptor::for_family(family);
        if let Some(overrides) = self.overrides(family) {
            overrides.apply(&mut descriptor);
        }
        descriptor
    }

    fn validate(&self) -> Result<(), AnalyzerError> {
        for (name, overrides) in [("ac32", &self.ac32), ("af22", &self.af22), ("go3", &self.go3)] {
            let Some(overrides) = overrides else { continue };
            if overrides.max_attempts == Some(0) {
                return Err(AnalyzerError::Config(format!("[{}] max_attempts must be at least 1", name)));
            }
            if overrides.id_string.as_deref().is_some_and(|id| !id.is_ascii()) {
                return Err(AnalyzerError::Config(format!("[{}] id_string must be ASCII", name)));
            }
        }
        Ok(())
    }
}

impl FamilyOverrides {
    /// Writes the present keys into `descriptor`.
    ///
    /// Keys that do not apply to the descriptor's medium are ignored with a warning.
    pub fn apply(&self, descriptor: &mut DeviceDescriptor) {
        if let Some(id) = &self.id_string {
            descriptor.id_string = id.clone();
        }
        if let Some(n) = self.max_attempts {
            descriptor.max_attempts = n;
        }
        if let Some(ms) = self.retry_backoff_ms {
            descriptor.retry_backoff = Duration::from_millis(ms);
        }
        if let Some(ms) = self.timeout_ms {
            descriptor.timeout = Duration::from_millis(ms);
        }

        match &mut descriptor.medium {
            Medium::Network { address, port } => {
                if let Some(a) = &self.address {
                    *address = a.clone();
                }
                if let Some(p) = self.port {
                    *port = p;
                }
                if self.baud_rate.is_some() {
                    tracing::warn!(family = ?descriptor.family, "baud_rate ignored for a network analyzer");
                }
            }
            Medium::Serial { baud_rate, .. } => {
                if let Some(b) = self.baud_rate {
                    *baud_rate = b;
                }
                if self.address.is_some() || self.port.is_some() {
                    tracing::warn!(family = ?descriptor.family, "address/port ignored for a serial analyzer");
                }
            }
        }
    }
}
