//! # Driver Configuration
//!
//! Caller-owned settings for one [`Printer`](super::Printer): which devices
//! to look for, how to pick one, the per-write payload ceiling, timeouts and
//! the paper profile used to lay out receipts.
//!
//! ## Usage
//!
//! ```
//! use struk::printer::{DriverConfig, PrinterProfile, SelectionPolicy};
//!
//! let mut config = DriverConfig::default();
//! config
//!     .set_selection(SelectionPolicy::Name("RPP02N".into()))
//!     .set_profile(PrinterProfile::MM80)
//!     .set_write_timeout_ms(Some(2_000));
//! assert!(config.validate().is_ok());
//!
//! let parsed = DriverConfig::from_json(r#"{ "max_chunk": 180 }"#)?;
//! assert_eq!(parsed.max_chunk, 180);
//! # Ok::<(), struk::error::ConfigError>(())
//! ```

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::protocol::qr::DEFAULT_MODULE_SIZE;
use crate::transport::writer::DEFAULT_MAX_CHUNK;
use crate::transport::{DeviceHandle, ServiceFilter};

/// Default discovery and connect timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// # Printer Profile
///
/// Paper characteristics used when laying out text.
///
/// | Profile | Paper | Columns (Font A) |
/// |---------|-------|------------------|
/// | MM58 | 58mm | 32 |
/// | MM80 | 80mm | 48 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterProfile {
    /// Characters per line in the default font.
    pub columns: usize,
    /// QR module size in dots.
    pub qr_module_size: u8,
}

impl PrinterProfile {
    /// 58mm portable printers (the common Bluetooth receipt printer).
    pub const MM58: Self = Self {
        columns: 32,
        qr_module_size: DEFAULT_MODULE_SIZE,
    };

    /// 80mm counter printers.
    pub const MM80: Self = Self {
        columns: 48,
        qr_module_size: DEFAULT_MODULE_SIZE,
    };
}

impl Default for PrinterProfile {
    fn default() -> Self {
        Self::MM58
    }
}

/// How to pick one device out of the scan results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// First device the radio reported.
    #[default]
    FirstMatch,
    /// First device whose display name matches exactly.
    Name(String),
    /// The device with this identifier.
    Id(String),
}

impl SelectionPolicy {
    pub fn select<'a>(&self, devices: &'a [DeviceHandle]) -> Option<&'a DeviceHandle> {
        match self {
            SelectionPolicy::FirstMatch => devices.first(),
            SelectionPolicy::Name(name) => devices.iter().find(|d| &d.name == name),
            SelectionPolicy::Id(id) => devices.iter().find(|d| d.id.eq_ignore_ascii_case(id)),
        }
    }
}

/// Driver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Service identifier used as scan filter.
    pub service: ServiceFilter,
    pub selection: SelectionPolicy,
    /// Per-write payload ceiling in bytes.
    pub max_chunk: usize,
    pub scan_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    /// Per-chunk acknowledgement timeout. `None` waits indefinitely.
    pub write_timeout_ms: Option<u64>,
    pub profile: PrinterProfile,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            service: ServiceFilter::default(),
            selection: SelectionPolicy::default(),
            max_chunk: DEFAULT_MAX_CHUNK,
            scan_timeout_ms: DEFAULT_TIMEOUT_MS,
            connect_timeout_ms: DEFAULT_TIMEOUT_MS,
            write_timeout_ms: None,
            profile: PrinterProfile::default(),
        }
    }
}

impl DriverConfig {
    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_chunk == 0 {
            return Err(ConfigError::ZeroChunk);
        }
        if self.profile.columns == 0 {
            return Err(ConfigError::ZeroColumns(format!("{:?}", self.profile)));
        }
        Ok(())
    }

    /// Set the per-write payload ceiling.
    ///
    /// Larger chunks are faster but only safe when the link negotiated a
    /// larger MTU. Default is 20 bytes.
    pub fn set_max_chunk(&mut self, bytes: usize) -> &mut Self {
        self.max_chunk = bytes;
        self
    }

    pub fn set_service(&mut self, service: ServiceFilter) -> &mut Self {
        self.service = service;
        self
    }

    pub fn set_selection(&mut self, selection: SelectionPolicy) -> &mut Self {
        self.selection = selection;
        self
    }

    pub fn set_scan_timeout_ms(&mut self, ms: u64) -> &mut Self {
        self.scan_timeout_ms = ms;
        self
    }

    pub fn set_connect_timeout_ms(&mut self, ms: u64) -> &mut Self {
        self.connect_timeout_ms = ms;
        self
    }

    pub fn set_write_timeout_ms(&mut self, ms: Option<u64>) -> &mut Self {
        self.write_timeout_ms = ms;
        self
    }

    pub fn set_profile(&mut self, profile: PrinterProfile) -> &mut Self {
        self.profile = profile;
        self
    }

    pub fn chunk_size(&self) -> Result<NonZeroUsize, ConfigError> {
        NonZeroUsize::new(self.max_chunk).ok_or(ConfigError::ZeroChunk)
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_millis(self.scan_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        self.write_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn devices() -> Vec<DeviceHandle> {
        vec![
            DeviceHandle::new("AA:AA", "MPT-II"),
            DeviceHandle::new("BB:BB", "RPP02N"),
        ]
    }

    #[test]
    fn test_defaults_are_conservative() {
        let config = DriverConfig::default();
        assert_eq!(config.max_chunk, 20);
        assert_eq!(config.write_timeout(), None);
        assert_eq!(config.scan_timeout(), Duration::from_secs(10));
        assert_eq!(config.profile.columns, 32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_chunk_rejected() {
        let mut config = DriverConfig::default();
        config.set_max_chunk(0);
        assert!(matches!(config.validate(), Err(ConfigError::ZeroChunk)));
        assert!(config.chunk_size().is_err());
    }

    #[test]
    fn test_zero_columns_rejected() {
        let mut config = DriverConfig::default();
        config.set_profile(PrinterProfile {
            columns: 0,
            qr_module_size: 6,
        });
        assert!(matches!(config.validate(), Err(ConfigError::ZeroColumns(_))));
    }

    #[test]
    fn test_from_json_partial() {
        let config = DriverConfig::from_json(
            r#"{
                "selection": { "by": "name", "value": "RPP02N" },
                "write_timeout_ms": 1500,
                "profile": { "columns": 48, "qr_module_size": 4 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.selection, SelectionPolicy::Name("RPP02N".into()));
        assert_eq!(config.write_timeout(), Some(Duration::from_millis(1500)));
        assert_eq!(config.max_chunk, 20);
        assert_eq!(config.profile.columns, 48);
    }

    #[test]
    fn test_from_json_validates() {
        assert!(matches!(
            DriverConfig::from_json(r#"{ "max_chunk": 0 }"#),
            Err(ConfigError::ZeroChunk)
        ));
        assert!(matches!(
            DriverConfig::from_json("not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_selection_policies() {
        let devices = devices();
        assert_eq!(
            SelectionPolicy::FirstMatch.select(&devices).map(|d| d.id.as_str()),
            Some("AA:AA")
        );
        assert_eq!(
            SelectionPolicy::Name("RPP02N".into())
                .select(&devices)
                .map(|d| d.id.as_str()),
            Some("BB:BB")
        );
        assert_eq!(
            SelectionPolicy::Id("bb:bb".into())
                .select(&devices)
                .map(|d| d.name.as_str()),
            Some("RPP02N")
        );
        assert!(SelectionPolicy::Name("nope".into()).select(&devices).is_none());
        assert!(SelectionPolicy::FirstMatch.select(&[]).is_none());
    }
}
