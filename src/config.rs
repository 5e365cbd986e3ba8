//! Board configuration shared by desktop tests and the ESP32 firmware.
//!
//! Uses `heapless::String` for `no_std` compatibility while remaining
//! ergonomic to use on desktop with `std`.
//!
//! # Example
//!
//! ```rust
//! use greenhouse_rio::config::{Config, DeviceConfig, LightPositionConfig};
//!
//! // Use defaults
//! let config = Config::default();
//! assert_eq!(config.light.max_pulses, 34_115);
//!
//! // Or customize
//! let config = Config::default()
//!     .with_light(LightPositionConfig::default().with_max_pulses(20_000))
//!     .with_device(DeviceConfig::default().with_name("bay-3"));
//! ```

use heapless::String as HString;

use crate::light_position::{
    DEFAULT_DEADBAND, DEFAULT_MAX_PULSES, DEFAULT_REFRESH_INTERVAL_MS, DEFAULT_SETPOINT,
    FULL_SPEED,
};

/// Maximum length for short config strings (names, IDs)
pub const MAX_SHORT_STRING: usize = 32;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Create a ShortString from a &str, truncating at a character boundary
pub fn short_string(s: &str) -> ShortString {
    let mut end = s.len().min(MAX_SHORT_STRING);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    let mut hs = ShortString::new();
    let _ = hs.push_str(&s[..end]);
    hs
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete board configuration
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Light-position controller configuration
    pub light: LightPositionConfig,
    /// Device identification
    pub device: DeviceConfig,
}

impl Config {
    /// Set light-position configuration
    pub fn with_light(mut self, light: LightPositionConfig) -> Self {
        self.light = light;
        self
    }

    /// Set device configuration
    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.device = device;
        self
    }
}

// ============================================================================
// Light Position Config
// ============================================================================

/// Light-position controller configuration
///
/// Values here are the boot defaults; a saved record overrides max pulses,
/// position and setpoint.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LightPositionConfig {
    /// Pulse count at full travel
    pub max_pulses: i32,
    /// Setpoint until the host writes one (0-100)
    pub default_setpoint: u16,
    /// Tolerance around the setpoint in PV percent
    pub deadband: f32,
    /// Minimum time between control-loop evaluations
    pub refresh_interval_ms: u32,
    /// PWM level for drive commands
    pub drive_speed: u8,
    /// Start in calibration (manual jog) mode
    pub calibration_mode: bool,
    /// Whether the controller runs at all
    pub enabled: bool,
}

impl Default for LightPositionConfig {
    fn default() -> Self {
        Self {
            max_pulses: DEFAULT_MAX_PULSES,
            default_setpoint: DEFAULT_SETPOINT,
            deadband: DEFAULT_DEADBAND,
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            drive_speed: FULL_SPEED,
            calibration_mode: true,
            enabled: true,
        }
    }
}

impl LightPositionConfig {
    /// Set the full-travel pulse count (zero is ignored)
    pub fn with_max_pulses(mut self, max_pulses: i32) -> Self {
        if max_pulses != 0 {
            self.max_pulses = max_pulses;
        }
        self
    }

    /// Set the boot setpoint
    pub fn with_default_setpoint(mut self, setpoint: u16) -> Self {
        self.default_setpoint = setpoint;
        self
    }

    /// Set the deadband (negative values become zero)
    pub fn with_deadband(mut self, deadband: f32) -> Self {
        self.deadband = deadband.max(0.0);
        self
    }

    /// Set the refresh interval (zero is ignored)
    pub fn with_refresh_interval_ms(mut self, ms: u32) -> Self {
        if ms != 0 {
            self.refresh_interval_ms = ms;
        }
        self
    }

    /// Set the drive PWM level
    pub fn with_drive_speed(mut self, speed: u8) -> Self {
        self.drive_speed = speed;
        self
    }

    /// Start in calibration or automatic mode
    pub fn with_calibration_mode(mut self, calibration: bool) -> Self {
        self.calibration_mode = calibration;
        self
    }

    /// Enable or disable the controller
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

// ============================================================================
// Device Config
// ============================================================================

/// Device identification configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceConfig {
    /// Human-readable board name
    pub name: ShortString,
    /// Board ID on the greenhouse bus
    pub id: ShortString,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: short_string("greenhouse-rio"),
            id: short_string("rio1"),
        }
    }
}

impl DeviceConfig {
    /// Set the board name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = short_string(name);
        self
    }

    /// Set the board ID
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = short_string(id);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.light.max_pulses, 34_115);
        assert_eq!(config.light.default_setpoint, 50);
        assert_eq!(config.device.name.as_str(), "greenhouse-rio");
    }

    #[test]
    fn light_config_default() {
        let light = LightPositionConfig::default();
        assert_eq!(light.deadband, 0.15);
        assert_eq!(light.refresh_interval_ms, 150);
        assert_eq!(light.drive_speed, 255);
        assert!(light.calibration_mode);
        assert!(light.enabled);
    }

    #[test]
    fn light_config_builder() {
        let light = LightPositionConfig::default()
            .with_max_pulses(20_000)
            .with_default_setpoint(80)
            .with_deadband(0.5)
            .with_refresh_interval_ms(100)
            .with_drive_speed(180)
            .with_calibration_mode(false)
            .with_enabled(false);

        assert_eq!(light.max_pulses, 20_000);
        assert_eq!(light.default_setpoint, 80);
        assert_eq!(light.deadband, 0.5);
        assert_eq!(light.refresh_interval_ms, 100);
        assert_eq!(light.drive_speed, 180);
        assert!(!light.calibration_mode);
        assert!(!light.enabled);
    }

    #[test]
    fn light_config_rejects_zero() {
        let light = LightPositionConfig::default()
            .with_max_pulses(0)
            .with_refresh_interval_ms(0)
            .with_deadband(-1.0);

        assert_eq!(light.max_pulses, 34_115);
        assert_eq!(light.refresh_interval_ms, 150);
        assert_eq!(light.deadband, 0.0);
    }

    // =========================================================================
    // DeviceConfig Tests
    // =========================================================================

    #[test]
    fn device_config_builder() {
        let device = DeviceConfig::default()
            .with_name("North bay")
            .with_id("rio-7");

        assert_eq!(device.name.as_str(), "North bay");
        assert_eq!(device.id.as_str(), "rio-7");
    }

    // =========================================================================
    // String Helper Tests
    // =========================================================================

    #[test]
    fn short_string_truncation() {
        let long_input = "a".repeat(100);
        let s = short_string(&long_input);
        assert_eq!(s.len(), MAX_SHORT_STRING);
    }

    #[test]
    fn short_string_utf8_boundary() {
        // 3-byte characters: 32 is not a multiple of 3
        let input = "温室温室温室温室温室温室温室温室温室温室温室";
        let s = short_string(input);
        assert_eq!(s.len(), 30);
        assert!(core::str::from_utf8(s.as_bytes()).is_ok());
    }
}
