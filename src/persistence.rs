//! Persisted light-position settings.
//!
//! The remote I/O board keeps the taught travel length, the last known pulse
//! count and the setpoint across power cycles. The record is 11 bytes:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 1 | configured flag (`2`) |
//! | 1 | 4 | max pulses, `i32` little-endian |
//! | 5 | 4 | raw position, `i32` little-endian |
//! | 9 | 2 | setpoint, `u16` little-endian |
//!
//! Any other flag value (erased flash reads `0xFF`) means "never saved".
//!
//! # Example
//!
//! ```rust
//! use greenhouse_rio::persistence::{PositionRecord, RECORD_LEN};
//!
//! let record = PositionRecord {
//!     max_pulses: 34_115,
//!     raw_position: 1_200,
//!     setpoint: 75,
//! };
//!
//! let bytes = record.to_bytes();
//! assert_eq!(bytes.len(), RECORD_LEN);
//! assert_eq!(PositionRecord::from_bytes(&bytes), Some(record));
//!
//! assert_eq!(PositionRecord::from_bytes(&[0xFF; RECORD_LEN]), None);
//! ```

use crate::light_position::LightPositionManager;
use crate::traits::{ActuatorDriver, PositionSensor};

/// Flag byte marking a written record.
pub const CONFIGURED_FLAG: u8 = 2;

/// Encoded record size in bytes.
pub const RECORD_LEN: usize = 11;

/// Settings restored at boot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionRecord {
    /// Pulse count at full travel.
    pub max_pulses: i32,
    /// Pulse count when saved.
    pub raw_position: i32,
    /// Setpoint when saved.
    pub setpoint: u16,
}

impl PositionRecord {
    /// Encode with the configured flag set.
    pub fn to_bytes(&self) -> [u8; RECORD_LEN] {
        let mut out = [0u8; RECORD_LEN];
        out[0] = CONFIGURED_FLAG;
        out[1..5].copy_from_slice(&self.max_pulses.to_le_bytes());
        out[5..9].copy_from_slice(&self.raw_position.to_le_bytes());
        out[9..11].copy_from_slice(&self.setpoint.to_le_bytes());
        out
    }

    /// Decode a stored record.
    ///
    /// Returns `None` for short input or a missing configured flag.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < RECORD_LEN || bytes[0] != CONFIGURED_FLAG {
            return None;
        }
        let max_pulses = i32::from_le_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]);
        let raw_position = i32::from_le_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]);
        let setpoint = u16::from_le_bytes([bytes[9], bytes[10]]);
        Some(Self {
            max_pulses,
            raw_position,
            setpoint,
        })
    }

    /// Snapshot the manager's persistent fields.
    pub fn capture<S: PositionSensor, A: ActuatorDriver>(
        manager: &LightPositionManager<S, A>,
    ) -> Self {
        Self {
            max_pulses: manager.max_pulses(),
            raw_position: manager.raw_pv(),
            setpoint: manager.sp(),
        }
    }

    /// Load the record into the manager, seeding the encoder.
    ///
    /// Max pulses is applied first so the seeded count maps to the right PV.
    pub fn restore<S: PositionSensor, A: ActuatorDriver>(
        &self,
        manager: &mut LightPositionManager<S, A>,
    ) {
        manager.set_max_pulses(self.max_pulses);
        manager.set_raw_position(self.raw_position);
        manager.set_setpoint(self.setpoint);
    }
}

/// Non-volatile storage for a [`PositionRecord`].
///
/// Implementations decide where the bytes live (NVS partition, EEPROM,
/// a file); [`PositionRecord::to_bytes`] gives the canonical layout.
pub trait SettingsStore {
    /// Error type for storage operations.
    type Error;

    /// Read the saved record, `None` if nothing valid has been saved.
    fn load(&mut self) -> Result<Option<PositionRecord>, Self::Error>;

    /// Persist `record`, replacing any previous one.
    fn save(&mut self, record: &PositionRecord) -> Result<(), Self::Error>;
}

impl<T: SettingsStore + ?Sized> SettingsStore for &mut T {
    type Error = T::Error;

    fn load(&mut self) -> Result<Option<PositionRecord>, Self::Error> {
        T::load(self)
    }

    fn save(&mut self, record: &PositionRecord) -> Result<(), Self::Error> {
        T::save(self, record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{MockOutput, MockPositionSensor};

    #[test]
    fn layout_is_flag_then_little_endian_fields() {
        let record = PositionRecord {
            max_pulses: 0x0102_0304,
            raw_position: -2,
            setpoint: 0x0506,
        };
        assert_eq!(
            record.to_bytes(),
            [2, 0x04, 0x03, 0x02, 0x01, 0xFE, 0xFF, 0xFF, 0xFF, 0x06, 0x05]
        );
    }

    #[test]
    fn unconfigured_or_short_records_rejected() {
        let mut bytes = PositionRecord {
            max_pulses: 100,
            raw_position: 5,
            setpoint: 50,
        }
        .to_bytes();

        assert!(PositionRecord::from_bytes(&bytes[..RECORD_LEN - 1]).is_none());

        bytes[0] = 0;
        assert!(PositionRecord::from_bytes(&bytes).is_none());
    }

    #[test]
    fn restore_then_capture_matches() {
        let mut manager = LightPositionManager::from_lines(
            MockPositionSensor::new(),
            MockOutput::new("In1"),
            MockOutput::new("In2"),
            MockOutput::new("EnA"),
        )
        .unwrap();

        let record = PositionRecord {
            max_pulses: 2_000,
            raw_position: 500,
            setpoint: 30,
        };
        record.restore(&mut manager);

        assert_eq!(manager.sensor().count, 500);
        assert_eq!(manager.pv(), 75.0);
        assert_eq!(PositionRecord::capture(&manager), record);
    }
}
