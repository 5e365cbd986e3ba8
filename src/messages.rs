//! JSON message types for bench tools.
//!
//! The greenhouse controller talks to the board over the register block.
//! These types express the same commands as JSON so a test rig or bench
//! harness can drive a [`LightPositionManager`] directly. The firmware does
//! not expose them. All types are `no_std` compatible and are parsed with
//! `serde-json-core`.
//!
//! # Example
//!
//! ```
//! # #[cfg(feature = "serde-json-core")]
//! # {
//! use greenhouse_rio::messages::parse_setpoint_request;
//!
//! let req = parse_setpoint_request(br#"{"setpoint": 65}"#).unwrap();
//! assert_eq!(req.setpoint, 65);
//! # }
//! ```

use serde::{Deserialize, Serialize};

use crate::light_position::LightPositionManager;
use crate::traits::{ActuatorDriver, PositionSensor};

// ============================================================================
// Request Types
// ============================================================================

/// Request to move the lights to a position.
///
/// # JSON Example
///
/// ```json
/// {"setpoint": 65}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetpointRequest {
    /// Target position, 0 (bottom) to 100 (top)
    pub setpoint: u16,
}

impl SetpointRequest {
    /// Create a new setpoint request.
    pub fn new(setpoint: u16) -> Self {
        Self { setpoint }
    }

    /// Apply to the manager.
    pub fn apply<S: PositionSensor, A: ActuatorDriver>(
        &self,
        manager: &mut LightPositionManager<S, A>,
    ) {
        manager.set_setpoint(self.setpoint);
    }
}

/// Request to change calibration mode or jog the lights.
///
/// Omitted fields are left unchanged.
///
/// # JSON Examples
///
/// ```json
/// {"calibration_mode": true}
/// {"move_top": false, "move_bottom": true}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CalibrationRequest {
    /// Enter (`true`) or leave (`false`) calibration mode
    #[serde(default)]
    pub calibration_mode: Option<bool>,
    /// Jog toward the top
    #[serde(default)]
    pub move_top: Option<bool>,
    /// Jog toward the bottom
    #[serde(default)]
    pub move_bottom: Option<bool>,
}

impl CalibrationRequest {
    /// Apply the fields that are present.
    pub fn apply<S: PositionSensor, A: ActuatorDriver>(
        &self,
        manager: &mut LightPositionManager<S, A>,
    ) {
        if let Some(calibration) = self.calibration_mode {
            manager.set_calibration_mode(calibration);
        }
        if let Some(top) = self.move_top {
            manager.set_calibration_move_top(top);
        }
        if let Some(bottom) = self.move_bottom {
            manager.set_calibration_move_bottom(bottom);
        }
    }
}

// ============================================================================
// Parsing Functions (using serde-json-core for no_std compatibility)
// ============================================================================

/// Parse a setpoint request from JSON bytes.
///
/// # Example
///
/// ```
/// use greenhouse_rio::messages::parse_setpoint_request;
///
/// assert_eq!(parse_setpoint_request(br#"{"setpoint": 40}"#).unwrap().setpoint, 40);
/// assert!(parse_setpoint_request(br#"{"setpoint": -1}"#).is_none());
/// ```
#[cfg(feature = "serde-json-core")]
pub fn parse_setpoint_request(json: &[u8]) -> Option<SetpointRequest> {
    serde_json_core::from_slice(json).ok().map(|(req, _)| req)
}

/// Parse a calibration request from JSON bytes.
///
/// # Example
///
/// ```
/// use greenhouse_rio::messages::parse_calibration_request;
///
/// let req = parse_calibration_request(br#"{"move_bottom": true}"#).unwrap();
/// assert_eq!(req.move_bottom, Some(true));
/// assert_eq!(req.calibration_mode, None);
/// ```
#[cfg(feature = "serde-json-core")]
pub fn parse_calibration_request(json: &[u8]) -> Option<CalibrationRequest> {
    serde_json_core::from_slice(json).ok().map(|(req, _)| req)
}

/// Render a status snapshot as JSON into `buf`.
///
/// Returns the number of bytes written, or `None` if `buf` is too small.
#[cfg(feature = "serde-json-core")]
pub fn write_status_json(
    status: &crate::light_position::LightStatus,
    buf: &mut [u8],
) -> Option<usize> {
    serde_json_core::to_slice(status, buf).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{MockOutput, MockPositionSensor};

    fn manager() -> LightPositionManager<
        MockPositionSensor,
        crate::bridge::HBridge<MockOutput, MockOutput, MockOutput>,
    > {
        LightPositionManager::from_lines(
            MockPositionSensor::new(),
            MockOutput::new("In1"),
            MockOutput::new("In2"),
            MockOutput::new("EnA"),
        )
        .unwrap()
    }

    #[test]
    fn setpoint_request_applies() {
        let mut m = manager();
        SetpointRequest::new(80).apply(&mut m);
        assert_eq!(m.sp(), 80);
    }

    #[test]
    fn calibration_request_leaves_missing_fields() {
        let mut m = manager();
        m.set_calibration_move_top(true);

        CalibrationRequest {
            calibration_mode: Some(false),
            move_bottom: Some(true),
            ..Default::default()
        }
        .apply(&mut m);

        assert!(!m.calibration_mode());
        // move_top untouched: both jogs set means hold
        m.set_calibration_mode(true);
        m.refresh(0).unwrap();
        assert_eq!(m.state(), crate::LightState::Idle);
    }

    #[cfg(feature = "serde-json-core")]
    #[test]
    fn parse_calibration_mode() {
        let req = parse_calibration_request(br#"{"calibration_mode": false}"#).unwrap();
        assert_eq!(req.calibration_mode, Some(false));
        assert_eq!(req.move_top, None);
    }

    #[cfg(feature = "serde-json-core")]
    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_setpoint_request(b"not json").is_none());
        assert!(parse_calibration_request(br#"{"move_top": 1}"#).is_none());
    }

    #[cfg(feature = "serde-json-core")]
    #[test]
    fn status_json_contains_state() {
        let m = manager();
        let mut buf = [0u8; 512];
        let len = write_status_json(&m.status(), &mut buf).unwrap();
        let json = core::str::from_utf8(&buf[..len]).unwrap();
        assert!(json.contains("\"state\":\"idle\""));
        assert!(json.contains("\"setpoint\":50"));
    }

    #[cfg(feature = "serde-json-core")]
    #[test]
    fn status_json_buffer_too_small() {
        let m = manager();
        let mut buf = [0u8; 8];
        assert!(write_status_json(&m.status(), &mut buf).is_none());
    }
}
