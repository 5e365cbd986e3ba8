//! # greenhouse-rio
//!
//! Light-position control for a greenhouse remote I/O board: a linear
//! actuator raises and lowers the grow lights, a quadrature encoder reports
//! where they are, and the greenhouse controller sets the target height over
//! a register map.
//!
//! ## Features
//!
//! - **Hardware abstraction**: Traits for the pulse counter, output lines and motor drive
//! - **Two modes**: Calibration (manual jog) and automatic setpoint tracking with a deadband
//! - **Limit detection**: Stall-based top/bottom latching with encoder re-zeroing
//! - **Stop notification**: One callback per moving→stopped transition
//! - **Persistence**: Taught travel, last position and setpoint survive power cycles
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Hardware abstractions
//! - `bridge` - H-bridge sequencing over three output lines
//! - `light_position` - Main controller
//! - `registers` - Host register block binding
//! - `persistence` - Saved record layout and storage trait
//! - `service` - Outer loop tying registers, controller and storage together
//! - `hal` - Concrete implementations (mock for testing, esp32 for hardware)
//!
//! ## Example
//!
//! ```rust
//! use greenhouse_rio::{LightPositionManager, LightState};
//! use greenhouse_rio::hal::{MockOutput, MockPositionSensor};
//!
//! let mut manager = LightPositionManager::from_lines(
//!     MockPositionSensor::new(),
//!     MockOutput::new("In1"),
//!     MockOutput::new("In2"),
//!     MockOutput::new("EnA"),
//! )
//! .unwrap();
//!
//! manager.set_on_stop(|state: LightState| {
//!     // persist the position here
//!     let _ = state;
//! });
//!
//! // Call from your main loop; evaluations are spaced 150ms apart
//! manager.refresh(0).unwrap();
//! manager.refresh(20).unwrap(); // not due yet
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// H-bridge driver built from three output lines.
pub mod bridge;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Light-position controller.
pub mod light_position;
/// Persisted settings record and storage trait.
pub mod persistence;
/// Host register block for the light subsystem.
pub mod registers;
/// Outer loop tying registers, controller and storage together.
pub mod service;
/// Core traits for hardware abstraction.
pub mod traits;

/// Board configuration shared by desktop and ESP32.
pub mod config;

/// JSON message types for bench tools (serde-based).
#[cfg(feature = "serde")]
pub mod messages;

// Re-exports for convenience
pub use bridge::HBridge;
pub use light_position::{
    LightPositionManager, LightState, LightStatus, RefreshOutcome, StopHandler,
};
pub use persistence::{PositionRecord, SettingsStore};
pub use registers::{RegisterImage, RegisterMap};
pub use service::{LightPositionService, ServiceError};
pub use traits::{ActuatorDriver, Clock, Direction, DiscreteOutput, LineStates, PositionSensor};

// Config re-exports
pub use config::{Config, DeviceConfig, LightPositionConfig};

// Message re-exports
#[cfg(feature = "serde")]
pub use messages::{CalibrationRequest, SetpointRequest};

// Parsing function re-exports (serde-json-core based)
#[cfg(feature = "serde-json-core")]
pub use messages::{parse_calibration_request, parse_setpoint_request, write_status_json};
