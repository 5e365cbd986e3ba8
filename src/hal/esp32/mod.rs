//! ESP32 remote I/O board hardware abstraction layer.
//!
//! This module provides hardware implementations for the greenhouse remote
//! I/O board driving the grow-light linear actuator.
//!
//! # Hardware Configuration
//!
//! - **MCU**: ESP32 (esp-idf)
//! - **Motor Driver**: L298-style H-bridge (In1, In2, EnA)
//! - **Feedback**: Hall-effect quadrature encoder on the actuator motor
//! - **Storage**: NVS partition for the taught travel and last position
//!
//! # Pin Assignments
//!
//! See the [`pins`] module for GPIO assignments.

mod clock;
mod output;
mod position;
mod pwm;
mod store;

pub use clock::Esp32Clock;
pub use output::Esp32Output;
pub use position::Esp32QuadratureCounter;
pub use pwm::Esp32PwmLine;
pub use store::Esp32NvsStore;

/// Pin assignments for the remote I/O board.
pub mod pins {
    // =========================================================================
    // H-bridge
    // =========================================================================

    /// Direction input 1 (high = raise)
    pub const IN1: i32 = 25;

    /// Direction input 2 (high = lower)
    pub const IN2: i32 = 26;

    /// Enable input, LEDC PWM
    pub const ENA: i32 = 27;

    // =========================================================================
    // Actuator encoder
    // =========================================================================

    /// Encoder channel A
    pub const ENC_A: i32 = 34;

    /// Encoder channel B
    pub const ENC_B: i32 = 35;
}
