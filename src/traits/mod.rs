//! Trait definitions for hardware abstraction.
//!
//! This module defines the abstractions that allow greenhouse-rio to:
//! - Run on the remote I/O board (ESP32) or any embedded-hal target
//! - Be tested on desktop against mocks
//!
//! # Hardware Abstraction
//!
//! The key hardware traits are:
//!
//! - [`PositionSensor`]: Quadrature pulse counter on the light rail
//! - [`DiscreteOutput`]: Single output line (direction or enable/PWM)
//! - [`ActuatorDriver`]: Direction + speed drive built from output lines
//! - [`Clock`]: Time source for `no_std` environments

pub mod hardware;

pub use hardware::*;
