//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`] for various platforms.
//!
//! # Available Implementations
//!
//! - `mock`: Test implementations for desktop development
//! - `quadrature`: Pin-independent ×4 decoder used by the polled counters
//! - `gpio`: Output lines over any embedded-hal pin (requires `embedded-hal` feature)
//! - `esp32`: Remote I/O board with L298-style H-bridge (requires `esp32` feature)

pub mod mock;
pub mod quadrature;

#[cfg(feature = "embedded-hal")]
pub mod gpio;

#[cfg(feature = "esp32")]
pub mod esp32;

pub use mock::*;
pub use quadrature::QuadratureDecoder;

#[cfg(feature = "embedded-hal")]
pub use gpio::GpioOutput;

#[cfg(feature = "esp32")]
pub use esp32::*;
