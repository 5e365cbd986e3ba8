//! Hardware abstraction traits for position feedback and actuator drive.
//!
//! This module defines the hardware interfaces that let the light-position
//! controller run on the remote I/O board, on other HALs, or against mocks.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`PositionSensor`] | Quadrature pulse counter with read/write |
//! | [`DiscreteOutput`] | Binary (optionally PWM) output line |
//! | [`ActuatorDriver`] | Direction + speed drive of the linear actuator |
//! | [`Clock`] | Time source for `no_std` environments |
//!
//! # Implementation
//!
//! For testing and desktop development, use the mock implementations
//! from [`crate::hal::mock`]. [`crate::bridge::HBridge`] builds an
//! [`ActuatorDriver`] out of three [`DiscreteOutput`] lines.
//!
//! # Example
//!
//! ```rust
//! use greenhouse_rio::traits::{DiscreteOutput, PositionSensor};
//! use greenhouse_rio::hal::{MockOutput, MockPositionSensor};
//!
//! let mut encoder = MockPositionSensor::new();
//! encoder.write(1200);
//! assert_eq!(encoder.read(), 1200);
//!
//! let mut ena = MockOutput::new("EnA");
//! ena.write_level(128).unwrap();
//! assert!(ena.is_active());
//! ```

/// Direction of light travel.
///
/// `Raise` moves the lights away from the canopy and drives the pulse count
/// toward zero; `Lower` moves them toward the canopy and the count toward the
/// configured maximum.
///
/// # Default
///
/// Defaults to [`Stopped`](Self::Stopped) for safety.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    /// Moving toward the top of travel.
    Raise,
    /// Moving toward the bottom of travel.
    Lower,
    /// Motor de-energized.
    #[default]
    Stopped,
}

impl Direction {
    /// Returns the direction as a lowercase string.
    ///
    /// ```
    /// use greenhouse_rio::Direction;
    ///
    /// assert_eq!(Direction::Raise.as_str(), "raise");
    /// assert_eq!(Direction::Lower.as_str(), "lower");
    /// assert_eq!(Direction::Stopped.as_str(), "stopped");
    /// ```
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Direction::Raise => "raise",
            Direction::Lower => "lower",
            Direction::Stopped => "stopped",
        }
    }
}

/// Quadrature position source.
///
/// Typically an interrupt-driven pulse counter. Reads and writes never fail;
/// a disconnected encoder simply never changes its count.
///
/// # Implementation Notes
///
/// - `write()` replaces the internal count; subsequent reads continue from it
/// - Counting direction must match [`Direction`]: raising decreases the count
pub trait PositionSensor {
    /// Current pulse count.
    fn read(&mut self) -> i32;

    /// Overwrite the pulse count (re-zeroing at a known position).
    fn write(&mut self, count: i32);
}

impl<T: PositionSensor + ?Sized> PositionSensor for &mut T {
    fn read(&mut self) -> i32 {
        T::read(self)
    }

    fn write(&mut self, count: i32) {
        T::write(self, count)
    }
}

/// Discrete output line (relay, transistor or PWM-capable pin).
///
/// # Example Implementation
///
/// ```rust,ignore
/// use greenhouse_rio::traits::DiscreteOutput;
///
/// struct Relay { /* pin handle */ }
///
/// impl DiscreteOutput for Relay {
///     type Error = ();
///
///     fn write(&mut self, active: bool) -> Result<(), ()> {
///         // Drive the pin...
///         Ok(())
///     }
///
///     fn is_active(&self) -> bool {
///         false
///     }
/// }
/// ```
pub trait DiscreteOutput {
    /// Error type for output operations.
    type Error;

    /// Set the line active or inactive.
    fn write(&mut self, active: bool) -> Result<(), Self::Error>;

    /// Set a PWM level (0 = off, 255 = fully on).
    ///
    /// Lines without PWM support treat any non-zero level as active.
    fn write_level(&mut self, level: u8) -> Result<(), Self::Error> {
        self.write(level > 0)
    }

    /// Whether the line is currently active.
    fn is_active(&self) -> bool;
}

impl<T: DiscreteOutput + ?Sized> DiscreteOutput for &mut T {
    type Error = T::Error;

    fn write(&mut self, active: bool) -> Result<(), Self::Error> {
        T::write(self, active)
    }

    fn write_level(&mut self, level: u8) -> Result<(), Self::Error> {
        T::write_level(self, level)
    }

    fn is_active(&self) -> bool {
        T::is_active(self)
    }
}

/// Snapshot of the three H-bridge control lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineStates {
    /// Direction line 1.
    pub in1: bool,
    /// Direction line 2.
    pub in2: bool,
    /// Enable / PWM line.
    pub enable: bool,
}

impl LineStates {
    /// True when every line is inactive.
    pub fn is_released(&self) -> bool {
        !self.in1 && !self.in2 && !self.enable
    }
}

/// Linear actuator drive.
///
/// Implement this for whatever motor driver moves the light rail.
///
/// # Implementation Notes
///
/// - Direction changes must be applied with the motor disabled
/// - `speed` is a PWM level; drivers without PWM treat non-zero as full speed
pub trait ActuatorDriver {
    /// Error type for drive operations.
    type Error;

    /// Drive in `dir` at `speed`, or release the motor for [`Direction::Stopped`].
    fn drive(&mut self, dir: Direction, speed: u8) -> Result<(), Self::Error>;

    /// Current state of the control lines, for diagnostics.
    fn lines(&self) -> LineStates;

    /// Convenience method to release the motor.
    fn stop(&mut self) -> Result<(), Self::Error> {
        self.drive(Direction::Stopped, 0)
    }
}

/// Time source trait for `no_std` compatibility.
///
/// Provides monotonic time in milliseconds for the control loop's
/// self-throttling.
///
/// # Example
///
/// ```rust
/// use greenhouse_rio::traits::Clock;
/// use greenhouse_rio::hal::MockClock;
///
/// let mut clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.advance(150);
/// assert_eq!(clock.now_ms(), 150);
/// ```
pub trait Clock {
    /// Returns current time in milliseconds since an arbitrary epoch.
    ///
    /// Must be monotonically increasing.
    fn now_ms(&self) -> u64;
}
