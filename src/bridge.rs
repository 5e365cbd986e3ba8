//! H-bridge actuator driver built from three discrete outputs.
//!
//! The bridge board has two direction inputs (In1, In2) and an enable input
//! (EnA) that also accepts PWM for speed:
//!
//! | Direction | In1 | In2 | EnA |
//! |-----------|-----|-----|-----|
//! | Raise | 1 | 0 | speed |
//! | Lower | 0 | 1 | speed |
//! | Stopped | 0 | 0 | 0 |
//!
//! Every drive command first drops EnA, then sets the direction lines, then
//! re-enables. Both direction lines are never active at the same time.
//!
//! # Example
//!
//! ```rust
//! use greenhouse_rio::bridge::HBridge;
//! use greenhouse_rio::hal::MockOutput;
//! use greenhouse_rio::traits::{ActuatorDriver, Direction};
//!
//! let mut bridge = HBridge::new(
//!     MockOutput::new("In1"),
//!     MockOutput::new("In2"),
//!     MockOutput::new("EnA"),
//! );
//!
//! bridge.drive(Direction::Raise, 200).unwrap();
//! let lines = bridge.lines();
//! assert!(lines.in1 && !lines.in2 && lines.enable);
//!
//! bridge.stop().unwrap();
//! assert!(bridge.lines().is_released());
//! ```

use crate::traits::{ActuatorDriver, Direction, DiscreteOutput, LineStates};

/// Three-wire H-bridge driver.
///
/// The line types may differ (e.g. GPIO for direction, PWM for enable) as
/// long as they share an error type.
#[derive(Debug)]
pub struct HBridge<In1, In2, En> {
    in1: In1,
    in2: In2,
    enable: En,
}

impl<In1, In2, En, E> HBridge<In1, In2, En>
where
    In1: DiscreteOutput<Error = E>,
    In2: DiscreteOutput<Error = E>,
    En: DiscreteOutput<Error = E>,
{
    /// Wrap the three control lines. Lines are left untouched until the
    /// first drive command.
    pub fn new(in1: In1, in2: In2, enable: En) -> Self {
        Self { in1, in2, enable }
    }

    /// Direction line 1.
    pub fn in1(&self) -> &In1 {
        &self.in1
    }

    /// Direction line 2.
    pub fn in2(&self) -> &In2 {
        &self.in2
    }

    /// Enable / PWM line.
    pub fn enable(&self) -> &En {
        &self.enable
    }

    /// Release the lines.
    pub fn into_inner(self) -> (In1, In2, En) {
        (self.in1, self.in2, self.enable)
    }
}

impl<In1, In2, En, E> ActuatorDriver for HBridge<In1, In2, En>
where
    In1: DiscreteOutput<Error = E>,
    In2: DiscreteOutput<Error = E>,
    En: DiscreteOutput<Error = E>,
{
    type Error = E;

    fn drive(&mut self, dir: Direction, speed: u8) -> Result<(), E> {
        self.enable.write(false)?;
        match dir {
            Direction::Raise => {
                self.in2.write(false)?;
                self.in1.write(true)?;
            }
            Direction::Lower => {
                self.in1.write(false)?;
                self.in2.write(true)?;
            }
            Direction::Stopped => {
                self.in1.write(false)?;
                self.in2.write(false)?;
                return Ok(());
            }
        }
        self.enable.write_level(speed)
    }

    fn lines(&self) -> LineStates {
        LineStates {
            in1: self.in1.is_active(),
            in2: self.in2.is_active(),
            enable: self.enable.is_active(),
        }
    }
}
