//! [`DiscreteOutput`] over any embedded-hal 1.0 output pin.
//!
//! Lets the H-bridge run on boards other than the ESP32. PWM is not
//! available through `OutputPin`, so any non-zero level drives the pin fully.
//!
//! # Example
//!
//! ```rust,ignore
//! use greenhouse_rio::bridge::HBridge;
//! use greenhouse_rio::hal::GpioOutput;
//!
//! let bridge = HBridge::new(
//!     GpioOutput::new(in1_pin),
//!     GpioOutput::new(in2_pin),
//!     GpioOutput::new(ena_pin),
//! );
//! ```

use embedded_hal::digital::OutputPin;

use crate::traits::DiscreteOutput;

/// Output line backed by an `OutputPin`.
#[derive(Debug)]
pub struct GpioOutput<P> {
    pin: P,
    active_low: bool,
    active: bool,
}

impl<P: OutputPin> GpioOutput<P> {
    /// Active-high line. The pin is not touched until the first write.
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            active_low: false,
            active: false,
        }
    }

    /// Active-low line (relay boards that energize on a low pin).
    pub fn active_low(pin: P) -> Self {
        Self {
            pin,
            active_low: true,
            active: false,
        }
    }

    /// Release the pin.
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> DiscreteOutput for GpioOutput<P> {
    type Error = P::Error;

    fn write(&mut self, active: bool) -> Result<(), Self::Error> {
        if active != self.active_low {
            self.pin.set_high()?;
        } else {
            self.pin.set_low()?;
        }
        self.active = active;
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    #[derive(Default)]
    struct FakePin {
        high: bool,
        writes: usize,
    }

    impl ErrorType for FakePin {
        type Error = Infallible;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            self.writes += 1;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn active_high_follows_level() {
        let mut line = GpioOutput::new(FakePin::default());
        line.write_level(128).unwrap();
        assert!(line.is_active());
        assert!(line.pin.high);

        line.write(false).unwrap();
        assert!(!line.is_active());
        assert!(!line.pin.high);
    }

    #[test]
    fn active_low_inverts_pin() {
        let mut line = GpioOutput::active_low(FakePin::default());
        line.write(true).unwrap();
        assert!(line.is_active());
        assert!(!line.pin.high);

        let pin = line.into_inner();
        assert_eq!(pin.writes, 1);
    }
}
