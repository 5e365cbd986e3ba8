//! H-bridge direction lines on plain GPIO.

use esp_idf_hal::gpio::{Output, OutputPin, PinDriver};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::sys::EspError;

use crate::traits::DiscreteOutput;

/// Push-pull GPIO output line.
///
/// The pin is driven low on creation so the bridge starts released.
///
/// # Example
///
/// ```ignore
/// use greenhouse_rio::hal::esp32::Esp32Output;
///
/// let peripherals = Peripherals::take()?;
/// let in1 = Esp32Output::new(peripherals.pins.gpio25)?;
/// let in2 = Esp32Output::new(peripherals.pins.gpio26)?;
/// ```
pub struct Esp32Output<'d, T: OutputPin> {
    pin: PinDriver<'d, T, Output>,
    active: bool,
}

impl<'d, T: OutputPin> Esp32Output<'d, T> {
    /// Configure `pin` as an output, driven low.
    ///
    /// # Errors
    ///
    /// Returns an error if GPIO initialization fails.
    pub fn new(pin: impl Peripheral<P = T> + 'd) -> Result<Self, EspError> {
        let mut pin = PinDriver::output(pin)?;
        pin.set_low()?;
        Ok(Self { pin, active: false })
    }
}

impl<T: OutputPin> DiscreteOutput for Esp32Output<'_, T> {
    type Error = EspError;

    fn write(&mut self, active: bool) -> Result<(), EspError> {
        if active {
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
