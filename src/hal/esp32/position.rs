//! Actuator quadrature counter for ESP32.
//!
//! The actuator motor carries a two-channel hall encoder. This implementation
//! samples both channels with polling and decodes with
//! [`QuadratureDecoder`](crate::hal::QuadratureDecoder).
//!
//! # Wiring
//!
//! - A → GPIO34
//! - B → GPIO35
//! - VCC → 5V (open-collector outputs, external pull-ups to 3.3V)
//! - GND → GND

use esp_idf_hal::gpio::{Input, InputPin, PinDriver};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::sys::EspError;

use crate::hal::QuadratureDecoder;
use crate::traits::PositionSensor;

/// Polled quadrature counter.
///
/// Call [`poll()`](Self::poll) faster than the encoder edge rate (the
/// firmware loop runs it every millisecond). Missed edges show up in
/// [`missed_edges()`](Self::missed_edges).
///
/// # Example
///
/// ```ignore
/// use greenhouse_rio::hal::esp32::Esp32QuadratureCounter;
/// use greenhouse_rio::traits::PositionSensor;
///
/// let peripherals = Peripherals::take()?;
/// let mut encoder = Esp32QuadratureCounter::new(
///     peripherals.pins.gpio34, // A
///     peripherals.pins.gpio35, // B
///     false,
/// )?;
///
/// loop {
///     encoder.poll();
///     println!("count: {}", encoder.read());
/// }
/// ```
pub struct Esp32QuadratureCounter<'d, A: InputPin, B: InputPin> {
    a: PinDriver<'d, A, Input>,
    b: PinDriver<'d, B, Input>,
    decoder: QuadratureDecoder,
}

impl<'d, A, B> Esp32QuadratureCounter<'d, A, B>
where
    A: InputPin,
    B: InputPin,
{
    /// Creates the counter at zero.
    ///
    /// `inverted` flips the counting direction so that raising the lights
    /// counts down.
    ///
    /// # Errors
    ///
    /// Returns an error if GPIO initialization fails.
    pub fn new(
        a_pin: impl Peripheral<P = A> + 'd,
        b_pin: impl Peripheral<P = B> + 'd,
        inverted: bool,
    ) -> Result<Self, EspError> {
        let a = PinDriver::input(a_pin)?;
        let b = PinDriver::input(b_pin)?;
        let decoder = QuadratureDecoder::new(a.is_high(), b.is_high()).inverted(inverted);
        Ok(Self { a, b, decoder })
    }

    /// Sample both channels. Call this every loop iteration.
    pub fn poll(&mut self) {
        self.decoder.update(self.a.is_high(), self.b.is_high());
    }

    /// Samples where both channels changed between polls.
    pub fn missed_edges(&self) -> u32 {
        self.decoder.errors()
    }
}

impl<A, B> PositionSensor for Esp32QuadratureCounter<'_, A, B>
where
    A: InputPin,
    B: InputPin,
{
    fn read(&mut self) -> i32 {
        self.poll();
        self.decoder.count()
    }

    fn write(&mut self, count: i32) {
        self.decoder.set_count(count);
    }
}
