//! H-bridge enable line on the ESP32 LEDC PWM peripheral.
//!
//! EnA doubles as the speed input: the bridge only conducts while EnA is
//! high, so PWM on EnA sets the actuator speed. Direction lines are plain
//! GPIO ([`Esp32Output`](super::Esp32Output)).

use esp_idf_hal::ledc::{config::TimerConfig, LedcDriver, LedcTimerDriver, Resolution};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::prelude::*;
use esp_idf_hal::sys::EspError;

use crate::traits::DiscreteOutput;

/// PWM-capable output line.
///
/// Uses the LEDC peripheral at 20kHz with 10-bit resolution; the 0-255
/// drive level is scaled onto the duty range.
///
/// # Example
///
/// ```ignore
/// use greenhouse_rio::hal::esp32::Esp32PwmLine;
///
/// let peripherals = Peripherals::take()?;
/// let ena = Esp32PwmLine::new(
///     peripherals.pins.gpio27,
///     peripherals.ledc.timer0,
///     peripherals.ledc.channel0,
/// )?;
/// ```
pub struct Esp32PwmLine<'d> {
    pwm: LedcDriver<'d>,
    level: u8,
}

impl<'d> Esp32PwmLine<'d> {
    /// PWM frequency in Hz (20kHz is above audible range)
    const PWM_FREQ_HZ: u32 = 20_000;

    /// PWM resolution (10-bit = 1024 steps)
    const PWM_RESOLUTION: Resolution = Resolution::Bits10;

    /// Creates the enable line at 0% duty.
    ///
    /// # Errors
    ///
    /// Returns an error if PWM initialization fails.
    pub fn new<T, TI, C, CI, P, PI>(pin: P, timer: T, channel: C) -> Result<Self, EspError>
    where
        TI: esp_idf_hal::ledc::LedcTimer + 'd,
        T: Peripheral<P = TI> + 'd,
        CI: esp_idf_hal::ledc::LedcChannel<SpeedMode = TI::SpeedMode> + 'd,
        C: Peripheral<P = CI> + 'd,
        PI: esp_idf_hal::gpio::OutputPin + 'd,
        P: Peripheral<P = PI> + 'd,
    {
        let timer_config = TimerConfig::default()
            .frequency(Self::PWM_FREQ_HZ.Hz())
            .resolution(Self::PWM_RESOLUTION);
        let timer_driver = LedcTimerDriver::new(timer, &timer_config)?;
        let pwm = LedcDriver::new(channel, &timer_driver, pin)?;

        let mut line = Self { pwm, level: 0 };
        line.write_level(0)?;
        Ok(line)
    }

    /// Last drive level written (0-255).
    #[inline]
    pub fn level(&self) -> u8 {
        self.level
    }
}

impl DiscreteOutput for Esp32PwmLine<'_> {
    type Error = EspError;

    fn write(&mut self, active: bool) -> Result<(), EspError> {
        self.write_level(if active { u8::MAX } else { 0 })
    }

    fn write_level(&mut self, level: u8) -> Result<(), EspError> {
        let duty = u32::from(level) * self.pwm.get_max_duty() / u32::from(u8::MAX);
        self.pwm.set_duty(duty)?;
        self.level = level;
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.level > 0
    }
}
