//! ESP32 clock implementation using the ESP-IDF timer.

use crate::traits::Clock;

/// Monotonic clock from `esp_timer_get_time()` (microseconds since boot).
///
/// # Example
///
/// ```ignore
/// use greenhouse_rio::hal::esp32::Esp32Clock;
/// use greenhouse_rio::traits::Clock;
///
/// let clock = Esp32Clock::new();
/// manager.refresh(clock.now_ms())?;
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Esp32Clock;

impl Esp32Clock {
    /// Creates a new ESP32 clock instance.
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for Esp32Clock {
    #[inline]
    fn now_ms(&self) -> u64 {
        // Plain read of the hardware timer
        let micros = unsafe { esp_idf_hal::sys::esp_timer_get_time() };
        (micros / 1000) as u64
    }
}
