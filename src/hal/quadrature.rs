//! Quadrature decoding shared by the pin-level counters.
//!
//! Full (×4) decoding: every valid edge on either channel moves the count by
//! one. Invalid jumps (both channels changed between samples) are ignored.

/// Count change for `(previous << 2) | current`, with A in bit 1 and B in bit 0.
const TRANSITIONS: [i8; 16] = [0, -1, 1, 0, 1, 0, 0, -1, -1, 0, 0, 1, 0, 1, -1, 0];

/// Pin-independent ×4 quadrature decoder.
///
/// # Example
///
/// ```rust
/// use greenhouse_rio::hal::QuadratureDecoder;
///
/// let mut decoder = QuadratureDecoder::new(false, false);
/// // A leads B: one full cycle forward
/// for (a, b) in [(true, false), (true, true), (false, true), (false, false)] {
///     decoder.update(a, b);
/// }
/// assert_eq!(decoder.count(), 4);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct QuadratureDecoder {
    state: u8,
    count: i32,
    inverted: bool,
    errors: u32,
}

impl QuadratureDecoder {
    /// Start from the current channel levels with a zero count.
    pub const fn new(a: bool, b: bool) -> Self {
        Self {
            state: Self::encode(a, b),
            count: 0,
            inverted: false,
            errors: 0,
        }
    }

    /// Flip the counting direction to match the actuator wiring.
    pub const fn inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    const fn encode(a: bool, b: bool) -> u8 {
        ((a as u8) << 1) | b as u8
    }

    /// Feed a new sample of both channels.
    pub fn update(&mut self, a: bool, b: bool) {
        let next = Self::encode(a, b);
        if next == self.state {
            return;
        }
        if self.state ^ next == 0b11 {
            self.errors = self.errors.wrapping_add(1);
        } else {
            let step = i32::from(TRANSITIONS[usize::from((self.state << 2) | next)]);
            self.count = self
                .count
                .wrapping_add(if self.inverted { -step } else { step });
        }
        self.state = next;
    }

    /// Accumulated count.
    #[inline]
    pub fn count(&self) -> i32 {
        self.count
    }

    /// Replace the count; decoding continues from the new value.
    #[inline]
    pub fn set_count(&mut self, count: i32) {
        self.count = count;
    }

    /// Samples where both channels changed at once (missed edges).
    #[inline]
    pub fn errors(&self) -> u32 {
        self.errors
    }
}
