//! Host register block for the light subsystem.
//!
//! The remote I/O board exposes its state to the greenhouse controller as
//! coils (single bits) and 16-bit holding registers. This module maps the
//! light-position manager onto that table:
//!
//! | Address | Kind | Direction | Meaning |
//! |---------|------|-----------|---------|
//! | 78 | coil | host → board | calibration mode |
//! | 79 | coil | host → board | jog toward top |
//! | 80 | coil | host → board | jog toward bottom |
//! | 81 | coil | host → board | teach current count as max travel (rising edge) |
//! | 82 | coil | board → host | at top limit |
//! | 83 | coil | board → host | at bottom limit |
//! | 12 | holding | host → board | setpoint 0-100 |
//! | 45 | holding | board → host | PV × 10 |
//! | 46-47 | holding | board → host | raw count, `i32` high word first |
//! | 48-49 | holding | board → host | max pulses, `i32` high word first |
//! | 60 | holding | board → host | state code (1-5) |
//!
//! # Example
//!
//! ```rust
//! use greenhouse_rio::registers::{self, RegisterImage, RegisterMap};
//!
//! let mut regs = RegisterImage::new();
//! registers::write_i32(&mut regs, registers::holding::RAW_POSITION, -40_000);
//!
//! assert_eq!(regs.holding(registers::holding::RAW_POSITION), 0xFFFF);
//! assert_eq!(registers::read_i32(&regs, registers::holding::RAW_POSITION), -40_000);
//! ```

use crate::light_position::LightPositionManager;
use crate::traits::{ActuatorDriver, PositionSensor};

/// Coil addresses.
pub mod coil {
    /// Calibration (manual jog) mode.
    pub const CALIBRATION_MODE: u16 = 78;
    /// Jog toward top.
    pub const MOVE_TOP: u16 = 79;
    /// Jog toward bottom.
    pub const MOVE_BOTTOM: u16 = 80;
    /// Teach the current count as max travel.
    pub const SAVE_MAX: u16 = 81;
    /// Latched at top limit.
    pub const AT_TOP: u16 = 82;
    /// Latched at bottom limit.
    pub const AT_BOTTOM: u16 = 83;
}

/// Holding register addresses.
pub mod holding {
    /// Setpoint, 0-100.
    pub const SETPOINT: u16 = 12;
    /// PV × 10.
    pub const POSITION: u16 = 45;
    /// Raw count, two registers.
    pub const RAW_POSITION: u16 = 46;
    /// Max pulses, two registers.
    pub const MAX_PULSES: u16 = 48;
    /// State code.
    pub const STATE: u16 = 60;
}

/// Number of coils in a [`RegisterImage`].
pub const COIL_COUNT: usize = 128;

/// Number of holding registers in a [`RegisterImage`].
pub const HOLDING_COUNT: usize = 128;

/// Data tables of the field-bus server.
///
/// Reads of unknown addresses return `false`/`0`; writes to them are dropped.
pub trait RegisterMap {
    /// Read a coil.
    fn coil(&self, addr: u16) -> bool;

    /// Write a coil.
    fn set_coil(&mut self, addr: u16, value: bool);

    /// Read a holding register.
    fn holding(&self, addr: u16) -> u16;

    /// Write a holding register.
    fn set_holding(&mut self, addr: u16, value: u16);
}

/// Fixed-size in-memory register tables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterImage {
    coils: [bool; COIL_COUNT],
    holding: [u16; HOLDING_COUNT],
}

impl RegisterImage {
    /// All coils off, all registers zero.
    pub const fn new() -> Self {
        Self {
            coils: [false; COIL_COUNT],
            holding: [0; HOLDING_COUNT],
        }
    }
}

impl Default for RegisterImage {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterMap for RegisterImage {
    fn coil(&self, addr: u16) -> bool {
        self.coils.get(usize::from(addr)).copied().unwrap_or(false)
    }

    fn set_coil(&mut self, addr: u16, value: bool) {
        if let Some(slot) = self.coils.get_mut(usize::from(addr)) {
            *slot = value;
        }
    }

    fn holding(&self, addr: u16) -> u16 {
        self.holding.get(usize::from(addr)).copied().unwrap_or(0)
    }

    fn set_holding(&mut self, addr: u16, value: u16) {
        if let Some(slot) = self.holding.get_mut(usize::from(addr)) {
            *slot = value;
        }
    }
}

// ============================================================================
// 32-bit values
// ============================================================================

/// Split into two registers, high word first.
#[inline]
pub const fn split_i32(value: i32) -> [u16; 2] {
    let bits = value as u32;
    [(bits >> 16) as u16, bits as u16]
}

/// Inverse of [`split_i32`].
#[inline]
pub const fn join_i32(high: u16, low: u16) -> i32 {
    (((high as u32) << 16) | low as u32) as i32
}

/// Write `value` to `addr` and `addr + 1`.
pub fn write_i32<R: RegisterMap + ?Sized>(regs: &mut R, addr: u16, value: i32) {
    let [high, low] = split_i32(value);
    regs.set_holding(addr, high);
    regs.set_holding(addr.wrapping_add(1), low);
}

/// Read an `i32` from `addr` and `addr + 1`.
pub fn read_i32<R: RegisterMap + ?Sized>(regs: &R, addr: u16) -> i32 {
    join_i32(regs.holding(addr), regs.holding(addr.wrapping_add(1)))
}

/// Scale a 0-100 position to the ×10 register convention.
///
/// Negative and NaN values read as 0.
#[inline]
pub fn position_to_register(pv: f32) -> u16 {
    (pv * 10.0 + 0.5) as u16
}

// ============================================================================
// Coil edges
// ============================================================================

/// Change of a command coil since the previous sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CoilEdge {
    /// Same as last sample.
    #[default]
    NoChange,
    /// Off → on.
    RisingEdge,
    /// On → off.
    FallingEdge,
}

/// Edge detector for one coil.
///
/// The first sample only records the level, so a coil left on across a
/// reboot does not fire.
#[derive(Clone, Copy, Debug, Default)]
pub struct CoilWatcher {
    last: Option<bool>,
}

impl CoilWatcher {
    /// Detector with no sample yet.
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Feed the current level.
    pub fn update(&mut self, level: bool) -> CoilEdge {
        let edge = match (self.last, level) {
            (Some(false), true) => CoilEdge::RisingEdge,
            (Some(true), false) => CoilEdge::FallingEdge,
            _ => CoilEdge::NoChange,
        };
        self.last = Some(level);
        edge
    }
}

// ============================================================================
// Manager binding
// ============================================================================

/// Host commands read from the register block in one pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostCommands {
    /// Calibration mode coil.
    pub calibration_mode: bool,
    /// Jog-top coil.
    pub move_top: bool,
    /// Jog-bottom coil.
    pub move_bottom: bool,
    /// Setpoint register.
    pub setpoint: u16,
    /// Edge on the teach-max coil.
    pub save_max: CoilEdge,
}

/// Binds a [`LightPositionManager`] to the register block.
#[derive(Debug, Default)]
pub struct RegisterLink {
    save_max: CoilWatcher,
    seeded: bool,
}

impl RegisterLink {
    /// New link; the teach-max coil is armed on the first read.
    pub const fn new() -> Self {
        Self {
            save_max: CoilWatcher::new(),
            seeded: false,
        }
    }

    /// Whether [`seed`](Self::seed) has run.
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Copy the manager's setpoint and mode into the host-writable registers.
    ///
    /// Run once after restoring settings so the first [`apply`](Self::apply)
    /// reads back the restored values instead of an empty register block.
    pub fn seed<S, A, R>(&mut self, manager: &LightPositionManager<S, A>, regs: &mut R)
    where
        S: PositionSensor,
        A: ActuatorDriver,
        R: RegisterMap + ?Sized,
    {
        regs.set_coil(coil::CALIBRATION_MODE, manager.calibration_mode());
        regs.set_holding(holding::SETPOINT, manager.sp());
        self.seeded = true;
    }

    /// Sample the host-writable coils and registers.
    pub fn read_commands<R: RegisterMap + ?Sized>(&mut self, regs: &R) -> HostCommands {
        HostCommands {
            calibration_mode: regs.coil(coil::CALIBRATION_MODE),
            move_top: regs.coil(coil::MOVE_TOP),
            move_bottom: regs.coil(coil::MOVE_BOTTOM),
            setpoint: regs.holding(holding::SETPOINT),
            save_max: self.save_max.update(regs.coil(coil::SAVE_MAX)),
        }
    }

    /// Push host commands into the manager.
    ///
    /// Returns `true` when the host asked to teach the max travel. Teaching
    /// is left to the caller so it can persist the result.
    pub fn apply<S, A, R>(&mut self, regs: &R, manager: &mut LightPositionManager<S, A>) -> bool
    where
        S: PositionSensor,
        A: ActuatorDriver,
        R: RegisterMap + ?Sized,
    {
        let commands = self.read_commands(regs);
        manager.set_calibration_mode(commands.calibration_mode);
        manager.set_calibration_move_top(commands.move_top);
        manager.set_calibration_move_bottom(commands.move_bottom);
        manager.set_setpoint(commands.setpoint);
        commands.save_max == CoilEdge::RisingEdge
    }

    /// Write the manager's readings to the board → host registers.
    pub fn publish<S, A, R>(&self, manager: &LightPositionManager<S, A>, regs: &mut R)
    where
        S: PositionSensor,
        A: ActuatorDriver,
        R: RegisterMap + ?Sized,
    {
        regs.set_holding(holding::POSITION, position_to_register(manager.pv()));
        write_i32(regs, holding::RAW_POSITION, manager.raw_pv());
        write_i32(regs, holding::MAX_PULSES, manager.max_pulses());
        regs.set_holding(holding::STATE, manager.state().code());
        regs.set_coil(coil::AT_TOP, manager.is_at_top());
        regs.set_coil(coil::AT_BOTTOM, manager.is_at_bottom());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_is_high_word_first() {
        assert_eq!(split_i32(34_115), [0x0000, 0x8543]);
        assert_eq!(split_i32(0x0001_0002), [1, 2]);
        assert_eq!(split_i32(-1), [0xFFFF, 0xFFFF]);
    }

    #[test]
    fn join_inverts_split() {
        for value in [0, 1, -1, 34_115, i32::MAX, i32::MIN, -40_000] {
            let [high, low] = split_i32(value);
            assert_eq!(join_i32(high, low), value);
        }
    }

    #[test]
    fn image_ignores_out_of_range_addresses() {
        let mut regs = RegisterImage::new();
        regs.set_coil(COIL_COUNT as u16, true);
        regs.set_holding(u16::MAX, 7);
        assert!(!regs.coil(COIL_COUNT as u16));
        assert_eq!(regs.holding(u16::MAX), 0);
    }

    #[test]
    fn position_scaling() {
        assert_eq!(position_to_register(100.0), 1000);
        assert_eq!(position_to_register(40.06), 401);
        assert_eq!(position_to_register(0.0), 0);
        assert_eq!(position_to_register(-3.0), 0);
    }

    #[test]
    fn seed_writes_host_registers() {
        use crate::hal::{MockOutput, MockPositionSensor};

        let mut manager = LightPositionManager::from_lines(
            MockPositionSensor::new(),
            MockOutput::new("In1"),
            MockOutput::new("In2"),
            MockOutput::new("EnA"),
        )
        .unwrap();
        manager.set_setpoint(75);

        let mut regs = RegisterImage::new();
        let mut link = RegisterLink::new();
        assert!(!link.is_seeded());

        link.seed(&manager, &mut regs);
        assert!(link.is_seeded());
        assert!(regs.coil(coil::CALIBRATION_MODE));
        assert_eq!(regs.holding(holding::SETPOINT), 75);

        assert!(!link.apply(&regs, &mut manager));
        assert_eq!(manager.sp(), 75);
        assert!(manager.calibration_mode());
    }

    #[test]
    fn coil_watcher_first_sample_is_silent() {
        let mut watcher = CoilWatcher::new();
        assert_eq!(watcher.update(true), CoilEdge::NoChange);
        assert_eq!(watcher.update(true), CoilEdge::NoChange);
        assert_eq!(watcher.update(false), CoilEdge::FallingEdge);
        assert_eq!(watcher.update(true), CoilEdge::RisingEdge);
    }
}
