//! Light-position controller.
//!
//! This module provides [`LightPositionManager`], which raises and lowers the
//! grow lights on a linear actuator using quadrature feedback.
//!
//! # Overview
//!
//! Each evaluation (at most once per refresh interval):
//! - Reads the pulse count and derives the normalized position (PV, 0-100)
//! - Latches the top/bottom limit when the actuator stalls against a stop
//! - Runs calibration jog commands or the automatic setpoint controller
//! - Reports moving→stopped transitions to the registered stop handler
//!
//! Count zero is the top of travel (PV 100); `max_pulses` is the bottom (PV 0).
//!
//! # Example
//!
//! ```rust
//! use greenhouse_rio::{LightPositionManager, LightState};
//! use greenhouse_rio::hal::{MockOutput, MockPositionSensor};
//!
//! let mut manager = LightPositionManager::from_lines(
//!     MockPositionSensor::new(),
//!     MockOutput::new("In1"),
//!     MockOutput::new("In2"),
//!     MockOutput::new("EnA"),
//! )
//! .unwrap();
//!
//! manager.set_max_pulses(1000);
//! manager.set_raw_position(600);
//! manager.set_setpoint(50);
//! manager.set_calibration_mode(false);
//!
//! // PV 40 is below SP 50: lights go up
//! manager.refresh(0).unwrap();
//! assert_eq!(manager.state(), LightState::Rising);
//! ```
//!
//! # Known limitation
//!
//! Limits are detected by stall: a drive command that produces no pulses in
//! one refresh interval is treated as having reached the stop. A broken or
//! disconnected encoder therefore looks like an immediate limit.

use alloc::boxed::Box;
use core::fmt;

use log::{debug, info, warn};

use crate::bridge::HBridge;
use crate::config::LightPositionConfig;
use crate::traits::{ActuatorDriver, Direction, DiscreteOutput, LineStates, PositionSensor};

/// Pulse count of a fully extended actuator on the reference rig.
pub const DEFAULT_MAX_PULSES: i32 = 34_115;

/// Setpoint used until the host writes one.
pub const DEFAULT_SETPOINT: u16 = 50;

/// Tolerance around the setpoint, in PV percent.
pub const DEFAULT_DEADBAND: f32 = 0.15;

/// Minimum time between evaluations.
pub const DEFAULT_REFRESH_INTERVAL_MS: u32 = 150;

/// PWM level for full drive.
pub const FULL_SPEED: u8 = u8::MAX;

/// Controller state.
///
/// The numeric codes are what the host sees in the state register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum LightState {
    /// Motor held, position unknown relative to the limits.
    #[default]
    Idle = 1,
    /// Driving toward the top.
    Rising = 2,
    /// Driving toward the bottom.
    Lowering = 3,
    /// Stopped against the top limit.
    IdleAtTop = 4,
    /// Stopped against the bottom limit.
    IdleAtBottom = 5,
}

impl LightState {
    /// Register code (1-5).
    #[inline]
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Inverse of [`code`](Self::code).
    ///
    /// ```
    /// use greenhouse_rio::LightState;
    ///
    /// assert_eq!(LightState::from_code(4), Some(LightState::IdleAtTop));
    /// assert_eq!(LightState::from_code(0), None);
    /// ```
    pub const fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(LightState::Idle),
            2 => Some(LightState::Rising),
            3 => Some(LightState::Lowering),
            4 => Some(LightState::IdleAtTop),
            5 => Some(LightState::IdleAtBottom),
            _ => None,
        }
    }

    /// Name used in logs and diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            LightState::Idle => "idle",
            LightState::Rising => "rising",
            LightState::Lowering => "lowering",
            LightState::IdleAtTop => "idle_at_top",
            LightState::IdleAtBottom => "idle_at_bottom",
        }
    }

    /// True while a drive command is in effect.
    #[inline]
    pub const fn is_driving(self) -> bool {
        matches!(self, LightState::Rising | LightState::Lowering)
    }
}

impl fmt::Display for LightState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receiver for moving→stopped notifications.
///
/// Runs synchronously inside [`LightPositionManager::refresh`]; it must not
/// block. Any `FnMut(LightState)` closure implements it.
pub trait StopHandler {
    /// Called once per moving→stopped edge with the state at that moment.
    fn on_stop(&mut self, state: LightState);
}

impl<F: FnMut(LightState)> StopHandler for F {
    fn on_stop(&mut self, state: LightState) {
        self(state)
    }
}

/// Result of a [`LightPositionManager::refresh`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Manager mode is off; nothing was read or driven.
    Disabled,
    /// Refresh interval has not elapsed since the last evaluation.
    NotDue,
    /// The control loop ran.
    Evaluated {
        /// State reported to the stop handler, if motion ended on this tick.
        stopped: Option<LightState>,
    },
}

impl RefreshOutcome {
    /// Whether the control loop ran.
    pub fn evaluated(&self) -> bool {
        matches!(self, RefreshOutcome::Evaluated { .. })
    }

    /// State at a moving→stopped edge, if one happened.
    pub fn stopped(&self) -> Option<LightState> {
        match self {
            RefreshOutcome::Evaluated { stopped } => *stopped,
            _ => None,
        }
    }
}

/// Light-position controller.
///
/// Owns the control state; the position sensor and actuator are whatever the
/// caller passes in, including `&mut` borrows of longer-lived handles.
///
/// # Type Parameters
///
/// - `S`: pulse counter ([`PositionSensor`])
/// - `A`: motor drive ([`ActuatorDriver`]), usually an [`HBridge`]
pub struct LightPositionManager<S: PositionSensor, A: ActuatorDriver> {
    sensor: S,
    actuator: A,
    state: LightState,

    current_count: i32,
    previous_count: Option<i32>,
    pv: f32,
    sp: u16,
    process_error: f32,
    max_pulses: i32,
    deadband: f32,
    speed: u8,

    moving: bool,
    was_moving: bool,

    calibration_mode: bool,
    move_top: bool,
    move_bottom: bool,

    enabled: bool,
    refresh_interval_ms: u32,
    last_refresh_ms: Option<u64>,

    on_stop: Option<Box<dyn StopHandler>>,
}

impl<S, In1, In2, En, E> LightPositionManager<S, HBridge<In1, In2, En>>
where
    S: PositionSensor,
    In1: DiscreteOutput<Error = E>,
    In2: DiscreteOutput<Error = E>,
    En: DiscreteOutput<Error = E>,
{
    /// Create a manager driving an H-bridge through its two direction lines
    /// and its enable line.
    pub fn from_lines(sensor: S, in1: In1, in2: In2, enable: En) -> Result<Self, E> {
        Self::new(sensor, HBridge::new(in1, in2, enable))
    }
}

impl<S: PositionSensor, A: ActuatorDriver> LightPositionManager<S, A> {
    /// Create a manager with default settings. The motor is released
    /// immediately.
    pub fn new(sensor: S, actuator: A) -> Result<Self, A::Error> {
        let mut manager = Self {
            sensor,
            actuator,
            state: LightState::Idle,
            current_count: 0,
            previous_count: None,
            pv: 100.0,
            sp: DEFAULT_SETPOINT,
            process_error: 0.0,
            max_pulses: DEFAULT_MAX_PULSES,
            deadband: DEFAULT_DEADBAND,
            speed: FULL_SPEED,
            moving: false,
            was_moving: false,
            calibration_mode: true,
            move_top: false,
            move_bottom: false,
            enabled: true,
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            last_refresh_ms: None,
            on_stop: None,
        };
        manager.hold_light_position()?;
        Ok(manager)
    }

    /// Create a manager and apply `config`.
    pub fn with_config(
        sensor: S,
        actuator: A,
        config: &LightPositionConfig,
    ) -> Result<Self, A::Error> {
        let mut manager = Self::new(sensor, actuator)?;
        manager.set_max_pulses(config.max_pulses);
        manager.set_setpoint(config.default_setpoint);
        manager.set_deadband(config.deadband);
        manager.set_drive_speed(config.drive_speed);
        manager.set_refresh_interval(config.refresh_interval_ms);
        manager.set_calibration_mode(config.calibration_mode);
        manager.set_manager_mode(config.enabled);
        Ok(manager)
    }

    // ------------------------------------------------------------------------
    // Control loop
    // ------------------------------------------------------------------------

    /// Run one control-loop evaluation if enabled and due.
    ///
    /// Call as often as convenient; evaluations are spaced at least
    /// `refresh_interval` apart. The first call always evaluates.
    pub fn refresh(&mut self, now_ms: u64) -> Result<RefreshOutcome, A::Error> {
        if !self.enabled {
            return Ok(RefreshOutcome::Disabled);
        }
        if let Some(last) = self.last_refresh_ms {
            if now_ms.saturating_sub(last) < u64::from(self.refresh_interval_ms) {
                return Ok(RefreshOutcome::NotDue);
            }
        }
        self.last_refresh_ms = Some(now_ms);

        self.compute_light_position();
        self.latch_top_of_travel()?;
        self.latch_bottom_of_travel()?;

        if self.calibration_mode {
            self.process_calibration_commands()?;
        } else {
            self.run_automatic_control()?;
        }

        let stopped = self.detect_transition_to_stop();
        Ok(RefreshOutcome::Evaluated { stopped })
    }

    fn compute_light_position(&mut self) {
        let count = self.sensor.read();
        self.moving = self.previous_count != Some(count);
        self.previous_count = Some(count);
        self.current_count = count;
        self.pv = self.percent_of_travel(count);
    }

    fn percent_of_travel(&self, count: i32) -> f32 {
        100.0 - (100.0 * count as f32 / self.max_pulses as f32)
    }

    /// Overwrite the encoder and the trackers so the reset is not seen as motion.
    ///
    /// PV keeps this tick's measurement and follows on the next evaluation,
    /// except after an overrun, where the bottom latch recomputes it.
    fn reseed(&mut self, count: i32) {
        self.sensor.write(count);
        self.current_count = count;
        self.previous_count = Some(count);
    }

    fn latch_top_of_travel(&mut self) -> Result<bool, A::Error> {
        let at_top = self.state == LightState::IdleAtTop
            || (self.state == LightState::Rising && !self.moving);
        if !at_top {
            return Ok(false);
        }

        if self.state != LightState::IdleAtTop {
            info!("light top limit reached at count {}", self.current_count);
            if self.state.is_driving() {
                self.actuator.stop()?;
            }
            self.state = LightState::IdleAtTop;
        }
        self.reseed(0);
        Ok(true)
    }

    fn latch_bottom_of_travel(&mut self) -> Result<bool, A::Error> {
        let overrun = !self.calibration_mode && self.current_count > self.max_pulses;
        let at_bottom = self.state == LightState::IdleAtBottom
            || (self.state == LightState::Lowering && !self.moving)
            || overrun;
        if !at_bottom {
            return Ok(false);
        }

        if self.state != LightState::IdleAtBottom {
            if overrun {
                warn!(
                    "light count {} past max {}, latching bottom",
                    self.current_count, self.max_pulses
                );
            } else {
                info!("light bottom limit reached at count {}", self.current_count);
            }
            if self.state.is_driving() {
                self.actuator.stop()?;
            }
            self.state = LightState::IdleAtBottom;
        }
        // Calibration runs keep the measured count so it can be taught as the new max.
        if !self.calibration_mode {
            self.reseed(self.max_pulses);
            // An overrun count is out of range; control from the corrected one.
            if overrun {
                self.pv = self.percent_of_travel(self.max_pulses);
            }
        }
        Ok(true)
    }

    fn process_calibration_commands(&mut self) -> Result<(), A::Error> {
        match (self.move_top, self.move_bottom) {
            (false, true) => self.lower_lights(self.speed),
            (true, false) => self.raise_lights(self.speed),
            _ => self.hold_light_position(),
        }
    }

    fn run_automatic_control(&mut self) -> Result<(), A::Error> {
        self.process_error = self.pv - f32::from(self.sp);
        if self.process_error > self.deadband {
            self.lower_lights(self.speed)
        } else if self.process_error < -self.deadband {
            self.raise_lights(self.speed)
        } else {
            self.hold_light_position()
        }
    }

    fn detect_transition_to_stop(&mut self) -> Option<LightState> {
        let stopped = self.was_moving && !self.moving;
        self.was_moving = self.moving;
        if !stopped {
            return None;
        }

        debug!("light motion stopped in state {}", self.state);
        if let Some(handler) = self.on_stop.as_mut() {
            handler.on_stop(self.state);
        }
        Some(self.state)
    }

    // ------------------------------------------------------------------------
    // Drive primitives
    // ------------------------------------------------------------------------

    /// Drive toward the bottom at `speed`.
    ///
    /// No effect when already lowering or latched at the bottom.
    pub fn lower_lights(&mut self, speed: u8) -> Result<(), A::Error> {
        if matches!(self.state, LightState::Lowering | LightState::IdleAtBottom) {
            return Ok(());
        }
        self.actuator.drive(Direction::Lower, speed)?;
        debug!("lowering lights from count {}", self.current_count);
        self.state = LightState::Lowering;
        Ok(())
    }

    /// Drive toward the top at `speed`.
    ///
    /// No effect when already rising or latched at the top.
    pub fn raise_lights(&mut self, speed: u8) -> Result<(), A::Error> {
        if matches!(self.state, LightState::Rising | LightState::IdleAtTop) {
            return Ok(());
        }
        self.actuator.drive(Direction::Raise, speed)?;
        debug!("raising lights from count {}", self.current_count);
        self.state = LightState::Rising;
        Ok(())
    }

    /// Release the motor. Limit states are kept; anything else becomes `Idle`.
    pub fn hold_light_position(&mut self) -> Result<(), A::Error> {
        self.actuator.stop()?;
        if !matches!(self.state, LightState::IdleAtTop | LightState::IdleAtBottom) {
            self.state = LightState::Idle;
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Host-facing setters
    // ------------------------------------------------------------------------

    /// Desired position, 0-100. Not clamped.
    pub fn set_setpoint(&mut self, setpoint: u16) {
        self.sp = setpoint;
    }

    /// `true` for manual jog (calibration), `false` for setpoint tracking.
    pub fn set_calibration_mode(&mut self, calibration: bool) {
        self.calibration_mode = calibration;
    }

    /// Request a jog toward the top (calibration mode only).
    pub fn set_calibration_move_top(&mut self, requested: bool) {
        self.move_top = requested;
    }

    /// Request a jog toward the bottom (calibration mode only).
    pub fn set_calibration_move_bottom(&mut self, requested: bool) {
        self.move_bottom = requested;
    }

    /// Register the stop handler, replacing any previous one.
    pub fn set_on_stop<H: StopHandler + 'static>(&mut self, handler: H) {
        self.on_stop = Some(Box::new(handler));
    }

    /// Remove the stop handler.
    pub fn clear_on_stop(&mut self) {
        self.on_stop = None;
    }

    /// Seed the encoder and trackers with a known count (e.g. restored from storage).
    pub fn set_raw_position(&mut self, count: i32) {
        self.reseed(count);
        self.pv = self.percent_of_travel(count);
    }

    /// Pulse count at full travel. Zero is ignored.
    pub fn set_max_pulses(&mut self, max_pulses: i32) {
        if max_pulses == 0 {
            warn!("ignoring zero max pulse count");
            return;
        }
        self.max_pulses = max_pulses;
        self.pv = self.percent_of_travel(self.current_count);
    }

    /// Minimum time between evaluations. Zero is ignored.
    pub fn set_refresh_interval(&mut self, interval_ms: u32) {
        if interval_ms == 0 {
            warn!("ignoring zero refresh interval");
            return;
        }
        self.refresh_interval_ms = interval_ms;
    }

    /// Master enable. When off, [`refresh`](Self::refresh) does nothing.
    pub fn set_manager_mode(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Tolerance around the setpoint, in PV percent.
    pub fn set_deadband(&mut self, deadband: f32) {
        self.deadband = deadband;
    }

    /// PWM level used by the control loop's drive commands.
    pub fn set_drive_speed(&mut self, speed: u8) {
        self.speed = speed;
    }

    // ------------------------------------------------------------------------
    // Getters
    // ------------------------------------------------------------------------

    /// Normalized position, 100 at the top and 0 at the bottom.
    #[inline]
    pub fn pv(&self) -> f32 {
        self.pv
    }

    /// Raw pulse count from the last evaluation or seed.
    #[inline]
    pub fn raw_pv(&self) -> i32 {
        self.current_count
    }

    /// Current setpoint.
    #[inline]
    pub fn sp(&self) -> u16 {
        self.sp
    }

    /// Pulse count at full travel.
    #[inline]
    pub fn max_pulses(&self) -> i32 {
        self.max_pulses
    }

    /// Controller state.
    #[inline]
    pub fn state(&self) -> LightState {
        self.state
    }

    /// Whether the count changed on the last evaluation.
    #[inline]
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// PV − SP from the last automatic-mode evaluation.
    #[inline]
    pub fn last_error(&self) -> f32 {
        self.process_error
    }

    /// Whether calibration (manual jog) mode is active.
    pub fn calibration_mode(&self) -> bool {
        self.calibration_mode
    }

    /// Whether the manager is enabled.
    pub fn manager_mode(&self) -> bool {
        self.enabled
    }

    /// Minimum time between evaluations.
    pub fn refresh_interval_ms(&self) -> u32 {
        self.refresh_interval_ms
    }

    /// Latched at the top limit.
    pub fn is_at_top(&self) -> bool {
        self.state == LightState::IdleAtTop
    }

    /// Latched at the bottom limit.
    pub fn is_at_bottom(&self) -> bool {
        self.state == LightState::IdleAtBottom
    }

    /// The position sensor.
    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    /// The position sensor, mutably.
    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// The actuator driver.
    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    // ------------------------------------------------------------------------
    // Reporting
    // ------------------------------------------------------------------------

    /// Snapshot for the host interfaces.
    pub fn status(&self) -> LightStatus {
        LightStatus {
            raw_position: self.current_count,
            position: self.pv,
            setpoint: self.sp,
            error: self.process_error,
            max_pulses: self.max_pulses,
            state: self.state,
            moving: self.moving,
            calibration_mode: self.calibration_mode,
            enabled: self.enabled,
            lines: self.actuator.lines(),
        }
    }

    /// Write the one-line diagnostic dump.
    ///
    /// Human-readable only; the format may change.
    pub fn serialize<W: fmt::Write>(&self, out: &mut W, include_newline: bool) -> fmt::Result {
        let lines = self.actuator.lines();
        write!(
            out,
            "Pos:{} 0-100:{:.2} SP:{} error:{:.2} In1:{} In2:{} EnA:{} MaxCount:{} State:{} lightMoving:{} atTop:{} atBottom:{}",
            self.current_count,
            self.pv,
            self.sp,
            self.process_error,
            u8::from(lines.in1),
            u8::from(lines.in2),
            u8::from(lines.enable),
            self.max_pulses,
            self.state.code(),
            u8::from(self.moving),
            u8::from(self.is_at_top()),
            u8::from(self.is_at_bottom()),
        )?;
        if include_newline {
            out.write_str("\r\n")?;
        }
        Ok(())
    }
}

impl<S: PositionSensor, A: ActuatorDriver> fmt::Debug for LightPositionManager<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LightPositionManager")
            .field("state", &self.state)
            .field("count", &self.current_count)
            .field("pv", &self.pv)
            .field("sp", &self.sp)
            .field("max_pulses", &self.max_pulses)
            .field("calibration_mode", &self.calibration_mode)
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// Position snapshot for the host interfaces.
///
/// # Example
///
/// ```rust
/// use greenhouse_rio::{LightPositionManager, LightState};
/// use greenhouse_rio::hal::{MockOutput, MockPositionSensor};
///
/// let manager = LightPositionManager::from_lines(
///     MockPositionSensor::new(),
///     MockOutput::new("In1"),
///     MockOutput::new("In2"),
///     MockOutput::new("EnA"),
/// )
/// .unwrap();
///
/// let status = manager.status();
/// assert_eq!(status.state, LightState::Idle);
/// assert!(status.lines.is_released());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LightStatus {
    /// Raw pulse count.
    pub raw_position: i32,
    /// Normalized position (0-100).
    pub position: f32,
    /// Setpoint.
    pub setpoint: u16,
    /// Last automatic-mode error (PV − SP).
    pub error: f32,
    /// Pulse count at full travel.
    pub max_pulses: i32,
    /// Controller state.
    pub state: LightState,
    /// Count changed on the last evaluation.
    pub moving: bool,
    /// Calibration mode active.
    pub calibration_mode: bool,
    /// Manager enabled.
    pub enabled: bool,
    /// H-bridge line states.
    pub lines: LineStates,
}
