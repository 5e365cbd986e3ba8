//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for all hardware traits, enabling
//! development and testing on desktop without the remote I/O board.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockPositionSensor`] | [`PositionSensor`] | Settable or scripted pulse count |
//! | [`MockOutput`] | [`DiscreteOutput`] | Records line writes, optional shared journal |
//! | [`MockClock`] | [`Clock`] | Controllable time source |
//! | [`MockStore`] | [`SettingsStore`] | In-memory settings record |
//!
//! # Example
//!
//! ```rust
//! use greenhouse_rio::{LightPositionManager, LightState};
//! use greenhouse_rio::hal::{MockClock, MockOutput, MockPositionSensor};
//! use greenhouse_rio::traits::Clock;
//!
//! let mut clock = MockClock::new();
//! let mut manager = LightPositionManager::from_lines(
//!     MockPositionSensor::new(),
//!     MockOutput::new("In1"),
//!     MockOutput::new("In2"),
//!     MockOutput::new("EnA"),
//! )
//! .unwrap();
//!
//! // Calibration jog toward the bottom
//! manager.set_calibration_move_bottom(true);
//! manager.refresh(clock.now_ms()).unwrap();
//! assert_eq!(manager.state(), LightState::Lowering);
//!
//! // Pulses arrive while lowering
//! clock.advance(150);
//! manager.sensor_mut().count = 40;
//! manager.refresh(clock.now_ms()).unwrap();
//! assert!(manager.is_moving());
//! ```
//!
//! [`PositionSensor`]: crate::traits::PositionSensor
//! [`DiscreteOutput`]: crate::traits::DiscreteOutput
//! [`Clock`]: crate::traits::Clock
//! [`SettingsStore`]: crate::persistence::SettingsStore

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::persistence::{PositionRecord, SettingsStore, RECORD_LEN};
use crate::traits::{Clock, DiscreteOutput, PositionSensor};

// ============================================================================
// Hardware Mocks
// ============================================================================

/// Mock quadrature counter.
///
/// `count` is returned by every read unless scripted counts are queued; each
/// read then consumes one queued value.
///
/// # Example
///
/// ```rust
/// use greenhouse_rio::hal::MockPositionSensor;
/// use greenhouse_rio::traits::PositionSensor;
///
/// let mut encoder = MockPositionSensor::with_count(600);
/// encoder.queue_counts(&[599, 598]);
///
/// assert_eq!(encoder.read(), 599);
/// assert_eq!(encoder.read(), 598);
/// assert_eq!(encoder.read(), 598); // Script exhausted, count holds
///
/// encoder.write(0);
/// assert_eq!(encoder.writes, vec![0]);
/// assert_eq!(encoder.reads, 3);
/// ```
#[derive(Debug, Default)]
pub struct MockPositionSensor {
    /// Current pulse count.
    pub count: i32,
    /// Number of times `read` was called.
    pub reads: usize,
    /// Every value passed to `write`, in order.
    pub writes: Vec<i32>,
    script: Vec<i32>,
}

impl MockPositionSensor {
    /// Creates a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a counter at `count`.
    pub fn with_count(count: i32) -> Self {
        Self {
            count,
            ..Self::default()
        }
    }

    /// Queue counts returned by the next reads, first in first out.
    pub fn queue_counts(&mut self, counts: &[i32]) {
        self.script.extend_from_slice(counts);
    }

    /// Number of queued counts not yet read.
    pub fn pending(&self) -> usize {
        self.script.len()
    }
}

impl PositionSensor for MockPositionSensor {
    fn read(&mut self) -> i32 {
        self.reads += 1;
        if !self.script.is_empty() {
            self.count = self.script.remove(0);
        }
        self.count
    }

    fn write(&mut self, count: i32) {
        self.count = count;
        self.writes.push(count);
    }
}

/// Write log shared between several [`MockOutput`] lines.
///
/// Lets a test check the order of writes across lines, e.g. that the enable
/// line drops before a direction line changes.
#[derive(Clone, Debug, Default)]
pub struct MockJournal {
    entries: Rc<RefCell<Vec<(&'static str, u8)>>>,
}

impl MockJournal {
    /// Creates an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a write.
    pub fn record(&self, line: &'static str, level: u8) {
        self.entries.borrow_mut().push((line, level));
    }

    /// Copy of all writes so far, oldest first.
    pub fn entries(&self) -> Vec<(&'static str, u8)> {
        self.entries.borrow().clone()
    }

    /// Forget all writes.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

/// Mock output line.
///
/// Records every level written. Set `fail_writes` to make writes fail.
///
/// # Example
///
/// ```rust
/// use greenhouse_rio::hal::{MockJournal, MockOutput};
/// use greenhouse_rio::traits::DiscreteOutput;
///
/// let journal = MockJournal::new();
/// let mut ena = MockOutput::new("EnA").with_journal(&journal);
///
/// ena.write_level(180).unwrap();
/// ena.write(false).unwrap();
///
/// assert_eq!(ena.writes, vec![180, 0]);
/// assert_eq!(journal.entries(), vec![("EnA", 180), ("EnA", 0)]);
/// assert!(!ena.is_active());
/// ```
#[derive(Debug)]
pub struct MockOutput {
    /// Line name used in the journal.
    pub name: &'static str,
    /// Every level written (`write(true)` records 255).
    pub writes: Vec<u8>,
    /// Make every write return `Err(())`.
    pub fail_writes: bool,
    level: u8,
    journal: Option<MockJournal>,
}

impl MockOutput {
    /// Creates an inactive line.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            writes: Vec::new(),
            fail_writes: false,
            level: 0,
            journal: None,
        }
    }

    /// Also record writes into `journal`.
    pub fn with_journal(mut self, journal: &MockJournal) -> Self {
        self.journal = Some(journal.clone());
        self
    }

    /// Last level written.
    pub fn level(&self) -> u8 {
        self.level
    }
}

impl DiscreteOutput for MockOutput {
    type Error = ();

    fn write(&mut self, active: bool) -> Result<(), ()> {
        self.write_level(if active { u8::MAX } else { 0 })
    }

    fn write_level(&mut self, level: u8) -> Result<(), ()> {
        if self.fail_writes {
            return Err(());
        }
        self.level = level;
        self.writes.push(level);
        if let Some(journal) = &self.journal {
            journal.record(self.name, level);
        }
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.level > 0
    }
}

/// Mock clock for testing.
///
/// Provides a controllable time source for testing time-dependent behavior.
///
/// # Example
///
/// ```rust
/// use greenhouse_rio::hal::MockClock;
/// use greenhouse_rio::traits::Clock;
///
/// let mut clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.set(1000);
/// assert_eq!(clock.now_ms(), 1000);
///
/// clock.advance(500);
/// assert_eq!(clock.now_ms(), 1500);
/// ```
#[derive(Debug)]
pub struct MockClock {
    current_ms: u64,
}

impl MockClock {
    /// Creates a new mock clock starting at 0ms.
    pub fn new() -> Self {
        Self { current_ms: 0 }
    }

    /// Sets the current time in milliseconds.
    pub fn set(&mut self, ms: u64) {
        self.current_ms = ms;
    }

    /// Advances the clock by the given duration.
    pub fn advance(&mut self, ms: u64) {
        self.current_ms += ms;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.current_ms
    }
}

// ============================================================================
// Storage Mocks
// ============================================================================

/// In-memory settings store.
///
/// Holds the encoded record bytes, so a test can also plant corrupt or
/// erased data.
///
/// # Example
///
/// ```rust
/// use greenhouse_rio::hal::MockStore;
/// use greenhouse_rio::persistence::{PositionRecord, SettingsStore};
///
/// let mut store = MockStore::new();
/// assert_eq!(store.load().unwrap(), None);
///
/// let record = PositionRecord { max_pulses: 30_000, raw_position: 10, setpoint: 50 };
/// store.save(&record).unwrap();
/// assert_eq!(store.load().unwrap(), Some(record));
/// assert_eq!(store.saves, 1);
/// ```
#[derive(Debug, Default)]
pub struct MockStore {
    /// Stored bytes, `None` if never written.
    pub bytes: Option<[u8; RECORD_LEN]>,
    /// Number of successful saves.
    pub saves: usize,
    /// Make every save return `Err(())`.
    pub fail_saves: bool,
}

impl MockStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `record`.
    pub fn with_record(record: PositionRecord) -> Self {
        Self {
            bytes: Some(record.to_bytes()),
            ..Self::default()
        }
    }

    /// Decoded record, if a valid one is stored.
    pub fn record(&self) -> Option<PositionRecord> {
        self.bytes
            .as_ref()
            .and_then(|bytes| PositionRecord::from_bytes(bytes))
    }
}

impl SettingsStore for MockStore {
    type Error = ();

    fn load(&mut self) -> Result<Option<PositionRecord>, ()> {
        Ok(self.record())
    }

    fn save(&mut self, record: &PositionRecord) -> Result<(), ()> {
        if self.fail_saves {
            return Err(());
        }
        self.bytes = Some(record.to_bytes());
        self.saves += 1;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
