//! Outer loop for the light subsystem.
//!
//! [`LightPositionService`] ties the register block, the manager and the
//! settings store together. Call [`poll`](LightPositionService::poll) from the
//! firmware main loop as often as convenient; the manager throttles itself.
//!
//! The first pass seeds the setpoint register and calibration coil from the
//! manager, so settings restored before it are not replaced by an empty
//! register block.
//!
//! Each pass:
//! 1. Reads host commands (mode, jog flags, setpoint) into the manager
//! 2. Teaches the current count as max travel on a teach-coil rising edge
//!    (calibration mode only)
//! 3. Runs the control loop, persisting the record when motion stops
//! 4. Publishes position, limits and state back to the registers

use core::fmt;

use log::{info, warn};

use crate::light_position::{LightPositionManager, RefreshOutcome};
use crate::persistence::{PositionRecord, SettingsStore};
use crate::registers::{RegisterLink, RegisterMap};
use crate::traits::{ActuatorDriver, PositionSensor};

/// Error from a service pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError<D, S> {
    /// The actuator rejected a drive command.
    Drive(D),
    /// The settings store failed to load or save.
    Store(S),
}

impl<D: fmt::Debug, S: fmt::Debug> fmt::Display for ServiceError<D, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Drive(e) => write!(f, "actuator drive failed: {:?}", e),
            ServiceError::Store(e) => write!(f, "settings store failed: {:?}", e),
        }
    }
}

#[cfg(feature = "std")]
impl<D: fmt::Debug, S: fmt::Debug> std::error::Error for ServiceError<D, S> {}

/// Light-position manager wired to a register block and a settings store.
pub struct LightPositionService<S: PositionSensor, A: ActuatorDriver, St: SettingsStore> {
    manager: LightPositionManager<S, A>,
    store: St,
    link: RegisterLink,
}

impl<S, A, St> LightPositionService<S, A, St>
where
    S: PositionSensor,
    A: ActuatorDriver,
    St: SettingsStore,
{
    /// Wrap a configured manager and its store.
    pub fn new(manager: LightPositionManager<S, A>, store: St) -> Self {
        Self {
            manager,
            store,
            link: RegisterLink::new(),
        }
    }

    /// Load the saved record into the manager.
    ///
    /// Returns `false` when nothing has been saved yet; defaults stay in effect.
    pub fn restore(&mut self) -> Result<bool, St::Error> {
        match self.store.load()? {
            Some(record) => {
                info!(
                    "restored light position: count {} of {}, setpoint {}",
                    record.raw_position, record.max_pulses, record.setpoint
                );
                record.restore(&mut self.manager);
                Ok(true)
            }
            None => {
                info!("no saved light position, using defaults");
                Ok(false)
            }
        }
    }

    /// Save the manager's current record.
    pub fn persist(&mut self) -> Result<(), St::Error> {
        let record = PositionRecord::capture(&self.manager);
        self.store.save(&record).map_err(|e| {
            warn!("failed to save light position record");
            e
        })
    }

    /// Run one pass of the outer loop.
    ///
    /// A store failure does not skip the rest of the pass; it is reported
    /// after the registers have been published.
    pub fn poll<R: RegisterMap + ?Sized>(
        &mut self,
        now_ms: u64,
        regs: &mut R,
    ) -> Result<RefreshOutcome, ServiceError<A::Error, St::Error>> {
        let mut store_result = Ok(());

        if !self.link.is_seeded() {
            self.link.seed(&self.manager, &mut *regs);
        }

        if self.link.apply(&*regs, &mut self.manager) {
            if self.manager.calibration_mode() {
                let taught = self.manager.raw_pv();
                info!("teaching max travel: {} pulses", taught);
                self.manager.set_max_pulses(taught);
                store_result = self.persist();
            } else {
                warn!("ignoring max travel teach outside calibration mode");
            }
        }

        let outcome = self.manager.refresh(now_ms).map_err(ServiceError::Drive)?;
        if outcome.stopped().is_some() {
            let saved = self.persist();
            if store_result.is_ok() {
                store_result = saved;
            }
        }

        self.link.publish(&self.manager, regs);
        store_result.map_err(ServiceError::Store)?;
        Ok(outcome)
    }

    /// The wrapped manager.
    pub fn manager(&self) -> &LightPositionManager<S, A> {
        &self.manager
    }

    /// The wrapped manager, mutably.
    pub fn manager_mut(&mut self) -> &mut LightPositionManager<S, A> {
        &mut self.manager
    }

    /// The settings store.
    pub fn store(&self) -> &St {
        &self.store
    }

    /// The settings store, mutably.
    pub fn store_mut(&mut self) -> &mut St {
        &mut self.store
    }

    /// Release the manager and store.
    pub fn into_parts(self) -> (LightPositionManager<S, A>, St) {
        (self.manager, self.store)
    }
}
