//! Settings record in the ESP-IDF NVS partition.

use esp_idf_hal::sys::EspError;
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};

use crate::persistence::{PositionRecord, SettingsStore, RECORD_LEN};

/// NVS-backed [`SettingsStore`].
///
/// Stores the encoded record as one blob under [`Esp32NvsStore::KEY`].
///
/// # Example
///
/// ```ignore
/// use esp_idf_svc::nvs::EspDefaultNvsPartition;
/// use greenhouse_rio::hal::esp32::Esp32NvsStore;
///
/// let nvs = EspDefaultNvsPartition::take()?;
/// let store = Esp32NvsStore::new(nvs, "light")?;
/// ```
pub struct Esp32NvsStore {
    nvs: EspNvs<NvsDefault>,
}

impl Esp32NvsStore {
    /// Blob key inside the namespace.
    pub const KEY: &'static str = "position";

    /// Open (or create) `namespace` read-write.
    ///
    /// # Errors
    ///
    /// Returns an error if the namespace cannot be opened.
    pub fn new(partition: EspDefaultNvsPartition, namespace: &str) -> Result<Self, EspError> {
        let nvs = EspNvs::new(partition, namespace, true)?;
        Ok(Self { nvs })
    }
}

impl SettingsStore for Esp32NvsStore {
    type Error = EspError;

    fn load(&mut self) -> Result<Option<PositionRecord>, EspError> {
        let mut buf = [0u8; RECORD_LEN];
        let stored = self.nvs.get_raw(Self::KEY, &mut buf)?;
        Ok(stored.and_then(PositionRecord::from_bytes))
    }

    fn save(&mut self, record: &PositionRecord) -> Result<(), EspError> {
        self.nvs.set_raw(Self::KEY, &record.to_bytes())?;
        Ok(())
    }
}
