//! Persisted calibration record.
//!
//! One fixed-size slot at offset 0 of the settings storage, postcard
//! encoded and validated by a magic word.  A slot that fails to decode or
//! carries the wrong magic is treated as corrupt and replaced by defaults.

use serde::{Deserialize, Serialize};

use crate::app::ports::SettingsPort;
use crate::error::StorageError;

/// Marks a slot written by this firmware.
pub const SETTINGS_MAGIC: u16 = 0x4243;
/// Storage offset of the record.
pub const SETTINGS_OFFSET: usize = 0;
/// Reserved slot size; the encoded record is always smaller.
pub const SLOT_SIZE: usize = 32;

// ---------------------------------------------------------------------------
// Probes
// ---------------------------------------------------------------------------

/// Calibrated analog probes, named as on the serial protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Probe {
    Tds1,
    Tds2,
    Ph1,
}

impl Probe {
    pub const ALL: [Self; 3] = [Self::Tds1, Self::Tds2, Self::Ph1];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Tds1 => "TDS1",
            Self::Tds2 => "TDS2",
            Self::Ph1 => "PH1",
        }
    }

    /// Case-insensitive lookup by protocol name.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(token))
    }
}

// ---------------------------------------------------------------------------
// Calibration
// ---------------------------------------------------------------------------

/// Linear map from raw `[0, lo]` onto engineering `[0, hi]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calibration {
    pub lo: u16,
    pub hi: u16,
}

impl Calibration {
    pub const fn new(lo: u16, hi: u16) -> Self {
        Self { lo, hi }
    }

    /// Map a raw count.  Values past `lo` extrapolate linearly.
    pub fn apply(self, raw: u16) -> i32 {
        if self.lo == 0 {
            return 0;
        }
        (i64::from(raw) * i64::from(self.hi) / i64::from(self.lo)) as i32
    }
}

// ---------------------------------------------------------------------------
// Settings record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub magic: u16,
    pub tds_1: Calibration,
    pub tds_2: Calibration,
    pub ph_1: Calibration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            magic: SETTINGS_MAGIC,
            tds_1: Calibration::new(500, 2000),
            tds_2: Calibration::new(500, 2000),
            // pH in hundredths: full scale 14.00
            ph_1: Calibration::new(1024, 1400),
        }
    }
}

impl Settings {
    pub fn calibration(&self, probe: Probe) -> Calibration {
        match probe {
            Probe::Tds1 => self.tds_1,
            Probe::Tds2 => self.tds_2,
            Probe::Ph1 => self.ph_1,
        }
    }

    pub fn set_calibration(&mut self, probe: Probe, calibration: Calibration) {
        match probe {
            Probe::Tds1 => self.tds_1 = calibration,
            Probe::Tds2 => self.tds_2 = calibration,
            Probe::Ph1 => self.ph_1 = calibration,
        }
    }

    /// Serialise into a slot image.  Unused tail bytes are zero.
    pub fn encode(&self) -> Result<[u8; SLOT_SIZE], StorageError> {
        let mut slot = [0u8; SLOT_SIZE];
        postcard::to_slice(self, &mut slot).map_err(|_| StorageError::OutOfRange)?;
        Ok(slot)
    }

    /// Parse a slot image, rejecting undecodable bytes and foreign magic.
    pub fn decode(slot: &[u8]) -> Result<Self, StorageError> {
        let settings: Self = postcard::from_bytes(slot).map_err(|_| StorageError::Corrupted)?;
        if settings.magic != SETTINGS_MAGIC {
            return Err(StorageError::Corrupted);
        }
        Ok(settings)
    }

    /// Read and validate the stored record.
    pub fn load(store: &mut impl SettingsPort) -> Result<Self, StorageError> {
        let mut slot = [0u8; SLOT_SIZE];
        store.read(SETTINGS_OFFSET, &mut slot)?;
        Self::decode(&slot)
    }

    /// Write the record synchronously.
    pub fn save(&self, store: &mut impl SettingsPort) -> Result<(), StorageError> {
        let slot = self.encode()?;
        store.write(SETTINGS_OFFSET, &slot)
    }
}
