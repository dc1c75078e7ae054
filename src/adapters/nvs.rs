//! NVS-backed EEPROM emulation.
//!
//! Implements [`SettingsPort`]: a small byte-addressed region mirrored in
//! RAM and persisted as a single NVS blob on every write.  An erased or
//! never-written region reads as `0xFF`, like a blank EEPROM, so the
//! settings record fails its magic check and is rebuilt from defaults.
//!
//! - **`target_os = "espidf"`**: blob `hydrobot::eeprom` in the default
//!   NVS partition; commits are atomic per `nvs_commit()`.
//! - **host**: RAM mirror only.

use log::info;

#[cfg(target_os = "espidf")]
use log::warn;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::app::ports::SettingsPort;
use crate::error::StorageError;

/// Emulated region size; holds the settings slot with room to grow.
pub const EEPROM_SIZE: usize = 128;

const ERASED: u8 = 0xFF;

#[cfg(target_os = "espidf")]
const NAMESPACE: &[u8] = b"hydrobot\0";
#[cfg(target_os = "espidf")]
const BLOB_KEY: &[u8] = b"eeprom\0";

pub struct NvsEeprom {
    mirror: [u8; EEPROM_SIZE],
}

impl NvsEeprom {
    /// Initialise NVS flash and load the stored region.
    ///
    /// On first boot or after a version mismatch the partition is erased
    /// and re-initialised; the region then reads as blank.
    #[cfg(target_os = "espidf")]
    pub fn new() -> Result<Self, StorageError> {
        // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
        // single main-task context before any other NVS access.
        let ret = unsafe { nvs_flash_init() };
        if ret == ESP_ERR_NVS_NO_FREE_PAGES as i32 || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as i32 {
            warn!("NVS: erasing and re-initialising flash partition");
            if unsafe { nvs_flash_erase() } != ESP_OK as i32 {
                return Err(StorageError::Io);
            }
            if unsafe { nvs_flash_init() } != ESP_OK as i32 {
                return Err(StorageError::Io);
            }
        } else if ret != ESP_OK as i32 {
            return Err(StorageError::Io);
        }

        let mut eeprom = Self::blank();
        match eeprom.load_blob() {
            Ok(()) => info!("NvsEeprom: region loaded"),
            Err(e) if e == ESP_ERR_NVS_NOT_FOUND as i32 => info!("NvsEeprom: region blank"),
            Err(e) => {
                warn!("NvsEeprom: read error {}, region treated as blank", e);
                eeprom = Self::blank();
            }
        }
        Ok(eeprom)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Result<Self, StorageError> {
        info!("NvsEeprom: simulation backend");
        Ok(Self::blank())
    }

    /// A region with every byte erased.
    pub fn blank() -> Self {
        Self {
            mirror: [ERASED; EEPROM_SIZE],
        }
    }

    fn range(offset: usize, len: usize) -> Result<core::ops::Range<usize>, StorageError> {
        let end = offset.checked_add(len).ok_or(StorageError::OutOfRange)?;
        if end > EEPROM_SIZE {
            return Err(StorageError::OutOfRange);
        }
        Ok(offset..end)
    }

    /// Open the namespace, run `f` with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(NAMESPACE.as_ptr().cast(), mode, &mut handle) };
        if ret != ESP_OK as i32 {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    #[cfg(target_os = "espidf")]
    fn load_blob(&mut self) -> Result<(), i32> {
        let mirror = &mut self.mirror;
        Self::with_nvs_handle(false, |handle| {
            let mut size = EEPROM_SIZE;
            let ret = unsafe {
                nvs_get_blob(
                    handle,
                    BLOB_KEY.as_ptr().cast(),
                    mirror.as_mut_ptr().cast(),
                    &mut size,
                )
            };
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            Ok(())
        })
    }

    #[cfg(target_os = "espidf")]
    fn commit(&self) -> Result<(), StorageError> {
        let mirror = &self.mirror;
        let result = Self::with_nvs_handle(true, |handle| {
            let ret = unsafe {
                nvs_set_blob(
                    handle,
                    BLOB_KEY.as_ptr().cast(),
                    mirror.as_ptr().cast(),
                    EEPROM_SIZE,
                )
            };
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            Ok(())
        });
        result.map_err(|e| {
            warn!("NvsEeprom: write error {}", e);
            StorageError::Io
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn commit(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

impl SettingsPort for NvsEeprom {
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), StorageError> {
        let range = Self::range(offset, buf.len())?;
        buf.copy_from_slice(&self.mirror[range]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError> {
        let range = Self::range(offset, data.len())?;
        if self.mirror[range.clone()] == *data {
            return Ok(());
        }
        self.mirror[range].copy_from_slice(data);
        self.commit()
    }
}
