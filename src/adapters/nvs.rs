//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements both [`ByteStore`] and [`ConfigPort`].
//!
//! - Parameters: one `u8` key per slot (`p00`..`p15`) in the `params`
//!   namespace. A missing key reads as [`ByteStore::ERASED`], which is how
//!   a factory-fresh partition signals "write defaults".
//! - Config: one postcard blob under `humictl::syscfg`, range-checked
//!   before it is persisted.
//! - Atomic writes: ESP-IDF NVS commits are atomic per nvs_commit().
//!
//! On host targets a `HashMap` stands in for the flash partition.

use log::{info, warn};

use crate::app::ports::{ByteStore, ConfigError, ConfigPort, StorageError};
use crate::config::SystemConfig;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const CONFIG_NAMESPACE: &str = "humictl";
const PARAM_NAMESPACE: &str = "params";

#[cfg(target_os = "espidf")]
const MAX_BLOB_SIZE: usize = 256;

/// Number of addressable parameter slots.
pub const SLOT_COUNT: u8 = 16;

/// NUL-terminated key for a parameter slot: `p00`..`p15`.
fn slot_key(slot: u8) -> [u8; 4] {
    [b'p', b'0' + slot / 10, b'0' + slot % 10, 0]
}

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: HashMap<String, Vec<u8>>,
    /// Physical writes since boot.
    writes: u32,
}

impl NvsAdapter {
    /// Create a new NvsAdapter and initialise NVS flash.
    ///
    /// Returns `Err(ConfigError::IoError)` if flash initialisation fails
    /// unrecoverably. On first boot or after a version mismatch the NVS
    /// partition is erased and re-initialised automatically.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any other NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(ConfigError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: HashMap::new(),
            writes: 0,
        })
    }

    /// Physical slot writes performed since boot.
    pub fn write_count(&self) -> u32 {
        self.writes
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &[u8]) -> String {
        let key = key.strip_suffix(&[0]).unwrap_or(key);
        format!("{}::{}", namespace, String::from_utf8_lossy(key))
    }

    /// Open an NVS namespace, execute a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(namespace: &str, write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut ns_buf = [0u8; 16];
        let ns_bytes = namespace.as_bytes();
        let len = ns_bytes.len().min(15);
        ns_buf[..len].copy_from_slice(&ns_bytes[..len]);

        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    #[cfg(not(target_os = "espidf"))]
    fn get_u8(&self, namespace: &str, key: &[u8]) -> Option<u8> {
        self.store
            .get(&Self::composite_key(namespace, key))
            .and_then(|v| v.first().copied())
    }

    #[cfg(target_os = "espidf")]
    fn get_u8(&self, namespace: &str, key: &[u8]) -> Option<u8> {
        Self::with_nvs_handle(namespace, false, |handle| {
            let mut value = 0u8;
            let ret = unsafe { nvs_get_u8(handle, key.as_ptr() as *const _, &mut value) };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(value)
        })
        .ok()
    }

    #[cfg(not(target_os = "espidf"))]
    fn set_u8(&mut self, namespace: &str, key: &[u8], value: u8) -> Result<(), StorageError> {
        self.store
            .insert(Self::composite_key(namespace, key), vec![value]);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn set_u8(&mut self, namespace: &str, key: &[u8], value: u8) -> Result<(), StorageError> {
        Self::with_nvs_handle(namespace, true, |handle| {
            let ret = unsafe { nvs_set_u8(handle, key.as_ptr() as *const _, value) };
            if ret != ESP_OK {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(())
        })
        .map_err(|_| StorageError::IoError)
    }
}

// ── ByteStore implementation ──────────────────────────────────

impl ByteStore for NvsAdapter {
    fn read(&self, slot: u8) -> u8 {
        if slot >= SLOT_COUNT {
            return Self::ERASED;
        }
        self.get_u8(PARAM_NAMESPACE, &slot_key(slot))
            .unwrap_or(Self::ERASED)
    }

    fn write_if_changed(&mut self, slot: u8, value: u8) -> Result<bool, StorageError> {
        if slot >= SLOT_COUNT {
            return Err(StorageError::OutOfRange);
        }
        let key = slot_key(slot);
        if self.get_u8(PARAM_NAMESPACE, &key) == Some(value) {
            return Ok(false);
        }
        self.set_u8(PARAM_NAMESPACE, &key, value)
            .inspect_err(|e| warn!("NvsAdapter: slot {} write failed: {}", slot, e))?;
        self.writes = self.writes.wrapping_add(1);
        Ok(true)
    }
}

// ── ConfigPort implementation ─────────────────────────────────

fn validate_config(cfg: &SystemConfig) -> Result<(), ConfigError> {
    if !(1..=10).contains(&cfg.tick_interval_ms) {
        return Err(ConfigError::ValidationFailed(
            "tick_interval_ms must be 1–10",
        ));
    }
    // The DHT22 cannot be sampled faster than every 2 s.
    if !(2_000..=60_000).contains(&cfg.sensor_interval_ms) {
        return Err(ConfigError::ValidationFailed(
            "sensor_interval_ms must be 2000–60000",
        ));
    }
    if !(5..=500).contains(&cfg.debounce_ms) {
        return Err(ConfigError::ValidationFailed("debounce_ms must be 5–500"));
    }
    if cfg.repeat_interval_ms <= cfg.debounce_ms || cfg.repeat_interval_ms > 5_000 {
        return Err(ConfigError::ValidationFailed(
            "repeat_interval_ms must be > debounce_ms and <= 5000",
        ));
    }
    if !(100..=10_000).contains(&cfg.motion_poll_interval_ms) {
        return Err(ConfigError::ValidationFailed(
            "motion_poll_interval_ms must be 100–10000",
        ));
    }
    if cfg.motion_calibration_ms > 120_000 {
        return Err(ConfigError::ValidationFailed(
            "motion_calibration_ms must be <= 120000",
        ));
    }
    Ok(())
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let key = Self::composite_key(CONFIG_NAMESPACE, b"syscfg");
            if let Some(bytes) = self.store.get(&key) {
                let cfg: SystemConfig =
                    postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
                info!("NvsAdapter: loaded config from store");
                Ok(cfg)
            } else {
                info!("NvsAdapter: no stored config, using defaults");
                Ok(SystemConfig::default())
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(CONFIG_NAMESPACE, false, |handle| {
                let key_cstr = b"syscfg\0";
                let mut size: usize = 0;

                // First call: get size
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        key_cstr.as_ptr() as *const _,
                        core::ptr::null_mut(),
                        &mut size,
                    )
                };
                if ret == ESP_ERR_NVS_NOT_FOUND {
                    return Err(ESP_ERR_NVS_NOT_FOUND);
                }
                if ret != ESP_OK || size == 0 || size > MAX_BLOB_SIZE {
                    return Err(ret);
                }

                let mut buf = vec![0u8; size];
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        key_cstr.as_ptr() as *const _,
                        buf.as_mut_ptr() as *mut _,
                        &mut size,
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }

                Ok(buf)
            });

            match result {
                Ok(bytes) => {
                    let cfg: SystemConfig =
                        postcard::from_bytes(&bytes).map_err(|_| ConfigError::Corrupted)?;
                    info!("NvsAdapter: loaded config from NVS ({} bytes)", bytes.len());
                    Ok(cfg)
                }
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND => {
                    info!("NvsAdapter: no stored config, using defaults");
                    Ok(SystemConfig::default())
                }
                Err(e) => {
                    warn!("NvsAdapter: NVS read error {}", e);
                    Err(ConfigError::IoError)
                }
            }
        }
    }

    fn save(&mut self, config: &SystemConfig) -> Result<(), ConfigError> {
        validate_config(config)?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;

        #[cfg(not(target_os = "espidf"))]
        {
            let key = Self::composite_key(CONFIG_NAMESPACE, b"syscfg");
            self.store.insert(key, bytes);
            info!("NvsAdapter: config saved (simulation)");
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(CONFIG_NAMESPACE, true, |handle| {
                let key_cstr = b"syscfg\0";
                let ret = unsafe {
                    nvs_set_blob(
                        handle,
                        key_cstr.as_ptr() as *const _,
                        bytes.as_ptr() as *const _,
                        bytes.len(),
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            match result {
                Ok(()) => {
                    info!("NvsAdapter: config saved to NVS ({} bytes)", bytes.len());
                    Ok(())
                }
                Err(e) => {
                    warn!("NvsAdapter: NVS write error {}", e);
                    Err(ConfigError::IoError)
                }
            }
        }
    }
}
