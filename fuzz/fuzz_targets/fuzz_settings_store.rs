//! Fuzz target: `SettingsStore` over an arbitrary byte store
//!
//! Seeds the 16 storage slots from fuzz bytes, then replays the rest of
//! the input as up/down presses on arbitrary parameters, verifying:
//! - No panics on any stored garbage
//! - Every parameter stays inside its bounds
//! - A flush followed by a fresh load reproduces the mirror exactly
//!
//! cargo fuzz run fuzz_settings_store

#![no_main]

use humictl::app::ports::{ByteStore, StorageError};
use humictl::settings::{Adjust, PARAMETERS, ParameterId, SettingsStore};
use libfuzzer_sys::fuzz_target;

// ── In-memory ByteStore for fuzz testing ──────────────────────

struct MemStore {
    cells: [u8; 16],
}

impl ByteStore for MemStore {
    fn read(&self, slot: u8) -> u8 {
        self.cells.get(slot as usize).copied().unwrap_or(Self::ERASED)
    }

    fn write_if_changed(&mut self, slot: u8, value: u8) -> Result<bool, StorageError> {
        let cell = self
            .cells
            .get_mut(slot as usize)
            .ok_or(StorageError::OutOfRange)?;
        let changed = *cell != value;
        *cell = value;
        Ok(changed)
    }
}

fuzz_target!(|data: &[u8]| {
    let (seed, ops) = data.split_at(data.len().min(16));
    let mut store = MemStore { cells: [0xFF; 16] };
    store.cells[..seed.len()].copy_from_slice(seed);

    let mut settings = SettingsStore::load(&mut store);

    // Each op byte: low 3 bits pick the parameter, bit 7 the direction.
    for &op in ops {
        let Some(id) = ParameterId::from_index((op & 0x07) as usize) else {
            continue;
        };
        let dir = if op & 0x80 != 0 { Adjust::Up } else { Adjust::Down };
        settings.adjust(id, dir);
    }

    for spec in &PARAMETERS {
        let raw = settings.raw(spec.id);
        assert!(
            (spec.min()..=spec.max()).contains(&raw),
            "{:?} = {} out of bounds",
            spec.id,
            raw
        );
    }

    let report = settings.flush(&mut store);
    assert_eq!(report.failed, 0);
    assert!(!settings.is_dirty());

    let reloaded = SettingsStore::load(&mut store);
    for id in ParameterId::ALL {
        assert_eq!(reloaded.raw(id), settings.raw(id), "{:?} not persisted", id);
    }
});
