//! Tunable parameters and their in-memory mirror.
//!
//! The parameter set is fixed at build time: [`ParameterId`] indexes a
//! static table of bounds, steps, and defaults, and slot `i` of the
//! [`ByteStore`] holds parameter `i` as one byte.
//!
//! ## Write-back contract
//!
//! The backing medium tolerates on the order of 10^5 write cycles, so the
//! store never writes on adjustment. Mutations only touch the mirror;
//! [`SettingsStore::flush`] writes back the slots that changed, and the
//! menu calls it once per completed traversal.

use log::{info, warn};

use crate::app::ports::ByteStore;
use crate::timing::minutes_to_ms;

/// Identity of every adjustable parameter, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ParameterId {
    Brightness = 0,
    Contrast = 1,
    HumidityThreshold = 2,
    DefaultLight = 3,
    FanLockMinutes = 4,
    FanMaxRunMinutes = 5,
    FanRestMinutes = 6,
    LightLockMinutes = 7,
}

impl ParameterId {
    /// Total number of parameters. Sizes the mirror and the table.
    pub const COUNT: usize = 8;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Brightness,
        Self::Contrast,
        Self::HumidityThreshold,
        Self::DefaultLight,
        Self::FanLockMinutes,
        Self::FanMaxRunMinutes,
        Self::FanRestMinutes,
        Self::LightLockMinutes,
    ];

    /// Position in the menu and the persistent slot number.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    /// The parameter after this one in menu order, `None` for the last.
    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn spec(self) -> &'static ParameterSpec {
        &PARAMETERS[self.index()]
    }
}

/// How a parameter responds to up/down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    /// Bounded integer, adjusted by a fixed step.
    Integer { min: u8, max: u8, step: u8 },
    /// On/off flag; both up and down toggle.
    Boolean,
}

/// Unit hint for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    None,
    Percent,
    Minutes,
}

/// Static description of one parameter.
#[derive(Debug, Clone, Copy)]
pub struct ParameterSpec {
    pub id: ParameterId,
    pub kind: ParameterKind,
    pub unit: Unit,
    pub default: ParameterValue,
}

impl ParameterSpec {
    pub const fn min(&self) -> u8 {
        match self.kind {
            ParameterKind::Integer { min, .. } => min,
            ParameterKind::Boolean => 0,
        }
    }

    pub const fn max(&self) -> u8 {
        match self.kind {
            ParameterKind::Integer { max, .. } => max,
            ParameterKind::Boolean => 1,
        }
    }

    /// Decode a stored byte, clamping it into bounds.
    pub fn decode(&self, raw: u8) -> ParameterValue {
        match self.kind {
            ParameterKind::Integer { min, max, .. } => ParameterValue::Integer(raw.clamp(min, max)),
            ParameterKind::Boolean => ParameterValue::Boolean(raw != 0),
        }
    }
}

const fn int(id: ParameterId, min: u8, max: u8, step: u8, unit: Unit, default: u8) -> ParameterSpec {
    ParameterSpec {
        id,
        kind: ParameterKind::Integer { min, max, step },
        unit,
        default: ParameterValue::Integer(default),
    }
}

/// Bounds, steps, and factory defaults, indexed by [`ParameterId`].
///
/// Slot 0 must never hold [`ByteStore::ERASED`] as a legal value, or a
/// saved setting would read back as "uninitialised" on the next boot.
pub static PARAMETERS: [ParameterSpec; ParameterId::COUNT] = [
    int(ParameterId::Brightness, 0, 254, 1, Unit::None, 5),
    int(ParameterId::Contrast, 0, 250, 10, Unit::None, 110),
    int(ParameterId::HumidityThreshold, 0, 100, 1, Unit::Percent, 50),
    ParameterSpec {
        id: ParameterId::DefaultLight,
        kind: ParameterKind::Boolean,
        unit: Unit::None,
        default: ParameterValue::Boolean(false),
    },
    int(ParameterId::FanLockMinutes, 0, 60, 1, Unit::Minutes, 1),
    int(ParameterId::FanMaxRunMinutes, 1, 120, 1, Unit::Minutes, 30),
    int(ParameterId::FanRestMinutes, 1, 120, 1, Unit::Minutes, 10),
    int(ParameterId::LightLockMinutes, 0, 60, 1, Unit::Minutes, 5),
];

/// Direction of an adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjust {
    Up,
    Down,
}

/// A parameter value, tagged so that stepping vs toggling is decided by
/// the type rather than by which slot it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterValue {
    Integer(u8),
    Boolean(bool),
}

impl ParameterValue {
    /// One-byte persistent encoding.
    pub const fn to_byte(self) -> u8 {
        match self {
            Self::Integer(v) => v,
            Self::Boolean(b) => b as u8,
        }
    }

    /// The value after one up/down press, kept within `spec`'s bounds.
    pub fn stepped(self, spec: &ParameterSpec, dir: Adjust) -> Self {
        match (self, spec.kind) {
            (Self::Boolean(b), _) => Self::Boolean(!b),
            (Self::Integer(v), ParameterKind::Integer { min, max, step }) => {
                let next = match dir {
                    Adjust::Up => v.saturating_add(step),
                    Adjust::Down => v.saturating_sub(step),
                };
                Self::Integer(next.clamp(min, max))
            }
            (Self::Integer(v), ParameterKind::Boolean) => Self::Boolean(v == 0),
        }
    }
}

/// Outcome of a [`SettingsStore::flush`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Slots whose bytes were written to the medium.
    pub written: u8,
    /// Slots whose write failed; they stay dirty for the next flush.
    pub failed: u8,
}

/// In-memory mirror of the parameters, plus the last values known to be
/// on the medium.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    values: [u8; ParameterId::COUNT],
    persisted: [u8; ParameterId::COUNT],
}

impl SettingsStore {
    /// Factory defaults, not yet persisted.
    pub fn defaults() -> Self {
        let mut values = [0u8; ParameterId::COUNT];
        for spec in &PARAMETERS {
            values[spec.id.index()] = spec.default.to_byte();
        }
        Self {
            values,
            persisted: values,
        }
    }

    /// Populate the mirror from storage.
    ///
    /// If slot 0 reads as the erased sentinel the medium has never been
    /// initialised: every default is written once before reading back.
    /// Out-of-bounds bytes are clamped in the mirror but left on the medium
    /// until the next flush rewrites them.
    pub fn load<S: ByteStore>(store: &mut S) -> Self {
        if store.read(0) == S::ERASED {
            info!("settings: storage uninitialised, writing defaults");
            for spec in &PARAMETERS {
                if let Err(e) = store.write_if_changed(spec.id as u8, spec.default.to_byte()) {
                    warn!("settings: default for {:?} not written: {}", spec.id, e);
                }
            }
        }

        let mut values = [0u8; ParameterId::COUNT];
        let mut persisted = [0u8; ParameterId::COUNT];
        for spec in &PARAMETERS {
            let raw = store.read(spec.id as u8);
            persisted[spec.id.index()] = raw;
            values[spec.id.index()] = spec.decode(raw).to_byte();
        }
        info!("settings: loaded {:?}", values);
        Self { values, persisted }
    }

    pub fn get(&self, id: ParameterId) -> ParameterValue {
        id.spec().decode(self.values[id.index()])
    }

    /// Raw byte (0/1 for booleans).
    pub fn raw(&self, id: ParameterId) -> u8 {
        self.values[id.index()]
    }

    pub fn flag(&self, id: ParameterId) -> bool {
        self.values[id.index()] != 0
    }

    /// A minute-valued parameter converted to milliseconds.
    pub fn duration_ms(&self, id: ParameterId) -> u32 {
        minutes_to_ms(self.values[id.index()])
    }

    /// Set a parameter, clamped to its bounds. Returns the stored value.
    pub fn set(&mut self, id: ParameterId, value: ParameterValue) -> ParameterValue {
        let spec = id.spec();
        let stored = spec.decode(value.to_byte().clamp(spec.min(), spec.max()));
        self.values[id.index()] = stored.to_byte();
        stored
    }

    /// Apply one up/down step to `id`. Returns the new value.
    pub fn adjust(&mut self, id: ParameterId, dir: Adjust) -> ParameterValue {
        let next = self.get(id).stepped(id.spec(), dir);
        self.set(id, next)
    }

    /// Whether any slot differs from the medium.
    pub fn is_dirty(&self) -> bool {
        self.values != self.persisted
    }

    /// Write back only the slots that changed since the last load/flush.
    pub fn flush(&mut self, store: &mut impl ByteStore) -> FlushReport {
        let mut report = FlushReport::default();
        for idx in 0..ParameterId::COUNT {
            if self.values[idx] == self.persisted[idx] {
                continue;
            }
            match store.write_if_changed(idx as u8, self.values[idx]) {
                Ok(wrote) => {
                    self.persisted[idx] = self.values[idx];
                    if wrote {
                        report.written += 1;
                    }
                }
                Err(e) => {
                    warn!("settings: slot {} write failed: {}", idx, e);
                    report.failed += 1;
                }
            }
        }
        info!(
            "settings: flushed ({} written, {} failed)",
            report.written, report.failed
        );
        report
    }
}
