use atomic_float::AtomicF32;
use std::sync::atomic::Ordering;

use crate::audio::constants::{GAIN_DEFAULT_DB, GAIN_MAX_DB, GAIN_MIN_DB};

/// The gain value in decibels, shared between threads.
///
/// The UI, host automation, and state restore all write through `set_db`;
/// the audio thread reads it once per block with `db`. Both sides touch a
/// single atomic word, so neither can block the other and a reader always
/// sees a complete value.
pub struct GainParameter {
    db: AtomicF32,
}

impl GainParameter {
    pub fn new(db: f32) -> Self {
        Self {
            db: AtomicF32::new(db.clamp(GAIN_MIN_DB, GAIN_MAX_DB)),
        }
    }

    /// Current gain in decibels, always within [GAIN_MIN_DB, GAIN_MAX_DB]
    #[inline]
    pub fn db(&self) -> f32 {
        self.db.load(Ordering::Relaxed)
    }

    /// Store a new gain, clamped to the declared range. Out-of-range values
    /// are silently clamped, never rejected - automation data routinely
    /// drifts past a plugin's own declared bounds.
    pub fn set_db(&self, db: f32) {
        self.db
            .store(db.clamp(GAIN_MIN_DB, GAIN_MAX_DB), Ordering::Relaxed);
    }
}

impl Default for GainParameter {
    fn default() -> Self {
        Self::new(GAIN_DEFAULT_DB)
    }
}
