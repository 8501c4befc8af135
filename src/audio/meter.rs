use atomic_float::AtomicF32;
use std::sync::{atomic::Ordering, Arc};

use crate::audio::constants::{gain_to_db_floored, METER_FLOOR_DB};

/// Running maximum of absolute sample magnitude within one block.
///
/// Block-scoped: the engine feeds it every post-gain sample, then takes the
/// result (and the reset) at block end. Plain field state, nothing shared.
pub struct PeakTracker {
    max_magnitude: f32,
}

impl PeakTracker {
    pub fn new() -> Self {
        Self { max_magnitude: 0.0 }
    }

    #[inline]
    pub fn observe(&mut self, sample: f32) {
        let magnitude = sample.abs();
        if magnitude > self.max_magnitude {
            self.max_magnitude = magnitude;
        }
    }

    /// Close out the block: convert the running maximum to decibels (an
    /// all-zero block reports the -60 dB floor) and clear the state for the
    /// next block.
    pub fn finish_block_db(&mut self) -> f32 {
        let db = gain_to_db_floored(self.max_magnitude);
        self.max_magnitude = 0.0;
        db
    }
}

impl Default for PeakTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Writer half of the peak-level channel, held by the audio thread.
///
/// One atomic store per block, so a reader sampling mid-write sees either
/// the previous complete block's value or the new one - never a torn or
/// partial-block value.
#[derive(Clone)]
pub struct PeakOutput {
    slot: Arc<AtomicF32>,
}

impl PeakOutput {
    /// Publish a completed block's peak level (called once per block from
    /// the audio thread; must stay lock- and allocation-free)
    #[inline]
    pub fn publish_db(&self, db: f32) {
        self.slot.store(db, Ordering::Relaxed);
    }
}

/// Reader half of the peak-level channel, for the UI thread.
///
/// Safe to poll from any thread at any rate; a missed poll just means a
/// stale value next cycle.
#[derive(Clone)]
pub struct PeakMeter {
    slot: Arc<AtomicF32>,
}

impl PeakMeter {
    /// Peak level of the most recently completed block, in decibels
    pub fn peak_db(&self) -> f32 {
        self.slot.load(Ordering::Relaxed)
    }
}

/// Create the peak-level channel pair: the output side for the audio thread,
/// the meter side for the UI thread. Starts at the silence floor.
pub fn peak_channel() -> (PeakOutput, PeakMeter) {
    let slot = Arc::new(AtomicF32::new(METER_FLOOR_DB));

    (
        PeakOutput { slot: slot.clone() },
        PeakMeter { slot },
    )
}
