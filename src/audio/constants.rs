/// Audio processing constants and dB conversion helpers

/// Gain parameter range exposed to the host
pub const GAIN_MIN_DB: f32 = -60.0;
pub const GAIN_MAX_DB: f32 = 12.0;
pub const GAIN_DEFAULT_DB: f32 = 0.0;
pub const GAIN_STEP_DB: f32 = 0.1;

/// Gain changes ramp over this duration so a parameter jump never clicks
pub const GAIN_RAMP_SECONDS: f32 = 0.05;

/// The meter reports silence as this floor value, never negative infinity.
/// Matches the bottom of the displayed meter range.
pub const METER_FLOOR_DB: f32 = -60.0;

/// Sample rates at or below zero are clamped to this before any ramp-length
/// math, so a bad host value can never produce a zero-length ramp.
pub const MIN_SAMPLE_RATE: f32 = 1.0;

// === HELPER FUNCTIONS ===

/// Convert decibels to a linear gain multiplier
pub fn db_to_gain(db: f32) -> f32 {
    10.0f32.powf(db / 20.0)
}

/// Convert a linear magnitude to decibels, floored at `METER_FLOOR_DB`.
/// A magnitude of zero (or anything below the floor) reports the floor
/// rather than -inf.
pub fn gain_to_db_floored(gain: f32) -> f32 {
    if gain > 0.0 {
        (20.0 * gain.log10()).max(METER_FLOOR_DB)
    } else {
        METER_FLOOR_DB
    }
}
