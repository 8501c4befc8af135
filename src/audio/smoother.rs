use crate::audio::constants::MIN_SAMPLE_RATE;

/// Linear per-sample ramp between gain values.
///
/// A step change in the gain parameter would otherwise land between two
/// samples as a discontinuity and click. The smoother spreads it over a
/// fixed wall-clock duration as equal per-sample increments, working purely
/// in the linear-gain domain (dB conversion happens once per change at the
/// call site, not per sample).
pub struct GainSmoother {
    /// Value returned by the most recent `next()` call
    current: f32,
    /// Value the ramp is heading towards
    target: f32,
    /// Per-sample increment while a ramp is active
    step: f32,
    /// Samples left until `current` equals `target`
    samples_remaining: u32,
    /// Full ramp length at the configured sample rate
    ramp_samples: u32,
}

impl GainSmoother {
    pub fn new() -> Self {
        Self {
            current: 1.0,
            target: 1.0,
            step: 0.0,
            samples_remaining: 0,
            ramp_samples: 1,
        }
    }

    /// Fix the ramp length for the given sample rate. Must be called before
    /// processing and again whenever the sample rate changes. Any ramp in
    /// flight is abandoned; the caller follows up with `reset` or
    /// `set_target` to establish the new trajectory.
    pub fn configure(&mut self, sample_rate: f32, ramp_seconds: f32) {
        let sample_rate = sample_rate.max(MIN_SAMPLE_RATE);
        self.ramp_samples = ((sample_rate * ramp_seconds).round() as u32).max(1);
        self.target = self.current;
        self.step = 0.0;
        self.samples_remaining = 0;
    }

    /// Snap directly to `value` with no ramp
    pub fn reset(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.step = 0.0;
        self.samples_remaining = 0;
    }

    /// Begin ramping towards `target`. A repeat of the current target is a
    /// no-op; a new one starts a fresh full-length ramp from the *current*
    /// value, so retargeting mid-ramp continues seamlessly instead of
    /// jumping back to some stale base.
    pub fn set_target(&mut self, target: f32) {
        if target == self.target {
            return;
        }

        self.target = target;
        if target == self.current {
            self.step = 0.0;
            self.samples_remaining = 0;
            return;
        }

        self.samples_remaining = self.ramp_samples;
        self.step = (target - self.current) / self.ramp_samples as f32;
    }

    /// Advance by one sample and return the interpolated gain. The final
    /// ramp sample lands on the target *exactly* (assigned, not accumulated,
    /// so float error cannot leave a residual), and every call after that
    /// returns the target unchanged.
    #[inline]
    pub fn next(&mut self) -> f32 {
        if self.samples_remaining == 0 {
            return self.target;
        }

        self.samples_remaining -= 1;
        if self.samples_remaining == 0 {
            self.current = self.target;
        } else {
            self.current += self.step;
        }
        self.current
    }

    pub fn is_ramping(&self) -> bool {
        self.samples_remaining > 0
    }

    /// Configured ramp length in samples
    pub fn ramp_samples(&self) -> u32 {
        self.ramp_samples
    }
}

impl Default for GainSmoother {
    fn default() -> Self {
        Self::new()
    }
}
