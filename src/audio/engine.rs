use std::sync::Arc;

use crate::audio::constants::{db_to_gain, GAIN_RAMP_SECONDS};
use crate::audio::meter::{peak_channel, PeakMeter, PeakOutput, PeakTracker};
use crate::audio::params::GainParameter;
use crate::audio::smoother::GainSmoother;

/// The real-time gain stage, invoked once per audio block.
///
/// Owns the shared gain parameter and the peak-level slot; hands out cheap
/// handles to both for the non-real-time side. Everything on the `process`
/// path is allocation-, lock-, and panic-free: the audio thread must never
/// wait on anything.
pub struct ProcessingEngine {
    gain: Arc<GainParameter>,
    smoother: GainSmoother,
    tracker: PeakTracker,
    peak_output: PeakOutput,
    peak_meter: PeakMeter,
}

impl ProcessingEngine {
    pub fn new() -> Self {
        let (peak_output, peak_meter) = peak_channel();

        Self {
            gain: Arc::new(GainParameter::default()),
            smoother: GainSmoother::new(),
            tracker: PeakTracker::new(),
            peak_output,
            peak_meter,
        }
    }

    /// The shared gain parameter, for the UI/automation side
    pub fn gain_handle(&self) -> Arc<GainParameter> {
        self.gain.clone()
    }

    /// The gain parameter, for same-thread access
    pub fn gain(&self) -> &GainParameter {
        &self.gain
    }

    /// Reader handle for the peak meter, for the UI side
    pub fn peak_meter(&self) -> PeakMeter {
        self.peak_meter.clone()
    }

    /// Sample-rate-dependent setup. Must be called before the first
    /// `process` and again on any format change. The smoother is snapped to
    /// the current parameter value so playback never starts with a spurious
    /// fade from unity.
    pub fn configure(&mut self, sample_rate: f32, _max_block_size: usize) {
        self.smoother.configure(sample_rate, GAIN_RAMP_SECONDS);
        self.smoother.reset(db_to_gain(self.gain.db()));
    }

    /// Process one block in place. `channels` holds one slice per channel,
    /// all of equal length; the first `num_input_channels` of them carry
    /// input, any further ones are output-only and come back zeroed.
    pub fn process(&mut self, channels: &mut [&mut [f32]], num_input_channels: usize) {
        let num_input_channels = num_input_channels.min(channels.len());
        let num_frames = channels.first().map_or(0, |channel| channel.len());

        // One dB-to-linear conversion per block; the per-sample loop stays
        // in the linear domain.
        self.smoother.set_target(db_to_gain(self.gain.db()));

        for frame in 0..num_frames {
            // One smoother step per frame, shared by every channel: all
            // channels must get the identical gain at a given time instant
            // or the stereo image shifts during ramps.
            let gain = self.smoother.next();

            for channel in channels.iter_mut().take(num_input_channels) {
                let sample = &mut channel[frame];
                *sample *= gain;
                self.tracker.observe(*sample);
            }
        }

        // Exactly one complete-block publication per invocation
        self.peak_output.publish_db(self.tracker.finish_block_db());

        // Surplus output channels get silence, never stale memory
        for channel in channels.iter_mut().skip(num_input_channels) {
            channel.fill(0.0);
        }
    }
}

impl Default for ProcessingEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::constants::{GAIN_MAX_DB, GAIN_MIN_DB, METER_FLOOR_DB};
    use std::thread;

    fn engine_at(sample_rate: f32) -> ProcessingEngine {
        let mut engine = ProcessingEngine::new();
        engine.configure(sample_rate, 512);
        engine
    }

    fn process_stereo(engine: &mut ProcessingEngine, left: &mut [f32], right: &mut [f32]) {
        let mut channels: [&mut [f32]; 2] = [left, right];
        engine.process(&mut channels, 2);
    }

    #[test]
    fn unity_gain_passes_audio_through() {
        let mut engine = engine_at(48000.0);
        let mut left = [0.5f32; 64];
        let mut right = [-0.25f32; 64];
        process_stereo(&mut engine, &mut left, &mut right);

        assert!(left.iter().all(|&s| s == 0.5));
        assert!(right.iter().all(|&s| s == -0.25));
    }

    #[test]
    fn full_scale_at_unity_meters_zero_db() {
        let mut engine = engine_at(48000.0);
        let meter = engine.peak_meter();

        let mut left = [0.0f32; 64];
        let mut right = [0.0f32; 64];
        left[10] = 1.0;
        process_stereo(&mut engine, &mut left, &mut right);

        assert!(meter.peak_db().abs() < 1e-6);
    }

    #[test]
    fn silent_block_meters_the_floor_exactly() {
        let mut engine = engine_at(48000.0);
        let meter = engine.peak_meter();

        let mut left = [0.0f32; 256];
        let mut right = [0.0f32; 256];
        process_stereo(&mut engine, &mut left, &mut right);

        assert_eq!(meter.peak_db(), METER_FLOOR_DB);
    }

    #[test]
    fn meter_reflects_the_latest_block_only() {
        let mut engine = engine_at(48000.0);
        let meter = engine.peak_meter();

        let mut left = [1.0f32; 64];
        let mut right = [1.0f32; 64];
        process_stereo(&mut engine, &mut left, &mut right);
        assert!(meter.peak_db() > -1.0);

        let mut left = [0.0f32; 64];
        let mut right = [0.0f32; 64];
        process_stereo(&mut engine, &mut left, &mut right);
        assert_eq!(meter.peak_db(), METER_FLOOR_DB);
    }

    #[test]
    fn configure_snaps_to_the_stored_gain() {
        // A gain set before configuration must apply from the very first
        // sample, not fade in from unity
        let mut engine = ProcessingEngine::new();
        engine.gain().set_db(-20.0);
        engine.configure(48000.0, 512);

        let mut left = [1.0f32; 8];
        let mut right = [1.0f32; 8];
        process_stereo(&mut engine, &mut left, &mut right);

        let expected = db_to_gain(-20.0);
        assert!(left.iter().all(|&s| s == expected));
    }

    #[test]
    fn gain_change_ramps_and_lands_exactly() {
        // 48 kHz, 50 ms ramp: 0 dB -> -60 dB arrives at sample 2400 exactly
        let mut engine = engine_at(48000.0);
        engine.gain().set_db(-60.0);

        let mut left = [1.0f32; 2400];
        let mut right = [1.0f32; 2400];
        process_stereo(&mut engine, &mut left, &mut right);

        let target = db_to_gain(-60.0);
        for window in left.windows(2) {
            assert!(window[1] < window[0] || window[1] == target);
        }
        assert_eq!(left[2399], target);
        assert!(left[2398] > target);

        // And holds there in the following block
        let mut left = [1.0f32; 64];
        let mut right = [1.0f32; 64];
        process_stereo(&mut engine, &mut left, &mut right);
        assert!(left.iter().all(|&s| s == target));
    }

    #[test]
    fn all_channels_share_one_gain_per_frame() {
        let mut engine = engine_at(48000.0);
        engine.gain().set_db(-6.0);

        // Identical inputs must stay identical mid-ramp
        let mut left = [1.0f32; 512];
        let mut right = [1.0f32; 512];
        process_stereo(&mut engine, &mut left, &mut right);

        assert!(engine_is_ramped(&left));
        assert_eq!(left, right);
    }

    fn engine_is_ramped(samples: &[f32]) -> bool {
        samples.windows(2).any(|w| w[0] != w[1])
    }

    #[test]
    fn surplus_output_channels_are_silenced() {
        let mut engine = engine_at(48000.0);
        let meter = engine.peak_meter();

        let mut mono_in = [0.5f32; 64];
        let mut stale_out = [0.9f32; 64];
        let mut channels: [&mut [f32]; 2] = [&mut mono_in, &mut stale_out];
        engine.process(&mut channels, 1);

        assert!(stale_out.iter().all(|&s| s == 0.0));
        // The stale channel's contents never reach the meter
        assert!((meter.peak_db() - -6.0206).abs() < 1e-3);
    }

    #[test]
    fn empty_block_still_publishes() {
        let mut engine = engine_at(48000.0);
        let meter = engine.peak_meter();
        let mut channels: [&mut [f32]; 0] = [];
        engine.process(&mut channels, 0);
        assert_eq!(meter.peak_db(), METER_FLOOR_DB);
    }

    #[test]
    fn concurrent_producer_and_consumer_stay_consistent() {
        let mut engine = engine_at(48000.0);
        let gain = engine.gain_handle();
        let meter = engine.peak_meter();

        let producer = thread::spawn(move || {
            for _ in 0..2000 {
                let mut left = [0.5f32; 256];
                let mut right = [-0.5f32; 256];
                process_stereo(&mut engine, &mut left, &mut right);
            }
        });

        // Hammer the parameter and the meter from this thread while the
        // producer runs. Every observed value must be complete and in range.
        for i in 0..200_000u32 {
            let db = GAIN_MIN_DB + (i % 721) as f32 * 0.1;
            gain.set_db(db);

            let seen = gain.db();
            assert!((GAIN_MIN_DB..=GAIN_MAX_DB).contains(&seen), "torn read: {seen}");

            let peak = meter.peak_db();
            assert!(
                (METER_FLOOR_DB..=GAIN_MAX_DB).contains(&peak),
                "torn peak: {peak}"
            );
        }

        producer.join().unwrap();
    }
}
