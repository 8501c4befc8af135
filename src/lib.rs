pub mod audio;

use nih_plug::prelude::*;
use std::sync::Arc;

use audio::constants::{GAIN_DEFAULT_DB, GAIN_MAX_DB, GAIN_MIN_DB, GAIN_STEP_DB};
use audio::engine::ProcessingEngine;

/// Gain plugin with peak metering. All of the signal work lives in
/// `audio::engine`; this type is the host-facing shell around it.
pub struct GainMeter {
    params: Arc<GainMeterParams>,
    engine: ProcessingEngine,
}

#[derive(Params)]
pub struct GainMeterParams {
    /// The gain is stored in decibels, exactly as displayed. The engine's
    /// own ramp does the smoothing in the linear domain, so no nih-plug
    /// smoothing style is attached here; the host persists and automates
    /// this field, and a missing or corrupt saved value falls back to the
    /// 0 dB default.
    #[id = "gain"]
    pub gain: FloatParam,
}

impl Default for GainMeter {
    fn default() -> Self {
        Self {
            params: Arc::new(GainMeterParams::default()),
            engine: ProcessingEngine::new(),
        }
    }
}

impl Default for GainMeterParams {
    fn default() -> Self {
        Self {
            gain: FloatParam::new(
                "Gain",
                GAIN_DEFAULT_DB,
                FloatRange::Linear {
                    min: GAIN_MIN_DB,
                    max: GAIN_MAX_DB,
                },
            )
            .with_step_size(GAIN_STEP_DB)
            .with_unit(" dB"),
        }
    }
}

impl Plugin for GainMeter {
    const NAME: &'static str = "Gain Meter";
    const VENDOR: &'static str = "Ethyr Audio";
    const URL: &'static str = env!("CARGO_PKG_HOMEPAGE");
    const EMAIL: &'static str = "info@ethyr.audio";

    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // Stereo by default, mono as an alternative; input and output channel
    // counts always match.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            ..AudioIOLayout::const_default()
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            ..AudioIOLayout::const_default()
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;
    const MIDI_OUTPUT: MidiConfig = MidiConfig::None;

    const SAMPLE_ACCURATE_AUTOMATION: bool = true;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    fn initialize(
        &mut self,
        _audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        nih_plug::nih_log!(
            "configuring engine: {} Hz, max block size {}",
            buffer_config.sample_rate,
            buffer_config.max_buffer_size
        );

        self.engine.configure(
            buffer_config.sample_rate,
            buffer_config.max_buffer_size as usize,
        );
        true
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        // Automation, manual edits, and state restore all arrive through the
        // same parameter, so the engine cannot tell them apart - it just
        // reads the one shared value per block.
        self.engine.gain().set_db(self.params.gain.value());

        let num_channels = buffer.channels();
        self.engine.process(buffer.as_slice(), num_channels);

        ProcessStatus::Normal
    }
}

impl ClapPlugin for GainMeter {
    const CLAP_ID: &'static str = "audio.ethyr.gain-meter";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("Real-time gain control with peak metering");
    const CLAP_MANUAL_URL: Option<&'static str> = Some(Self::URL);
    const CLAP_SUPPORT_URL: Option<&'static str> = None;

    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Utility,
        ClapFeature::Stereo,
        ClapFeature::Mono,
    ];
}

impl Vst3Plugin for GainMeter {
    const VST3_CLASS_ID: [u8; 16] = *b"EthyrGainMeter!!";

    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Tools];
}

nih_export_clap!(GainMeter);
nih_export_vst3!(GainMeter);
