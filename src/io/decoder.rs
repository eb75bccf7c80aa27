//! Audio decoding using Symphonia

use super::sample_buffer::SampleBuffer;
use crate::error::AutotuneError;
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer as PcmBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decoded PCM with its stream parameters
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Interleaved `f32` samples in `[-1, 1]`
    pub samples: Vec<f32>,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Channel count
    pub channels: usize,
}

impl DecodedAudio {
    /// Number of sample frames (samples per channel)
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels
        }
    }
}

fn decoding_error(context: &str, err: impl std::fmt::Display) -> AutotuneError {
    AutotuneError::DecodingError(format!("{}: {}", context, err))
}

/// Decode an audio file to interleaved PCM
///
/// Any container/codec enabled in Symphonia's default feature set is accepted
/// (WAV, FLAC, Ogg Vorbis, ...). Corrupt packets are skipped.
///
/// # Arguments
///
/// * `path` - Path to audio file
///
/// # Errors
///
/// Returns `AutotuneError::DecodingError` if the file cannot be opened, probed
/// or decoded, or has no audio track.
pub fn decode_audio(path: impl AsRef<Path>) -> Result<DecodedAudio, AutotuneError> {
    let path = path.as_ref();
    log::debug!("Decoding audio file: {}", path.display());

    let src = File::open(path).map_err(|e| decoding_error("Cannot open file", e))?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let meta_opts: MetadataOptions = Default::default();
    let fmt_opts: FormatOptions = Default::default();

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &fmt_opts, &meta_opts)
        .map_err(|e| decoding_error("Unsupported format", e))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| {
            AutotuneError::DecodingError("No supported audio tracks found".to_string())
        })?;

    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;
    let mut channels = track.codec_params.channels.map(|c| c.count());

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| decoding_error("Unsupported codec", e))?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::ResetRequired) => {
                return Err(AutotuneError::DecodingError(
                    "Stream parameters changed mid-stream".to_string(),
                ));
            }
            Err(_) => break,
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate.get_or_insert(spec.rate);
                channels.get_or_insert(spec.channels.count());

                let mut pcm = PcmBuffer::<f32>::new(decoded.capacity() as u64, spec);
                pcm.copy_interleaved_ref(decoded);
                samples.extend_from_slice(pcm.samples());
            }
            Err(SymphoniaError::DecodeError(e)) => {
                log::warn!("Skipping corrupt packet: {}", e);
                continue;
            }
            Err(e) => return Err(decoding_error("Decode failed", e)),
        }
    }

    let sample_rate = sample_rate
        .ok_or_else(|| AutotuneError::DecodingError("Missing sample rate".to_string()))?;
    let channels = channels.unwrap_or(1);

    log::debug!(
        "Decoded {} samples, {} Hz, {} channel(s)",
        samples.len(),
        sample_rate,
        channels
    );

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels,
    })
}

/// Decode a file and require single-channel content
///
/// # Errors
///
/// Returns `AutotuneError::InvalidChannelCount` for multi-channel files, and
/// any error from [`decode_audio`].
pub fn load_mono(path: impl AsRef<Path>) -> Result<SampleBuffer, AutotuneError> {
    let decoded = decode_audio(path)?;
    SampleBuffer::from_interleaved(decoded.samples, decoded.channels, decoded.sample_rate)
}
