//! WAV output using hound

use super::sample_buffer::SampleBuffer;
use crate::error::AutotuneError;
use std::path::Path;

fn encoding_error(err: hound::Error) -> AutotuneError {
    AutotuneError::EncodingError(err.to_string())
}

/// Write a buffer as mono 32-bit float WAV
///
/// # Errors
///
/// Returns `AutotuneError::EncodingError` if the file cannot be created or written.
pub fn write_wav(path: impl AsRef<Path>, buffer: &SampleBuffer) -> Result<(), AutotuneError> {
    let path = path.as_ref();
    log::debug!(
        "Writing {} samples at {} Hz to {}",
        buffer.len(),
        buffer.sample_rate(),
        path.display()
    );

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(encoding_error)?;
    for &sample in buffer.samples() {
        writer.write_sample(sample).map_err(encoding_error)?;
    }
    writer.finalize().map_err(encoding_error)
}
