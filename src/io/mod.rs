//! Audio I/O modules
//!
//! - [`sample_buffer::SampleBuffer`]: mono samples plus sample rate
//! - [`decoder`]: file decoding using Symphonia
//! - [`encoder`]: WAV output using hound

pub mod decoder;
pub mod encoder;
pub mod sample_buffer;
