//! Signal preparation modules
//!
//! This module contains utilities that run before pitch analysis:
//! - Framing (fixed-length, fixed-hop analysis windows)
//! - Silence gating (optional RMS-based voicing shortcut)

pub mod framing;
pub mod silence;
