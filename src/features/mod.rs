//! Feature extraction modules
//!
//! This module contains the analysis-side algorithms:
//! - Pitch tracking (YIN difference function, CMND, period selection)
//! - Scale handling (scale definitions, quantization, contour smoothing)

pub mod pitch;
pub mod scale;
