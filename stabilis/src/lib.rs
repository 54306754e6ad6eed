//! Stabilis - rigid drift correction for time-lapse imaging.
//!
//! Estimates how a frame drifted against a reference frame and undoes it:
//! - Translation by spectral cross-correlation with sub-pixel peak refinement
//! - Rotation by correlating polar resamplings of both frames
//! - Whole-pixel, sub-pixel and rotational transforms of multi-channel images
//! - Registration of whole frame sequences with optional archiving of originals
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use stabilis::{Channels, correct_translation_2d, find_translation_2d};
//!
//! let drift = find_translation_2d(&frame, &reference, Channels::All)?;
//! println!("frame drifted by {}", -drift);
//!
//! let (aligned, _) = correct_translation_2d(&frame, &reference, Channels::All, true)?;
//! ```

pub mod channels;
pub mod config;
pub mod error;
pub mod image;
pub mod log_polar;
mod plane;
pub mod rotation;
pub mod sequence;
pub mod spectral;
pub mod transform;
pub mod translation;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Core types
// ============================================================================

pub use channels::Channels;
pub use error::{Error, Result};
pub use image::{HorizontalAnchor, Image, Sample, SampleType, Samples, VerticalAnchor};
pub use plane::Plane;

// ============================================================================
// Estimation
// ============================================================================

pub use log_polar::{LogPolarGrid, image_center, to_log_polar, to_log_polar_at};
pub use rotation::{RotationEstimator, find_rotation_2d};
pub use spectral::{Fft2d, RustFft2d, SpectralCorrelator, cross_correlation};
pub use translation::{Translation, find_translation_2d, find_translation_2d_channel};

// ============================================================================
// Correction
// ============================================================================

pub use transform::{
    INTEGER_SHIFT_TOLERANCE, NO_OP_EPSILON, ROTATION_EPSILON, apply_rotation_2d,
    apply_translation_2d, correct_rotation_2d, correct_translation_2d,
};

// ============================================================================
// Sequences
// ============================================================================

pub use config::{Config, RegistrationMode};
pub use sequence::{FrameCorrection, MemoryArchive, OriginalArchive, register_sequence};
