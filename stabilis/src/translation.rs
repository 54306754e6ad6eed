//! Translation estimation by spectral correlation.
//!
//! The correlation peak of the current channel against the reference channel
//! gives the integer displacement; a 3-point parabolic fit on each axis
//! refines it below one pixel. The surface is periodic, so peaks past the
//! middle of an axis stand for negative displacements.

use std::ops::{Add, Neg};

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::channels::Channels;
use crate::error::{Error, Result};
use crate::image::Image;
use crate::plane::Plane;
use crate::spectral::{SpectralCorrelator, arg_max};

/// Below this the parabolic fit is considered flat and no offset is applied.
const SUBPIXEL_DENOMINATOR_EPSILON: f64 = 1e-9;

/// How far the current image must move, in pixels, to line up with the
/// reference.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Translation {
    pub dx: f64,
    pub dy: f64,
}

impl Translation {
    pub const ZERO: Translation = Translation { dx: 0.0, dy: 0.0 };

    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    pub fn length(&self) -> f64 {
        DVec2::from(*self).length()
    }

    /// Whether both components are within `tolerance` of an integer.
    pub fn is_integral(&self, tolerance: f64) -> bool {
        (self.dx - self.dx.round()).abs() <= tolerance
            && (self.dy - self.dy.round()).abs() <= tolerance
    }
}

impl From<DVec2> for Translation {
    fn from(v: DVec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<Translation> for DVec2 {
    fn from(t: Translation) -> Self {
        DVec2::new(t.dx, t.dy)
    }
}

impl Neg for Translation {
    type Output = Translation;

    fn neg(self) -> Self::Output {
        Translation::new(-self.dx, -self.dy)
    }
}

impl Add for Translation {
    type Output = Translation;

    fn add(self, rhs: Self) -> Self::Output {
        Translation::new(self.dx + rhs.dx, self.dy + rhs.dy)
    }
}

impl std::fmt::Display for Translation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Translation(dx={:.3}, dy={:.3})", self.dx, self.dy)
    }
}

/// Estimates the translation aligning `current_channel` of `current` onto
/// `reference_channel` of `reference`.
pub fn find_translation_2d_channel(
    current: &Image,
    current_channel: usize,
    reference: &Image,
    reference_channel: usize,
) -> Result<Translation> {
    let current_values = current.channel_f64(current_channel)?;
    let reference_values = reference.channel_f64(reference_channel)?;
    check_same_bounds(current, reference)?;

    let correlator = SpectralCorrelator::new(current.width(), current.height())?;
    estimate(&correlator, &current_values, &reference_values)
}

/// Estimates the translation aligning `current` onto `reference`, averaged
/// over the selected channels.
pub fn find_translation_2d(
    current: &Image,
    reference: &Image,
    channels: Channels,
) -> Result<Translation> {
    let range = channels.resolve_pair(current, reference)?;
    check_same_bounds(current, reference)?;

    let correlator = SpectralCorrelator::new(current.width(), current.height())?;
    let count = range.clone().count();
    let mut sum = DVec2::ZERO;
    for c in range {
        let t = estimate(
            &correlator,
            &current.channel_f64(c)?,
            &reference.channel_f64(c)?,
        )?;
        tracing::debug!(channel = c, dx = t.dx, dy = t.dy, "channel translation");
        sum += DVec2::from(t);
    }

    Ok(Translation::from(sum / count as f64))
}

fn check_same_bounds(current: &Image, reference: &Image) -> Result<()> {
    if !current.same_bounds(reference) {
        return Err(Error::UnsupportedOperation(format!(
            "cannot estimate translation between {}x{} and {}x{} images",
            current.width(),
            current.height(),
            reference.width(),
            reference.height()
        )));
    }
    Ok(())
}

fn estimate(
    correlator: &SpectralCorrelator,
    current: &[f64],
    reference: &[f64],
) -> Result<Translation> {
    let map = correlator.correlate(current, reference)?;
    let (x, y) = locate_peak(&map);
    Ok(Translation::new(-x, -y))
}

/// Sub-pixel, unwrapped peak position of a correlation surface.
pub(crate) fn locate_peak(map: &Plane) -> (f64, f64) {
    let (width, height) = map.size();
    let peak = arg_max(map.values());
    let px = peak % width;
    let py = peak / width;

    let left = map[((px + width - 1) % width, py)];
    let right = map[((px + 1) % width, py)];
    let up = map[(px, (py + height - 1) % height)];
    let down = map[(px, (py + 1) % height)];
    let center = map[(px, py)];

    let x = px as f64 + parabolic_offset(left, center, right);
    let y = py as f64 + parabolic_offset(up, center, down);

    (unwrap(x, width), unwrap(y, height))
}

/// Vertex of the parabola through three equally spaced samples, relative to
/// the centre one.
pub(crate) fn parabolic_offset(before: f64, center: f64, after: f64) -> f64 {
    let denominator = before - 2.0 * center + after;
    if denominator.abs() > SUBPIXEL_DENOMINATOR_EPSILON {
        0.5 * (before - after) / denominator
    } else {
        0.0
    }
}

/// Maps a periodic coordinate past the middle of the axis to its negative
/// equivalent.
#[inline]
pub(crate) fn unwrap(coord: f64, size: usize) -> f64 {
    if coord > size as f64 / 2.0 {
        coord - size as f64
    } else {
        coord
    }
}
