//! Rotation estimation by spectral correlation of polar resamplings.
//!
//! Both images are resampled around their centres; the rotation shows up as a
//! shift along the angular axis of the correlation surface. Only the first
//! half of the flattened surface is searched for the peak. A rotation and its
//! point reflection produce two peaks half a turn apart, and the half-search
//! picks one of them by convention.

use std::borrow::Cow;
use std::f64::consts::PI;

use crate::channels::Channels;
use crate::error::{Error, Result};
use crate::image::{HorizontalAnchor, Image, VerticalAnchor};
use crate::log_polar::{LogPolarGrid, to_log_polar};
use crate::spectral::{SpectralCorrelator, arg_max};
use crate::translation::Translation;

/// Estimates rotations with a fixed polar grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct RotationEstimator {
    grid: LogPolarGrid,
}

impl RotationEstimator {
    pub fn new(grid: LogPolarGrid) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> LogPolarGrid {
        self.grid
    }

    /// Angle in radians by which `current` must be rotated to line up with
    /// `reference`, averaged over the selected channels.
    ///
    /// When the images differ in size, `hint` (the translation already applied
    /// to `current` on a grown canvas) decides how the reference canvas is
    /// padded to match. Without a hint the mismatch is unsupported.
    pub fn estimate(
        &self,
        current: &Image,
        reference: &Image,
        channels: Channels,
        hint: Option<Translation>,
    ) -> Result<f64> {
        self.grid.check()?;
        let range = channels.resolve_pair(current, reference)?;
        let reference = reconcile_reference(current, reference, hint)?;

        let correlator = SpectralCorrelator::new(self.grid.size_theta, self.grid.size_rho)?;
        let count = range.clone().count();
        let mut sum = 0.0;
        for c in range {
            let angle = self.estimate_with(&correlator, current, c, &reference, c)?;
            tracing::debug!(channel = c, angle, "channel rotation");
            sum += angle;
        }

        Ok(sum / count as f64)
    }

    /// Single-channel variant of [`RotationEstimator::estimate`].
    pub fn estimate_channel(
        &self,
        current: &Image,
        current_channel: usize,
        reference: &Image,
        reference_channel: usize,
        hint: Option<Translation>,
    ) -> Result<f64> {
        self.grid.check()?;
        current.channel(current_channel)?;
        reference.channel(reference_channel)?;
        let reference = reconcile_reference(current, reference, hint)?;

        let correlator = SpectralCorrelator::new(self.grid.size_theta, self.grid.size_rho)?;
        self.estimate_with(
            &correlator,
            current,
            current_channel,
            &reference,
            reference_channel,
        )
    }

    fn estimate_with(
        &self,
        correlator: &SpectralCorrelator,
        current: &Image,
        current_channel: usize,
        reference: &Image,
        reference_channel: usize,
    ) -> Result<f64> {
        let current_lp = to_log_polar(current, current_channel, self.grid)?;
        let reference_lp = to_log_polar(reference, reference_channel, self.grid)?;
        let map = correlator.correlate(current_lp.values(), reference_lp.values())?;

        let values = map.values();
        let peak = arg_max(&values[..values.len() / 2]);
        Ok(decode_angle(peak, self.grid.size_theta))
    }
}

/// Rotation angle from the flattened peak index of a polar correlation map
/// with `size_theta` columns.
pub(crate) fn decode_angle(peak: usize, size_theta: usize) -> f64 {
    let mut rot_x = (peak % size_theta) as isize;
    if rot_x > (size_theta / 2) as isize {
        rot_x -= size_theta as isize;
    }
    -(rot_x as f64) * 2.0 * PI / size_theta as f64
}

/// Brings `reference` to the size of `current`. A translation applied on a
/// grown canvas leaves the original frame at `(max(0, -dx), max(0, -dy))`, so
/// the reference is anchored to the far side on axes where the hint is
/// negative.
fn reconcile_reference<'a>(
    current: &Image,
    reference: &'a Image,
    hint: Option<Translation>,
) -> Result<Cow<'a, Image>> {
    if current.same_bounds(reference) {
        return Ok(Cow::Borrowed(reference));
    }
    let Some(hint) = hint else {
        return Err(Error::UnsupportedOperation(format!(
            "cannot estimate rotation between {}x{} and {}x{} images without a translation hint",
            current.width(),
            current.height(),
            reference.width(),
            reference.height()
        )));
    };

    let horizontal = if hint.dx < 0.0 {
        HorizontalAnchor::Right
    } else {
        HorizontalAnchor::Left
    };
    let vertical = if hint.dy < 0.0 {
        VerticalAnchor::Bottom
    } else {
        VerticalAnchor::Top
    };
    tracing::debug!(
        from_width = reference.width(),
        from_height = reference.height(),
        to_width = current.width(),
        to_height = current.height(),
        ?horizontal,
        ?vertical,
        "resizing reference canvas"
    );

    Ok(Cow::Owned(reference.resize_canvas(
        current.width(),
        current.height(),
        horizontal,
        vertical,
    )?))
}

/// Estimates the rotation aligning `current` onto `reference` with the
/// default polar grid.
pub fn find_rotation_2d(
    current: &Image,
    reference: &Image,
    channels: Channels,
    hint: Option<Translation>,
) -> Result<f64> {
    RotationEstimator::default().estimate(current, reference, channels, hint)
}
