//! Applying estimated drift to image buffers.
//!
//! Whole-pixel translations copy samples into a grown canvas and never
//! resample. Fractional translations and rotations resample the targeted
//! channels with bilinear interpolation; samples falling outside the source
//! read as 0. Channels outside the selection keep their samples.
//!
//! Inputs are never modified. When a transform has no effect the input comes
//! back borrowed.

use std::borrow::Cow;

use glam::DVec2;

use crate::channels::Channels;
use crate::error::Result;
use crate::image::Image;
use crate::plane::Plane;
use crate::rotation::find_rotation_2d;
use crate::translation::{Translation, find_translation_2d};

/// Translations within this distance of whole pixels take the copy path.
pub const INTEGER_SHIFT_TOLERANCE: f64 = 0.01;

/// Rotations smaller than this, in radians, are not applied.
pub const ROTATION_EPSILON: f64 = 0.001;

/// Estimated drift below this (pixels or radians) is not corrected.
pub const NO_OP_EPSILON: f64 = 0.001;

/// Moves the selected channels of `image` by `translation`.
///
/// Whole-pixel shifts grow the canvas by `|dx| x |dy|`, placing the moved
/// channels at `(max(0, dx), max(0, dy))` and the others at
/// `(max(0, -dx), max(0, -dy))`. With `preserve_image_size` the canvas is
/// cropped back to the original frame of the unmoved channels. Fractional
/// shifts always keep the original size.
pub fn apply_translation_2d(
    image: &Image,
    channels: Channels,
    translation: Translation,
    preserve_image_size: bool,
) -> Result<Cow<'_, Image>> {
    let targets = channels.resolve(image.channel_count())?;

    if !translation.is_integral(INTEGER_SHIFT_TOLERANCE) {
        let shift = DVec2::from(translation);
        let mut result = image.clone();
        for c in targets {
            let source = image.plane(c)?;
            let shifted = resample(&source, source.width(), source.height(), |p| p - shift);
            result.set_plane(c, &shifted);
        }
        return Ok(Cow::Owned(result));
    }

    let dx = translation.dx.round() as isize;
    let dy = translation.dy.round() as isize;
    if dx == 0 && dy == 0 {
        return Ok(Cow::Borrowed(image));
    }

    let (width, height) = image.size();
    let mut canvas = image.blank_like(width + dx.unsigned_abs(), height + dy.unsigned_abs());
    for c in 0..image.channel_count() {
        let (x, y) = if targets.contains(&c) {
            (dx.max(0), dy.max(0))
        } else {
            ((-dx).max(0), (-dy).max(0))
        };
        canvas.blit_channel(c, image, c, x, y);
    }

    if preserve_image_size {
        canvas = canvas.crop((-dx).max(0), (-dy).max(0), width, height)?;
    }
    Ok(Cow::Owned(canvas))
}

/// Rotates the selected channels of `image` by `angle` radians about the image
/// centre. Positive angles turn +x towards +y.
///
/// The rotated channels are rendered into the bounding box of the rotated
/// frame, with the original frame centred in it. With `preserve_image_size`
/// the result is cropped back to the original frame and the other channels
/// are unchanged; otherwise the other channels are centred in the grown
/// canvas.
pub fn apply_rotation_2d(
    image: &Image,
    channels: Channels,
    angle: f64,
    preserve_image_size: bool,
) -> Result<Cow<'_, Image>> {
    let targets = channels.resolve(image.channel_count())?;
    if angle.abs() < ROTATION_EPSILON {
        return Ok(Cow::Borrowed(image));
    }

    let (width, height) = image.size();
    let (rotated_width, rotated_height) = rotated_bounds(width, height, angle);
    let offset_x = (rotated_width as isize - width as isize) / 2;
    let offset_y = (rotated_height as isize - height as isize) / 2;

    let source_center = DVec2::new(width as f64 / 2.0, height as f64 / 2.0);
    let canvas_center = source_center + DVec2::new(offset_x as f64, offset_y as f64);
    let inverse = DVec2::from_angle(-angle);

    let mut canvas = image.blank_like(rotated_width, rotated_height);
    for c in 0..image.channel_count() {
        if targets.contains(&c) {
            let source = image.plane(c)?;
            let rotated = resample(&source, rotated_width, rotated_height, |p| {
                inverse.rotate(p - canvas_center) + source_center
            });
            canvas.set_plane(c, &rotated);
        } else {
            canvas.blit_channel(c, image, c, offset_x, offset_y);
        }
    }

    if preserve_image_size {
        canvas = canvas.crop(offset_x, offset_y, width, height)?;
    }
    Ok(Cow::Owned(canvas))
}

/// Size of the axis-aligned box holding a `width x height` frame rotated by
/// `angle`.
pub(crate) fn rotated_bounds(width: usize, height: usize, angle: f64) -> (usize, usize) {
    // Keeps exact multiples of a quarter turn from rounding up a pixel.
    const SLACK: f64 = 1e-6;

    let (sin, cos) = angle.sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    let (w, h) = (width as f64, height as f64);
    let rotated_width = (w * cos + h * sin - SLACK).ceil().max(1.0);
    let rotated_height = (w * sin + h * cos - SLACK).ceil().max(1.0);
    (rotated_width as usize, rotated_height as usize)
}

/// Renders a `width x height` plane whose pixel centred at `p` takes the
/// source value at `source_position(p)`. Positions are continuous pixel
/// coordinates, pixel `i` covering `[i, i + 1)`.
fn resample<F>(source: &Plane, width: usize, height: usize, source_position: F) -> Plane
where
    F: Fn(DVec2) -> DVec2,
{
    let mut result = Plane::zeroed(width, height);
    for y in 0..height {
        for x in 0..width {
            let q = source_position(DVec2::new(x as f64 + 0.5, y as f64 + 0.5));
            result[(x, y)] = source.bilinear(q.x - 0.5, q.y - 0.5);
        }
    }
    result
}

/// Estimates the translation of `current` against `reference` over the
/// selected channels and moves every channel of `current` by it.
///
/// Drift below [`NO_OP_EPSILON`] on both axes leaves the image borrowed.
/// Returns the corrected image with the estimate.
pub fn correct_translation_2d<'a>(
    current: &'a Image,
    reference: &Image,
    channels: Channels,
    preserve_image_size: bool,
) -> Result<(Cow<'a, Image>, Translation)> {
    let translation = find_translation_2d(current, reference, channels)?;
    if translation.dx.abs() < NO_OP_EPSILON && translation.dy.abs() < NO_OP_EPSILON {
        return Ok((Cow::Borrowed(current), translation));
    }

    tracing::debug!(%translation, "correcting translation");
    let corrected = apply_translation_2d(current, Channels::All, translation, preserve_image_size)?;
    Ok((corrected, translation))
}

/// Estimates the rotation of `current` against `reference` over the selected
/// channels and turns every channel of `current` by it.
///
/// `hint` is forwarded to the estimator to reconcile differing sizes. Drift
/// below [`NO_OP_EPSILON`] leaves the image borrowed.
pub fn correct_rotation_2d<'a>(
    current: &'a Image,
    reference: &Image,
    channels: Channels,
    hint: Option<Translation>,
    preserve_image_size: bool,
) -> Result<(Cow<'a, Image>, f64)> {
    let angle = find_rotation_2d(current, reference, channels, hint)?;
    if angle.abs() < NO_OP_EPSILON {
        return Ok((Cow::Borrowed(current), angle));
    }

    tracing::debug!(angle, "correcting rotation");
    let corrected = apply_rotation_2d(current, Channels::All, angle, preserve_image_size)?;
    Ok((corrected, angle))
}
