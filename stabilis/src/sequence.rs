//! Registration of a range of frames against one reference.
//!
//! Every frame is estimated and corrected independently, so the frames are
//! processed in parallel. Corrected frames replace the originals in place;
//! the originals can be handed to an [`OriginalArchive`] first so the
//! correction can be undone.

use std::borrow::Cow;
use std::ops::RangeInclusive;

use hashbrown::HashMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::channels::Channels;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::image::Image;
use crate::rotation::RotationEstimator;
use crate::transform::{apply_rotation_2d, apply_translation_2d};
use crate::translation::{Translation, find_translation_2d};

/// Outcome of registering one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameCorrection {
    pub index: usize,
    /// Translation applied to the frame, zero when none was.
    pub translation: Translation,
    /// Rotation applied to the frame in radians, zero when none was.
    pub rotation: f64,
    /// Whether the frame was replaced.
    pub modified: bool,
}

/// Keeps frames as they were before correction.
pub trait OriginalArchive {
    fn archive(&mut self, index: usize, original: Image) -> Result<()>;
}

/// Archive holding the originals in memory, keyed by frame index.
///
/// The first original stored for an index is kept, so registering a sequence
/// twice still restores the frames as they were before the first pass.
#[derive(Debug, Default)]
pub struct MemoryArchive {
    originals: HashMap<usize, Image>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.originals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.originals.contains_key(&index)
    }

    pub fn get(&self, index: usize) -> Option<&Image> {
        self.originals.get(&index)
    }

    /// Puts every archived original back into `frames` and empties the
    /// archive. Returns the number of frames restored. Originals whose index
    /// lies outside `frames` are dropped.
    pub fn restore(&mut self, frames: &mut [Image]) -> usize {
        let mut restored = 0;
        for (index, original) in self.originals.drain() {
            if let Some(frame) = frames.get_mut(index) {
                *frame = original;
                restored += 1;
            } else {
                tracing::warn!(index, frames = frames.len(), "archived frame out of range");
            }
        }
        restored
    }
}

impl OriginalArchive for MemoryArchive {
    fn archive(&mut self, index: usize, original: Image) -> Result<()> {
        if self.originals.contains_key(&index) {
            tracing::warn!(index, "original already archived, keeping the earlier copy");
            return Ok(());
        }
        self.originals.insert(index, original);
        Ok(())
    }
}

/// Registers `frames[range]` against `reference` and replaces every frame
/// that needed a correction.
///
/// Corrections are computed for all frames before any frame is replaced; an
/// error leaves `frames` untouched. Originals of replaced frames are passed
/// to `archive` in frame order.
pub fn register_sequence(
    frames: &mut [Image],
    reference: &Image,
    range: RangeInclusive<usize>,
    config: &Config,
    mut archive: Option<&mut dyn OriginalArchive>,
) -> Result<Vec<FrameCorrection>> {
    config.check()?;
    let (first, last) = (*range.start(), *range.end());
    if first > last || last >= frames.len() {
        return Err(Error::InvalidArgument(format!(
            "frame range {}..={} out of bounds for {} frames",
            first,
            last,
            frames.len()
        )));
    }

    let results = frames[first..=last]
        .par_iter()
        .enumerate()
        .map(|(offset, frame)| register_frame(first + offset, frame, reference, config))
        .collect::<Result<Vec<_>>>()?;

    let mut corrections = Vec::with_capacity(results.len());
    for (correction, corrected) in results {
        match corrected {
            Some(image) => {
                let original = std::mem::replace(&mut frames[correction.index], image);
                if let Some(archive) = archive.as_deref_mut() {
                    archive.archive(correction.index, original)?;
                }
                tracing::info!(
                    frame = correction.index,
                    dx = correction.translation.dx,
                    dy = correction.translation.dy,
                    rotation = correction.rotation,
                    "frame registered"
                );
            }
            None => tracing::debug!(frame = correction.index, "frame already aligned"),
        }
        corrections.push(correction);
    }

    Ok(corrections)
}

/// Estimates and applies the corrections `config` asks for to one frame.
/// Returns the corrected frame when it differs from `frame`.
pub(crate) fn register_frame(
    index: usize,
    frame: &Image,
    reference: &Image,
    config: &Config,
) -> Result<(FrameCorrection, Option<Image>)> {
    let mut current = Cow::Borrowed(frame);
    let mut translation = Translation::ZERO;
    let mut rotation = 0.0;

    if config.mode.corrects_translation() {
        let estimate = find_translation_2d(&current, reference, config.channels)?;
        if estimate.dx.abs() >= config.no_op_epsilon || estimate.dy.abs() >= config.no_op_epsilon {
            let moved = apply_translation_2d(
                &current,
                Channels::All,
                estimate,
                config.preserve_image_size,
            )?
            .into_owned();
            current = Cow::Owned(moved);
            translation = estimate;
        }
    }

    if config.mode.corrects_rotation() {
        let hint = config.mode.corrects_translation().then_some(translation);
        let estimate = RotationEstimator::new(config.grid()).estimate(
            &current,
            reference,
            config.channels,
            hint,
        )?;
        if estimate.abs() >= config.no_op_epsilon {
            let turned = apply_rotation_2d(
                &current,
                Channels::All,
                estimate,
                config.preserve_image_size,
            )?
            .into_owned();
            current = Cow::Owned(turned);
            rotation = estimate;
        }
    }

    let corrected = match current {
        Cow::Owned(image) => Some(image),
        Cow::Borrowed(_) => None,
    };
    let correction = FrameCorrection {
        index,
        translation,
        rotation,
        modified: corrected.is_some(),
    };
    Ok((correction, corrected))
}
