use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::image::Image;

/// Selects the channels an estimation or transform operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Channels {
    /// Every channel of the image.
    #[default]
    All,
    /// One 0-based channel.
    Single(usize),
    /// Inclusive range `first..=last`.
    Range { first: usize, last: usize },
}

impl Channels {
    /// Resolves the selection against an image with `channel_count` channels.
    pub fn resolve(&self, channel_count: usize) -> Result<RangeInclusive<usize>> {
        if channel_count == 0 {
            return Err(Error::InvalidArgument("image has no channels".to_string()));
        }
        let (first, last) = match *self {
            Channels::All => (0, channel_count - 1),
            Channels::Single(c) => (c, c),
            Channels::Range { first, last } => (first, last),
        };
        if first > last {
            return Err(Error::InvalidArgument(format!(
                "empty channel range {}..={}",
                first, last
            )));
        }
        if last >= channel_count {
            return Err(Error::InvalidArgument(format!(
                "channel {} out of range for image with {} channels",
                last, channel_count
            )));
        }
        Ok(first..=last)
    }

    /// Resolves the selection against two images that must both provide
    /// every selected channel.
    pub(crate) fn resolve_pair(
        &self,
        current: &Image,
        reference: &Image,
    ) -> Result<RangeInclusive<usize>> {
        let range = self.resolve(current.channel_count())?;
        self.resolve(reference.channel_count())?;
        Ok(range)
    }
}

impl From<usize> for Channels {
    fn from(channel: usize) -> Self {
        Channels::Single(channel)
    }
}
