//! Registration configuration.

use serde::{Deserialize, Serialize};

use crate::channels::Channels;
use crate::error::{Error, Result};
use crate::log_polar::LogPolarGrid;
use crate::transform::NO_OP_EPSILON;

/// Which kinds of drift a sequence registration corrects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RegistrationMode {
    #[default]
    Translation,
    Rotation,
    /// Translation first, then rotation of the translated frame.
    TranslationAndRotation,
}

impl RegistrationMode {
    pub fn corrects_translation(&self) -> bool {
        matches!(
            self,
            RegistrationMode::Translation | RegistrationMode::TranslationAndRotation
        )
    }

    pub fn corrects_rotation(&self) -> bool {
        matches!(
            self,
            RegistrationMode::Rotation | RegistrationMode::TranslationAndRotation
        )
    }
}

/// Registration configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Angular bins of the polar resampling used for rotation.
    pub size_theta: usize,
    /// Radial rings of the polar resampling used for rotation.
    pub size_rho: usize,
    /// Channels the drift is estimated on. Corrections move every channel.
    pub channels: Channels,
    pub mode: RegistrationMode,
    /// Crop corrected frames back to their original size instead of growing
    /// the canvas.
    pub preserve_image_size: bool,
    /// Estimates below this (pixels or radians) are not applied.
    pub no_op_epsilon: f64,
}

impl Default for Config {
    fn default() -> Self {
        let grid = LogPolarGrid::default();
        Self {
            size_theta: grid.size_theta,
            size_rho: grid.size_rho,
            channels: Channels::All,
            mode: RegistrationMode::Translation,
            preserve_image_size: true,
            no_op_epsilon: NO_OP_EPSILON,
        }
    }
}

impl Config {
    /// Polar grid for rotation estimation.
    pub fn grid(&self) -> LogPolarGrid {
        LogPolarGrid::new(self.size_theta, self.size_rho)
    }

    /// Checks the parameters, reporting the first problem found.
    pub fn check(&self) -> Result<()> {
        if self.size_theta < 2 {
            return Err(Error::InvalidArgument(
                "size_theta must be at least 2".to_string(),
            ));
        }
        if self.size_rho < 2 {
            return Err(Error::InvalidArgument(
                "size_rho must be at least 2".to_string(),
            ));
        }
        if !(self.no_op_epsilon.is_finite() && self.no_op_epsilon >= 0.0) {
            return Err(Error::InvalidArgument(
                "no_op_epsilon must be finite and non-negative".to_string(),
            ));
        }
        if let Channels::Range { first, last } = self.channels {
            if first > last {
                return Err(Error::InvalidArgument(
                    "channel range must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Validate configuration parameters.
    ///
    /// # Panics
    /// When [`Config::check`] fails.
    pub fn validate(&self) {
        if let Err(err) = self.check() {
            panic!("{}", err);
        }
    }
}
