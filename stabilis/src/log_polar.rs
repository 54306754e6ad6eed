//! Polar resampling of one image channel.
//!
//! Rows of the output are rings around the centre, columns are angles. A
//! rotation of the image about the centre becomes a circular shift along the
//! rows, which the spectral correlator can find like any translation.
//!
//! The rings are spaced linearly out to the distance from the centre to the
//! image corner. Samples near or past the border read as 0.

use std::f64::consts::PI;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::image::Image;
use crate::plane::Plane;

/// Resolution of a polar resampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogPolarGrid {
    /// Angular bins over the full turn.
    pub size_theta: usize,
    /// Radial rings.
    pub size_rho: usize,
}

impl Default for LogPolarGrid {
    fn default() -> Self {
        // 1/3 degree angular resolution.
        Self {
            size_theta: 1080,
            size_rho: 360,
        }
    }
}

impl LogPolarGrid {
    pub fn new(size_theta: usize, size_rho: usize) -> Self {
        Self {
            size_theta,
            size_rho,
        }
    }

    /// Angle covered by one column.
    pub fn theta_step(&self) -> f64 {
        2.0 * PI / self.size_theta as f64
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.size_theta == 0 || self.size_rho == 0 {
            return Err(Error::InvalidArgument(format!(
                "polar grid must be non-empty, got {}x{}",
                self.size_theta, self.size_rho
            )));
        }
        Ok(())
    }
}

/// Default resampling centre: `(width / 2, height / 2)` in whole pixels.
pub fn image_center(image: &Image) -> DVec2 {
    DVec2::new((image.width() / 2) as f64, (image.height() / 2) as f64)
}

/// Resamples `channel` of `image` around its centre.
pub fn to_log_polar(image: &Image, channel: usize, grid: LogPolarGrid) -> Result<Plane> {
    to_log_polar_at(image, channel, image_center(image), grid)
}

/// Resamples `channel` of `image` around `center`. The result has
/// `grid.size_theta` columns and `grid.size_rho` rows.
pub fn to_log_polar_at(
    image: &Image,
    channel: usize,
    center: DVec2,
    grid: LogPolarGrid,
) -> Result<Plane> {
    grid.check()?;
    let source = image.plane(channel)?;
    if !(center.x >= 0.0
        && center.y >= 0.0
        && center.x < image.width() as f64
        && center.y < image.height() as f64)
    {
        return Err(Error::InvalidArgument(format!(
            "polar centre ({}, {}) outside {}x{} image",
            center.x,
            center.y,
            image.width(),
            image.height()
        )));
    }

    let LogPolarGrid {
        size_theta,
        size_rho,
    } = grid;
    let mut result = Plane::zeroed(size_theta, size_rho);

    let origin = source[(center.x as usize, center.y as usize)];
    for t in 0..size_theta {
        result[(t, 0)] = origin;
    }

    let rho_step = center.length() / size_rho as f64;
    let directions: Vec<DVec2> = (0..size_theta)
        .map(|t| DVec2::from_angle(t as f64 * grid.theta_step()))
        .collect();

    for r in 1..size_rho {
        let rho = r as f64 * rho_step;
        for (t, direction) in directions.iter().enumerate() {
            let p = center + rho * *direction;
            result[(t, r)] = source.bilinear_interior(p.x, p.y);
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::SampleType;
    use crate::testing::{gray, textured_image};

    #[test]
    fn test_default_grid() {
        let grid = LogPolarGrid::default();
        assert_eq!((grid.size_theta, grid.size_rho), (1080, 360));
        assert!((grid.theta_step().to_degrees() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_output_layout() {
        let image = textured_image(40, 30, 1, SampleType::F32, 1);
        let lp = to_log_polar(&image, 0, LogPolarGrid::new(90, 20)).unwrap();
        assert_eq!(lp.size(), (90, 20));
    }

    #[test]
    fn test_innermost_ring_is_centre_pixel() {
        let image = textured_image(33, 21, 1, SampleType::F64, 2);
        let lp = to_log_polar(&image, 0, LogPolarGrid::new(36, 10)).unwrap();
        let centre = image.sample_f64(0, 16, 10);
        assert!((0..36).all(|t| lp[(t, 0)] == centre));
    }

    #[test]
    fn test_uniform_image_is_constant_inside_and_zero_outside() {
        let (w, h) = (64, 64);
        let image = gray(w, h, vec![5.0; w * h]);
        let grid = LogPolarGrid::new(72, 40);
        let lp = to_log_polar(&image, 0, grid).unwrap();

        // Rings well inside the inscribed circle see only the interior.
        let rho_step = image_center(&image).length() / grid.size_rho as f64;
        for r in 0..grid.size_rho {
            let rho = r as f64 * rho_step;
            for t in 0..grid.size_theta {
                if rho < 28.0 {
                    assert!((lp[(t, r)] - 5.0).abs() < 1e-12, "ring {} angle {}", r, t);
                }
            }
        }
        // The outermost ring along the x axis lies beyond the border.
        assert_eq!(lp[(0, grid.size_rho - 1)], 0.0);
    }

    #[test]
    fn test_rotation_becomes_column_shift() {
        // A pattern depending only on the angle: quarter-turn symmetric rays.
        let (w, h) = (65, 65);
        let values: Vec<f64> = (0..w * h)
            .map(|i| {
                let x = (i % w) as f64 + 0.5 - 32.0;
                let y = (i / w) as f64 + 0.5 - 32.0;
                (y.atan2(x) * 3.0).cos()
            })
            .collect();
        let image = gray(w, h, values);
        let lp = to_log_polar(&image, 0, LogPolarGrid::new(360, 30)).unwrap();

        // cos(3 theta) peaks every 120 degrees along a ring.
        let ring = 10;
        assert!(lp[(0, ring)] > 0.9);
        assert!(lp[(120, ring)] > 0.9);
        assert!(lp[(60, ring)] < -0.9);
    }

    #[test]
    fn test_invalid_inputs() {
        let image = textured_image(16, 16, 1, SampleType::U8, 1);
        assert!(matches!(
            to_log_polar(&image, 1, LogPolarGrid::default()),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            to_log_polar(&image, 0, LogPolarGrid::new(0, 10)),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            to_log_polar_at(&image, 0, DVec2::new(16.0, 3.0), LogPolarGrid::default()),
            Err(Error::InvalidArgument(_))
        ));
    }
}
