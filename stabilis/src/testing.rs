//! Synthetic images for tests.

use glam::DVec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::image::{Image, SampleType};
use crate::plane::Plane;

/// Initialize tracing subscriber for tests.
/// Safe to call multiple times - will only initialize once.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Gaussian blob: centre, sigma, signed amplitude.
type Blob = (DVec2, f64, f64);

fn random_blobs(width: usize, height: usize, seed: u64) -> Vec<Blob> {
    let mut rng = StdRng::seed_from_u64(seed);
    let blob_count = (width * height / 64).max(8);
    (0..blob_count)
        .map(|_| {
            (
                DVec2::new(
                    rng.random_range(0.0..width as f64),
                    rng.random_range(0.0..height as f64),
                ),
                rng.random_range(1.5..4.0),
                rng.random_range(-1.0..1.0),
            )
        })
        .collect()
}

/// Renders blobs at pixel centres on a zero background.
fn render_blobs(width: usize, height: usize, blobs: &[Blob]) -> Vec<f64> {
    let mut values = vec![0.0; width * height];
    for y in 0..height {
        for x in 0..width {
            let p = DVec2::new(x as f64 + 0.5, y as f64 + 0.5);
            let mut v = 0.0;
            for &(centre, sigma, amplitude) in blobs {
                let r2 = p.distance_squared(centre);
                if r2 < 25.0 * sigma * sigma {
                    v += amplitude * (-r2 / (2.0 * sigma * sigma)).exp();
                }
            }
            values[y * width + x] += 60.0 * v;
        }
    }
    values
}

/// Smooth random texture: a sum of Gaussian blobs of varying size and sign,
/// offset to stay roughly within `[0, 255]`.
pub fn textured_values(width: usize, height: usize, seed: u64) -> Vec<f64> {
    let mut values = render_blobs(width, height, &random_blobs(width, height, seed));
    values.iter_mut().for_each(|v| *v += 128.0);
    values
}

/// The blobs of [`textured_values`] on a zero background, rendered rotated by
/// `angle` radians about the image centre. Positive angles turn +x towards +y.
pub fn rotated_textured_values(width: usize, height: usize, seed: u64, angle: f64) -> Vec<f64> {
    let centre = DVec2::new(width as f64 / 2.0, height as f64 / 2.0);
    let rotation = DVec2::from_angle(angle);
    let blobs: Vec<Blob> = random_blobs(width, height, seed)
        .into_iter()
        .map(|(p, sigma, amplitude)| (centre + rotation.rotate(p - centre), sigma, amplitude))
        .collect();
    render_blobs(width, height, &blobs)
}

/// Image whose channels all carry the same texture.
pub fn textured_image(
    width: usize,
    height: usize,
    channel_count: usize,
    sample_type: SampleType,
    seed: u64,
) -> Image {
    let values = textured_values(width, height, seed);
    let channels = vec![values; channel_count];
    Image::from_f64_channels(width, height, sample_type, &channels).unwrap()
}

/// Image with an independent texture per channel.
pub fn multi_texture_image(
    width: usize,
    height: usize,
    channel_count: usize,
    sample_type: SampleType,
    seed: u64,
) -> Image {
    let channels: Vec<Vec<f64>> = (0..channel_count)
        .map(|c| textured_values(width, height, seed + c as u64))
        .collect();
    Image::from_f64_channels(width, height, sample_type, &channels).unwrap()
}

/// Moves the content by `(dx, dy)` with wrap-around.
pub fn circular_shift(values: &[f64], width: usize, height: usize, dx: isize, dy: isize) -> Vec<f64> {
    let mut result = vec![0.0; values.len()];
    for y in 0..height {
        for x in 0..width {
            let sx = (x as isize - dx).rem_euclid(width as isize) as usize;
            let sy = (y as isize - dy).rem_euclid(height as isize) as usize;
            result[y * width + x] = values[sy * width + sx];
        }
    }
    result
}

/// Moves the content by a fractional `(dx, dy)` with wrap-around, using
/// bilinear interpolation.
pub fn circular_bilinear_shift(
    values: &[f64],
    width: usize,
    height: usize,
    dx: f64,
    dy: f64,
) -> Vec<f64> {
    let plane = Plane::new(width, height, values.to_vec());
    let mut result = vec![0.0; values.len()];
    for y in 0..height {
        for x in 0..width {
            let sx = (x as f64 - dx).rem_euclid(width as f64);
            let sy = (y as f64 - dy).rem_euclid(height as f64);
            let x0 = sx.floor() as usize % width;
            let y0 = sy.floor() as usize % height;
            let x1 = (x0 + 1) % width;
            let y1 = (y0 + 1) % height;
            let fx = sx - sx.floor();
            let fy = sy - sy.floor();
            let top = plane[(x0, y0)] + fx * (plane[(x1, y0)] - plane[(x0, y0)]);
            let bottom = plane[(x0, y1)] + fx * (plane[(x1, y1)] - plane[(x0, y1)]);
            result[y * width + x] = top + fy * (bottom - top);
        }
    }
    result
}

/// Single-channel f64 image from raw values.
pub fn gray(width: usize, height: usize, values: Vec<f64>) -> Image {
    Image::from_f64_channels(width, height, SampleType::F64, &[values]).unwrap()
}

/// Largest absolute difference between two equally sized value slices.
pub fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}
