//! Example: Correct drift in a synthetic time-lapse
//!
//! Builds a plate-like reference frame, derives a short sequence that drifts
//! and turns a little more every frame, then registers the sequence against
//! the reference and logs the recovered corrections.
//!
//! # Usage
//!
//! ```bash
//! cargo run --release --example drift_demo
//! RUST_LOG=stabilis=debug cargo run --release --example drift_demo
//! ```

use std::time::Instant;

use common::log_setup::{LogOptions, setup_logging};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stabilis::{
    Channels, Config, Image, MemoryArchive, RegistrationMode, SampleType, Translation,
    apply_rotation_2d, apply_translation_2d, register_sequence,
};

const SIZE: usize = 256;
const FRAMES: usize = 6;

fn main() {
    setup_logging(&LogOptions::console("info")).expect("Failed to initialize logging");

    let reference = plate(SIZE, 7);
    let mut frames: Vec<Image> = (0..FRAMES)
        .map(|i| {
            let t = i as f64;
            let shift = Translation::new((1.5 * t).round(), -t);
            let angle = 0.5f64.to_radians() * t;
            let shifted = apply_translation_2d(&reference, Channels::All, shift, true)
                .expect("Failed to shift frame");
            let frame = apply_rotation_2d(&shifted, Channels::All, angle, true)
                .expect("Failed to rotate frame")
                .into_owned();
            tracing::info!(frame = i, %shift, degrees = angle.to_degrees(), "simulated drift");
            frame
        })
        .collect();

    let config = Config {
        mode: RegistrationMode::TranslationAndRotation,
        ..Default::default()
    };
    let mut archive = MemoryArchive::new();

    let start = Instant::now();
    let corrections = register_sequence(
        &mut frames,
        &reference,
        0..=FRAMES - 1,
        &config,
        Some(&mut archive),
    )
    .expect("Registration failed");
    let elapsed = start.elapsed();

    for correction in &corrections {
        tracing::info!(
            frame = correction.index,
            translation = %correction.translation,
            degrees = correction.rotation.to_degrees(),
            modified = correction.modified,
            "correction"
        );
    }
    tracing::info!(
        frames = corrections.len(),
        archived = archive.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "sequence registered"
    );
}

/// Dark background with scattered colonies of varying size and brightness.
fn plate(size: usize, seed: u64) -> Image {
    let mut rng = StdRng::seed_from_u64(seed);
    let colonies: Vec<(f64, f64, f64, f64)> = (0..400)
        .map(|_| {
            (
                rng.random_range(0.0..size as f64),
                rng.random_range(0.0..size as f64),
                rng.random_range(1.5..5.0),
                rng.random_range(500.0..4000.0),
            )
        })
        .collect();

    let mut values = vec![0.0; size * size];
    for (i, v) in values.iter_mut().enumerate() {
        let x = (i % size) as f64 + 0.5;
        let y = (i / size) as f64 + 0.5;
        for &(cx, cy, sigma, amplitude) in &colonies {
            let r2 = (x - cx).powi(2) + (y - cy).powi(2);
            if r2 < 25.0 * sigma * sigma {
                *v += amplitude * (-r2 / (2.0 * sigma * sigma)).exp();
            }
        }
    }

    Image::from_f64_channels(size, size, SampleType::U16, &[values]).expect("Invalid plate image")
}
