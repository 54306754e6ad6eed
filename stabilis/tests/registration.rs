//! End-to-end registration through the public API.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stabilis::{
    Channels, Config, Error, INTEGER_SHIFT_TOLERANCE, Image, MemoryArchive, RegistrationMode,
    SampleType, Translation, apply_rotation_2d, apply_translation_2d, correct_translation_2d, find_rotation_2d,
    find_translation_2d, register_sequence,
};

const SIZE: usize = 96;

/// Plate-like frame: scattered soft spots on a dark background.
fn plate(seed: u64, channel_count: usize) -> Image {
    let values = plate_values(seed);
    Image::from_f64_channels(SIZE, SIZE, SampleType::U16, &vec![values; channel_count]).unwrap()
}

fn plate_values(seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let spots: Vec<(f64, f64, f64, f64)> = (0..150)
        .map(|_| {
            (
                rng.random_range(0.0..SIZE as f64),
                rng.random_range(0.0..SIZE as f64),
                rng.random_range(1.5..3.5),
                rng.random_range(40.0..200.0),
            )
        })
        .collect();

    let mut values = vec![0.0; SIZE * SIZE];
    for (i, v) in values.iter_mut().enumerate() {
        let x = (i % SIZE) as f64 + 0.5;
        let y = (i / SIZE) as f64 + 0.5;
        for &(cx, cy, sigma, amplitude) in &spots {
            let r2 = (x - cx).powi(2) + (y - cy).powi(2);
            *v += amplitude * (-r2 / (2.0 * sigma * sigma)).exp();
        }
    }
    values
}

/// Moves content by `(dx, dy)`, wrapping around the edges.
fn wrapped(values: &[f64], dx: isize, dy: isize) -> Vec<f64> {
    let n = SIZE as isize;
    let mut out = vec![0.0; values.len()];
    for y in 0..n {
        for x in 0..n {
            let sx = (x - dx).rem_euclid(n);
            let sy = (y - dy).rem_euclid(n);
            out[(y * n + x) as usize] = values[(sy * n + sx) as usize];
        }
    }
    out
}

#[test]
fn translation_drift_is_estimated_and_undone() {
    let values = plate_values(1);
    let reference =
        Image::from_f64_channels(SIZE, SIZE, SampleType::U16, &[values.clone(), values.clone()])
            .unwrap();
    // The frame drifted by (4, -7). A zero-filled border would bias the peak.
    let drifted = wrapped(&values, 4, -7);
    let frame =
        Image::from_f64_channels(SIZE, SIZE, SampleType::U16, &[drifted.clone(), drifted]).unwrap();

    let estimate = find_translation_2d(&frame, &reference, Channels::Single(1)).unwrap();
    assert!((estimate.dx + 4.0).abs() < 0.1, "{}", estimate);
    assert!((estimate.dy - 7.0).abs() < 0.1, "{}", estimate);
    assert!(estimate.is_integral(INTEGER_SHIFT_TOLERANCE), "{}", estimate);

    let (aligned, applied) = correct_translation_2d(&frame, &reference, Channels::All, true).unwrap();
    assert_eq!(applied, estimate);

    // Region that did not wrap: whole-pixel correction restores it exactly.
    let before = mean_abs_diff(&frame, &reference, 7..SIZE, 0..SIZE - 4);
    let after = mean_abs_diff(&aligned, &reference, 7..SIZE, 0..SIZE - 4);
    assert!(before > 1.0, "before {}", before);
    assert_eq!(after, 0.0, "before {}, after {}", before, after);
}

fn mean_abs_diff(
    a: &Image,
    b: &Image,
    rows: std::ops::Range<usize>,
    columns: std::ops::Range<usize>,
) -> f64 {
    let mut sum = 0.0;
    let mut count = 0;
    for y in rows {
        for x in columns.clone() {
            sum += (a.sample_f64(0, x, y) - b.sample_f64(0, x, y)).abs();
            count += 1;
        }
    }
    sum / count as f64
}

#[test]
fn rotation_drift_is_estimated() {
    let reference = plate(2, 1);
    let truth = 6f64.to_radians();
    let frame = apply_rotation_2d(&reference, Channels::All, truth, true)
        .unwrap()
        .into_owned();

    let angle = find_rotation_2d(&frame, &reference, Channels::All, None).unwrap();
    assert!(
        (angle + truth).abs() < 0.015,
        "expected {:.4}, got {:.4}",
        -truth,
        angle
    );
}

#[test]
fn sequence_registration_restores_from_archive() {
    let reference = plate(3, 1);
    let mut frames: Vec<Image> = [(0.0, 0.0), (2.0, 3.0), (-5.0, 1.0)]
        .iter()
        .map(|&(dx, dy)| {
            apply_translation_2d(&reference, Channels::All, Translation::new(dx, dy), true)
                .unwrap()
                .into_owned()
        })
        .collect();
    let originals = frames.clone();

    let config = Config {
        mode: RegistrationMode::Translation,
        ..Default::default()
    };
    let mut archive = MemoryArchive::new();
    let corrections =
        register_sequence(&mut frames, &reference, 0..=2, &config, Some(&mut archive)).unwrap();

    assert_eq!(
        corrections.iter().map(|c| c.modified).collect::<Vec<_>>(),
        vec![false, true, true]
    );
    assert_eq!(archive.len(), 2);

    archive.restore(&mut frames);
    assert_eq!(frames, originals);
}

#[test]
fn mismatched_bounds_are_rejected() {
    let reference = plate(4, 1);
    let frame = reference.crop(0, 0, SIZE - 8, SIZE).unwrap();

    let err = find_translation_2d(&frame, &reference, Channels::All).unwrap_err();
    assert!(matches!(err, Error::UnsupportedOperation(_)));

    let err = find_rotation_2d(&frame, &reference, Channels::All, None).unwrap_err();
    assert!(matches!(err, Error::UnsupportedOperation(_)));
}
