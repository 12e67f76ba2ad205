//! Headbox sample generation.
//!
//! Sample positions come from a Hammersley point set so that a capture is
//! reproducible: the same headbox, count and reference pose always yield the
//! same positions in the same order.

use log::debug;
use nalgebra::{Matrix4, Point3, Vector3};

/// Computes the radical inverse of `a` in the given digit base.
///
/// The base-`base` digits of `a` are mirrored around the radix point, so
/// `radical_inverse(6, 2)` (binary `110`) is binary `0.011` = 0.375. The
/// reversed digits are accumulated in integer arithmetic and divided by
/// `base^n` only once at the end. The result lies in `[0, 1)`, clamped to at
/// most 1.0 against rounding. Bases below 2 have no digits and yield 0.0.
pub fn radical_inverse(a: u64, base: u64) -> f64 {
    if base < 2 {
        return 0.0;
    }
    let inv_base = 1.0 / base as f64;
    let base_wide = base as u128;
    let mut remaining = a as u128;
    let mut reversed_digits: u128 = 0;
    let mut inv_base_n = 1.0;
    while remaining != 0 {
        let next = remaining / base_wide;
        let digit = remaining - next * base_wide;
        reversed_digits = reversed_digits * base_wide + digit;
        inv_base_n *= inv_base;
        remaining = next;
    }
    f64::min(reversed_digits as f64 * inv_base_n, 1.0)
}

/// Generates `count` sample positions inside a box, in world space.
///
/// Sample `i` has box-local coordinates `(i / (count - 1), Φ2(i), Φ3(i))`
/// scaled by `box_size` and recentered on the box origin, then mapped through
/// `box_to_world`. The samples are sorted by distance from `reference` and the
/// nearest one is replaced by `reference` itself, so index 0 is always the
/// exact reference position.
///
/// # Arguments
///
/// * `box_size` - Extent of the box along each local axis
/// * `count` - Number of samples; zero yields an empty set
/// * `reference` - World-space position that must appear first
/// * `box_to_world` - Transform from box-local to world coordinates
pub fn generate_headbox_samples(
    box_size: &Vector3<f64>,
    count: usize,
    reference: &Point3<f64>,
    box_to_world: &Matrix4<f64>,
) -> Vec<Point3<f64>> {
    let half_size = box_size * 0.5;
    let mut samples: Vec<Point3<f64>> = (0..count)
        .map(|i| {
            let first = if count > 1 {
                i as f64 / (count - 1) as f64
            } else {
                0.0
            };
            let unit = Vector3::new(
                first,
                radical_inverse(i as u64, 2),
                radical_inverse(i as u64, 3),
            );
            let local = Point3::from(unit.component_mul(box_size) - half_size);
            box_to_world.transform_point(&local)
        })
        .collect();

    // Stable sort keeps construction order among equidistant samples.
    samples.sort_by(|a, b| {
        let da = (a - reference).norm();
        let db = (b - reference).norm();
        da.total_cmp(&db)
    });

    if let Some(nearest) = samples.first_mut() {
        *nearest = *reference;
    }

    debug!("Generated {} headbox samples around {reference:?}", samples.len());
    samples
}
