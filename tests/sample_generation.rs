//! Properties of headbox sample generation through the public API

use approx::assert_relative_eq;
use nalgebra::{Matrix4, Point3, Vector3};
use seurat_capture::camera::{Pose, Rotator};
use seurat_capture::util::{generate_headbox_samples, radical_inverse};

fn inside_box(local: &Point3<f64>, size: &Vector3<f64>) -> bool {
    (0..3).all(|axis| local[axis].abs() <= size[axis] * 0.5 + 1e-9)
}

#[test]
fn test_radical_inverse_base_two_sequence() {
    let expected = [0.0, 0.5, 0.25, 0.75, 0.125, 0.625, 0.375, 0.875];
    for (i, value) in expected.iter().enumerate() {
        assert_relative_eq!(radical_inverse(i as u64, 2), *value);
    }
}

#[test]
fn test_radical_inverse_base_three_sequence() {
    let expected = [0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0 / 9.0, 4.0 / 9.0, 7.0 / 9.0];
    for (i, value) in expected.iter().enumerate() {
        assert_relative_eq!(radical_inverse(i as u64, 3), *value, epsilon = 1e-15);
    }
}

#[test]
fn test_samples_stay_inside_rotated_box() {
    let size = Vector3::new(80.0, 30.0, 50.0);
    let pose = Pose::new(Point3::new(-40.0, 12.0, 300.0), Rotator::new(15.0, 120.0, 0.0));
    let box_to_world = pose.to_matrix();
    let world_to_box = box_to_world.try_inverse().unwrap();

    let samples = generate_headbox_samples(&size, 64, &pose.location, &box_to_world);
    assert_eq!(samples.len(), 64);
    assert_eq!(samples[0], pose.location);

    for sample in &samples {
        let local = world_to_box.transform_point(sample);
        assert!(inside_box(&local, &size), "{sample:?} outside headbox");
    }
}

#[test]
fn test_samples_sorted_by_distance_after_first() {
    let size = Vector3::new(100.0, 100.0, 100.0);
    // An off-center reference makes the ordering non-trivial.
    let reference = Point3::new(30.0, -20.0, 10.0);
    let samples = generate_headbox_samples(&size, 32, &reference, &Matrix4::identity());

    let distances: Vec<f64> = samples.iter().map(|s| (s - reference).norm()).collect();
    assert_eq!(distances[0], 0.0);
    for pair in distances[1..].windows(2) {
        assert!(pair[0] <= pair[1]);
    }
}

#[test]
fn test_generation_is_deterministic() {
    let size = Vector3::new(20.0, 40.0, 60.0);
    let reference = Point3::new(1.0, 2.0, 3.0);
    let transform = Matrix4::new_translation(&Vector3::new(1.0, 2.0, 3.0));

    let first = generate_headbox_samples(&size, 16, &reference, &transform);
    let second = generate_headbox_samples(&size, 16, &reference, &transform);
    assert_eq!(first, second);
}

#[test]
fn test_flat_box_keeps_samples_on_plane() {
    let size = Vector3::new(50.0, 50.0, 0.0);
    let samples = generate_headbox_samples(&size, 8, &Point3::origin(), &Matrix4::identity());
    for sample in &samples {
        assert_eq!(sample.z, 0.0);
    }
}

#[test]
fn test_empty_and_single_counts() {
    let size = Vector3::new(10.0, 10.0, 10.0);
    let reference = Point3::new(5.0, 5.0, 5.0);
    assert!(generate_headbox_samples(&size, 0, &reference, &Matrix4::identity()).is_empty());

    let single = generate_headbox_samples(&size, 1, &reference, &Matrix4::identity());
    assert_eq!(single, vec![reference]);
}
