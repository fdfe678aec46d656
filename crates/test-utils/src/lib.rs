//! Shared test utilities for the argo-fetch workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic multi-profile datasets shaped like GDAC `_prof.nc` files
//! - Temporary GDAC directory trees
//! - An in-memory [`argo_common::ArrayFileReader`] that counts opens
//! - Argovis-shaped JSON profiles
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{GdacTree, MemoryReader, ProfFixture};
//! ```

pub mod fixtures;
pub mod gdac;
pub mod generators;
pub mod paths;
pub mod reader;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use gdac::GdacTree;
pub use generators::*;
pub use paths::*;
pub use reader::MemoryReader;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Macro asserting that a point collection has a dense `0..n` index.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_dense_index;
///
/// assert_dense_index!(merged);
/// ```
#[macro_export]
macro_rules! assert_dense_index {
    ($ds:expr) => {{
        let ds = &$ds;
        let n = ds.point_count();
        let expected = argo_common::Values::Int((0..n as i64).map(Some).collect());
        match ds.coords.get(argo_common::dataset::POINT_DIM) {
            Some(index) => assert_eq!(index.values, expected, "point index is not 0..{}", n),
            None => panic!("dataset has no point index"),
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(0.0, 0.0, 0.0001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    fn test_assert_dense_index_on_flattened_fixture() {
        let points = ProfFixture::new(3900737)
            .cycles(&[1, 2])
            .levels(3)
            .build()
            .profile_to_point("N_PROF", "N_LEVELS")
            .unwrap();
        assert_dense_index!(points);
    }
}
