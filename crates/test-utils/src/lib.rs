//! Synthetic radar data for tests.
//!
//! Nothing here touches the network. Volumes and products are built byte by
//! byte so tests can assert on exact offsets, azimuths and gate values:
//! - [`Archive2Builder`] writes Archive II volumes and real-time chunk runs
//! - [`Level3Builder`] writes Level III radial products, and
//!   [`build_level3_archive`] packs them into a daily `.tar.gz`
//! - [`generators`] builds canonical sweeps directly, skipping the decoders
//! - [`fixtures`] holds object keys shared across crates
//!
//! ```ignore
//! use test_utils::{Archive2Builder, fixtures::keys};
//!
//! let bytes = Archive2Builder::standard("KOKX").build();
//! storage.put(keys::ARCHIVE_V06, bytes.into()).await?;
//! ```

pub mod archive2;
pub mod fixtures;
pub mod generators;
pub mod level3;

pub use archive2::{Archive2Builder, SyntheticMoment, SyntheticRadial};
pub use generators::*;
pub use level3::{build_level3_archive, Level3Builder, SyntheticL3Radial};

/// Asserts two numbers differ by at most `epsilon`, comparing as `f64`.
///
/// Decoded angles and scaled moments go through `f32`, so exact equality
/// is rarely what a test wants.
#[macro_export]
macro_rules! assert_approx_eq {
    ($actual:expr, $expected:expr, $epsilon:expr) => {{
        let (actual, expected, epsilon) = ($actual as f64, $expected as f64, $epsilon as f64);
        if (actual - expected).abs() > epsilon {
            panic!(
                "assertion failed: {} is not within {} of {} (off by {})",
                actual,
                epsilon,
                expected,
                (actual - expected).abs()
            );
        }
    }};
}

/// [`assert_approx_eq!`] over each axis of an `(x, y, z)` position.
#[macro_export]
macro_rules! assert_point_approx_eq {
    (($x1:expr, $y1:expr, $z1:expr), ($x2:expr, $y2:expr, $z2:expr), $epsilon:expr) => {{
        $crate::assert_approx_eq!($x1, $x2, $epsilon);
        $crate::assert_approx_eq!($y1, $y2, $epsilon);
        $crate::assert_approx_eq!($z1, $z2, $epsilon);
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_approx_eq_within_epsilon() {
        assert_approx_eq!(0.5f32, 0.5, 1e-9);
        assert_approx_eq!(2.4f32, 2.4, 1e-6);
        assert_approx_eq!(-32.0, -31.9995, 1e-3);
    }

    #[test]
    #[should_panic(expected = "is not within")]
    fn test_approx_eq_outside_epsilon() {
        assert_approx_eq!(1.5, 1.4, 0.01);
    }

    #[test]
    fn test_point_approx_eq() {
        assert_point_approx_eq!((2125.0, 0.0001, 18.5), (2125.0, 0.0, 18.5), 1e-3);
    }
}
