//! Wavefront OBJ export.

use std::io::{self, Write};

use crate::Triangle;

/// Write triangles as OBJ text.
///
/// Each triangle emits its three vertices followed by a face referencing
/// them. Vertices are not shared between faces.
pub fn write_obj<W: Write>(triangles: &[Triangle], mut w: W) -> io::Result<()> {
    for (i, tri) in triangles.iter().enumerate() {
        for v in [tri.v1, tri.v2, tri.v3] {
            writeln!(w, "v {} {} {}", v.x, v.y, v.z)?;
        }
        writeln!(w, "f {} {} {}", i * 3 + 1, i * 3 + 2, i * 3 + 3)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vec3;

    #[test]
    fn test_single_triangle() {
        let tri = Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.5, 0.0, 0.0),
            Vec3::new(0.0, -2.0, 3.0),
        );
        let mut out = Vec::new();
        write_obj(&[tri], &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "v 0 0 0\nv 1.5 0 0\nv 0 -2 3\nf 1 2 3\n"
        );
    }

    #[test]
    fn test_empty() {
        let mut out = Vec::new();
        write_obj(&[], &mut out).unwrap();
        assert!(out.is_empty());
    }
}
