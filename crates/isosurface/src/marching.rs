//! Marching tetrahedra over a [`ScalarGrid`].
//!
//! Every cubic cell is split into six tetrahedra around its main diagonal
//! (corner 0 to corner 7). Neighbouring cells split shared faces the same
//! way, so the surface has no cracks and needs no case table.

use rayon::prelude::*;

use crate::grid::ScalarGrid;
use crate::{Triangle, Vec3};

/// Corner `i` of a cell sits at offset `(i & 1, (i >> 1) & 1, (i >> 2) & 1)`.
const TETRAHEDRA: [[usize; 4]; 6] = [
    [0, 1, 3, 7],
    [0, 2, 3, 7],
    [0, 2, 6, 7],
    [0, 4, 6, 7],
    [0, 4, 5, 7],
    [0, 1, 5, 7],
];

/// Triangulate the `threshold` surface. Vertices are fractional grid
/// coordinates `(gate, row, elevation)`.
///
/// A corner is inside when its value is at least `threshold`. Triangles face
/// away from the inside.
pub fn march(grid: &ScalarGrid, threshold: f32) -> Vec<Triangle> {
    if grid.width < 2 || grid.height < 2 || grid.depth < 2 {
        return Vec::new();
    }

    (0..grid.depth - 1)
        .into_par_iter()
        .flat_map_iter(|z| {
            let mut out = Vec::new();
            for y in 0..grid.height - 1 {
                for x in 0..grid.width - 1 {
                    march_cell(grid, x, y, z, threshold, &mut out);
                }
            }
            out
        })
        .collect()
}

fn march_cell(grid: &ScalarGrid, x: usize, y: usize, z: usize, threshold: f32, out: &mut Vec<Triangle>) {
    let mut points = [Vec3::default(); 8];
    let mut values = [0f32; 8];
    for i in 0..8 {
        let (dx, dy, dz) = (i & 1, (i >> 1) & 1, (i >> 2) & 1);
        points[i] = Vec3::new((x + dx) as f64, (y + dy) as f64, (z + dz) as f64);
        values[i] = grid.get(x + dx, y + dy, z + dz);
    }

    let inside = values.map(|v| v >= threshold);
    if inside.iter().all(|&b| b) || inside.iter().all(|&b| !b) {
        return;
    }

    for tet in &TETRAHEDRA {
        march_tetrahedron(tet, &points, &values, &inside, threshold, out);
    }
}

fn march_tetrahedron(
    tet: &[usize; 4],
    points: &[Vec3; 8],
    values: &[f32; 8],
    inside: &[bool; 8],
    threshold: f32,
    out: &mut Vec<Triangle>,
) {
    let (ins, outs): (Vec<usize>, Vec<usize>) = tet.iter().partition(|&&c| inside[c]);
    let edge = |a: usize, b: usize| interpolate_edge(points[a], points[b], values[a], values[b], threshold);

    let candidates: Vec<[Vec3; 3]> = match (ins.as_slice(), outs.as_slice()) {
        ([a], [b, c, d]) | ([b, c, d], [a]) => vec![[edge(*a, *b), edge(*a, *c), edge(*a, *d)]],
        ([a, b], [c, d]) => {
            let (ac, ad, bc, bd) = (edge(*a, *c), edge(*a, *d), edge(*b, *c), edge(*b, *d));
            vec![[ac, ad, bd], [ac, bd, bc]]
        }
        _ => return,
    };

    let centroid = |corners: &[usize]| {
        let sum = corners
            .iter()
            .fold(Vec3::default(), |acc, &c| acc.add(points[c]));
        sum.scale(1.0 / corners.len() as f64)
    };
    let outward = centroid(&outs).sub(centroid(&ins));

    for [p1, p2, p3] in candidates {
        let normal = p2.sub(p1).cross(p3.sub(p1));
        let triangle = if normal.dot(outward) < 0.0 {
            Triangle::new(p1, p3, p2)
        } else {
            Triangle::new(p1, p2, p3)
        };
        out.push(triangle);
    }
}

/// Point on the segment `p1..p2` where the linear interpolant crosses `level`.
fn interpolate_edge(p1: Vec3, p2: Vec3, val1: f32, val2: f32, level: f32) -> Vec3 {
    if (val2 - val1).abs() < 1e-6 {
        return p1.add(p2).scale(0.5);
    }

    let t = ((level - val1) / (val2 - val1)).clamp(0.0, 1.0) as f64;
    p1.add(p2.sub(p1).scale(t))
}
