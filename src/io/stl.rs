// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL import and export through stl_io
//!
//! STL stores `f32` triangles, so reading yields the exact binary values of
//! those floats and writing rounds every coordinate.

use super::output_polygons;
use crate::error::{Error, Result};
use crate::geometry::exact::to_f64;
use crate::geometry::{BoundaryMesh, Face, Point3};
use std::io::Cursor;
use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};
use tracing::warn;

const FORMAT: &str = "STL";

pub(super) fn parse(bytes: &[u8]) -> Result<BoundaryMesh> {
    let mut cursor = Cursor::new(bytes);
    let stl = stl_io::read_stl(&mut cursor).map_err(|e| Error::parse(FORMAT, None, e.to_string()))?;

    let mut mesh = BoundaryMesh::with_capacity(stl.vertices.len(), stl.faces.len());
    for (i, v) in stl.vertices.iter().enumerate() {
        let point = Point3::try_from_f64(f64::from(v[0]), f64::from(v[1]), f64::from(v[2]))
            .ok_or_else(|| Error::parse(FORMAT, None, format!("vertex {i} has a non-finite coordinate")))?;
        mesh.add_vertex(point);
    }
    for face in &stl.faces {
        mesh.add_face(Face::new(face.vertices.to_vec()));
    }
    Ok(mesh)
}

pub(super) fn write(mesh: &BoundaryMesh) -> Result<Vec<u8>> {
    let mut triangles = Vec::new();
    let mut rounded = 0usize;
    for face in &mesh.faces {
        let normal = mesh.face_plane(face)?.normal().to_f64().normalize();
        for t in output_polygons(mesh, face, true)? {
            triangles.push(StlTriangle {
                normal: Normal::new([normal.x as f32, normal.y as f32, normal.z as f32]),
                vertices: [
                    stl_vertex(&mesh.vertices[t[0]], &mut rounded),
                    stl_vertex(&mesh.vertices[t[1]], &mut rounded),
                    stl_vertex(&mesh.vertices[t[2]], &mut rounded),
                ],
            });
        }
    }
    if rounded > 0 {
        warn!(count = rounded, "vertex coordinates rounded to f32 for STL output");
    }

    let mut cursor = Cursor::new(Vec::new());
    stl_io::write_stl(&mut cursor, triangles.iter()).map_err(|e| Error::io("<stl buffer>", e))?;
    Ok(cursor.into_inner())
}

/// Nearest `f32` vertex, counting coordinates that do not survive the
/// rounding.
fn stl_vertex(p: &Point3, rounded: &mut usize) -> StlVertex {
    let xyz = [to_f64(&p.x) as f32, to_f64(&p.y) as f32, to_f64(&p.z) as f32];
    if Point3::try_from_f64(f64::from(xyz[0]), f64::from(xyz[1]), f64::from(xyz[2])).as_ref() != Some(p) {
        *rounded += 1;
    }
    StlVertex::new(xyz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::cuboid_mesh;
    use crate::geometry::exact::ratio;
    use approx::assert_relative_eq;

    #[test]
    fn test_binary_round_trip_of_cube() {
        let cube = cuboid_mesh(&Point3::from_ints(0, 0, 0), &Point3::from_ints(2, 1, 1)).unwrap();
        let bytes = write(&cube).unwrap();
        // 80-byte header, count, 50 bytes per triangle.
        assert_eq!(bytes.len(), 84 + 12 * 50);

        let back = parse(&bytes).unwrap();
        assert_eq!(back.vertex_count(), 8);
        assert_eq!(back.face_count(), 12);
        back.check_closed_manifold().unwrap();
        assert_eq!(back.signed_volume6(), cube.signed_volume6());
    }

    #[test]
    fn test_ascii_input() {
        let ascii = "solid t
facet normal 0 0 1
outer loop
vertex 0 0 0
vertex 0.5 0 0
vertex 0 0.5 0
endloop
endfacet
endsolid t
";
        let mesh = parse(ascii.as_bytes()).unwrap();
        assert_eq!(mesh.face_count(), 1);
        assert!(mesh.vertices.contains(&Point3::new(ratio(1, 2), ratio(0, 1), ratio(0, 1))));
    }

    #[test]
    fn test_inexact_coordinates_are_rounded() {
        let mut cube = cuboid_mesh(&Point3::from_ints(0, 0, 0), &Point3::from_ints(1, 1, 1)).unwrap();
        for v in &mut cube.vertices {
            v.x *= ratio(1, 3);
        }
        let back = parse(&write(&cube).unwrap()).unwrap();
        let widest = back.vertices.iter().map(|v| to_f64(&v.x)).fold(0.0, f64::max);
        assert_relative_eq!(widest, 1.0 / 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        assert!(matches!(parse(b"not an stl"), Err(Error::Parse { .. })));
    }
}
