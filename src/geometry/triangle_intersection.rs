// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Exact triangle contact tests for boundary validation
//!
//! Faces are triangulated and every pair of triangles from different faces
//! with touching bounding boxes is clipped edge by edge against the other.
//! Each clipped piece must lie on a vertex or an edge the two faces share.

use super::bbox::BoundingBox;
use super::exact::Scalar;
use super::mesh::BoundaryMesh;
use super::plane::{Plane, Side};
use super::point::Point3;
use super::predicates::{collinear, cross2, strictly_between, Projection};
use super::triangulate::triangulate_face;
use crate::error::{Error, Result};
use ahash::AHashSet;
use num_traits::{One, Signed, Zero};
use tracing::debug;

struct Triangle {
    face: usize,
    corners: [Point3; 3],
    plane: Plane,
    bounds: BoundingBox,
}

/// Vertices and undirected edges of every face, by vertex index.
struct FaceFeatures {
    vertices: Vec<AHashSet<usize>>,
    edges: Vec<AHashSet<(usize, usize)>>,
}

impl FaceFeatures {
    fn new(mesh: &BoundaryMesh) -> Self {
        let vertices = mesh
            .faces
            .iter()
            .map(|face| face.loops.iter().flatten().copied().collect())
            .collect();
        let edges = mesh
            .faces
            .iter()
            .map(|face| face.edges().map(|(a, b)| (a.min(b), a.max(b))).collect())
            .collect();
        Self { vertices, edges }
    }

    /// `p`-`q` lies on a vertex (when `p == q`) or an edge of both faces.
    fn shared_contact(&self, mesh: &BoundaryMesh, first: usize, second: usize, p: &Point3, q: &Point3) -> bool {
        let on_shared_edge = self.edges[first]
            .intersection(&self.edges[second])
            .any(|&(s, t)| {
                let (s, t) = (&mesh.vertices[s], &mesh.vertices[t]);
                on_closed_segment(p, s, t) && on_closed_segment(q, s, t)
            });
        if on_shared_edge {
            return true;
        }
        p == q
            && self.vertices[first]
                .intersection(&self.vertices[second])
                .any(|&v| mesh.vertices[v] == *p)
    }
}

/// Fail if two faces of `mesh` meet anywhere other than along the edges and
/// at the vertices they share.
///
/// `planes[i]` is the supporting plane of face `i`. The mesh must be welded,
/// so equal coordinates share one vertex index.
pub fn check_no_self_intersections(mesh: &BoundaryMesh, planes: &[Plane]) -> Result<()> {
    let mut triangles = Vec::new();
    for (index, (face, plane)) in mesh.faces.iter().zip(planes).enumerate() {
        for [a, b, c] in triangulate_face(&face.loops, &mesh.vertices, plane.normal())? {
            let corners = [mesh.vertices[a].clone(), mesh.vertices[b].clone(), mesh.vertices[c].clone()];
            if collinear(&corners[0], &corners[1], &corners[2]) {
                continue;
            }
            let Some(bounds) = BoundingBox::from_points(&corners) else {
                continue;
            };
            triangles.push(Triangle {
                face: index,
                corners,
                plane: plane.clone(),
                bounds,
            });
        }
    }

    let features = FaceFeatures::new(mesh);
    triangles.sort_by(|a, b| a.bounds.min.x.cmp(&b.bounds.min.x));
    for (i, first) in triangles.iter().enumerate() {
        for second in &triangles[i + 1..] {
            if second.bounds.min.x > first.bounds.max.x {
                break;
            }
            if first.face == second.face || !first.bounds.intersects(&second.bounds) {
                continue;
            }
            if let Some(point) = improper_contact(mesh, &features, first, second) {
                return Err(Error::InvalidBoundary(format!(
                    "faces {} and {} intersect at {point}",
                    first.face.min(second.face),
                    first.face.max(second.face)
                )));
            }
        }
    }
    debug!(triangles = triangles.len(), "boundary is free of self-intersections");
    Ok(())
}

fn improper_contact(mesh: &BoundaryMesh, features: &FaceFeatures, first: &Triangle, second: &Triangle) -> Option<Point3> {
    for (edges_of, other) in [(first, second), (second, first)] {
        for i in 0..3 {
            let (a, b) = (&edges_of.corners[i], &edges_of.corners[(i + 1) % 3]);
            let Some((p, q)) = clip_segment(a, b, other) else {
                continue;
            };
            if !features.shared_contact(mesh, first.face, second.face, &p, &q) {
                return Some(if features.shared_contact(mesh, first.face, second.face, &p, &p) { q } else { p });
            }
        }
    }
    None
}

/// Part of the closed segment `a`-`b` inside the closed triangle, as its
/// two endpoints (equal when the part is a single point).
fn clip_segment(a: &Point3, b: &Point3, triangle: &Triangle) -> Option<(Point3, Point3)> {
    let plane = &triangle.plane;
    let (start, end) = match (plane.side(a), plane.side(b)) {
        (Side::On, Side::On) => (a.clone(), b.clone()),
        (Side::On, _) => (a.clone(), a.clone()),
        (_, Side::On) => (b.clone(), b.clone()),
        (sa, sb) if sa != sb => {
            let crossing = plane.intersect_segment(a, b);
            (crossing.clone(), crossing)
        }
        _ => return None,
    };

    let projection = Projection::along(plane.normal());
    let [u, v, w] = &triangle.corners;
    let corners = [projection.apply(u), projection.apply(v), projection.apply(w)];
    let winding = cross2(&corners[0], &corners[1], &corners[2]).signum();
    let (p, q) = (projection.apply(&start), projection.apply(&end));

    // Inside edge (s, t) when winding * cross2(s, t, x) >= 0, linear along
    // start + t * (end - start).
    let mut low = Scalar::zero();
    let mut high = Scalar::one();
    for i in 0..3 {
        let (s, t) = (&corners[i], &corners[(i + 1) % 3]);
        let f0 = cross2(s, t, &p) * &winding;
        let f1 = cross2(s, t, &q) * &winding;
        match (f0.is_negative(), f1.is_negative()) {
            (true, true) => return None,
            (true, false) => low = low.max(&f0 / (&f0 - &f1)),
            (false, true) => high = high.min(&f0 / (&f0 - &f1)),
            (false, false) => {}
        }
    }
    if low > high {
        return None;
    }
    Some((start.lerp(&end, &low), start.lerp(&end, &high)))
}

fn on_closed_segment(p: &Point3, a: &Point3, b: &Point3) -> bool {
    p == a || p == b || strictly_between(p, a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::primitives::{cuboid_mesh, prism_mesh};
    use crate::geometry::point::Vector3;

    fn check(mesh: &BoundaryMesh) -> Result<()> {
        let mesh = mesh.welded()?;
        let planes = mesh
            .faces
            .iter()
            .map(|face| mesh.face_plane(face))
            .collect::<Result<Vec<_>>>()?;
        check_no_self_intersections(&mesh, &planes)
    }

    fn merged(a: &BoundaryMesh, b: &BoundaryMesh) -> BoundaryMesh {
        let mut mesh = a.clone();
        let offset = mesh.vertex_count();
        mesh.vertices.extend(b.vertices.iter().cloned());
        for face in &b.faces {
            let mut face = face.clone();
            for index in face.loops.iter_mut().flatten() {
                *index += offset;
            }
            mesh.add_face(face);
        }
        mesh
    }

    fn cube(min: i64, max: i64) -> BoundaryMesh {
        cuboid_mesh(&Point3::from_ints(min, min, min), &Point3::from_ints(max, max, max)).unwrap()
    }

    #[test]
    fn test_simple_solids_pass() {
        check(&cube(0, 1)).unwrap();

        let l_shape = [
            Point3::from_ints(0, 0, 0),
            Point3::from_ints(2, 0, 0),
            Point3::from_ints(2, 1, 0),
            Point3::from_ints(1, 1, 0),
            Point3::from_ints(1, 2, 0),
            Point3::from_ints(0, 2, 0),
        ];
        check(&prism_mesh(&l_shape, &Vector3::from_ints(1, 1, 3)).unwrap()).unwrap();
    }

    #[test]
    fn test_disjoint_shells_pass() {
        check(&merged(&cube(0, 1), &cube(2, 3))).unwrap();
    }

    #[test]
    fn test_overlapping_shells_fail() {
        let err = check(&merged(&cube(0, 2), &cube(1, 3))).unwrap_err();
        assert!(matches!(err, Error::InvalidBoundary(_)), "{err}");
    }

    #[test]
    fn test_touching_faces_without_shared_edges_fail() {
        let upper = cuboid_mesh(&Point3::from_ints(1, 1, 2), &Point3::from_ints(3, 3, 4)).unwrap();
        let err = check(&merged(&cube(0, 2), &upper)).unwrap_err();
        assert!(matches!(err, Error::InvalidBoundary(_)), "{err}");
    }

    #[test]
    fn test_collinear_boundary_vertices_pass() {
        // Box with a vertex in the middle of one bottom edge, shared by the
        // split front wall.
        let mut mesh = BoundaryMesh::new();
        for p in [
            (0, 0, 0),
            (2, 0, 0),
            (2, 2, 0),
            (0, 2, 0),
            (0, 0, 1),
            (2, 0, 1),
            (2, 2, 1),
            (0, 2, 1),
            (1, 0, 0),
            (1, 0, 1),
        ] {
            mesh.add_vertex(Point3::from_ints(p.0, p.1, p.2));
        }
        use crate::geometry::mesh::Face;
        for face in [
            vec![0, 3, 2, 1, 8],
            vec![4, 9, 5, 6, 7],
            vec![0, 8, 9, 4],
            vec![8, 1, 5, 9],
            vec![1, 2, 6, 5],
            vec![2, 3, 7, 6],
            vec![3, 0, 4, 7],
        ] {
            mesh.add_face(Face::new(face));
        }
        mesh.check_closed_manifold().unwrap();
        check(&mesh).unwrap();
    }
}
