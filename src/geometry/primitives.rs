// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Prism and cuboid boundary meshes

use super::exact::Scalar;
use super::mesh::{BoundaryMesh, Face};
use super::plane::{newell_normal, Plane};
use super::point::{Point3, Vector3};
use crate::error::{Error, Result};
use num_traits::{Signed, Zero};
use tracing::warn;

/// Boundary of the prism swept by `profile` along `direction`.
///
/// The profile may wind either way; it is reoriented so every face points
/// outward. A direction parallel to the profile plane sweeps no volume and
/// yields an empty mesh.
pub fn prism_mesh(profile: &[Point3], direction: &Vector3) -> Result<BoundaryMesh> {
    let mut points: Vec<Point3> = profile.to_vec();
    points.dedup();
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    if points.len() < 3 {
        return Err(Error::InvalidBoundary(format!(
            "extrusion profile needs at least three distinct points, got {}",
            points.len()
        )));
    }

    let normal = newell_normal(&points);
    let plane = Plane::from_point_normal(&points[0], normal.clone())
        .ok_or_else(|| Error::InvalidBoundary("extrusion profile has zero area".to_string()))?;
    if let Some(off) = points.iter().find(|p| !plane.contains(p)) {
        return Err(Error::InvalidBoundary(format!(
            "extrusion profile is not planar: {off} lies off its plane"
        )));
    }

    let sweep: Scalar = normal.dot(direction);
    if sweep.is_zero() {
        warn!(%direction, "extrusion direction is parallel to the profile; prism is empty");
        return Ok(BoundaryMesh::new());
    }
    if sweep.is_negative() {
        points.reverse();
    }

    let n = points.len();
    let mut mesh = BoundaryMesh::with_capacity(2 * n, n + 2);
    for point in &points {
        mesh.add_vertex(point.clone());
    }
    for point in &points {
        mesh.add_vertex(point.translate(direction));
    }

    mesh.add_face(Face::new((0..n).rev().collect()));
    mesh.add_face(Face::new((n..2 * n).collect()));
    for i in 0..n {
        let j = (i + 1) % n;
        mesh.add_face(Face::new(vec![i, j, n + j, n + i]));
    }
    Ok(mesh)
}

/// Boundary of the box spanned by two opposite corners.
pub fn cuboid_mesh(min: &Point3, max: &Point3) -> Result<BoundaryMesh> {
    let profile = vec![
        Point3::new(min.x.clone(), min.y.clone(), min.z.clone()),
        Point3::new(max.x.clone(), min.y.clone(), min.z.clone()),
        Point3::new(max.x.clone(), max.y.clone(), min.z.clone()),
        Point3::new(min.x.clone(), max.y.clone(), min.z.clone()),
    ];
    let height = Vector3::new(Scalar::zero(), Scalar::zero(), &max.z - &min.z);
    prism_mesh(&profile, &height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::exact::{ratio, scalar};

    fn unit_square() -> Vec<Point3> {
        vec![
            Point3::from_ints(0, 0, 0),
            Point3::from_ints(1, 0, 0),
            Point3::from_ints(1, 1, 0),
            Point3::from_ints(0, 1, 0),
        ]
    }

    #[test]
    fn test_prism_is_closed_and_outward() {
        let mesh = prism_mesh(&unit_square(), &Vector3::from_ints(0, 0, 1)).unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 6);
        mesh.check_closed_manifold().unwrap();
        assert_eq!(mesh.signed_volume6(), scalar(6));
    }

    #[test]
    fn test_reversed_profile_is_reoriented() {
        let mut profile = unit_square();
        profile.reverse();
        let mesh = prism_mesh(&profile, &Vector3::from_ints(0, 0, 2)).unwrap();
        assert_eq!(mesh.signed_volume6(), scalar(12));

        let down = prism_mesh(&unit_square(), &Vector3::from_ints(0, 0, -1)).unwrap();
        assert_eq!(down.signed_volume6(), scalar(6));
    }

    #[test]
    fn test_oblique_prism_volume() {
        let direction = Vector3::new(scalar(3), ratio(1, 2), scalar(2));
        let mesh = prism_mesh(&unit_square(), &direction).unwrap();
        mesh.check_closed_manifold().unwrap();
        assert_eq!(mesh.signed_volume6(), scalar(12));
    }

    #[test]
    fn test_parallel_direction_gives_empty_mesh() {
        let mesh = prism_mesh(&unit_square(), &Vector3::from_ints(1, 1, 0)).unwrap();
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_degenerate_profiles_are_rejected() {
        let collinear = vec![
            Point3::from_ints(0, 0, 0),
            Point3::from_ints(1, 0, 0),
            Point3::from_ints(2, 0, 0),
        ];
        assert!(matches!(
            prism_mesh(&collinear, &Vector3::from_ints(0, 0, 1)),
            Err(Error::InvalidBoundary(_))
        ));

        let mut warped = unit_square();
        warped[2] = Point3::from_ints(1, 1, 1);
        assert!(matches!(
            prism_mesh(&warped, &Vector3::from_ints(0, 0, 1)),
            Err(Error::InvalidBoundary(_))
        ));

        let repeated = vec![Point3::from_ints(0, 0, 0); 4];
        assert!(prism_mesh(&repeated, &Vector3::from_ints(0, 0, 1)).is_err());
    }

    #[test]
    fn test_cuboid() {
        let mesh = cuboid_mesh(&Point3::from_ints(-1, -1, -1), &Point3::from_ints(1, 2, 3)).unwrap();
        assert_eq!(mesh.signed_volume6(), scalar(6 * 24));
    }
}
