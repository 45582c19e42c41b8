// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Random convex polygons inside a planar face

use super::exact::{ratio, to_f64, Scalar};
use super::point::{Point3, Vector3};
use super::predicates::{convex_hull, cross2, Projection};
use super::triangulate::triangulate_face;
use crate::error::{Error, Result};
use num_traits::{One, Signed};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Barycentric weights are drawn from `1..=WEIGHT_RESOLUTION`.
const WEIGHT_RESOLUTION: i64 = 1 << 16;

/// Draws before giving up on a non-degenerate hull.
const MAX_ATTEMPTS: usize = 16;

/// How [`random_polygon_in_face`] samples its polygon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolygonSampling {
    /// Random points drawn; the polygon is their convex hull.
    pub points: usize,
    /// Points are drawn from the chosen triangle scaled by this factor about
    /// its centroid, in `(0, 1]`.
    pub shrink: Scalar,
}

impl Default for PolygonSampling {
    fn default() -> Self {
        Self {
            points: 6,
            shrink: ratio(1, 2),
        }
    }
}

impl PolygonSampling {
    fn validate(&self) -> Result<()> {
        if self.points < 3 {
            return Err(Error::Config(format!(
                "polygon sampling needs at least 3 points, got {}",
                self.points
            )));
        }
        if !self.shrink.is_positive() || self.shrink > Scalar::one() {
            return Err(Error::Config(format!(
                "polygon sampling shrink must be in (0, 1], got {}",
                self.shrink
            )));
        }
        Ok(())
    }
}

/// Sample a convex polygon strictly inside a face.
///
/// A triangle of the face's triangulation is picked with probability
/// proportional to its area. The polygon is the convex hull of random points
/// drawn inside that triangle, shrunk towards its centroid, and winds
/// counter-clockwise around `normal`.
pub fn random_polygon_in_face<R: Rng + ?Sized>(
    loops: &[Vec<usize>],
    positions: &[Point3],
    normal: &Vector3,
    sampling: &PolygonSampling,
    rng: &mut R,
) -> Result<Vec<Point3>> {
    sampling.validate()?;
    let projection = Projection::along(normal);
    let triangles = triangulate_face(loops, positions, normal)?;
    let areas: Vec<f64> = triangles
        .iter()
        .map(|t| {
            let [a, b, c] = t.map(|i| projection.apply(&positions[i]));
            to_f64(&cross2(&a, &b, &c))
        })
        .collect();
    let choice = WeightedIndex::new(&areas)
        .map_err(|e| Error::InvalidBoundary(format!("face has no area to sample: {e}")))?;

    let [a, b, c] = triangles[choice.sample(rng)].map(|i| positions[i].clone());
    let third = ratio(1, 3);
    let centroid = &(&a + &(&b - &a).scale(&third)) + &(&c - &a).scale(&third);
    let [a, b, c] = [a, b, c].map(|corner| centroid.lerp(&corner, &sampling.shrink));
    let (ab, ac) = (&b - &a, &c - &a);

    for _ in 0..MAX_ATTEMPTS {
        let points: Vec<Point3> = (0..sampling.points)
            .map(|_| {
                let weights = [(); 3].map(|_| rng.gen_range(1..=WEIGHT_RESOLUTION));
                let total: i64 = weights.iter().sum();
                let (s, t) = (ratio(weights[1], total), ratio(weights[2], total));
                &(&a + &ab.scale(&s)) + &ac.scale(&t)
            })
            .collect();
        let projected: Vec<_> = points.iter().map(|p| projection.apply(p)).collect();
        let hull = convex_hull(&projected);
        if hull.len() >= 3 {
            return Ok(hull.into_iter().map(|i| points[i].clone()).collect());
        }
    }
    Err(Error::InvalidBoundary(
        "random points kept landing on a line; face is too thin to sample".to_string(),
    ))
}
