// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Oriented planes in canonical form

use super::exact::Scalar;
use super::point::{Point3, Vector3};
use num_traits::{Signed, Zero};
use std::cmp::Ordering;

/// Position of a point relative to an oriented plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Front,
    Back,
    On,
}

/// Oriented plane `normal · p = w`.
///
/// The stored normal is scaled so that its first non-zero component is `±1`.
/// Two descriptions of the same oriented plane are therefore equal and hash
/// identically, which lets faces be grouped by plane.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Plane {
    normal: Vector3,
    w: Scalar,
}

impl Plane {
    /// Canonical plane from any non-zero normal. `None` for a zero normal.
    pub fn new(normal: Vector3, w: Scalar) -> Option<Self> {
        let lead = [&normal.x, &normal.y, &normal.z]
            .into_iter()
            .find(|c| !c.is_zero())?
            .abs();
        Some(Self {
            normal: Vector3::new(&normal.x / &lead, &normal.y / &lead, &normal.z / &lead),
            w: w / lead,
        })
    }

    pub fn from_point_normal(point: &Point3, normal: Vector3) -> Option<Self> {
        let w = normal.dot(&point.coords());
        Self::new(normal, w)
    }

    /// Plane through three points, front side given by the right-hand rule.
    pub fn from_points(a: &Point3, b: &Point3, c: &Point3) -> Option<Self> {
        let normal = (b - a).cross(&(c - a));
        Self::from_point_normal(a, normal)
    }

    /// Plane of a polygon loop using Newell's normal.
    ///
    /// The loop is not checked for planarity; see [`Plane::contains`].
    pub fn from_polygon(points: &[Point3]) -> Option<Self> {
        let first = points.first()?;
        Self::from_point_normal(first, newell_normal(points))
    }

    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    pub fn w(&self) -> &Scalar {
        &self.w
    }

    /// Scaled signed distance `normal · p - w`.
    pub fn evaluate(&self, point: &Point3) -> Scalar {
        self.normal.dot(&point.coords()) - &self.w
    }

    pub fn side(&self, point: &Point3) -> Side {
        match self.evaluate(point).cmp(&Scalar::zero()) {
            Ordering::Greater => Side::Front,
            Ordering::Less => Side::Back,
            Ordering::Equal => Side::On,
        }
    }

    pub fn contains(&self, point: &Point3) -> bool {
        self.side(point) == Side::On
    }

    pub fn flipped(&self) -> Plane {
        Plane {
            normal: -&self.normal,
            w: -&self.w,
        }
    }

    /// Orientation-independent representative of this plane, and whether
    /// `self` has the representative's orientation.
    pub fn unoriented(&self) -> (Plane, bool) {
        let lead = [&self.normal.x, &self.normal.y, &self.normal.z]
            .into_iter()
            .find(|c| !c.is_zero())
            .map(|c| c.is_positive())
            .unwrap_or(true);
        if lead {
            (self.clone(), true)
        } else {
            (self.flipped(), false)
        }
    }

    /// Intersection of the plane with segment `a`-`b`.
    ///
    /// `a` and `b` must lie strictly on opposite sides.
    pub fn intersect_segment(&self, a: &Point3, b: &Point3) -> Point3 {
        let da = self.evaluate(a);
        let db = self.evaluate(b);
        let t = &da / (&da - &db);
        a.lerp(b, &t)
    }
}

/// Newell's polygon normal. Exact, and valid for non-convex loops.
pub fn newell_normal(points: &[Point3]) -> Vector3 {
    let mut normal = Vector3::zero();
    let n = points.len();
    for i in 0..n {
        let curr = &points[i];
        let next = &points[(i + 1) % n];
        normal.x += (&curr.y - &next.y) * (&curr.z + &next.z);
        normal.y += (&curr.z - &next.z) * (&curr.x + &next.x);
        normal.z += (&curr.x - &next.x) * (&curr.y + &next.y);
    }
    normal
}
