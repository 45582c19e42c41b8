// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Sign-exact geometric predicates
//!
//! All predicates evaluate their determinants in exact rational arithmetic,
//! so there are no epsilons and no near-degenerate fallbacks: a point is on a
//! plane or it is not.

use super::exact::Scalar;
use super::point::{Point3, Vector3};
use num_traits::{Signed, Zero};
use std::cmp::Ordering;

/// Six times the signed volume of tetrahedron (a, b, c, d).
///
/// Positive when `d` lies on the side of plane (a, b, c) that its
/// right-hand-rule normal points to.
pub fn oriented_volume(a: &Point3, b: &Point3, c: &Point3, d: &Point3) -> Scalar {
    let ab = b - a;
    let ac = c - a;
    let ad = d - a;
    ab.cross(&ac).dot(&ad)
}

pub fn coplanar(a: &Point3, b: &Point3, c: &Point3, d: &Point3) -> bool {
    oriented_volume(a, b, c, d).is_zero()
}

pub fn collinear(a: &Point3, b: &Point3, c: &Point3) -> bool {
    (b - a).cross(&(c - a)).is_zero()
}

/// `p` lies on the open segment `a`-`b`.
pub fn strictly_between(p: &Point3, a: &Point3, b: &Point3) -> bool {
    if p == a || p == b || !collinear(a, b, p) {
        return false;
    }
    let ab = b - a;
    let t = (p - a).dot(&ab);
    t.is_positive() && t < ab.dot(&ab)
}

/// Point in a coordinate plane, produced by [`Projection`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point2 {
    pub u: Scalar,
    pub v: Scalar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
    Z,
}

/// Orientation-preserving projection of a plane onto a coordinate plane.
///
/// Drops the dominant axis of the normal and swaps the remaining two when
/// the normal points down that axis, so loops that are counter-clockwise
/// around the normal stay counter-clockwise in 2D.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    axis: Axis,
    flip: bool,
}

impl Projection {
    pub fn along(normal: &Vector3) -> Projection {
        let (ax, ay, az) = (normal.x.abs(), normal.y.abs(), normal.z.abs());
        let (axis, component) = if az >= ax && az >= ay {
            (Axis::Z, &normal.z)
        } else if ax >= ay {
            (Axis::X, &normal.x)
        } else {
            (Axis::Y, &normal.y)
        };
        Projection {
            axis,
            flip: component.is_negative(),
        }
    }

    pub fn apply(&self, p: &Point3) -> Point2 {
        let (u, v) = match self.axis {
            Axis::Z => (&p.x, &p.y),
            Axis::X => (&p.y, &p.z),
            Axis::Y => (&p.z, &p.x),
        };
        if self.flip {
            Point2 { u: v.clone(), v: u.clone() }
        } else {
            Point2 { u: u.clone(), v: v.clone() }
        }
    }
}

/// Twice the signed area of triangle (a, b, c).
pub fn cross2(a: &Point2, b: &Point2, c: &Point2) -> Scalar {
    (&b.u - &a.u) * (&c.v - &a.v) - (&b.v - &a.v) * (&c.u - &a.u)
}

/// Sign of [`cross2`]: `Greater` for a left turn.
pub fn orient2d(a: &Point2, b: &Point2, c: &Point2) -> Ordering {
    cross2(a, b, c).cmp(&Scalar::zero())
}

/// Cross product of two 2D direction vectors `a` and `b` (both from the origin).
pub fn cross_dirs(a: &Point2, b: &Point2) -> Scalar {
    &a.u * &b.v - &a.v * &b.u
}

pub fn dot_dirs(a: &Point2, b: &Point2) -> Scalar {
    &a.u * &b.u + &a.v * &b.v
}

/// Twice the signed area of a closed loop; positive for counter-clockwise.
pub fn signed_area2(points: &[Point2]) -> Scalar {
    let n = points.len();
    let mut area = Scalar::zero();
    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        area += &a.u * &b.v - &b.u * &a.v;
    }
    area
}

/// Even-odd point in polygon test. Points exactly on the boundary may land
/// on either side; callers only query interior sample points.
pub fn point_in_polygon(p: &Point2, polygon: &[Point2]) -> bool {
    let n = polygon.len();
    let mut inside = false;
    for i in 0..n {
        let a = &polygon[i];
        let b = &polygon[(i + 1) % n];
        if (a.v > p.v) != (b.v > p.v) {
            // Does the edge cross the ray p + t(1, 0)? Division-free.
            let lhs = (&p.u - &a.u) * (&b.v - &a.v);
            let rhs = (&b.u - &a.u) * (&p.v - &a.v);
            let left_of_edge = if b.v > a.v { lhs < rhs } else { lhs > rhs };
            if left_of_edge {
                inside = !inside;
            }
        }
    }
    inside
}

/// Closed point-in-triangle test for a counter-clockwise triangle.
pub fn point_in_triangle(p: &Point2, a: &Point2, b: &Point2, c: &Point2) -> bool {
    orient2d(a, b, p) != Ordering::Less
        && orient2d(b, c, p) != Ordering::Less
        && orient2d(c, a, p) != Ordering::Less
}

/// `p` is collinear with `a`-`b` and inside its closed bounding box.
pub fn on_segment2(p: &Point2, a: &Point2, b: &Point2) -> bool {
    orient2d(a, b, p) == Ordering::Equal
        && p.u >= a.u.clone().min(b.u.clone())
        && p.u <= a.u.clone().max(b.u.clone())
        && p.v >= a.v.clone().min(b.v.clone())
        && p.v <= a.v.clone().max(b.v.clone())
}

/// Closed segment intersection test (touching counts).
pub fn segments_intersect(a: &Point2, b: &Point2, c: &Point2, d: &Point2) -> bool {
    let o1 = orient2d(a, b, c);
    let o2 = orient2d(a, b, d);
    let o3 = orient2d(c, d, a);
    let o4 = orient2d(c, d, b);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    on_segment2(c, a, b) || on_segment2(d, a, b) || on_segment2(a, c, d) || on_segment2(b, c, d)
}

/// Convex hull (Andrew's monotone chain) returning the input indices of the
/// hull vertices in counter-clockwise order, collinear points removed.
pub fn convex_hull(points: &[Point2]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&i, &j| points[i].cmp(&points[j]));
    order.dedup_by(|i, j| points[*i] == points[*j]);
    if order.len() < 3 {
        return order;
    }

    let mut lower: Vec<usize> = Vec::new();
    for &i in &order {
        while lower.len() >= 2
            && orient2d(&points[lower[lower.len() - 2]], &points[lower[lower.len() - 1]], &points[i])
                != Ordering::Greater
        {
            lower.pop();
        }
        lower.push(i);
    }

    let mut upper: Vec<usize> = Vec::new();
    for &i in order.iter().rev() {
        while upper.len() >= 2
            && orient2d(&points[upper[upper.len() - 2]], &points[upper[upper.len() - 1]], &points[i])
                != Ordering::Greater
        {
            upper.pop();
        }
        upper.push(i);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}
