// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Exact triangulation of planar faces with holes
//!
//! Holes are first bridged into the outer loop, producing one weakly simple
//! ring, which is then ear clipped. Every predicate is exact, so the result
//! covers the face precisely: no slivers are dropped and no triangle
//! overlaps another.

use super::exact::scalar;
use super::point::{Point3, Vector3};
use super::predicates::{
    cross2, dot_dirs, orient2d, point_in_polygon, point_in_triangle, segments_intersect, signed_area2,
    Point2, Projection,
};
use crate::error::{Error, Result};
use num_traits::{Signed, Zero};
use std::cmp::Ordering;

struct Ring {
    /// Vertex id and projected position of every ring slot.
    slots: Vec<(usize, Point2)>,
    order: Vec<usize>,
}

impl Ring {
    fn point(&self, position: usize) -> &Point2 {
        &self.slots[self.order[position]].1
    }

    fn id(&self, position: usize) -> usize {
        self.slots[self.order[position]].0
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}

/// Triangulate a planar face.
///
/// `loops[0]` is the outer loop, the rest are holes, all given as indices
/// into `positions`. Triangles are returned counter-clockwise around
/// `normal`.
pub fn triangulate_face(loops: &[Vec<usize>], positions: &[Point3], normal: &Vector3) -> Result<Vec<[usize; 3]>> {
    let projection = Projection::along(normal);
    let project = |indices: &[usize], want_ccw: bool| -> Vec<(usize, Point2)> {
        let mut projected: Vec<(usize, Point2)> =
            indices.iter().map(|&i| (i, projection.apply(&positions[i]))).collect();
        let flat: Vec<Point2> = projected.iter().map(|(_, p)| p.clone()).collect();
        if signed_area2(&flat).is_positive() != want_ccw {
            projected.reverse();
        }
        projected
    };

    let Some((outer, holes)) = loops.split_first() else {
        return Ok(Vec::new());
    };

    let slots = project(outer, true);
    let order = (0..slots.len()).collect();
    let mut ring = Ring { slots, order };

    let mut holes: Vec<Vec<(usize, Point2)>> = holes.iter().map(|h| project(h, false)).collect();
    // Rightmost holes first, so each bridge only has to see past holes
    // already merged into the ring.
    holes.sort_by(|a, b| rightmost(b).cmp(&rightmost(a)));

    for index in 0..holes.len() {
        bridge_hole(&mut ring, &holes[index], &holes[index + 1..])?;
    }

    ear_clip(ring)
}

fn rightmost(hole: &[(usize, Point2)]) -> Option<&Point2> {
    hole.iter().map(|(_, p)| p).max()
}

fn loop_edges<'a>(points: impl Iterator<Item = &'a Point2> + Clone) -> Vec<(Point2, Point2)> {
    let next = points.clone().cycle().skip(1);
    points.zip(next).map(|(a, b)| (a.clone(), b.clone())).collect()
}

fn bridge_hole(ring: &mut Ring, hole: &[(usize, Point2)], pending: &[Vec<(usize, Point2)>]) -> Result<()> {
    let start = hole
        .iter()
        .enumerate()
        .max_by(|a, b| a.1 .1.cmp(&b.1 .1))
        .map(|(i, _)| i)
        .ok_or_else(|| Error::InvalidBoundary("empty hole loop".to_string()))?;
    let m = &hole[start].1;

    let ring_points: Vec<Point2> = (0..ring.len()).map(|i| ring.point(i).clone()).collect();
    let mut blocking = loop_edges(ring_points.iter());
    blocking.extend(loop_edges(hole.iter().map(|(_, p)| p)));
    for other in pending {
        blocking.extend(loop_edges(other.iter().map(|(_, p)| p)));
    }

    let mut best: Option<(usize, _)> = None;
    for (position, p) in ring_points.iter().enumerate() {
        if p == m || !bridge_is_clear(m, p, &blocking, &ring_points) {
            continue;
        }
        let d = (&p.u - &m.u) * (&p.u - &m.u) + (&p.v - &m.v) * (&p.v - &m.v);
        if best.as_ref().map_or(true, |(_, best_d)| d < *best_d) {
            best = Some((position, d));
        }
    }

    let (position, _) = best.ok_or_else(|| {
        Error::InvalidBoundary("face hole cannot be connected to its outer loop".to_string())
    })?;

    let p_slot = ring.order[position];
    let mut spliced = Vec::with_capacity(ring.len() + hole.len() + 2);
    spliced.extend_from_slice(&ring.order[..=position]);
    let first_hole_slot = ring.slots.len();
    for offset in 0..hole.len() {
        ring.slots.push(hole[(start + offset) % hole.len()].clone());
    }
    spliced.extend(first_hole_slot..ring.slots.len());
    ring.slots.push(hole[start].clone());
    spliced.push(ring.slots.len() - 1);
    ring.slots.push(ring.slots[p_slot].clone());
    spliced.push(ring.slots.len() - 1);
    spliced.extend_from_slice(&ring.order[position + 1..]);
    ring.order = spliced;
    Ok(())
}

/// Segment `m`-`p` crosses no blocking edge and runs through the ring's
/// interior.
fn bridge_is_clear(m: &Point2, p: &Point2, blocking: &[(Point2, Point2)], ring: &[Point2]) -> bool {
    for (a, b) in blocking {
        let touches_p = a == p || b == p;
        let touches_m = a == m || b == m;
        if touches_p || touches_m {
            // Shared endpoints are fine unless the edge runs back along the bridge.
            for (end, other) in [(a, b), (b, a)] {
                for (anchor, toward) in [(p, m), (m, p)] {
                    if end == anchor
                        && other != toward
                        && orient2d(anchor, toward, other) == Ordering::Equal
                        && dot_dirs(&diff(other, anchor), &diff(toward, anchor)).is_positive()
                    {
                        return false;
                    }
                }
            }
            continue;
        }
        if segments_intersect(m, p, a, b) {
            return false;
        }
    }

    let midpoint = Point2 {
        u: (&m.u + &p.u) / scalar(2),
        v: (&m.v + &p.v) / scalar(2),
    };
    point_in_polygon(&midpoint, ring)
}

fn diff(a: &Point2, b: &Point2) -> Point2 {
    Point2 {
        u: &a.u - &b.u,
        v: &a.v - &b.v,
    }
}

fn ear_clip(mut ring: Ring) -> Result<Vec<[usize; 3]>> {
    let mut triangles = Vec::with_capacity(ring.len().saturating_sub(2));

    while ring.len() > 3 {
        let len = ring.len();
        let ear = (0..len).find(|&i| is_ear(&ring, (i + len - 1) % len, i, (i + 1) % len));

        match ear {
            Some(i) => {
                triangles.push([ring.id((i + len - 1) % len), ring.id(i), ring.id((i + 1) % len)]);
                ring.order.remove(i);
            }
            None => {
                // Only zero-area corners are left to remove.
                let flat = (0..len).find(|&i| {
                    cross2(ring.point((i + len - 1) % len), ring.point(i), ring.point((i + 1) % len)).is_zero()
                });
                match flat {
                    Some(i) => {
                        ring.order.remove(i);
                    }
                    None => {
                        return Err(Error::InvalidBoundary(
                            "face cannot be triangulated; its loops self-intersect".to_string(),
                        ))
                    }
                }
            }
        }
    }

    if ring.len() == 3 && orient2d(ring.point(0), ring.point(1), ring.point(2)) == Ordering::Greater {
        triangles.push([ring.id(0), ring.id(1), ring.id(2)]);
    }
    Ok(triangles)
}

fn is_ear(ring: &Ring, prev: usize, curr: usize, next: usize) -> bool {
    let (a, b, c) = (ring.point(prev), ring.point(curr), ring.point(next));
    if orient2d(a, b, c) != Ordering::Greater {
        return false;
    }

    (0..ring.len()).all(|i| {
        if i == prev || i == curr || i == next {
            return true;
        }
        let q = ring.point(i);
        q == a || q == b || q == c || !point_in_triangle(q, a, b, c)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::exact::{scalar, Scalar};

    fn area_of(triangles: &[[usize; 3]], positions: &[Point3], normal: &Vector3) -> Scalar {
        let projection = Projection::along(normal);
        triangles
            .iter()
            .map(|t| {
                let [a, b, c] = t.map(|i| projection.apply(&positions[i]));
                cross2(&a, &b, &c)
            })
            .fold(Scalar::zero(), |acc, x| acc + x)
    }

    #[test]
    fn test_concave_polygon() {
        let positions = vec![
            Point3::from_ints(0, 0, 0),
            Point3::from_ints(2, 0, 0),
            Point3::from_ints(2, 1, 0),
            Point3::from_ints(1, 1, 0),
            Point3::from_ints(1, 2, 0),
            Point3::from_ints(0, 2, 0),
        ];
        let normal = Vector3::from_ints(0, 0, 1);
        let triangles = triangulate_face(&[vec![0, 1, 2, 3, 4, 5]], &positions, &normal).unwrap();
        assert_eq!(triangles.len(), 4);
        assert_eq!(area_of(&triangles, &positions, &normal), scalar(6));
    }

    #[test]
    fn test_square_with_hole() {
        let positions = vec![
            Point3::from_ints(0, 0, 0),
            Point3::from_ints(4, 0, 0),
            Point3::from_ints(4, 4, 0),
            Point3::from_ints(0, 4, 0),
            Point3::from_ints(1, 1, 0),
            Point3::from_ints(1, 3, 0),
            Point3::from_ints(3, 3, 0),
            Point3::from_ints(3, 1, 0),
        ];
        let normal = Vector3::from_ints(0, 0, 1);
        let loops = vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]];
        let triangles = triangulate_face(&loops, &positions, &normal).unwrap();
        // Twice the area of the 4x4 square minus the 2x2 hole.
        assert_eq!(area_of(&triangles, &positions, &normal), scalar(24));
    }

    #[test]
    fn test_rectangle_with_two_holes() {
        let positions = vec![
            Point3::from_ints(0, 0, 0),
            Point3::from_ints(8, 0, 0),
            Point3::from_ints(8, 4, 0),
            Point3::from_ints(0, 4, 0),
            Point3::from_ints(1, 1, 0),
            Point3::from_ints(1, 3, 0),
            Point3::from_ints(3, 3, 0),
            Point3::from_ints(3, 1, 0),
            Point3::from_ints(5, 1, 0),
            Point3::from_ints(5, 3, 0),
            Point3::from_ints(7, 3, 0),
            Point3::from_ints(7, 1, 0),
        ];
        let normal = Vector3::from_ints(0, 0, 1);
        // Left hole listed first; bridging must still handle the right one first.
        let loops = vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7], vec![8, 9, 10, 11]];
        let triangles = triangulate_face(&loops, &positions, &normal).unwrap();
        // Twice the area of the 8x4 rectangle minus two 2x2 holes.
        assert_eq!(area_of(&triangles, &positions, &normal), scalar(48));
    }

    #[test]
    fn test_downward_face_keeps_orientation() {
        let positions = vec![
            Point3::from_ints(0, 0, 0),
            Point3::from_ints(0, 1, 0),
            Point3::from_ints(1, 1, 0),
            Point3::from_ints(1, 0, 0),
        ];
        let normal = Vector3::from_ints(0, 0, -1);
        let triangles = triangulate_face(&[vec![0, 1, 2, 3]], &positions, &normal).unwrap();
        for t in &triangles {
            let n = (&positions[t[1]] - &positions[t[0]]).cross(&(&positions[t[2]] - &positions[t[0]]));
            assert!(n.z.is_negative());
        }
    }

    #[test]
    fn test_collinear_vertices_are_absorbed() {
        let positions = vec![
            Point3::from_ints(0, 0, 0),
            Point3::from_ints(1, 0, 0),
            Point3::from_ints(2, 0, 0),
            Point3::from_ints(2, 2, 0),
        ];
        let normal = Vector3::from_ints(0, 0, 1);
        let triangles = triangulate_face(&[vec![0, 1, 2, 3]], &positions, &normal).unwrap();
        assert_eq!(area_of(&triangles, &positions, &normal), scalar(4));
    }
}
