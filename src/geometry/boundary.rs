// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boundary extraction from convex cells
//!
//! Cell faces are grouped by supporting plane. Where two cells touch, the
//! overlapping parts of their opposite faces are interior and are removed.
//! The exposed fragments on each oriented plane are merged into maximal
//! faces by cancelling shared edges, and the resulting loops are normalized
//! so that equal regions always produce the same face list.

use super::exact::{scalar, Scalar};
use super::plane::{Plane, Side};
use super::point::{Point3, Vector3};
use super::polytope::ConvexCell;
use super::predicates::{
    collinear, cross_dirs, dot_dirs, point_in_polygon, signed_area2, strictly_between, Point2,
    Projection,
};
use super::BoundingBox;
use ahash::{AHashMap, AHashSet};
use num_traits::{Signed, Zero};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Loops of one face: the outer loop first, then holes.
pub type FaceLoops = Vec<Vec<Point3>>;

struct PlaneGroup {
    plane: Plane,
    /// Faces oriented like `plane`, then faces oriented against it.
    sides: [Vec<Vec<Point3>>; 2],
}

/// Canonical boundary faces of a union of interior-disjoint cells.
pub fn boundary_faces(cells: &[ConvexCell]) -> Vec<FaceLoops> {
    let mut index: AHashMap<Plane, usize> = AHashMap::new();
    let mut groups: Vec<PlaneGroup> = Vec::new();
    for cell in cells {
        for face in cell.faces() {
            let (plane, forward) = face.plane.unoriented();
            let slot = match index.get(&plane) {
                Some(&slot) => slot,
                None => {
                    index.insert(plane.clone(), groups.len());
                    groups.push(PlaneGroup {
                        plane,
                        sides: [Vec::new(), Vec::new()],
                    });
                    groups.len() - 1
                }
            };
            groups[slot].sides[usize::from(!forward)].push(face.vertices.clone());
        }
    }

    let mut faces = Vec::new();
    for group in &groups {
        let oriented = [group.plane.clone(), group.plane.flipped()];
        for side in 0..2 {
            let opposite = &oriented[1 - side];
            let fragments = exposed_fragments(&group.sides[side], &group.sides[1 - side], opposite.normal());
            if !fragments.is_empty() {
                faces.extend(merge_fragments(&fragments, &oriented[side]));
            }
        }
    }

    normalize(faces)
}

/// Parts of `own` faces not covered by any `opposite` face.
fn exposed_fragments(own: &[Vec<Point3>], opposite: &[Vec<Point3>], opposite_normal: &Vector3) -> Vec<Vec<Point3>> {
    let mut exposed = Vec::new();
    for polygon in own {
        let mut pieces = vec![polygon.clone()];
        for cover in opposite {
            pieces = pieces
                .into_iter()
                .flat_map(|piece| subtract_polygon(piece, cover, opposite_normal))
                .collect();
            if pieces.is_empty() {
                break;
            }
        }
        exposed.extend(pieces);
    }
    exposed
}

/// Planes through the edges of a convex polygon, facing away from it.
fn edge_planes(polygon: &[Point3], normal: &Vector3) -> Vec<Plane> {
    let n = polygon.len();
    (0..n)
        .filter_map(|i| {
            let direction = &polygon[(i + 1) % n] - &polygon[i];
            Plane::from_point_normal(&polygon[i], direction.cross(normal))
        })
        .collect()
}

/// Back part of a convex polygon, `None` if it has no area.
fn clip_polygon(polygon: &[Point3], plane: &Plane) -> Option<Vec<Point3>> {
    let sides: Vec<Side> = polygon.iter().map(|p| plane.side(p)).collect();
    if !sides.contains(&Side::Front) {
        return Some(polygon.to_vec());
    }
    if !sides.contains(&Side::Back) {
        return None;
    }

    let n = polygon.len();
    let mut kept = Vec::with_capacity(n + 1);
    for i in 0..n {
        let j = (i + 1) % n;
        if sides[i] != Side::Front {
            kept.push(polygon[i].clone());
        }
        if matches!(
            (sides[i], sides[j]),
            (Side::Front, Side::Back) | (Side::Back, Side::Front)
        ) {
            kept.push(plane.intersect_segment(&polygon[i], &polygon[j]));
        }
    }
    Some(kept)
}

/// Convex polygon `a` minus coplanar convex polygon `b`, as convex pieces.
fn subtract_polygon(a: Vec<Point3>, b: &[Point3], b_normal: &Vector3) -> Vec<Vec<Point3>> {
    let disjoint_boxes = match (BoundingBox::from_points(&a), BoundingBox::from_points(b)) {
        (Some(box_a), Some(box_b)) => !box_a.intersects(&box_b),
        _ => true,
    };
    if disjoint_boxes {
        return vec![a];
    }

    let planes = edge_planes(b, b_normal);
    let mut clipped = Some(a.clone());
    for plane in &planes {
        clipped = clipped.and_then(|p| clip_polygon(&p, plane));
    }
    if clipped.is_none() {
        return vec![a];
    }

    let mut pieces = Vec::new();
    let mut rest = a;
    for plane in &planes {
        if let Some(outside) = clip_polygon(&rest, &plane.flipped()) {
            pieces.push(outside);
        }
        match clip_polygon(&rest, plane) {
            Some(inside) => rest = inside,
            None => break,
        }
    }
    pieces
}

/// `points` with every candidate lying strictly inside an edge inserted in
/// order along that edge.
fn subdivide(points: &[Point3], candidates: &[Point3]) -> Vec<Point3> {
    let n = points.len();
    let mut result = Vec::with_capacity(n);
    for i in 0..n {
        let (a, b) = (&points[i], &points[(i + 1) % n]);
        result.push(a.clone());

        let direction = b - a;
        let mut inner: Vec<(_, &Point3)> = candidates
            .iter()
            .filter(|c| within_span(c, a, b) && strictly_between(c, a, b))
            .map(|c| ((c - a).dot(&direction), c))
            .collect();
        inner.sort_by(|x, y| x.0.cmp(&y.0));
        result.extend(inner.into_iter().map(|(_, c)| c.clone()));
    }
    result
}

fn within_span(c: &Point3, a: &Point3, b: &Point3) -> bool {
    fn inside(v: &Scalar, p: &Scalar, q: &Scalar) -> bool {
        (v >= p && v <= q) || (v >= q && v <= p)
    }
    inside(&c.x, &a.x, &b.x) && inside(&c.y, &a.y, &b.y) && inside(&c.z, &a.z, &b.z)
}

/// Merge interior-disjoint convex fragments lying on one oriented plane into
/// faces with holes.
fn merge_fragments(fragments: &[Vec<Point3>], plane: &Plane) -> Vec<FaceLoops> {
    let vertices: Vec<Point3> = fragments
        .iter()
        .flatten()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut directed: BTreeSet<(Point3, Point3)> = BTreeSet::new();
    for fragment in fragments {
        let split = subdivide(fragment, &vertices);
        let n = split.len();
        for i in 0..n {
            directed.insert((split[i].clone(), split[(i + 1) % n].clone()));
        }
    }

    let boundary: Vec<(Point3, Point3)> = directed
        .iter()
        .filter(|(a, b)| !directed.contains(&(b.clone(), a.clone())))
        .cloned()
        .collect();

    let projection = Projection::along(plane.normal());
    let loops = trace_loops(boundary, &projection);
    assemble_faces(loops, &projection)
}

/// Sort key comparing directions by counter-clockwise angle from `reference`.
fn angle_from(reference: &Point2, a: &Point2, b: &Point2) -> Ordering {
    let half = |d: &Point2| {
        let cross = cross_dirs(reference, d);
        if cross.is_positive() || (cross.is_zero() && dot_dirs(reference, d).is_positive()) {
            0
        } else {
            1
        }
    };
    half(a).cmp(&half(b)).then_with(|| Scalar::zero().cmp(&cross_dirs(a, b)))
}

/// Chain directed boundary edges into closed loops.
///
/// Where several edges leave a vertex, the walk takes the sharpest left
/// turn, which keeps regions that touch at a single point in separate loops.
fn trace_loops(edges: Vec<(Point3, Point3)>, projection: &Projection) -> Vec<Vec<Point3>> {
    let mut outgoing: BTreeMap<Point3, Vec<Point3>> = BTreeMap::new();
    for (a, b) in edges {
        outgoing.entry(a).or_default().push(b);
    }

    let take = |outgoing: &mut BTreeMap<Point3, Vec<Point3>>, from: &Point3, to: &Point3| {
        if let Some(targets) = outgoing.get_mut(from) {
            targets.retain(|t| t != to);
            if targets.is_empty() {
                outgoing.remove(from);
            }
        }
    };

    let mut loops = Vec::new();
    loop {
        let smallest = outgoing
            .iter()
            .next()
            .and_then(|(from, targets)| Some((from.clone(), targets.iter().min()?.clone())));
        let Some((start, first)) = smallest else {
            break;
        };
        take(&mut outgoing, &start, &first);

        let mut points = vec![start.clone()];
        let (mut previous, mut current) = (start.clone(), first.clone());
        loop {
            let mut candidates: Vec<Point3> = outgoing.get(&current).cloned().unwrap_or_default();
            if current == start {
                candidates.push(first.clone());
            }
            let next = match candidates.len() {
                0 => break,
                1 => candidates.swap_remove(0),
                _ => {
                    let origin = projection.apply(&current);
                    let to_dir = |p: &Point3| {
                        let q = projection.apply(p);
                        Point2 {
                            u: &q.u - &origin.u,
                            v: &q.v - &origin.v,
                        }
                    };
                    let reference = to_dir(&previous);
                    candidates
                        .into_iter()
                        .max_by(|a, b| angle_from(&reference, &to_dir(a), &to_dir(b)))
                        .unwrap_or_else(|| first.clone())
                }
            };
            if current == start && next == first {
                break;
            }
            take(&mut outgoing, &current, &next);
            points.push(current.clone());
            previous = std::mem::replace(&mut current, next);
        }
        loops.push(points);
    }
    loops
}

/// Pair counter-clockwise outer loops with the clockwise holes they contain.
fn assemble_faces(loops: Vec<Vec<Point3>>, projection: &Projection) -> Vec<FaceLoops> {
    let mut outers: Vec<(Vec<Point3>, Vec<Point2>, Scalar)> = Vec::new();
    let mut holes: Vec<(Vec<Point3>, Vec<Point2>)> = Vec::new();
    for points in loops {
        let flat: Vec<Point2> = points.iter().map(|p| projection.apply(p)).collect();
        let area = signed_area2(&flat);
        match area.cmp(&Scalar::zero()) {
            Ordering::Greater => outers.push((points, flat, area)),
            Ordering::Less => holes.push((points, flat)),
            Ordering::Equal => {}
        }
    }

    let mut faces: Vec<FaceLoops> = outers.iter().map(|(points, _, _)| vec![points.clone()]).collect();
    for (points, flat) in holes {
        let sample = Point2 {
            u: (&flat[0].u + &flat[1].u) / scalar(2),
            v: (&flat[0].v + &flat[1].v) / scalar(2),
        };
        let container = outers
            .iter()
            .enumerate()
            .filter(|(_, (_, outer, _))| point_in_polygon(&sample, outer))
            .min_by(|a, b| a.1 .2.cmp(&b.1 .2))
            .map(|(i, _)| i);
        match container {
            Some(i) => faces[i].push(points),
            None => {
                warn!(vertices = points.len(), "hole loop has no enclosing outer loop");
                let mut reversed = points;
                reversed.reverse();
                faces.push(vec![reversed]);
            }
        }
    }
    faces
}

/// Drop points where no loop turns, insert corners lying on edges, then
/// order loops, holes and faces.
fn normalize(faces: Vec<FaceLoops>) -> Vec<FaceLoops> {
    let mut corners: AHashSet<Point3> = AHashSet::new();
    for points in faces.iter().flatten() {
        let n = points.len();
        for i in 0..n {
            let (prev, here, next) = (&points[(i + n - 1) % n], &points[i], &points[(i + 1) % n]);
            if !collinear(prev, here, next) {
                corners.insert(here.clone());
            }
        }
    }
    let mut corner_list: Vec<Point3> = corners.iter().cloned().collect();
    corner_list.sort();

    let mut normalized: Vec<FaceLoops> = faces
        .into_iter()
        .map(|face| {
            let mut loops: Vec<Vec<Point3>> = face
                .into_iter()
                .map(|points| {
                    let kept: Vec<Point3> = points.into_iter().filter(|p| corners.contains(p)).collect();
                    rotate_to_min(subdivide(&kept, &corner_list))
                })
                .collect();
            if loops.len() > 2 {
                loops[1..].sort();
            }
            loops
        })
        .collect();
    normalized.sort();
    normalized
}

fn rotate_to_min(mut points: Vec<Point3>) -> Vec<Point3> {
    if let Some(start) = points.iter().enumerate().min_by(|a, b| a.1.cmp(b.1)).map(|(i, _)| i) {
        points.rotate_left(start);
    }
    points
}
