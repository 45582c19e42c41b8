// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Exact BSP tree built from the faces of a closed solid
//!
//! Every node is split by the plane of the first polygon that reaches it.
//! Once all polygons are placed, a missing front child marks space outside
//! the solid and a missing back child marks space inside it. Walking the tree
//! with a bounding cell therefore yields the solid as convex cells.

use super::plane::{Plane, Side};
use super::point::Point3;
use super::polytope::ConvexCell;

/// Convex planar polygon carried through the tree.
#[derive(Debug, Clone)]
pub struct Polygon {
    pub plane: Plane,
    pub vertices: Vec<Point3>,
}

/// Result of classifying a polygon against a plane.
#[derive(Default)]
struct Split {
    front: Vec<Polygon>,
    back: Vec<Polygon>,
    coplanar: Vec<Polygon>,
}

fn split_polygon(plane: &Plane, polygon: Polygon, out: &mut Split) {
    let sides: Vec<Side> = polygon.vertices.iter().map(|v| plane.side(v)).collect();
    let has_front = sides.contains(&Side::Front);
    let has_back = sides.contains(&Side::Back);

    match (has_front, has_back) {
        (false, false) => out.coplanar.push(polygon),
        (true, false) => out.front.push(polygon),
        (false, true) => out.back.push(polygon),
        (true, true) => {
            let n = polygon.vertices.len();
            let mut front = Vec::with_capacity(n + 1);
            let mut back = Vec::with_capacity(n + 1);
            for i in 0..n {
                let j = (i + 1) % n;
                let (vi, vj) = (&polygon.vertices[i], &polygon.vertices[j]);
                if sides[i] != Side::Back {
                    front.push(vi.clone());
                }
                if sides[i] != Side::Front {
                    back.push(vi.clone());
                }
                if matches!(
                    (sides[i], sides[j]),
                    (Side::Front, Side::Back) | (Side::Back, Side::Front)
                ) {
                    let hit = plane.intersect_segment(vi, vj);
                    front.push(hit.clone());
                    back.push(hit);
                }
            }
            out.front.push(Polygon {
                plane: polygon.plane.clone(),
                vertices: front,
            });
            out.back.push(Polygon {
                plane: polygon.plane,
                vertices: back,
            });
        }
    }
}

/// BSP tree node
#[derive(Debug, Clone)]
pub struct BspNode {
    plane: Plane,
    front: Option<Box<BspNode>>,
    back: Option<Box<BspNode>>,
    polygons: Vec<Polygon>,
}

impl BspNode {
    /// Build a tree from the boundary polygons of a closed solid.
    ///
    /// `None` when there are no polygons.
    pub fn build(polygons: Vec<Polygon>) -> Option<Box<BspNode>> {
        let mut iter = polygons.into_iter();
        let first = iter.next()?;
        let plane = first.plane.clone();

        let mut split = Split::default();
        split.coplanar.push(first);
        for polygon in iter {
            split_polygon(&plane, polygon, &mut split);
        }

        Some(Box::new(BspNode {
            plane,
            front: Self::build(split.front),
            back: Self::build(split.back),
            polygons: split.coplanar,
        }))
    }

    pub fn depth(&self) -> usize {
        let front = self.front.as_ref().map_or(0, |n| n.depth());
        let back = self.back.as_ref().map_or(0, |n| n.depth());
        1 + front.max(back)
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
            + self.front.as_ref().map_or(0, |n| n.polygon_count())
            + self.back.as_ref().map_or(0, |n| n.polygon_count())
    }

    /// Convex cells of `bounds` that lie inside the solid.
    ///
    /// `bounds` must strictly contain the solid.
    pub fn inside_cells(&self, bounds: ConvexCell) -> Vec<ConvexCell> {
        let mut cells = Vec::new();
        self.collect_inside(bounds, &mut cells);
        cells
    }

    fn collect_inside(&self, cell: ConvexCell, cells: &mut Vec<ConvexCell>) {
        let (front, back) = cell.split(&self.plane);
        if let (Some(node), Some(part)) = (&self.front, front) {
            node.collect_inside(part, cells);
        }
        if let Some(part) = back {
            match &self.back {
                Some(node) => node.collect_inside(part, cells),
                None => cells.push(part),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::exact::{scalar, Scalar};
    use crate::geometry::BoundingBox;
    use num_traits::Zero;

    fn box_polygons(lo: i64, hi: i64) -> Vec<Polygon> {
        let cell = ConvexCell::from_box(&BoundingBox::new(
            Point3::from_ints(lo, lo, lo),
            Point3::from_ints(hi, hi, hi),
        ))
        .unwrap();
        cell.faces()
            .iter()
            .map(|f| Polygon {
                plane: f.plane.clone(),
                vertices: f.vertices.clone(),
            })
            .collect()
    }

    fn bounds() -> ConvexCell {
        ConvexCell::from_box(&BoundingBox::new(
            Point3::from_ints(-5, -5, -5),
            Point3::from_ints(5, 5, 5),
        ))
        .unwrap()
    }

    #[test]
    fn test_cube_tree_recovers_cube() {
        let tree = BspNode::build(box_polygons(0, 2)).unwrap();
        assert_eq!(tree.polygon_count(), 6);
        assert_eq!(tree.depth(), 6);

        let cells = tree.inside_cells(bounds());
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].volume(), scalar(8));
    }

    #[test]
    fn test_split_polygon_straddling_plane() {
        let plane = Plane::new(crate::geometry::Vector3::from_ints(1, 0, 0), scalar(1)).unwrap();
        let mut split = Split::default();
        for polygon in box_polygons(0, 2) {
            split_polygon(&plane, polygon, &mut split);
        }
        // Four side faces are cut in two, the x faces stay whole.
        assert_eq!(split.front.len(), 5);
        assert_eq!(split.back.len(), 5);
        assert!(split.coplanar.is_empty());
    }

    #[test]
    fn test_empty_polygon_list() {
        assert!(BspNode::build(Vec::new()).is_none());
        let total = bounds().volume();
        assert!(total > Scalar::zero());
    }
}
