// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Convex cells with exact boundary representation

use super::exact::{scalar, Scalar};
use super::plane::{Plane, Side};
use super::point::Point3;
use super::predicates::{convex_hull, oriented_volume, Point2, Projection};
use super::BoundingBox;
use num_traits::Zero;

/// Planar face of a convex cell.
///
/// `plane` faces outward; `vertices` run counter-clockwise around its normal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellFace {
    pub plane: Plane,
    pub vertices: Vec<Point3>,
}

/// Bounded convex polytope with positive volume
#[derive(Debug, Clone)]
pub struct ConvexCell {
    faces: Vec<CellFace>,
    bbox: BoundingBox,
}

impl ConvexCell {
    /// Cell filling an axis-aligned box. `None` if the box is flat.
    pub fn from_box(bounds: &BoundingBox) -> Option<Self> {
        let (lo, hi) = (&bounds.min, &bounds.max);
        if lo.x >= hi.x || lo.y >= hi.y || lo.z >= hi.z {
            return None;
        }
        let p = |x: &Scalar, y: &Scalar, z: &Scalar| Point3::new(x.clone(), y.clone(), z.clone());
        let (x0, y0, z0, x1, y1, z1) = (&lo.x, &lo.y, &lo.z, &hi.x, &hi.y, &hi.z);
        let loops = [
            [p(x0, y0, z0), p(x0, y1, z0), p(x1, y1, z0), p(x1, y0, z0)],
            [p(x0, y0, z1), p(x1, y0, z1), p(x1, y1, z1), p(x0, y1, z1)],
            [p(x0, y0, z0), p(x1, y0, z0), p(x1, y0, z1), p(x0, y0, z1)],
            [p(x0, y1, z0), p(x0, y1, z1), p(x1, y1, z1), p(x1, y1, z0)],
            [p(x0, y0, z0), p(x0, y0, z1), p(x0, y1, z1), p(x0, y1, z0)],
            [p(x1, y0, z0), p(x1, y1, z0), p(x1, y1, z1), p(x1, y0, z1)],
        ];
        let faces = loops
            .into_iter()
            .map(|vertices| {
                let plane = Plane::from_polygon(&vertices)?;
                Some(CellFace {
                    plane,
                    vertices: vertices.to_vec(),
                })
            })
            .collect::<Option<Vec<_>>>()?;
        Some(Self {
            faces,
            bbox: bounds.clone(),
        })
    }

    fn from_faces(faces: Vec<CellFace>) -> Option<Self> {
        let bbox = BoundingBox::from_points(faces.iter().flat_map(|f| f.vertices.iter()))?;
        Some(Self { faces, bbox })
    }

    pub fn faces(&self) -> &[CellFace] {
        &self.faces
    }

    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Distinct corner points, sorted.
    pub fn vertices(&self) -> Vec<Point3> {
        let mut points: Vec<Point3> = self.faces.iter().flat_map(|f| f.vertices.iter().cloned()).collect();
        points.sort();
        points.dedup();
        points
    }

    /// Part of the cell on the back side of `plane` (`n·p <= w`).
    ///
    /// `None` when that part has no volume.
    pub fn clip(&self, plane: &Plane) -> Option<ConvexCell> {
        let mut any_front = false;
        let mut any_back = false;
        for point in self.faces.iter().flat_map(|f| f.vertices.iter()) {
            match plane.side(point) {
                Side::Front => any_front = true,
                Side::Back => any_back = true,
                Side::On => {}
            }
        }
        if !any_front {
            return Some(self.clone());
        }
        if !any_back {
            return None;
        }

        let mut faces = Vec::with_capacity(self.faces.len() + 1);
        let mut cap_points: Vec<Point3> = Vec::new();
        for face in &self.faces {
            let sides: Vec<Side> = face.vertices.iter().map(|v| plane.side(v)).collect();
            let n = face.vertices.len();
            let mut kept = Vec::with_capacity(n + 1);
            let mut has_back = false;
            for i in 0..n {
                let j = (i + 1) % n;
                let (current, next) = (&face.vertices[i], &face.vertices[j]);
                match sides[i] {
                    Side::Back => {
                        has_back = true;
                        kept.push(current.clone());
                    }
                    Side::On => {
                        cap_points.push(current.clone());
                        kept.push(current.clone());
                    }
                    Side::Front => {}
                }
                let crosses = matches!(
                    (sides[i], sides[j]),
                    (Side::Front, Side::Back) | (Side::Back, Side::Front)
                );
                if crosses {
                    let hit = plane.intersect_segment(current, next);
                    cap_points.push(hit.clone());
                    kept.push(hit);
                }
            }
            if has_back {
                faces.push(CellFace {
                    plane: face.plane.clone(),
                    vertices: kept,
                });
            }
        }

        let projection = Projection::along(plane.normal());
        cap_points.sort();
        cap_points.dedup();
        let flat: Vec<Point2> = cap_points.iter().map(|p| projection.apply(p)).collect();
        let hull = convex_hull(&flat);
        if hull.len() >= 3 {
            faces.push(CellFace {
                plane: plane.clone(),
                vertices: hull.into_iter().map(|i| cap_points[i].clone()).collect(),
            });
        }

        Self::from_faces(faces)
    }

    /// Front and back parts of the cell with respect to `plane`.
    pub fn split(&self, plane: &Plane) -> (Option<ConvexCell>, Option<ConvexCell>) {
        (self.clip(&plane.flipped()), self.clip(plane))
    }

    /// Common part of two cells, `None` if it has no volume.
    pub fn intersect(&self, other: &ConvexCell) -> Option<ConvexCell> {
        if !self.bbox.overlaps(&other.bbox) {
            return None;
        }
        let mut result = self.clone();
        for face in &other.faces {
            result = result.clip(&face.plane)?;
        }
        Some(result)
    }

    /// `self` minus `other` as interior-disjoint convex pieces.
    pub fn subtract(&self, other: &ConvexCell) -> Vec<ConvexCell> {
        if self.intersect(other).is_none() {
            return vec![self.clone()];
        }

        let mut pieces = Vec::new();
        let mut rest = self.clone();
        for face in &other.faces {
            if let Some(outside) = rest.clip(&face.plane.flipped()) {
                pieces.push(outside);
            }
            match rest.clip(&face.plane) {
                Some(inside) => rest = inside,
                None => break,
            }
        }
        // What is left of `rest` lies inside `other`.
        pieces
    }

    /// Exact volume.
    pub fn volume(&self) -> Scalar {
        let origin = Point3::origin();
        let mut total = Scalar::zero();
        for face in &self.faces {
            let v0 = &face.vertices[0];
            for pair in face.vertices[1..].windows(2) {
                total += oriented_volume(&origin, v0, &pair[0], &pair[1]);
            }
        }
        total / scalar(6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::exact::ratio;
    use crate::geometry::point::Vector3;

    fn cube(lo: i64, hi: i64) -> ConvexCell {
        ConvexCell::from_box(&BoundingBox::new(
            Point3::from_ints(lo, lo, lo),
            Point3::from_ints(hi, hi, hi),
        ))
        .unwrap()
    }

    #[test]
    fn test_box_cell_volume() {
        assert_eq!(cube(0, 2).volume(), scalar(8));
        assert_eq!(cube(0, 2).vertices().len(), 8);
        assert!(ConvexCell::from_box(&BoundingBox::new(Point3::origin(), Point3::from_ints(1, 1, 0))).is_none());
    }

    #[test]
    fn test_clip_through_middle() {
        let plane = Plane::new(Vector3::from_ints(1, 0, 0), scalar(1)).unwrap();
        let (front, back) = cube(0, 2).split(&plane);
        assert_eq!(front.unwrap().volume(), scalar(4));
        let back = back.unwrap();
        assert_eq!(back.volume(), scalar(4));
        assert_eq!(back.faces().len(), 6);
    }

    #[test]
    fn test_clip_on_face_plane() {
        let plane = Plane::new(Vector3::from_ints(1, 0, 0), scalar(2)).unwrap();
        let cell = cube(0, 2);
        assert_eq!(cell.clip(&plane).unwrap().volume(), scalar(8));
        assert!(cell.clip(&plane.flipped()).is_none());
    }

    #[test]
    fn test_diagonal_cut_is_exact() {
        // x + y + z <= 1 keeps the corner tetrahedron of the unit cube.
        let plane = Plane::new(Vector3::from_ints(1, 1, 1), scalar(1)).unwrap();
        let corner = cube(0, 1).clip(&plane).unwrap();
        assert_eq!(corner.volume(), ratio(1, 6));
        assert_eq!(corner.vertices().len(), 4);
    }

    #[test]
    fn test_subtract_pieces_are_disjoint() {
        let a = cube(0, 3);
        let b = cube(1, 2);
        let pieces = a.subtract(&b);
        let total = pieces.iter().fold(Scalar::zero(), |acc, c| acc + c.volume());
        assert_eq!(total, scalar(26));
        for (i, p) in pieces.iter().enumerate() {
            for q in &pieces[i + 1..] {
                assert!(p.intersect(q).is_none());
            }
        }
    }

    #[test]
    fn test_touching_cells_do_not_intersect() {
        let a = cube(0, 1);
        let b = cube(1, 2);
        assert!(a.intersect(&b).is_none());
        assert_eq!(a.subtract(&b).len(), 1);
    }
}
