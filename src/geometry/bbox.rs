// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounding box utilities

use super::exact::Scalar;
use super::point::{Point3, Vector3};

/// Exact axis-aligned bounding box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundingBox {
    pub min: Point3,
    pub max: Point3,
}

impl BoundingBox {
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Smallest box holding every point, `None` for no points.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = Self::new(first.clone(), first.clone());
        for point in iter {
            bbox.expand_to_include(point);
        }
        Some(bbox)
    }

    pub fn expand_to_include(&mut self, point: &Point3) {
        if point.x < self.min.x {
            self.min.x = point.x.clone();
        }
        if point.y < self.min.y {
            self.min.y = point.y.clone();
        }
        if point.z < self.min.z {
            self.min.z = point.z.clone();
        }

        if point.x > self.max.x {
            self.max.x = point.x.clone();
        }
        if point.y > self.max.y {
            self.max.y = point.y.clone();
        }
        if point.z > self.max.z {
            self.max.z = point.z.clone();
        }
    }

    pub fn merge(&mut self, other: &BoundingBox) {
        self.expand_to_include(&other.min);
        self.expand_to_include(&other.max);
    }

    /// Box grown by `margin` on every side.
    pub fn expanded(&self, margin: &Scalar) -> BoundingBox {
        let grow = Vector3::new(margin.clone(), margin.clone(), margin.clone());
        BoundingBox::new(self.min.translate(&-&grow), self.max.translate(&grow))
    }

    pub fn contains(&self, point: &Point3) -> bool {
        point.x >= self.min.x
            && point.y >= self.min.y
            && point.z >= self.min.z
            && point.x <= self.max.x
            && point.y <= self.max.y
            && point.z <= self.max.z
    }

    /// Interiors overlap. Boxes that only share a face, edge or corner do not.
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
            && self.min.z < other.max.z
            && other.min.z < self.max.z
    }

    /// Closed boxes share at least one point.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
            && self.min.z <= other.max.z
            && other.min.z <= self.max.z
    }

    pub fn center(&self) -> Point3 {
        self.min.midpoint(&self.max)
    }

    pub fn size(&self) -> Vector3 {
        &self.max - &self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::exact::scalar;

    #[test]
    fn test_bounding_box() {
        let points = [Point3::from_ints(1, 2, 3), Point3::from_ints(-1, -2, -3)];
        let bbox = BoundingBox::from_points(&points).unwrap();

        assert_eq!(bbox.min, Point3::from_ints(-1, -2, -3));
        assert_eq!(bbox.max, Point3::from_ints(1, 2, 3));
        assert_eq!(bbox.center(), Point3::origin());
        assert_eq!(bbox.size(), Vector3::from_ints(2, 4, 6));
        assert!(BoundingBox::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_touching_boxes_do_not_overlap() {
        let a = BoundingBox::new(Point3::from_ints(0, 0, 0), Point3::from_ints(1, 1, 1));
        let b = BoundingBox::new(Point3::from_ints(1, 0, 0), Point3::from_ints(2, 1, 1));
        assert!(!a.overlaps(&b));
        assert!(a.intersects(&b));
        assert!(a.expanded(&scalar(1)).overlaps(&b));
        assert!(a.expanded(&scalar(1)).contains(&Point3::from_ints(2, 2, 2)));
    }
}
