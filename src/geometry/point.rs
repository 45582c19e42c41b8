// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Exact points and vectors

use super::exact::{display_scalar, from_f64, scalar, to_f64, Scalar};
use num_traits::Zero;
use serde::ser::{Serialize, SerializeTuple, Serializer};
use std::fmt;
use std::ops::{Add, Neg, Sub};

/// Point with exact rational coordinates.
///
/// Ordering is lexicographic on (x, y, z), which gives every canonical
/// ordering in the kernel a deterministic tie-break.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point3 {
    pub x: Scalar,
    pub y: Scalar,
    pub z: Scalar,
}

impl Point3 {
    pub fn new(x: Scalar, y: Scalar, z: Scalar) -> Self {
        Self { x, y, z }
    }

    pub fn from_ints(x: i64, y: i64, z: i64) -> Self {
        Self::new(scalar(x), scalar(y), scalar(z))
    }

    /// Exact conversion from floats; `None` if a coordinate is not finite.
    pub fn try_from_f64(x: f64, y: f64, z: f64) -> Option<Self> {
        Some(Self::new(from_f64(x)?, from_f64(y)?, from_f64(z)?))
    }

    pub fn origin() -> Self {
        Self::new(Scalar::zero(), Scalar::zero(), Scalar::zero())
    }

    /// Nearest floating point position.
    pub fn to_f64(&self) -> nalgebra::Point3<f64> {
        nalgebra::Point3::new(to_f64(&self.x), to_f64(&self.y), to_f64(&self.z))
    }

    pub fn translate(&self, offset: &Vector3) -> Point3 {
        Point3::new(&self.x + &offset.x, &self.y + &offset.y, &self.z + &offset.z)
    }

    /// Point at parameter `t` on the segment from `self` to `other`.
    pub fn lerp(&self, other: &Point3, t: &Scalar) -> Point3 {
        self.translate(&(other - self).scale(t))
    }

    pub fn midpoint(&self, other: &Point3) -> Point3 {
        let two = scalar(2);
        Point3::new(
            (&self.x + &other.x) / &two,
            (&self.y + &other.y) / &two,
            (&self.z + &other.z) / &two,
        )
    }

    /// Coordinates as a vector from the origin.
    pub fn coords(&self) -> Vector3 {
        Vector3::new(self.x.clone(), self.y.clone(), self.z.clone())
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            display_scalar(&self.x),
            display_scalar(&self.y),
            display_scalar(&self.z)
        )
    }
}

impl Serialize for Point3 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(3)?;
        tuple.serialize_element(&display_scalar(&self.x))?;
        tuple.serialize_element(&display_scalar(&self.y))?;
        tuple.serialize_element(&display_scalar(&self.z))?;
        tuple.end()
    }
}

impl Sub for &Point3 {
    type Output = Vector3;

    fn sub(self, other: &Point3) -> Vector3 {
        Vector3::new(&self.x - &other.x, &self.y - &other.y, &self.z - &other.z)
    }
}

impl Add<&Vector3> for &Point3 {
    type Output = Point3;

    fn add(self, offset: &Vector3) -> Point3 {
        self.translate(offset)
    }
}

/// Exact direction or displacement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Vector3 {
    pub x: Scalar,
    pub y: Scalar,
    pub z: Scalar,
}

impl Vector3 {
    pub fn new(x: Scalar, y: Scalar, z: Scalar) -> Self {
        Self { x, y, z }
    }

    pub fn from_ints(x: i64, y: i64, z: i64) -> Self {
        Self::new(scalar(x), scalar(y), scalar(z))
    }

    pub fn try_from_f64(x: f64, y: f64, z: f64) -> Option<Self> {
        Some(Self::new(from_f64(x)?, from_f64(y)?, from_f64(z)?))
    }

    pub fn zero() -> Self {
        Self::new(Scalar::zero(), Scalar::zero(), Scalar::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.x.is_zero() && self.y.is_zero() && self.z.is_zero()
    }

    pub fn dot(&self, other: &Vector3) -> Scalar {
        &self.x * &other.x + &self.y * &other.y + &self.z * &other.z
    }

    pub fn cross(&self, other: &Vector3) -> Vector3 {
        Vector3::new(
            &self.y * &other.z - &self.z * &other.y,
            &self.z * &other.x - &self.x * &other.z,
            &self.x * &other.y - &self.y * &other.x,
        )
    }

    pub fn scale(&self, factor: &Scalar) -> Vector3 {
        Vector3::new(&self.x * factor, &self.y * factor, &self.z * factor)
    }

    pub fn to_f64(&self) -> nalgebra::Vector3<f64> {
        nalgebra::Vector3::new(to_f64(&self.x), to_f64(&self.y), to_f64(&self.z))
    }
}

impl Neg for &Vector3 {
    type Output = Vector3;

    fn neg(self) -> Vector3 {
        Vector3::new(-&self.x, -&self.y, -&self.z)
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{}, {}, {}>",
            display_scalar(&self.x),
            display_scalar(&self.y),
            display_scalar(&self.z)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::exact::ratio;

    #[test]
    fn test_point_equality_is_exact() {
        let a = Point3::new(ratio(1, 10), scalar(0), scalar(0));
        let b = Point3::try_from_f64(0.1, 0.0, 0.0).unwrap();
        // 0.1f64 is not one tenth.
        assert_ne!(a, b);
        assert_eq!(a, Point3::new(ratio(2, 20), scalar(0), scalar(0)));
    }

    #[test]
    fn test_lexicographic_order() {
        let mut points = vec![
            Point3::from_ints(1, 0, 0),
            Point3::from_ints(0, 2, 0),
            Point3::from_ints(0, 1, 5),
        ];
        points.sort();
        assert_eq!(points[0], Point3::from_ints(0, 1, 5));
        assert_eq!(points[2], Point3::from_ints(1, 0, 0));
    }

    #[test]
    fn test_vector_algebra() {
        let x = Vector3::from_ints(1, 0, 0);
        let y = Vector3::from_ints(0, 1, 0);
        assert_eq!(x.cross(&y), Vector3::from_ints(0, 0, 1));
        assert_eq!(x.dot(&y), scalar(0));

        let p = Point3::from_ints(1, 1, 1);
        let q = Point3::from_ints(3, 1, 1);
        assert_eq!(&q - &p, Vector3::from_ints(2, 0, 0));
        assert_eq!(p.lerp(&q, &ratio(1, 2)), Point3::from_ints(2, 1, 1));
        assert_eq!(p.midpoint(&q), Point3::from_ints(2, 1, 1));
    }

    #[test]
    fn test_display_uses_exact_text() {
        let p = Point3::new(ratio(1, 4), ratio(1, 3), scalar(-2));
        assert_eq!(p.to_string(), "(0.25, 1/3, -2)");
    }
}
