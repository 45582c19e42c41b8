// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Algebraic identities of the exact Boolean operations

use anyhow::Result;
use polyset::geometry::exact::{ratio, scalar};
use polyset::{extrude, BoundingBox, ExactPolyhedralSet, Point3, Vector3};

fn cube(min: i64, max: i64) -> ExactPolyhedralSet {
    ExactPolyhedralSet::from_box(&BoundingBox::new(
        Point3::from_ints(min, min, min),
        Point3::from_ints(max, max, max),
    ))
}

/// Triangular prism leaning along x, bottom at z = 1/2.
fn wedge() -> Result<ExactPolyhedralSet> {
    let half = ratio(1, 2);
    let triangle = [
        Point3::new(scalar(0), scalar(0), half.clone()),
        Point3::new(scalar(3), scalar(0), half.clone()),
        Point3::new(scalar(0), scalar(3), half),
    ];
    Ok(extrude(&triangle, &Vector3::from_ints(1, 0, 2))?)
}

/// Vertical triangular prism shaving the x = y = 2 edge off `cube(0, 2)`.
fn chamfer() -> Result<ExactPolyhedralSet> {
    let triangle = [
        Point3::from_ints(0, 3, -1),
        Point3::from_ints(3, 0, -1),
        Point3::from_ints(3, 3, -1),
    ];
    Ok(extrude(&triangle, &Vector3::from_ints(0, 0, 4))?)
}

#[test]
fn test_idempotence() -> Result<()> {
    let a = cube(0, 2);
    let w = wedge()?;
    assert_eq!(a.union(&a), a);
    assert_eq!(a.intersection(&a), a);
    assert!(a.difference(&a).is_empty());
    assert_eq!(w.union(&w), w);
    assert!(w.difference(&w).is_empty());
    Ok(())
}

#[test]
fn test_commutativity() -> Result<()> {
    let a = cube(0, 2);
    let w = wedge()?;
    assert_eq!(a.union(&w), w.union(&a));
    assert_eq!(a.intersection(&w), w.intersection(&a));
    assert_ne!(a.difference(&w), w.difference(&a));
    Ok(())
}

#[test]
fn test_associativity() -> Result<()> {
    let a = cube(0, 2);
    let b = cube(1, 3);
    let w = wedge()?;
    assert_eq!(a.union(&b).union(&w), a.union(&b.union(&w)));
    assert_eq!(a.intersection(&b).intersection(&w), a.intersection(&b.intersection(&w)));
    assert_ne!(a.difference(&b).difference(&w), a.difference(&b.difference(&w)));
    Ok(())
}

#[test]
fn test_absorption() -> Result<()> {
    let a = cube(0, 2);
    let w = wedge()?;
    assert_eq!(a.intersection(&a.union(&w)), a);
    assert_eq!(a.union(&a.intersection(&w)), a);
    Ok(())
}

#[test]
fn test_exact_volumes() -> Result<()> {
    let a = cube(0, 2);
    let b = cube(1, 3);
    assert_eq!(a.union(&b).volume(), scalar(15));
    assert_eq!(a.intersection(&b).volume(), scalar(1));
    assert_eq!(a.difference(&b).volume(), scalar(7));

    // Base area 9/2, height 2.
    let w = wedge()?;
    assert_eq!(w.volume(), scalar(9));
    assert_eq!(a.union(&w).volume() + a.intersection(&w).volume(), a.volume() + w.volume());
    assert_eq!(a.difference(&w).volume() + a.intersection(&w).volume(), a.volume());

    // The chamfer removes a right triangle with legs 1 over height 2.
    assert_eq!(a.difference(&chamfer()?).volume(), scalar(7));
    Ok(())
}

#[test]
fn test_complement_within_bounds() -> Result<()> {
    let a = cube(1, 2);
    let bounds = BoundingBox::new(Point3::from_ints(0, 0, 0), Point3::from_ints(3, 3, 3));
    let outside = a.complement_within(&bounds);
    assert_eq!(outside.volume(), scalar(26));
    assert!(outside.intersection(&a).is_empty());
    assert_eq!(outside.union(&a), ExactPolyhedralSet::from_box(&bounds));
    Ok(())
}

#[test]
fn test_boundary_round_trip() -> Result<()> {
    let shapes = [cube(0, 2).union(&cube(1, 3)), cube(0, 2).difference(&chamfer()?), wedge()?];
    for shape in shapes {
        let mesh = shape.to_boundary_mesh()?;
        let back = ExactPolyhedralSet::from_boundary_mesh(&mesh)?;
        assert_eq!(back, shape);
        assert_eq!(back.to_boundary_mesh()?, mesh);
    }
    Ok(())
}
