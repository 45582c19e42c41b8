// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - exact kernel, polyhedral sets and topology

pub mod exact;
pub mod predicates;
mod point;
mod plane;
mod bbox;
mod mesh;
mod triangulate;
mod polytope;
mod bsp;
mod boundary;
mod polyhedral_set;
mod primitives;
mod halfedge;
mod triangle_intersection;
mod sampling;

pub use bbox::BoundingBox;
pub use boundary::FaceLoops;
pub use exact::Scalar;
pub use halfedge::{HalfEdge, HalfFacet, TopologyIndex};
pub use mesh::{BoundaryMesh, Face};
pub use plane::{newell_normal, Plane, Side};
pub use point::{Point3, Vector3};
pub use polyhedral_set::{BooleanOp, ExactPolyhedralSet};
pub use polytope::ConvexCell;
pub use primitives::{cuboid_mesh, prism_mesh};
pub use sampling::{random_polygon_in_face, PolygonSampling};
pub use triangulate::triangulate_face;
