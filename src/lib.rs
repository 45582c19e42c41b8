// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyset
//!
//! Exact polyhedral sets with regularized Boolean operations, prism
//! extrusion and half-edge topology queries. Every coordinate is an
//! arbitrary-precision rational, so no intersection is missed and no face
//! degenerates through rounding.

pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod scene;

pub use command::Command;
pub use config::SceneConfig;
pub use error::{Error, Result};
pub use geometry::{
    BooleanOp, BoundaryMesh, BoundingBox, ExactPolyhedralSet, Face, Point3, PolygonSampling, Scalar,
    TopologyIndex, Vector3,
};
pub use io::{
    convert_file, parse_boundary_mesh, read_mesh_file, serialize_boundary_mesh, write_mesh_file, InexactPolicy,
    MeshFormat, WriteOptions,
};
pub use scene::{CommandOutput, EdgeListing, FacetListing, Scene, SceneState, VertexListing};

/// Extrude a profile into a prism and return it as an exact set
pub fn extrude(profile: &[Point3], direction: &Vector3) -> Result<ExactPolyhedralSet> {
    let mesh = geometry::prism_mesh(profile, direction)?;
    ExactPolyhedralSet::from_boundary_mesh(&mesh)
}
