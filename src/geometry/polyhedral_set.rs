// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Exact polyhedral sets and their Boolean algebra

use super::boundary::{boundary_faces, FaceLoops};
use super::bsp::{BspNode, Polygon};
use super::exact::{scalar, Scalar};
use super::mesh::BoundaryMesh;
use super::point::Point3;
use super::polytope::ConvexCell;
use super::predicates::{orient2d, Projection};
use super::triangle_intersection::check_no_self_intersections;
use super::triangulate::triangulate_face;
use super::BoundingBox;
use crate::error::{Error, Result};
use num_traits::{Signed, Zero};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tracing::{debug, instrument};

/// Boolean combination operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanOp {
    Union,
    Difference,
    Intersection,
}

impl BooleanOp {
    /// `'+'` union, `'-'` difference, `'*'` intersection.
    pub fn from_symbol(symbol: char) -> Result<Self> {
        match symbol {
            '+' => Ok(Self::Union),
            '-' => Ok(Self::Difference),
            '*' => Ok(Self::Intersection),
            other => Err(Error::UnsupportedOperator(other.to_string())),
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Self::Union => '+',
            Self::Difference => '-',
            Self::Intersection => '*',
        }
    }
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Union => "union",
            Self::Difference => "difference",
            Self::Intersection => "intersection",
        };
        f.write_str(name)
    }
}

/// Regularized region of space stored as interior-disjoint convex cells.
///
/// Equality compares canonical boundaries, so two sets covering the same
/// region are equal however they were built.
#[derive(Debug, Clone, Default)]
pub struct ExactPolyhedralSet {
    cells: Vec<ConvexCell>,
}

impl ExactPolyhedralSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_cells(cells: Vec<ConvexCell>) -> Self {
        Self { cells }
    }

    /// Solid axis-aligned box. Empty if the box is flat.
    pub fn from_box(bounds: &BoundingBox) -> Self {
        Self::from_cells(ConvexCell::from_box(bounds).into_iter().collect())
    }

    /// Convert a closed, outward-oriented boundary mesh into a set.
    ///
    /// Duplicate coordinates are welded first. The mesh must then be
    /// edge-manifold with planar faces, and faces may only meet along the
    /// edges and vertices they share; nothing is repaired.
    #[instrument(level = "debug", skip_all, fields(vertices = mesh.vertex_count(), faces = mesh.face_count()))]
    pub fn from_boundary_mesh(mesh: &BoundaryMesh) -> Result<Self> {
        let mesh = mesh.welded()?;
        if mesh.is_empty() {
            return Ok(Self::empty());
        }

        let planes = mesh
            .faces
            .iter()
            .map(|face| mesh.face_plane(face))
            .collect::<Result<Vec<_>>>()?;
        mesh.check_closed_manifold()?;

        let volume6 = mesh.signed_volume6();
        if volume6.is_negative() {
            return Err(Error::InvalidBoundary(
                "faces are oriented inward (negative enclosed volume)".to_string(),
            ));
        }
        if volume6.is_zero() {
            debug!("boundary encloses no volume");
            return Ok(Self::empty());
        }
        check_no_self_intersections(&mesh, &planes)?;

        let mut polygons = Vec::with_capacity(mesh.face_count());
        for (face, plane) in mesh.faces.iter().zip(&planes) {
            if face.loops.len() == 1 && is_convex(&mesh.loop_points(face.outer()), &Projection::along(plane.normal())) {
                polygons.push(Polygon {
                    plane: plane.clone(),
                    vertices: mesh.loop_points(face.outer()),
                });
                continue;
            }
            for triangle in triangulate_face(&face.loops, &mesh.vertices, plane.normal())? {
                polygons.push(Polygon {
                    plane: plane.clone(),
                    vertices: triangle.iter().map(|&i| mesh.vertices[i].clone()).collect(),
                });
            }
        }

        let bounds = mesh
            .bounding_box()
            .and_then(|b| ConvexCell::from_box(&b.expanded(&scalar(1))))
            .ok_or_else(|| Error::InvalidBoundary("mesh has no extent".to_string()))?;
        let cells = match BspNode::build(polygons) {
            Some(tree) => {
                debug!(depth = tree.depth(), polygons = tree.polygon_count(), "built partition tree");
                tree.inside_cells(bounds)
            }
            None => Vec::new(),
        };
        debug!(cells = cells.len(), "decomposed boundary into convex cells");
        Ok(Self::from_cells(cells))
    }

    /// Canonical boundary: maximal planar faces, loops starting at their
    /// smallest point, holes and faces sorted.
    pub fn boundary_faces(&self) -> Vec<FaceLoops> {
        boundary_faces(&self.cells)
    }

    /// Boundary as an indexed mesh.
    ///
    /// Fails with `NonRegularResult` for the empty set and for regions whose
    /// boundary is not edge-manifold (for example two boxes sharing only an
    /// edge).
    pub fn to_boundary_mesh(&self) -> Result<BoundaryMesh> {
        if self.is_empty() {
            return Err(Error::NonRegularResult("the set is empty".to_string()));
        }
        let mesh = BoundaryMesh::from_polygons(self.boundary_faces());
        mesh.check_closed_manifold().map_err(|err| match err {
            Error::InvalidBoundary(message) => Error::NonRegularResult(message),
            other => other,
        })?;
        Ok(mesh)
    }

    pub fn combine(&self, other: &Self, op: BooleanOp) -> Self {
        match op {
            BooleanOp::Union => self.union(other),
            BooleanOp::Difference => self.difference(other),
            BooleanOp::Intersection => self.intersection(other),
        }
    }

    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return other.clone();
        }
        let mut cells = self.cells.clone();
        cells.extend(other.difference(self).cells);
        Self::from_cells(cells)
    }

    pub fn intersection(&self, other: &Self) -> Self {
        let mut cells = Vec::new();
        for a in &self.cells {
            for b in &other.cells {
                if let Some(common) = a.intersect(b) {
                    cells.push(common);
                }
            }
        }
        Self::from_cells(cells)
    }

    pub fn difference(&self, other: &Self) -> Self {
        let mut cells = Vec::with_capacity(self.cells.len());
        for cell in &self.cells {
            let mut pieces = vec![cell.clone()];
            for cutter in &other.cells {
                if !cell.bounding_box().overlaps(cutter.bounding_box()) {
                    continue;
                }
                pieces = pieces.into_iter().flat_map(|piece| piece.subtract(cutter)).collect();
                if pieces.is_empty() {
                    break;
                }
            }
            cells.extend(pieces);
        }
        Self::from_cells(cells)
    }

    /// Complement relative to a box: `bounds` minus `self`.
    pub fn complement_within(&self, bounds: &BoundingBox) -> Self {
        Self::from_box(bounds).difference(self)
    }

    /// Exact enclosed volume.
    pub fn volume(&self) -> Scalar {
        self.cells.iter().fold(Scalar::zero(), |acc, cell| acc + cell.volume())
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[ConvexCell] {
        &self.cells
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut cells = self.cells.iter();
        let mut bbox = cells.next()?.bounding_box().clone();
        for cell in cells {
            bbox.merge(cell.bounding_box());
        }
        Some(bbox)
    }
}

impl PartialEq for ExactPolyhedralSet {
    fn eq(&self, other: &Self) -> bool {
        if self.is_empty() || other.is_empty() {
            return self.is_empty() == other.is_empty();
        }
        self.boundary_faces() == other.boundary_faces()
    }
}

impl Eq for ExactPolyhedralSet {}

fn is_convex(points: &[Point3], projection: &Projection) -> bool {
    let flat: Vec<_> = points.iter().map(|p| projection.apply(p)).collect();
    let n = flat.len();
    (0..n).all(|i| orient2d(&flat[i], &flat[(i + 1) % n], &flat[(i + 2) % n]) != Ordering::Less)
}
