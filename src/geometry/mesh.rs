// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boundary mesh representation and validation

use super::exact::Scalar;
use super::plane::Plane;
use super::point::Point3;
use super::predicates::oriented_volume;
use super::BoundingBox;
use crate::error::{Error, Result};
use ahash::AHashMap;
use num_traits::Zero;
use serde::Serialize;
use std::collections::BTreeMap;

/// Planar face: an outer loop followed by zero or more hole loops.
///
/// The outer loop is counter-clockwise seen from outside the solid, holes
/// run the other way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Face {
    pub loops: Vec<Vec<usize>>,
}

impl Face {
    pub fn new(outer: Vec<usize>) -> Self {
        Self { loops: vec![outer] }
    }

    pub fn with_holes(outer: Vec<usize>, holes: Vec<Vec<usize>>) -> Self {
        let mut loops = Vec::with_capacity(holes.len() + 1);
        loops.push(outer);
        loops.extend(holes);
        Self { loops }
    }

    pub fn outer(&self) -> &[usize] {
        self.loops.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn holes(&self) -> &[Vec<usize>] {
        self.loops.get(1..).unwrap_or(&[])
    }

    /// Directed edges of every loop.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.loops.iter().flat_map(|indices| {
            let n = indices.len();
            (0..n).map(move |i| (indices[i], indices[(i + 1) % n]))
        })
    }
}

/// Indexed polygonal boundary mesh
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundaryMesh {
    pub vertices: Vec<Point3>,
    pub faces: Vec<Face>,
}

impl BoundaryMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Build a mesh from faces given as point loops, sharing equal points.
    pub fn from_polygons<I>(polygons: I) -> Self
    where
        I: IntoIterator<Item = Vec<Vec<Point3>>>,
    {
        let mut mesh = Self::new();
        let mut lookup: AHashMap<Point3, usize> = AHashMap::new();
        for polygon in polygons {
            let mut loops = Vec::with_capacity(polygon.len());
            for points in polygon {
                let mut indices = Vec::with_capacity(points.len());
                for point in points {
                    let index = match lookup.get(&point) {
                        Some(&index) => index,
                        None => {
                            let index = mesh.add_vertex(point.clone());
                            lookup.insert(point, index);
                            index
                        }
                    };
                    indices.push(index);
                }
                loops.push(indices);
            }
            mesh.faces.push(Face { loops });
        }
        mesh
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, point: Point3) -> usize {
        self.vertices.push(point);
        self.vertices.len() - 1
    }

    pub fn add_face(&mut self, face: Face) {
        self.faces.push(face);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.vertices)
    }

    /// Points of one loop. Indices must be valid.
    pub fn loop_points(&self, indices: &[usize]) -> Vec<Point3> {
        indices.iter().map(|&i| self.vertices[i].clone()).collect()
    }

    /// Every loop of every face as points.
    pub fn face_points(&self, face: &Face) -> Vec<Vec<Point3>> {
        face.loops.iter().map(|l| self.loop_points(l)).collect()
    }

    /// Fail with `InvalidBoundary` if any face refers past the vertex table.
    pub fn check_indices(&self) -> Result<()> {
        for (face_index, face) in self.faces.iter().enumerate() {
            if face.loops.is_empty() {
                return Err(Error::InvalidBoundary(format!("face {face_index} has no loops")));
            }
            for &index in face.loops.iter().flatten() {
                if index >= self.vertices.len() {
                    return Err(Error::InvalidBoundary(format!(
                        "face {face_index} references vertex {index} but the mesh has {} vertices",
                        self.vertices.len()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Copy with exact duplicate coordinates merged and repeated consecutive
    /// indices removed. Loops left with fewer than three vertices fail.
    pub fn welded(&self) -> Result<BoundaryMesh> {
        self.check_indices()?;

        let mut lookup: AHashMap<&Point3, usize> = AHashMap::new();
        let mut vertices = Vec::new();
        let mut remap = Vec::with_capacity(self.vertices.len());
        for point in &self.vertices {
            let index = *lookup.entry(point).or_insert_with(|| {
                vertices.push(point.clone());
                vertices.len() - 1
            });
            remap.push(index);
        }

        let mut faces = Vec::with_capacity(self.faces.len());
        for (face_index, face) in self.faces.iter().enumerate() {
            let mut loops = Vec::with_capacity(face.loops.len());
            for indices in &face.loops {
                let mut welded: Vec<usize> = indices.iter().map(|&i| remap[i]).collect();
                welded.dedup();
                while welded.len() > 1 && welded.first() == welded.last() {
                    welded.pop();
                }
                if welded.len() < 3 {
                    return Err(Error::InvalidBoundary(format!(
                        "face {face_index} has a loop with fewer than three distinct vertices"
                    )));
                }
                loops.push(welded);
            }
            faces.push(Face { loops });
        }

        Ok(BoundaryMesh { vertices, faces })
    }

    /// Exact supporting plane of a face.
    ///
    /// The orientation comes from the outer loop's Newell normal; every
    /// vertex of every loop must lie on it.
    pub fn face_plane(&self, face: &Face) -> Result<Plane> {
        let outer = self.loop_points(face.outer());
        let plane = Plane::from_polygon(&outer)
            .ok_or_else(|| Error::InvalidBoundary("face has zero area".to_string()))?;
        for &index in face.loops.iter().flatten() {
            if !plane.contains(&self.vertices[index]) {
                return Err(Error::InvalidBoundary(format!(
                    "face is not planar: vertex {} lies off its plane",
                    self.vertices[index]
                )));
            }
        }
        Ok(plane)
    }

    /// Fail unless every directed edge appears exactly once and its reverse
    /// exactly once.
    pub fn check_closed_manifold(&self) -> Result<()> {
        let mut counts: BTreeMap<(usize, usize), usize> = BTreeMap::new();
        for face in &self.faces {
            for edge in face.edges() {
                *counts.entry(edge).or_insert(0) += 1;
            }
        }

        for (&(from, to), &count) in &counts {
            if count > 1 {
                return Err(Error::InvalidBoundary(format!(
                    "edge {} -> {} is used by {count} faces with the same orientation",
                    self.vertices[from], self.vertices[to]
                )));
            }
            match counts.get(&(to, from)) {
                Some(1) => {}
                Some(_) => {
                    return Err(Error::InvalidBoundary(format!(
                        "edge {} - {} is shared by more than two faces",
                        self.vertices[from], self.vertices[to]
                    )))
                }
                None => {
                    return Err(Error::InvalidBoundary(format!(
                        "edge {} -> {} has no opposite half-edge; the surface is open or inconsistently oriented",
                        self.vertices[from], self.vertices[to]
                    )))
                }
            }
        }
        Ok(())
    }

    /// Six times the signed enclosed volume. Positive for outward-facing
    /// closed surfaces.
    pub fn signed_volume6(&self) -> Scalar {
        let origin = Point3::origin();
        let mut total = Scalar::zero();
        for face in &self.faces {
            for indices in &face.loops {
                let v0 = &self.vertices[indices[0]];
                for window in indices[1..].windows(2) {
                    let (v1, v2) = (&self.vertices[window[0]], &self.vertices[window[1]]);
                    total += oriented_volume(&origin, v0, v1, v2);
                }
            }
        }
        total
    }
}
