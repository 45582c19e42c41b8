// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Half-edge and half-facet tables for a boundary mesh
//!
//! Vertices are renumbered by first occurrence, so indexing the same mesh
//! twice gives identical tables. Twins are indices into the arena tables,
//! `None` where no opposite element exists.

use super::mesh::BoundaryMesh;
use super::point::Point3;
use crate::error::{Error, Result};
use ahash::AHashMap;
use num_traits::Signed;
use serde::Serialize;

/// Half-edge in a half-edge mesh
/// Each edge has two half-edges, one for each direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HalfEdge {
    pub source: usize,
    pub target: usize,
    /// Opposite half-edge (target -> source), if some loop emits it
    pub twin: Option<usize>,
    /// Facet whose loop contains this half-edge
    pub facet: usize,
    /// Next half-edge in the same loop
    pub next: usize,
    /// Previous half-edge in the same loop
    pub prev: usize,
}

/// Oriented facet: an outer loop and its holes, as vertex indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HalfFacet {
    pub loops: Vec<Vec<usize>>,
    /// Facet with the same loops traversed the other way
    pub twin: Option<usize>,
    /// Loops wind counter-clockwise seen from outside the enclosed volume.
    /// Faces of an open surface enclose nothing and count as outward.
    pub outward: bool,
}

/// Read-only adjacency index over a boundary mesh
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologyIndex {
    vertices: Vec<Point3>,
    vertex_lookup: AHashMap<Point3, usize>,
    half_edges: Vec<HalfEdge>,
    half_edge_lookup: AHashMap<(usize, usize), usize>,
    outgoing: Vec<Vec<usize>>,
    facets: Vec<HalfFacet>,
}

impl TopologyIndex {
    /// Index a mesh.
    ///
    /// Fails with `InconsistentOrientation` if two loops traverse the same
    /// directed edge, and with `InvalidBoundary` for out-of-range indices.
    pub fn build(mesh: &BoundaryMesh) -> Result<Self> {
        mesh.check_indices()?;
        let mut index = Self::default();

        let mut facet_loops = Vec::with_capacity(mesh.face_count());
        for face in &mesh.faces {
            let mut loops = Vec::with_capacity(face.loops.len());
            for indices in &face.loops {
                let mut renumbered: Vec<usize> = indices
                    .iter()
                    .map(|&i| index.intern_vertex(&mesh.vertices[i]))
                    .collect();
                renumbered.dedup();
                while renumbered.len() > 1 && renumbered.first() == renumbered.last() {
                    renumbered.pop();
                }
                loops.push(renumbered);
            }
            facet_loops.push(loops);
        }

        index.outgoing = vec![Vec::new(); index.vertices.len()];
        for (facet, loops) in facet_loops.iter().enumerate() {
            for indices in loops {
                index.index_loop(facet, indices)?;
            }
        }
        for i in 0..index.half_edges.len() {
            let HalfEdge { source, target, .. } = index.half_edges[i];
            index.half_edges[i].twin = index.half_edge_lookup.get(&(target, source)).copied();
        }

        // A closed surface with negative volume is turned inside out.
        let outward = !index.is_closed() || !mesh.signed_volume6().is_negative();
        index.index_facets(facet_loops, outward);
        Ok(index)
    }

    fn intern_vertex(&mut self, point: &Point3) -> usize {
        if let Some(&i) = self.vertex_lookup.get(point) {
            return i;
        }
        self.vertices.push(point.clone());
        self.vertex_lookup.insert(point.clone(), self.vertices.len() - 1);
        self.vertices.len() - 1
    }

    fn index_loop(&mut self, facet: usize, indices: &[usize]) -> Result<()> {
        let n = indices.len();
        let first = self.half_edges.len();
        for i in 0..n {
            let (source, target) = (indices[i], indices[(i + 1) % n]);
            let id = first + i;
            if self.half_edge_lookup.insert((source, target), id).is_some() {
                return Err(Error::InconsistentOrientation { from: source, to: target });
            }
            self.half_edges.push(HalfEdge {
                source,
                target,
                twin: None,
                facet,
                next: first + (i + 1) % n,
                prev: first + (i + n - 1) % n,
            });
            self.outgoing[source].push(id);
        }
        Ok(())
    }

    fn index_facets(&mut self, facet_loops: Vec<Vec<Vec<usize>>>, outward: bool) {
        let keys: Vec<Vec<Vec<usize>>> = facet_loops.iter().map(|loops| loop_key(loops, false)).collect();
        let mut lookup: AHashMap<&Vec<Vec<usize>>, usize> = AHashMap::new();
        for (i, key) in keys.iter().enumerate() {
            lookup.entry(key).or_insert(i);
        }

        let twins: Vec<Option<usize>> = facet_loops
            .iter()
            .enumerate()
            .map(|(i, loops)| {
                let reversed = loop_key(loops, true);
                lookup.get(&reversed).copied().filter(|&j| j != i)
            })
            .collect();

        self.facets = facet_loops
            .into_iter()
            .zip(twins)
            .map(|(loops, twin)| HalfFacet { loops, twin, outward })
            .collect();
    }

    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    pub fn half_edges(&self) -> &[HalfEdge] {
        &self.half_edges
    }

    pub fn facets(&self) -> &[HalfFacet] {
        &self.facets
    }

    pub fn vertex_index(&self, point: &Point3) -> Option<usize> {
        self.vertex_lookup.get(point).copied()
    }

    pub fn half_edge_index(&self, source: usize, target: usize) -> Option<usize> {
        self.half_edge_lookup.get(&(source, target)).copied()
    }

    /// Half-edges leaving `vertex`, in emission order.
    pub fn outgoing(&self, vertex: usize) -> &[usize] {
        self.outgoing.get(vertex).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Facet of a half-edge and the facet across its twin.
    pub fn facets_of_edge(&self, half_edge: usize) -> Option<(usize, Option<usize>)> {
        let he = self.half_edges.get(half_edge)?;
        Some((he.facet, he.twin.map(|t| self.half_edges[t].facet)))
    }

    /// One half-edge per undirected edge: the lower index of each twin pair,
    /// plus every half-edge without a twin.
    pub fn edges(&self) -> Vec<usize> {
        self.half_edges
            .iter()
            .enumerate()
            .filter(|(i, he)| he.twin.map_or(true, |t| t > *i))
            .map(|(i, _)| i)
            .collect()
    }

    /// Every half-edge has a twin.
    pub fn is_closed(&self) -> bool {
        self.half_edges.iter().all(|he| he.twin.is_some())
    }
}

/// Rotation- and hole-order-independent key of a facet's loops.
fn loop_key(loops: &[Vec<usize>], reversed: bool) -> Vec<Vec<usize>> {
    let mut keyed: Vec<Vec<usize>> = loops
        .iter()
        .map(|indices| {
            let mut cycle = indices.clone();
            if reversed {
                cycle.reverse();
            }
            if let Some(start) = cycle.iter().enumerate().min_by_key(|(_, &v)| v).map(|(i, _)| i) {
                cycle.rotate_left(start);
            }
            cycle
        })
        .collect();
    if keyed.len() > 2 {
        keyed[1..].sort();
    }
    keyed
}
