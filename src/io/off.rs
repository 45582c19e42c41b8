// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! OFF reader and writer using pest

use super::{output_polygons, pest_line, CoordinateWriter, MeshFormat, WriteOptions};
use crate::error::{Error, Result};
use crate::geometry::exact::parse_scalar;
use crate::geometry::{BoundaryMesh, Face, Point3, Scalar};
use ahash::AHashSet;
use pest::Parser;
use pest_derive::Parser;
use std::io::{self, Write};
use tracing::debug;

const FORMAT: &str = "OFF";

#[derive(Parser)]
#[grammar = "io/off.pest"]
struct OffParser;

/// One line of numbers with its source line for error messages.
struct Row<'i> {
    line: usize,
    numbers: Vec<&'i str>,
}

impl<'i> Row<'i> {
    fn from_pair(pair: pest::iterators::Pair<'i, Rule>) -> Self {
        let line = pair.as_span().start_pos().line_col().0;
        let numbers = pair.into_inner().map(|p| p.as_str()).collect();
        Self { line, numbers }
    }

    fn field(&self, i: usize, what: &str) -> Result<&'i str> {
        self.numbers
            .get(i)
            .copied()
            .ok_or_else(|| Error::parse(FORMAT, Some(self.line), format!("missing {what}")))
    }

    fn scalar(&self, i: usize) -> Result<Scalar> {
        let text = self.field(i, "coordinate")?;
        parse_scalar(text).map_err(|e| Error::parse(FORMAT, Some(self.line), e.to_string()))
    }

    fn count(&self, i: usize, what: &str) -> Result<usize> {
        let text = self.field(i, what)?;
        text.parse()
            .map_err(|_| Error::parse(FORMAT, Some(self.line), format!("{what} '{text}' is not a non-negative integer")))
    }
}

pub(super) fn parse(source: &str) -> Result<BoundaryMesh> {
    let file = OffParser::parse(Rule::file, source)
        .map_err(|e| Error::parse(FORMAT, Some(pest_line(&e)), e.variant.message()))?
        .next()
        .ok_or_else(|| Error::parse(FORMAT, None, "empty input"))?;

    let mut rows = file
        .into_inner()
        .filter(|pair| pair.as_rule() == Rule::row)
        .map(Row::from_pair)
        .collect::<Vec<_>>()
        .into_iter();

    let counts = rows
        .next()
        .ok_or_else(|| Error::parse(FORMAT, None, "missing vertex and face counts"))?;
    let vertex_count = counts.count(0, "vertex count")?;
    let face_count = counts.count(1, "face count")?;
    // Header counts are untrusted; they must fit in the rows that follow.
    let available = rows.len();
    if vertex_count.checked_add(face_count).map_or(true, |needed| needed > available) {
        return Err(Error::parse(
            FORMAT,
            Some(counts.line),
            format!("header declares {vertex_count} vertices and {face_count} faces but only {available} rows follow"),
        ));
    }

    let mut mesh = BoundaryMesh::with_capacity(vertex_count, face_count);
    for i in 0..vertex_count {
        let row = rows
            .next()
            .ok_or_else(|| Error::parse(FORMAT, None, format!("expected {vertex_count} vertices, found {i}")))?;
        mesh.add_vertex(Point3::new(row.scalar(0)?, row.scalar(1)?, row.scalar(2)?));
    }

    for i in 0..face_count {
        let row = rows
            .next()
            .ok_or_else(|| Error::parse(FORMAT, None, format!("expected {face_count} faces, found {i}")))?;
        let size = row.count(0, "face size")?;
        if size < 3 {
            return Err(Error::parse(FORMAT, Some(row.line), format!("face has {size} vertices")));
        }
        // Anything after the indices is a color.
        let indices = (1..=size)
            .map(|k| row.count(k, "vertex index"))
            .collect::<Result<Vec<_>>>()?;
        if let Some(&bad) = indices.iter().find(|&&v| v >= vertex_count) {
            return Err(Error::parse(
                FORMAT,
                Some(row.line),
                format!("vertex index {bad} out of range (mesh has {vertex_count} vertices)"),
            ));
        }
        mesh.add_face(Face::new(indices));
    }

    let extra = rows.count();
    if extra > 0 {
        debug!(rows = extra, "ignoring trailing OFF rows");
    }
    Ok(mesh)
}

pub(super) fn write(mesh: &BoundaryMesh, options: &WriteOptions) -> Result<Vec<u8>> {
    let mut polygons = Vec::with_capacity(mesh.face_count());
    for face in &mesh.faces {
        polygons.extend(output_polygons(mesh, face, false)?);
    }

    let mut coords = CoordinateWriter::new(options.inexact);
    let mut out = Vec::new();
    write_text(&mut out, mesh, &polygons, &mut coords).map_err(|e| Error::io("<off buffer>", e))?;
    coords.finish(MeshFormat::Off);
    Ok(out)
}

fn write_text(
    out: &mut impl Write,
    mesh: &BoundaryMesh,
    polygons: &[Vec<usize>],
    coords: &mut CoordinateWriter,
) -> io::Result<()> {
    let edge_count = polygons
        .iter()
        .flat_map(|p| (0..p.len()).map(move |i| (p[i], p[(i + 1) % p.len()])))
        .map(|(a, b)| (a.min(b), a.max(b)))
        .collect::<AHashSet<_>>()
        .len();

    writeln!(out, "OFF")?;
    writeln!(out, "{} {} {}", mesh.vertex_count(), polygons.len(), edge_count)?;
    for v in &mesh.vertices {
        writeln!(out, "{} {} {}", coords.text(&v.x), coords.text(&v.y), coords.text(&v.z))?;
    }
    for polygon in polygons {
        let indices: Vec<String> = polygon.iter().map(|i| i.to_string()).collect();
        writeln!(out, "{} {}", polygon.len(), indices.join(" "))?;
    }
    Ok(())
}
