// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Wavefront OBJ reader and writer using pest

use super::{output_polygons, pest_line, CoordinateWriter, MeshFormat, WriteOptions};
use crate::error::{Error, Result};
use crate::geometry::exact::parse_scalar;
use crate::geometry::{BoundaryMesh, Face, Point3};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use std::io::{self, Write};

const FORMAT: &str = "OBJ";

#[derive(Parser)]
#[grammar = "io/obj.pest"]
struct ObjParser;

pub(super) fn parse(source: &str) -> Result<BoundaryMesh> {
    let file = ObjParser::parse(Rule::file, source)
        .map_err(|e| Error::parse(FORMAT, Some(pest_line(&e)), e.variant.message()))?
        .next()
        .ok_or_else(|| Error::parse(FORMAT, None, "empty input"))?;

    let mut mesh = BoundaryMesh::new();
    for statement in file.into_inner() {
        let line = statement.as_span().start_pos().line_col().0;
        match statement.as_rule() {
            Rule::vertex => {
                let coords = statement
                    .into_inner()
                    .map(|p| parse_scalar(p.as_str()).map_err(|e| Error::parse(FORMAT, Some(line), e.to_string())))
                    .collect::<Result<Vec<_>>>()?;
                // An optional fourth value is a weight for rational curves.
                let [x, y, z, ..] = coords.as_slice() else {
                    return Err(Error::parse(FORMAT, Some(line), "vertex needs three coordinates"));
                };
                mesh.add_vertex(Point3::new(x.clone(), y.clone(), z.clone()));
            }
            Rule::face => {
                let indices = statement
                    .into_inner()
                    .map(|r| vertex_ref(r, mesh.vertex_count(), line))
                    .collect::<Result<Vec<_>>>()?;
                mesh.add_face(Face::new(indices));
            }
            _ => {}
        }
    }
    Ok(mesh)
}

/// Resolve the position index of `v`, `v/vt`, `v//vn` or `v/vt/vn`.
/// Positive indices are 1-based, negative ones count back from the last
/// vertex defined so far.
fn vertex_ref(pair: Pair<Rule>, defined: usize, line: usize) -> Result<usize> {
    let text = pair
        .into_inner()
        .next()
        .map(|p| p.as_str())
        .ok_or_else(|| Error::parse(FORMAT, Some(line), "empty vertex reference"))?;
    let out_of_range = || Error::parse(FORMAT, Some(line), format!("vertex reference {text} out of range"));
    let value: i64 = text.parse().map_err(|_| out_of_range())?;
    let index = match value {
        v if v > 0 => usize::try_from(v - 1).map_err(|_| out_of_range())?,
        v if v < 0 => {
            let back = usize::try_from(-v).map_err(|_| out_of_range())?;
            defined.checked_sub(back).ok_or_else(out_of_range)?
        }
        _ => return Err(out_of_range()),
    };
    if index >= defined {
        return Err(out_of_range());
    }
    Ok(index)
}

pub(super) fn write(mesh: &BoundaryMesh, options: &WriteOptions) -> Result<Vec<u8>> {
    let mut polygons = Vec::with_capacity(mesh.face_count());
    for face in &mesh.faces {
        polygons.extend(output_polygons(mesh, face, false)?);
    }

    let mut coords = CoordinateWriter::new(options.inexact);
    let mut out = Vec::new();
    write_text(&mut out, mesh, &polygons, &mut coords).map_err(|e| Error::io("<obj buffer>", e))?;
    coords.finish(MeshFormat::Obj);
    Ok(out)
}

fn write_text(
    out: &mut impl Write,
    mesh: &BoundaryMesh,
    polygons: &[Vec<usize>],
    coords: &mut CoordinateWriter,
) -> io::Result<()> {
    writeln!(out, "# polyset")?;
    writeln!(out, "o polyset")?;
    for v in &mesh.vertices {
        writeln!(out, "v {} {} {}", coords.text(&v.x), coords.text(&v.y), coords.text(&v.z))?;
    }
    for polygon in polygons {
        let indices: Vec<String> = polygon.iter().map(|i| (i + 1).to_string()).collect();
        writeln!(out, "f {}", indices.join(" "))?;
    }
    Ok(())
}
