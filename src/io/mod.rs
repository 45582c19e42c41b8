// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - parsing, serializing and converting boundary meshes

mod obj;
mod off;
mod stl;

use crate::error::{Error, Result};
use crate::geometry::exact::{to_decimal_string, to_f64, to_fraction_string};
use crate::geometry::{triangulate_face, BoundaryMesh, Face, Scalar};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

/// Supported mesh file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshFormat {
    /// Object File Format, polygonal text
    Off,
    /// Wavefront OBJ, polygonal text
    Obj,
    /// STL, binary triangles on write, ASCII or binary on read
    Stl,
}

impl MeshFormat {
    pub const ALL: [MeshFormat; 3] = [MeshFormat::Off, MeshFormat::Obj, MeshFormat::Stl];

    /// Format named by a path's extension (case-insensitive).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::UnsupportedFormat(format!("{} has no file extension", path.display())))?;
        extension.parse()
    }

    /// Format from the extension, or `fallback` when the extension is
    /// missing or unknown.
    pub fn resolve(path: impl AsRef<Path>, fallback: Option<MeshFormat>) -> Result<Self> {
        match (Self::from_path(path), fallback) {
            (Ok(format), _) => Ok(format),
            (Err(_), Some(format)) => Ok(format),
            (Err(err), None) => Err(err),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            MeshFormat::Off => "off",
            MeshFormat::Obj => "obj",
            MeshFormat::Stl => "stl",
        }
    }

    /// Whether the format can only hold triangles.
    pub fn triangles_only(self) -> bool {
        matches!(self, MeshFormat::Stl)
    }
}

impl FromStr for MeshFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "off" => Ok(MeshFormat::Off),
            "obj" => Ok(MeshFormat::Obj),
            "stl" => Ok(MeshFormat::Stl),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for MeshFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MeshFormat::Off => "OFF",
            MeshFormat::Obj => "OBJ",
            MeshFormat::Stl => "STL",
        })
    }
}

/// How to write coordinates whose decimal expansion does not terminate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InexactPolicy {
    /// Nearest `f64`. Readable by any tool, loses exactness.
    #[default]
    Approximate,
    /// `p/q` literals. Exact, only readable by polyset.
    Fraction,
}

impl FromStr for InexactPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "approximate" => Ok(InexactPolicy::Approximate),
            "fraction" => Ok(InexactPolicy::Fraction),
            other => Err(Error::Config(format!(
                "unknown inexact policy '{other}' (expected 'approximate' or 'fraction')"
            ))),
        }
    }
}

/// Options for serializing meshes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub inexact: InexactPolicy,
    /// Format used when an output path has no recognised extension
    pub default_format: Option<MeshFormat>,
}

/// Parse a mesh from raw file contents.
pub fn parse_boundary_mesh(bytes: &[u8], format: MeshFormat) -> Result<BoundaryMesh> {
    let mesh = match format {
        MeshFormat::Off => off::parse(text(bytes, format)?)?,
        MeshFormat::Obj => obj::parse(text(bytes, format)?)?,
        MeshFormat::Stl => stl::parse(bytes)?,
    };
    debug!(
        %format,
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "parsed boundary mesh"
    );
    Ok(mesh)
}

/// Serialize a mesh. Faces with holes, and every face for triangle-only
/// formats, are written as exact triangulations.
pub fn serialize_boundary_mesh(mesh: &BoundaryMesh, format: MeshFormat, options: &WriteOptions) -> Result<Vec<u8>> {
    mesh.check_indices()?;
    match format {
        MeshFormat::Off => off::write(mesh, options),
        MeshFormat::Obj => obj::write(mesh, options),
        MeshFormat::Stl => stl::write(mesh),
    }
}

/// Read and parse a mesh file, format taken from its extension.
pub fn read_mesh_file(path: impl AsRef<Path>) -> Result<BoundaryMesh> {
    let path = path.as_ref();
    let format = MeshFormat::from_path(path)?;
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    parse_boundary_mesh(&bytes, format)
}

/// Serialize a mesh to a file, format taken from its extension.
pub fn write_mesh_file(path: impl AsRef<Path>, mesh: &BoundaryMesh, options: &WriteOptions) -> Result<()> {
    let path = path.as_ref();
    let format = MeshFormat::resolve(path, options.default_format)?;
    let bytes = serialize_boundary_mesh(mesh, format, options)?;
    fs::write(path, bytes).map_err(|e| Error::io(path, e))?;
    debug!(path = %path.display(), %format, "wrote boundary mesh");
    Ok(())
}

/// Transcode a mesh file. The mesh is not required to bound a solid.
pub fn convert_file(input: impl AsRef<Path>, output: impl AsRef<Path>, options: &WriteOptions) -> Result<()> {
    let mesh = read_mesh_file(input)?;
    write_mesh_file(output, &mesh, options)
}

fn text(bytes: &[u8], format: MeshFormat) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| Error::parse(format.to_string(), None, format!("input is not UTF-8: {e}")))
}

/// Loops to emit for one face: the outer loop as-is when the face has no
/// holes and polygons are allowed, else an exact triangulation.
pub(crate) fn output_polygons(mesh: &BoundaryMesh, face: &Face, triangles_only: bool) -> Result<Vec<Vec<usize>>> {
    if face.holes().is_empty() && (!triangles_only || face.outer().len() == 3) {
        return Ok(vec![face.outer().to_vec()]);
    }
    let plane = mesh.face_plane(face)?;
    let triangles = triangulate_face(&face.loops, &mesh.vertices, plane.normal())?;
    Ok(triangles.into_iter().map(|t| t.to_vec()).collect())
}

/// Renders coordinates under an [`InexactPolicy`], counting the ones that
/// could not be written exactly.
pub(crate) struct CoordinateWriter {
    policy: InexactPolicy,
    approximated: usize,
}

impl CoordinateWriter {
    pub(crate) fn new(policy: InexactPolicy) -> Self {
        Self { policy, approximated: 0 }
    }

    pub(crate) fn text(&mut self, value: &Scalar) -> String {
        if let Some(decimal) = to_decimal_string(value) {
            return decimal;
        }
        match self.policy {
            InexactPolicy::Fraction => to_fraction_string(value),
            InexactPolicy::Approximate => {
                self.approximated += 1;
                to_f64(value).to_string()
            }
        }
    }

    pub(crate) fn finish(self, format: MeshFormat) {
        if self.approximated > 0 {
            warn!(
                %format,
                count = self.approximated,
                "coordinates without a terminating decimal were written approximately"
            );
        }
    }
}

/// Line number of a pest error position.
pub(crate) fn pest_line<R: pest::RuleType>(err: &pest::error::Error<R>) -> usize {
    match err.line_col {
        pest::error::LineColLocation::Pos((line, _)) => line,
        pest::error::LineColLocation::Span((line, _), _) => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::exact::{ratio, scalar};

    #[test]
    fn test_format_from_path() {
        assert_eq!(MeshFormat::from_path("a/b/cube.off").unwrap(), MeshFormat::Off);
        assert_eq!(MeshFormat::from_path("CUBE.OBJ").unwrap(), MeshFormat::Obj);
        assert_eq!(MeshFormat::from_path("part.stl").unwrap(), MeshFormat::Stl);
        assert!(matches!(MeshFormat::from_path("model.ply"), Err(Error::UnsupportedFormat(_))));
        assert!(matches!(MeshFormat::from_path("model"), Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_format_fallback() {
        assert_eq!(MeshFormat::resolve("out", Some(MeshFormat::Obj)).unwrap(), MeshFormat::Obj);
        assert_eq!(MeshFormat::resolve("out.stl", Some(MeshFormat::Obj)).unwrap(), MeshFormat::Stl);
        assert!(MeshFormat::resolve("out", None).is_err());
    }

    #[test]
    fn test_coordinate_policies() {
        let mut approximate = CoordinateWriter::new(InexactPolicy::Approximate);
        assert_eq!(approximate.text(&ratio(1, 4)), "0.25");
        assert_eq!(approximate.text(&scalar(-3)), "-3");
        assert!(approximate.text(&ratio(1, 3)).starts_with("0.333"));
        assert_eq!(approximate.approximated, 1);

        let mut fraction = CoordinateWriter::new(InexactPolicy::Fraction);
        assert_eq!(fraction.text(&ratio(-2, 3)), "-2/3");
        assert_eq!(fraction.approximated, 0);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("Fraction".parse::<InexactPolicy>().unwrap(), InexactPolicy::Fraction);
        assert!(matches!("nearest".parse::<InexactPolicy>(), Err(Error::Config(_))));
    }
}
