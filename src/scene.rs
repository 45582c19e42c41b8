// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scene: the solid under construction and a target for topology queries

use crate::command::Command;
use crate::config::SceneConfig;
use crate::error::{Error, Result};
use crate::geometry::{
    newell_normal, prism_mesh, random_polygon_in_face, BooleanOp, BoundaryMesh, ExactPolyhedralSet, HalfFacet,
    Point3, PolygonSampling, TopologyIndex, Vector3,
};
use crate::io;
use rand::Rng;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Whether the scene holds any solid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SceneState {
    Empty,
    Populated,
}

/// One row of [`Scene::list_all_vertices`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VertexListing {
    pub index: usize,
    pub point: Point3,
}

/// One row of [`Scene::list_all_edges`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeListing {
    pub half_edge: usize,
    pub source: usize,
    pub target: usize,
    pub twin: Option<usize>,
    pub facet: usize,
    /// Facet on the other side of the edge
    pub neighbour_facet: Option<usize>,
}

/// One row of [`Scene::list_all_faces`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetListing {
    pub index: usize,
    pub loops: Vec<Vec<usize>>,
    pub twin: Option<usize>,
    pub outward: bool,
}

/// Result of [`Scene::execute`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "rows", rename_all = "lowercase")]
pub enum CommandOutput {
    Done,
    Vertices(Vec<VertexListing>),
    Edges(Vec<EdgeListing>),
    Faces(Vec<FacetListing>),
}

/// Target solid with its boundary and the index derived from it.
#[derive(Debug, Clone)]
struct Target {
    set: ExactPolyhedralSet,
    mesh: BoundaryMesh,
    index: TopologyIndex,
}

impl Target {
    fn new(set: ExactPolyhedralSet) -> Result<Self> {
        let mesh = if set.is_empty() {
            BoundaryMesh::new()
        } else {
            set.to_boundary_mesh()?
        };
        let index = TopologyIndex::build(&mesh)?;
        debug!(
            vertices = index.vertices().len(),
            half_edges = index.half_edges().len(),
            facets = index.facets().len(),
            "indexed target"
        );
        Ok(Self { set, mesh, index })
    }
}

/// Scene holding the objects being built and an optional target
///
/// Every operation computes its new state completely before assigning it,
/// so a failed call leaves the scene as it was.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    config: SceneConfig,
    objects: ExactPolyhedralSet,
    target: Option<Target>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SceneConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn objects(&self) -> &ExactPolyhedralSet {
        &self.objects
    }

    pub fn state(&self) -> SceneState {
        if self.objects.is_empty() {
            SceneState::Empty
        } else {
            SceneState::Populated
        }
    }

    pub fn target(&self) -> Option<&ExactPolyhedralSet> {
        self.target.as_ref().map(|t| &t.set)
    }

    /// Boundary mesh the target index was built from
    pub fn target_mesh(&self) -> Option<&BoundaryMesh> {
        self.target.as_ref().map(|t| &t.mesh)
    }

    pub fn target_index(&self) -> Option<&TopologyIndex> {
        self.target.as_ref().map(|t| &t.index)
    }

    /// Replace the objects with the solid in `path`
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn load_scene(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let set = load_set(path.as_ref())?;
        info!(cells = set.cell_count(), "loaded scene");
        self.objects = set;
        Ok(())
    }

    /// Make the solid in `path` the target and index it
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn load_target(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let target = Target::new(load_set(path.as_ref())?)?;
        info!(vertices = target.index.vertices().len(), "loaded target");
        self.target = Some(target);
        Ok(())
    }

    pub fn set_target(&mut self, set: ExactPolyhedralSet) -> Result<()> {
        self.target = Some(Target::new(set)?);
        info!("target replaced");
        Ok(())
    }

    /// Use another scene's objects as this scene's target
    pub fn set_target_from_scene(&mut self, other: &Scene) -> Result<()> {
        self.set_target(other.objects.clone())
    }

    /// Extrude `polygon` along `direction` and fold the prism into the
    /// objects with `op`.
    ///
    /// On an empty scene union adopts the prism, while difference and
    /// intersection leave the scene empty.
    #[instrument(skip(self, polygon, direction), fields(points = polygon.len()))]
    pub fn extrude(&mut self, polygon: &[Point3], direction: &Vector3, op: BooleanOp) -> Result<()> {
        let prism = ExactPolyhedralSet::from_boundary_mesh(&prism_mesh(polygon, direction)?)?;
        let objects = if self.objects.is_empty() {
            match op {
                BooleanOp::Union => prism,
                BooleanOp::Difference | BooleanOp::Intersection => ExactPolyhedralSet::empty(),
            }
        } else {
            self.objects.combine(&prism, op)
        };
        info!(%op, cells = objects.cell_count(), "extruded prism");
        self.objects = objects;
        Ok(())
    }

    /// [`Scene::extrude`] with the operator given as `'+'`, `'-'` or `'*'`
    pub fn extrude_with_symbol(&mut self, polygon: &[Point3], direction: &Vector3, symbol: char) -> Result<()> {
        let op = BooleanOp::from_symbol(symbol)?;
        self.extrude(polygon, direction, op)
    }

    /// Run a textual `extrude x1 y1 z1 ... dx dy dz OP` command
    pub fn extrude_from_str(&mut self, command: &str) -> Result<()> {
        match command.parse::<Command>()? {
            Command::Extrude { polygon, direction, op } => self.extrude(&polygon, &direction, op),
            other => Err(Error::InvalidCommand(format!("expected an extrude command, got '{other}'"))),
        }
    }

    pub fn list_all_vertices(&self) -> Result<Vec<VertexListing>> {
        let index = self.target_index().ok_or(Error::NoTargetLoaded)?;
        Ok(index
            .vertices()
            .iter()
            .enumerate()
            .map(|(index, point)| VertexListing {
                index,
                point: point.clone(),
            })
            .collect())
    }

    /// One row per undirected edge
    pub fn list_all_edges(&self) -> Result<Vec<EdgeListing>> {
        let index = self.target_index().ok_or(Error::NoTargetLoaded)?;
        let half_edges = index.half_edges();
        Ok(index
            .edges()
            .into_iter()
            .map(|i| {
                let he = &half_edges[i];
                EdgeListing {
                    half_edge: i,
                    source: he.source,
                    target: he.target,
                    twin: he.twin,
                    facet: he.facet,
                    neighbour_facet: he.twin.map(|t| half_edges[t].facet),
                }
            })
            .collect())
    }

    pub fn list_all_faces(&self) -> Result<Vec<FacetListing>> {
        let index = self.target_index().ok_or(Error::NoTargetLoaded)?;
        Ok(index
            .facets()
            .iter()
            .enumerate()
            .map(|(index, facet)| FacetListing {
                index,
                loops: facet.loops.clone(),
                twin: facet.twin,
                outward: facet.outward,
            })
            .collect())
    }

    /// Outward normal of a target facet, scaled by twice its outer area
    pub fn facet_normal(&self, facet: usize) -> Result<Vector3> {
        let (index, half_facet) = self.target_facet(facet)?;
        let normal = winding_normal(index, half_facet)?;
        Ok(if half_facet.outward { normal } else { -&normal })
    }

    /// Random convex polygon strictly inside a target facet, wound like the
    /// facet's loops
    pub fn random_polygon_on_facet<R: Rng + ?Sized>(
        &self,
        facet: usize,
        sampling: &PolygonSampling,
        rng: &mut R,
    ) -> Result<Vec<Point3>> {
        let (index, half_facet) = self.target_facet(facet)?;
        let normal = winding_normal(index, half_facet)?;
        let polygon = random_polygon_in_face(&half_facet.loops, index.vertices(), &normal, sampling, rng)?;
        debug!(facet, points = polygon.len(), "sampled polygon on facet");
        Ok(polygon)
    }

    fn target_facet(&self, facet: usize) -> Result<(&TopologyIndex, &HalfFacet)> {
        let index = self.target_index().ok_or(Error::NoTargetLoaded)?;
        let count = index.facets().len();
        let half_facet = index.facets().get(facet).ok_or(Error::UnknownFacet { facet, count })?;
        Ok((index, half_facet))
    }

    /// Write the objects to `path`
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn save_scene(&self, path: impl AsRef<Path>) -> Result<()> {
        if self.objects.is_empty() {
            return Err(Error::EmptyScene);
        }
        let mesh = self.objects.to_boundary_mesh()?;
        io::write_mesh_file(path.as_ref(), &mesh, &self.config.write_options())?;
        info!(vertices = mesh.vertex_count(), faces = mesh.face_count(), "saved scene");
        Ok(())
    }

    /// Transcode a mesh file. Does not touch the scene.
    pub fn convert(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
        io::convert_file(input, output, &self.config.write_options())
    }

    pub fn execute(&mut self, command: &Command) -> Result<CommandOutput> {
        debug!(%command, "executing");
        match command {
            Command::Load(path) => self.load_scene(path).map(|_| CommandOutput::Done),
            Command::Target(path) => self.load_target(path).map(|_| CommandOutput::Done),
            Command::Save(path) => self.save_scene(path).map(|_| CommandOutput::Done),
            Command::Convert { input, output } => self.convert(input, output).map(|_| CommandOutput::Done),
            Command::Vertices => self.list_all_vertices().map(CommandOutput::Vertices),
            Command::Edges => self.list_all_edges().map(CommandOutput::Edges),
            Command::Faces => self.list_all_faces().map(CommandOutput::Faces),
            Command::Extrude { polygon, direction, op } => {
                self.extrude(polygon, direction, *op).map(|_| CommandOutput::Done)
            }
        }
    }
}

/// Normal the outer loop of `facet` winds counter-clockwise around.
fn winding_normal(index: &TopologyIndex, facet: &HalfFacet) -> Result<Vector3> {
    let outer = facet
        .loops
        .first()
        .ok_or_else(|| Error::InvalidBoundary("facet has no loops".to_string()))?;
    let points: Vec<Point3> = outer.iter().map(|&v| index.vertices()[v].clone()).collect();
    Ok(newell_normal(&points))
}

fn load_set(path: &Path) -> Result<ExactPolyhedralSet> {
    let mesh = io::read_mesh_file(path)?;
    ExactPolyhedralSet::from_boundary_mesh(&mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::exact::scalar;
    use crate::geometry::Plane;
    use num_traits::Signed;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn square(size: i64) -> Vec<Point3> {
        vec![
            Point3::from_ints(0, 0, 0),
            Point3::from_ints(size, 0, 0),
            Point3::from_ints(size, size, 0),
            Point3::from_ints(0, size, 0),
        ]
    }

    fn up(height: i64) -> Vector3 {
        Vector3::from_ints(0, 0, height)
    }

    #[test]
    fn test_initial_state() {
        let scene = Scene::new();
        assert_eq!(scene.state(), SceneState::Empty);
        assert!(scene.target().is_none());
        assert!(matches!(scene.list_all_vertices(), Err(Error::NoTargetLoaded)));
        assert!(matches!(scene.list_all_edges(), Err(Error::NoTargetLoaded)));
        assert!(matches!(scene.list_all_faces(), Err(Error::NoTargetLoaded)));
    }

    #[test]
    fn test_extrude_into_empty_scene() {
        let mut scene = Scene::new();
        scene.extrude(&square(1), &up(1), BooleanOp::Union).unwrap();
        assert_eq!(scene.state(), SceneState::Populated);
        assert_eq!(scene.objects().volume(), scalar(1));

        for op in [BooleanOp::Difference, BooleanOp::Intersection] {
            let mut empty = Scene::new();
            empty.extrude(&square(1), &up(1), op).unwrap();
            assert_eq!(empty.state(), SceneState::Empty);
        }
    }

    #[test]
    fn test_cube_target_listing() {
        let mut builder = Scene::new();
        builder.extrude(&square(1), &up(1), BooleanOp::Union).unwrap();

        let mut scene = Scene::new();
        scene.set_target_from_scene(&builder).unwrap();
        assert_eq!(scene.list_all_vertices().unwrap().len(), 8);
        assert_eq!(scene.list_all_faces().unwrap().len(), 6);

        let edges = scene.list_all_edges().unwrap();
        assert_eq!(edges.len(), 12);
        assert!(edges.iter().all(|e| e.twin.is_some() && e.neighbour_facet.is_some()));
        // The target does not affect the objects.
        assert_eq!(scene.state(), SceneState::Empty);
    }

    #[test]
    fn test_intersect_with_same_prism_is_unchanged() {
        let mut scene = Scene::new();
        scene.extrude(&square(1), &up(1), BooleanOp::Union).unwrap();
        let before = scene.objects().clone();
        scene.extrude(&square(1), &up(1), BooleanOp::Intersection).unwrap();
        assert_eq!(scene.objects(), &before);
    }

    #[test]
    fn test_difference_with_containing_prism_empties_scene() {
        let mut scene = Scene::new();
        scene.extrude(&square(1), &up(1), BooleanOp::Union).unwrap();
        let big: Vec<Point3> = square(4)
            .iter()
            .map(|p| p.translate(&Vector3::from_ints(-1, -1, -1)))
            .collect();
        scene.extrude(&big, &up(3), BooleanOp::Difference).unwrap();
        assert_eq!(scene.state(), SceneState::Empty);
        assert!(matches!(scene.save_scene("unused.off"), Err(Error::EmptyScene)));
    }

    #[test]
    fn test_failed_extrude_leaves_scene_unchanged() {
        let mut scene = Scene::new();
        scene.extrude(&square(2), &up(1), BooleanOp::Union).unwrap();
        let before = scene.objects().clone();

        let degenerate = vec![Point3::from_ints(0, 0, 0), Point3::from_ints(1, 0, 0)];
        assert!(scene.extrude(&degenerate, &up(1), BooleanOp::Union).is_err());
        assert!(matches!(
            scene.extrude_with_symbol(&square(1), &up(1), '/'),
            Err(Error::UnsupportedOperator(_))
        ));
        assert_eq!(scene.objects(), &before);
    }

    #[test]
    fn test_extrude_from_str() {
        let mut scene = Scene::new();
        scene.extrude_from_str("extrude 0 0 0 2 0 0 2 2 0 0 2 0 0 0 1 +").unwrap();
        scene.extrude_from_str("extrude 0 0 0 1 0 0 1 1 0 0 1 0 0 0 1 -").unwrap();
        assert_eq!(scene.objects().volume(), scalar(3));
        assert!(matches!(scene.extrude_from_str("edges"), Err(Error::InvalidCommand(_))));
    }

    #[test]
    fn test_execute_listing_commands() {
        let mut scene = Scene::new();
        scene
            .execute(&"extrude 0 0 0 1 0 0 1 1 0 0 1 0 0 0 1 +".parse().unwrap())
            .unwrap();
        let builder = scene.clone();
        scene.set_target_from_scene(&builder).unwrap();

        match scene.execute(&Command::Edges).unwrap() {
            CommandOutput::Edges(edges) => assert_eq!(edges.len(), 12),
            other => panic!("unexpected output {other:?}"),
        }
        assert!(matches!(scene.execute(&Command::Faces).unwrap(), CommandOutput::Faces(f) if f.len() == 6));
    }

    fn cube_target() -> Scene {
        let mut builder = Scene::new();
        builder.extrude(&square(2), &up(2), BooleanOp::Union).unwrap();
        let mut scene = Scene::new();
        scene.set_target_from_scene(&builder).unwrap();
        scene
    }

    #[test]
    fn test_facet_normals_point_away_from_the_solid() {
        let scene = cube_target();
        let index = scene.target_index().unwrap();
        let center = Point3::from_ints(1, 1, 1);
        for (facet, half_facet) in index.facets().iter().enumerate() {
            let normal = scene.facet_normal(facet).unwrap();
            let corner = &index.vertices()[half_facet.loops[0][0]];
            assert!(normal.dot(&(corner - &center)).is_positive());
        }
        let count = index.facets().len();
        assert!(matches!(
            scene.facet_normal(count),
            Err(Error::UnknownFacet { facet, count: c }) if facet == count && c == count
        ));
        assert!(matches!(Scene::new().facet_normal(0), Err(Error::NoTargetLoaded)));
    }

    #[test]
    fn test_random_polygon_on_facet_lies_on_it() {
        let scene = cube_target();
        let index = scene.target_index().unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        for facet in 0..index.facets().len() {
            let polygon = scene
                .random_polygon_on_facet(facet, &PolygonSampling::default(), &mut rng)
                .unwrap();
            let corner = &index.vertices()[index.facets()[facet].loops[0][0]];
            let plane = Plane::from_point_normal(corner, scene.facet_normal(facet).unwrap()).unwrap();
            assert!(polygon.len() >= 3);
            assert!(polygon.iter().all(|p| plane.contains(p)));
        }
        assert!(matches!(
            Scene::new().random_polygon_on_facet(0, &PolygonSampling::default(), &mut rng),
            Err(Error::NoTargetLoaded)
        ));
    }

    #[test]
    fn test_extruding_a_sampled_polygon_outward_grows_the_solid() {
        let mut scene = cube_target();
        scene.extrude(&square(2), &up(2), BooleanOp::Union).unwrap();
        let before = scene.objects().volume();

        let mut rng = StdRng::seed_from_u64(3);
        let polygon = scene
            .random_polygon_on_facet(0, &PolygonSampling::default(), &mut rng)
            .unwrap();
        let normal = scene.facet_normal(0).unwrap();
        scene.extrude(&polygon, &normal, BooleanOp::Union).unwrap();
        assert!(scene.objects().volume() > before);

        // Pushing the same polygon inward carves into the solid instead.
        let mut carved = cube_target();
        carved.extrude(&square(2), &up(2), BooleanOp::Union).unwrap();
        carved.extrude(&polygon, &-&normal, BooleanOp::Difference).unwrap();
        assert!(carved.objects().volume() < before);
    }

    #[test]
    fn test_clones_are_independent() {
        let mut a = Scene::new();
        a.extrude(&square(1), &up(1), BooleanOp::Union).unwrap();
        let b = a.clone();
        a.extrude(&square(1), &up(1), BooleanOp::Difference).unwrap();
        assert_eq!(a.state(), SceneState::Empty);
        assert_eq!(b.state(), SceneState::Populated);
    }
}
