use super::cache::{MaterialCache, MaterialKind};
use super::level::Level;
use super::meta::LoaderMetadata;
use super::polygon::MalformedSector;
use super::triangulate::TriangulatedSector;
use super::types::WadName;
use super::visitor::{LevelVisitor, LevelWalker, Marker, SectorSurface};
use super::walls::WallQuad;
use indexmap::IndexSet;
use log::info;
use math::{Pnt3f, Radf};

pub struct SectorMesh {
    pub sector: usize,
    pub height: f32,
    pub flat: WadName,
    pub mesh: TriangulatedSector,
}

impl<'a> From<&'a SectorSurface<'a>> for SectorMesh {
    fn from(surface: &'a SectorSurface<'a>) -> Self {
        SectorMesh {
            sector: surface.sector,
            height: surface.height,
            flat: surface.flat,
            mesh: surface.mesh.clone(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlacedMarker {
    pub pos: Pnt3f,
    pub yaw: Radf,
    pub marker: Marker,
}

/// Everything a renderer needs from one level, collected by walking it.
#[derive(Default)]
pub struct LevelGeometry {
    pub walls: Vec<WallQuad>,
    pub floors: Vec<SectorMesh>,
    pub ceilings: Vec<SectorMesh>,
    pub markers: Vec<PlacedMarker>,
    pub malformed: Vec<(usize, MalformedSector)>,
}

impl LevelGeometry {
    pub fn build(level: &Level, meta: &LoaderMetadata) -> LevelGeometry {
        let mut geometry = LevelGeometry::default();
        LevelWalker::new(level, meta, &mut geometry).walk();
        geometry
    }

    pub fn player_start(&self) -> Option<&PlacedMarker> {
        self.markers
            .iter()
            .find(|placed| placed.marker == Marker::StartPos { player: 0 })
    }

    /// Distinct materials referenced by walls, floors and ceilings, in the
    /// order they are first used.
    pub fn material_names(&self) -> IndexSet<(MaterialKind, WadName)> {
        let walls = self
            .walls
            .iter()
            .map(|quad| (MaterialKind::Texture, quad.texture));
        let flats = self
            .floors
            .iter()
            .chain(&self.ceilings)
            .map(|surface| (MaterialKind::Flat, surface.flat));
        walls.chain(flats).collect()
    }

    /// Builds every referenced material through `cache`. Returns how many
    /// could not be built; each failure has already been logged by the cache.
    pub fn load_materials(&self, cache: &mut MaterialCache) -> usize {
        let names = self.material_names();
        let num_failed = names
            .iter()
            .filter(|&&(kind, name)| cache.get(kind, name).is_err())
            .count();
        info!(
            "Loaded {} of {} materials.",
            names.len() - num_failed,
            names.len()
        );
        num_failed
    }
}

impl LevelVisitor for LevelGeometry {
    fn visit_wall_quad(&mut self, quad: &WallQuad) {
        self.walls.push(quad.clone());
    }

    fn visit_floor(&mut self, surface: &SectorSurface) {
        self.floors.push(SectorMesh::from(surface));
    }

    fn visit_ceiling(&mut self, surface: &SectorSurface) {
        self.ceilings.push(SectorMesh::from(surface));
    }

    fn visit_marker(&mut self, pos: Pnt3f, yaw: Radf, marker: Marker) {
        self.markers.push(PlacedMarker { pos, yaw, marker });
    }

    fn visit_malformed_sector(&mut self, sector: usize, reason: &MalformedSector) {
        self.malformed.push((sector, reason.clone()));
    }
}
