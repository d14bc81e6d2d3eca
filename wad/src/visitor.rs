use super::level::Level;
use super::meta::LoaderMetadata;
use super::polygon::{sector_segments, MalformedSector};
use super::triangulate::{triangulate, SectorPolygon, TriangulatedSector};
use super::types::{FlatRef, ThingType, WadName, WadThing, WadVertex, PLAYER1_START, PLAYER4_START};
use super::walls::{linedef_walls, WallQuad};
use log::{debug, info, warn};
use math::{Deg, Pnt3f, Radf};
use std::time::Instant;

/// A floor or ceiling ready to be drawn. Ceiling meshes are already reversed.
pub struct SectorSurface<'a> {
    pub sector: usize,
    pub height: f32,
    pub flat: WadName,
    pub mesh: &'a TriangulatedSector,
}

#[derive(Eq, PartialEq, Debug, Copy, Clone)]
pub enum Marker {
    StartPos { player: usize },
}

impl Marker {
    pub fn from(thing_type: ThingType) -> Option<Self> {
        if thing_type >= PLAYER1_START && thing_type <= PLAYER4_START {
            Some(Marker::StartPos {
                player: usize::from(thing_type - PLAYER1_START),
            })
        } else {
            None
        }
    }
}

pub trait LevelVisitor: Sized {
    fn visit_wall_quad(&mut self, _quad: &WallQuad) {
        // Default impl is empty to allow visitors to mix and match.
    }

    fn visit_floor(&mut self, _surface: &SectorSurface) {
        // Default impl is empty to allow visitors to mix and match.
    }

    fn visit_ceiling(&mut self, _surface: &SectorSurface) {
        // Default impl is empty to allow visitors to mix and match.
    }

    fn visit_marker(&mut self, _pos: Pnt3f, _yaw: Radf, _marker: Marker) {
        // Default impl is empty to allow visitors to mix and match.
    }

    fn visit_malformed_sector(&mut self, _sector: usize, _reason: &MalformedSector) {
        // Default impl is empty to allow visitors to mix and match.
    }

    fn chain<'a, 'b, V: LevelVisitor>(
        &'a mut self,
        other: &'b mut V,
    ) -> VisitorChain<'a, 'b, Self, V> {
        VisitorChain {
            first: self,
            second: other,
        }
    }
}

/// Drives the wall, polygon and triangulation passes over a decoded level.
pub struct LevelWalker<'a, V: LevelVisitor + 'a> {
    level: &'a Level,
    meta: &'a LoaderMetadata,
    visitor: &'a mut V,

    // Filled by the sector pass, used to place things.
    sector_polygons: Vec<(usize, SectorPolygon)>,
}

impl<'a, V: LevelVisitor> LevelWalker<'a, V> {
    pub fn new(level: &'a Level, meta: &'a LoaderMetadata, visitor: &'a mut V) -> Self {
        LevelWalker {
            level,
            meta,
            visitor,
            sector_polygons: Vec::with_capacity(level.sectors.len()),
        }
    }

    pub fn walk(&mut self) {
        let start = Instant::now();
        self.walls();
        self.sectors();
        self.things();
        info!(
            "Walked level '{}' in {:.2}ms.",
            self.level.name,
            start.elapsed().as_secs_f64() * 1000.0
        );
    }

    fn walls(&mut self) {
        let mut num_quads = 0;
        for id in 0..self.level.linedefs.len() {
            for quad in linedef_walls(self.level, id) {
                self.visitor.visit_wall_quad(&quad);
                num_quads += 1;
            }
        }
        info!("    {:4} wall quads", num_quads);
    }

    fn sectors(&mut self) {
        let mut num_malformed = 0;
        for (id, segments) in sector_segments(self.level) {
            if segments.is_empty() {
                debug!("Sector {} has no linedefs, skipping.", id);
                continue;
            }
            let sector = &self.level.sectors[id];
            let built = SectorPolygon::from_segments(&segments, &self.meta.polygons)
                .and_then(|polygon| triangulate(&polygon).map(|mesh| (polygon, mesh)));
            let mesh = match built {
                Ok((polygon, mesh)) => {
                    self.sector_polygons.push((id, polygon));
                    mesh
                }
                Err(reason) => {
                    warn!("Malformed sector {}, skipping: {}.", id, reason);
                    self.visitor.visit_malformed_sector(id, &reason);
                    num_malformed += 1;
                    continue;
                }
            };

            if let FlatRef::Named(flat) = self.meta.flat_ref(sector.floor_texture) {
                self.visitor.visit_floor(&SectorSurface {
                    sector: id,
                    height: f32::from(sector.floor_height),
                    flat,
                    mesh: &mesh,
                });
            }
            if let FlatRef::Named(flat) = self.meta.flat_ref(sector.ceiling_texture) {
                self.visitor.visit_ceiling(&SectorSurface {
                    sector: id,
                    height: f32::from(sector.ceiling_height),
                    flat,
                    mesh: &mesh.reversed(),
                });
            }
        }
        info!(
            "    {:4} sectors triangulated, {} malformed",
            self.sector_polygons.len(),
            num_malformed
        );
    }

    fn things(&mut self) {
        for thing in &self.level.things {
            let marker = match Marker::from(thing.thing_type) {
                Some(marker) => marker,
                None => continue,
            };
            let floor = match self.sector_at(thing) {
                Some(sector) => f32::from(self.level.sectors[sector].floor_height),
                None => {
                    debug!("{:?} at ({}, {}) is outside every sector.", marker, thing.x, thing.y);
                    continue;
                }
            };
            let pos = Pnt3f::new(f32::from(thing.x), floor, -f32::from(thing.y));
            let yaw = Deg(f32::round(f32::from(thing.angle) / 45.0) * 45.0);
            self.visitor.visit_marker(pos, yaw.into(), marker);
        }
    }

    fn sector_at(&self, thing: &WadThing) -> Option<usize> {
        let position = WadVertex::new(thing.x, thing.y);
        self.sector_polygons
            .iter()
            .find(|(_, polygon)| polygon.contains(position))
            .map(|&(id, _)| id)
    }
}

pub struct VisitorChain<'a, 'b, A: LevelVisitor + 'a, B: LevelVisitor + 'b> {
    first: &'a mut A,
    second: &'b mut B,
}

impl<'a, 'b, A: LevelVisitor, B: LevelVisitor> LevelVisitor for VisitorChain<'a, 'b, A, B> {
    fn visit_wall_quad(&mut self, quad: &WallQuad) {
        self.first.visit_wall_quad(quad);
        self.second.visit_wall_quad(quad);
    }

    fn visit_floor(&mut self, surface: &SectorSurface) {
        self.first.visit_floor(surface);
        self.second.visit_floor(surface);
    }

    fn visit_ceiling(&mut self, surface: &SectorSurface) {
        self.first.visit_ceiling(surface);
        self.second.visit_ceiling(surface);
    }

    fn visit_marker(&mut self, pos: Pnt3f, yaw: Radf, marker: Marker) {
        self.first.visit_marker(pos, yaw, marker);
        self.second.visit_marker(pos, yaw, marker);
    }

    fn visit_malformed_sector(&mut self, sector: usize, reason: &MalformedSector) {
        self.first.visit_malformed_sector(sector, reason);
        self.second.visit_malformed_sector(sector, reason);
    }
}
