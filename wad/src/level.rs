use super::archive::Archive;
use super::errors::Result;
use super::types::{SectorId, VertexId};
use super::types::{WadLinedef, WadSector, WadSidedef, WadThing, WadVertex};
use log::info;
use serde::de::DeserializeOwned;

/// The decoded records of one map.
pub struct Level {
    pub name: String,
    pub things: Vec<WadThing>,
    pub linedefs: Vec<WadLinedef>,
    pub sidedefs: Vec<WadSidedef>,
    pub vertices: Vec<WadVertex>,
    pub sectors: Vec<WadSector>,
}

/// One side of a linedef with the sector it faces.
#[derive(Copy, Clone, Debug)]
pub struct SideView<'a> {
    pub sidedef: &'a WadSidedef,
    pub sector: &'a WadSector,
    pub sector_id: usize,
}

impl Level {
    /// Decodes the map whose marker lump is called `level_name`. Each record
    /// lump is the first one with the right name after the marker.
    pub fn from_archive(wad: &Archive, level_name: &str) -> Result<Level> {
        let marker = wad.required_lump(level_name, 0)?;
        info!("Reading level data for '{}'...", marker.name());
        let start_index = marker.index();

        let level = Level {
            name: marker.name().to_owned(),
            things: decode_after(wad, "THINGS", start_index)?,
            linedefs: decode_after(wad, "LINEDEFS", start_index)?,
            sidedefs: decode_after(wad, "SIDEDEFS", start_index)?,
            vertices: decode_after(wad, "VERTEXES", start_index)?,
            sectors: decode_after(wad, "SECTORS", start_index)?,
        };

        info!("Loaded level '{}':", level.name);
        info!("    {:4} things", level.things.len());
        info!("    {:4} linedefs", level.linedefs.len());
        info!("    {:4} sidedefs", level.sidedefs.len());
        info!("    {:4} vertices", level.vertices.len());
        info!("    {:4} sectors", level.sectors.len());
        Ok(level)
    }

    pub fn vertex(&self, id: VertexId) -> Option<WadVertex> {
        self.vertices.get(usize::from(id)).cloned()
    }

    pub fn linedef_vertices(&self, linedef: &WadLinedef) -> Option<(WadVertex, WadVertex)> {
        Some((
            self.vertex(linedef.start_vertex)?,
            self.vertex(linedef.end_vertex)?,
        ))
    }

    pub fn sector(&self, id: SectorId) -> Option<&WadSector> {
        self.sectors.get(usize::from(id))
    }

    pub fn right_side(&self, linedef: &WadLinedef) -> Option<SideView> {
        linedef.right_sidedef().and_then(|index| self.side(index))
    }

    pub fn left_side(&self, linedef: &WadLinedef) -> Option<SideView> {
        linedef.left_sidedef().and_then(|index| self.side(index))
    }

    fn side(&self, index: usize) -> Option<SideView> {
        let sidedef = self.sidedefs.get(index)?;
        Some(SideView {
            sidedef,
            sector: self.sector(sidedef.sector)?,
            sector_id: usize::from(sidedef.sector),
        })
    }
}

fn decode_after<T: DeserializeOwned>(wad: &Archive, name: &str, start_index: usize) -> Result<Vec<T>> {
    wad.required_lump(name, start_index)?.decode_vec()
}

#[cfg(test)]
mod test {
    use super::Level;
    use crate::archive::Archive;
    use crate::test_wad::{LevelBuilder, WadBuilder};
    use crate::types::WadVertex;

    fn two_level_wad() -> Archive {
        let second = LevelBuilder::new()
            .thing(5, 6, 3001)
            .vertex(7, 8)
            .linedef(0, 0, 0, 0, -1)
            .sidedef(1, 2, "-", "-", "-", 0)
            .sector(-8, 72, "NUKAGE1", "F_SKY1");
        let bytes = WadBuilder::new()
            .level("MAP01", &LevelBuilder::room_with_pillar())
            .level("MAP02", &second)
            .build();
        Archive::from_bytes(bytes).expect("test: bad wad")
    }

    #[test]
    fn decodes_records_after_marker() {
        let wad = two_level_wad();
        assert_eq!(wad.level_names().collect::<Vec<_>>(), vec!["MAP01", "MAP02"]);

        let first = Level::from_archive(&wad, "MAP01").expect("test: bad MAP01");
        assert_eq!(first.name, "MAP01");
        assert_eq!(first.vertices.len(), 8);
        assert_eq!(first.linedefs.len(), 8);
        assert_eq!(first.sidedefs.len(), 1);
        assert_eq!(first.sectors.len(), 1);
        assert_eq!(first.vertex(4), Some(WadVertex::new(96, 96)));
        assert_eq!(first.sectors[0].ceiling_height, 128);
        assert_eq!(first.sectors[0].floor_texture.as_str(), "FLOOR4_8");

        let second = Level::from_archive(&wad, "MAP02").expect("test: bad MAP02");
        assert_eq!(second.vertices, vec![WadVertex::new(7, 8)]);
        assert_eq!(second.sectors[0].floor_height, -8);
        assert_eq!(second.things[0].thing_type, 3001);
        assert!(Level::from_archive(&wad, "MAP03").is_err());
    }

    #[test]
    fn sides_and_things() {
        let wad = two_level_wad();
        let level = Level::from_archive(&wad, "MAP01").expect("test: bad MAP01");
        let linedef = level.linedefs[0];
        let right = level.right_side(&linedef).expect("test: missing right side");
        assert_eq!(right.sector_id, 0);
        assert_eq!(right.sidedef.middle_texture.as_str(), "STARTAN3");
        assert!(level.left_side(&linedef).is_none());
        assert_eq!(
            level.linedef_vertices(&linedef),
            Some((WadVertex::new(0, 0), WadVertex::new(0, 256)))
        );

        let start = &level.things[0];
        assert_eq!((start.x, start.y, start.angle, start.thing_type), (32, 32, 90, 1));
    }
}
