pub use super::name::WadName;
use super::errors::{ErrorKind, Result};
use bitflags::bitflags;
use failchain::ensure;
use serde::Deserialize;

pub type LightLevel = i16;
pub type SectorId = u16;
pub type SectorTag = u16;
pub type SectorType = u16;
pub type SidedefId = i16;
pub type SpecialType = u16;
pub type ThingFlags = u16;
pub type ThingType = u16;
pub type VertexId = u16;
pub type WadCoord = i16;
pub type LinedefId = usize;

pub const PLAYER1_START: ThingType = 1;
pub const PLAYER4_START: ThingType = 4;

#[derive(Copy, Clone, Debug, Deserialize)]
pub struct WadThing {
    pub x: WadCoord,
    pub y: WadCoord,
    pub angle: WadCoord,
    pub thing_type: ThingType,
    pub flags: ThingFlags,
}

/// A map vertex. Also used as the exact-equality key when joining segments.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub struct WadVertex {
    pub x: WadCoord,
    pub y: WadCoord,
}

impl WadVertex {
    pub fn new(x: WadCoord, y: WadCoord) -> Self {
        WadVertex { x, y }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct LinedefFlags: u16 {
        const IMPASSABLE = 0x0001;
        const BLOCKS_MONSTERS = 0x0002;
        const TWO_SIDED = 0x0004;
        const UPPER_UNPEGGED = 0x0008;
        const LOWER_UNPEGGED = 0x0010;
        const SECRET = 0x0020;
        const BLOCKS_SOUND = 0x0040;
        const NEVER_ON_MAP = 0x0080;
        const ALWAYS_ON_MAP = 0x0100;
    }
}

#[derive(Copy, Clone, Debug, Deserialize)]
pub struct WadLinedef {
    pub start_vertex: VertexId,
    pub end_vertex: VertexId,
    pub flags: u16,
    pub special_type: SpecialType,
    pub sector_tag: SectorTag,
    pub right_side: SidedefId,
    pub left_side: SidedefId,
}

impl WadLinedef {
    pub fn flags(&self) -> LinedefFlags {
        LinedefFlags::from_bits_truncate(self.flags)
    }

    pub fn right_sidedef(&self) -> Option<usize> {
        sidedef_index(self.right_side)
    }

    pub fn left_sidedef(&self) -> Option<usize> {
        sidedef_index(self.left_side)
    }
}

fn sidedef_index(id: SidedefId) -> Option<usize> {
    if id < 0 {
        None
    } else {
        Some(id as usize)
    }
}

#[derive(Copy, Clone, Debug, Deserialize)]
pub struct WadSidedef {
    pub x_offset: WadCoord,
    pub y_offset: WadCoord,
    pub upper_texture: WadName,
    pub lower_texture: WadName,
    pub middle_texture: WadName,
    pub sector: SectorId,
}

impl WadSidedef {
    pub fn upper(&self) -> TextureRef {
        TextureRef::from_name(self.upper_texture)
    }

    pub fn lower(&self) -> TextureRef {
        TextureRef::from_name(self.lower_texture)
    }

    pub fn middle(&self) -> TextureRef {
        TextureRef::from_name(self.middle_texture)
    }
}

#[derive(Copy, Clone, Debug, Deserialize)]
pub struct WadSector {
    pub floor_height: WadCoord,
    pub ceiling_height: WadCoord,
    pub floor_texture: WadName,
    pub ceiling_texture: WadName,
    pub light: LightLevel,
    pub sector_type: SectorType,
    pub tag: SectorTag,
}

/// Texture definition block header in TEXTURE1/TEXTURE2.
#[derive(Copy, Clone, Debug, Deserialize)]
pub struct WadTextureHeader {
    pub name: [u8; 8],
    pub masked: u32,
    pub width: i16,
    pub height: i16,
    pub column_directory: u32,
    pub num_patches: i16,
}

#[derive(Copy, Clone, Debug, Deserialize)]
pub struct WadTexturePatchRef {
    pub origin_x: i16,
    pub origin_y: i16,
    pub patch: i16,
    pub stepdir: u16,
    pub colormap: u16,
}

/// A wall texture slot on a sidedef. `-` (or an empty name) means no texture.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TextureRef {
    Absent,
    Named(WadName),
}

impl TextureRef {
    pub fn from_name(name: WadName) -> Self {
        if name.is_empty() || name.as_str() == "-" {
            TextureRef::Absent
        } else {
            TextureRef::Named(name)
        }
    }

    pub fn name(&self) -> Option<WadName> {
        match *self {
            TextureRef::Absent => None,
            TextureRef::Named(name) => Some(name),
        }
    }
}

/// A floor or ceiling surface. Sky surfaces are not rendered as geometry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FlatRef {
    Sky,
    Named(WadName),
}

impl FlatRef {
    pub fn name(&self) -> Option<WadName> {
        match *self {
            FlatRef::Sky => None,
            FlatRef::Named(name) => Some(name),
        }
    }
}

pub const PALETTE_SIZE: usize = 256 * 3;
pub const FLAT_SIZE: usize = 64;

pub struct Palette(pub [u8; PALETTE_SIZE]);

impl Palette {
    /// Reads the first palette of a PLAYPAL lump.
    pub fn from_bytes(bytes: &[u8]) -> Result<Palette> {
        ensure!(
            bytes.len() >= PALETTE_SIZE,
            ErrorKind::CorruptWad(format!(
                "Palette lump too small: {} < {}",
                bytes.len(),
                PALETTE_SIZE
            ))
        );
        let mut palette = Palette::default();
        palette.0.copy_from_slice(&bytes[..PALETTE_SIZE]);
        Ok(palette)
    }

    pub fn rgba(&self, index: u8) -> [u8; 4] {
        let offset = usize::from(index) * 3;
        [self.0[offset], self.0[offset + 1], self.0[offset + 2], 255]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette([0u8; PALETTE_SIZE])
    }
}

impl AsMut<[u8]> for Palette {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}
