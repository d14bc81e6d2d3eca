pub mod archive;
pub mod cache;
pub mod errors;
pub mod geometry;
pub mod image;
pub mod level;
pub mod meta;
pub mod name;
pub mod polygon;
pub mod read;
pub mod tex;
pub mod triangulate;
pub mod types;
pub mod visitor;
pub mod walls;

#[cfg(test)]
mod test_wad;

pub use self::archive::{Archive, LumpInfo, LumpReader, WadType};
pub use self::cache::{MaterialCache, MaterialKind};
pub use self::errors::{Error, ErrorKind, Result};
pub use self::geometry::{LevelGeometry, PlacedMarker, SectorMesh};
pub use self::image::Image;
pub use self::level::Level;
pub use self::meta::{LoaderMetadata, PolygonMetadata, SkyMetadata, TextureMetadata};
pub use self::name::WadName;
pub use self::polygon::{MalformedSector, Segment};
pub use self::tex::TextureCompositor;
pub use self::triangulate::{SectorPolygon, TriangulatedSector};
pub use self::visitor::{LevelVisitor, LevelWalker, Marker, SectorSurface};
pub use self::walls::{WallQuad, WallSection};
