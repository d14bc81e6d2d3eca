use super::archive::Archive;
use super::errors::{ErrorKind, Result};
use super::image::Image;
use super::meta::{LoaderMetadata, TextureMetadata};
use super::read::{read_fixed_string, read_i32};
use super::types::{Palette, WadName, WadTextureHeader, WadTexturePatchRef};
use bincode;
use failchain::{bail, ResultExt};
use log::{debug, info, warn};

const TEXTURE_HEADER_SIZE: usize = 22;
const PATCH_REF_SIZE: usize = 10;
const PATCH_NAME_SIZE: usize = 8;

/// A texture definition located inside a TEXTURE1/TEXTURE2 lump.
#[derive(Copy, Clone, Debug)]
pub struct TextureDef<'a> {
    pub header: WadTextureHeader,
    lump: &'a [u8],
    offset: usize,
}

impl<'a> TextureDef<'a> {
    pub fn width(&self) -> i16 {
        self.header.width
    }

    pub fn height(&self) -> i16 {
        self.header.height
    }

    pub fn patch_refs(&self) -> Result<Vec<WadTexturePatchRef>> {
        let num_patches = self.header.num_patches.max(0) as usize;
        (0..num_patches)
            .map(|i_patch| {
                let offset = self.offset + TEXTURE_HEADER_SIZE + i_patch * PATCH_REF_SIZE;
                let bytes = self.lump.get(offset..).unwrap_or(&[]);
                bincode::deserialize(bytes).chain_err(|| {
                    ErrorKind::CorruptWad(format!("Truncated patch reference {}.", i_patch))
                })
            })
            .collect()
    }
}

/// Builds wall textures and flats on demand from the lumps named in the
/// loader metadata. The lookup lumps and the palette are located once.
pub struct TextureCompositor<'a> {
    wad: &'a Archive,
    palette: Palette,
    texture_lumps: Vec<&'a [u8]>,
    patch_names: &'a [u8],
    patch_start: usize,
    flat_start: usize,
}

impl<'a> TextureCompositor<'a> {
    pub fn new(wad: &'a Archive, meta: &LoaderMetadata) -> Result<TextureCompositor<'a>> {
        let TextureMetadata {
            ref texture_lumps,
            ref patch_names_lump,
            ref patch_start_marker,
            ref palette_lump,
            ref flat_start_marker,
        } = meta.textures;

        let palette = Palette::from_bytes(wad.required_lump(palette_lump, 0)?.bytes()?)?;
        let patch_names = wad.required_lump(patch_names_lump, 0)?.bytes()?;

        let mut texture_bytes = Vec::with_capacity(texture_lumps.len());
        for (i_lump, lump_name) in texture_lumps.iter().enumerate() {
            match wad.named_lump(lump_name, 0) {
                Some(lump) => {
                    let bytes = lump.bytes()?;
                    info!(
                        "  {:4} textures in {}",
                        read_i32(bytes, 0).unwrap_or(0),
                        lump_name
                    );
                    texture_bytes.push(bytes);
                }
                None if i_lump == 0 => bail!(ErrorKind::missing_required_lump(lump_name)),
                None => info!("     0 textures in {}", lump_name),
            }
        }

        let marker_or_start = |marker: &str| {
            wad.find_lump(marker, 0).map_or_else(
                || {
                    warn!("No `{}` marker, searching the whole directory.", marker);
                    0
                },
                |lump| lump.index,
            )
        };

        Ok(TextureCompositor {
            wad,
            palette,
            texture_lumps: texture_bytes,
            patch_names,
            patch_start: marker_or_start(patch_start_marker.as_str()),
            flat_start: marker_or_start(flat_start_marker.as_str()),
        })
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Finds a texture definition by case-insensitive name.
    pub fn find_texture(&self, name: WadName) -> Result<Option<TextureDef<'a>>> {
        for &lump in &self.texture_lumps {
            let num_textures = read_i32(lump, 0)?.max(0) as usize;
            for i_texture in 0..num_textures {
                let offset = read_i32(lump, 4 + i_texture * 4)?;
                if offset < 0 {
                    warn!("Skipping texture {}: negative offset {}.", i_texture, offset);
                    continue;
                }
                let offset = offset as usize;
                let found = read_fixed_string(lump, offset, 8)?;
                if !found.eq_ignore_ascii_case(name.as_str()) {
                    continue;
                }
                let header: WadTextureHeader = bincode::deserialize(lump.get(offset..).unwrap_or(&[]))
                    .chain_err(|| {
                        ErrorKind::CorruptWad(format!("Truncated header for texture {}.", name))
                    })?;
                return Ok(Some(TextureDef {
                    header,
                    lump,
                    offset,
                }));
            }
        }
        Ok(None)
    }

    /// Composites the named wall texture. `Ok(None)` when no definition has
    /// that name.
    pub fn build_texture(&self, name: WadName) -> Result<Option<Image>> {
        let definition = match self.find_texture(name)? {
            Some(definition) => definition,
            None => return Ok(None),
        };
        let width = definition.width();
        let height = definition.height();
        debug!("Compositing texture {} ({}x{})", name, width, height);
        let mut image = Image::new(width.max(0) as usize, height.max(0) as usize)?;

        for (i_patch, patch_ref) in definition.patch_refs()?.iter().enumerate() {
            let patch_name = match self.patch_name(patch_ref.patch) {
                Some(patch_name) => patch_name,
                None => {
                    warn!(
                        "Skipping patch {} in {}: bad name index {}.",
                        i_patch, name, patch_ref.patch
                    );
                    continue;
                }
            };
            let lump = match self.wad.named_lump(&patch_name, self.patch_start) {
                Some(lump) => lump,
                None => {
                    warn!("Skipping patch {} in {}: no lump `{}`.", i_patch, name, patch_name);
                    continue;
                }
            };
            image
                .blit_patch(
                    lump.bytes()?,
                    i32::from(patch_ref.origin_x),
                    i32::from(patch_ref.origin_y),
                    &self.palette,
                )
                .chain_err(|| {
                    ErrorKind::image(format!("Bad patch `{}` in texture {}.", patch_name, name))
                })?;
        }
        Ok(Some(image))
    }

    /// Builds the named flat. `Ok(None)` when no lump has that name.
    pub fn build_flat(&self, name: WadName) -> Result<Option<Image>> {
        match self.wad.named_lump(name.as_str(), self.flat_start) {
            Some(lump) => {
                debug!("Expanding flat {}", name);
                Image::from_flat(lump.bytes()?, &self.palette).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Upper-cased, since some PNAMES entries are lower case while directory
    /// names never are.
    fn patch_name(&self, index: i16) -> Option<String> {
        let num_names = read_i32(self.patch_names, 0).ok()?;
        if index < 0 || i32::from(index) >= num_names {
            return None;
        }
        let offset = 4 + index as usize * PATCH_NAME_SIZE;
        read_fixed_string(self.patch_names, offset, PATCH_NAME_SIZE)
            .ok()
            .map(|name| name.to_ascii_uppercase())
    }
}
