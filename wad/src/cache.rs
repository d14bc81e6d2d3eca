use super::errors::{ErrorKind, Result};
use super::image::Image;
use super::tex::TextureCompositor;
use super::types::WadName;
use indexmap::IndexMap;
use log::error;
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MaterialKind {
    Texture,
    Flat,
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str(match *self {
            MaterialKind::Texture => "texture",
            MaterialKind::Flat => "flat",
        })
    }
}

/// Memoizes composited materials by kind and name, in first-request order.
///
/// Failures are memoized too: a material that cannot be built is attempted
/// once, logged once, and every later request for it fails immediately.
pub struct MaterialCache<'a> {
    compositor: TextureCompositor<'a>,
    materials: IndexMap<(MaterialKind, WadName), Option<Image>>,
}

impl<'a> MaterialCache<'a> {
    pub fn new(compositor: TextureCompositor<'a>) -> Self {
        MaterialCache {
            compositor,
            materials: IndexMap::new(),
        }
    }

    pub fn texture(&mut self, name: WadName) -> Result<&Image> {
        self.get(MaterialKind::Texture, name)
    }

    pub fn flat(&mut self, name: WadName) -> Result<&Image> {
        self.get(MaterialKind::Flat, name)
    }

    pub fn get(&mut self, kind: MaterialKind, name: WadName) -> Result<&Image> {
        let key = (kind, name);
        if !self.materials.contains_key(&key) {
            let built = match kind {
                MaterialKind::Texture => self.compositor.build_texture(name),
                MaterialKind::Flat => self.compositor.build_flat(name),
            };
            let image = match built {
                Ok(Some(image)) => Some(image),
                Ok(None) => {
                    error!("Failed to load {} `{}`: not found.", kind, name);
                    None
                }
                Err(build_error) => {
                    error!("Failed to load {} `{}`: {}", kind, name, build_error);
                    None
                }
            };
            self.materials.insert(key, image);
        }
        match self.materials.get(&key) {
            Some(Some(image)) => Ok(image),
            _ => Err(ErrorKind::missing_material(kind, name).into()),
        }
    }

    /// Number of distinct materials requested so far, built or not.
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn loaded(&self) -> impl Iterator<Item = (MaterialKind, WadName, &Image)> {
        self.materials
            .iter()
            .filter_map(|(&(kind, name), image)| image.as_ref().map(|image| (kind, name, image)))
    }

    pub fn failed(&self) -> impl Iterator<Item = (MaterialKind, WadName)> + '_ {
        self.materials
            .iter()
            .filter(|(_, image)| image.is_none())
            .map(|(&key, _)| key)
    }
}
