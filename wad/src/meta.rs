use super::errors::{ErrorKind, Result};
use super::types::{FlatRef, WadName};
use failchain::ResultExt;
use regex::Regex;
use serde::{de::Error as SerdeDeError, Deserialize, Deserializer};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::result::Result as StdResult;
use toml;

const DEFAULT_SKY_PATTERN: &str = "^F_SKY";
const DEFAULT_MAX_MERGE_PASSES: usize = 25;
const DEFAULT_ANGLE_TOLERANCE: f64 = 0.0;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TextureMetadata {
    /// Searched in order; only the first one must exist.
    pub texture_lumps: Vec<String>,
    pub patch_names_lump: String,
    pub patch_start_marker: String,
    pub palette_lump: String,
    pub flat_start_marker: String,
}

impl Default for TextureMetadata {
    fn default() -> Self {
        TextureMetadata {
            texture_lumps: vec!["TEXTURE1".to_owned(), "TEXTURE2".to_owned()],
            patch_names_lump: "PNAMES".to_owned(),
            patch_start_marker: "P_START".to_owned(),
            palette_lump: "PLAYPAL".to_owned(),
            flat_start_marker: "F_START".to_owned(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SkyMetadata {
    #[serde(deserialize_with = "deserialize_regex_from_str")]
    pub flat_pattern: Regex,
}

impl Default for SkyMetadata {
    fn default() -> Self {
        SkyMetadata {
            flat_pattern: Regex::new(DEFAULT_SKY_PATTERN).expect("built-in sky pattern is valid"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PolygonMetadata {
    pub max_merge_passes: usize,
    /// How far a unit dot product may stray outside `[-1, 1]` before the
    /// sector is reported. Zero reports every excursion that `acos` would
    /// turn into a NaN.
    pub angle_tolerance: f64,
}

impl Default for PolygonMetadata {
    fn default() -> Self {
        PolygonMetadata {
            max_merge_passes: DEFAULT_MAX_MERGE_PASSES,
            angle_tolerance: DEFAULT_ANGLE_TOLERANCE,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoaderMetadata {
    pub textures: TextureMetadata,
    pub sky: SkyMetadata,
    pub polygons: PolygonMetadata,
}

impl LoaderMetadata {
    pub fn from_file<P: AsRef<Path>>(path: &P) -> Result<LoaderMetadata> {
        let mut contents = String::new();
        let path = path.as_ref();
        File::open(path)
            .and_then(|mut file| file.read_to_string(&mut contents))
            .chain_err(|| ErrorKind::on_metadata_read())?;
        LoaderMetadata::from_text(&contents)
    }

    pub fn from_text(text: &str) -> Result<LoaderMetadata> {
        toml::from_str(text).chain_err(ErrorKind::on_metadata_parse)
    }

    pub fn flat_ref(&self, name: WadName) -> FlatRef {
        if self.sky.flat_pattern.is_match(name.as_str()) {
            FlatRef::Sky
        } else {
            FlatRef::Named(name)
        }
    }
}

fn deserialize_regex_from_str<'de, D>(deserializer: D) -> StdResult<Regex, D::Error>
where
    D: Deserializer<'de>,
{
    Regex::new(&String::deserialize(deserializer)?).map_err(D::Error::custom)
}

#[cfg(test)]
mod test {
    use super::LoaderMetadata;
    use crate::errors::ErrorKind;
    use crate::types::{FlatRef, WadName};
    use std::str::FromStr;

    fn name(text: &str) -> WadName {
        WadName::from_str(text).expect("test: bad name")
    }

    #[test]
    fn defaults() {
        let meta = LoaderMetadata::from_text("").expect("test: empty metadata");
        assert_eq!(meta.textures.texture_lumps, vec!["TEXTURE1", "TEXTURE2"]);
        assert_eq!(meta.textures.patch_names_lump, "PNAMES");
        assert_eq!(meta.textures.patch_start_marker, "P_START");
        assert_eq!(meta.textures.palette_lump, "PLAYPAL");
        assert_eq!(meta.textures.flat_start_marker, "F_START");
        assert_eq!(meta.polygons.max_merge_passes, 25);
        assert_eq!(meta.polygons.angle_tolerance, 0.0);
        assert_eq!(meta.flat_ref(name("F_SKY1")), FlatRef::Sky);
        assert_eq!(meta.flat_ref(name("FLOOR4_8")), FlatRef::Named(name("FLOOR4_8")));
    }

    #[test]
    fn overrides() {
        let meta = LoaderMetadata::from_text(
            r#"
            [textures]
                texture_lumps = ["TEXTURE1"]
                palette_lump = "MYPAL"
            [sky]
                flat_pattern = "^(F_SKY|SKYFLAT)"
            [polygons]
                max_merge_passes = 3
                angle_tolerance = 1e-9
        "#,
        )
        .expect("test: could not parse test metadata");
        assert_eq!(meta.textures.texture_lumps, vec!["TEXTURE1"]);
        assert_eq!(meta.textures.palette_lump, "MYPAL");
        assert_eq!(meta.textures.patch_names_lump, "PNAMES");
        assert_eq!(meta.polygons.max_merge_passes, 3);
        assert_eq!(meta.polygons.angle_tolerance, 1e-9);
        assert_eq!(meta.flat_ref(name("SKYFLAT")), FlatRef::Sky);
        assert_eq!(meta.flat_ref(name("F_SKY2")), FlatRef::Sky);
    }

    #[test]
    fn bad_metadata() {
        let bad_regex = LoaderMetadata::from_text("[sky]\nflat_pattern = \"(\"\n");
        match bad_regex.map_err(|e| e.kind().clone()) {
            Err(ErrorKind::CorruptMetadata(_)) => {}
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
        let missing = LoaderMetadata::from_file(&"/nonexistent/wadmesh.toml");
        match missing.map_err(|e| e.kind().clone()) {
            Err(ErrorKind::Io(_)) => {}
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
    }
}
