use super::errors::{ErrorKind, Result};
use super::read;
use bincode;
use failchain::{bail, ensure, ResultExt};
use log::{info, warn};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::fs;
use std::mem;
use std::path::Path;
use std::time::Instant;

const HEADER_SIZE: usize = 12;
const DIRECTORY_ENTRY_SIZE: usize = 16;
const LUMP_NAME_SIZE: usize = 8;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WadType {
    Initial,
    Patch,
}

/// An in-memory WAD file: the raw bytes plus the decoded lump directory.
#[derive(Debug)]
pub struct Archive {
    bytes: Vec<u8>,
    wad_type: Option<WadType>,
    lumps: Vec<LumpInfo>,
    levels: Vec<usize>,
}

/// A directory entry. Names are the raw directory strings and need not be
/// unique.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LumpInfo {
    pub name: String,
    pub offset: i32,
    pub length: i32,
    pub index: usize,
}

impl Archive {
    pub fn open<P: AsRef<Path> + Debug>(wad_path: &P) -> Result<Archive> {
        info!("Loading wad file {:?}...", wad_path);
        let start_time = Instant::now();
        let bytes = fs::read(wad_path).chain_err(ErrorKind::on_file_open)?;
        let archive = Archive::from_bytes(bytes)?;
        info!(
            "Loaded {} lumps, {} levels in {:.2}ms.",
            archive.num_lumps(),
            archive.num_levels(),
            start_time.elapsed().as_secs_f64() * 1000.0
        );
        Ok(archive)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Archive> {
        ensure!(bytes.len() >= HEADER_SIZE, ErrorKind::bad_wad_header());
        let wad_type = match &bytes[..4] {
            b"IWAD" => Some(WadType::Initial),
            b"PWAD" => Some(WadType::Patch),
            identifier => {
                warn!(
                    "Unexpected WAD identifier `{}`, loading anyway.",
                    String::from_utf8_lossy(identifier)
                );
                None
            }
        };

        let num_lumps = read::read_i32(&bytes, 4)?;
        let directory_offset = read::read_i32(&bytes, 8)?;
        let directory_end = if num_lumps >= 0 && directory_offset >= 0 {
            (num_lumps as usize)
                .checked_mul(DIRECTORY_ENTRY_SIZE)
                .and_then(|size| size.checked_add(directory_offset as usize))
        } else {
            None
        };
        match directory_end {
            Some(end) if end <= bytes.len() => {}
            _ => bail!(ErrorKind::bad_directory(
                num_lumps,
                directory_offset,
                bytes.len()
            )),
        }

        let mut lumps = Vec::with_capacity(num_lumps as usize);
        let mut levels = Vec::with_capacity(64);
        for index in 0..num_lumps as usize {
            let entry = directory_offset as usize + index * DIRECTORY_ENTRY_SIZE;
            let name = read::read_fixed_string(&bytes, entry + 8, LUMP_NAME_SIZE)?;

            // A level is the marker lump immediately preceding a `THINGS` lump.
            if name == "THINGS" && index > 0 {
                levels.push(index - 1);
            }
            lumps.push(LumpInfo {
                offset: read::read_i32(&bytes, entry)?,
                length: read::read_i32(&bytes, entry + 4)?,
                name,
                index,
            });
        }

        Ok(Archive {
            bytes,
            wad_type,
            lumps,
            levels,
        })
    }

    pub fn wad_type(&self) -> Option<WadType> {
        self.wad_type
    }

    pub fn num_lumps(&self) -> usize {
        self.lumps.len()
    }

    /// First lump at or after `start_index` whose directory name is exactly
    /// `name`.
    pub fn find_lump(&self, name: &str, start_index: usize) -> Option<&LumpInfo> {
        self.lumps
            .iter()
            .skip(start_index)
            .find(|lump| lump.name == name)
    }

    pub fn named_lump(&self, name: &str, start_index: usize) -> Option<LumpReader> {
        self.find_lump(name, start_index).map(|info| LumpReader {
            archive: self,
            info,
        })
    }

    pub fn required_lump(&self, name: &str, start_index: usize) -> Result<LumpReader> {
        self.named_lump(name, start_index)
            .ok_or_else(|| ErrorKind::missing_required_lump(&name).into())
    }

    pub fn lump_by_index(&self, index: usize) -> Result<LumpReader> {
        Ok(LumpReader {
            archive: self,
            info: self
                .lumps
                .get(index)
                .ok_or_else(|| ErrorKind::missing_required_lump(&index))?,
        })
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn level_lump(&self, level_index: usize) -> Result<LumpReader> {
        match self.levels.get(level_index) {
            Some(&index) => self.lump_by_index(index),
            None => bail!(ErrorKind::missing_required_lump(&level_index)),
        }
    }

    pub fn level_names(&self) -> impl Iterator<Item = &str> {
        self.levels
            .iter()
            .map(move |&index| &self.lumps[index].name[..])
    }
}

#[derive(Copy, Clone, Debug)]
pub struct LumpReader<'a> {
    archive: &'a Archive,
    info: &'a LumpInfo,
}

impl<'a> LumpReader<'a> {
    pub fn index(&self) -> usize {
        self.info.index
    }

    pub fn name(&self) -> &'a str {
        &self.info.name
    }

    /// The lump's bytes, checked against the end of the file.
    pub fn bytes(&self) -> Result<&'a [u8]> {
        let LumpInfo {
            ref name,
            offset,
            length,
            index,
        } = *self.info;
        let bytes = &self.archive.bytes;
        if offset >= 0 && length >= 0 {
            let start = offset as usize;
            if let Some(lump) = bytes.get(start..start + length as usize) {
                return Ok(lump);
            }
        }
        bail!(ErrorKind::bad_lump_range(index, name, offset, length))
    }

    /// Decodes the lump as a packed array of fixed-size records.
    pub fn decode_vec<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        let LumpInfo {
            ref name, index, ..
        } = *self.info;
        let bytes = self.bytes()?;
        let element_size = mem::size_of::<T>();
        ensure!(
            element_size > 0 && bytes.len() % element_size == 0,
            ErrorKind::bad_lump_size(index, name, bytes.len(), element_size.max(1))
        );
        bytes
            .chunks(element_size)
            .enumerate()
            .map(|(i_element, chunk)| {
                bincode::deserialize(chunk)
                    .chain_err(|| ErrorKind::bad_lump_element(index, name, i_element))
            })
            .collect()
    }
}
