use failchain::{BoxedError, ChainErrorKind};
use failure::Fail;
use std::fmt;
use std::result::Result as StdResult;

pub type Error = BoxedError<ErrorKind>;
pub type Result<T> = StdResult<T, Error>;

#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum ErrorKind {
    #[fail(display = "Corrupt metadata file: {}", 0)]
    CorruptMetadata(String),

    #[fail(display = "Corrupt WAD file: {}", 0)]
    CorruptWad(String),

    #[fail(display = "WAD image error: {}", 0)]
    ImageError(String),

    #[fail(display = "I/O WAD error: {}", 0)]
    Io(String),

    #[fail(display = "Failed to load {} `{}`.", kind, name)]
    MissingMaterial { kind: String, name: String },
}

impl ChainErrorKind for ErrorKind {
    type Error = Error;
}

impl ErrorKind {
    pub(crate) fn invalid_byte_in_wad_name(byte: u8, bytes: &[u8]) -> Self {
        ErrorKind::CorruptWad(format!(
            "Invalid character `{}` in wad name `{}`.",
            char::from(byte),
            String::from_utf8_lossy(bytes),
        ))
    }

    pub(crate) fn wad_name_too_long(bytes: &[u8]) -> Self {
        ErrorKind::CorruptWad(format!(
            "Wad name too long `{}`.",
            String::from_utf8_lossy(bytes)
        ))
    }

    pub(crate) fn read_out_of_bounds(offset: usize, size: usize, buffer_len: usize) -> Self {
        ErrorKind::CorruptWad(format!(
            "Read of {} bytes at offset {} past end of buffer ({} bytes).",
            size, offset, buffer_len
        ))
    }

    pub(crate) fn bad_wad_header() -> Self {
        ErrorKind::CorruptWad("Could not read WAD header.".to_owned())
    }

    pub(crate) fn bad_directory(num_lumps: i32, directory_offset: i32, buffer_len: usize) -> Self {
        ErrorKind::CorruptWad(format!(
            "Invalid lump directory: {} lumps at offset {}, file is {} bytes.",
            num_lumps, directory_offset, buffer_len
        ))
    }

    pub(crate) fn bad_lump_range(index: usize, name: &str, offset: i32, length: i32) -> Self {
        ErrorKind::CorruptWad(format!(
            "Lump {} `{}` has an invalid byte range: offset={}, length={}",
            index, name, offset, length
        ))
    }

    pub(crate) fn on_metadata_read() -> Self {
        ErrorKind::Io("Failed to load metadata to memory.".to_owned())
    }

    pub(crate) fn on_metadata_parse() -> Self {
        ErrorKind::CorruptMetadata("Failed to parse metadata file.".to_owned())
    }

    pub(crate) fn on_file_open() -> Self {
        ErrorKind::Io("Failed to open file.".to_owned())
    }

    pub(crate) fn bad_lump_element(lump_index: usize, lump_name: &str, element_index: usize) -> Self {
        ErrorKind::CorruptWad(format!(
            "Invalid element {} in lump `{}` (index={})",
            element_index, lump_name, lump_index
        ))
    }

    pub(crate) fn bad_lump_size(
        index: usize,
        name: &str,
        total_size: usize,
        element_size: usize,
    ) -> Self {
        ErrorKind::CorruptWad(format!(
            "Invalid lump size in `{}` (index={}): total={}, element={}, div={}, mod={}",
            name,
            index,
            total_size,
            element_size,
            total_size / element_size,
            total_size % element_size
        ))
    }

    pub(crate) fn missing_required_lump<NameT: fmt::Debug>(name: &NameT) -> Self {
        ErrorKind::CorruptWad(format!("Missing required lump {:?}", name))
    }

    pub(crate) fn missing_material<KindT, NameT>(kind: KindT, name: NameT) -> Self
    where
        KindT: fmt::Display,
        NameT: fmt::Display,
    {
        ErrorKind::MissingMaterial {
            kind: kind.to_string(),
            name: name.to_string(),
        }
    }

    pub(crate) fn image<StringT: Into<String>>(message: StringT) -> Self {
        ErrorKind::ImageError(message.into())
    }
}
