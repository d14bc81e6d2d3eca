use super::errors::{Error, ErrorKind, Result};
use failchain::{bail, ensure};
use serde::de::{Deserialize, Deserializer, Error as SerdeDeError};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::result::Result as StdResult;
use std::str::{self, FromStr};

/// An eight byte, NUL padded, upper-case lump or material name.
///
/// Construction validates the character set and upper-cases the input, so two
/// names compare equal exactly when the original strings match ignoring case.
#[derive(Clone, Copy, PartialEq, PartialOrd, Ord, Eq, Hash)]
pub struct WadName([u8; 8]);

impl WadName {
    pub fn from_bytes(value: &[u8]) -> Result<WadName> {
        let mut name = [0u8; 8];
        let mut nulled = false;
        for (i_byte, &src) in value.iter().enumerate() {
            let new_byte = match src.to_ascii_uppercase() {
                b @ b'A'..=b'Z'
                | b @ b'0'..=b'9'
                | b @ b'_'
                | b @ b'-'
                | b @ b'['
                | b @ b']'
                | b @ b'%'
                | b @ b'\\' => b,
                b'\0' => {
                    nulled = true;
                    break;
                }
                b => bail!(ErrorKind::invalid_byte_in_wad_name(b, value)),
            };
            ensure!(i_byte < 8, ErrorKind::wad_name_too_long(value));
            name[i_byte] = new_byte;
        }
        ensure!(
            nulled || value.len() <= 8,
            ErrorKind::wad_name_too_long(value)
        );
        Ok(WadName(name))
    }

    pub fn as_str(&self) -> &str {
        let len = self.0.iter().position(|&b| b == 0).unwrap_or(8);
        // Only ASCII bytes are ever stored.
        str::from_utf8(&self.0[..len]).unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }
}

impl FromStr for WadName {
    type Err = Error;
    fn from_str(value: &str) -> Result<WadName> {
        WadName::from_bytes(value.as_bytes())
    }
}

impl fmt::Display for WadName {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl fmt::Debug for WadName {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "WadName({:?})", self.as_str())
    }
}

impl Deref for WadName {
    type Target = [u8; 8];
    fn deref(&self) -> &[u8; 8] {
        &self.0
    }
}

impl PartialEq<[u8; 8]> for WadName {
    fn eq(&self, rhs: &[u8; 8]) -> bool {
        self.deref() == rhs
    }
}

impl Borrow<[u8; 8]> for WadName {
    fn borrow(&self) -> &[u8; 8] {
        self.deref()
    }
}

impl AsRef<str> for WadName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<'de> Deserialize<'de> for WadName {
    fn deserialize<D>(deserializer: D) -> StdResult<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        WadName::from_bytes(&<[u8; 8]>::deserialize(deserializer)?).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::WadName;
    use std::str::FromStr;

    fn name(text: &str) -> WadName {
        WadName::from_str(text).expect("test: bad wad name")
    }

    #[test]
    fn pads_and_truncates_at_nul() {
        assert_eq!(&name(""), b"\0\0\0\0\0\0\0\0");
        assert_eq!(&name("\01234567"), b"\0\0\0\0\0\0\0\0");
        assert_eq!(&name("1234567"), b"1234567\0");
        assert_eq!(&name("12345678"), b"12345678");
        assert_eq!(&name("123\05678"), b"123\0\0\0\0\0");
        assert_eq!(&name("-"), b"-\0\0\0\0\0\0\0");
        assert!(name("").is_empty());
        assert!(!name("-").is_empty());
    }

    #[test]
    fn comparisons_ignore_case() {
        assert_eq!(name("startan3"), name("STARTAN3"));
        assert_eq!(name("w94_1").as_str(), "W94_1");
        assert_eq!(name("sky1").to_string(), "SKY1");
    }

    #[test]
    fn rejects_bad_names() {
        assert!(WadName::from_bytes(b"123456789").is_err());
        assert!(WadName::from_bytes(b"1234\xfb").is_err());
        assert!(WadName::from_bytes(b"\xff123").is_err());
        assert!(WadName::from_bytes(b"$$ASDF_").is_err());
        assert!(WadName::from_bytes(b"123456789\0").is_err());
    }
}
