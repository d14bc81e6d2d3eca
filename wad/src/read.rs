use super::errors::{ErrorKind, Result};
use byteorder::{ByteOrder, LittleEndian};

fn window(bytes: &[u8], offset: usize, size: usize) -> Result<&[u8]> {
    offset
        .checked_add(size)
        .and_then(|end| bytes.get(offset..end))
        .ok_or_else(|| ErrorKind::read_out_of_bounds(offset, size, bytes.len()).into())
}

pub fn read_u8(bytes: &[u8], offset: usize) -> Result<u8> {
    Ok(window(bytes, offset, 1)?[0])
}

pub fn read_i16(bytes: &[u8], offset: usize) -> Result<i16> {
    Ok(LittleEndian::read_i16(window(bytes, offset, 2)?))
}

pub fn read_i32(bytes: &[u8], offset: usize) -> Result<i32> {
    Ok(LittleEndian::read_i32(window(bytes, offset, 4)?))
}

/// Reads `max_len` bytes and keeps every non-NUL one, so embedded NULs shorten
/// the string without terminating it.
pub fn read_fixed_string(bytes: &[u8], offset: usize, max_len: usize) -> Result<String> {
    Ok(window(bytes, offset, max_len)?
        .iter()
        .filter(|&&byte| byte != 0)
        .map(|&byte| char::from(byte))
        .collect())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn signed_short_wraps_above_i16_max() {
        let raw = 40000u16.to_le_bytes();
        assert_eq!(read_i16(&raw, 0).expect("in bounds"), -25536);
        assert_eq!(read_i16(&[0x34, 0x12], 0).expect("in bounds"), 0x1234);
    }

    #[test]
    fn int32_is_little_endian() {
        let bytes = [0xff, 0x78, 0x56, 0x34, 0x12];
        assert_eq!(read_i32(&bytes, 1).expect("in bounds"), 0x1234_5678);
        assert_eq!(read_i32(&(-2i32).to_le_bytes(), 0).expect("in bounds"), -2);
        assert_eq!(read_u8(&bytes, 0).expect("in bounds"), 0xff);
    }

    #[test]
    fn fixed_string_skips_embedded_nuls() {
        let bytes = b"AB\0CD\0\0E";
        assert_eq!(read_fixed_string(bytes, 0, 8).expect("in bounds"), "ABCDE");
        assert_eq!(read_fixed_string(bytes, 0, 2).expect("in bounds"), "AB");
        assert_eq!(read_fixed_string(b"\0\0\0\0", 0, 4).expect("in bounds"), "");
    }

    #[test]
    fn reads_past_end_are_errors() {
        let bytes = [1u8, 2, 3];
        assert!(read_i32(&bytes, 0).is_err());
        assert!(read_i16(&bytes, 2).is_err());
        assert!(read_u8(&bytes, 3).is_err());
        assert!(read_fixed_string(&bytes, usize::max_value(), 8).is_err());
        match read_i16(&bytes, 2).map_err(|e| e.kind().clone()) {
            Err(ErrorKind::CorruptWad(_)) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }
}
