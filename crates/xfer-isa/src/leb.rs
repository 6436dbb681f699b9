//! LEB128 encoding for the bytecode builder.
//!
//! Decoding goes through `wasmparser::BinaryReader`.

/// Maximum encoded length of a 64-bit value.
pub const MAX_LEB_BYTES_64: usize = 10;

/// Append the unsigned LEB128 encoding of `value`.
pub fn write_unsigned(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

/// Append the signed LEB128 encoding of `value`.
pub fn write_signed(out: &mut Vec<u8>, mut value: i64) {
    loop {
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        let done = (value == 0 && byte & 0x40 == 0) || (value == -1 && byte & 0x40 != 0);
        if done {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasmparser::BinaryReader;

    #[test]
    fn test_write_matches_reference_encodings() {
        let mut out = Vec::new();
        write_unsigned(&mut out, 624_485);
        assert_eq!(out, [0xE5, 0x8E, 0x26]);

        out.clear();
        write_signed(&mut out, -123_456);
        assert_eq!(out, [0xC0, 0xBB, 0x78]);

        out.clear();
        write_signed(&mut out, 64);
        assert_eq!(out, [0xC0, 0x00]);
    }

    #[test]
    fn test_unsigned_reads_back() {
        let mut out = Vec::new();
        for value in [0, 127, 128, 624_485, u32::MAX] {
            write_unsigned(&mut out, u64::from(value));
        }
        let mut reader = BinaryReader::new(&out, 0);
        for value in [0, 127, 128, 624_485, u32::MAX] {
            assert_eq!(reader.read_var_u32().unwrap(), value);
        }
        assert!(reader.eof());
    }

    #[test]
    fn test_i64_extremes() {
        let mut out = Vec::new();
        write_signed(&mut out, i64::MIN);
        assert_eq!(out.len(), MAX_LEB_BYTES_64);
        write_signed(&mut out, -1);
        assert_eq!(out.len(), MAX_LEB_BYTES_64 + 1);

        let mut reader = BinaryReader::new(&out, 0);
        assert_eq!(reader.read_var_i64().unwrap(), i64::MIN);
        assert_eq!(reader.read_var_i64().unwrap(), -1);
    }
}
