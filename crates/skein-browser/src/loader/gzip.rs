//! gzip content-coding (RFC 1952) on top of `miniz_oxide`'s inflater.

use miniz_oxide::inflate::{TINFLStatus, decompress_to_vec_with_limit};

use skein_types::error::{Result, SkeinError};

const MAGIC: [u8; 2] = [0x1f, 0x8b];
const METHOD_DEFLATE: u8 = 8;

const FHCRC: u8 = 0x02;
const FEXTRA: u8 = 0x04;
const FNAME: u8 = 0x08;
const FCOMMENT: u8 = 0x10;

/// Fixed header (10 bytes) plus trailer (CRC32 + ISIZE, 8 bytes).
const MIN_MEMBER_LEN: usize = 18;

/// Decompress a single gzip member, refusing output larger than
/// `max_size`.
///
/// The ISIZE trailer is checked against the inflated length.
pub fn decode_gzip(data: &[u8], max_size: usize) -> Result<Vec<u8>> {
    if data.len() < MIN_MEMBER_LEN {
        return Err(SkeinError::Decode(format!(
            "gzip member too short ({} bytes)",
            data.len()
        )));
    }
    if data[..2] != MAGIC {
        return Err(SkeinError::Decode("missing gzip magic".to_string()));
    }
    if data[2] != METHOD_DEFLATE {
        return Err(SkeinError::UnsupportedEncoding(format!(
            "gzip compression method {}",
            data[2]
        )));
    }

    let flags = data[3];
    let trailer_start = data.len() - 8;
    let header = &data[..trailer_start];
    let mut pos = 10;

    if flags & FEXTRA != 0 {
        let len_bytes = header
            .get(pos..pos + 2)
            .ok_or_else(|| truncated("extra field length"))?;
        let xlen = u16::from_le_bytes([len_bytes[0], len_bytes[1]]) as usize;
        pos += 2 + xlen;
    }
    if flags & FNAME != 0 {
        pos = skip_zero_terminated(header, pos).ok_or_else(|| truncated("file name"))?;
    }
    if flags & FCOMMENT != 0 {
        pos = skip_zero_terminated(header, pos).ok_or_else(|| truncated("comment"))?;
    }
    if flags & FHCRC != 0 {
        pos += 2;
    }
    if pos > trailer_start {
        return Err(truncated("header"));
    }

    let deflated = &data[pos..trailer_start];
    let out = decompress_to_vec_with_limit(deflated, max_size).map_err(|e| match e.status {
        TINFLStatus::HasMoreOutput => {
            SkeinError::Decode(format!("gzip body exceeds {max_size} bytes"))
        },
        status => SkeinError::Decode(format!("gzip inflate failed: {status:?}")),
    })?;

    let trailer = &data[trailer_start..];
    let isize = u32::from_le_bytes([trailer[4], trailer[5], trailer[6], trailer[7]]);
    if out.len() as u32 != isize {
        return Err(SkeinError::Decode(format!(
            "gzip length mismatch: trailer says {isize}, inflated {}",
            out.len()
        )));
    }

    Ok(out)
}

/// Position just past the next zero byte at or after `pos`.
fn skip_zero_terminated(data: &[u8], pos: usize) -> Option<usize> {
    let rest = data.get(pos..)?;
    rest.iter().position(|&b| b == 0).map(|i| pos + i + 1)
}

fn truncated(what: &str) -> SkeinError {
    SkeinError::Decode(format!("truncated gzip {what}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{GZIP_HELLO, GZIP_HELLO_PLAIN};

    const LIMIT: usize = 1024 * 1024;

    #[test]
    fn decodes_plain_member() {
        let out = decode_gzip(GZIP_HELLO, LIMIT).unwrap();
        assert_eq!(out, GZIP_HELLO_PLAIN);
    }

    #[test]
    fn skips_file_name_field() {
        // Same member with FNAME set and "a.html\0" inserted after the
        // fixed header.
        let mut data = GZIP_HELLO[..10].to_vec();
        data[3] |= FNAME;
        data.extend_from_slice(b"a.html\0");
        data.extend_from_slice(&GZIP_HELLO[10..]);
        assert_eq!(decode_gzip(&data, LIMIT).unwrap(), GZIP_HELLO_PLAIN);
    }

    #[test]
    fn skips_extra_field() {
        let mut data = GZIP_HELLO[..10].to_vec();
        data[3] |= FEXTRA;
        data.extend_from_slice(&[3, 0, b'x', b'y', b'z']);
        data.extend_from_slice(&GZIP_HELLO[10..]);
        assert_eq!(decode_gzip(&data, LIMIT).unwrap(), GZIP_HELLO_PLAIN);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut data = GZIP_HELLO.to_vec();
        data[0] = 0;
        let err = decode_gzip(&data, LIMIT).unwrap_err();
        assert!(matches!(err, SkeinError::Decode(_)));
    }

    #[test]
    fn rejects_unknown_method() {
        let mut data = GZIP_HELLO.to_vec();
        data[2] = 7;
        let err = decode_gzip(&data, LIMIT).unwrap_err();
        assert!(matches!(err, SkeinError::UnsupportedEncoding(_)));
    }

    #[test]
    fn rejects_short_input() {
        assert!(decode_gzip(&GZIP_HELLO[..12], LIMIT).is_err());
    }

    #[test]
    fn rejects_length_mismatch() {
        let mut data = GZIP_HELLO.to_vec();
        let n = data.len();
        data[n - 4] ^= 0x01;
        let err = decode_gzip(&data, LIMIT).unwrap_err();
        assert!(err.to_string().contains("length mismatch"));
    }

    #[test]
    fn enforces_size_limit() {
        let err = decode_gzip(GZIP_HELLO, 4).unwrap_err();
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn corrupt_stream_is_decode_error() {
        let mut data = GZIP_HELLO.to_vec();
        data[10] = 0xff;
        data[11] = 0xff;
        let err = decode_gzip(&data, LIMIT).unwrap_err();
        assert!(matches!(err, SkeinError::Decode(_)));
    }
}
