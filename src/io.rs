#![forbid(unsafe_code)]

use std::io::{self, Read, Write};

pub fn write_u16(w: &mut dyn Write, v: u16) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

pub fn write_u32(w: &mut dyn Write, v: u32) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

pub fn write_u64(w: &mut dyn Write, v: u64) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

pub fn write_f32(w: &mut dyn Write, v: f32) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

/// Writes a `u32` length prefix followed by the bytes.
pub fn write_blob(w: &mut dyn Write, bytes: &[u8]) -> io::Result<()> {
    let len = u32::try_from(bytes.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "blob larger than 4 GiB"))?;
    write_u32(w, len)?;
    w.write_all(bytes)
}

pub fn read_exact<const N: usize>(r: &mut dyn Read) -> io::Result<[u8; N]> {
    let mut buf = [0u8; N];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

pub fn read_u16(r: &mut dyn Read) -> io::Result<u16> {
    Ok(u16::from_le_bytes(read_exact::<2>(r)?))
}

pub fn read_u32(r: &mut dyn Read) -> io::Result<u32> {
    Ok(u32::from_le_bytes(read_exact::<4>(r)?))
}

pub fn read_u64(r: &mut dyn Read) -> io::Result<u64> {
    Ok(u64::from_le_bytes(read_exact::<8>(r)?))
}

pub fn read_f32(r: &mut dyn Read) -> io::Result<f32> {
    Ok(f32::from_le_bytes(read_exact::<4>(r)?))
}

/// Reads a `u32` length prefix and exactly that many bytes.
pub fn read_blob(r: &mut dyn Read) -> io::Result<Vec<u8>> {
    let len = read_u32(r)? as usize;
    read_vec(r, len)
}

pub fn read_vec(r: &mut dyn Read, len: usize) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    (&mut *r).take(len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("expected {len} bytes, got {}", buf.len()),
        ));
    }
    Ok(buf)
}

/// 32-bit integrity hash: the first four bytes of blake3, little-endian.
pub fn hash32(bytes: &[u8]) -> u32 {
    let full = blake3::hash(bytes);
    let b = full.as_bytes();
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn blob_rejects_truncated_input() {
        let mut buf = Vec::new();
        write_u32(&mut buf, 10).unwrap();
        buf.extend_from_slice(b"abc");
        let err = read_blob(&mut Cursor::new(buf)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn hash32_is_stable_and_content_sensitive() {
        assert_eq!(hash32(b"horse"), hash32(b"horse"));
        assert_ne!(hash32(b"horse"), hash32(b"horsf"));
    }
}
