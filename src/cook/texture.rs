#![forbid(unsafe_code)]

use crate::asset::AssetMetadata;
use crate::cook::context::CookContext;
use crate::cook::error::CookResult;
use crate::cook::format::{begin, invalid, open, ArtifactKind};
use crate::io::{read_u32, read_vec, write_u32};

pub(crate) const EXTENSION: &str = "horsetex";

const KIND: ArtifactKind = ArtifactKind::Texture;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum TextureFormat {
    Rgba8 = 0,
}

impl TextureFormat {
    pub fn from_u32(v: u32) -> Option<Self> {
        match v {
            0 => Some(Self::Rgba8),
            _ => None,
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8 => 4,
        }
    }
}

/// Cooked texture: `[HTEX][ver][width][height][format][mips][data_size][data]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureArtifact {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub mip_count: u32,
    pub data: Vec<u8>,
}

impl TextureArtifact {
    pub fn encode(&self) -> CookResult<Vec<u8>> {
        let size = u32::try_from(self.data.len()).map_err(|_| invalid(KIND, "data too large"))?;
        let mut out = begin(KIND);
        write_u32(&mut out, self.width)?;
        write_u32(&mut out, self.height)?;
        write_u32(&mut out, self.format as u32)?;
        write_u32(&mut out, self.mip_count)?;
        write_u32(&mut out, size)?;
        out.extend_from_slice(&self.data);
        Ok(out)
    }

    pub fn decode(bytes: &[u8]) -> CookResult<Self> {
        let mut cur = open(bytes, KIND)?;
        let width = read_u32(&mut cur)?;
        let height = read_u32(&mut cur)?;
        let raw_format = read_u32(&mut cur)?;
        let format = TextureFormat::from_u32(raw_format)
            .ok_or_else(|| invalid(KIND, format!("unknown format {raw_format}")))?;
        let mip_count = read_u32(&mut cur)?;
        let size = read_u32(&mut cur)? as usize;

        let expected = u64::from(width)
            .checked_mul(u64::from(height))
            .and_then(|px| px.checked_mul(format.bytes_per_pixel() as u64))
            .ok_or_else(|| invalid(KIND, format!("dimensions {width}x{height} overflow")))?;
        if mip_count == 1 && size as u64 != expected {
            return Err(invalid(
                KIND,
                format!("data size {size} does not match {width}x{height}"),
            ));
        }
        let data = read_vec(&mut cur, size)?;
        Ok(Self {
            width,
            height,
            format,
            mip_count,
            data,
        })
    }
}

pub(crate) fn cook(source: &[u8], _md: &AssetMetadata, _ctx: &CookContext<'_>) -> CookResult<Vec<u8>> {
    let img = image::load_from_memory(source)?.to_rgba8();
    TextureArtifact {
        width: img.width(),
        height: img.height(),
        format: TextureFormat::Rgba8,
        mip_count: 1,
        data: img.into_raw(),
    }
    .encode()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{AssetHandle, AssetRegistry, AssetType};
    use crate::cook::CookError;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;
    use std::path::Path;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(w, h, |x, y| Rgba([x as u8, y as u8, 0x40, 0xff]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn metadata() -> AssetMetadata {
        AssetMetadata {
            handle: AssetHandle::new(9),
            asset_type: AssetType::Texture,
            file_path: "texture.png".into(),
        }
    }

    #[test]
    fn cooks_64x64_rgba() {
        let reg = AssetRegistry::new();
        let ctx = CookContext::new(&reg, Path::new("."), "desktop");
        let cooked = cook(&png_bytes(64, 64), &metadata(), &ctx).unwrap();

        assert_eq!(&cooked[..4], b"HTEX");
        assert_eq!(u32::from_le_bytes(cooked[4..8].try_into().unwrap()), 1);
        assert_eq!(cooked.len(), 8 + 5 * 4 + 16384);

        let tex = TextureArtifact::decode(&cooked).unwrap();
        assert_eq!((tex.width, tex.height), (64, 64));
        assert_eq!(tex.format, TextureFormat::Rgba8);
        assert_eq!(tex.mip_count, 1);
        assert_eq!(tex.data.len(), 16384);
        assert_eq!(&tex.data[4..8], &[1, 0, 0x40, 0xff]);
    }

    #[test]
    fn garbage_source_fails() {
        let reg = AssetRegistry::new();
        let ctx = CookContext::new(&reg, Path::new("."), "desktop");
        assert!(matches!(
            cook(b"definitely not an image", &metadata(), &ctx),
            Err(CookError::Image(_))
        ));
    }

    #[test]
    fn decode_rejects_short_payload() {
        let tex = TextureArtifact {
            width: 2,
            height: 2,
            format: TextureFormat::Rgba8,
            mip_count: 1,
            data: vec![0; 16],
        };
        let mut bytes = tex.encode().unwrap();
        assert_eq!(TextureArtifact::decode(&bytes).unwrap(), tex);
        bytes.truncate(bytes.len() - 1);
        assert!(TextureArtifact::decode(&bytes).is_err());
    }

    #[test]
    fn decode_rejects_overflowing_dimensions() {
        let mut bytes = b"HTEX".to_vec();
        for v in [1, u32::MAX, u32::MAX, 0, 1, 16] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        bytes.extend_from_slice(&[0; 16]);
        assert!(matches!(
            TextureArtifact::decode(&bytes),
            Err(CookError::Invalid { .. })
        ));

        let mut wide = b"HTEX".to_vec();
        for v in [1, u32::MAX, 2, 0, 1, 16] {
            wide.extend_from_slice(&v.to_le_bytes());
        }
        wide.extend_from_slice(&[0; 16]);
        assert!(matches!(
            TextureArtifact::decode(&wide),
            Err(CookError::Invalid { .. })
        ));
    }

    #[test]
    fn decode_rejects_mesh_bytes() {
        let mut bytes = b"HMSH".to_vec();
        bytes.extend_from_slice(&1u32.to_le_bytes());
        assert!(matches!(
            TextureArtifact::decode(&bytes),
            Err(CookError::BadMagic { .. })
        ));
    }
}
