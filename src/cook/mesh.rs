#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use crate::asset::AssetMetadata;
use crate::cook::context::CookContext;
use crate::cook::error::{CookError, CookResult};
use crate::cook::format::{begin, invalid, open, ArtifactKind};
use crate::io::{read_blob, read_f32, read_u32, write_blob, write_f32, write_u32};

pub(crate) const EXTENSION: &str = "horsemesh";

const KIND: ArtifactKind = ArtifactKind::Mesh;

/// Bytes per vertex: position, normal and uv as `f32`.
pub const VERTEX_STRIDE: u32 = 32;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Cooked mesh.
///
/// Header: vertex count, index count, stride, bounds min and max.
/// Payload: length-prefixed vertex bytes, then length-prefixed `u32` indices.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshArtifact {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub bounds_min: [f32; 3],
    pub bounds_max: [f32; 3],
}

impl MeshArtifact {
    pub fn encode(&self) -> CookResult<Vec<u8>> {
        let vertex_count =
            u32::try_from(self.vertices.len()).map_err(|_| invalid(KIND, "too many vertices"))?;
        let index_count =
            u32::try_from(self.indices.len()).map_err(|_| invalid(KIND, "too many indices"))?;

        let mut out = begin(KIND);
        write_u32(&mut out, vertex_count)?;
        write_u32(&mut out, index_count)?;
        write_u32(&mut out, VERTEX_STRIDE)?;
        for v in self.bounds_min.iter().chain(&self.bounds_max) {
            write_f32(&mut out, *v)?;
        }

        let mut vertex_data = Vec::with_capacity(self.vertices.len() * VERTEX_STRIDE as usize);
        for v in &self.vertices {
            for f in v.position.iter().chain(&v.normal).chain(&v.uv) {
                write_f32(&mut vertex_data, *f)?;
            }
        }
        write_blob(&mut out, &vertex_data)?;

        let mut index_data = Vec::with_capacity(self.indices.len() * 4);
        for i in &self.indices {
            write_u32(&mut index_data, *i)?;
        }
        write_blob(&mut out, &index_data)?;
        Ok(out)
    }

    pub fn decode(bytes: &[u8]) -> CookResult<Self> {
        let mut cur = open(bytes, KIND)?;
        let vertex_count = read_u32(&mut cur)? as usize;
        let index_count = read_u32(&mut cur)? as usize;
        let stride = read_u32(&mut cur)?;
        if stride != VERTEX_STRIDE {
            return Err(invalid(KIND, format!("unsupported vertex stride {stride}")));
        }
        let mut bounds = [0f32; 6];
        for b in &mut bounds {
            *b = read_f32(&mut cur)?;
        }

        let vertex_data = read_blob(&mut cur)?;
        if vertex_data.len() as u64 != vertex_count as u64 * u64::from(VERTEX_STRIDE) {
            return Err(invalid(KIND, "vertex data size does not match vertex count"));
        }
        let mut vcur = Cursor::new(vertex_data);
        let mut vertices = Vec::with_capacity(vertex_count);
        for _ in 0..vertex_count {
            let mut f = [0f32; 8];
            for x in &mut f {
                *x = read_f32(&mut vcur)?;
            }
            vertices.push(Vertex {
                position: [f[0], f[1], f[2]],
                normal: [f[3], f[4], f[5]],
                uv: [f[6], f[7]],
            });
        }

        let index_data = read_blob(&mut cur)?;
        if index_data.len() as u64 != index_count as u64 * 4 {
            return Err(invalid(KIND, "index data size does not match index count"));
        }
        let indices: Vec<u32> = index_data
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        if let Some(bad) = indices.iter().find(|i| **i as usize >= vertex_count) {
            return Err(invalid(KIND, format!("index {bad} out of range")));
        }

        Ok(Self {
            vertices,
            indices,
            bounds_min: [bounds[0], bounds[1], bounds[2]],
            bounds_max: [bounds[3], bounds[4], bounds[5]],
        })
    }
}

pub(crate) fn cook(source: &[u8], md: &AssetMetadata, _ctx: &CookContext<'_>) -> CookResult<Vec<u8>> {
    let ext = Path::new(&md.file_path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    if !ext.eq_ignore_ascii_case("obj") {
        return Err(CookError::Unsupported(format!("mesh format .{ext}")));
    }
    let text = std::str::from_utf8(source)
        .map_err(|_| CookError::Parse("obj is not valid UTF-8".into()))?;
    parse_obj(text)?.encode()
}

/// Wavefront OBJ subset: `v`, `vt`, `vn` and polygonal `f`, fan-triangulated.
/// Vertices are deduplicated by their index triple in first-seen order.
pub(crate) fn parse_obj(text: &str) -> CookResult<MeshArtifact> {
    let mut b = ObjBuilder::default();

    for (n, line) in text.lines().enumerate() {
        let line_no = n + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => {
                let v = floats::<3>(&mut parts, line_no)?;
                b.positions.push(v);
            }
            Some("vt") => {
                let v = floats::<2>(&mut parts, line_no)?;
                b.uvs.push(v);
            }
            Some("vn") => {
                let v = floats::<3>(&mut parts, line_no)?;
                b.normals.push(v);
            }
            Some("f") => {
                let corners = parts
                    .map(|tok| b.corner(tok, line_no))
                    .collect::<CookResult<Vec<u32>>>()?;
                if corners.len() < 3 {
                    return Err(CookError::Parse(format!(
                        "line {line_no}: face needs at least 3 vertices"
                    )));
                }
                for i in 1..corners.len() - 1 {
                    b.indices.extend([corners[0], corners[i], corners[i + 1]]);
                }
            }
            // o, g, s, usemtl, mtllib
            _ => {}
        }
    }

    b.finish()
}

#[derive(Default)]
struct ObjBuilder {
    positions: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    normals: Vec<[f32; 3]>,
    cache: HashMap<(usize, Option<usize>, Option<usize>), u32>,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl ObjBuilder {
    fn corner(&mut self, token: &str, line_no: usize) -> CookResult<u32> {
        let mut it = token.split('/');
        let pos = match it.next() {
            Some(s) if !s.is_empty() => resolve(s, self.positions.len(), line_no)?,
            _ => return Err(CookError::Parse(format!("line {line_no}: bad face vertex {token}"))),
        };
        let uv = match it.next() {
            Some(s) if !s.is_empty() => Some(resolve(s, self.uvs.len(), line_no)?),
            _ => None,
        };
        let normal = match it.next() {
            Some(s) if !s.is_empty() => Some(resolve(s, self.normals.len(), line_no)?),
            _ => None,
        };

        let key = (pos, uv, normal);
        if let Some(idx) = self.cache.get(&key) {
            return Ok(*idx);
        }
        let idx = u32::try_from(self.vertices.len())
            .map_err(|_| CookError::Parse("too many vertices".into()))?;
        self.vertices.push(Vertex {
            position: self.positions[pos],
            normal: normal.map_or([0.0; 3], |i| self.normals[i]),
            uv: uv.map_or([0.0; 2], |i| self.uvs[i]),
        });
        self.cache.insert(key, idx);
        Ok(idx)
    }

    fn finish(self) -> CookResult<MeshArtifact> {
        if self.indices.is_empty() {
            return Err(CookError::Parse("mesh has no faces".into()));
        }
        let mut min = [f32::INFINITY; 3];
        let mut max = [f32::NEG_INFINITY; 3];
        for v in &self.vertices {
            for axis in 0..3 {
                min[axis] = min[axis].min(v.position[axis]);
                max[axis] = max[axis].max(v.position[axis]);
            }
        }
        Ok(MeshArtifact {
            vertices: self.vertices,
            indices: self.indices,
            bounds_min: min,
            bounds_max: max,
        })
    }
}

fn floats<const N: usize>(
    parts: &mut std::str::SplitWhitespace<'_>,
    line_no: usize,
) -> CookResult<[f32; N]> {
    let mut out = [0f32; N];
    for x in &mut out {
        let tok = parts
            .next()
            .ok_or_else(|| CookError::Parse(format!("line {line_no}: expected {N} values")))?;
        *x = tok
            .parse()
            .map_err(|_| CookError::Parse(format!("line {line_no}: bad number {tok}")))?;
    }
    Ok(out)
}

/// OBJ indices are 1-based; negative values count back from the end.
fn resolve(token: &str, len: usize, line_no: usize) -> CookResult<usize> {
    let raw: i64 = token
        .parse()
        .map_err(|_| CookError::Parse(format!("line {line_no}: bad index {token}")))?;
    let idx = if raw > 0 {
        raw - 1
    } else {
        len as i64 + raw
    };
    if raw == 0 || idx < 0 || idx as usize >= len {
        return Err(CookError::Parse(format!(
            "line {line_no}: index {raw} out of range"
        )));
    }
    Ok(idx as usize)
}
