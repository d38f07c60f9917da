// src/services/png_reader.rs
//! Structural PNG metadata straight from the chunk stream, without inflating
//! any image data.

use crate::errors::ArtworkError;

pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

const INCHES_PER_METER: f64 = 39.370_078_74;
const UNIT_METER: u8 = 1;
// length + type + CRC
const CHUNK_OVERHEAD: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkType([u8; 4]);

impl ChunkType {
    pub const IHDR: Self = Self(*b"IHDR");
    pub const PHYS: Self = Self(*b"pHYs");
    pub const ICCP: Self = Self(*b"iCCP");
    pub const TRNS: Self = Self(*b"tRNS");
    pub const IEND: Self = Self(*b"IEND");
}

/// A chunk as laid out in the file. The CRC is read but not checked.
#[derive(Debug, Clone, Copy)]
pub struct RawChunk<'b> {
    pub chunk_type: ChunkType,
    pub data: &'b [u8],
}

/// Walks chunks from just after the signature until `IEND`, the end of the
/// buffer, or a chunk whose declared length overruns the buffer.
pub struct ChunkIter<'b> {
    bytes: &'b [u8],
    offset: usize,
    done: bool,
}

impl<'b> ChunkIter<'b> {
    fn new(bytes: &'b [u8]) -> Self {
        Self {
            bytes,
            offset: PNG_SIGNATURE.len(),
            done: false,
        }
    }
}

impl<'b> Iterator for ChunkIter<'b> {
    type Item = RawChunk<'b>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let header = self.bytes.get(self.offset..self.offset.checked_add(8)?)?;
        let length = read_u32_be(header, 0)? as usize;
        let chunk_type = ChunkType([header[4], header[5], header[6], header[7]]);

        let data_start = self.offset + 8;
        let Some(data) = data_start
            .checked_add(length)
            .and_then(|data_end| self.bytes.get(data_start..data_end))
        else {
            self.done = true;
            return None;
        };

        self.offset = self
            .offset
            .saturating_add(length.saturating_add(CHUNK_OVERHEAD));
        if chunk_type == ChunkType::IEND {
            self.done = true;
        }

        Some(RawChunk { chunk_type, data })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PngMetadata {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_type: u8,
    /// Alpha-bearing color type or a `tRNS` chunk.
    pub has_alpha: bool,
    pub has_transparency_chunk: bool,
    pub dpi: Option<u32>,
    pub icc_profile: Option<String>,
}

impl PngMetadata {
    pub fn has_dimensions(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

fn read_u32_be(data: &[u8], offset: usize) -> Option<u32> {
    let bytes: [u8; 4] = data.get(offset..offset + 4)?.try_into().ok()?;
    Some(u32::from_be_bytes(bytes))
}

pub fn has_png_signature(bytes: &[u8]) -> bool {
    bytes.starts_with(&PNG_SIGNATURE)
}

pub fn chunks(bytes: &[u8]) -> Result<ChunkIter<'_>, ArtworkError> {
    if !has_png_signature(bytes) {
        return Err(ArtworkError::Format("Invalid PNG signature".to_string()));
    }
    Ok(ChunkIter::new(bytes))
}

pub fn parse_png_metadata(bytes: &[u8]) -> Result<PngMetadata, ArtworkError> {
    let mut meta = PngMetadata::default();
    let mut color_type_alpha = false;

    for chunk in chunks(bytes)? {
        match chunk.chunk_type {
            ChunkType::IHDR => {
                if let (Some(width), Some(height), Some(&bit_depth), Some(&color_type)) = (
                    read_u32_be(chunk.data, 0),
                    read_u32_be(chunk.data, 4),
                    chunk.data.get(8),
                    chunk.data.get(9),
                ) {
                    meta.width = width;
                    meta.height = height;
                    meta.bit_depth = bit_depth;
                    meta.color_type = color_type;
                    color_type_alpha = matches!(color_type, 4 | 6);
                }
            }
            ChunkType::PHYS => {
                if let (Some(pixels_per_unit_x), Some(&unit)) =
                    (read_u32_be(chunk.data, 0), chunk.data.get(8))
                {
                    if unit == UNIT_METER && pixels_per_unit_x > 0 {
                        meta.dpi =
                            Some((f64::from(pixels_per_unit_x) / INCHES_PER_METER).round() as u32);
                    }
                }
            }
            ChunkType::ICCP => {
                let name_len = chunk
                    .data
                    .iter()
                    .position(|&b| b == 0)
                    .unwrap_or(chunk.data.len());
                if name_len > 0 {
                    meta.icc_profile =
                        Some(String::from_utf8_lossy(&chunk.data[..name_len]).into_owned());
                }
            }
            ChunkType::TRNS => meta.has_transparency_chunk = true,
            _ => {}
        }
    }

    meta.has_alpha = color_type_alpha || meta.has_transparency_chunk;
    Ok(meta)
}
