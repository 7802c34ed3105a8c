//! Header-only probe.

use crate::cursor::Cursor;
use crate::error::DatError;
use crate::header;

/// Summary of a `.dat` file, read from the fixed file header without
/// decoding metadata or pixel data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DatInfo {
    pub width: u32,
    pub height: u32,
    /// Sample width in bits: 8, 16, or 32.
    pub bits_per_pixel: u16,
    pub frame_count: u16,
    pub version: u16,
    /// Declared attached-recipe size; 0 means no recipe.
    pub recipe_size: u16,
}

impl DatInfo {
    /// Probe the file header. Runs the same validation as a full decode up
    /// through the fixed header, so a successful probe means the header
    /// fields can be trusted.
    pub fn from_bytes(data: &[u8]) -> Result<Self, DatError> {
        let mut cur = Cursor::new(data);
        let h = header::parse_file_header(&mut cur)?;
        Ok(Self {
            width: h.width as u32,
            height: h.height as u32,
            bits_per_pixel: h.bits_per_pixel as u16,
            frame_count: h.frame_count as u16,
            version: h.version as u16,
            recipe_size: h.recipe_size as u16,
        })
    }
}
