//! Fixed-layout file and image headers.
//!
//! A `.dat` file opens with a 104-byte file header (magic, version, bit
//! depth, frame geometry, recipe size declaration), optionally followed by a
//! 128-byte-aligned recipe slot, then a 288-byte image header whose tail
//! either contains the legacy metadata block inline or declares where the
//! extended one lives. All integers are little-endian.

use crate::cursor::Cursor;
use crate::error::DatError;

/// Leading bytes of the 20-byte id field. Compared as raw bytes; the id is
/// not guaranteed to be valid text in all versions.
pub(crate) const MAGIC: &[u8; 10] = b"UKSOFT2001";

/// On-disk size of [`FileHeader`].
pub(crate) const FILE_HEADER_SIZE: usize = 104;

/// On-disk size of the fixed [`ImageHeader`] region.
pub(crate) const IMAGE_HEADER_SIZE: usize = 288;

/// Bytes of [`ImageHeader`] holding named fields; the rest of the fixed
/// region belongs to the metadata layout variants.
pub(crate) const IMAGE_HEADER_FIELDS: usize = 28;

/// Recipe and markup blocks are stored in slots padded to this granularity.
pub(crate) const SLOT_ALIGN: usize = 128;

/// Size of the legacy inline metadata block.
pub(crate) const LEGACY_BLOCK_SIZE: usize = 240;

/// Highest file-header version this decoder understands. The variable-block
/// layout is known to vary by version, so newer files are rejected outright
/// rather than parsed on a guess.
const MAX_VERSION: i16 = 8;

/// FILETIME epoch (1601-01-01) to Unix epoch (1970-01-01), in microseconds.
const FILETIME_UNIX_OFFSET_MICROS: i64 = 11_644_473_600_000_000;

/// The 104-byte file header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileHeader {
    /// Raw 20-byte id field, NUL-padded; starts with the magic.
    pub id: [u8; 20],
    /// Declared header size; always 104 in understood versions.
    pub size: i16,
    pub version: i16,
    /// Sample width in bits: 8, 16, or 32.
    pub bits_per_pixel: i16,
    pub width: i16,
    pub height: i16,
    /// Number of image frames in the file (the `noimg` field).
    pub frame_count: i16,
    /// Meaningful bytes in the attached-recipe slot; 0 means no slot.
    pub recipe_size: i16,
}

impl FileHeader {
    /// The id field up to its first NUL byte.
    pub fn trimmed_id(&self) -> &[u8] {
        let end = self.id.iter().position(|&b| b == 0).unwrap_or(self.id.len());
        &self.id[..end]
    }
}

/// The fixed 288-byte image header. Only the first 28 bytes carry named
/// fields; the remainder is claimed by the legacy metadata block or skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageHeader {
    /// Declared size of the fixed region; always 288 in understood versions.
    pub size: i16,
    pub version: i16,
    pub colorscale_low: i16,
    pub colorscale_high: i16,
    /// Acquisition time as Windows FILETIME: 100 ns ticks since 1601-01-01.
    pub timestamp: u64,
    pub mask_xshift: i16,
    pub mask_yshift: i16,
    pub use_mask: u8,
    /// Meaningful bytes in the markup slot (the `att_markupsize` field).
    pub markup_size: i16,
    pub spin: i16,
    /// Declared metadata block size (the `versleemdata` field). 2 or less
    /// selects the legacy fixed 240-byte block.
    pub leem_data_size: i16,
}

impl ImageHeader {
    /// Acquisition time in microseconds since the Unix epoch.
    ///
    /// Times before 1970 come out negative; the raw FILETIME stays available
    /// in [`ImageHeader::timestamp`].
    pub fn timestamp_unix_micros(&self) -> i64 {
        (self.timestamp / 10) as i64 - FILETIME_UNIX_OFFSET_MICROS
    }

    pub(crate) fn is_legacy(&self) -> bool {
        self.leem_data_size <= 2
    }
}

pub(crate) fn parse_file_header(cur: &mut Cursor<'_>) -> Result<FileHeader, DatError> {
    // Magic first: no other field is trusted before it matches.
    let magic = cur.read_bytes(MAGIC.len())?;
    if magic != MAGIC {
        return Err(DatError::BadMagic);
    }

    cur.require(FILE_HEADER_SIZE - MAGIC.len())?;

    let mut id = [0u8; 20];
    id[..MAGIC.len()].copy_from_slice(magic);
    let rest = cur.read_bytes(id.len() - MAGIC.len())?;
    id[MAGIC.len()..].copy_from_slice(rest);

    let size = cur.read_i16_le()?;
    let version = cur.read_i16_le()?;
    if version > MAX_VERSION || size as usize != FILE_HEADER_SIZE {
        // A size that disagrees with the bytes this parser consumes means
        // the layout comes from a version it does not understand.
        return Err(DatError::UnsupportedVersion { version });
    }

    let bits_per_pixel = cur.read_i16_le()?;
    if !matches!(bits_per_pixel, 8 | 16 | 32) {
        return Err(DatError::UnsupportedBitDepth {
            bits: bits_per_pixel,
        });
    }

    cur.skip(6)?; // alignment
    cur.skip(8)?; // spare

    let width = cur.read_i16_le()?;
    let height = cur.read_i16_le()?;
    let frame_count = cur.read_i16_le()?;
    let recipe_size = cur.read_i16_le()?;
    cur.skip(56)?; // spare, through byte 104

    if width <= 0 || height <= 0 {
        return Err(DatError::InvalidHeader(alloc::format!(
            "image dimensions {width}x{height} out of range"
        )));
    }
    if frame_count < 1 {
        return Err(DatError::InvalidHeader(alloc::format!(
            "frame count {frame_count} out of range"
        )));
    }
    if recipe_size < 0 {
        return Err(DatError::InvalidHeader(alloc::format!(
            "negative recipe size {recipe_size}"
        )));
    }

    Ok(FileHeader {
        id,
        size,
        version,
        bits_per_pixel,
        width,
        height,
        frame_count,
        recipe_size,
    })
}

pub(crate) fn parse_image_header(cur: &mut Cursor<'_>) -> Result<ImageHeader, DatError> {
    cur.require(IMAGE_HEADER_FIELDS)?;

    let size = cur.read_i16_le()?;
    let version = cur.read_i16_le()?;
    if size as usize != IMAGE_HEADER_SIZE {
        return Err(DatError::UnsupportedVersion { version });
    }

    let colorscale_low = cur.read_i16_le()?;
    let colorscale_high = cur.read_i16_le()?;
    let timestamp = cur.read_u64_le()?;
    let mask_xshift = cur.read_i16_le()?;
    let mask_yshift = cur.read_i16_le()?;
    let use_mask = cur.read_u8()?;
    cur.skip(1)?; // spare
    let markup_size = cur.read_i16_le()?;
    let spin = cur.read_i16_le()?;
    let leem_data_size = cur.read_i16_le()?;

    if markup_size < 0 {
        return Err(DatError::InvalidHeader(alloc::format!(
            "negative markup size {markup_size}"
        )));
    }
    if leem_data_size < 0 {
        return Err(DatError::InvalidHeader(alloc::format!(
            "negative metadata block size {leem_data_size}"
        )));
    }

    Ok(ImageHeader {
        size,
        version,
        colorscale_low,
        colorscale_high,
        timestamp,
        mask_xshift,
        mask_yshift,
        use_mask,
        markup_size,
        spin,
        leem_data_size,
    })
}
