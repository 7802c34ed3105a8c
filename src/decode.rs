//! Decode pipeline: request builder, decoded aggregate, and the assembler.
//!
//! One pass over the input: file header, recipe slot, image header, markup
//! slot, metadata block, then the pixel planes. Every later block is located
//! by a length field read earlier, so each stage fails fast; a decode
//! either yields a complete [`DecodedImage`] or nothing.

use alloc::vec::Vec;

use enough::Stop;

use crate::cursor::Cursor;
use crate::error::DatError;
use crate::header::{
    self, FileHeader, ImageHeader, IMAGE_HEADER_FIELDS, IMAGE_HEADER_SIZE, LEGACY_BLOCK_SIZE,
    SLOT_ALIGN,
};
use crate::limits::Limits;
use crate::markup::{self, Markup};
use crate::metadata::{self, MetaValue, MetadataRecord, Strictness};
use crate::plane::{self, FrameView, PixelPlane, SampleFormat};

/// Decode a `.dat` file from a byte slice.
pub fn decode(data: &[u8], stop: impl Stop) -> Result<DecodedImage, DatError> {
    DecodeRequest::new(data).decode(stop)
}

/// Read and decode a `.dat` file from disk. The file handle is released on
/// every exit path.
#[cfg(feature = "std")]
pub fn decode_path(
    path: impl AsRef<std::path::Path>,
    stop: impl Stop,
) -> Result<DecodedImage, DatError> {
    let data = std::fs::read(path)?;
    DecodeRequest::new(&data).decode(stop)
}

// ── Decode request ──────────────────────────────────────────────────

/// Builder for decoding one `.dat` file.
#[derive(Clone, Debug)]
pub struct DecodeRequest<'a> {
    data: &'a [u8],
    limits: Option<&'a Limits>,
    strictness: Strictness,
}

impl<'a> DecodeRequest<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            limits: None,
            strictness: Strictness::default(),
        }
    }

    /// Apply resource limits, checked before plane allocation.
    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Set how strictly declared block sizes are enforced.
    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Run the decode. Pass [`enough::Unstoppable`] when cancellation is not
    /// needed.
    pub fn decode(self, stop: impl Stop) -> Result<DecodedImage, DatError> {
        decode_impl(self.data, self.limits, self.strictness, &stop)
    }
}

// ── Decoded aggregate ───────────────────────────────────────────────

/// A fully decoded `.dat` file: header fields, ordered metadata, markups,
/// the opaque recipe, and one plane per frame. Immutable once constructed.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    header: FileHeader,
    image_header: ImageHeader,
    metadata: MetadataRecord,
    markups: Vec<Markup>,
    recipe: Vec<u8>,
    frames: Vec<PixelPlane>,
}

impl DecodedImage {
    /// The validated file header, for callers that need plain fields
    /// without going through the metadata record.
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn image_header(&self) -> &ImageHeader {
        &self.image_header
    }

    /// Ordered metadata: the fixed header fields first (under the names the
    /// format documentation uses), then the parsed block entries in file
    /// order.
    pub fn metadata(&self) -> &MetadataRecord {
        &self.metadata
    }

    pub fn markups(&self) -> &[Markup] {
        &self.markups
    }

    /// The attached recipe, verbatim. Empty when the file declares none.
    pub fn recipe(&self) -> &[u8] {
        &self.recipe
    }

    pub fn width(&self) -> u32 {
        self.header.width as u32
    }

    pub fn height(&self) -> u32 {
        self.header.height as u32
    }

    pub fn sample_format(&self) -> SampleFormat {
        // frames is never empty (frame_count >= 1 is validated)
        self.frames[0].format()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// The first frame. For single-image files this is the whole picture.
    pub fn primary(&self) -> FrameView<'_> {
        FrameView::new(self.width(), self.height(), &self.frames[0])
    }

    /// Frame at `index`, in file order.
    pub fn frame(&self, index: usize) -> Option<FrameView<'_>> {
        self.frames
            .get(index)
            .map(|p| FrameView::new(self.width(), self.height(), p))
    }

    /// All frames in file order. Views borrow the same owned planes as
    /// [`DecodedImage::primary`]; nothing is copied.
    pub fn frames(&self) -> impl ExactSizeIterator<Item = FrameView<'_>> {
        let (width, height) = (self.width(), self.height());
        self.frames
            .iter()
            .map(move |p| FrameView::new(width, height, p))
    }

    /// Take ownership of the planes, dropping everything else.
    pub fn into_planes(self) -> Vec<PixelPlane> {
        self.frames
    }
}

// ── Pipeline ────────────────────────────────────────────────────────

fn decode_impl(
    data: &[u8],
    limits: Option<&Limits>,
    strictness: Strictness,
    stop: &dyn Stop,
) -> Result<DecodedImage, DatError> {
    let mut cur = Cursor::new(data);

    let header = header::parse_file_header(&mut cur)?;
    let width = header.width as u32;
    let height = header.height as u32;
    let frame_count = header.frame_count as usize;
    let format = SampleFormat::from_bits(header.bits_per_pixel).ok_or(
        DatError::UnsupportedBitDepth {
            bits: header.bits_per_pixel,
        },
    )?;

    if let Some(limits) = limits {
        limits.check(width, height)?;
        limits.check_frames(frame_count as u64)?;
    }

    let recipe = read_recipe_slot(&mut cur, &header)?;

    let image_header = header::parse_image_header(&mut cur)?;

    let (block_entries, markups) = if image_header.is_legacy() {
        let md = metadata::parse_block(&mut cur, LEGACY_BLOCK_SIZE, strictness, true)?;
        // tail of the fixed region after the legacy block
        cur.skip(IMAGE_HEADER_SIZE - IMAGE_HEADER_FIELDS - LEGACY_BLOCK_SIZE)?;
        (md, Vec::new())
    } else {
        // rest of the fixed region is unused in the extended layout
        cur.skip(IMAGE_HEADER_SIZE - IMAGE_HEADER_FIELDS)?;

        let markups = if image_header.markup_size > 0 {
            let slot = (image_header.markup_size as usize / SLOT_ALIGN + 1) * SLOT_ALIGN;
            markup::parse_block(cur.read_bytes(slot)?)
        } else {
            Vec::new()
        };

        let md = metadata::parse_block(
            &mut cur,
            image_header.leem_data_size as usize,
            strictness,
            false,
        )?;
        (md, markups)
    };

    let frame_bytes = (width as usize)
        .checked_mul(height as usize)
        .and_then(|wh| wh.checked_mul(format.bytes_per_sample()))
        .ok_or(DatError::DimensionsTooLarge { width, height })?;
    let total_bytes = frame_bytes
        .checked_mul(frame_count)
        .ok_or(DatError::DimensionsTooLarge { width, height })?;
    if let Some(limits) = limits {
        limits.check_memory(total_bytes)?;
    }

    stop.check()?;

    let mut frames = Vec::with_capacity(frame_count);
    for _ in 0..frame_count {
        frames.push(plane::read_plane(
            &mut cur,
            width as usize,
            height as usize,
            format,
            stop,
        )?);
    }

    Ok(assemble(
        header,
        image_header,
        block_entries,
        markups,
        recipe,
        frames,
    ))
}

fn read_recipe_slot(cur: &mut Cursor<'_>, header: &FileHeader) -> Result<Vec<u8>, DatError> {
    if header.recipe_size <= 0 {
        return Ok(Vec::new());
    }
    let size = header.recipe_size as usize;
    let slot = size.div_ceil(SLOT_ALIGN) * SLOT_ALIGN;
    let bytes = cur.read_bytes(size)?.to_vec();
    cur.skip(slot - size)?;
    Ok(bytes)
}

/// Pure composition of already-validated parts into the output aggregate.
fn assemble(
    header: FileHeader,
    image_header: ImageHeader,
    block_entries: MetadataRecord,
    markups: Vec<Markup>,
    recipe: Vec<u8>,
    frames: Vec<PixelPlane>,
) -> DecodedImage {
    let mut metadata = MetadataRecord::default();
    metadata.push("id", MetaValue::Bytes(header.trimmed_id().to_vec()), "");
    metadata.push("size", MetaValue::Integer(i64::from(header.size)), "");
    metadata.push("version", MetaValue::Integer(i64::from(header.version)), "");
    metadata.push(
        "bitsperpix",
        MetaValue::Integer(i64::from(header.bits_per_pixel)),
        "",
    );
    metadata.push("width", MetaValue::Integer(i64::from(header.width)), "");
    metadata.push("height", MetaValue::Integer(i64::from(header.height)), "");
    metadata.push(
        "noimg",
        MetaValue::Integer(i64::from(header.frame_count)),
        "",
    );
    metadata.push(
        "attachedRecipeSize",
        MetaValue::Integer(i64::from(header.recipe_size)),
        "",
    );
    metadata.push(
        "isize",
        MetaValue::Integer(i64::from(image_header.size)),
        "",
    );
    metadata.push(
        "iversion",
        MetaValue::Integer(i64::from(image_header.version)),
        "",
    );
    metadata.push(
        "colorscale_low",
        MetaValue::Integer(i64::from(image_header.colorscale_low)),
        "",
    );
    metadata.push(
        "colorscale_high",
        MetaValue::Integer(i64::from(image_header.colorscale_high)),
        "",
    );
    metadata.push(
        "timestamp",
        MetaValue::Integer(image_header.timestamp as i64),
        "",
    );
    metadata.push(
        "mask_xshift",
        MetaValue::Integer(i64::from(image_header.mask_xshift)),
        "",
    );
    metadata.push(
        "mask_yshift",
        MetaValue::Integer(i64::from(image_header.mask_yshift)),
        "",
    );
    metadata.push(
        "usemask",
        MetaValue::Integer(i64::from(image_header.use_mask)),
        "",
    );
    metadata.push(
        "att_markupsize",
        MetaValue::Integer(i64::from(image_header.markup_size)),
        "",
    );
    metadata.push(
        "spin",
        MetaValue::Integer(i64::from(image_header.spin)),
        "",
    );
    metadata.append(block_entries);

    DecodedImage {
        header,
        image_header,
        metadata,
        markups,
        recipe,
        frames,
    }
}
