//! Synthetic `.dat` builder: the companion encoder fixture for decode tests.
//!
//! Produces byte-exact files (104-byte file header, 128-aligned recipe
//! slot, 288-byte image header, markup slot, metadata block, bottom-up
//! pixel planes) with knobs for building invalid variants.

#![allow(dead_code)]

pub const MAGIC: &[u8; 10] = b"UKSOFT2001";

/// 2020-01-01T00:00:00Z as FILETIME.
pub const DEFAULT_TIMESTAMP: u64 = 132_223_104_000_000_000;

pub struct DatBuilder {
    version: i16,
    header_size: i16,
    bits: i16,
    width: i16,
    height: i16,
    timestamp: u64,
    recipe: Vec<u8>,
    markups: Vec<u8>,
    fields: Vec<u8>,
    frames: Vec<Vec<u8>>,
    legacy: bool,
    metadata_padding: usize,
    omit_terminator: bool,
}

fn le16(out: &mut Vec<u8>, v: i16) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn leu16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}

impl DatBuilder {
    pub fn new(width: i16, height: i16) -> Self {
        Self {
            version: 7,
            header_size: 104,
            bits: 16,
            width,
            height,
            timestamp: DEFAULT_TIMESTAMP,
            recipe: Vec::new(),
            markups: Vec::new(),
            fields: Vec::new(),
            frames: Vec::new(),
            legacy: false,
            metadata_padding: 0,
            omit_terminator: false,
        }
    }

    pub fn version(mut self, v: i16) -> Self {
        self.version = v;
        self
    }

    pub fn header_size(mut self, s: i16) -> Self {
        self.header_size = s;
        self
    }

    pub fn bits(mut self, bits: i16) -> Self {
        self.bits = bits;
        self
    }

    pub fn timestamp(mut self, t: u64) -> Self {
        self.timestamp = t;
        self
    }

    /// Use the legacy fixed 240-byte metadata block (`versleemdata = 2`).
    pub fn legacy(mut self) -> Self {
        self.legacy = true;
        self
    }

    pub fn recipe(mut self, bytes: &[u8]) -> Self {
        self.recipe = bytes.to_vec();
        self
    }

    /// Extra zero bytes between the end-of-fields marker and the declared
    /// block end (extended layout only).
    pub fn metadata_padding(mut self, n: usize) -> Self {
        self.metadata_padding = n;
        self
    }

    /// Declare the block as exactly the encoded fields, with no 0xFF marker.
    pub fn omit_terminator(mut self) -> Self {
        self.omit_terminator = true;
        self
    }

    // ── metadata records ────────────────────────────────────────────

    /// Standard record: tag, name + ASCII unit digit, NUL, f32.
    pub fn standard_field(mut self, tag: u8, name: &str, unit_digit: u8, value: f32) -> Self {
        self.fields.push(tag);
        self.fields.extend_from_slice(name.as_bytes());
        self.fields.push(unit_digit);
        self.fields.push(0);
        self.fields.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Gauge record: tag, name NUL, unit NUL, f32.
    pub fn gauge(mut self, tag: u8, name: &str, unit: &str, value: f32) -> Self {
        self.fields.push(tag);
        self.fields.extend_from_slice(name.as_bytes());
        self.fields.push(0);
        self.fields.extend_from_slice(unit.as_bytes());
        self.fields.push(0);
        self.fields.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.fields.push(233);
        self.fields.extend_from_slice(title.as_bytes());
        self.fields.push(0);
        self
    }

    pub fn exposure(mut self, seconds: f32, average: u8) -> Self {
        self.fields.push(104);
        self.fields.extend_from_slice(&seconds.to_le_bytes());
        self.fields.push(average);
        self.fields.push(0); // spare
        self
    }

    pub fn rotation(mut self, degrees: f32) -> Self {
        self.fields.push(113);
        self.fields.extend_from_slice(&degrees.to_le_bytes());
        self
    }

    /// Single-byte record (tags 240 and 242): tag, value, spare.
    pub fn byte_field(mut self, tag: u8, value: u8) -> Self {
        self.fields.push(tag);
        self.fields.push(value);
        self.fields.push(0);
        self
    }

    /// Arbitrary record bytes, for malformed-input tests.
    pub fn raw_field(mut self, bytes: &[u8]) -> Self {
        self.fields.extend_from_slice(bytes);
        self
    }

    // ── markups ─────────────────────────────────────────────────────

    pub fn marker(mut self, x: u16, y: u16, radius: u16) -> Self {
        let words = [6u16, x, y, radius, 0, 0, 0, 0, 0, 0, 0, 0];
        for w in words {
            leu16(&mut self.markups, w);
        }
        self
    }

    pub fn cross_section(mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Self {
        for w in [3u16, x0, y0, x1, y1, 0, 0] {
            leu16(&mut self.markups, w);
        }
        self
    }

    // ── frames ──────────────────────────────────────────────────────

    /// Append a frame from display-order samples; rows are written
    /// bottom-up the way the instrument stores them.
    pub fn frame_u8(mut self, samples: &[u8]) -> Self {
        assert_eq!(samples.len(), self.width as usize * self.height as usize);
        let mut bytes = Vec::with_capacity(samples.len());
        for row in samples.chunks(self.width as usize).rev() {
            bytes.extend_from_slice(row);
        }
        self.frames.push(bytes);
        self
    }

    pub fn frame_u16(mut self, samples: &[u16]) -> Self {
        assert_eq!(samples.len(), self.width as usize * self.height as usize);
        let mut bytes = Vec::with_capacity(samples.len() * 2);
        for row in samples.chunks(self.width as usize).rev() {
            for &s in row {
                bytes.extend_from_slice(&s.to_le_bytes());
            }
        }
        self.frames.push(bytes);
        self
    }

    pub fn frame_u32(mut self, samples: &[u32]) -> Self {
        assert_eq!(samples.len(), self.width as usize * self.height as usize);
        let mut bytes = Vec::with_capacity(samples.len() * 4);
        for row in samples.chunks(self.width as usize).rev() {
            for &s in row {
                bytes.extend_from_slice(&s.to_le_bytes());
            }
        }
        self.frames.push(bytes);
        self
    }

    /// Append raw plane bytes exactly as given (no row reordering).
    pub fn raw_frame(mut self, bytes: &[u8]) -> Self {
        self.frames.push(bytes.to_vec());
        self
    }

    // ── encoding ────────────────────────────────────────────────────

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();

        // file header (104 bytes)
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&[0u8; 10]);
        le16(&mut out, self.header_size);
        le16(&mut out, self.version);
        le16(&mut out, self.bits);
        out.extend_from_slice(&[0u8; 6]); // alignment
        out.extend_from_slice(&[0u8; 8]); // spare
        le16(&mut out, self.width);
        le16(&mut out, self.height);
        le16(&mut out, self.frames.len() as i16);
        le16(&mut out, self.recipe.len() as i16);
        out.extend_from_slice(&[0u8; 56]);

        // recipe slot
        if !self.recipe.is_empty() {
            let slot = self.recipe.len().div_ceil(128) * 128;
            out.extend_from_slice(&self.recipe);
            out.resize(out.len() + slot - self.recipe.len(), 0);
        }

        // markup payload: 4-byte prefix, records, zero type word
        let markup_payload = if self.markups.is_empty() {
            Vec::new()
        } else {
            let mut p = vec![0u8; 4];
            p.extend_from_slice(&self.markups);
            p.extend_from_slice(&[0, 0]);
            p
        };

        // image header fixed fields (28 bytes)
        le16(&mut out, 288); // isize
        le16(&mut out, 10); // iversion
        le16(&mut out, 0); // colorscale_low
        le16(&mut out, 4095); // colorscale_high
        out.extend_from_slice(&self.timestamp.to_le_bytes());
        le16(&mut out, 0); // mask_xshift
        le16(&mut out, 0); // mask_yshift
        out.push(0); // usemask
        out.push(0); // spare
        le16(&mut out, markup_payload.len() as i16);
        le16(&mut out, 0); // spin

        // metadata block
        let mut block = self.fields.clone();
        if !self.omit_terminator {
            block.push(0xFF);
        }
        block.resize(block.len() + self.metadata_padding, 0);

        // a declared size of 2 or less means the legacy layout, so blocks
        // that small can only be written that way
        if self.legacy || block.len() <= 2 {
            assert!(block.len() <= 240, "legacy metadata block overflows 240 bytes");
            le16(&mut out, 2); // versleemdata
            block.resize(240, 0);
            out.extend_from_slice(&block);
            out.extend_from_slice(&[0u8; 20]);
        } else {
            le16(&mut out, block.len() as i16); // versleemdata
            out.extend_from_slice(&[0u8; 260]);
            if !markup_payload.is_empty() {
                let slot = (markup_payload.len() / 128 + 1) * 128;
                out.extend_from_slice(&markup_payload);
                out.resize(out.len() + slot - markup_payload.len(), 0);
            }
            out.extend_from_slice(&block);
        }

        // frames
        for frame in &self.frames {
            out.extend_from_slice(frame);
        }

        out
    }
}
