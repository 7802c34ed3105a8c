//! Variable-length metadata block: type-tagged key/value records.
//!
//! The block is a sequence of self-describing records. Each starts with a
//! one-byte tag that determines the record layout; `0xFF` ends the field
//! stream. Strings are NUL-terminated cp1252, floats are f32 little-endian.
//! The parser consumes exactly the declared block size and reports absolute
//! byte offsets on every failure, because a desynchronized record otherwise
//! surfaces as confusing errors several stages later.

use alloc::string::String;
use alloc::vec::Vec;

use crate::cursor::Cursor;
use crate::error::DatError;

// ── Strictness ──────────────────────────────────────────────────────

/// Controls how strictly the metadata parser holds a block to its declared
/// size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Declared block sizes must be consumed exactly by records. Padding
    /// between the end-of-fields marker and the block end is reported as
    /// `BlockUnderrun` (after skipping it, so the error carries the aligned
    /// resume offset).
    #[default]
    Exact,

    /// Accept leftover bytes after the end-of-fields marker. Uview
    /// instruments routinely pad the declared size; use this level to read
    /// files straight off an instrument.
    AllowPadding,
}

// ── Value model ─────────────────────────────────────────────────────

/// A metadata value, retaining the on-disk type of the record it came from.
#[derive(Clone, Debug, PartialEq)]
pub enum MetaValue {
    Integer(i64),
    Float(f32),
    Text(String),
    /// Raw bytes that are not guaranteed to be valid text (the file id, for
    /// example).
    Bytes(Vec<u8>),
}

impl MetaValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MetaValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            MetaValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            MetaValue::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

/// One metadata entry. `unit` is empty for unitless entries.
#[derive(Clone, Debug, PartialEq)]
pub struct MetaEntry {
    pub key: String,
    pub value: MetaValue,
    pub unit: String,
}

/// Ordered key/value metadata.
///
/// Keys are not required to be unique; entries keep file order, which is
/// meaningful to downstream display. [`MetadataRecord::get`] returns the
/// first match.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetadataRecord {
    entries: Vec<MetaEntry>,
}

impl MetadataRecord {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value of the first entry with this key.
    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entry(key).map(|e| &e.value)
    }

    /// First entry with this key.
    pub fn entry(&self, key: &str) -> Option<&MetaEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// All entries, in file order.
    pub fn entries(&self) -> &[MetaEntry] {
        &self.entries
    }

    pub fn iter(&self) -> core::slice::Iter<'_, MetaEntry> {
        self.entries.iter()
    }

    pub(crate) fn push(
        &mut self,
        key: impl Into<String>,
        value: MetaValue,
        unit: impl Into<String>,
    ) {
        self.entries.push(MetaEntry {
            key: key.into(),
            value,
            unit: unit.into(),
        });
    }

    pub(crate) fn append(&mut self, mut other: MetadataRecord) {
        self.entries.append(&mut other.entries);
    }
}

impl<'a> IntoIterator for &'a MetadataRecord {
    type Item = &'a MetaEntry;
    type IntoIter = core::slice::Iter<'a, MetaEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ── Tag dispatch ────────────────────────────────────────────────────

const TAG_END: u8 = 255;
const TAG_MICROMETER: u8 = 100;
const TAG_EXPOSURE: u8 = 104;
const TAG_FOV: u8 = 110;
const TAG_ROTATION: u8 = 113;
const TAG_TITLE: u8 = 233;
const TAG_THETA_PHI: u8 = 239;
const TAG_SPIN_UPDOWN: u8 = 240;
const TAG_MIRROR_STATE: u8 = 242;
const TAG_MCP_SCREEN: u8 = 243;
const TAG_MCP_CHANNELPLATE: u8 = 244;

/// Standard records carry "name + unit digit + NUL + f32". The tag itself
/// identifies the module channel; the name travels in the record.
fn is_standard_tag(tag: u8) -> bool {
    matches!(
        tag,
        11 | 38 | 39 | 128..=138 | 140..=165 | 168..=192 | 194..=215 | 219 | 222
    )
}

/// Pressure gauges: 106 = MCH, 235 = COL, 236 = Gauge 3, 237 = PCH. Name
/// and unit both travel in the record.
fn is_gauge_tag(tag: u8) -> bool {
    matches!(tag, 106 | 235 | 236 | 237)
}

/// Units addressed by the standard records' trailing ASCII digit.
const UNIT_TABLE: [&str; 10] = ["", "V", "mA", "A", "°C", " K", "mV", "pA", "nA", "µA"];

fn unit_from_digit(digit: u8) -> Option<&'static str> {
    if digit.is_ascii_digit() {
        Some(UNIT_TABLE[usize::from(digit - b'0')])
    } else {
        None
    }
}

// ── cp1252 strings ──────────────────────────────────────────────────

/// cp1252 code points for 0x80..=0x9F; the rest of the byte range maps
/// straight to Unicode.
const CP1252_80_9F: [char; 32] = [
    '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}', '\u{017D}', '\u{008F}',
    '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
];

fn decode_cp1252(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0x9F => CP1252_80_9F[usize::from(b - 0x80)],
            _ => b as char,
        })
        .collect()
}

// ── Record reads bounded by the block ───────────────────────────────

/// Reads for one record, refusing to cross the declared block end. A read
/// that would cross it reports the record's tag offset: that is where the
/// corrupted length or unrecognized layout sits.
struct FieldReader<'c, 'a> {
    cur: &'c mut Cursor<'a>,
    end: usize,
    record: usize,
}

impl<'c, 'a> FieldReader<'c, 'a> {
    fn overrun(&self) -> DatError {
        DatError::BlockOverrun {
            offset: self.record,
        }
    }

    fn f32(&mut self) -> Result<f32, DatError> {
        if self.cur.position() + 4 > self.end {
            return Err(self.overrun());
        }
        self.cur.read_f32_le()
    }

    fn u8(&mut self) -> Result<u8, DatError> {
        if self.cur.position() + 1 > self.end {
            return Err(self.overrun());
        }
        self.cur.read_u8()
    }

    fn skip(&mut self, n: usize) -> Result<(), DatError> {
        if self.cur.position() + n > self.end {
            return Err(self.overrun());
        }
        self.cur.skip(n)
    }

    /// NUL-terminated byte string; the NUL is consumed but not returned.
    fn cstr(&mut self) -> Result<&'a [u8], DatError> {
        let end = self.end;
        self.cur.read_until_nul(end).ok_or_else(|| self.overrun())
    }
}

// ── Block parser ────────────────────────────────────────────────────

/// Parse one metadata block of exactly `block_len` bytes.
///
/// Legacy blocks (the fixed 240-byte layout) define padding after the end
/// marker as part of the layout; extended blocks hold it to `strictness`.
/// The cursor always lands at the block end, error or not, so the caller's
/// next stage starts at the right offset.
pub(crate) fn parse_block(
    cur: &mut Cursor<'_>,
    block_len: usize,
    strictness: Strictness,
    legacy: bool,
) -> Result<MetadataRecord, DatError> {
    cur.require(block_len)?;
    let end = cur.position() + block_len;
    let mut record = MetadataRecord::default();

    while cur.position() < end {
        let record_start = cur.position();
        let tag = cur.read_u8()?;

        if tag == TAG_END {
            let padding = end - cur.position();
            cur.skip(padding)?;
            if padding > 0 && !legacy && strictness == Strictness::Exact {
                return Err(DatError::BlockUnderrun {
                    padding,
                    offset: end,
                });
            }
            return Ok(record);
        }

        let mut r = FieldReader {
            cur: &mut *cur,
            end,
            record: record_start,
        };

        match tag {
            TAG_MICROMETER => {
                record.push("Mitutoyo X", MetaValue::Float(r.f32()?), "mm");
                record.push("Mitutoyo Y", MetaValue::Float(r.f32()?), "mm");
            }
            TAG_EXPOSURE => {
                record.push("Camera Exposure", MetaValue::Float(r.f32()?), "s");
                // 0 = no averaging, 255 = sliding average, else frame count
                record.push(
                    "Average Images",
                    MetaValue::Integer(i64::from(r.u8()?)),
                    "",
                );
                r.skip(1)?;
            }
            TAG_FOV => {
                let fov = decode_cp1252(r.cstr()?);
                record.push("FOV", MetaValue::Text(fov), "");
                record.push("FOV cal. factor", MetaValue::Float(r.f32()?), "");
            }
            TAG_ROTATION => {
                record.push("Rotation", MetaValue::Float(r.f32()?), "degree");
            }
            TAG_TITLE => {
                let title = decode_cp1252(r.cstr()?);
                record.push("Image Title", MetaValue::Text(title), "");
            }
            TAG_THETA_PHI => {
                record.push("Theta", MetaValue::Float(r.f32()?), "degree");
                record.push("Phi", MetaValue::Float(r.f32()?), "degree");
            }
            TAG_SPIN_UPDOWN => {
                record.push("Spin up_down", MetaValue::Integer(i64::from(r.u8()?)), "");
                r.skip(1)?;
            }
            TAG_MIRROR_STATE => {
                record.push("MirrorState", MetaValue::Integer(i64::from(r.u8()?)), "");
                r.skip(1)?;
            }
            TAG_MCP_SCREEN => {
                record.push("MCPscreen", MetaValue::Float(r.f32()?), "V");
            }
            TAG_MCP_CHANNELPLATE => {
                record.push("MCPchannelplate", MetaValue::Float(r.f32()?), "V");
            }
            t if is_gauge_tag(t) => {
                let name = decode_cp1252(r.cstr()?);
                let unit = decode_cp1252(r.cstr()?);
                let value = r.f32()?;
                record.push(name, MetaValue::Float(value), unit);
            }
            t if is_standard_tag(t) => {
                let raw = r.cstr()?;
                let Some((&digit, name_bytes)) = raw.split_last() else {
                    return Err(DatError::InvalidData(alloc::format!(
                        "empty field name for tag {t} at byte {record_start}"
                    )));
                };
                let unit = unit_from_digit(digit).ok_or_else(|| {
                    DatError::InvalidData(alloc::format!(
                        "unit digit {digit} out of range for tag {t} at byte {record_start}"
                    ))
                })?;
                let name = decode_cp1252(name_bytes);
                record.push(name, MetaValue::Float(r.f32()?), unit);
            }
            _ => {
                // Skipping a tag of unknown width would desynchronize every
                // record after it, so unknown tags are fatal here.
                return Err(DatError::UnknownTag {
                    tag,
                    offset: record_start,
                });
            }
        }
    }

    // Records filled the declared size exactly; no end marker needed.
    Ok(record)
}
