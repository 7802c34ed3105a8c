//! Markup overlays stored between the image header and the extended
//! metadata block.
//!
//! The block is a stream of little-endian u16 words starting at byte 4; a
//! type word of 0 ends it. Only circle markers and cross-section lines are
//! known; an unrecognized type stops parsing, and the 128-byte-aligned slot
//! keeps later stages aligned no matter how much of the block was
//! understood.

use alloc::vec::Vec;

/// One display overlay attached to the image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Markup {
    /// Circular marker.
    Circle { x: u16, y: u16, radius: u16 },
    /// Arbitrary cross-section line.
    Line { x0: u16, y0: u16, x1: u16, y1: u16 },
}

const TYPE_LINE: u16 = 3;
const TYPE_CIRCLE: u16 = 6;

const CIRCLE_LEN: usize = 24;
const LINE_LEN: usize = 14;

fn word(block: &[u8], at: usize) -> Option<u16> {
    let bytes = block.get(at..at + 2)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

/// Parse the markups out of one raw block.
pub(crate) fn parse_block(block: &[u8]) -> Vec<Markup> {
    let mut markups = Vec::new();
    let mut i = 4;

    while let Some(kind) = word(block, i) {
        match kind {
            TYPE_CIRCLE if i + CIRCLE_LEN <= block.len() => {
                let (Some(x), Some(y), Some(radius)) =
                    (word(block, i + 2), word(block, i + 4), word(block, i + 6))
                else {
                    return markups;
                };
                markups.push(Markup::Circle { x, y, radius });
                i += CIRCLE_LEN;
            }
            TYPE_LINE if i + LINE_LEN <= block.len() => {
                let (Some(x0), Some(y0), Some(x1), Some(y1)) = (
                    word(block, i + 2),
                    word(block, i + 4),
                    word(block, i + 6),
                    word(block, i + 8),
                ) else {
                    return markups;
                };
                markups.push(Markup::Line { x0, y0, x1, y1 });
                i += LINE_LEN;
            }
            // End word, unknown type, or a record cut off by the slot edge.
            _ => return markups,
        }
    }

    markups
}
