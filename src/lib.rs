//! # uviewdat
//!
//! Decoder for Elmitec Uview `.dat` (UKSOFT2001) image files, the native
//! format of LEEM/PEEM instruments.
//!
//! ## Format
//!
//! A `.dat` file is a fixed 104-byte header (magic, version, bit depth,
//! frame geometry), an optional 128-byte-aligned recipe slot, a 288-byte
//! image header, a variable-length type-tagged metadata block, and one or
//! more grayscale pixel planes (8-, 16-, or 32-bit unsigned samples,
//! little-endian, rows stored bottom-up). Every later block is located by a
//! length field read earlier; the decoder makes one strict pass and reports
//! the absolute byte offset of any violation.
//!
//! ## Non-Goals
//!
//! - Writing `.dat` files
//! - Physical interpretation of metadata values (units are carried, not
//!   checked)
//! - Image processing (planes come out as raw unsigned samples)
//!
//! ## Usage
//!
//! ```no_run
//! use uviewdat::{DatInfo, DecodeRequest};
//! use enough::Unstoppable;
//!
//! let data: &[u8] = &[]; // your .dat bytes
//!
//! // Probe the header without decoding
//! let info = DatInfo::from_bytes(data)?;
//! println!("{}x{}, {} frame(s)", info.width, info.height, info.frame_count);
//!
//! // Decode
//! let image = DecodeRequest::new(data).decode(Unstoppable)?;
//! let frame = image.primary();
//! if let Some(exposure) = image.metadata().get("Camera Exposure") {
//!     println!("exposure: {exposure:?}");
//! }
//! # let _ = frame;
//! # Ok::<(), uviewdat::DatError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod cursor;
mod decode;
mod error;
mod header;
mod info;
mod limits;
mod markup;
mod metadata;
mod plane;

// Re-exports
#[cfg(feature = "std")]
pub use decode::decode_path;
pub use decode::{decode, DecodeRequest, DecodedImage};
pub use enough::{Stop, Unstoppable};
pub use error::DatError;
pub use header::{FileHeader, ImageHeader};
pub use info::DatInfo;
pub use limits::Limits;
pub use markup::Markup;
pub use metadata::{MetaEntry, MetaValue, MetadataRecord, Strictness};
pub use plane::{FrameView, PixelPlane, SampleFormat};
