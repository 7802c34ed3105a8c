use alloc::string::String;
use enough::StopReason;

/// Errors from Uview `.dat` decoding.
///
/// Offsets are absolute byte positions in the input. Every variant is
/// terminal for the current decode; a failed decode exposes no partial
/// result.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DatError {
    #[error("not a Uview file: bad magic bytes")]
    BadMagic,

    #[error("Uview format version {version} is not understood")]
    UnsupportedVersion { version: i16 },

    #[error("unexpected end of input at byte {offset}: {needed} more bytes required")]
    Truncated { offset: usize, needed: usize },

    #[error("unknown metadata tag {tag} at byte {offset}")]
    UnknownTag { tag: u8, offset: usize },

    #[error("metadata record at byte {offset} runs past the declared block end")]
    BlockOverrun { offset: usize },

    #[error("metadata fields end {padding} bytes short of the declared block size (block ends at byte {offset})")]
    BlockUnderrun { padding: usize, offset: usize },

    #[error("unsupported bit depth {bits} (this decoder reads 8, 16, and 32)")]
    UnsupportedBitDepth { bits: i16 },

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("operation cancelled")]
    Cancelled(StopReason),

    #[cfg(feature = "std")]
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StopReason> for DatError {
    fn from(r: StopReason) -> Self {
        DatError::Cancelled(r)
    }
}
