//! Decoded pixel planes and borrowed frame views.

use alloc::vec;
use alloc::vec::Vec;
use enough::Stop;

use crate::cursor::Cursor;
use crate::error::DatError;

/// Sample storage format, derived from the header's bit depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SampleFormat {
    /// 8-bit unsigned grayscale.
    Gray8,
    /// 16-bit unsigned grayscale (native endian in memory).
    Gray16,
    /// 32-bit unsigned grayscale (native endian in memory).
    Gray32,
}

impl SampleFormat {
    pub(crate) fn from_bits(bits: i16) -> Option<Self> {
        match bits {
            8 => Some(Self::Gray8),
            16 => Some(Self::Gray16),
            32 => Some(Self::Gray32),
            _ => None,
        }
    }

    /// Sample width in bits.
    pub fn bits(self) -> u16 {
        match self {
            Self::Gray8 => 8,
            Self::Gray16 => 16,
            Self::Gray32 => 32,
        }
    }

    /// Sample width in bytes.
    pub fn bytes_per_sample(self) -> usize {
        usize::from(self.bits() / 8)
    }
}

/// One owned pixel plane, `width * height` samples in display row order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PixelPlane {
    Gray8(Vec<u8>),
    Gray16(Vec<u16>),
    Gray32(Vec<u32>),
}

impl PixelPlane {
    pub fn format(&self) -> SampleFormat {
        match self {
            Self::Gray8(_) => SampleFormat::Gray8,
            Self::Gray16(_) => SampleFormat::Gray16,
            Self::Gray32(_) => SampleFormat::Gray32,
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        match self {
            Self::Gray8(v) => v.len(),
            Self::Gray16(v) => v.len(),
            Self::Gray32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_gray8(&self) -> Option<&[u8]> {
        match self {
            Self::Gray8(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_gray16(&self) -> Option<&[u16]> {
        match self {
            Self::Gray16(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_gray32(&self) -> Option<&[u32]> {
        match self {
            Self::Gray32(v) => Some(v),
            _ => None,
        }
    }

    /// Sample at `idx`, widened to u32 regardless of storage format.
    pub fn sample(&self, idx: usize) -> Option<u32> {
        match self {
            Self::Gray8(v) => v.get(idx).copied().map(u32::from),
            Self::Gray16(v) => v.get(idx).copied().map(u32::from),
            Self::Gray32(v) => v.get(idx).copied(),
        }
    }
}

/// Borrowed view of one frame: a plane plus its geometry. Cheap to copy;
/// never clones pixel data.
#[derive(Clone, Copy, Debug)]
pub struct FrameView<'a> {
    width: u32,
    height: u32,
    plane: &'a PixelPlane,
}

impl<'a> FrameView<'a> {
    pub(crate) fn new(width: u32, height: u32, plane: &'a PixelPlane) -> Self {
        Self {
            width,
            height,
            plane,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> SampleFormat {
        self.plane.format()
    }

    /// The underlying plane.
    pub fn plane(&self) -> &'a PixelPlane {
        self.plane
    }

    /// Sample at (x, y) in display orientation, widened to u32.
    pub fn sample(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.plane
            .sample(y as usize * self.width as usize + x as usize)
    }

    /// Zero-copy [`imgref::ImgRef`] view of an 8-bit plane.
    #[cfg(feature = "imgref")]
    pub fn as_imgref_u8(&self) -> Option<imgref::ImgRef<'a, u8>> {
        let samples = self.plane.as_gray8()?;
        Some(imgref::ImgRef::new(
            samples,
            self.width as usize,
            self.height as usize,
        ))
    }

    /// Zero-copy [`imgref::ImgRef`] view of a 16-bit plane.
    #[cfg(feature = "imgref")]
    pub fn as_imgref_u16(&self) -> Option<imgref::ImgRef<'a, u16>> {
        let samples = self.plane.as_gray16()?;
        Some(imgref::ImgRef::new(
            samples,
            self.width as usize,
            self.height as usize,
        ))
    }

    /// Zero-copy [`imgref::ImgRef`] view of a 32-bit plane.
    #[cfg(feature = "imgref")]
    pub fn as_imgref_u32(&self) -> Option<imgref::ImgRef<'a, u32>> {
        let samples = self.plane.as_gray32()?;
        Some(imgref::ImgRef::new(
            samples,
            self.width as usize,
            self.height as usize,
        ))
    }
}

/// Read one plane of `width * height` little-endian samples.
///
/// Rows are stored bottom-up on disk; the plane comes out in display
/// orientation.
pub(crate) fn read_plane(
    cur: &mut Cursor<'_>,
    width: usize,
    height: usize,
    format: SampleFormat,
    stop: &dyn Stop,
) -> Result<PixelPlane, DatError> {
    let row_bytes = width * format.bytes_per_sample();
    cur.require(row_bytes * height)?;

    match format {
        SampleFormat::Gray8 => {
            let mut out = vec![0u8; width * height];
            for i in 0..height {
                if i % 16 == 0 {
                    stop.check()?;
                }
                let row = cur.read_bytes(row_bytes)?;
                out[(height - 1 - i) * width..][..width].copy_from_slice(row);
            }
            Ok(PixelPlane::Gray8(out))
        }
        SampleFormat::Gray16 => {
            let mut out = vec![0u16; width * height];
            for i in 0..height {
                if i % 16 == 0 {
                    stop.check()?;
                }
                let row = cur.read_bytes(row_bytes)?;
                let dst = &mut out[(height - 1 - i) * width..][..width];
                for (d, s) in dst.iter_mut().zip(row.chunks_exact(2)) {
                    *d = u16::from_le_bytes([s[0], s[1]]);
                }
            }
            Ok(PixelPlane::Gray16(out))
        }
        SampleFormat::Gray32 => {
            let mut out = vec![0u32; width * height];
            for i in 0..height {
                if i % 16 == 0 {
                    stop.check()?;
                }
                let row = cur.read_bytes(row_bytes)?;
                let dst = &mut out[(height - 1 - i) * width..][..width];
                for (d, s) in dst.iter_mut().zip(row.chunks_exact(4)) {
                    *d = u32::from_le_bytes([s[0], s[1], s[2], s[3]]);
                }
            }
            Ok(PixelPlane::Gray32(out))
        }
    }
}
