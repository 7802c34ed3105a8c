//! Strict little-endian cursor over the input slice.
//!
//! The format carries no redundancy: a single short read means the file is
//! truncated or a length field upstream lied, so every read here is
//! all-or-nothing and reports the absolute offset where input ran out.

use crate::error::DatError;

pub(crate) struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Error unless `n` more bytes are available.
    pub(crate) fn require(&self, n: usize) -> Result<(), DatError> {
        if self.remaining() < n {
            return Err(DatError::Truncated {
                offset: self.pos,
                needed: n - self.remaining(),
            });
        }
        Ok(())
    }

    pub(crate) fn skip(&mut self, n: usize) -> Result<(), DatError> {
        self.require(n)?;
        self.pos += n;
        Ok(())
    }

    pub(crate) fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], DatError> {
        self.require(n)?;
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub(crate) fn read_fixed<const N: usize>(&mut self) -> Result<[u8; N], DatError> {
        self.require(N)?;
        let mut buf = [0u8; N];
        buf.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(buf)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, DatError> {
        self.require(1)?;
        let b = self.data[self.pos];
        self.pos += 1;
        Ok(b)
    }

    pub(crate) fn read_i16_le(&mut self) -> Result<i16, DatError> {
        Ok(i16::from_le_bytes(self.read_fixed::<2>()?))
    }

    pub(crate) fn read_u64_le(&mut self) -> Result<u64, DatError> {
        Ok(u64::from_le_bytes(self.read_fixed::<8>()?))
    }

    pub(crate) fn read_f32_le(&mut self) -> Result<f32, DatError> {
        Ok(f32::from_le_bytes(self.read_fixed::<4>()?))
    }

    /// Bytes from the current position up to (not including) the next NUL,
    /// bounded by the absolute offset `end`. The cursor lands past the NUL.
    pub(crate) fn read_until_nul(&mut self, end: usize) -> Option<&'a [u8]> {
        let bound = end.min(self.data.len());
        let start = self.pos;
        let nul = self.data[start..bound].iter().position(|&b| b == 0)?;
        self.pos = start + nul + 1;
        Some(&self.data[start..start + nul])
    }
}
