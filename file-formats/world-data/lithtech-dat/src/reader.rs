//! Primitive decoding over a byte cursor.
//!
//! Everything in a DAT file is little-endian. Strings are length-prefixed
//! with a 16-bit count (the world info string is the one exception, with a
//! 32-bit count) and decoded as UTF-8 with replacement of invalid
//! sequences. A read past the end of the input maps to
//! [`DatError::UnexpectedEof`] instead of a bare I/O error so callers can
//! tell truncation apart from real I/O failures.

use std::io::{Read, Seek, SeekFrom};

use crate::error::{DatError, Result};
use crate::types::{Quat, UVec3, Vec2, Vec3};

fn read_exact_or_eof<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(DatError::UnexpectedEof),
        Err(e) => Err(DatError::Io(e)),
    }
}

/// Helper trait for reading little-endian primitives
pub trait ReadExt: Read {
    fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        read_exact_or_eof(self, &mut buf)?;
        Ok(buf[0])
    }

    fn read_u16_le(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        read_exact_or_eof(self, &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn read_u32_le(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        read_exact_or_eof(self, &mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn read_i32_le(&mut self) -> Result<i32> {
        let mut buf = [0u8; 4];
        read_exact_or_eof(self, &mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }

    fn read_f32_le(&mut self) -> Result<f32> {
        let mut buf = [0u8; 4];
        read_exact_or_eof(self, &mut buf)?;
        Ok(f32::from_le_bytes(buf))
    }

    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        read_exact_or_eof(self, &mut buf)?;
        Ok(buf)
    }

    fn read_vec2(&mut self) -> Result<Vec2> {
        Ok(Vec2::new(self.read_f32_le()?, self.read_f32_le()?))
    }

    fn read_vec3(&mut self) -> Result<Vec3> {
        Ok(Vec3::new(
            self.read_f32_le()?,
            self.read_f32_le()?,
            self.read_f32_le()?,
        ))
    }

    fn read_uvec3(&mut self) -> Result<UVec3> {
        Ok(UVec3 {
            x: self.read_u32_le()?,
            y: self.read_u32_le()?,
            z: self.read_u32_le()?,
        })
    }

    fn read_quat(&mut self) -> Result<Quat> {
        Ok(Quat {
            x: self.read_f32_le()?,
            y: self.read_f32_le()?,
            z: self.read_f32_le()?,
            w: self.read_f32_le()?,
        })
    }

    /// Reads a string with a 16-bit length prefix. Invalid UTF-8 is
    /// replaced, never rejected: texture paths in shipped levels contain
    /// arbitrary codepage bytes.
    fn read_string(&mut self) -> Result<String> {
        let len = self.read_u16_le()? as usize;
        if len == 0 {
            return Ok(String::new());
        }
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Reads a string with a 32-bit length prefix (world info string only).
    fn read_string32(&mut self) -> Result<String> {
        let len = self.read_u32_le()? as usize;
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Reads `len` raw bytes as a string (keyframe sound names and
    /// commands carry their lengths in separate fields).
    fn read_string_raw(&mut self, len: usize) -> Result<String> {
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl<R: Read> ReadExt for R {}

/// Seek helpers used when skipping records by their declared byte length
pub trait SeekExt: Seek {
    /// Skip `count` bytes forward from the current position.
    fn skip(&mut self, count: u64) -> Result<()> {
        self.seek(SeekFrom::Current(count as i64))?;
        Ok(())
    }

    /// Seek to an absolute offset.
    fn goto(&mut self, offset: u64) -> Result<()> {
        self.seek(SeekFrom::Start(offset))?;
        Ok(())
    }
}

impl<S: Seek> SeekExt for S {}
