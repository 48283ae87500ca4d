//! World metadata: info string, extents, and the global translation
//! offset applied to every emitted coordinate.

use std::io::Read;

use crate::error::Result;
use crate::reader::ReadExt;
use crate::types::Vec3;

/// Global world metadata, read immediately after the header.
#[derive(Debug, Clone)]
pub struct WorldInfo {
    /// Free-form properties string authored into the level
    pub info_string: String,
    pub extents_min: Vec3,
    pub extents_max: Vec3,
    /// Translation baked out by the level compiler; see [`WorldOffset`].
    pub offset: Vec3,
}

impl WorldInfo {
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let info_string = reader.read_string32()?;
        let extents_min = reader.read_vec3()?;
        let extents_max = reader.read_vec3()?;
        let offset = reader.read_vec3()?;

        Ok(Self {
            info_string,
            extents_min,
            extents_max,
            offset,
        })
    }

    pub fn world_offset(&self) -> WorldOffset {
        WorldOffset(self.offset)
    }
}

/// The additive world translation, threaded explicitly into every
/// coordinate-emitting call rather than held as process state.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorldOffset(pub Vec3);

impl WorldOffset {
    pub fn apply(self, v: Vec3) -> Vec3 {
        v + self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_world_info() {
        let mut data = Vec::new();
        data.extend_from_slice(&4u32.to_le_bytes());
        data.extend_from_slice(b"test");
        for f in [-1.0f32, -2.0, -3.0, 1.0, 2.0, 3.0, 10.0, 0.0, -10.0] {
            data.extend_from_slice(&f.to_le_bytes());
        }

        let info = WorldInfo::read(&mut Cursor::new(data)).unwrap();
        assert_eq!(info.info_string, "test");
        assert_eq!(info.extents_max, Vec3::new(1.0, 2.0, 3.0));

        let shifted = info.world_offset().apply(Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(shifted, Vec3::new(11.0, 1.0, -9.0));
    }
}
