//! World file header: format version and the absolute offsets of every
//! major section. All later decode phases seek through this table.

use std::io::Read;

use crate::error::Result;
use crate::reader::ReadExt;

/// Fixed-size offset table at the start of every DAT file.
///
/// Offsets are absolute byte positions. The sections are not required to
/// be contiguous or stored in header order; each decode phase seeks to
/// its declared position before reading.
#[derive(Debug, Clone)]
pub struct WorldHeader {
    /// Format version (85 for Jupiter-era worlds)
    pub version: u32,
    pub object_data_pos: u32,
    pub blind_object_data_pos: u32,
    /// Present in the header but the section has no known reader.
    pub lightgrid_pos: u32,
    pub collision_data_pos: u32,
    pub particle_blocker_data_pos: u32,
    pub render_data_pos: u32,
    pub packer_type: u32,
    pub packer_version: u32,
    /// Reserved slots, kept verbatim for the diagnostic transcript.
    pub future: [u32; 6],
}

impl WorldHeader {
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let version = reader.read_u32_le()?;
        let object_data_pos = reader.read_u32_le()?;
        let blind_object_data_pos = reader.read_u32_le()?;
        let lightgrid_pos = reader.read_u32_le()?;
        let collision_data_pos = reader.read_u32_le()?;
        let particle_blocker_data_pos = reader.read_u32_le()?;
        let render_data_pos = reader.read_u32_le()?;
        let packer_type = reader.read_u32_le()?;
        let packer_version = reader.read_u32_le()?;
        let mut future = [0u32; 6];
        for slot in &mut future {
            *slot = reader.read_u32_le()?;
        }

        Ok(Self {
            version,
            object_data_pos,
            blind_object_data_pos,
            lightgrid_pos,
            collision_data_pos,
            particle_blocker_data_pos,
            render_data_pos,
            packer_type,
            packer_version,
            future,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_header() {
        let mut data = Vec::new();
        for value in [85u32, 100, 200, 300, 400, 500, 600, 1, 2] {
            data.extend_from_slice(&value.to_le_bytes());
        }
        data.extend_from_slice(&[0u8; 24]);

        let header = WorldHeader::read(&mut Cursor::new(data)).unwrap();
        assert_eq!(header.version, 85);
        assert_eq!(header.object_data_pos, 100);
        assert_eq!(header.render_data_pos, 600);
        assert_eq!(header.packer_version, 2);
    }
}
