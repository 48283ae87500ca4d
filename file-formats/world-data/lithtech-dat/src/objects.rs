//! World objects: typed property bags, one per authored placeable.
//!
//! Besides the objects themselves, this phase collects three side tables
//! that later phases consume positionally or by hash:
//!
//! - `KeyFramer` objects' `BaseKeyName` values, in encounter order. Blind
//!   keyframe tracks carry no name of their own; the Nth track takes the
//!   Nth collected name.
//! - `ScatterVolume` objects' `Name` values, same scheme.
//! - `DynamicOccluderVolume` objects' `OccluderName*` values, hashed with
//!   the engine's case-insensitive rolling hash so occluder polygons can
//!   be matched back to a readable name.

use std::io::{Read, Seek};

use crate::error::Result;
use crate::reader::{ReadExt, SeekExt};
use crate::types::{Quat, Vec3};

/// Property data type codes as stored in the file
pub const TYPE_STRING: u8 = 0;
pub const TYPE_VECTOR: u8 = 1;
pub const TYPE_COLOR: u8 = 2;
pub const TYPE_REAL: u8 = 3;
pub const TYPE_BOOL: u8 = 5;
pub const TYPE_LONGINT: u8 = 6;
pub const TYPE_ROTATION: u8 = 7;

/// A decoded property value.
///
/// `LongInt` is stored as a float in the file; it is kept as one and
/// formatted back as one on export. Codes without a decoder are skipped
/// by their declared byte length and preserved as `Unknown`.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    String(String),
    Vector(Vec3),
    Color(Vec3),
    Real(f32),
    Bool(bool),
    LongInt(f32),
    Rotation(Quat),
    Unknown { type_code: u8, size: u16 },
}

#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub flags: u32,
    pub value: PropertyValue,
}

/// One placeable entity: a type tag plus its ordered property list
#[derive(Debug, Clone)]
pub struct WorldObject {
    pub type_name: String,
    pub properties: Vec<Property>,
}

impl WorldObject {
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }

    /// The `Name` string property, if present.
    pub fn name(&self) -> Option<&str> {
        match self.get("Name") {
            Some(PropertyValue::String(s)) => Some(s),
            _ => None,
        }
    }
}

/// Ordered name list consumed index-by-index by the blind-object phase.
#[derive(Debug, Clone, Default)]
pub struct NameQueue {
    names: Vec<String>,
    next: usize,
}

impl NameQueue {
    pub fn push(&mut self, name: String) {
        self.names.push(name);
    }

    /// Takes the next unconsumed name; `None` once exhausted.
    pub fn take(&mut self) -> Option<&str> {
        let name = self.names.get(self.next)?;
        self.next += 1;
        Some(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Name-to-hash table built from occluder volume properties.
///
/// Occluder polygons in render nodes store only the hash; recovery is a
/// first-match scan, lossy on collision.
#[derive(Debug, Clone, Default)]
pub struct OccluderNames {
    entries: Vec<(String, u32)>,
}

impl OccluderNames {
    pub fn insert_unique(&mut self, name: &str) {
        if !self.entries.iter().any(|(n, _)| n == name) {
            self.entries.push((name.to_owned(), name_hash(name)));
        }
    }

    pub fn find_by_hash(&self, hash: u32) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, h)| *h == hash)
            .map(|(n, _)| n.as_str())
    }

    pub fn entries(&self) -> &[(String, u32)] {
        &self.entries
    }
}

/// The engine's case-insensitive name hash: a multiply-by-29 rolling hash
/// over `toupper(ch) - 'A'`, wrapping at 32 bits.
pub fn name_hash(name: &str) -> u32 {
    let mut n: u32 = 0;
    for ch in name.chars() {
        let c = ch.to_ascii_uppercase() as u32;
        n = n.wrapping_mul(29).wrapping_add(c.wrapping_sub('A' as u32));
    }
    n
}

/// Side tables collected while decoding world objects
#[derive(Debug, Clone, Default)]
pub struct NameTables {
    pub keyframer_names: NameQueue,
    pub scatter_names: NameQueue,
    pub occluder_names: OccluderNames,
}

/// Reads the world-object section from the current cursor position.
pub fn read_world_objects<R: Read + Seek>(
    reader: &mut R,
) -> Result<(Vec<WorldObject>, NameTables)> {
    let count = reader.read_u32_le()?;
    let mut objects = Vec::with_capacity(count as usize);
    let mut tables = NameTables::default();

    for _ in 0..count {
        let _object_size = reader.read_u16_le()?;
        let type_name = reader.read_string()?;
        let prop_count = reader.read_u32_le()?;

        let mut properties = Vec::with_capacity(prop_count as usize);
        for _ in 0..prop_count {
            let name = reader.read_string()?;
            let type_code = reader.read_u8()?;
            let flags = reader.read_u32_le()?;
            let data_size = reader.read_u16_le()?;

            let value = match type_code {
                TYPE_STRING => PropertyValue::String(reader.read_string()?),
                TYPE_VECTOR => PropertyValue::Vector(reader.read_vec3()?),
                TYPE_COLOR => PropertyValue::Color(reader.read_vec3()?),
                TYPE_REAL => PropertyValue::Real(reader.read_f32_le()?),
                TYPE_BOOL => PropertyValue::Bool(reader.read_u8()? != 0),
                TYPE_LONGINT => PropertyValue::LongInt(reader.read_f32_le()?),
                TYPE_ROTATION => PropertyValue::Rotation(reader.read_quat()?),
                _ => {
                    // Skip by the record's own declared size so the cursor
                    // stays aligned for the next property.
                    reader.skip(data_size as u64)?;
                    PropertyValue::Unknown {
                        type_code,
                        size: data_size,
                    }
                }
            };

            collect_name(&mut tables, &type_name, &name, &value);
            properties.push(Property { name, flags, value });
        }

        objects.push(WorldObject {
            type_name,
            properties,
        });
    }

    Ok((objects, tables))
}

fn collect_name(tables: &mut NameTables, type_name: &str, prop: &str, value: &PropertyValue) {
    let PropertyValue::String(s) = value else {
        return;
    };

    match type_name {
        "KeyFramer" if prop == "BaseKeyName" => tables.keyframer_names.push(s.clone()),
        "ScatterVolume" if prop == "Name" => tables.scatter_names.push(s.clone()),
        "DynamicOccluderVolume" if prop.starts_with("OccluderName") && !s.is_empty() => {
            tables.occluder_names.insert_unique(s);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn push_string(data: &mut Vec<u8>, s: &str) {
        data.extend_from_slice(&(s.len() as u16).to_le_bytes());
        data.extend_from_slice(s.as_bytes());
    }

    fn push_prop_header(data: &mut Vec<u8>, name: &str, type_code: u8, size: u16) {
        push_string(data, name);
        data.push(type_code);
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&size.to_le_bytes());
    }

    #[test]
    fn test_name_hash_case_insensitive() {
        assert_eq!(name_hash("FOO"), name_hash("foo"));
        assert_eq!(name_hash("OccluderA"), name_hash("OCCLUDERA"));
        assert_ne!(name_hash("foo"), name_hash("bar"));
    }

    #[test]
    fn test_name_hash_known_value() {
        // n("AB") = (0 * 29 + 0) * 29 + 1
        assert_eq!(name_hash("AB"), 1);
        assert_eq!(name_hash("ab"), 1);
        assert_eq!(name_hash(""), 0);
    }

    #[test]
    fn test_name_queue_exhaustion() {
        let mut queue = NameQueue::default();
        queue.push("first".to_string());
        queue.push("second".to_string());

        assert_eq!(queue.take(), Some("first"));
        assert_eq!(queue.take(), Some("second"));
        assert_eq!(queue.take(), None);
        assert_eq!(queue.take(), None);
    }

    #[test]
    fn test_read_objects_and_tables() {
        let mut data = Vec::new();
        data.extend_from_slice(&2u32.to_le_bytes()); // object count

        // KeyFramer with BaseKeyName and an unknown-typed property
        data.extend_from_slice(&0u16.to_le_bytes());
        push_string(&mut data, "KeyFramer");
        data.extend_from_slice(&2u32.to_le_bytes());
        push_prop_header(&mut data, "BaseKeyName", TYPE_STRING, 0);
        push_string(&mut data, "Door1Key");
        push_prop_header(&mut data, "Mystery", 9, 3);
        data.extend_from_slice(&[1, 2, 3]);

        // DynamicOccluderVolume with two occluder names, one empty
        data.extend_from_slice(&0u16.to_le_bytes());
        push_string(&mut data, "DynamicOccluderVolume");
        data.extend_from_slice(&2u32.to_le_bytes());
        push_prop_header(&mut data, "OccluderName1", TYPE_STRING, 0);
        push_string(&mut data, "Hall");
        push_prop_header(&mut data, "OccluderName2", TYPE_STRING, 0);
        push_string(&mut data, "");

        let (objects, tables) = read_world_objects(&mut Cursor::new(data)).unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].type_name, "KeyFramer");
        assert_eq!(
            objects[0].get("Mystery"),
            Some(&PropertyValue::Unknown {
                type_code: 9,
                size: 3
            })
        );

        assert_eq!(tables.keyframer_names.len(), 1);
        assert_eq!(tables.occluder_names.entries().len(), 1);
        assert_eq!(
            tables.occluder_names.find_by_hash(name_hash("hall")),
            Some("Hall")
        );
        assert_eq!(tables.occluder_names.find_by_hash(0xdead_beef), None);
    }
}
