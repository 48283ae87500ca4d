//! Texture descriptor lookup.
//!
//! Texture paths in a world file are relative and case-mangled; the
//! descriptor files on disk may differ in case on every component. The
//! catalog resolves paths case-insensitively across a list of search
//! roots, follows `.spr` sprite indirections to the real descriptor, and
//! reads the pixel dimensions the basis solver needs. Every failure mode
//! is non-fatal: unknown dimensions are `(0, 0)`, which the solver maps
//! to its identity frame.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use log::warn;

use crate::reader::ReadExt;

/// Byte offset of the width/height pair inside a DTX header
const DTX_DIMS_OFFSET: u64 = 8;
/// Byte offset of the descriptor path inside an SPR file
const SPR_PATH_OFFSET: u64 = 20;

/// Resolves texture names to pixel dimensions, with caching.
#[derive(Debug)]
pub struct TextureCatalog {
    search_dirs: Vec<PathBuf>,
    cache: HashMap<String, (u32, u32)>,
}

impl TextureCatalog {
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        Self {
            search_dirs,
            cache: HashMap::new(),
        }
    }

    /// Pixel dimensions for a texture path as stored in the world file.
    /// Reserved names and unresolvable paths yield `(0, 0)`.
    pub fn dimensions(&mut self, name: &str) -> (u32, u32) {
        let key = name.replace('\\', "/").to_lowercase();

        if key.starts_with("lightanim") || key.starts_with("default") {
            return (0, 0);
        }

        if let Some(&dims) = self.cache.get(&key) {
            return dims;
        }

        let dims = self.lookup(&key).unwrap_or((0, 0));
        self.cache.insert(key, dims);
        dims
    }

    fn lookup(&self, relative: &str) -> Option<(u32, u32)> {
        for root in &self.search_dirs {
            let Some(mut path) = resolve_case_insensitive(root, relative) else {
                continue;
            };

            // Sprites indirect to the actual descriptor.
            if path
                .extension()
                .is_some_and(|e| e.eq_ignore_ascii_case("spr"))
            {
                match sprite_target(&path) {
                    Ok(target) => {
                        let target = target.replace('\\', "/").to_lowercase();
                        match resolve_case_insensitive(root, &target) {
                            Some(p) => path = p,
                            None => {
                                warn!("descriptor referenced by sprite not found: {target}");
                                continue;
                            }
                        }
                    }
                    Err(e) => {
                        warn!("cannot read sprite {}: {e}", path.display());
                        continue;
                    }
                }
            }

            match read_dimensions(&path) {
                Ok(dims) => return Some(dims),
                Err(e) => {
                    warn!("cannot read texture descriptor {}: {e}", path.display());
                }
            }
        }

        warn!("texture descriptor not found: {relative}");
        None
    }
}

/// Walks `relative` under `root`, matching each component without regard
/// to case. An exact match is preferred when present.
fn resolve_case_insensitive(root: &Path, relative: &str) -> Option<PathBuf> {
    let mut current = root.to_path_buf();

    for component in relative.split('/').filter(|c| !c.is_empty()) {
        let direct = current.join(component);
        if direct.exists() {
            current = direct;
            continue;
        }

        let entries = std::fs::read_dir(&current).ok()?;
        let matched = entries.filter_map(std::result::Result::ok).find(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|n| n.eq_ignore_ascii_case(component))
        })?;
        current = matched.path();
    }

    current.is_file().then_some(current)
}

fn sprite_target(path: &Path) -> crate::Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    reader.seek(SeekFrom::Start(SPR_PATH_OFFSET))?;
    reader.read_string()
}

fn read_dimensions(path: &Path) -> crate::Result<(u32, u32)> {
    let mut reader = BufReader::new(File::open(path)?);
    reader.seek(SeekFrom::Start(DTX_DIMS_OFFSET))?;
    let width = reader.read_u16_le()?;
    let height = reader.read_u16_le()?;
    Ok((u32::from(width), u32::from(height)))
}
