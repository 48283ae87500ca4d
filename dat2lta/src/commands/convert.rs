//! Convert command: DAT world in, three artifacts out: the scene LTA,
//! the collision LTA, and the plain-text field transcript.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use lithtech_dat::{TextureCatalog, World, export_physics, export_scene};

use crate::cli::ConvertArgs;
use crate::transcript::write_transcript;

pub fn execute(args: ConvertArgs) -> Result<()> {
    let map_name = map_name(&args.file)?;
    let output_dir = match args.output_dir {
        Some(dir) => dir,
        None => args
            .file
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
    };

    let file = File::open(&args.file)
        .with_context(|| format!("cannot open {}", args.file.display()))?;
    let mut reader = BufReader::new(file);
    let world = World::parse(&mut reader, args.layout.into())
        .with_context(|| format!("cannot decode {}", args.file.display()))?;

    // Texture descriptors are looked up relative to the given resource
    // roots; with none given, relative to the input's directory.
    let search_dirs = if args.search_dir.is_empty() {
        vec![output_dir.clone()]
    } else {
        args.search_dir
    };
    let mut textures = TextureCatalog::new(search_dirs);

    let transcript_path = output_dir.join(format!("{map_name}.txt"));
    let mut transcript = BufWriter::new(
        File::create(&transcript_path)
            .with_context(|| format!("cannot create {}", transcript_path.display()))?,
    );
    write_transcript(&mut transcript, &world)?;

    let scene_path = output_dir.join(format!("{map_name}.lta"));
    let scene = BufWriter::new(
        File::create(&scene_path)
            .with_context(|| format!("cannot create {}", scene_path.display()))?,
    );
    export_scene(scene, &world, &map_name, &mut textures)?;

    let physics_path = output_dir.join(format!("{map_name}_PhysicsDATA.lta"));
    let physics = BufWriter::new(
        File::create(&physics_path)
            .with_context(|| format!("cannot create {}", physics_path.display()))?,
    );
    export_physics(physics, &world, &map_name)?;

    println!("{map_name} has been successfully converted.");
    println!("  {}", transcript_path.display());
    println!("  {}", scene_path.display());
    println!("  {}", physics_path.display());
    Ok(())
}

fn map_name(path: &Path) -> Result<String> {
    match path.file_stem().and_then(|s| s.to_str()) {
        Some(stem) => Ok(stem.to_string()),
        None => bail!("cannot derive a map name from {}", path.display()),
    }
}
