//! Info command: decode a world and print the field transcript.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use anyhow::{Context, Result};
use lithtech_dat::World;

use crate::cli::InfoArgs;
use crate::transcript::write_transcript;

pub fn execute(args: InfoArgs) -> Result<()> {
    let file = File::open(&args.file)
        .with_context(|| format!("cannot open {}", args.file.display()))?;
    let mut reader = BufReader::new(file);
    let world = World::parse(&mut reader, args.layout.into())
        .with_context(|| format!("cannot decode {}", args.file.display()))?;

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    write_transcript(&mut out, &world)?;
    out.flush()?;
    Ok(())
}
