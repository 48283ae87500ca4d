//! Root CLI structure for dat2lta

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use lithtech_dat::VertexLayout;

#[derive(Parser)]
#[command(name = "dat2lta")]
#[command(about = "Convert LithTech Jupiter compiled worlds (DAT) to editable LTA scenes", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a world to LTA (scene, collision, and field transcript)
    Convert(ConvertArgs),

    /// Print a transcript of every decoded field
    Info(InfoArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Vertex record layout of the input world. Jupiter v85 worlds exist in
/// both variants and the file does not say which one it uses.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LayoutArg {
    /// Vertices carry a tangent/binormal block
    V1,
    /// Vertices carry position, UVs, color, and normal only
    V2,
}

impl From<LayoutArg> for VertexLayout {
    fn from(value: LayoutArg) -> Self {
        match value {
            LayoutArg::V1 => Self::TangentBasis,
            LayoutArg::V2 => Self::Compact,
        }
    }
}

#[derive(Args)]
pub struct ConvertArgs {
    /// Path to the DAT world file
    pub file: PathBuf,

    /// Vertex record layout of the input
    #[arg(short, long, value_enum)]
    pub layout: LayoutArg,

    /// Directory to write output files into (defaults to the input's)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Game resource root(s) searched for texture descriptors
    #[arg(short, long)]
    pub search_dir: Vec<PathBuf>,
}

#[derive(Args)]
pub struct InfoArgs {
    /// Path to the DAT world file
    pub file: PathBuf,

    /// Vertex record layout of the input
    #[arg(short, long, value_enum)]
    pub layout: LayoutArg,
}
