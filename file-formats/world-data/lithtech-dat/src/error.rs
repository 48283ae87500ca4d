use std::io;
use thiserror::Error;

/// Error types for DAT parsing and LTA export
#[derive(Error, Debug)]
pub enum DatError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A read ran past the end of the input. Always fatal: every record
    /// offset after a short read is unreliable.
    #[error("Unexpected end of file")]
    UnexpectedEof,

    /// A keyframe carries an interpolation code the format does not
    /// define. There is no declared length to skip, so decoding cannot
    /// resynchronize past it.
    #[error("Unknown keyframe interpolation code {code:#06x} at offset {offset:#010x}")]
    UnknownKeyType { code: u16, offset: u64 },

    /// A triangle referenced a vertex outside its node's vertex buffer.
    #[error("Vertex index {index} out of range: node has {max} vertices")]
    IndexOutOfRange { index: u32, max: u32 },

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Result type for DAT operations
pub type Result<T> = std::result::Result<T, DatError>;
