//! Low-level emitter for the parenthesized LTA grammar.
//!
//! Two block forms exist: a plain node `( head ... )` and a node whose
//! body is itself a list, `( head ( ... ) )`. The writer tracks the
//! matching closer for each open block so emission stays balanced.

use std::io::Write;

use crate::error::Result;
use crate::types::Vec3;

enum Block {
    Node,
    List,
}

/// Indentation-aware writer for LTA output
pub struct LtaWriter<W: Write> {
    out: W,
    stack: Vec<Block>,
}

impl<W: Write> LtaWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            stack: Vec::new(),
        }
    }

    fn indent(&mut self) -> Result<()> {
        for _ in 0..self.stack.len() {
            self.out.write_all(b"\t")?;
        }
        Ok(())
    }

    /// Writes `( text )` as a single line.
    pub fn item(&mut self, text: &str) -> Result<()> {
        self.indent()?;
        writeln!(self.out, "( {text} )")?;
        Ok(())
    }

    /// Opens `( head`; closed with a single `)`.
    pub fn open(&mut self, head: &str) -> Result<()> {
        self.indent()?;
        writeln!(self.out, "( {head}")?;
        self.stack.push(Block::Node);
        Ok(())
    }

    /// Opens `( head (`; closed with `) )`.
    pub fn open_list(&mut self, head: &str) -> Result<()> {
        self.indent()?;
        writeln!(self.out, "( {head} (")?;
        self.stack.push(Block::List);
        Ok(())
    }

    /// Closes the innermost open block.
    pub fn close(&mut self) -> Result<()> {
        let block = self.stack.pop().unwrap_or(Block::Node);
        self.indent()?;
        match block {
            Block::Node => writeln!(self.out, ")")?,
            Block::List => writeln!(self.out, ") )")?,
        }
        Ok(())
    }

    /// Number of currently open blocks.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

/// Fixed-point float formatting shared by every emitter
pub fn fmt_f32(value: f32) -> String {
    format!("{value:.6}")
}

pub fn fmt_vec3(v: Vec3) -> String {
    format!("{:.6} {:.6} {:.6}", v.x, v.y, v.z)
}
