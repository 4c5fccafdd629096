//! G-code program buffer.
//!
//! Generator methods return [`Gcode`] blocks; callers splice blocks
//! together (or key them by layer) and write the result out once.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;

/// A block of G-code text.
#[derive(Clone, Default, PartialEq)]
pub struct Gcode {
    content: String,
}

impl Gcode {
    /// Create an empty block.
    pub fn new() -> Self {
        Self {
            content: String::new(),
        }
    }

    /// Wrap existing program text.
    pub fn from_string(content: String) -> Self {
        Self { content }
    }

    /// The program text.
    pub fn as_str(&self) -> &str {
        &self.content
    }

    /// The program text as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.content.as_bytes()
    }

    /// Length of the program text in bytes.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// True when no text has been emitted.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Append one line, terminating it with a newline.
    pub fn push_line(&mut self, line: &str) {
        self.content.push_str(line);
        self.content.push('\n');
    }

    /// Append a `;`-prefixed comment line.
    pub fn push_comment(&mut self, comment: &str) {
        self.content.push_str("; ");
        self.content.push_str(comment);
        self.content.push('\n');
    }

    /// Append an empty line, separating blocks visually.
    pub fn push_blank(&mut self) {
        self.content.push('\n');
    }

    /// Append another block.
    pub fn extend(&mut self, other: &Gcode) {
        self.content.push_str(&other.content);
    }

    /// Number of lines in the block.
    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }

    /// Iterate over the lines of the block.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.lines()
    }

    /// Write the program text to a file.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(self.content.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Read program text from a file.
    pub fn read_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_string(content))
    }
}

impl fmt::Display for Gcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}

impl fmt::Debug for Gcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gcode({} lines, {} bytes)", self.line_count(), self.len())
    }
}
