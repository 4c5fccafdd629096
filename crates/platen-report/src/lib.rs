#![warn(missing_docs)]

//! Analysis and rewriting of finished G-code programs.
//!
//! Once a program is generated this crate answers questions about it:
//! how long it will run, how much filament it uses, and how many tool
//! changes it makes. It can also translate a whole program across the
//! bed and render the parameter header that documents a print.

pub mod error;
pub mod header;
pub mod stats;
pub mod translate;

pub use error::{ReportError, Result};
pub use header::parameter_header;
pub use stats::{analyze_program, ProgramStats, StatsOptions};
pub use translate::translate_program;
