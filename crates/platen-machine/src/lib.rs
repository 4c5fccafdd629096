#![warn(missing_docs)]

//! Machine control for a RepRapFirmware tool changer.
//!
//! This crate owns the machine side of a print job: which tool each
//! material lives in, temperatures, cooling fan wiring, and bed
//! leveling, plus the G-code sequences that start a program, swap
//! tools, pause for a layer camera, and shut the machine down.
//!
//! # Example
//!
//! ```ignore
//! use platen_machine::{start_program, load_tool, stop_program, MachineSettings};
//!
//! let settings = MachineSettings::load_from_file(Path::new("machine.json"))?;
//! let mut program = start_program(&settings)?;
//! program.extend(&load_tool(&settings, "pla")?);
//! // ... print ...
//! program.extend(&stop_program(&settings));
//! ```

pub mod error;
pub mod program;
pub mod settings;

pub use error::{MachineError, Result};
pub use program::{
    beep, load_tool, pause_for_camera, start_program, stop_program, tool_change, unload_tool,
    BeepIntensity,
};
pub use settings::{MachineSettings, MaterialConfig, MeshGrid};
