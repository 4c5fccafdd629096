//! Job files and program assembly.
//!
//! A job file is one JSON document holding everything a print needs:
//! printing parameters per material, the machine configuration, and
//! the region layout. Assembly walks the regions in order and swaps
//! tools whenever the material changes.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use platen_machine::{load_tool, start_program, stop_program, tool_change, unload_tool};
use platen_machine::MachineSettings;
use platen_report::parameter_header;
use platen_toolpath::{
    Gcode, MaterialSet, Point2, PrintingParameters, RegionOverrides, RegionSpec, RegionTable,
};

/// A complete print job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobFile {
    /// Origin on the bed that absolute region positions offset from.
    #[serde(default)]
    pub origin: [f64; 2],
    /// Printing parameters per material.
    pub materials: BTreeMap<String, PrintingParameters>,
    /// Machine configuration.
    pub machine: MachineSettings,
    /// Regions in printing order.
    pub regions: Vec<RegionSpec>,
}

impl JobFile {
    /// Load a job from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Resolve the job's region specs into an ordered table.
    pub fn resolve_regions(&self) -> platen_toolpath::Result<RegionTable> {
        let mut table = RegionTable::new(Point2::new(self.origin[0], self.origin[1]));
        for spec in &self.regions {
            table.add_region(spec.clone())?;
        }
        Ok(table)
    }
}

/// Assemble the complete program for a job.
///
/// Header, machine start, then each region in order with a tool load
/// before the first and a tool change at every material switch, and
/// finally an unload and the machine stop.
pub fn generate_program(job: &JobFile) -> Result<Gcode> {
    job.machine.validate()?;
    let table = job.resolve_regions()?;
    let mut materials = MaterialSet::new(job.materials.clone())?;

    let mut program = parameter_header(&job.materials)?;
    program.extend(&start_program(&job.machine)?);

    let mut mounted: Option<&str> = None;
    for region in table.iter() {
        match mounted {
            None => {
                program.extend(&load_tool(&job.machine, &region.material)?);
            }
            Some(current) if current != region.material => {
                program.extend(&tool_change(&job.machine, current, &region.material, true)?);
            }
            Some(_) => {}
        }
        mounted = Some(&region.material);

        let generator = materials.generator_mut(&region.material)?;
        program.extend(&generator.print_region(region, &RegionOverrides::default())?);
    }

    if let Some(current) = mounted {
        program.extend(&unload_tool(&job.machine, current)?);
    }
    program.extend(&stop_program(&job.machine));
    Ok(program)
}
