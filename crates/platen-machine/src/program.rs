//! Program-level G-code: start and stop sequences, tool loads and
//! changes, and the camera pause.
//!
//! The dialect is RepRapFirmware on a Duet board driving a tool
//! changer: `T{n}` mounts a tool, `T-1` docks it, `G10` sets per-tool
//! temperatures, and part cooling fans sit on per-tool `M106 P{pin}`
//! outputs.

use tracing::debug;

use platen_toolpath::Gcode;

use crate::error::Result;
use crate::settings::MachineSettings;

/// How insistent an audible signal is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeepIntensity {
    /// Two beeps; routine events like a tool change.
    Short,
    /// Four beeps; the machine wants attention soon.
    Medium,
    /// Eight beeps; the program has ended.
    Long,
}

/// An audible signal from the machine speaker.
pub fn beep(intensity: BeepIntensity) -> Gcode {
    let (count, tone, pause) = match intensity {
        BeepIntensity::Short => (2, 1000, 500),
        BeepIntensity::Medium => (4, 1200, 500),
        BeepIntensity::Long => (8, 1700, 300),
    };
    let mut block = Gcode::new();
    block.push_comment("play sound");
    for i in 0..count {
        if i > 0 {
            block.push_line(&format!("G4 P{pause}"));
        }
        block.push_line(&format!("M300 S{tone} P1000"));
    }
    block
}

/// Program preamble: activate tools, set temperatures, home, probe
/// the bed, and switch to absolute coordinates with relative
/// extrusion.
///
/// Validates `settings` first so a half-configured machine fails here
/// rather than mid-print.
pub fn start_program(settings: &MachineSettings) -> Result<Gcode> {
    settings.validate()?;
    let mesh = settings.mesh_grid();
    debug!(
        materials = settings.materials.len(),
        "assembling start program"
    );

    let mut block = Gcode::new();
    block.push_comment("--- Printer start g-code - start");
    for tool in settings.tools() {
        block.push_line(&format!("T{tool} P0 ; activating tool T{tool}"));
    }
    block.push_line("T-1 P0 ; clear tool selection");
    block.push_blank();

    for config in settings.materials.values() {
        block.push_line(&format!(
            "G10 P{} S{} ; set tool {} extruder temp",
            config.tool, config.active_temp, config.tool
        ));
        block.push_line(&format!(
            "G10 P{} R{} ; set tool {} idle temp",
            config.tool, config.idle_temp, config.tool
        ));
    }
    block.push_line("M302 S120 ; set cold extrusion limit");
    block.push_line(&format!("M140 S{} ; set bed temp", settings.bed_temp));
    block.push_line(&format!("M190 S{} ; wait for bed temp", settings.bed_temp));
    block.push_blank();

    block.push_line("T-1 ; clear tool selection");
    block.push_line("G28 ; home all");
    block.push_line(&format!(
        "M557 X{}:{} Y{}:{} P{} ; mesh bed leveling",
        mesh.x.0, mesh.x.1, mesh.y.0, mesh.y.1, mesh.points
    ));
    block.push_line("G29 ; probe the bed, save the height map, and activate bed compensation");
    block.push_line("G21 ; set units to millimeters");
    block.push_line("G90 ; use absolute coordinates");
    block.push_line("M83 ; use relative distances for extrusion");
    block.push_line("T-1 ; clear tool selection");
    block.push_comment("--- Printer start g-code - end");
    block.push_blank();
    Ok(block)
}

/// Mount the tool for `material`, wait for temperature, start its
/// cooling fan, and prime the extruder.
pub fn load_tool(settings: &MachineSettings, material: &str) -> Result<Gcode> {
    let config = settings.material_config(material)?;
    let fan = settings.fan_pin(config.tool)?;
    debug!(material, tool = config.tool, "loading tool");

    let mut block = Gcode::new();
    block.push_comment(&format!(
        "--- Tool load: T{} : {} - start",
        config.tool, material
    ));
    block.push_line("T-1 ; clear tool selection");
    block.push_line(&format!("T{} ; load tool", config.tool));
    block.push_line(&format!(
        "M116 P{} ; wait for extruder to reach temp.",
        config.tool
    ));
    block.push_line(&format!(
        "M106 P{} S{} ; turn on PCF for mounted tool",
        fan, config.cooling
    ));
    block.push_line(&format!(
        "M98 P\"{}.g\" ; prime extruder",
        config.prime_macro
    ));
    block.push_comment(&format!("--- Tool load: T{} - end", config.tool));
    block.push_blank();
    Ok(block)
}

/// Dock the tool for `material` and stop its cooling fan.
pub fn unload_tool(settings: &MachineSettings, material: &str) -> Result<Gcode> {
    let config = settings.material_config(material)?;
    let fan = settings.fan_pin(config.tool)?;
    debug!(material, tool = config.tool, "unloading tool");

    let mut block = Gcode::new();
    block.push_comment(&format!("--- Tool unload: T{} - start", config.tool));
    block.push_line("T-1 ; unload current tool");
    block.push_line(&format!(
        "M106 P{fan} S0 ; turn off PCF for dismounted tool"
    ));
    block.push_comment(&format!("--- Tool unload: T{} - end", config.tool));
    block.push_blank();
    Ok(block)
}

/// Swap from `current` material's tool to `next`'s in one sequence.
pub fn tool_change(
    settings: &MachineSettings,
    current: &str,
    next: &str,
    audible: bool,
) -> Result<Gcode> {
    let current_config = settings.material_config(current)?;
    let next_config = settings.material_config(next)?;
    let current_fan = settings.fan_pin(current_config.tool)?;
    let next_fan = settings.fan_pin(next_config.tool)?;
    debug!(
        from = current_config.tool,
        to = next_config.tool,
        "changing tool"
    );

    let mut block = Gcode::new();
    block.push_comment(&format!(
        "--- Tool change: T{} -> T{} : {} -> {} - start",
        current_config.tool, next_config.tool, current, next
    ));
    if audible {
        block.extend(&beep(BeepIntensity::Short));
    }
    block.push_line("T-1 ; unload current tool");
    block.push_line(&format!(
        "M106 P{current_fan} S0 ; turn off fan for current tool"
    ));
    block.push_line(&format!("T{} ; load next tool", next_config.tool));
    block.push_line(&format!(
        "M116 P{} ; wait for extruder to reach temp.",
        next_config.tool
    ));
    block.push_line(&format!(
        "M106 P{} S{} ; turn on PCF for mounted tool",
        next_fan, next_config.cooling
    ));
    block.push_line(&format!(
        "M98 P\"{}.g\" ; prime extruder",
        next_config.prime_macro
    ));
    block.push_comment(&format!(
        "--- Tool change: T{} -> T{} : {} -> {} - end",
        current_config.tool, next_config.tool, current, next
    ));
    block.push_blank();
    Ok(block)
}

/// Pause for an external layer camera.
///
/// Docks the current tool if one is mounted, flushes motion with
/// `M400`, raises the camera trigger pin, waits at `M226` until the
/// firmware is resumed, then remounts the next tool if one is needed.
pub fn pause_for_camera(
    settings: &MachineSettings,
    current: Option<&str>,
    next: Option<&str>,
    audible: bool,
) -> Result<Gcode> {
    let mut block = Gcode::new();
    block.push_comment("photo - start");
    if audible {
        block.extend(&beep(BeepIntensity::Medium));
    }
    if let Some(material) = current {
        block.extend(&unload_tool(settings, material)?);
    }
    block.push_line("M400");
    block.push_line("M42 P102 S1");
    block.push_line("M226");
    if let Some(material) = next {
        block.extend(&load_tool(settings, material)?);
    }
    block.push_comment("photo - end");
    block.push_blank();
    Ok(block)
}

/// Program postamble: drop the bed, dock the tool, stop every
/// configured cooling fan, park the gantry, and halt.
pub fn stop_program(settings: &MachineSettings) -> Gcode {
    let mut block = Gcode::new();
    block.push_comment("printer stop");
    block.push_line("G91 ; use relative positioning");
    block.push_line("G1 Z10 F1000 ; drop Bed 10mm");
    block.push_line("G90 ; use absolute positioning");
    block.push_line("T-1 ; unload tool");

    let mut pins: Vec<u8> = settings.tool_fans.values().copied().collect();
    pins.sort_unstable();
    pins.dedup();
    for pin in pins {
        block.push_line(&format!("M106 P{pin} S0 ; turn off PCF"));
    }

    block.push_line("G29 S2 ; disable mesh compensation.");
    block.push_line("G1 X-30 Y180 F10000 ; park gantry at back-left of machine");
    block.push_line("M0 ; stop all");
    block.extend(&beep(BeepIntensity::Long));
    block
}
