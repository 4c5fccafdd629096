//! Print time and filament accounting for a finished program.
//!
//! Works from the program text alone: motion time comes from move
//! lengths and feedrates, extrusion-only time from retract-style moves
//! with no travel, and tool change time from counting `T` words at a
//! configurable cost per load and unload.

use serde::Serialize;

use crate::error::{ReportError, Result};

/// Time accounting knobs the program text cannot provide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsOptions {
    /// Seconds charged per tool unload.
    pub tool_unload_seconds: f64,
    /// Seconds charged per tool load.
    pub tool_load_seconds: f64,
}

impl Default for StatsOptions {
    fn default() -> Self {
        Self {
            tool_unload_seconds: 3.0,
            tool_load_seconds: 20.0,
        }
    }
}

/// Aggregate statistics for one program. Durations are rounded to
/// two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgramStats {
    /// Total print time (h).
    pub print_time_hours: f64,
    /// Total print time (min).
    pub print_time_mins: f64,
    /// Total print time (s).
    pub print_time_sec: f64,
    /// Net extruded filament (mm); retracts subtract.
    pub extruded_mm: f64,
    /// Time spent in moves with travel (s).
    pub motion_sec: f64,
    /// Time spent extruding without travel (s).
    pub extrusion_only_sec: f64,
    /// Time charged to tool unloads (s).
    pub tool_unload_sec: f64,
    /// Time charged to tool loads (s).
    pub tool_load_sec: f64,
    /// Number of tool loads seen.
    pub tool_loads: u32,
    /// Number of tool unloads seen.
    pub tool_unloads: u32,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn numeric_word(word: &str, line: usize) -> Result<f64> {
    word.get(1..)
        .unwrap_or("")
        .parse::<f64>()
        .map_err(|_| ReportError::Parse {
            line,
            reason: format!("bad numeric word '{word}'"),
        })
}

/// Analyze a program's text.
///
/// Axes carry forward from line to line, starting at the origin, so
/// moves that restate only the changed axis still measure correctly.
/// Feedrate carries forward too; a move or extrusion before any `F`
/// word is an error.
pub fn analyze_program(program: &str, options: &StatsOptions) -> Result<ProgramStats> {
    let mut prev = [0.0f64; 3];
    let mut feedrate: Option<f64> = None;
    let mut extruded = 0.0;
    let mut motion_sec = 0.0;
    let mut extrusion_only_sec = 0.0;
    let mut tool_loads = 0u32;
    let mut tool_unloads = 0u32;

    for (index, raw) in program.lines().enumerate() {
        let line_number = index + 1;
        let code = raw.split(';').next().unwrap_or("");
        let mut words = code.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };

        if command == "G0" || command == "G1" {
            let mut coord: [Option<f64>; 3] = [None, None, None];
            let mut extrusion = 0.0;
            for word in words {
                if word.len() < 2 {
                    continue;
                }
                match word.as_bytes()[0] {
                    b'X' => coord[0] = Some(numeric_word(word, line_number)?),
                    b'Y' => coord[1] = Some(numeric_word(word, line_number)?),
                    b'Z' => coord[2] = Some(numeric_word(word, line_number)?),
                    b'E' => extrusion = numeric_word(word, line_number)?,
                    b'F' => feedrate = Some(numeric_word(word, line_number)?),
                    _ => {}
                }
            }

            let position = [
                coord[0].unwrap_or(prev[0]),
                coord[1].unwrap_or(prev[1]),
                coord[2].unwrap_or(prev[2]),
            ];
            let distance = ((position[0] - prev[0]).powi(2)
                + (position[1] - prev[1]).powi(2)
                + (position[2] - prev[2]).powi(2))
            .sqrt();

            if distance > 0.0 || extrusion != 0.0 {
                let Some(f) = feedrate else {
                    return Err(ReportError::Parse {
                        line: line_number,
                        reason: "move before any feedrate word".into(),
                    });
                };
                if distance > 0.0 {
                    motion_sec += distance / (f / 60.0);
                } else {
                    extrusion_only_sec += extrusion.abs() / (f / 60.0);
                }
            }
            extruded += extrusion;
            prev = position;
        } else if command.starts_with('T') {
            if command == "T-1" {
                tool_unloads += 1;
            } else {
                tool_loads += 1;
            }
        }
    }

    let tool_unload_sec = f64::from(tool_unloads) * options.tool_unload_seconds;
    let tool_load_sec = f64::from(tool_loads) * options.tool_load_seconds;
    let print_time_sec = motion_sec + extrusion_only_sec + tool_unload_sec + tool_load_sec;

    Ok(ProgramStats {
        print_time_hours: round2(print_time_sec / 3600.0),
        print_time_mins: round2(print_time_sec / 60.0),
        print_time_sec: round2(print_time_sec),
        extruded_mm: round2(extruded),
        motion_sec: round2(motion_sec),
        extrusion_only_sec: round2(extrusion_only_sec),
        tool_unload_sec: round2(tool_unload_sec),
        tool_load_sec: round2(tool_load_sec),
        tool_loads,
        tool_unloads,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(program: &str) -> ProgramStats {
        analyze_program(program, &StatsOptions::default()).unwrap()
    }

    #[test]
    fn test_single_move_measures_from_origin() {
        let stats = analyze("G1 X3 Y4 Z0 E0.0 F60 ; diagonal\n");
        assert_eq!(stats.motion_sec, 5.0);
        assert_eq!(stats.print_time_sec, 5.0);
        assert_eq!(stats.extruded_mm, 0.0);
        assert_eq!(stats.extrusion_only_sec, 0.0);
    }

    #[test]
    fn test_axes_carry_forward() {
        let program = "G0 X10 Y0 Z0 E0.0 F600\n\
                       G1 Y5 F300\n";
        let stats = analyze(program);
        assert_eq!(stats.motion_sec, 2.0);
    }

    #[test]
    fn test_retract_counts_as_extrusion_only_time() {
        let stats = analyze("G1 E-2 F120 ; retract\n");
        assert_eq!(stats.motion_sec, 0.0);
        assert_eq!(stats.extrusion_only_sec, 1.0);
        assert_eq!(stats.extruded_mm, -2.0);
    }

    #[test]
    fn test_retract_unretract_pair_nets_zero_filament() {
        let program = "G1 E-1.2 F2100 ; retract\n\
                       G1 E1.2 F2100 ; unretract\n";
        let stats = analyze(program);
        assert_eq!(stats.extruded_mm, 0.0);
        assert!((stats.extrusion_only_sec - 0.07).abs() < 1e-12);
    }

    #[test]
    fn test_tool_words_are_charged() {
        let program = "T0 P0 ; activating tool T0\n\
                       T1 P0 ; activating tool T1\n\
                       T-1 P0 ; clear tool selection\n\
                       T0 ; load tool\n\
                       T-1 ; unload current tool\n";
        let stats = analyze(program);
        assert_eq!(stats.tool_loads, 3);
        assert_eq!(stats.tool_unloads, 2);
        assert_eq!(stats.tool_load_sec, 60.0);
        assert_eq!(stats.tool_unload_sec, 6.0);
        assert_eq!(stats.print_time_sec, 66.0);
    }

    #[test]
    fn test_custom_tool_costs() {
        let options = StatsOptions {
            tool_unload_seconds: 1.0,
            tool_load_seconds: 2.0,
        };
        let stats = analyze_program("T0\nT-1\n", &options).unwrap();
        assert_eq!(stats.print_time_sec, 3.0);
    }

    #[test]
    fn test_comments_are_ignored() {
        let program = "; G1 X100 Y100 Z100 E50 F60\n\
                       G1 X1 Y0 Z0 E0.0 F60 ; wipe X99\n\
                       M400 ;note\n";
        let stats = analyze(program);
        assert_eq!(stats.motion_sec, 1.0);
        assert_eq!(stats.extruded_mm, 0.0);
    }

    #[test]
    fn test_move_before_feedrate_is_an_error() {
        let result = analyze_program("G1 X5 Y0 Z0 E0.1\n", &StatsOptions::default());
        assert!(matches!(
            result,
            Err(ReportError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_bad_coordinate_names_its_line() {
        let result = analyze_program("G21\nG1 Xlots F60\n", &StatsOptions::default());
        assert!(matches!(
            result,
            Err(ReportError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn test_durations_round_to_two_decimals() {
        let stats = analyze("G1 X1 Y0 Z0 E0.0 F90\n");
        assert!((stats.motion_sec - 0.67).abs() < 1e-12);
    }

    #[test]
    fn test_minutes_and_hours_derive_from_seconds() {
        let program = "G1 X100 Y0 Z0 E0.0 F100\n"; // 60 s
        let stats = analyze(program);
        assert_eq!(stats.print_time_sec, 60.0);
        assert_eq!(stats.print_time_mins, 1.0);
        assert!((stats.print_time_hours - 0.02).abs() < 1e-12);
    }
}
