//! Rigid translation of a finished program.
//!
//! Shifts every `G0`/`G1` move by a constant offset so a program
//! generated around one origin can be replayed elsewhere on the bed.
//! Only the first `X`, `Y`, and `Z` word of each move is rewritten;
//! everything else, comments included, passes through untouched.

use crate::error::{ReportError, Result};

fn shifted_word(word: &str, axis: char, delta: f64, line: usize) -> Result<String> {
    let value: f64 = word
        .get(1..)
        .unwrap_or("")
        .parse()
        .map_err(|_| ReportError::Parse {
            line,
            reason: format!("bad coordinate word '{word}'"),
        })?;
    Ok(format!("{axis}{:.3}", value + delta))
}

/// Translate all moves in `program` by `(dx, dy, dz)` mm.
///
/// Non-move lines are preserved byte for byte. Move lines are rebuilt
/// word by word, which normalizes their interior whitespace.
pub fn translate_program(program: &str, dx: f64, dy: f64, dz: f64) -> Result<String> {
    let mut out = String::with_capacity(program.len() + program.len() / 8);

    for (index, line) in program.lines().enumerate() {
        let line_number = index + 1;
        let mut words = line.split_whitespace();
        let is_move = matches!(words.next(), Some("G0") | Some("G1"));
        if !is_move {
            out.push_str(line);
            out.push('\n');
            continue;
        }

        let mut seen = [false; 3];
        let mut in_comment = false;
        let mut rebuilt: Vec<String> = Vec::new();
        for word in line.split_whitespace() {
            if in_comment || word.starts_with(';') {
                in_comment = true;
                rebuilt.push(word.to_string());
                continue;
            }
            let axis = match word.as_bytes().first() {
                Some(b'X') if !seen[0] && word.len() >= 2 => {
                    seen[0] = true;
                    Some(('X', dx))
                }
                Some(b'Y') if !seen[1] && word.len() >= 2 => {
                    seen[1] = true;
                    Some(('Y', dy))
                }
                Some(b'Z') if !seen[2] && word.len() >= 2 => {
                    seen[2] = true;
                    Some(('Z', dz))
                }
                _ => None,
            };
            match axis {
                Some((name, delta)) => rebuilt.push(shifted_word(word, name, delta, line_number)?),
                None => rebuilt.push(word.to_string()),
            }
        }
        out.push_str(&rebuilt.join(" "));
        out.push('\n');
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moves_shift_all_three_axes() {
        let program = "G0 X10 Y20 Z0.2 E0.0 F9000 ; move over print point\n";
        let moved = translate_program(program, 5.0, -5.0, 1.0).unwrap();
        assert_eq!(
            moved,
            "G0 X15.000 Y15.000 Z1.200 E0.0 F9000 ; move over print point\n"
        );
    }

    #[test]
    fn test_non_move_lines_pass_through() {
        let program = "; --- Printer start g-code - start\n\
                       T-1 ; clear tool selection\n\
                       \n\
                       M83 ; use relative distances for extrusion\n";
        let moved = translate_program(program, 12.0, 34.0, 5.0).unwrap();
        assert_eq!(moved, program);
    }

    #[test]
    fn test_moves_without_an_axis_gain_nothing() {
        let program = "G1 X1 Y1 E0.50000 F2400 ; infill\n";
        let moved = translate_program(program, 0.0, 0.0, 7.5).unwrap();
        // No Z word in, no Z word out.
        assert_eq!(moved, "G1 X1.000 Y1.000 E0.50000 F2400 ; infill\n");
    }

    #[test]
    fn test_only_first_axis_word_is_rewritten() {
        let moved = translate_program("G1 X1 Y2 X3 F60\n", 5.0, 0.0, 0.0).unwrap();
        assert_eq!(moved, "G1 X6.000 Y2.000 X3 F60\n");
    }

    #[test]
    fn test_comment_words_are_not_coordinates() {
        let program = "G1 E1.20000 F2100 ; X axis wiper\n";
        let moved = translate_program(program, 9.0, 9.0, 9.0).unwrap();
        assert_eq!(moved, program);
    }

    #[test]
    fn test_bad_coordinate_is_an_error() {
        let result = translate_program("G21\nG1 Xoops Y0 F60\n", 1.0, 0.0, 0.0);
        assert!(matches!(result, Err(ReportError::Parse { line: 2, .. })));
    }

    #[test]
    fn test_round_trip_restores_coordinates() {
        let program = "G0 X110.000 Y70.000 Z1.200 E0.0 F9000 ; move over print point\n\
                       G1 X130.000 E6.64917 F2400 ; pad - infill\n";
        let there = translate_program(program, 3.25, -1.5, 0.6).unwrap();
        let back = translate_program(&there, -3.25, 1.5, -0.6).unwrap();
        assert_eq!(back, program);
    }
}
