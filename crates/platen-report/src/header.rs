//! Commented program header listing the printing parameters.

use std::collections::BTreeMap;

use platen_toolpath::{Gcode, PrintingParameters};

use crate::error::Result;

/// Render every material's parameters as a comment block.
///
/// Goes at the top of a program so a printed part can be traced back
/// to the exact parameters that produced it.
pub fn parameter_header(params: &BTreeMap<String, PrintingParameters>) -> Result<Gcode> {
    let mut block = Gcode::new();
    block.push_comment("Printing params - start");
    block.push_blank();
    for (material, material_params) in params {
        block.push_comment(&format!("Material: {material}"));
        let value = serde_json::to_value(material_params)?;
        if let serde_json::Value::Object(fields) = value {
            for (key, field) in fields {
                block.push_comment(&format!("\t{key:<20} = {field}"));
            }
        }
        block.push_blank();
    }
    block.push_comment("Printing params - end");
    block.push_blank();
    Ok(block)
}
