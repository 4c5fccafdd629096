//! Machine configuration for a tool changer printer.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MachineError, Result};

/// Per-material tool assignment and thermal configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialConfig {
    /// Tool number the material is loaded in.
    pub tool: u8,
    /// Extruder temperature while printing (deg C).
    pub active_temp: u32,
    /// Standby temperature while the tool is docked (deg C).
    pub idle_temp: u32,
    /// Part cooling fan duty cycle, 0 to 1.
    pub cooling: f64,
    /// Firmware macro that primes the extruder after a load, without
    /// the `.g` extension.
    pub prime_macro: String,
}

/// Probe grid for mesh bed leveling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshGrid {
    /// Probed X range (mm).
    pub x: (f64, f64),
    /// Probed Y range (mm).
    pub y: (f64, f64),
    /// Probe points per axis.
    pub points: u32,
}

impl Default for MeshGrid {
    fn default() -> Self {
        Self {
            x: (100.0, 200.0),
            y: (50.0, 150.0),
            points: 3,
        }
    }
}

fn default_tool_fans() -> BTreeMap<u8, u8> {
    BTreeMap::from([(0, 2), (1, 4), (2, 6), (3, 8), (4, 0)])
}

/// Machine-level settings: materials, bed, leveling, and fan wiring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineSettings {
    /// Material name to tool configuration.
    pub materials: BTreeMap<String, MaterialConfig>,
    /// Bed temperature (deg C).
    pub bed_temp: u32,
    /// Mesh leveling grid; `None` probes the default grid.
    #[serde(default)]
    pub mesh_bed: Option<MeshGrid>,
    /// Part cooling fan pin per tool number.
    #[serde(default = "default_tool_fans")]
    pub tool_fans: BTreeMap<u8, u8>,
}

impl MachineSettings {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.materials.is_empty() {
            return Err(MachineError::InvalidSettings(
                "at least one material must be configured".into(),
            ));
        }
        for (name, config) in &self.materials {
            if !(0.0..=1.0).contains(&config.cooling) {
                return Err(MachineError::InvalidSettings(format!(
                    "material '{name}': cooling must be between 0 and 1"
                )));
            }
            if config.prime_macro.is_empty() {
                return Err(MachineError::InvalidSettings(format!(
                    "material '{name}': prime_macro must not be empty"
                )));
            }
            if !self.tool_fans.contains_key(&config.tool) {
                return Err(MachineError::NoFanPin(config.tool));
            }
        }
        Ok(())
    }

    /// The configuration for `material`.
    pub fn material_config(&self, material: &str) -> Result<&MaterialConfig> {
        self.materials
            .get(material)
            .ok_or_else(|| MachineError::UnknownMaterial(material.to_string()))
    }

    /// The cooling fan pin wired to `tool`.
    pub fn fan_pin(&self, tool: u8) -> Result<u8> {
        self.tool_fans
            .get(&tool)
            .copied()
            .ok_or(MachineError::NoFanPin(tool))
    }

    /// Tool numbers in use, ascending and deduplicated.
    pub fn tools(&self) -> Vec<u8> {
        let mut tools: Vec<u8> = self.materials.values().map(|m| m.tool).collect();
        tools.sort_unstable();
        tools.dedup();
        tools
    }

    /// The leveling grid, falling back to the default.
    pub fn mesh_grid(&self) -> MeshGrid {
        self.mesh_bed.clone().unwrap_or_default()
    }

    /// Load settings from a JSON file and validate them.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings as pretty-printed JSON.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dual_material() -> MachineSettings {
        let mut materials = BTreeMap::new();
        materials.insert(
            "pla".to_string(),
            MaterialConfig {
                tool: 0,
                active_temp: 210,
                idle_temp: 160,
                cooling: 0.8,
                prime_macro: "prime_t0".to_string(),
            },
        );
        materials.insert(
            "petg".to_string(),
            MaterialConfig {
                tool: 1,
                active_temp: 240,
                idle_temp: 175,
                cooling: 0.5,
                prime_macro: "prime_t1".to_string(),
            },
        );
        MachineSettings {
            materials,
            bed_temp: 60,
            mesh_bed: None,
            tool_fans: default_tool_fans(),
        }
    }

    #[test]
    fn test_valid_settings_pass() {
        assert!(dual_material().validate().is_ok());
    }

    #[test]
    fn test_cooling_out_of_range_fails() {
        let mut settings = dual_material();
        settings.materials.get_mut("pla").unwrap().cooling = 1.5;
        assert!(matches!(
            settings.validate(),
            Err(MachineError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_missing_fan_pin_fails() {
        let mut settings = dual_material();
        settings.materials.get_mut("pla").unwrap().tool = 9;
        assert!(matches!(settings.validate(), Err(MachineError::NoFanPin(9))));
    }

    #[test]
    fn test_empty_prime_macro_fails() {
        let mut settings = dual_material();
        settings.materials.get_mut("petg").unwrap().prime_macro = String::new();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_no_materials_fails() {
        let settings = MachineSettings {
            materials: BTreeMap::new(),
            bed_temp: 60,
            mesh_bed: None,
            tool_fans: default_tool_fans(),
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_tools_are_sorted_and_deduplicated() {
        let mut settings = dual_material();
        settings.materials.insert(
            "pla_black".to_string(),
            MaterialConfig {
                tool: 0,
                active_temp: 210,
                idle_temp: 160,
                cooling: 0.8,
                prime_macro: "prime_t0".to_string(),
            },
        );
        assert_eq!(settings.tools(), vec![0, 1]);
    }

    #[test]
    fn test_default_grid_and_fans_fill_in() {
        let json = r#"{
            "materials": {
                "pla": {
                    "tool": 0,
                    "active_temp": 210,
                    "idle_temp": 160,
                    "cooling": 1.0,
                    "prime_macro": "prime_t0"
                }
            },
            "bed_temp": 55
        }"#;
        let settings: MachineSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.mesh_bed, None);
        assert_eq!(settings.mesh_grid(), MeshGrid::default());
        assert_eq!(settings.fan_pin(0).unwrap(), 2);
        assert_eq!(settings.fan_pin(3).unwrap(), 8);
        assert!(settings.fan_pin(9).is_err());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_json_round_trip() {
        let settings = dual_material();
        let text = serde_json::to_string_pretty(&settings).unwrap();
        let back: MachineSettings = serde_json::from_str(&text).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn test_unknown_material_lookup_fails() {
        let settings = dual_material();
        assert!(settings.material_config("pla").is_ok());
        assert!(matches!(
            settings.material_config("abs"),
            Err(MachineError::UnknownMaterial(_))
        ));
    }
}
