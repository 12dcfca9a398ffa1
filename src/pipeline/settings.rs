// grid + tempo settings, loaded on startup and saved on quit.
// patterns are never written here, every session starts with empty grids.
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::grid::{GridConfig, TimeSignature};
use crate::shared::DEFAULT_BPM;

pub const DRUMGRID_DIR: &str = ".drumgrid";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub measures: u32,
    pub time_signature: String, // kept as typed, "N/M"
    pub bpm: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            measures: 1,
            time_signature: TimeSignature::COMMON.to_string(),
            bpm: DEFAULT_BPM,
        }
    }
}

impl Settings {
    pub fn from_config(config: &GridConfig) -> Self {
        Self {
            measures: config.measures(),
            time_signature: config.time_signature().to_string(),
            bpm: config.bpm(),
        }
    }

    // anything that doesn't validate falls back to its default
    pub fn to_config(&self) -> GridConfig {
        let mut config = GridConfig::default();
        if let Err(e) = config.set_measures(self.measures) {
            log::warn!("settings: ignoring measures {}: {e}", self.measures);
        }
        match self.time_signature.parse() {
            Ok(ts) => {
                if let Err(e) = config.set_time_signature(ts) {
                    log::warn!("settings: ignoring time signature {}: {e}", self.time_signature);
                }
            }
            Err(e) => log::warn!("settings: ignoring time signature: {e}"),
        }
        if let Err(e) = config.set_bpm(self.bpm) {
            log::warn!("settings: ignoring bpm {}: {e}", self.bpm);
        }
        config
    }
}

// <project_dir>/.drumgrid/settings.json
pub fn settings_file_path(project_dir: &Path) -> PathBuf {
    project_dir.join(DRUMGRID_DIR).join(SETTINGS_FILE)
}

/// Missing file means defaults; a file that exists but can't be read or parsed
/// is an error so the caller can say so.
pub fn load_settings(project_dir: &Path) -> anyhow::Result<Settings> {
    let path = settings_file_path(project_dir);
    if !path.exists() {
        return Ok(Settings::default());
    }
    let data = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))
}

pub fn save_settings(project_dir: &Path, settings: &Settings) -> anyhow::Result<()> {
    let path = settings_file_path(project_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?; // create .drumgrid/ if needed
    }
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "measures": 3 }"#).unwrap();
        assert_eq!(settings.measures, 3);
        assert_eq!(settings.time_signature, "4/4");
        assert_eq!(settings.bpm, DEFAULT_BPM);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let settings = Settings {
            measures: 0,
            time_signature: "waltz".into(),
            bpm: 140.0,
        };
        let config = settings.to_config();
        assert_eq!(config.measures(), 1);
        assert_eq!(config.time_signature(), TimeSignature::COMMON);
        assert_eq!(config.bpm(), 140.0);
    }

    #[test]
    fn test_out_of_range_values_fall_back() {
        let settings: Settings = serde_json::from_str(
            r#"{ "measures": 4294967295, "time_signature": "4294967295/4", "bpm": 1e-20 }"#,
        )
        .unwrap();
        assert_eq!(settings.to_config(), GridConfig::default());

        let settings = Settings { measures: 65, time_signature: "33/4".into(), bpm: 1000.0 };
        assert_eq!(settings.to_config(), GridConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = std::env::temp_dir().join(format!("drumgrid-settings-{}", std::process::id()));
        let config = GridConfig::new(2, "7/8".parse().unwrap(), 174.0).unwrap();
        save_settings(&dir, &Settings::from_config(&config)).unwrap();
        let loaded = load_settings(&dir).unwrap();
        assert_eq!(loaded.to_config(), config);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = std::env::temp_dir().join("drumgrid-settings-does-not-exist");
        assert_eq!(load_settings(&dir).unwrap(), Settings::default());
    }
}
