use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub frames: u64,
    /// Simulated milliseconds between frames.
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
    #[serde(default = "default_metrics_every")]
    pub metrics_every: u64,
    pub seeds: SeedSpec,
    #[serde(default = "default_content_dir")]
    pub content_dir: String,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub overrides: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub viewport: Viewport,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Viewport {
    pub width_px: f32,
    pub height_px: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width_px: 1280.0,
            height_px: 720.0,
        }
    }
}

fn default_frame_ms() -> u64 {
    50
}

fn default_metrics_every() -> u64 {
    100
}

fn default_content_dir() -> String {
    "./content".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SeedSpec {
    List(Vec<u64>),
    Range { range: [u64; 2] },
}

impl SeedSpec {
    pub fn expand(&self) -> Vec<u64> {
        match self {
            SeedSpec::List(seeds) => seeds.clone(),
            SeedSpec::Range { range } => (range[0]..=range[1]).collect(),
        }
    }
}

impl Scenario {
    /// Everything that shapes a run, recorded next to each result.
    pub fn params(&self) -> serde_json::Value {
        serde_json::json!({
            "frames": self.frames,
            "frame_ms": self.frame_ms,
            "metrics_every": self.metrics_every,
            "content_dir": self.content_dir,
            "level": self.level,
            "overrides": self.overrides,
            "viewport": self.viewport,
        })
    }
}

pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading scenario file: {}", path.display()))?;
    let scenario: Scenario = serde_json::from_str(&json)
        .with_context(|| format!("parsing scenario file: {}", path.display()))?;
    if scenario.name.is_empty() {
        bail!("scenario 'name' must not be empty");
    }
    if scenario.frames == 0 {
        bail!("scenario 'frames' must be > 0");
    }
    if scenario.metrics_every == 0 {
        bail!("scenario 'metrics_every' must be > 0");
    }
    if scenario.seeds.expand().is_empty() {
        bail!("scenario 'seeds' must produce at least one seed");
    }
    Ok(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_scenario(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_scenario_with_seed_list() {
        let file = write_temp_scenario(r#"{"name": "quick", "frames": 1000, "seeds": [1, 2, 3]}"#);
        let scenario = load_scenario(file.path()).unwrap();
        assert_eq!(scenario.name, "quick");
        assert_eq!(scenario.frames, 1000);
        assert_eq!(scenario.frame_ms, 50);
        assert_eq!(scenario.metrics_every, 100);
        assert_eq!(scenario.seeds.expand(), vec![1, 2, 3]);
        assert_eq!(scenario.content_dir, "./content");
        assert!(scenario.level.is_none());
        assert!(scenario.overrides.is_empty());
    }

    #[test]
    fn test_load_scenario_with_seed_range() {
        let file =
            write_temp_scenario(r#"{"name": "range", "frames": 500, "seeds": {"range": [1, 5]}}"#);
        let scenario = load_scenario(file.path()).unwrap();
        assert_eq!(scenario.seeds.expand(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_load_scenario_with_level_and_overrides() {
        let file = write_temp_scenario(
            r#"{
            "name": "hard",
            "frames": 100,
            "seeds": [42],
            "level": 3,
            "overrides": {"collector_base_yield": 2, "trader_base_speed": 0.5}
        }"#,
        );
        let scenario = load_scenario(file.path()).unwrap();
        assert_eq!(scenario.level, Some(3));
        assert_eq!(scenario.overrides.len(), 2);
        assert_eq!(scenario.params()["overrides"]["collector_base_yield"], 2);
    }

    #[test]
    fn test_load_scenario_empty_name_fails() {
        let file = write_temp_scenario(r#"{"name": "", "frames": 100, "seeds": [1]}"#);
        let err = load_scenario(file.path()).unwrap_err().to_string();
        assert!(err.contains("name"));
    }

    #[test]
    fn test_load_scenario_zero_frames_fails() {
        let file = write_temp_scenario(r#"{"name": "bad", "frames": 0, "seeds": [1]}"#);
        assert!(load_scenario(file.path()).is_err());
    }

    #[test]
    fn test_load_scenario_empty_range_fails() {
        let file =
            write_temp_scenario(r#"{"name": "bad", "frames": 10, "seeds": {"range": [5, 1]}}"#);
        let err = load_scenario(file.path()).unwrap_err().to_string();
        assert!(err.contains("seeds"));
    }
}
