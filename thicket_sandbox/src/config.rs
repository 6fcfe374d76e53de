use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thicket_flock::FlockParams;
use thicket_world::{PlantConfig, StreetConfig, UfoConfig};

/// External command fired at a given tick of the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Trigger {
    Scatter { tick: usize },
    Resize { tick: usize, count: usize },
    Regenerate { tick: usize },
}

impl Trigger {
    pub fn tick(&self) -> usize {
        match *self {
            Trigger::Scatter { tick } | Trigger::Resize { tick, .. } | Trigger::Regenerate { tick } => tick,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub ticks: usize,
    pub dt: f32,
    /// Log a flock summary every this many ticks, 0 to disable
    pub report_every: usize,
    pub triggers: Vec<Trigger>,
    pub output_dir: PathBuf,
    pub export_obj: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: 300,
            dt: 1.0 / 60.0,
            report_every: 60,
            triggers: vec![
                Trigger::Scatter { tick: 100 },
                Trigger::Resize { tick: 150, count: 40 },
                Trigger::Regenerate { tick: 200 },
            ],
            output_dir: PathBuf::from("out"),
            export_obj: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub run: RunConfig,
    pub flock: FlockParams,
    pub plants: PlantConfig,
    pub streets: StreetConfig,
    pub ufos: UfoConfig,
}

impl SandboxConfig {
    /// Read a JSON config; missing fields keep their defaults
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let text = fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn triggers_at(&self, tick: usize) -> impl Iterator<Item = &Trigger> {
        self.run.triggers.iter().filter(move |t| t.tick() == tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json() {
        let json = r#"{
            "run": { "ticks": 10, "triggers": [ { "action": "resize", "tick": 3, "count": 5 } ] },
            "flock": { "agent_count": 8 },
            "streets": { "grid_size": 4 }
        }"#;
        let config: SandboxConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.run.ticks, 10);
        assert_eq!(config.run.dt, 1.0 / 60.0);
        assert_eq!(config.flock.agent_count, 8);
        assert_eq!(config.streets.grid_size, 4);
        assert_eq!(config.ufos, UfoConfig::default());
        assert_eq!(
            config.triggers_at(3).collect::<Vec<_>>(),
            vec![&Trigger::Resize { tick: 3, count: 5 }]
        );
        assert_eq!(config.triggers_at(4).count(), 0);
    }

    #[test]
    fn test_round_trip() {
        let config = SandboxConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: SandboxConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
