//! Scenario definitions: level layout, enemies and a scripted timeline.
//!
//! Scenarios are JSON files. A built-in `hallway` scenario is available
//! for demos and tests.

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use casa_core::commands::SimCommand;
use casa_core::config::EnemyConfig;
use casa_core::constants::TICK_RATE;
use casa_core::enums::Traversal;

use crate::error::ScenarioError;
use crate::floorplan::{Floorplan, Obstacle};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub floorplan: Floorplan,
    /// Shared enemy tuning; individual enemies may override it.
    #[serde(default)]
    pub config: EnemyConfig,
    pub enemies: Vec<EnemySpec>,
    /// Commands injected at given ticks.
    #[serde(default)]
    pub script: Vec<ScriptedCommand>,
    /// Suggested run length.
    #[serde(default = "default_ticks")]
    pub ticks: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemySpec {
    pub position: Vec3,
    #[serde(default = "default_forward")]
    pub forward: Vec3,
    #[serde(default)]
    pub route: RouteSpec,
    #[serde(default)]
    pub config: Option<EnemyConfig>,
}

/// Where an enemy's patrol points come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum RouteSpec {
    Fixed {
        points: Vec<Vec3>,
    },
    Circular {
        center: Vec3,
        count: usize,
        radius: f32,
    },
    Random {
        center: Vec3,
        count: usize,
        radius: f32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedCommand {
    pub tick: u64,
    pub command: SimCommand,
}

impl Default for RouteSpec {
    fn default() -> Self {
        RouteSpec::Fixed { points: Vec::new() }
    }
}

fn default_ticks() -> u64 {
    30 * TICK_RATE as u64
}

fn default_forward() -> Vec3 {
    Vec3::Z
}

impl Scenario {
    /// Parse and validate a scenario.
    pub fn from_json_str(json: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let json = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> Result<String, ScenarioError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        self.config.validate()?;

        let plan = &self.floorplan;
        if plan.min.x >= plan.max.x || plan.min.z >= plan.max.z {
            return Err(ScenarioError::Invalid(
                "floorplan bounds are empty".to_string(),
            ));
        }
        for (i, obstacle) in plan.obstacles.iter().enumerate() {
            if obstacle.min.cmpgt(obstacle.max).any() {
                return Err(ScenarioError::Invalid(format!(
                    "obstacle {i} has min greater than max"
                )));
            }
        }

        for (i, enemy) in self.enemies.iter().enumerate() {
            if let Some(config) = &enemy.config {
                config.validate()?;
            }
            if !plan.is_walkable(enemy.position) {
                return Err(ScenarioError::Invalid(format!(
                    "enemy {i} spawns outside walkable space at {:?}",
                    enemy.position
                )));
            }
        }
        Ok(())
    }

    /// A corridor with a pillar, two enemies and a short scripted encounter.
    pub fn hallway() -> Self {
        let floorplan = Floorplan {
            min: Vec3::new(-20.0, 0.0, -4.0),
            max: Vec3::new(20.0, 0.0, 4.0),
            obstacles: vec![Obstacle::new(
                Vec3::new(-2.0, 0.0, -1.0),
                Vec3::new(2.0, 3.0, 1.0),
            )],
        };

        let mut config = EnemyConfig::default();
        config.patrol.traversal = Traversal::PingPong;

        let at = |seconds: u64| seconds * TICK_RATE as u64;
        let script = vec![
            ScriptedCommand {
                tick: at(1),
                command: SimCommand::PlacePlayer {
                    position: Vec3::new(0.0, 0.0, -3.0),
                    forward: -Vec3::X,
                },
            },
            ScriptedCommand {
                tick: at(5),
                command: SimCommand::EmitSound {
                    position: Vec3::new(6.0, 0.0, -2.0),
                    loud: true,
                },
            },
            ScriptedCommand {
                tick: at(10),
                command: SimCommand::PlacePlayer {
                    position: Vec3::new(-6.0, 0.0, 2.0),
                    forward: Vec3::X,
                },
            },
            ScriptedCommand {
                tick: at(15),
                command: SimCommand::StunEnemy { enemy_id: 0 },
            },
            ScriptedCommand {
                tick: at(20),
                command: SimCommand::RemovePlayer,
            },
        ];

        Scenario {
            name: "hallway".to_string(),
            floorplan,
            config,
            enemies: vec![
                EnemySpec {
                    position: Vec3::new(-15.0, 0.0, 2.0),
                    forward: Vec3::X,
                    route: RouteSpec::Fixed {
                        points: vec![Vec3::new(-15.0, 0.0, 2.5), Vec3::new(15.0, 0.0, 2.5)],
                    },
                    config: None,
                },
                EnemySpec {
                    position: Vec3::new(13.0, 0.0, 0.0),
                    forward: -Vec3::X,
                    route: RouteSpec::Circular {
                        center: Vec3::new(10.0, 0.0, 0.0),
                        count: 4,
                        radius: 3.0,
                    },
                    config: None,
                },
            ],
            script,
            ticks: at(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casa_core::error::ConfigError;

    #[test]
    fn test_hallway_is_valid() {
        Scenario::hallway().validate().unwrap();
    }

    #[test]
    fn test_hallway_survives_json() {
        let json = Scenario::hallway().to_json().unwrap();
        let back = Scenario::from_json_str(&json).unwrap();
        assert_eq!(back.name, "hallway");
        assert_eq!(back.enemies.len(), 2);
        assert_eq!(back.script.len(), 5);
        assert_eq!(back.floorplan, Scenario::hallway().floorplan);
    }

    #[test]
    fn test_minimal_json_uses_defaults() {
        let json = r#"{
            "name": "tiny",
            "enemies": [
                { "position": [0.0, 0.0, 0.0],
                  "route": { "kind": "Circular", "center": [0.0, 0.0, 0.0], "count": 3, "radius": 4.0 } }
            ],
            "script": [
                { "tick": 10, "command": { "type": "EmitSound", "position": [1.0, 0.0, 1.0], "loud": false } }
            ]
        }"#;
        let scenario = Scenario::from_json_str(json).unwrap();
        assert_eq!(scenario.enemies[0].forward, Vec3::Z);
        assert_eq!(scenario.ticks, 30 * TICK_RATE as u64);
        assert_eq!(scenario.script.len(), 1);
        assert_eq!(scenario.script[0].tick, 10);
        assert!(matches!(
            scenario.script[0].command,
            SimCommand::EmitSound { loud: false, .. }
        ));
    }

    #[test]
    fn test_enemy_inside_obstacle_is_rejected() {
        let mut scenario = Scenario::hallway();
        scenario.enemies[0].position = Vec3::ZERO;
        assert!(matches!(scenario.validate(), Err(ScenarioError::Invalid(_))));
    }

    #[test]
    fn test_bad_enemy_config_is_rejected() {
        let mut scenario = Scenario::hallway();
        let mut config = EnemyConfig::default();
        config.search.point_count = 0;
        scenario.enemies[1].config = Some(config);
        assert!(matches!(
            scenario.validate(),
            Err(ScenarioError::Config(ConfigError::Invalid { .. }))
        ));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = Scenario::load(Path::new("/nonexistent/casa.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/casa.json"));
    }
}
