//! Game configuration
//!
//! The world is described by a single JSON document: global defaults, the
//! loot spawn policy, and the map catalog. Any error rejects the whole file.

use std::fs;
use std::path::{Path, PathBuf};

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_BAG_CAPACITY, DEFAULT_DOG_SPEED, DEFAULT_RETIREMENT_SECS};
use crate::error::ConfigError;
use crate::sim::{Building, Game, LootGeneratorConfig, Map, MapId, Office, OfficeId, Road};

fn default_dog_speed() -> f64 {
    DEFAULT_DOG_SPEED
}

fn default_bag_capacity() -> usize {
    DEFAULT_BAG_CAPACITY
}

fn default_retirement() -> f64 {
    DEFAULT_RETIREMENT_SECS
}

/// Top-level configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    #[serde(default = "default_dog_speed")]
    pub default_dog_speed: f64,
    #[serde(default = "default_bag_capacity")]
    pub default_bag_capacity: usize,
    /// Seconds of idling before a dog retires
    #[serde(default = "default_retirement")]
    pub dog_retirement_time: f64,
    pub loot_generator_config: LootConfig,
    pub maps: Vec<MapConfig>,
}

/// Spawn policy as written in the config (period in seconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LootConfig {
    pub period: f64,
    pub probability: f64,
    #[serde(default)]
    pub jitter: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConfig {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dog_speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bag_capacity: Option<usize>,
    #[serde(default)]
    pub loot_types: Vec<LootTypeConfig>,
    #[serde(default)]
    pub roads: Vec<RoadConfig>,
    #[serde(default)]
    pub buildings: Vec<BuildingConfig>,
    #[serde(default)]
    pub offices: Vec<OfficeConfig>,
}

/// A loot type; presentation fields are kept for clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootTypeConfig {
    pub name: String,
    #[serde(default)]
    pub value: u64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A road: `x1` makes it horizontal, `y1` vertical
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadConfig {
    pub x0: i32,
    pub y0: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x1: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y1: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingConfig {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeConfig {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl GameConfig {
    /// Parse a configuration document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let loot = &self.loot_generator_config;
        if !(loot.period > 0.0) {
            return Err(ConfigError::InvalidLootPeriod(loot.period));
        }
        if !(0.0..=1.0).contains(&loot.probability) {
            return Err(ConfigError::InvalidLootProbability(loot.probability));
        }
        Ok(())
    }

    /// Spawn policy with the period converted to milliseconds
    pub fn loot_generator(&self) -> LootGeneratorConfig {
        LootGeneratorConfig {
            period_ms: self.loot_generator_config.period * 1000.0,
            probability: self.loot_generator_config.probability,
            jitter: self.loot_generator_config.jitter,
        }
    }

    /// Build a game from this configuration. `None` seeds from the OS.
    pub fn build_game(&self, seed: Option<u64>) -> Result<Game, ConfigError> {
        self.validate()?;
        let mut game = match seed {
            Some(seed) => Game::new(seed),
            None => Game::from_entropy(),
        };
        game.set_loot_generator(self.loot_generator());
        game.set_retirement_time_ms(self.dog_retirement_time * 1000.0);
        for map in &self.maps {
            game.add_map(map.build(self)?)?;
        }
        Ok(game)
    }
}

impl MapConfig {
    fn build(&self, defaults: &GameConfig) -> Result<Map, ConfigError> {
        let id = MapId::new(self.id.clone());
        let mut map = Map::new(
            id.clone(),
            self.name.clone(),
            self.dog_speed.unwrap_or(defaults.default_dog_speed),
            self.bag_capacity.unwrap_or(defaults.default_bag_capacity),
        );

        for loot in &self.loot_types {
            map.add_loot_type(loot.name.clone(), loot.value, loot.extra.clone());
        }

        for road in &self.roads {
            let start = IVec2::new(road.x0, road.y0);
            if road.x1.is_none() && road.y1.is_none() {
                return Err(ConfigError::RoadWithoutEnd(id));
            }
            // An entry carrying both ends declares two roads
            if let Some(x1) = road.x1 {
                map.add_road(Road::horizontal(start, x1));
            }
            if let Some(y1) = road.y1 {
                map.add_road(Road::vertical(start, y1));
            }
        }

        for b in &self.buildings {
            map.add_building(Building::new(IVec2::new(b.x, b.y), IVec2::new(b.w, b.h)));
        }

        for office in &self.offices {
            map.add_office(Office::new(
                OfficeId(office.id.clone()),
                IVec2::new(office.x, office.y),
                IVec2::new(office.offset_x, office.offset_y),
            ))?;
        }

        Ok(map)
    }
}

/// Read a configuration file and build the game it describes
pub fn load_game(path: impl AsRef<Path>, seed: Option<u64>) -> Result<Game, ConfigError> {
    let path = path.as_ref();
    let config = GameConfig::from_file(path)?;
    log::info!("Loaded config from {} ({} maps)", path.display(), config.maps.len());
    config.build_game(seed)
}

/// Runtime options for a host process
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameSettings {
    /// Drive the clock internally at this period; `None` means ticks are
    /// requested externally
    pub tick_period_ms: Option<u64>,
    /// Spawn dogs at a random road point instead of the first road's start
    pub randomize_spawn_points: bool,
    /// Where world snapshots are written and restored from
    pub state_file: Option<PathBuf>,
    /// Autosave interval in simulated milliseconds
    pub save_state_period_ms: Option<u64>,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
}

impl GameSettings {
    /// Autosave interval: the explicit period, else the tick period.
    /// Without a state file there is nothing to save to.
    pub fn effective_save_period_ms(&self) -> Option<u64> {
        self.state_file.as_ref()?;
        self.save_state_period_ms.or(self.tick_period_ms)
    }
}
