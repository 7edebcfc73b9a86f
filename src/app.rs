//! Application facade
//!
//! The operations a transport layer calls: map queries, join, steering,
//! ticking, token lookup and the leaderboard. Owns the game, the record
//! store and the autosave schedule. Callers must serialize access; nothing
//! here locks.

use std::collections::BTreeMap;
use std::io::ErrorKind;

use glam::DVec2;
use serde::Serialize;

use crate::config::GameSettings;
use crate::error::{AppError, GameError, LeaderboardError, PersistenceError};
use crate::leaderboard::{InMemoryRecords, RecordStore, RetiredRecord};
use crate::persistence;
use crate::sim::{
    Action, Direction, DogId, Game, LostObject, LostObjectId, Map, MapId, Player, Token,
};

/// Entry in the map listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapSummary {
    pub id: MapId,
    pub name: String,
}

/// Credentials handed to a joining player
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResult {
    pub auth_token: Token,
    /// The dog's id in its session, as keyed by `world_view` and
    /// `session_players`
    pub player_id: DogId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BagItem {
    pub id: LostObjectId,
    #[serde(rename = "type")]
    pub loot_type: u32,
}

/// What other clients see of a dog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DogView {
    #[serde(rename = "pos")]
    pub position: DVec2,
    #[serde(rename = "speed")]
    pub velocity: DVec2,
    #[serde(rename = "dir")]
    pub direction: char,
    pub bag: Vec<BagItem>,
    pub score: u64,
}

/// Read-only view of one session and its map's lost objects
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldView {
    pub players: BTreeMap<DogId, DogView>,
    pub lost_objects: BTreeMap<LostObjectId, LostObject>,
}

/// Game plus its collaborators
pub struct Application<S: RecordStore = InMemoryRecords> {
    game: Game,
    settings: GameSettings,
    records: S,
    since_save_ms: f64,
}

impl Application<InMemoryRecords> {
    pub fn new(game: Game, settings: GameSettings) -> Self {
        Self::with_records(game, settings, InMemoryRecords::new())
    }
}

impl<S: RecordStore> Application<S> {
    pub fn with_records(game: Game, settings: GameSettings, records: S) -> Self {
        Self {
            game,
            settings,
            records,
            since_save_ms: 0.0,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn records(&self) -> &S {
        &self.records
    }

    // === Maps ===

    pub fn list_maps(&self) -> Vec<MapSummary> {
        self.game
            .maps()
            .iter()
            .map(|map| MapSummary {
                id: map.id().clone(),
                name: map.name().to_string(),
            })
            .collect()
    }

    pub fn find_map(&self, id: &MapId) -> Result<&Map, GameError> {
        self.game
            .find_map(id)
            .ok_or_else(|| GameError::MapNotFound(id.clone()))
    }

    // === Players ===

    /// Spawn a dog for `username` on `map_id`
    pub fn join(&mut self, username: &str, map_id: &MapId) -> Result<JoinResult, GameError> {
        if username.is_empty() {
            return Err(GameError::InvalidName);
        }
        let (spawn, road) = self
            .game
            .spawn_point(map_id, self.settings.randomize_spawn_points)?;
        let (player_id, token) = self.game.join(username, map_id, spawn, Some(road))?;
        let player = self
            .game
            .players()
            .get(player_id)
            .ok_or(GameError::PlayerNotFound)?;
        Ok(JoinResult {
            auth_token: token,
            player_id: player.dog_id,
        })
    }

    pub fn find_player(&self, token: &Token) -> Result<&Player, GameError> {
        self.game
            .find_player_by_token(token)
            .ok_or(GameError::TokenNotFound)
    }

    /// Steer the caller's dog. An unrecognized code leaves the dog as it is.
    pub fn set_action(&mut self, token: &Token, code: &str) -> Result<(), GameError> {
        let player_id = self.find_player(token)?.id;
        match Action::parse(code) {
            Ok(action) => self.game.set_player_action(player_id, action),
            Err(err) => {
                log::warn!("Ignoring action for player {}: {}", player_id, err);
                Ok(())
            }
        }
    }

    /// Id -> name of every dog in the caller's session
    pub fn session_players(&self, token: &Token) -> Result<BTreeMap<DogId, String>, GameError> {
        let player = self.find_player(token)?;
        let session = self
            .game
            .session(&player.map_id)
            .ok_or(GameError::PlayerNotFound)?;
        Ok(session.dog_names())
    }

    pub fn world_view(&self, token: &Token) -> Result<WorldView, GameError> {
        let player = self.find_player(token)?;
        let session = self
            .game
            .session(&player.map_id)
            .ok_or(GameError::PlayerNotFound)?;
        let map = self.find_map(&player.map_id)?;

        let players = session
            .dogs()
            .iter()
            .map(|(id, dog)| {
                let view = DogView {
                    position: dog.position(),
                    velocity: dog.velocity(),
                    direction: dog.direction().code(),
                    bag: dog
                        .bag()
                        .iter()
                        .map(|(id, loot_type)| BagItem {
                            id: *id,
                            loot_type: *loot_type,
                        })
                        .collect(),
                    score: dog.score(),
                };
                (*id, view)
            })
            .collect();

        Ok(WorldView {
            players,
            lost_objects: map.lost_objects().clone(),
        })
    }

    // === Time ===

    /// Advance the world, hand retired players to the leaderboard and
    /// autosave when due
    pub fn tick(&mut self, delta_ms: f64) -> Result<Vec<RetiredRecord>, AppError> {
        self.game.tick(delta_ms);

        let retired: Vec<RetiredRecord> = self
            .game
            .retire_players()
            .into_iter()
            .map(RetiredRecord::from)
            .collect();
        for record in &retired {
            self.records.save(record.clone())?;
        }

        if let Some(period) = self.settings.effective_save_period_ms() {
            self.since_save_ms += delta_ms;
            if self.since_save_ms >= period as f64 {
                self.save_state()?;
            }
        }
        Ok(retired)
    }

    pub fn leaderboard(&self, offset: usize, count: usize) -> Result<Vec<RetiredRecord>, LeaderboardError> {
        self.records.query(offset, count)
    }

    // === Persistence ===

    /// Write a snapshot to the configured state file, if any
    pub fn save_state(&mut self) -> Result<(), PersistenceError> {
        if let Some(path) = &self.settings.state_file {
            persistence::save(&self.game, path)?;
            self.since_save_ms = 0.0;
        }
        Ok(())
    }

    /// Restore from the configured state file if it exists and is non-empty.
    /// Returns whether anything was restored. A state file that exists but
    /// cannot be inspected is an error, not a fresh start.
    pub fn restore_state(&mut self) -> Result<bool, PersistenceError> {
        let Some(path) = &self.settings.state_file else {
            return Ok(false);
        };
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > 0 => {
                persistence::restore_from(&mut self.game, path)?;
                Ok(true)
            }
            Ok(_) => Ok(false),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

/// Parse a direction code the way `set_action` does, for callers that
/// want to reject bad input themselves
pub fn parse_direction(code: &str) -> Result<Option<Direction>, GameError> {
    match Action::parse(code)? {
        Action::Stop => Ok(None),
        Action::Move(direction) => Ok(Some(direction)),
    }
}
