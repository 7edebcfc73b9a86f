//! Error types
//!
//! Configuration errors are fatal at load time. Everything a caller can
//! trigger at runtime comes back as a `GameError` and never aborts a tick.

use thiserror::Error;

use crate::sim::{DogId, MapId, OfficeId, PlayerId};

/// Static configuration failures; the whole configuration is rejected.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("map with id {0} already exists")]
    DuplicateMap(MapId),
    #[error("office {office} is declared twice on map {map}")]
    DuplicateOffice { map: MapId, office: OfficeId },
    #[error("road on map {0} has neither x1 nor y1")]
    RoadWithoutEnd(MapId),
    #[error("loot generator period must be positive, got {0}")]
    InvalidLootPeriod(f64),
    #[error("loot generator probability must be within [0, 1], got {0}")]
    InvalidLootProbability(f64),
}

/// Runtime lookup and restore failures reported to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    #[error("map {0} not found")]
    MapNotFound(MapId),
    #[error("player not found")]
    PlayerNotFound,
    #[error("token not found")]
    TokenNotFound,
    #[error("token is already bound to a player")]
    DuplicateToken,
    #[error("player {0} is already registered")]
    DuplicatePlayer(PlayerId),
    #[error("player name must not be empty")]
    InvalidName,
    #[error("invalid direction {0:?}")]
    InvalidDirection(String),
    #[error("map {0} has no roads to spawn on")]
    NoRoads(MapId),
    #[error("map {map} has no loot type {loot_type}")]
    UnknownLootType { map: MapId, loot_type: u32 },
    #[error("dog {dog} already exists on map {map}")]
    DuplicateDog { map: MapId, dog: DogId },
}

/// Snapshot save/restore failures.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("snapshot io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
    #[error("snapshot does not fit the loaded world: {0}")]
    Restore(#[from] GameError),
}

/// Failures from a leaderboard backend.
#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("leaderboard storage failed: {0}")]
    Storage(String),
}

/// Failures surfaced by the application facade's tick
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Leaderboard(#[from] LeaderboardError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
