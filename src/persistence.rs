//! World snapshot save/restore
//!
//! Features:
//! - Versioned JSON envelope
//! - Atomic replace (write tmp, then rename over the save)
//! - Full RNG and id-counter state, so a restored run continues exactly
//!   where the saved one stopped
//!
//! A snapshot holds only dynamic state. Static map data comes from the
//! configuration, so restore targets a game freshly built from the same
//! config.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::sim::{
    Dog, DogId, Game, LostObject, LostObjectId, MapId, PlayerId, Token, TokenGenerator,
};

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub version: u32,
    pub game_time_ms: f64,
    pub rng: Pcg32,
    pub tokens: TokenGenerator,
    pub next_player_id: u64,
    pub maps: Vec<MapSnapshot>,
    pub sessions: Vec<SessionSnapshot>,
    pub players: Vec<PlayerSnapshot>,
}

/// Lost objects on one map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub id: MapId,
    pub next_lost_object_id: LostObjectId,
    pub lost_objects: BTreeMap<LostObjectId, LostObject>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub map_id: MapId,
    pub next_dog_id: DogId,
    pub time_without_loot_ms: f64,
    pub dogs: Vec<Dog>,
}

/// Token and handle binding for one live dog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub token: Token,
    pub map_id: MapId,
    pub dog_id: DogId,
}

impl WorldSnapshot {
    /// Capture the dynamic state of a game
    pub fn capture(game: &Game) -> Self {
        let maps = game
            .maps()
            .iter()
            .map(|map| MapSnapshot {
                id: map.id().clone(),
                next_lost_object_id: map.next_lost_object_id(),
                lost_objects: map.lost_objects().clone(),
            })
            .collect();

        let sessions = game
            .sessions()
            .iter()
            .map(|session| SessionSnapshot {
                map_id: session.map_id().clone(),
                next_dog_id: session.next_dog_id(),
                time_without_loot_ms: session.loot_generator().time_without_loot_ms(),
                dogs: session.dogs().values().cloned().collect(),
            })
            .collect();

        let players = game
            .players()
            .iter()
            .map(|player| PlayerSnapshot {
                id: player.id,
                token: player.token.clone(),
                map_id: player.map_id.clone(),
                dog_id: player.dog_id,
            })
            .collect();

        Self {
            version: SNAPSHOT_VERSION,
            game_time_ms: game.game_time_ms(),
            rng: game.rng().clone(),
            tokens: game.players().generator().clone(),
            next_player_id: game.players().next_id(),
            maps,
            sessions,
            players,
        }
    }

    /// Apply this snapshot to a game built from the matching configuration
    pub fn restore(self, game: &mut Game) -> Result<(), PersistenceError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(PersistenceError::UnsupportedVersion(self.version));
        }

        for map in self.maps {
            for (id, object) in map.lost_objects {
                game.restore_lost_object(&map.id, id, object)?;
            }
            game.restore_lost_object_counter(&map.id, map.next_lost_object_id)?;
        }

        for session in self.sessions {
            for dog in session.dogs {
                game.restore_dog(&session.map_id, dog)?;
            }
            game.restore_session(
                &session.map_id,
                session.next_dog_id,
                session.time_without_loot_ms,
            )?;
        }

        for player in self.players {
            game.bind_token(player.id, player.token, &player.map_id, player.dog_id)?;
        }
        game.restore_player_counter(self.next_player_id);

        game.set_game_time_ms(self.game_time_ms);
        game.set_rng(self.rng);
        game.set_token_generator(self.tokens);
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// Write a snapshot of `game` to `path`
pub fn save(game: &Game, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
    let path = path.as_ref();
    let snapshot = WorldSnapshot::capture(game);
    let json = serde_json::to_string(&snapshot)?;
    let tmp = tmp_path(path);
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    log::info!(
        "Saved world at {:.0} ms to {} ({} players)",
        snapshot.game_time_ms,
        path.display(),
        snapshot.players.len()
    );
    Ok(())
}

/// Read a snapshot from `path`
pub fn load(path: impl AsRef<Path>) -> Result<WorldSnapshot, PersistenceError> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Restore `game` from the snapshot at `path`
pub fn restore_from(game: &mut Game, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
    let path = path.as_ref();
    let snapshot = load(path)?;
    let players = snapshot.players.len();
    snapshot.restore(game)?;
    log::info!("Restored world from {} ({} players)", path.display(), players);
    Ok(())
}
