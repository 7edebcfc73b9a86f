//! Game orchestrator state
//!
//! `Game` exclusively owns the map catalog, the sessions and the player
//! registry. Read access goes through `&self` views; every mutation goes
//! through a `&mut self` method, so a caller never holds a read view it
//! could mutate through.

use std::collections::HashMap;

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::dog::{Action, Dog, DogId};
use super::loot::LootGeneratorConfig;
use super::map::{LostObject, LostObjectId, Map, MapId};
use super::players::{Player, PlayerId, PlayerRegistry, Token, TokenGenerator};
use super::session::GameSession;
use crate::consts::DEFAULT_RETIREMENT_SECS;
use crate::error::{ConfigError, GameError};

/// Summary of a retired player, handed to the leaderboard
#[derive(Debug, Clone, PartialEq)]
pub struct RetiredPlayer {
    pub name: String,
    pub score: u64,
    pub play_time_ms: f64,
}

/// Top-level owner of the simulated world
#[derive(Debug, Clone)]
pub struct Game {
    pub(super) maps: Vec<Map>,
    pub(super) map_index: HashMap<MapId, usize>,
    pub(super) sessions: Vec<GameSession>,
    pub(super) session_index: HashMap<MapId, usize>,
    pub(super) players: PlayerRegistry,
    pub(super) loot_config: LootGeneratorConfig,
    pub(super) retirement_ms: f64,
    pub(super) game_time_ms: f64,
    /// Drives loot placement and random spawn points
    pub(super) rng: Pcg32,
}

impl Game {
    /// Create an empty game with reproducible randomness
    pub fn new(seed: u64) -> Self {
        Self::with_rngs(Pcg32::seed_from_u64(seed), TokenGenerator::seeded(seed))
    }

    /// Create an empty game seeded from the OS
    pub fn from_entropy() -> Self {
        Self::with_rngs(Pcg32::from_os_rng(), TokenGenerator::from_entropy())
    }

    fn with_rngs(rng: Pcg32, tokens: TokenGenerator) -> Self {
        Self {
            maps: Vec::new(),
            map_index: HashMap::new(),
            sessions: Vec::new(),
            session_index: HashMap::new(),
            players: PlayerRegistry::new(tokens),
            loot_config: LootGeneratorConfig::default(),
            retirement_ms: DEFAULT_RETIREMENT_SECS * 1000.0,
            game_time_ms: 0.0,
            rng,
        }
    }

    // === Configuration ===

    /// Add a map to the catalog; ids must be unique
    pub fn add_map(&mut self, map: Map) -> Result<(), ConfigError> {
        if self.map_index.contains_key(map.id()) {
            return Err(ConfigError::DuplicateMap(map.id().clone()));
        }
        log::info!(
            "Map {} loaded: {} roads, {} offices, {} loot types",
            map.id(),
            map.roads().len(),
            map.offices().len(),
            map.loot_types().len()
        );
        self.map_index.insert(map.id().clone(), self.maps.len());
        self.maps.push(map);
        Ok(())
    }

    pub fn set_loot_generator(&mut self, config: LootGeneratorConfig) {
        self.loot_config = config;
    }

    pub fn loot_config(&self) -> &LootGeneratorConfig {
        &self.loot_config
    }

    pub fn set_retirement_time_ms(&mut self, ms: f64) {
        self.retirement_ms = ms;
    }

    pub fn retirement_time_ms(&self) -> f64 {
        self.retirement_ms
    }

    // === Read views ===

    pub fn maps(&self) -> &[Map] {
        &self.maps
    }

    pub fn find_map(&self, id: &MapId) -> Option<&Map> {
        self.map_index.get(id).map(|&index| &self.maps[index])
    }

    pub fn sessions(&self) -> &[GameSession] {
        &self.sessions
    }

    pub fn session(&self, map_id: &MapId) -> Option<&GameSession> {
        self.session_index
            .get(map_id)
            .map(|&index| &self.sessions[index])
    }

    pub fn players(&self) -> &PlayerRegistry {
        &self.players
    }

    pub fn find_player_by_token(&self, token: &Token) -> Option<&Player> {
        self.players.find_by_token(token)
    }

    /// The dog a player controls
    pub fn player_dog(&self, player: &Player) -> Option<&Dog> {
        self.session(&player.map_id)?.dog(player.dog_id)
    }

    /// Milliseconds simulated so far
    pub fn game_time_ms(&self) -> f64 {
        self.game_time_ms
    }

    pub fn rng(&self) -> &Pcg32 {
        &self.rng
    }

    // === Player lifecycle ===

    fn ensure_session(&mut self, map_id: &MapId) -> Result<usize, GameError> {
        if let Some(&index) = self.session_index.get(map_id) {
            return Ok(index);
        }
        let map_index = *self
            .map_index
            .get(map_id)
            .ok_or_else(|| GameError::MapNotFound(map_id.clone()))?;
        let index = self.sessions.len();
        self.sessions
            .push(GameSession::new(map_id.clone(), map_index, self.loot_config));
        self.session_index.insert(map_id.clone(), index);
        log::info!("Session opened on map {}", map_id);
        Ok(index)
    }

    /// Pick a spawn point: the start of the first road, or a uniformly
    /// random point on a uniformly random road
    pub fn spawn_point(&mut self, map_id: &MapId, randomize: bool) -> Result<(DVec2, usize), GameError> {
        let index = *self
            .map_index
            .get(map_id)
            .ok_or_else(|| GameError::MapNotFound(map_id.clone()))?;
        let roads = self.maps[index].roads();
        if roads.is_empty() {
            return Err(GameError::NoRoads(map_id.clone()));
        }
        if !randomize {
            return Ok((roads[0].start().as_dvec2(), 0));
        }
        let road_index = self.rng.random_range(0..roads.len());
        let (min, max) = roads[road_index].bounds();
        let position = DVec2::new(
            self.rng.random_range(min.x..=max.x),
            self.rng.random_range(min.y..=max.y),
        );
        Ok((position, road_index))
    }

    /// Create a dog at `spawn` on `road`, register its player and issue a token
    pub fn join(
        &mut self,
        username: &str,
        map_id: &MapId,
        spawn: DVec2,
        road: Option<usize>,
    ) -> Result<(PlayerId, Token), GameError> {
        if username.is_empty() {
            return Err(GameError::InvalidName);
        }
        let session_index = self.ensure_session(map_id)?;
        let dog_id = self.sessions[session_index].spawn_dog(username, spawn, road);
        let (player_id, token) = self.players.add(map_id.clone(), dog_id);
        log::info!(
            "Player {} joined map {} as dog {} at ({:.2}, {:.2})",
            username,
            map_id,
            dog_id,
            spawn.x,
            spawn.y
        );
        Ok((player_id, token))
    }

    /// Steer a player's dog at its map's speed
    pub fn set_player_action(&mut self, player_id: PlayerId, action: Action) -> Result<(), GameError> {
        let player = self.players.get(player_id).ok_or(GameError::PlayerNotFound)?;
        let map = self
            .find_map(&player.map_id)
            .ok_or_else(|| GameError::MapNotFound(player.map_id.clone()))?;
        let speed = map.dog_speed();
        let dog_id = player.dog_id;
        let session_index = *self
            .session_index
            .get(&player.map_id)
            .ok_or(GameError::PlayerNotFound)?;
        let dog = self.sessions[session_index]
            .dog_mut(dog_id)
            .ok_or(GameError::PlayerNotFound)?;
        dog.apply_action(action, speed);
        Ok(())
    }

    /// Remove every player whose dog is flagged for retirement
    pub fn retire_players(&mut self) -> Vec<RetiredPlayer> {
        let retiring: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|player| self.player_dog(player).is_some_and(Dog::is_retired))
            .map(|player| player.id)
            .collect();

        let mut retired = Vec::with_capacity(retiring.len());
        for player_id in retiring {
            let Some(player) = self.players.remove(player_id) else {
                continue;
            };
            let Some(&session_index) = self.session_index.get(&player.map_id) else {
                continue;
            };
            if let Some(dog) = self.sessions[session_index].remove_dog(player.dog_id) {
                log::info!(
                    "Player {} retired from map {} with score {} after {:.0} ms",
                    dog.name(),
                    player.map_id,
                    dog.score(),
                    dog.play_time_ms()
                );
                retired.push(RetiredPlayer {
                    name: dog.name().to_string(),
                    score: dog.score(),
                    play_time_ms: dog.play_time_ms(),
                });
            }
        }
        retired
    }

    // === Restore write access ===

    /// Re-insert a dog with its full state into the map's session
    pub fn restore_dog(&mut self, map_id: &MapId, dog: Dog) -> Result<(), GameError> {
        let session_index = self.ensure_session(map_id)?;
        let dog_id = dog.id();
        if !self.sessions[session_index].insert_dog(dog) {
            return Err(GameError::DuplicateDog {
                map: map_id.clone(),
                dog: dog_id,
            });
        }
        Ok(())
    }

    /// Bind an existing token and player handle to a restored dog
    pub fn bind_token(
        &mut self,
        player_id: PlayerId,
        token: Token,
        map_id: &MapId,
        dog_id: DogId,
    ) -> Result<(), GameError> {
        if self.session(map_id).and_then(|s| s.dog(dog_id)).is_none() {
            return Err(GameError::PlayerNotFound);
        }
        self.players.bind(player_id, token, map_id.clone(), dog_id)
    }

    /// Restore the player handle counter
    pub fn restore_player_counter(&mut self, next: u64) {
        self.players.set_next_id(next);
    }

    /// Put a lost object back under its original id
    pub fn restore_lost_object(
        &mut self,
        map_id: &MapId,
        id: LostObjectId,
        object: LostObject,
    ) -> Result<(), GameError> {
        let index = *self
            .map_index
            .get(map_id)
            .ok_or_else(|| GameError::MapNotFound(map_id.clone()))?;
        let map = &mut self.maps[index];
        if map.loot_type(object.loot_type).is_none() {
            return Err(GameError::UnknownLootType {
                map: map_id.clone(),
                loot_type: object.loot_type,
            });
        }
        map.insert_lost_object(id, object);
        Ok(())
    }

    /// Restore a map's lost-object id counter
    pub fn restore_lost_object_counter(&mut self, map_id: &MapId, next: LostObjectId) -> Result<(), GameError> {
        let index = *self
            .map_index
            .get(map_id)
            .ok_or_else(|| GameError::MapNotFound(map_id.clone()))?;
        self.maps[index].set_next_lost_object_id(next);
        Ok(())
    }

    /// Restore a session's id counter and spawn-policy timer
    pub fn restore_session(
        &mut self,
        map_id: &MapId,
        next_dog_id: DogId,
        time_without_loot_ms: f64,
    ) -> Result<(), GameError> {
        let index = self.ensure_session(map_id)?;
        let session = &mut self.sessions[index];
        session.set_next_dog_id(next_dog_id);
        session
            .loot_generator_mut()
            .set_time_without_loot_ms(time_without_loot_ms);
        Ok(())
    }

    pub fn set_game_time_ms(&mut self, ms: f64) {
        self.game_time_ms = ms;
    }

    pub fn set_rng(&mut self, rng: Pcg32) {
        self.rng = rng;
    }

    pub fn set_token_generator(&mut self, generator: TokenGenerator) {
        self.players.set_generator(generator);
    }
}
