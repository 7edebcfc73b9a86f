//! Players and bearer tokens

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use super::dog::DogId;
use super::map::MapId;
use crate::error::GameError;

/// Length of a token in hex characters
pub const TOKEN_LEN: usize = 32;

/// Bearer credential identifying a player
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Accept a string as a token if it is 32 hex characters
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.len() == TOKEN_LEN && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(Self(raw.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Two independent 64-bit streams, one per token half
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenGenerator {
    high: Pcg64,
    low: Pcg64,
}

impl TokenGenerator {
    pub fn from_entropy() -> Self {
        Self {
            high: Pcg64::from_os_rng(),
            low: Pcg64::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            high: Pcg64::seed_from_u64(seed),
            low: Pcg64::seed_from_u64(seed.rotate_left(32) ^ 0x9e37_79b9_7f4a_7c15),
        }
    }

    /// Uniqueness is probabilistic; existing tokens are not checked
    pub fn generate(&mut self) -> Token {
        Token(format!(
            "{:016x}{:016x}",
            self.high.next_u64(),
            self.low.next_u64()
        ))
    }
}

/// Player handle, stable across save and restore
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A player: one live dog in one session
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub token: Token,
    pub map_id: MapId,
    pub dog_id: DogId,
}

/// Token -> player and player -> (session, dog) mapping
#[derive(Debug, Clone)]
pub struct PlayerRegistry {
    players: BTreeMap<PlayerId, Player>,
    tokens: HashMap<Token, PlayerId>,
    next_id: u64,
    generator: TokenGenerator,
}

impl PlayerRegistry {
    pub fn new(generator: TokenGenerator) -> Self {
        Self {
            players: BTreeMap::new(),
            tokens: HashMap::new(),
            next_id: 0,
            generator,
        }
    }

    /// Register a player for a freshly spawned dog and issue its token
    pub fn add(&mut self, map_id: MapId, dog_id: DogId) -> (PlayerId, Token) {
        let token = self.generator.generate();
        let id = PlayerId(self.next_id);
        self.next_id += 1;
        self.insert(id, token.clone(), map_id, dog_id);
        (id, token)
    }

    /// Bind a known token to a dog under its original handle (restore path).
    /// The id counter moves past `id`.
    pub fn bind(
        &mut self,
        id: PlayerId,
        token: Token,
        map_id: MapId,
        dog_id: DogId,
    ) -> Result<(), GameError> {
        if self.tokens.contains_key(&token) {
            return Err(GameError::DuplicateToken);
        }
        if self.players.contains_key(&id) {
            return Err(GameError::DuplicatePlayer(id));
        }
        self.insert(id, token, map_id, dog_id);
        self.next_id = self.next_id.max(id.0 + 1);
        Ok(())
    }

    fn insert(&mut self, id: PlayerId, token: Token, map_id: MapId, dog_id: DogId) {
        self.tokens.insert(token.clone(), id);
        self.players.insert(
            id,
            Player {
                id,
                token,
                map_id,
                dog_id,
            },
        );
    }

    pub fn find_by_token(&self, token: &Token) -> Option<&Player> {
        self.tokens.get(token).and_then(|id| self.players.get(id))
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Drop a player and erase its token
    pub fn remove(&mut self, id: PlayerId) -> Option<Player> {
        let player = self.players.remove(&id)?;
        self.tokens.remove(&player.token);
        Some(player)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Handle the next added player will get
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Restore the handle counter; never drops below a bound handle
    pub fn set_next_id(&mut self, next: u64) {
        let floor = self.players.keys().next_back().map_or(0, |id| id.0 + 1);
        self.next_id = next.max(floor);
    }

    pub fn generator(&self) -> &TokenGenerator {
        &self.generator
    }

    pub fn set_generator(&mut self, generator: TokenGenerator) {
        self.generator = generator;
    }
}
