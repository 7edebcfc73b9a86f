//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through `Game::tick`
//! - Seeded RNG only
//! - Stable iteration order (by map, dog and lost-object ID)
//! - No file, network or clock access

pub mod collision;
pub mod dog;
pub mod geometry;
pub mod loot;
pub mod map;
pub mod players;
pub mod session;
pub mod state;
pub mod tick;

pub use collision::{CollectionResult, office_crossings, office_precedes, try_collect_point};
pub use dog::{Action, Direction, Dog, DogId};
pub use geometry::{Building, Office, OfficeId, Road};
pub use loot::{LootGenerator, LootGeneratorConfig};
pub use map::{LootType, LostObject, LostObjectId, Map, MapId};
pub use players::{Player, PlayerId, PlayerRegistry, TOKEN_LEN, Token, TokenGenerator};
pub use session::GameSession;
pub use state::{Game, RetiredPlayer};
