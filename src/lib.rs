//! Dog Courier - authoritative simulation core for a road-network loot game
//!
//! Core modules:
//! - `sim`: Tick-driven simulation (road geometry, movement, collisions, sessions)
//! - `config`: JSON game configuration
//! - `leaderboard`: Retired player records
//! - `persistence`: Save/restore of world state
//! - `app`: Inbound operations used by the transport layer

pub mod app;
pub mod config;
pub mod error;
pub mod leaderboard;
pub mod persistence;
pub mod sim;

pub use app::Application;
pub use config::{GameConfig, GameSettings};
pub use error::{AppError, ConfigError, GameError, LeaderboardError, PersistenceError};
pub use leaderboard::{InMemoryRecords, RecordStore, RetiredRecord};

/// Game configuration constants
pub mod consts {
    /// Half of a road's width; roads extend this far on both sides of the centerline
    pub const HALF_ROAD_WIDTH: f64 = 0.4;

    /// Dog footprint width
    pub const DOG_WIDTH: f64 = 0.6;
    /// Office footprint width
    pub const OFFICE_WIDTH: f64 = 0.5;

    /// Pickup radius for lost objects
    pub const LOOT_COLLECT_RADIUS: f64 = DOG_WIDTH / 2.0;
    /// Deposit radius for offices
    pub const OFFICE_COLLECT_RADIUS: f64 = OFFICE_WIDTH / 2.0 + DOG_WIDTH / 2.0;

    /// Displacements at or below this are treated as no movement
    pub const MOVE_EPSILON: f64 = 1e-6;
    /// Milliseconds to seconds
    pub const MS_TO_SEC: f64 = 0.001;

    /// Defaults applied when the configuration omits a value
    pub const DEFAULT_DOG_SPEED: f64 = 1.0;
    pub const DEFAULT_BAG_CAPACITY: usize = 3;
    pub const DEFAULT_RETIREMENT_SECS: f64 = 60.0;

    /// Upper bound on a leaderboard window
    pub const MAX_LEADERBOARD_WINDOW: usize = 100;
}

/// Order two values as (min, max)
#[inline]
pub fn min_max(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}
