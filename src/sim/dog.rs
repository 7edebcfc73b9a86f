//! Dog entity and road-constrained movement
//!
//! A dog is either stationary (zero velocity) or moving along exactly one
//! axis. Each tick it tries a single step; a step that would leave the road
//! network stops the dog at the edge of the road it was last checked against.

use std::collections::BTreeMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::geometry::Road;
use super::map::{LootType, LostObjectId};
use crate::consts::{HALF_ROAD_WIDTH, MOVE_EPSILON, MS_TO_SEC};
use crate::error::GameError;

/// Dog identifier, unique within a session
pub type DogId = u64;

/// Facing direction. Screen coordinates: north is -y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    North,
    South,
    West,
    East,
}

impl Direction {
    /// Single-character action code
    pub fn code(self) -> char {
        match self {
            Direction::North => 'U',
            Direction::South => 'D',
            Direction::West => 'L',
            Direction::East => 'R',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'U' => Some(Direction::North),
            'D' => Some(Direction::South),
            'L' => Some(Direction::West),
            'R' => Some(Direction::East),
            _ => None,
        }
    }

    /// Unit vector for movement in this direction
    pub fn unit(self) -> DVec2 {
        match self {
            Direction::North => DVec2::new(0.0, -1.0),
            Direction::South => DVec2::new(0.0, 1.0),
            Direction::West => DVec2::new(-1.0, 0.0),
            Direction::East => DVec2::new(1.0, 0.0),
        }
    }
}

/// A movement command from a player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Stop,
    Move(Direction),
}

impl Action {
    /// Parse an action code: `""` stops, `U`/`D`/`L`/`R` move
    pub fn parse(code: &str) -> Result<Self, GameError> {
        let mut chars = code.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Ok(Action::Stop),
            (Some(c), None) => Direction::from_code(c)
                .map(Action::Move)
                .ok_or_else(|| GameError::InvalidDirection(code.to_string())),
            _ => Err(GameError::InvalidDirection(code.to_string())),
        }
    }
}

/// A player-controlled dog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dog {
    id: DogId,
    name: String,
    position: DVec2,
    prev_position: DVec2,
    velocity: DVec2,
    direction: Direction,
    /// Index into the map's road list
    road: Option<usize>,
    /// Lost object id -> loot type id
    bag: BTreeMap<LostObjectId, u32>,
    score: u64,
    bag_score: u64,
    active_time_ms: f64,
    idle_time_ms: f64,
    retired: bool,
}

impl Dog {
    pub fn new(id: DogId, name: impl Into<String>, position: DVec2, road: Option<usize>) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            prev_position: position,
            velocity: DVec2::ZERO,
            direction: Direction::default(),
            road,
            bag: BTreeMap::new(),
            score: 0,
            bag_score: 0,
            active_time_ms: 0.0,
            idle_time_ms: 0.0,
            retired: false,
        }
    }

    pub fn id(&self) -> DogId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> DVec2 {
        self.position
    }

    pub fn previous_position(&self) -> DVec2 {
        self.prev_position
    }

    pub fn velocity(&self) -> DVec2 {
        self.velocity
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn road_index(&self) -> Option<usize> {
        self.road
    }

    pub fn is_stationary(&self) -> bool {
        self.velocity == DVec2::ZERO
    }

    /// Adopt a velocity and facing. A zero velocity stops the dog and keeps
    /// the current facing.
    pub fn set_velocity_and_direction(&mut self, velocity: DVec2, direction: Direction) {
        if velocity == DVec2::ZERO {
            self.velocity = DVec2::ZERO;
        } else {
            self.velocity = velocity;
            self.direction = direction;
        }
    }

    /// Apply a player action at the given map speed
    pub fn apply_action(&mut self, action: Action, speed: f64) {
        match action {
            Action::Stop => self.set_velocity_and_direction(DVec2::ZERO, self.direction),
            Action::Move(dir) => self.set_velocity_and_direction(dir.unit() * speed, dir),
        }
    }

    fn current_road<'a>(&self, roads: &'a [Road]) -> Option<&'a Road> {
        self.road.and_then(|index| roads.get(index))
    }

    fn commit(&mut self, position: DVec2) {
        self.prev_position = self.position;
        self.position = position;
    }

    /// Step the dog forward by `delta_ms`. Returns whether the position changed.
    pub fn advance(&mut self, delta_ms: f64, roads: &[Road]) -> bool {
        let candidate = self.position + self.velocity * (delta_ms * MS_TO_SEC);
        let displacement = (candidate - self.position).abs();
        if displacement.x <= MOVE_EPSILON && displacement.y <= MOVE_EPSILON {
            return false;
        }

        if self
            .current_road(roads)
            .is_some_and(|road| road.contains(candidate))
        {
            self.commit(candidate);
            return true;
        }

        // The dog may stand where several roads overlap. Each road examined
        // becomes the reference, so a failed search leaves the last one.
        let occupied: Vec<usize> = roads
            .iter()
            .enumerate()
            .filter(|(_, road)| road.contains(self.position))
            .map(|(index, _)| index)
            .collect();
        for index in occupied {
            self.road = Some(index);
            if roads[index].contains(candidate) {
                self.commit(candidate);
                return true;
            }
        }

        let before = self.position;
        self.velocity = DVec2::ZERO;
        if let Some(road) = self.current_road(roads).copied() {
            self.stop_at_boundary(&road, candidate);
        }
        // A clamp counts as a move; the collection path runs before -> clamped
        if self.position != before {
            self.prev_position = before;
            true
        } else {
            false
        }
    }

    fn stop_at_boundary(&mut self, road: &Road, candidate: DVec2) {
        let (min, max) = road.bounds();
        if road.is_horizontal() {
            match self.direction {
                Direction::North => self.position.y = min.y - HALF_ROAD_WIDTH,
                Direction::South => self.position.y = max.y + HALF_ROAD_WIDTH,
                Direction::West if candidate.x <= min.x => {
                    self.position.x = min.x - HALF_ROAD_WIDTH
                }
                Direction::East if candidate.x >= max.x => {
                    self.position.x = max.x + HALF_ROAD_WIDTH
                }
                _ => {}
            }
        } else if road.is_vertical() {
            match self.direction {
                Direction::East => self.position.x = max.x + HALF_ROAD_WIDTH,
                Direction::West => self.position.x = min.x - HALF_ROAD_WIDTH,
                Direction::North if candidate.y <= min.y => {
                    self.position.y = min.y - HALF_ROAD_WIDTH
                }
                Direction::South if candidate.y >= max.y => {
                    self.position.y = max.y + HALF_ROAD_WIDTH
                }
                _ => {}
            }
        }
    }

    // === Bag ===

    pub fn bag(&self) -> &BTreeMap<LostObjectId, u32> {
        &self.bag
    }

    pub fn bag_len(&self) -> usize {
        self.bag.len()
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Value of the loot currently carried
    pub fn bag_score(&self) -> u64 {
        self.bag_score
    }

    /// Put a lost object in the bag if there is room. Returns false when full.
    pub fn try_pick_up(&mut self, id: LostObjectId, loot: &LootType, capacity: usize) -> bool {
        if self.bag.len() >= capacity {
            return false;
        }
        self.bag.insert(id, loot.type_id);
        self.bag_score += loot.value;
        true
    }

    /// Deposit the bag: carried value becomes score and the bag empties
    pub fn flush_bag(&mut self) {
        self.score += self.bag_score;
        self.bag_score = 0;
        self.bag.clear();
    }

    // === Timers ===

    pub fn active_time_ms(&self) -> f64 {
        self.active_time_ms
    }

    pub fn idle_time_ms(&self) -> f64 {
        self.idle_time_ms
    }

    /// Total time in game (moving + standing)
    pub fn play_time_ms(&self) -> f64 {
        self.active_time_ms + self.idle_time_ms
    }

    pub fn add_active_time(&mut self, delta_ms: f64) {
        self.active_time_ms += delta_ms;
    }

    /// Accumulate idle time; flags the dog for retirement once the total
    /// reaches `threshold_ms`
    pub fn add_idle_time(&mut self, delta_ms: f64, threshold_ms: f64) {
        self.idle_time_ms += delta_ms;
        if self.idle_time_ms >= threshold_ms {
            self.retired = true;
        }
    }

    pub fn is_retired(&self) -> bool {
        self.retired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec2;
    use proptest::prelude::*;

    fn east_road() -> Vec<Road> {
        vec![Road::horizontal(IVec2::new(0, 0), 10)]
    }

    fn loot(type_id: u32, value: u64) -> LootType {
        LootType {
            type_id,
            name: format!("loot{type_id}"),
            value,
            extra: Default::default(),
        }
    }

    #[test]
    fn test_move_then_clamp_at_road_end() {
        let roads = east_road();
        let mut dog = Dog::new(0, "Rex", DVec2::ZERO, Some(0));
        dog.apply_action(Action::Move(Direction::East), 1.0);

        assert!(dog.advance(5000.0, &roads));
        assert_eq!(dog.position(), DVec2::new(5.0, 0.0));

        assert!(dog.advance(10000.0, &roads));
        assert!((dog.position().x - 10.4).abs() < 1e-9);
        assert_eq!(dog.position().y, 0.0);
        assert_eq!(dog.velocity(), DVec2::ZERO);
        assert_eq!(dog.previous_position(), DVec2::new(5.0, 0.0));
    }

    #[test]
    fn test_stop_keeps_facing() {
        let mut dog = Dog::new(0, "Rex", DVec2::ZERO, Some(0));
        dog.apply_action(Action::Move(Direction::West), 2.0);
        assert_eq!(dog.velocity(), DVec2::new(-2.0, 0.0));
        dog.apply_action(Action::Stop, 2.0);
        assert!(dog.is_stationary());
        assert_eq!(dog.direction(), Direction::West);
    }

    #[test]
    fn test_zero_velocity_never_changes_facing() {
        let mut dog = Dog::new(0, "Rex", DVec2::ZERO, Some(0));
        dog.set_velocity_and_direction(DVec2::ZERO, Direction::East);
        assert_eq!(dog.direction(), Direction::North);
    }

    #[test]
    fn test_tiny_step_is_noop() {
        let roads = east_road();
        let mut dog = Dog::new(0, "Rex", DVec2::ZERO, Some(0));
        dog.apply_action(Action::Move(Direction::East), 1.0);
        assert!(!dog.advance(0.0005, &roads));
        assert_eq!(dog.position(), DVec2::ZERO);
        assert!(!dog.is_stationary());
    }

    #[test]
    fn test_turns_onto_crossing_road() {
        let roads = vec![
            Road::horizontal(IVec2::new(0, 0), 10),
            Road::vertical(IVec2::new(10, 0), 10),
        ];
        let mut dog = Dog::new(0, "Rex", DVec2::new(10.0, 0.0), Some(0));
        dog.apply_action(Action::Move(Direction::South), 1.0);
        assert!(dog.advance(3000.0, &roads));
        assert_eq!(dog.position(), DVec2::new(10.0, 3.0));
        assert_eq!(dog.road_index(), Some(1));
    }

    #[test]
    fn test_failed_search_keeps_last_examined_road() {
        let roads = vec![
            Road::vertical(IVec2::new(0, 0), 10),
            Road::horizontal(IVec2::new(0, 0), 10),
        ];
        let mut dog = Dog::new(0, "Rex", DVec2::ZERO, None);
        dog.apply_action(Action::Move(Direction::West), 1.0);
        dog.advance(1000.0, &roads);
        assert_eq!(dog.road_index(), Some(1));
        assert!((dog.position().x + 0.4).abs() < 1e-9);
        assert!(dog.is_stationary());
    }

    #[test]
    fn test_north_on_horizontal_road_clamps_to_upper_edge() {
        let roads = east_road();
        let mut dog = Dog::new(0, "Rex", DVec2::new(4.0, 0.0), Some(0));
        dog.apply_action(Action::Move(Direction::North), 1.0);
        dog.advance(2000.0, &roads);
        assert_eq!(dog.position().x, 4.0);
        assert!((dog.position().y + 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_south_on_vertical_road_clamps_past_end() {
        let roads = vec![Road::vertical(IVec2::new(2, 0), 5)];
        let mut dog = Dog::new(0, "Rex", DVec2::new(2.0, 4.0), Some(0));
        dog.apply_action(Action::Move(Direction::South), 1.0);
        dog.advance(3000.0, &roads);
        assert!((dog.position().y - 5.4).abs() < 1e-9);
        assert_eq!(dog.position().x, 2.0);
    }

    fn clamp(road: Road, start: DVec2, dir: Direction, delta_ms: f64) -> Dog {
        let mut dog = Dog::new(0, "Rex", start, Some(0));
        dog.apply_action(Action::Move(dir), 1.0);
        dog.advance(delta_ms, &[road]);
        assert!(dog.is_stationary());
        dog
    }

    #[test]
    fn test_east_on_vertical_road_clamps_to_right_edge() {
        let dog = clamp(
            Road::vertical(IVec2::new(2, 0), 10),
            DVec2::new(2.0, 5.0),
            Direction::East,
            1000.0,
        );
        assert!((dog.position().x - 2.4).abs() < 1e-9);
        assert_eq!(dog.position().y, 5.0);
    }

    #[test]
    fn test_west_on_vertical_road_clamps_to_left_edge() {
        let dog = clamp(
            Road::vertical(IVec2::new(2, 0), 10),
            DVec2::new(2.0, 5.0),
            Direction::West,
            1000.0,
        );
        assert!((dog.position().x - 1.6).abs() < 1e-9);
        assert_eq!(dog.position().y, 5.0);
    }

    #[test]
    fn test_north_on_vertical_road_clamps_past_start() {
        let dog = clamp(
            Road::vertical(IVec2::new(2, 0), 10),
            DVec2::new(2.0, 1.0),
            Direction::North,
            2000.0,
        );
        assert_eq!(dog.position().x, 2.0);
        assert!((dog.position().y + 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_south_on_horizontal_road_clamps_to_lower_edge() {
        let dog = clamp(
            Road::horizontal(IVec2::new(0, 2), 10),
            DVec2::new(5.0, 2.0),
            Direction::South,
            1000.0,
        );
        assert_eq!(dog.position().x, 5.0);
        assert!((dog.position().y - 2.4).abs() < 1e-9);
    }

    #[test]
    fn test_end_clamp_needs_candidate_past_the_end() {
        // Stale road reference: the dog stands off its road, so the step fails
        // even though the candidate has not passed either end
        let start = DVec2::new(5.0, 3.0);
        let mut dog = Dog::new(0, "Rex", start, Some(0));
        dog.apply_action(Action::Move(Direction::West), 1.0);
        assert!(!dog.advance(1000.0, &east_road()));
        assert_eq!(dog.position(), start);
        assert!(dog.is_stationary());

        let roads = vec![Road::vertical(IVec2::new(2, 0), 10)];
        let start = DVec2::new(5.0, 5.0);
        let mut dog = Dog::new(0, "Rex", start, Some(0));
        dog.apply_action(Action::Move(Direction::South), 1.0);
        assert!(!dog.advance(1000.0, &roads));
        assert_eq!(dog.position(), start);
    }

    #[test]
    fn test_clamp_path_starts_at_pre_clamp_position() {
        let roads = east_road();
        let mut dog = Dog::new(0, "Rex", DVec2::new(2.0, 0.0), Some(0));
        dog.apply_action(Action::Move(Direction::East), 1.0);
        assert!(dog.advance(6000.0, &roads));
        assert_eq!(dog.previous_position(), DVec2::new(2.0, 0.0));
        assert!((dog.position().x - 8.0).abs() < 1e-9);

        assert!(dog.advance(6000.0, &roads));
        assert!((dog.previous_position().x - 8.0).abs() < 1e-9);
        assert!((dog.position().x - 10.4).abs() < 1e-9);
    }

    #[test]
    fn test_off_network_dog_stops_in_place() {
        let roads = east_road();
        let start = DVec2::new(50.0, 50.0);
        let mut dog = Dog::new(0, "Rex", start, None);
        dog.apply_action(Action::Move(Direction::East), 1.0);
        assert!(!dog.advance(1000.0, &roads));
        assert_eq!(dog.position(), start);
        assert!(dog.is_stationary());
    }

    #[test]
    fn test_bag_respects_capacity() {
        let mut dog = Dog::new(0, "Rex", DVec2::ZERO, Some(0));
        assert!(dog.try_pick_up(0, &loot(0, 10), 2));
        assert!(dog.try_pick_up(1, &loot(1, 20), 2));
        assert!(!dog.try_pick_up(2, &loot(1, 20), 2));
        assert_eq!(dog.bag_len(), 2);
        assert_eq!(dog.bag_score(), 30);

        dog.flush_bag();
        assert_eq!(dog.score(), 30);
        assert_eq!(dog.bag_score(), 0);
        assert_eq!(dog.bag_len(), 0);
    }

    #[test]
    fn test_idle_time_flags_retirement() {
        let mut dog = Dog::new(0, "Rex", DVec2::ZERO, Some(0));
        dog.add_idle_time(500.0, 1000.0);
        assert!(!dog.is_retired());
        dog.add_idle_time(500.0, 1000.0);
        assert!(dog.is_retired());
        dog.add_active_time(250.0);
        assert_eq!(dog.play_time_ms(), 1250.0);
    }

    #[test]
    fn test_action_parse() {
        assert_eq!(Action::parse(""), Ok(Action::Stop));
        assert_eq!(Action::parse("L"), Ok(Action::Move(Direction::West)));
        assert!(matches!(
            Action::parse("X"),
            Err(GameError::InvalidDirection(_))
        ));
        assert!(Action::parse("UD").is_err());
    }

    fn direction_strategy() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::North),
            Just(Direction::South),
            Just(Direction::West),
            Just(Direction::East),
        ]
    }

    proptest! {
        #[test]
        fn prop_moving_dog_stays_on_its_road(
            start in 0.0f64..10.0,
            steps in proptest::collection::vec((direction_strategy(), 1.0f64..8000.0), 1..20),
        ) {
            let roads = vec![
                Road::horizontal(IVec2::new(0, 0), 10),
                Road::vertical(IVec2::new(10, 0), 10),
                Road::horizontal(IVec2::new(0, 10), 10),
                Road::vertical(IVec2::new(0, 0), 10),
            ];
            let mut dog = Dog::new(0, "Rex", DVec2::new(start, 0.0), Some(0));
            for (dir, dt) in steps {
                dog.apply_action(Action::Move(dir), 1.5);
                dog.advance(dt, &roads);
                let on_road = dog
                    .road_index()
                    .and_then(|i| roads.get(i))
                    .is_some_and(|r| r.contains(dog.position()));
                prop_assert!(dog.is_stationary() || on_road);
            }
        }
    }
}
