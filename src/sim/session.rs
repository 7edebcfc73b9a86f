//! Live dogs on one map instance

use std::collections::BTreeMap;

use glam::DVec2;

use super::dog::{Dog, DogId};
use super::geometry::Road;
use super::loot::{LootGenerator, LootGeneratorConfig};
use super::map::MapId;

/// A map instance and the dogs playing on it
#[derive(Debug, Clone)]
pub struct GameSession {
    map_id: MapId,
    /// Index of the map in the game's catalog
    map_index: usize,
    /// Keyed by id so iteration order is stable
    dogs: BTreeMap<DogId, Dog>,
    next_dog_id: DogId,
    loot_generator: LootGenerator,
}

impl GameSession {
    pub fn new(map_id: MapId, map_index: usize, loot_config: LootGeneratorConfig) -> Self {
        Self {
            map_id,
            map_index,
            dogs: BTreeMap::new(),
            next_dog_id: 0,
            loot_generator: LootGenerator::new(loot_config),
        }
    }

    pub fn map_id(&self) -> &MapId {
        &self.map_id
    }

    pub(crate) fn map_index(&self) -> usize {
        self.map_index
    }

    pub fn dogs(&self) -> &BTreeMap<DogId, Dog> {
        &self.dogs
    }

    pub fn dog(&self, id: DogId) -> Option<&Dog> {
        self.dogs.get(&id)
    }

    pub(crate) fn dog_mut(&mut self, id: DogId) -> Option<&mut Dog> {
        self.dogs.get_mut(&id)
    }

    pub fn dog_count(&self) -> usize {
        self.dogs.len()
    }

    /// Id the next joining dog will receive
    pub fn next_dog_id(&self) -> DogId {
        self.next_dog_id
    }

    pub(crate) fn set_next_dog_id(&mut self, next: DogId) {
        self.next_dog_id = self.next_dog_id.max(next);
    }

    pub fn loot_generator(&self) -> &LootGenerator {
        &self.loot_generator
    }

    pub(crate) fn loot_generator_mut(&mut self) -> &mut LootGenerator {
        &mut self.loot_generator
    }

    /// Create a dog at the spawn point; ids increase and are never reused
    pub fn spawn_dog(&mut self, name: &str, position: DVec2, road: Option<usize>) -> DogId {
        let id = self.next_dog_id;
        self.next_dog_id += 1;
        self.dogs.insert(id, Dog::new(id, name, position, road));
        id
    }

    /// Re-insert a restored dog under its own id. Returns false if the id is taken.
    pub(crate) fn insert_dog(&mut self, dog: Dog) -> bool {
        let id = dog.id();
        if self.dogs.contains_key(&id) {
            return false;
        }
        self.next_dog_id = self.next_dog_id.max(id + 1);
        self.dogs.insert(id, dog);
        true
    }

    pub(crate) fn remove_dog(&mut self, id: DogId) -> Option<Dog> {
        self.dogs.remove(&id)
    }

    /// Id -> name for every live dog
    pub fn dog_names(&self) -> BTreeMap<DogId, String> {
        self.dogs
            .iter()
            .map(|(id, dog)| (*id, dog.name().to_string()))
            .collect()
    }

    /// Move or idle every dog for one tick. Returns the dogs whose position
    /// changed.
    pub fn advance(&mut self, retire_threshold_ms: f64, delta_ms: f64, roads: &[Road]) -> Vec<DogId> {
        let mut moved = Vec::new();
        for (id, dog) in self.dogs.iter_mut() {
            if dog.is_stationary() {
                dog.add_idle_time(delta_ms, retire_threshold_ms);
            } else {
                if dog.advance(delta_ms, roads) {
                    moved.push(*id);
                }
                dog.add_active_time(delta_ms);
            }
        }
        moved
    }
}
