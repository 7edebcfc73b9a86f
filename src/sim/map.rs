//! Map catalog: static geometry, loot catalog and live lost objects

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Building, Office, OfficeId, Road};
use crate::error::ConfigError;

/// Map identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapId(pub String);

impl MapId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a lost object, unique within its map
pub type LostObjectId = u64;

/// An entry in a map's loot catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootType {
    /// Position in the catalog
    pub type_id: u32,
    pub name: String,
    /// Score awarded when delivered to an office
    pub value: u64,
    /// Presentation attributes passed through to clients untouched
    #[serde(default)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A spawned loot instance waiting to be picked up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LostObject {
    pub position: DVec2,
    pub loot_type: u32,
}

/// Static map data plus the mutable lost-object table
#[derive(Debug, Clone)]
pub struct Map {
    id: MapId,
    name: String,
    dog_speed: f64,
    bag_capacity: usize,
    roads: Vec<Road>,
    buildings: Vec<Building>,
    offices: Vec<Office>,
    office_index: HashMap<OfficeId, usize>,
    loot_types: Vec<LootType>,
    lost_objects: BTreeMap<LostObjectId, LostObject>,
    next_lost_object_id: LostObjectId,
}

impl Map {
    pub fn new(id: MapId, name: impl Into<String>, dog_speed: f64, bag_capacity: usize) -> Self {
        Self {
            id,
            name: name.into(),
            dog_speed,
            bag_capacity,
            roads: Vec::new(),
            buildings: Vec::new(),
            offices: Vec::new(),
            office_index: HashMap::new(),
            loot_types: Vec::new(),
            lost_objects: BTreeMap::new(),
            next_lost_object_id: 0,
        }
    }

    pub fn id(&self) -> &MapId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dog_speed(&self) -> f64 {
        self.dog_speed
    }

    pub fn bag_capacity(&self) -> usize {
        self.bag_capacity
    }

    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn offices(&self) -> &[Office] {
        &self.offices
    }

    pub fn add_road(&mut self, road: Road) {
        self.roads.push(road);
    }

    pub fn add_building(&mut self, building: Building) {
        self.buildings.push(building);
    }

    /// Add an office; office ids must be unique within the map
    pub fn add_office(&mut self, office: Office) -> Result<(), ConfigError> {
        if self.office_index.contains_key(&office.id) {
            return Err(ConfigError::DuplicateOffice {
                map: self.id.clone(),
                office: office.id,
            });
        }
        self.office_index.insert(office.id.clone(), self.offices.len());
        self.offices.push(office);
        Ok(())
    }

    /// Append a loot type to the catalog, returning its type id
    pub fn add_loot_type(
        &mut self,
        name: impl Into<String>,
        value: u64,
        extra: serde_json::Map<String, serde_json::Value>,
    ) -> u32 {
        let type_id = self.loot_types.len() as u32;
        self.loot_types.push(LootType {
            type_id,
            name: name.into(),
            value,
            extra,
        });
        type_id
    }

    pub fn loot_types(&self) -> &[LootType] {
        &self.loot_types
    }

    /// Look up a loot type by its id
    pub fn loot_type(&self, type_id: u32) -> Option<&LootType> {
        self.loot_types.iter().find(|l| l.type_id == type_id)
    }

    /// Look up a loot type by catalog position
    pub fn loot_type_at(&self, index: usize) -> Option<&LootType> {
        self.loot_types.get(index)
    }

    pub fn lost_objects(&self) -> &BTreeMap<LostObjectId, LostObject> {
        &self.lost_objects
    }

    pub fn lost_object_count(&self) -> usize {
        self.lost_objects.len()
    }

    /// Next id the table will hand out
    pub fn next_lost_object_id(&self) -> LostObjectId {
        self.next_lost_object_id
    }

    /// Place a new lost object and return its id
    pub fn add_lost_object(&mut self, position: DVec2, loot_type: u32) -> LostObjectId {
        let id = self.next_lost_object_id;
        self.next_lost_object_id += 1;
        self.lost_objects.insert(
            id,
            LostObject {
                position,
                loot_type,
            },
        );
        id
    }

    /// Put a lost object back under a known id (used by restore)
    pub fn insert_lost_object(&mut self, id: LostObjectId, object: LostObject) {
        self.lost_objects.insert(id, object);
        self.next_lost_object_id = self.next_lost_object_id.max(id + 1);
    }

    /// Restore the id counter; never moves it below ids already in use
    pub fn set_next_lost_object_id(&mut self, next: LostObjectId) {
        let floor = self
            .lost_objects
            .keys()
            .next_back()
            .map_or(0, |id| id + 1);
        self.next_lost_object_id = next.max(floor);
    }

    pub fn remove_lost_object(&mut self, id: LostObjectId) -> Option<LostObject> {
        self.lost_objects.remove(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec2;

    fn test_map() -> Map {
        let mut map = Map::new(MapId::new("map1"), "Map 1", 1.0, 3);
        map.add_loot_type("key", 10, Default::default());
        map.add_loot_type("wallet", 30, Default::default());
        map
    }

    #[test]
    fn test_duplicate_office_rejected() {
        let mut map = test_map();
        let office = Office::new(OfficeId("o1".into()), IVec2::ZERO, IVec2::ZERO);
        assert!(map.add_office(office.clone()).is_ok());
        assert!(matches!(
            map.add_office(office),
            Err(ConfigError::DuplicateOffice { .. })
        ));
        assert_eq!(map.offices().len(), 1);
    }

    #[test]
    fn test_loot_catalog_lookup() {
        let map = test_map();
        assert_eq!(map.loot_type(1).map(|l| l.value), Some(30));
        assert_eq!(map.loot_type_at(0).map(|l| l.name.as_str()), Some("key"));
        assert!(map.loot_type(7).is_none());
    }

    #[test]
    fn test_lost_object_ids_never_collide() {
        let mut map = test_map();
        let a = map.add_lost_object(DVec2::ZERO, 0);
        let b = map.add_lost_object(DVec2::X, 1);
        map.remove_lost_object(a);
        let c = map.add_lost_object(DVec2::Y, 0);
        assert_ne!(c, a);
        assert_ne!(c, b);
        assert_eq!(map.lost_object_count(), 2);
    }

    #[test]
    fn test_insert_lost_object_bumps_counter() {
        let mut map = test_map();
        map.insert_lost_object(
            41,
            LostObject {
                position: DVec2::ZERO,
                loot_type: 0,
            },
        );
        assert_eq!(map.add_lost_object(DVec2::ZERO, 0), 42);
    }

    #[test]
    fn test_set_next_id_respects_live_ids() {
        let mut map = test_map();
        map.insert_lost_object(
            5,
            LostObject {
                position: DVec2::ZERO,
                loot_type: 0,
            },
        );
        map.set_next_lost_object_id(2);
        assert_eq!(map.next_lost_object_id(), 6);
        map.set_next_lost_object_id(9);
        assert_eq!(map.next_lost_object_id(), 9);
    }
}
