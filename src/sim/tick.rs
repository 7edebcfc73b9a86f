//! Simulation tick
//!
//! For every session: spawn loot, move dogs, then resolve pickups and
//! deposits along each moved dog's path. The global clock advances last.

use glam::DVec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::collision::{office_crossings, office_precedes, try_collect_point};
use super::dog::DogId;
use super::map::{LostObject, LostObjectId, Map};
use super::session::GameSession;
use super::state::Game;
use crate::consts::LOOT_COLLECT_RADIUS;

impl Game {
    /// Advance the whole world by `delta_ms`
    pub fn tick(&mut self, delta_ms: f64) {
        let Game {
            maps,
            sessions,
            rng,
            retirement_ms,
            ..
        } = self;

        for session in sessions.iter_mut() {
            let Some(map) = maps.get_mut(session.map_index()) else {
                continue;
            };
            spawn_loot(map, session, delta_ms, rng);
            let moved = session.advance(*retirement_ms, delta_ms, map.roads());
            collect_loot(map, session, &moved);
        }

        self.game_time_ms += delta_ms;
    }
}

/// Ask the session's spawn policy for new loot and scatter it on the roads.
/// Returns the number of lost objects placed.
pub(super) fn spawn_loot(
    map: &mut Map,
    session: &mut GameSession,
    delta_ms: f64,
    rng: &mut Pcg32,
) -> usize {
    let random_factor = if session.loot_generator().config().jitter {
        rng.random::<f64>()
    } else {
        1.0
    };
    let looters = session.dog_count();
    let count = session.loot_generator_mut().generate(
        delta_ms,
        map.lost_object_count(),
        looters,
        random_factor,
    );
    if count == 0 {
        return 0;
    }
    if map.roads().is_empty() || map.loot_types().is_empty() {
        log::warn!(
            "Map {} cannot spawn loot: {} roads, {} loot types",
            map.id(),
            map.roads().len(),
            map.loot_types().len()
        );
        return 0;
    }

    for _ in 0..count {
        let road = map.roads()[rng.random_range(0..map.roads().len())];
        let (min, max) = road.bounds();
        let position = DVec2::new(
            rng.random_range(min.x..=max.x),
            rng.random_range(min.y..=max.y),
        );
        let loot_type = map.loot_types()[rng.random_range(0..map.loot_types().len())].type_id;
        let id = map.add_lost_object(position, loot_type);
        log::debug!(
            "Spawned lost object {} (type {}) on map {} at ({:.2}, {:.2})",
            id,
            loot_type,
            map.id(),
            position.x,
            position.y
        );
    }
    count
}

/// Resolve pickups and office deposits for every dog that moved.
///
/// Per lost object: if any crossed office lies strictly earlier on the path
/// than that object, the bag is deposited before the object is considered.
pub(super) fn collect_loot(map: &mut Map, session: &mut GameSession, moved: &[DogId]) {
    let capacity = map.bag_capacity();
    for &dog_id in moved {
        let Some(dog) = session.dog_mut(dog_id) else {
            continue;
        };
        let (from, to) = (dog.previous_position(), dog.position());
        if from == to {
            continue;
        }

        let crossings = office_crossings(map, from, to);
        let candidates: Vec<(LostObjectId, LostObject)> = map
            .lost_objects()
            .iter()
            .map(|(id, object)| (*id, *object))
            .collect();

        for (object_id, object) in candidates {
            let result = try_collect_point(from, to, object.position);
            if office_precedes(&crossings, &result) && dog.bag_len() > 0 {
                log::debug!(
                    "Dog {} deposited {} items worth {}",
                    dog.name(),
                    dog.bag_len(),
                    dog.bag_score()
                );
                dog.flush_bag();
            }

            if !result.is_collected(LOOT_COLLECT_RADIUS) {
                continue;
            }
            let Some(loot) = map.loot_type(object.loot_type) else {
                continue;
            };
            if dog.try_pick_up(object_id, loot, capacity) {
                map.remove_lost_object(object_id);
                log::debug!("Dog {} picked up lost object {}", dog.name(), object_id);
            }
        }
    }
}
