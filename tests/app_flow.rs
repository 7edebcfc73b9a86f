//! End-to-end runs through the application facade

use std::fs;

use dog_courier::config::{GameConfig, GameSettings, load_game};
use dog_courier::sim::MapId;
use dog_courier::{Application, GameError};
use glam::DVec2;

const CONFIG: &str = r#"{
    "defaultDogSpeed": 2.0,
    "defaultBagCapacity": 2,
    "dogRetirementTime": 5.0,
    "lootGeneratorConfig": { "period": 0.5, "probability": 0.9 },
    "maps": [
        {
            "id": "town",
            "name": "Town",
            "lootTypes": [
                { "name": "key", "file": "assets/key.obj", "value": 10 },
                { "name": "wallet", "file": "assets/wallet.obj", "value": 30 }
            ],
            "roads": [
                { "x0": 0, "y0": 0, "x1": 20 },
                { "x0": 20, "y0": 0, "y1": 20 },
                { "x0": 0, "y0": 20, "x1": 20 },
                { "x0": 0, "y0": 0, "y1": 20 }
            ],
            "buildings": [ { "x": 2, "y": 2, "w": 16, "h": 16 } ],
            "offices": [ { "id": "post", "x": 20, "y": 10, "offsetX": 0, "offsetY": 0 } ]
        }
    ]
}"#;

fn build(settings: GameSettings) -> Application {
    let game = GameConfig::from_json(CONFIG)
        .unwrap()
        .build_game(Some(2024))
        .unwrap();
    Application::new(game, settings)
}

#[test]
fn courier_loop_scores_and_retires() {
    let mut app = build(GameSettings::default());
    let town = MapId::new("town");
    let rex = app.join("Rex", &town).unwrap();

    // Lap the square block; loot spawns as long as someone is playing
    let mut score = 0;
    for leg in ["R", "D", "L", "U"].iter().cycle().take(16) {
        app.set_action(&rex.auth_token, leg).unwrap();
        for _ in 0..20 {
            app.tick(500.0).unwrap();
        }
        let view = app.world_view(&rex.auth_token).unwrap();
        let dog = &view.players[&0];
        assert!(dog.bag.len() <= 2);
        assert!(dog.score >= score);
        score = dog.score;
    }

    // Stop and wait out the retirement threshold
    app.set_action(&rex.auth_token, "").unwrap();
    let mut retired = Vec::new();
    for _ in 0..11 {
        retired.extend(app.tick(500.0).unwrap());
    }
    assert_eq!(retired.len(), 1);
    assert_eq!(retired[0].name, "Rex");
    assert_eq!(retired[0].score, score);

    assert_eq!(
        app.find_player(&rex.auth_token).err(),
        Some(GameError::TokenNotFound)
    );
    assert_eq!(app.leaderboard(0, 100).unwrap(), retired);
    assert!(app.game().session(&town).unwrap().dogs().is_empty());
}

#[test]
fn dogs_stay_on_roads() {
    let mut app = build(GameSettings {
        randomize_spawn_points: true,
        ..Default::default()
    });
    let town = MapId::new("town");
    let tokens: Vec<_> = (0..4)
        .map(|i| app.join(&format!("dog{i}"), &town).unwrap().auth_token)
        .collect();

    let codes = ["U", "R", "D", "L"];
    for step in 0..40 {
        for (i, token) in tokens.iter().enumerate() {
            app.set_action(token, codes[(i + step) % 4]).unwrap();
        }
        app.tick(700.0).unwrap();
        let map = app.find_map(&town).unwrap();
        let view = app.world_view(&tokens[0]).unwrap();
        for dog in view.players.values() {
            assert!(
                map.roads().iter().any(|r| r.contains(dog.position)),
                "dog left the road network at {:?}",
                dog.position
            );
        }
    }
}

#[test]
fn autosave_and_resume() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    let state_path = dir.path().join("state.json");
    fs::write(&config_path, CONFIG).unwrap();

    let settings = GameSettings {
        tick_period_ms: Some(100),
        state_file: Some(state_path.clone()),
        save_state_period_ms: Some(1000),
        seed: Some(7),
        ..Default::default()
    };

    let mut first = Application::new(load_game(&config_path, settings.seed).unwrap(), settings.clone());
    assert!(!first.restore_state().unwrap());
    let rex = first.join("Rex", &MapId::new("town")).unwrap();
    first.set_action(&rex.auth_token, "R").unwrap();
    for _ in 0..10 {
        first.tick(100.0).unwrap();
    }
    assert!(state_path.exists());

    let mut second = Application::new(load_game(&config_path, settings.seed).unwrap(), settings);
    assert!(second.restore_state().unwrap());
    assert_eq!(second.game().game_time_ms(), 1000.0);

    let before = first.world_view(&rex.auth_token).unwrap();
    let after = second.world_view(&rex.auth_token).unwrap();
    assert_eq!(before, after);
    assert!(after.players[&0].position.distance(DVec2::new(2.0, 0.0)) < 1e-9);

    // Both runs continue in lockstep
    for _ in 0..20 {
        first.tick(100.0).unwrap();
        second.tick(100.0).unwrap();
    }
    assert_eq!(
        first.world_view(&rex.auth_token).unwrap(),
        second.world_view(&rex.auth_token).unwrap()
    );
}
