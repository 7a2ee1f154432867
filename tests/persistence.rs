use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use yurtstead::save::SaveError;
use yurtstead::terrain::ResourceYield;
use yurtstead::world::{ResourcePool, World, YurtUnit};

fn test_world(rows: i32, cols: i32, food: i64, wood: i64, seed: u64) -> World {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    World::new(rows, cols, ResourcePool::new(food, wood), &mut rng)
        .expect("dimensions are positive")
}

fn buildable_tiles(world: &World, count: usize) -> Vec<(i32, i32)> {
    let mut found = Vec::new();
    for row in world.map() {
        for tile in row {
            if tile.terrain_type.is_buildable() && tile.occupied_by.is_none() {
                found.push((tile.x, tile.y));
                if found.len() == count {
                    return found;
                }
            }
        }
    }
    panic!("map has fewer than {count} buildable tiles");
}

#[test]
fn round_trip_reconstructs_initial_state() {
    let world = test_world(10, 15, 100, 50, 1);
    let blob = world.save_to_json().expect("serialize succeeds");

    let mut restored = test_world(1, 1, 0, 0, 2);
    restored
        .restore_from_json(&blob)
        .expect("deserialize succeeds");

    assert_eq!(restored.map_size(), world.map_size());
    assert_eq!(restored.resources(), world.resources());
    assert_eq!(
        restored.state(),
        world.state(),
        "restored state should be deep-equal to the original"
    );
}

#[test]
fn round_trip_preserves_units_and_occupancy() {
    let mut world = test_world(10, 15, 100, 50, 3);
    let spots = buildable_tiles(&world, 2);
    world.add_yurt_unit(YurtUnit {
        id: "y1".into(),
        x: spots[0].0,
        y: spots[0].1,
        morale: 80,
        resources: ResourcePool::default(),
    });
    world.add_yurt_unit(YurtUnit {
        id: "y2".into(),
        x: spots[1].0,
        y: spots[1].1,
        morale: 90,
        resources: ResourcePool::default(),
    });

    let blob = world.save_to_json().expect("serialize succeeds");
    let mut restored = test_world(3, 4, 0, 0, 4);
    restored
        .restore_from_json(&blob)
        .expect("deserialize succeeds");

    assert_eq!(restored.yurt_units(), world.yurt_units());
    for yurt in world.yurt_units() {
        let original_tile = world.tile(yurt.x, yurt.y).expect("unit tile exists");
        let restored_tile = restored.tile(yurt.x, yurt.y).expect("unit tile survives");
        assert_eq!(restored_tile.occupied_by, original_tile.occupied_by);
    }
    assert_eq!(restored.state(), world.state());
}

#[test]
fn round_trip_after_resource_changes() {
    let mut world = test_world(12, 13, 150, 75, 5);
    world.update_resources(50, -20);
    assert_eq!(world.resources(), ResourcePool::new(200, 55));

    let blob = world.save_to_json().expect("serialize succeeds");
    let mut restored = test_world(1, 1, 0, 0, 6);
    restored
        .restore_from_json(&blob)
        .expect("deserialize succeeds");

    assert_eq!(restored.resources(), ResourcePool::new(200, 55));
    assert_eq!(restored.state(), world.state());
}

#[test]
fn round_trip_preserves_tile_yields() {
    let mut world = test_world(10, 15, 0, 0, 7);
    let spot = buildable_tiles(&world, 1)[0];
    let tile_yield = ResourceYield {
        food: 2,
        wood: 1,
        extra: BTreeMap::from([("stone".to_string(), 4)]),
    };
    let tile = world.tile_mut(spot.0, spot.1).expect("tile exists");
    tile.resource_yield = Some(tile_yield.clone());

    let blob = world.save_to_json().expect("serialize succeeds");
    let mut restored = test_world(1, 1, 0, 0, 8);
    restored
        .restore_from_json(&blob)
        .expect("deserialize succeeds");

    let restored_yield = restored
        .tile(spot.0, spot.1)
        .and_then(|t| t.resource_yield.clone())
        .expect("yield survives the round trip");
    assert_eq!(restored_yield, tile_yield);
}

#[test]
fn malformed_text_leaves_state_untouched() {
    let mut world = test_world(10, 15, 100, 50, 9);
    let before = world.state().clone();

    let err = world
        .restore_from_json("{'not_json': definitely}")
        .expect_err("malformed text must be rejected");
    assert!(matches!(err, SaveError::InvalidFormat));
    assert_eq!(world.state(), &before, "a failed load must not mutate state");
}

#[test]
fn structurally_incomplete_blob_leaves_state_untouched() {
    let mut world = test_world(10, 15, 100, 50, 10);
    let before = world.state().clone();

    let blob = r#"{"someOtherData": "value", "map": [], "yurtUnits": "not_an_array"}"#;
    let err = world
        .restore_from_json(blob)
        .expect_err("incomplete blob must be rejected");
    assert!(matches!(err, SaveError::InvalidFormat));
    assert_eq!(world.state(), &before);
}

#[test]
fn parse_and_validation_failures_are_indistinguishable() {
    let mut world = test_world(10, 15, 100, 50, 11);

    let parse_err = world
        .restore_from_json("not json at all")
        .expect_err("garbage rejected");
    let shape_err = world
        .restore_from_json(r#"{"map": [], "resources": {"food": 0, "wood": 0}}"#)
        .expect_err("missing fields rejected");

    assert_eq!(
        parse_err.to_string(),
        shape_err.to_string(),
        "both failure modes must surface the same signal"
    );
}

#[test]
fn blob_uses_the_expected_field_names() {
    let world = test_world(4, 4, 10, 20, 12);
    let blob = world.save_to_json().expect("serialize succeeds");
    let value: serde_json::Value = serde_json::from_str(&blob).expect("blob is valid json");

    for field in ["map", "yurtUnits", "resources", "mapSize"] {
        assert!(value.get(field).is_some(), "blob is missing '{field}'");
    }
    let first_tile = &value["map"][0][0];
    assert!(first_tile.get("terrainType").is_some());
    assert_eq!(value["mapSize"]["rows"], 4);

    // Terrain serializes as the lowercase strings the save format promises.
    let terrain = first_tile["terrainType"].as_str().expect("terrain string");
    assert!(matches!(terrain, "grass" | "water" | "forest" | "mountain"));
}
