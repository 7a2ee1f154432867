use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use yurtstead::mapgen::{self, lake_center, river_column};
use yurtstead::terrain::TerrainType;

fn generate(rows: i32, cols: i32, seed: u64) -> Vec<Vec<yurtstead::terrain::Tile>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    mapgen::generate(rows, cols, &mut rng).expect("dimensions are positive")
}

#[test]
fn grid_matches_requested_dimensions() {
    let map = generate(12, 17, 1);
    assert_eq!(map.len(), 12);
    for (y, row) in map.iter().enumerate() {
        assert_eq!(row.len(), 17, "row {y} has the wrong width");
        for (x, tile) in row.iter().enumerate() {
            assert_eq!((tile.x, tile.y), (x as i32, y as i32));
        }
    }
}

#[test]
fn every_cell_gets_real_terrain() {
    let map = generate(20, 25, 2);
    for row in &map {
        for tile in row {
            assert_ne!(
                tile.terrain_type,
                TerrainType::Empty,
                "generator must never emit empty terrain in bounds"
            );
            assert!(tile.occupied_by.is_none());
            assert!(tile.resource_yield.is_none(), "generator assigns no yields");
        }
    }
}

#[test]
fn non_positive_dimensions_are_rejected() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    assert!(mapgen::generate(0, 5, &mut rng).is_err());
    assert!(mapgen::generate(5, 0, &mut rng).is_err());
    assert!(mapgen::generate(-1, 8, &mut rng).is_err());
}

#[test]
fn river_meander_and_lake_survive_later_passes() {
    // Forest and mountain passes run after the water pass; every cell the
    // water pass claims must still be water in the finished map.
    let (rows, cols) = (30, 40);
    let map = generate(rows, cols, 4);

    let river_x = river_column(cols);
    for y in 0..rows {
        assert_eq!(
            map[y as usize][river_x as usize].terrain_type,
            TerrainType::Water,
            "river channel lost at row {y}"
        );
        let offset = ((y as f64 * 0.5).sin() * 2.0).round() as i32;
        let meander_x = river_x + offset;
        if meander_x >= 0 && meander_x < cols {
            assert_eq!(
                map[y as usize][meander_x as usize].terrain_type,
                TerrainType::Water,
                "meander lost at row {y}"
            );
        }
    }

    let (lake_x, lake_y) = lake_center(rows, cols);
    for y in (lake_y - 3)..=(lake_y + 3) {
        for x in (lake_x - 3)..=(lake_x + 3) {
            if y < 0 || y >= rows || x < 0 || x >= cols {
                continue;
            }
            let distance = f64::from((y - lake_y).pow(2) + (x - lake_x).pow(2)).sqrt();
            if distance <= 3.0 {
                assert_eq!(
                    map[y as usize][x as usize].terrain_type,
                    TerrainType::Water,
                    "lake cell ({x}, {y}) was overwritten"
                );
            }
        }
    }
}

#[test]
fn mountain_range_rises_on_the_default_map() {
    // On a 30x40 map the range covers columns 4..12 at row 0, and the noise
    // threshold is exceeded at (4, 0) and (5, 0) independent of the rng.
    let map = generate(30, 40, 5);
    assert_eq!(map[0][4].terrain_type, TerrainType::Mountain);
    assert_eq!(map[0][5].terrain_type, TerrainType::Mountain);
}

#[test]
fn maps_differ_across_rng_streams() {
    // Forest placement draws from the rng, so two seeds almost surely give
    // different forests. Identical maps here would mean the draws are unused.
    let a = generate(30, 40, 6);
    let b = generate(30, 40, 7);
    assert_ne!(a, b, "two seeds produced identical maps");
}
