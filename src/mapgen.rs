use rand::Rng;
use thiserror::Error;

use crate::terrain::{TerrainType, Tile};

#[derive(Debug, Clone, Copy, Error)]
#[error("map dimensions must be positive (got {rows}x{cols})")]
pub struct InvalidDimensions {
    pub rows: i32,
    pub cols: i32,
}

/// Builds a `rows x cols` terrain grid: grass base, then water, forests and
/// mountains in that order. Water laid down by an earlier pass is never
/// overwritten by a later one.
pub fn generate<R: Rng>(
    rows: i32,
    cols: i32,
    rng: &mut R,
) -> Result<Vec<Vec<Tile>>, InvalidDimensions> {
    if rows <= 0 || cols <= 0 {
        return Err(InvalidDimensions { rows, cols });
    }

    let mut map: Vec<Vec<Tile>> = (0..rows)
        .map(|y| {
            (0..cols)
                .map(|x| Tile::new(x, y, TerrainType::Grass))
                .collect()
        })
        .collect();

    add_water_features(&mut map, rows, cols);
    add_forests(&mut map, rows, cols, rng);
    add_mountains(&mut map, rows, cols);

    Ok(map)
}

/// Column of the river's main channel for a map of the given width.
pub fn river_column(cols: i32) -> i32 {
    (cols as f64 * 0.7).floor() as i32
}

/// Center of the lake for a map of the given dimensions.
pub fn lake_center(rows: i32, cols: i32) -> (i32, i32) {
    ((cols as f64 * 0.3).floor() as i32, (rows as f64 * 0.3).floor() as i32)
}

fn add_water_features(map: &mut [Vec<Tile>], rows: i32, cols: i32) {
    // River from top to bottom, meandering one extra column per row.
    let river_x = river_column(cols);
    for y in 0..rows {
        map[y as usize][river_x as usize].terrain_type = TerrainType::Water;

        let offset = ((y as f64 * 0.5).sin() * 2.0).round() as i32;
        let meander_x = river_x + offset;
        if meander_x >= 0 && meander_x < cols {
            map[y as usize][meander_x as usize].terrain_type = TerrainType::Water;
        }
    }

    // One roughly circular lake.
    let (lake_x, lake_y) = lake_center(rows, cols);
    let lake_size = 3;
    for y in (lake_y - lake_size)..=(lake_y + lake_size) {
        for x in (lake_x - lake_size)..=(lake_x + lake_size) {
            if y >= 0 && y < rows && x >= 0 && x < cols {
                let distance = f64::from((y - lake_y).pow(2) + (x - lake_x).pow(2)).sqrt();
                if distance <= f64::from(lake_size) {
                    map[y as usize][x as usize].terrain_type = TerrainType::Water;
                }
            }
        }
    }
}

fn add_forests<R: Rng>(map: &mut [Vec<Tile>], rows: i32, cols: i32, rng: &mut R) {
    let patches = 5;
    for _ in 0..patches {
        let forest_x = rng.gen_range(0..cols);
        let forest_y = rng.gen_range(0..rows);
        let forest_size = 2 + rng.gen_range(0..3);

        for y in (forest_y - forest_size)..=(forest_y + forest_size) {
            for x in (forest_x - forest_size)..=(forest_x + forest_size) {
                if y < 0 || y >= rows || x < 0 || x >= cols {
                    continue;
                }
                let tile = &mut map[y as usize][x as usize];
                if tile.terrain_type == TerrainType::Water {
                    continue;
                }
                let distance = f64::from((y - forest_y).pow(2) + (x - forest_x).pow(2)).sqrt();
                if distance <= f64::from(forest_size) && rng.gen::<f64>() > 0.3 {
                    tile.terrain_type = TerrainType::Forest;
                }
            }
        }
    }
}

fn add_mountains(map: &mut [Vec<Tile>], rows: i32, cols: i32) {
    let range_start = (cols as f64 * 0.1).floor() as i32;
    let range_width = (cols as f64 * 0.2).floor() as i32;

    for y in 0..rows {
        // The range drifts sideways as it runs north-south.
        let offset = ((y as f64 * 0.2).sin() * 3.0).round() as i32;
        let leading_edge = range_start + offset;

        for x in leading_edge..(range_start + range_width + offset).min(cols) {
            if x < 0 {
                continue;
            }
            let tile = &mut map[y as usize][x as usize];
            if tile.terrain_type == TerrainType::Water {
                continue;
            }
            let noise = (x as f64 * 0.5).sin() * (y as f64 * 0.5).cos() * 0.5 + 0.5;
            if noise > 0.7 || (x == leading_edge && noise > 0.3) {
                tile.terrain_type = TerrainType::Mountain;
            }
        }
    }
}
