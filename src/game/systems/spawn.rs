//! Spawn cell selection
//!
//! Random inner cells are tried until one is not stone and the worm box
//! centered there overlaps no other worm. Long runs of failures turn a stone
//! candidate into brick, and past a hard cap a deterministic scan takes over,
//! so a spawn is always found. The scan only settles for an occupied cell
//! when every inner cell is occupied.

use rand::rngs::StdRng;
use rand::Rng;
use tracing::warn;

use crate::game::body::{boxes_overlap, Extents};
use crate::game::constants::spawn::{MAX_RANDOM_ATTEMPTS, STONE_CONVERSION_ATTEMPT};
use crate::game::state::{GameState, Slot, Worm};
use crate::game::terrain::{Cell, TerrainMap, WallType};

/// Picks a spawn cell for a worm, ignoring the worm in `except` when testing
/// for overlaps. The caller clears the surrounding bricks once the worm is
/// placed.
pub fn find_spawn_cell(state: &mut GameState, except: Option<Slot>) -> Cell {
    let GameState {
        terrain,
        rng,
        worms,
        tables,
        ..
    } = state;
    pick_cell(terrain, rng, worms, tables.worm_extents, except)
}

fn pick_cell(
    terrain: &mut TerrainMap,
    rng: &mut StdRng,
    worms: &[Option<Worm>],
    extents: Extents,
    except: Option<Slot>,
) -> Cell {
    let is_free = |cell: Cell| {
        let position = cell.center();
        !worms.iter().enumerate().any(|(slot, worm)| {
            Some(slot) != except
                && worm
                    .as_ref()
                    .is_some_and(|w| boxes_overlap(position, extents, w.body.position, w.extents))
        })
    };

    let mut attempts = 0;
    while attempts < MAX_RANDOM_ATTEMPTS {
        let cell = Cell::new(
            rng.gen_range(1..terrain.width() - 1),
            rng.gen_range(1..terrain.height() - 1),
        );
        if attempts == STONE_CONVERSION_ATTEMPT && terrain.wall_at_cell(cell) == WallType::Stone {
            terrain.set_wall(cell.x, cell.y, WallType::Brick);
        }
        attempts += 1;

        if terrain.wall_at_cell(cell) != WallType::Stone && is_free(cell) {
            return cell;
        }
    }

    warn!("No random spawn cell after {} attempts, scanning", attempts);
    let grid: &TerrainMap = terrain;
    let open: Vec<Cell> = grid
        .inner_cells()
        .filter(|&cell| grid.wall_at_cell(cell) != WallType::Stone)
        .collect();
    if let Some(&cell) = open.iter().find(|&&cell| is_free(cell)) {
        return cell;
    }

    // Every open cell is taken: break into the first free stone cell
    let fallback = grid
        .inner_cells()
        .find(|&cell| is_free(cell))
        .or(open.first().copied())
        .unwrap_or(Cell::new(1, 1));
    if terrain.wall_at_cell(fallback) == WallType::Stone {
        terrain.set_wall(fallback.x, fallback.y, WallType::Brick);
    }
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::systems::testing::{create_test_state, place_worm};
    use crate::game::terrain::TerrainParams;
    use rand::SeedableRng;

    fn fill_with_stone(state: &mut GameState) {
        for cell in state.terrain.inner_cells().collect::<Vec<_>>() {
            state.terrain.set_wall(cell.x, cell.y, WallType::Stone);
        }
    }

    #[test]
    fn test_spawn_is_inner_and_open() {
        let mut state = create_test_state();
        for _ in 0..50 {
            let cell = find_spawn_cell(&mut state, None);
            assert!(cell.x >= 1 && cell.x < state.terrain.width() - 1);
            assert!(cell.y >= 1 && cell.y < state.terrain.height() - 1);
            assert_ne!(state.terrain.wall_at_cell(cell), WallType::Stone);
        }
    }

    #[test]
    fn test_spawn_avoids_other_worms() {
        let mut state = create_test_state();
        for slot in 0..3 {
            let cell = find_spawn_cell(&mut state, None);
            place_worm(&mut state, slot, cell.center());
        }
        let extents = state.tables.worm_extents;
        let cell = find_spawn_cell(&mut state, None);
        assert!(state.worm_hit(cell.center(), extents, None).is_none());
    }

    #[test]
    fn test_spawn_ignores_excepted_worm() {
        let mut state = GameState::new(
            TerrainMap::open(&TerrainParams {
                width: 3,
                height: 3,
                wall_percent: 0,
                stone_percent: 0,
                water_percent: 0,
            }),
            Default::default(),
            Default::default(),
            2,
            StdRng::seed_from_u64(5),
        );
        // A 4x3 grid has two inner cells; occupy both
        place_worm(&mut state, 0, Cell::new(1, 1).center());
        place_worm(&mut state, 1, Cell::new(2, 1).center());
        let cell = find_spawn_cell(&mut state, Some(1));
        assert_eq!(cell, Cell::new(2, 1));
    }

    #[test]
    fn test_all_stone_map_converts_a_cell() {
        let mut state = create_test_state();
        fill_with_stone(&mut state);
        let cell = find_spawn_cell(&mut state, None);
        assert_eq!(state.terrain.wall_at_cell(cell), WallType::Brick);
    }

    #[test]
    fn test_crowded_map_still_terminates() {
        let mut state = create_test_state();
        fill_with_stone(&mut state);
        state.terrain.set_wall(3, 3, WallType::Empty);
        place_worm(&mut state, 0, Cell::new(3, 3).center());
        // The only open cell is occupied; the stone conversion or the scan
        // fallback still yields a free cell
        let cell = find_spawn_cell(&mut state, None);
        assert_ne!(state.terrain.wall_at_cell(cell), WallType::Stone);
        let extents = state.tables.worm_extents;
        assert!(state.worm_hit(cell.center(), extents, None).is_none());
    }

    #[test]
    fn test_spawn_is_seeded() {
        let mut a = create_test_state();
        let mut b = create_test_state();
        let first: Vec<Cell> = (0..5).map(|_| find_spawn_cell(&mut a, None)).collect();
        let second: Vec<Cell> = (0..5).map(|_| find_spawn_cell(&mut b, None)).collect();
        assert_eq!(first, second);
    }
}
