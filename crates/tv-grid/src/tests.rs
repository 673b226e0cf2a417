//! Unit tests for tv-grid.

use tv_core::{AgentId, Direction, Orientation, PartitionId, Position};

use crate::{CellState, Grid, GridError, World};

fn pos(row: u32, col: u32) -> Position {
    Position::new(row, col)
}

// ── Grid locking ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod grid_tests {
    use super::*;

    #[test]
    fn new_grid_is_all_free() {
        let grid = Grid::new(4, 6);
        assert_eq!(grid.count_where(CellState::is_free), 24);
        assert_eq!(grid.free_cells().len(), 24);
    }

    #[test]
    fn lock_cell_set_and_read() {
        let grid = Grid::new(3, 3);
        grid.lock_cell(pos(1, 2)).unwrap().set(CellState::Wall);
        assert_eq!(grid.lock_cell(pos(1, 2)).unwrap().state(), CellState::Wall);
        assert_eq!(grid.snapshot().get(pos(1, 2)), Some(CellState::Wall));
    }

    #[test]
    fn lock_out_of_bounds_is_an_error() {
        let grid = Grid::new(3, 3);
        assert!(matches!(grid.lock_cell(pos(3, 0)), Err(GridError::OutOfBounds { .. })));
        assert!(grid.lock_cells([pos(0, 0), pos(0, 3)]).is_err());
        // The in-bounds cell must not stay locked after the failed set.
        assert!(grid.lock_cell(pos(0, 0)).is_ok());
    }

    #[test]
    fn try_occupy_only_takes_free_cells() {
        let grid = Grid::new(3, 3);
        let mut cell = grid.lock_cell(pos(0, 0)).unwrap();
        assert_eq!(cell.try_occupy(AgentId(1)), CellState::Free);
        assert_eq!(cell.state(), CellState::Traveler(AgentId(1)));
        assert_eq!(cell.try_occupy(AgentId(2)), CellState::Traveler(AgentId(1)));
        assert_eq!(cell.state(), CellState::Traveler(AgentId(1)));
    }

    #[test]
    fn lock_cells_dedups_and_sorts() {
        let grid = Grid::new(5, 5);
        let set = grid.lock_cells([pos(3, 1), pos(0, 4), pos(3, 1), pos(0, 2)]).unwrap();
        let order: Vec<Position> = set.positions().collect();
        assert_eq!(order, vec![pos(0, 2), pos(0, 4), pos(3, 1)]);
    }

    #[test]
    fn cell_set_rejects_unlocked_positions() {
        let grid = Grid::new(3, 3);
        let mut set = grid.lock_cells([pos(0, 0), pos(0, 1)]).unwrap();
        assert!(matches!(set.state(pos(2, 2)), Err(GridError::NotLocked(_))));
        assert!(set.set(pos(2, 2), CellState::Wall).is_err());
        set.set(pos(0, 1), CellState::Wall).unwrap();
        drop(set);
        assert_eq!(grid.snapshot().get(pos(0, 1)), Some(CellState::Wall));
    }

    #[test]
    fn opposite_order_requests_do_not_deadlock() {
        use std::sync::{Arc, Barrier};
        use std::thread;

        let grid = Arc::new(Grid::new(2, 2));
        let barrier = Arc::new(Barrier::new(2));
        let handles: Vec<_> = [[pos(0, 0), pos(1, 1)], [pos(1, 1), pos(0, 0)]]
            .into_iter()
            .map(|cells| {
                let grid = Arc::clone(&grid);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for _ in 0..20_000 {
                        let mut set = grid.lock_cells(cells).unwrap();
                        let a = set.state(cells[0]).unwrap();
                        let b = set.state(cells[1]).unwrap();
                        set.set(cells[0], b).unwrap();
                        set.set(cells[1], a).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().expect("locking thread panicked");
        }
    }

    proptest::proptest! {
        #[test]
        fn lock_cells_order_is_strictly_row_major(
            cells in proptest::collection::vec((0u32..8, 0u32..8), 0..20)
        ) {
            let grid = Grid::new(8, 8);
            let set = grid.lock_cells(cells.iter().map(|&(r, c)| pos(r, c))).unwrap();
            let order: Vec<Position> = set.positions().collect();
            proptest::prop_assert!(order.windows(2).all(|w| w[0] < w[1]));
            for &(r, c) in &cells {
                proptest::prop_assert!(order.contains(&pos(r, c)));
            }
        }
    }
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod snapshot_tests {
    use super::*;

    #[test]
    fn rows_and_lookup() {
        let grid = Grid::new(2, 3);
        grid.lock_cell(pos(1, 0)).unwrap().set(CellState::Exit);
        let snap = grid.snapshot();
        assert_eq!((snap.rows(), snap.cols()), (2, 3));
        assert_eq!(snap.row(1).unwrap()[0], CellState::Exit);
        assert_eq!(snap.row(0), Some(&[CellState::Free; 3][..]));
        assert_eq!(snap.row(2), None);
        assert_eq!(snap.count(|c| c == CellState::Exit), 1);
        assert_eq!(snap.get(pos(2, 0)), None);
    }

    #[test]
    fn snapshot_is_detached() {
        let grid = Grid::new(2, 2);
        let before = grid.snapshot();
        grid.lock_cell(pos(0, 0)).unwrap().set(CellState::Wall);
        assert_eq!(before.get(pos(0, 0)), Some(CellState::Free));
    }
}

// ── Partitions ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod partition_tests {
    use super::*;

    #[test]
    fn register_lays_blocks() {
        let mut world = World::new(5, 5);
        let id = world
            .partitions
            .register(&world.grid, Orientation::Vertical, pos(1, 2), 3)
            .unwrap();
        let part = world.partitions.get(id).unwrap();
        assert_eq!(part.blocks, vec![pos(1, 2), pos(2, 2), pos(3, 2)]);
        assert_eq!(world.grid.count_where(|c| c == CellState::VerticalPartition(id)), 3);
        assert!(world.partitions.is_consistent_with(&world.grid));
    }

    #[test]
    fn register_rejects_overlap_and_overflow() {
        let mut world = World::new(5, 5);
        world.place_wall(pos(0, 3)).unwrap();
        let err = world.partitions.register(&world.grid, Orientation::Horizontal, pos(0, 1), 3);
        assert!(matches!(err, Err(GridError::NotFree { .. })));
        let err = world.partitions.register(&world.grid, Orientation::Horizontal, pos(2, 3), 3);
        assert!(matches!(err, Err(GridError::OutOfBounds { .. })));
        assert!(world.partitions.is_empty());
        assert_eq!(world.grid.count_where(CellState::is_free), 24);
    }

    #[test]
    fn slide_perpendicular_into_free_cells() {
        let mut world = World::new(5, 5);
        let id = world
            .partitions
            .register(&world.grid, Orientation::Vertical, pos(2, 2), 1)
            .unwrap();
        assert!(world.slide(id, Direction::East).unwrap());
        let snap = world.grid.snapshot();
        assert_eq!(snap.get(pos(2, 3)), Some(CellState::VerticalPartition(id)));
        assert_eq!(snap.get(pos(2, 2)), Some(CellState::Free));
        assert_eq!(world.partitions.get(id).unwrap().blocks, vec![pos(2, 3)]);
    }

    #[test]
    fn slide_blocked_leaves_grid_untouched() {
        let mut world = World::new(5, 5);
        let id = world
            .partitions
            .register(&world.grid, Orientation::Vertical, pos(1, 2), 3)
            .unwrap();
        world.place_wall(pos(3, 3)).unwrap();
        let before = world.grid.snapshot();
        assert!(!world.slide(id, Direction::East).unwrap());
        assert_eq!(world.grid.snapshot(), before);
    }

    #[test]
    fn slide_along_own_axis_is_blocked_by_itself() {
        let mut world = World::new(6, 6);
        let id = world
            .partitions
            .register(&world.grid, Orientation::Horizontal, pos(2, 1), 3)
            .unwrap();
        assert!(!world.slide(id, Direction::East).unwrap());
        assert!(!world.slide(id, Direction::West).unwrap());
        assert!(world.slide(id, Direction::North).unwrap());
        assert_eq!(world.partitions.get(id).unwrap().blocks, vec![pos(3, 1), pos(3, 2), pos(3, 3)]);
    }

    #[test]
    fn slide_off_the_edge_fails() {
        let mut world = World::new(4, 4);
        let id = world
            .partitions
            .register(&world.grid, Orientation::Vertical, pos(0, 3), 2)
            .unwrap();
        assert!(!world.slide(id, Direction::East).unwrap());
        assert!(world.partitions.is_consistent_with(&world.grid));
    }

    #[test]
    fn unknown_partition_is_an_error() {
        let world = World::new(4, 4);
        assert!(matches!(
            world.slide(PartitionId(9), Direction::North),
            Err(GridError::UnknownPartition(_))
        ));
    }

    #[test]
    fn concurrent_slides_on_neighbouring_partitions_stay_consistent() {
        use std::sync::{Arc, Barrier};
        use std::thread;

        // Two vertical partitions one column apart fight over the same gap.
        let mut world = World::new(6, 7);
        let a = world.partitions.register(&world.grid, Orientation::Vertical, pos(1, 2), 3).unwrap();
        let b = world.partitions.register(&world.grid, Orientation::Vertical, pos(2, 4), 3).unwrap();
        let world = Arc::new(world);
        let barrier = Arc::new(Barrier::new(4));

        let handles: Vec<_> = [(a, 0u64), (a, 1), (b, 2), (b, 3)]
            .into_iter()
            .map(|(id, salt)| {
                let world = Arc::clone(&world);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for i in 0..5_000u64 {
                        let dir = Direction::ALL[((i * 7 + salt) % 4) as usize];
                        world.slide(id, dir).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().expect("slide thread panicked");
        }

        assert!(world.partitions.is_consistent_with(&world.grid));
        assert_eq!(world.grid.count_where(|c| c.partition().is_some()), 6);
    }
}

// ── World ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod world_tests {
    use super::*;

    #[test]
    fn exit_can_be_moved() {
        let mut world = World::new(3, 3);
        world.place_exit(pos(0, 0)).unwrap();
        world.place_exit(pos(2, 2)).unwrap();
        assert_eq!(world.exit(), Some(pos(2, 2)));
        assert_eq!(world.grid.count_where(|c| c == CellState::Exit), 1);
    }

    #[test]
    fn wall_on_occupied_cell_fails() {
        let world = World::new(3, 3);
        world.place_wall(pos(1, 1)).unwrap();
        assert!(world.place_wall(pos(1, 1)).is_err());
    }
}
