//! Unit tests for tv-agent: the state machine driven serially.

use std::sync::Arc;

use tv_core::{AgentId, AgentRng, Color, Direction, Orientation, Position, ReversalPolicy};
use tv_grid::{CellState, World};

use crate::{BlockReason, MovePolicy, Phase, Segment, StepOutcome, Traveler, TravelerTask};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn pos(row: u32, col: u32) -> Position {
    Position::new(row, col)
}

/// Place a traveler whose body covers `cells` (head first) and wrap it in a task.
fn place(world: &World, id: u32, cells: &[Position], facing: Direction, policy: MovePolicy) -> TravelerTask {
    let agent = AgentId(id);
    let body: Vec<Segment> = cells
        .iter()
        .map(|&p| {
            let prior = world.grid.lock_cell(p).unwrap().try_occupy(agent);
            assert_eq!(prior, CellState::Free, "test layout overlaps at {p}");
            Segment::new(p, facing)
        })
        .collect();
    let traveler = Arc::new(Traveler::new(agent, Color::default(), body));
    TravelerTask::new(traveler, AgentRng::new(7, agent), policy)
}

fn occupied_by(world: &World, id: u32) -> usize {
    world.grid.count_where(|c| c == CellState::Traveler(AgentId(id)))
}

/// Step until `pred` accepts an outcome; panics after 1,000 tries.
fn step_until(task: &mut TravelerTask, world: &World, pred: impl Fn(StepOutcome) -> bool) -> StepOutcome {
    for _ in 0..1_000 {
        let outcome = task.step(world).unwrap();
        if pred(outcome) {
            return outcome;
        }
    }
    panic!("outcome never observed");
}

fn is_contiguous(body: &[Segment]) -> bool {
    body.windows(2).all(|w| w[0].position.is_adjacent(w[1].position))
}

// ── Policy ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod policy_tests {
    use super::*;

    #[test]
    fn forbid_never_reverses() {
        let policy = MovePolicy { reversal: ReversalPolicy::Forbid, growth_interval: 0 };
        let mut rng = AgentRng::new(1, AgentId(0));
        for _ in 0..500 {
            assert_ne!(policy.choose_direction(Direction::North, &mut rng), Direction::South);
        }
    }

    #[test]
    fn growth_schedule() {
        let never = MovePolicy::default();
        assert!(!never.grows_on(1));
        let every_third = MovePolicy { growth_interval: 3, ..MovePolicy::default() };
        assert!(!every_third.grows_on(2));
        assert!(every_third.grows_on(3));
        assert!(every_third.grows_on(6));
    }
}

// ── Wandering ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod wander_tests {
    use super::*;

    #[test]
    fn boxed_in_traveler_never_moves() {
        let world = World::new(3, 3);
        world.place_wall(pos(1, 0)).unwrap();
        world.place_wall(pos(0, 1)).unwrap();
        let mut task = place(&world, 0, &[pos(0, 0)], Direction::East, MovePolicy::default());

        for _ in 0..100 {
            match task.step(&world).unwrap() {
                StepOutcome::Blocked(BlockReason::Edge | BlockReason::Wall) => {}
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(task.moves(), 0);
        assert_eq!(task.iterations(), 100);
        assert_eq!(task.traveler().head().unwrap().position, pos(0, 0));
    }

    #[test]
    fn single_segment_move_frees_old_cell() {
        let world = World::new(4, 4);
        let mut task = place(&world, 3, &[pos(1, 1)], Direction::North, MovePolicy::default());
        let StepOutcome::Moved { to, facing, pushed, grew } =
            step_until(&mut task, &world, |o| matches!(o, StepOutcome::Moved { .. }))
        else {
            unreachable!()
        };

        assert!(to.is_adjacent(pos(1, 1)));
        assert_eq!(pushed, None);
        assert!(!grew);
        let head = task.traveler().head().unwrap();
        assert_eq!(head, Segment::new(to, facing));

        let snap = world.grid.snapshot();
        assert_eq!(snap.get(pos(1, 1)), Some(CellState::Free));
        assert_eq!(snap.get(to), Some(CellState::Traveler(AgentId(3))));
    }

    #[test]
    fn body_follows_head_and_stays_contiguous() {
        let world = World::new(8, 8);
        let mut task = place(
            &world,
            1,
            &[pos(4, 4), pos(4, 5), pos(4, 6)],
            Direction::West,
            MovePolicy::default(),
        );

        for _ in 0..300 {
            task.step(&world).unwrap();
            let snap = task.traveler().snapshot();
            assert_eq!(snap.segments.len(), 3);
            assert!(is_contiguous(&snap.segments), "body split: {:?}", snap.segments);
        }
        assert_eq!(occupied_by(&world, 1), 3);
        assert!(task.moves() > 0);
    }

    #[test]
    fn cannot_step_onto_own_body() {
        // Corridor one row high: the only open neighbour is the traveler's own second segment.
        let world = World::new(3, 4);
        for col in 0..4 {
            world.place_wall(pos(0, col)).unwrap();
            world.place_wall(pos(2, col)).unwrap();
        }
        let mut task = place(&world, 0, &[pos(1, 0), pos(1, 1)], Direction::West, MovePolicy::default());
        for _ in 0..50 {
            match task.step(&world).unwrap() {
                StepOutcome::Blocked(BlockReason::Edge | BlockReason::Wall | BlockReason::Occupied) => {}
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn growth_keeps_vacated_tail() {
        let world = World::new(10, 10);
        let policy = MovePolicy { growth_interval: 1, ..MovePolicy::default() };
        let mut task = place(&world, 2, &[pos(5, 5)], Direction::North, policy);

        for _ in 0..40 {
            task.step(&world).unwrap();
            let len = task.traveler().len();
            assert_eq!(len as u64, 1 + task.moves());
            assert_eq!(occupied_by(&world, 2), len);
        }
    }

    #[test]
    fn pushes_partition_out_of_the_way() {
        // Traveler at (2,1) can only go east, into a one-block vertical partition.
        let mut world = World::new(5, 5);
        let pid = world
            .partitions
            .register(&world.grid, Orientation::Vertical, pos(2, 2), 1)
            .unwrap();
        for wall in [pos(3, 1), pos(1, 1), pos(2, 0)] {
            world.place_wall(wall).unwrap();
        }
        let mut task = place(&world, 0, &[pos(2, 1)], Direction::East, MovePolicy::default());

        let outcome = step_until(&mut task, &world, |o| matches!(o, StepOutcome::Moved { .. }));
        assert_eq!(
            outcome,
            StepOutcome::Moved { to: pos(2, 2), facing: Direction::East, pushed: Some(pid), grew: false }
        );
        let snap = world.grid.snapshot();
        assert_eq!(snap.get(pos(2, 3)), Some(CellState::VerticalPartition(pid)));
        assert_eq!(snap.get(pos(2, 2)), Some(CellState::Traveler(AgentId(0))));
        assert_eq!(snap.get(pos(2, 1)), Some(CellState::Free));
        assert!(world.partitions.is_consistent_with(&world.grid));
    }

    #[test]
    fn stuck_partition_blocks() {
        let mut world = World::new(5, 5);
        world
            .partitions
            .register(&world.grid, Orientation::Vertical, pos(2, 2), 1)
            .unwrap();
        for wall in [pos(3, 1), pos(1, 1), pos(2, 0), pos(2, 3)] {
            world.place_wall(wall).unwrap();
        }
        let mut task = place(&world, 0, &[pos(2, 1)], Direction::East, MovePolicy::default());
        let outcome = step_until(&mut task, &world, |o| {
            o == StepOutcome::Blocked(BlockReason::Partition)
        });
        assert_eq!(outcome, StepOutcome::Blocked(BlockReason::Partition));
        assert_eq!(task.moves(), 0);
    }
}

// ── Exit protocol ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod exit_tests {
    use super::*;

    #[test]
    fn exit_clears_every_segment_once() {
        // Head at (1,1); exit north, walls south and west, own body east.
        let mut world = World::new(3, 5);
        world.place_exit(pos(2, 1)).unwrap();
        world.place_wall(pos(0, 1)).unwrap();
        world.place_wall(pos(1, 0)).unwrap();
        let body = [pos(1, 1), pos(1, 2), pos(1, 3)];
        let mut task = place(&world, 4, &body, Direction::West, MovePolicy::default());

        step_until(&mut task, &world, |o| o == StepOutcome::ReachedExit);
        assert_eq!(task.phase(), Phase::Exiting);

        let cleared: Vec<Position> = (0..3)
            .map(|_| task.step(&world).unwrap().cleared().expect("exit step clears a cell"))
            .collect();
        assert_eq!(cleared, vec![pos(1, 3), pos(1, 2), pos(1, 1)]);
        assert_eq!(task.phase(), Phase::Done);
        assert!(task.traveler().is_empty());
        assert_eq!(occupied_by(&world, 4), 0);
        assert_eq!(world.grid.snapshot().get(pos(2, 1)), Some(CellState::Exit));

        assert_eq!(task.step(&world).unwrap(), StepOutcome::Idle);
    }

    #[test]
    fn single_segment_finishes_in_one_step() {
        let mut world = World::new(3, 3);
        world.place_exit(pos(1, 2)).unwrap();
        for wall in [pos(0, 1), pos(2, 1), pos(1, 0)] {
            world.place_wall(wall).unwrap();
        }
        let mut task = place(&world, 0, &[pos(1, 1)], Direction::East, MovePolicy::default());
        step_until(&mut task, &world, |o| o == StepOutcome::ReachedExit);
        assert_eq!(task.step(&world).unwrap(), StepOutcome::Finished(pos(1, 1)));
        assert_eq!(world.grid.count_where(CellState::is_free), 5);
    }
}
