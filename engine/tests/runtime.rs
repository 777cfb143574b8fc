use gridbot_core::{
    AnimationHint, BlockKind, Direction, GridPos, Instruction, InstructionId, Level, Pose,
    RunStatus, StepSnapshot, Tile,
};
use gridbot_engine::Runtime;

fn grid(rows: &[&str]) -> Vec<Vec<Tile>> {
    rows.iter()
        .map(|row| {
            row.chars()
                .map(|cell| match cell {
                    '.' => Tile::Empty,
                    '#' => Tile::Wall,
                    'S' => Tile::Start,
                    'F' => Tile::End,
                    '*' => Tile::Star,
                    'O' => Tile::Hole,
                    'K' => Tile::Key,
                    'D' => Tile::Door,
                    other => panic!("unknown tile glyph {other:?}"),
                })
                .collect()
        })
        .collect()
}

fn level(rows: &[&str], start: Pose, min_stars: u32) -> Level {
    Level {
        id: 0,
        name: "fixture".to_owned(),
        tutorial: None,
        grid: grid(rows),
        start,
        palette: vec![BlockKind::MoveForward],
        min_stars,
        best_block_count: 0,
    }
}

fn id(value: u32) -> InstructionId {
    InstructionId::new(value)
}

fn start_at(x: i32, y: i32, facing: Direction) -> Pose {
    Pose::new(GridPos::new(x, y), facing)
}

fn run_until_terminal(runtime: &mut Runtime, cap: usize) -> Vec<StepSnapshot> {
    let mut snapshots = Vec::new();
    for _ in 0..cap {
        let snapshot = runtime.step();
        let terminal = snapshot.status.is_terminal();
        snapshots.push(snapshot);
        if terminal {
            return snapshots;
        }
    }
    panic!("run did not reach a terminal status within {cap} steps");
}

#[test]
fn two_moves_down_the_corridor_complete_the_run() {
    let level = level(
        &["#####", "#S.F#", "#####"],
        start_at(1, 1, Direction::Right),
        0,
    );
    let program = vec![
        Instruction::move_forward(id(1)),
        Instruction::move_forward(id(2)),
    ];
    let mut runtime = Runtime::new(program, level, start_at(1, 1, Direction::Right));

    let first = runtime.step();
    assert_eq!(first.pose.position(), GridPos::new(2, 1));
    assert_eq!(first.status, RunStatus::Running);

    let second = runtime.step();
    assert_eq!(second.pose.position(), GridPos::new(3, 1));
    assert_eq!(second.pose.facing(), Direction::Right);
    assert_eq!(second.status, RunStatus::Completed);
}

#[test]
fn moving_into_a_wall_is_recoverable() {
    let level = level(
        &["####", "#S.#", "####"],
        start_at(1, 1, Direction::Up),
        0,
    );
    let program = vec![
        Instruction::move_forward(id(1)),
        Instruction::turn_right(id(2)),
    ];
    let mut runtime = Runtime::new(program, level, start_at(1, 1, Direction::Up));

    let blocked = runtime.step();
    assert_eq!(blocked.pose.position(), GridPos::new(1, 1));
    assert_eq!(blocked.status, RunStatus::Running);
    assert_eq!(blocked.pose.animation(), AnimationHint::Denied);
    assert!(blocked.message.as_deref().is_some_and(|m| !m.is_empty()));

    // The run keeps executing after the rejection.
    let turned = runtime.step();
    assert_eq!(turned.active_instruction, Some(id(2)));
    assert_eq!(turned.status, RunStatus::Running);
}

#[test]
fn moving_off_the_grid_is_blocked_like_a_wall() {
    let level = level(&["S."], start_at(0, 0, Direction::Left), 0);
    let program = vec![Instruction::move_forward(id(1))];
    let mut runtime = Runtime::new(program, level, start_at(0, 0, Direction::Left));

    let blocked = runtime.step();
    assert_eq!(blocked.pose.position(), GridPos::new(0, 0));
    assert_eq!(blocked.status, RunStatus::Running);
    assert_eq!(blocked.pose.animation(), AnimationHint::Denied);
}

#[test]
fn moving_onto_a_hole_fails_at_the_hole_cell() {
    let level = level(
        &["#####", "#SO.#", "#####"],
        start_at(1, 1, Direction::Right),
        0,
    );
    let program = vec![Instruction::move_forward(id(1))];
    let mut runtime = Runtime::new(program, level, start_at(1, 1, Direction::Right));

    let snapshot = runtime.step();
    assert_eq!(snapshot.pose.position(), GridPos::new(2, 1));
    assert_eq!(snapshot.status, RunStatus::Failed);
    assert!(snapshot.message.is_some());
}

#[test]
fn star_collection_is_idempotent() {
    let level = level(
        &["#####", "#S*.#", "#####"],
        start_at(1, 1, Direction::Right),
        0,
    );
    // Walk onto the star, back off, and walk onto it again.
    let program = vec![
        Instruction::move_forward(id(1)),
        Instruction::turn_left(id(2)),
        Instruction::turn_left(id(3)),
        Instruction::move_forward(id(4)),
        Instruction::turn_left(id(5)),
        Instruction::turn_left(id(6)),
        Instruction::move_forward(id(7)),
    ];
    let mut runtime = Runtime::new(program, level, start_at(1, 1, Direction::Right));

    let snapshots = run_until_terminal(&mut runtime, 16);
    let last = snapshots.last().expect("at least one step");
    assert_eq!(last.collected_stars, vec!["2,1".to_owned()]);
}

#[test]
fn collecting_any_key_opens_every_door() {
    let level = level(
        &["########", "#SKD.DF#", "########"],
        start_at(1, 1, Direction::Right),
        0,
    );
    let program = (1..=5).map(|n| Instruction::move_forward(id(n))).collect();
    let mut runtime = Runtime::new(program, level, start_at(1, 1, Direction::Right));

    let picked_up = runtime.step();
    assert_eq!(picked_up.collected_keys, vec!["2,1".to_owned()]);
    assert_eq!(
        picked_up.opened_doors,
        vec!["3,1".to_owned(), "5,1".to_owned()],
        "one key opens every door in the level",
    );

    let snapshots = run_until_terminal(&mut runtime, 8);
    assert_eq!(snapshots.last().expect("steps").status, RunStatus::Completed);
}

#[test]
fn locked_door_rejects_movement_until_a_key_exists() {
    let level = level(
        &["#####", "#SD.#", "#####"],
        start_at(1, 1, Direction::Right),
        0,
    );
    let program = vec![Instruction::move_forward(id(1))];
    let mut runtime = Runtime::new(program, level, start_at(1, 1, Direction::Right));

    let blocked = runtime.step();
    assert_eq!(blocked.pose.position(), GridPos::new(1, 1));
    assert_eq!(blocked.status, RunStatus::Running);
    assert_eq!(blocked.pose.animation(), AnimationHint::Denied);
    assert!(blocked.opened_doors.is_empty());
}

#[test]
fn repeat_loop_advances_exactly_n_cells() {
    let count = 4;
    let level = level(
        &["#######", "#S....#", "#######"],
        start_at(1, 1, Direction::Right),
        0,
    );
    let program = vec![Instruction::repeat(
        id(1),
        count,
        vec![Instruction::move_forward(id(2))],
    )];
    let mut runtime = Runtime::new(program, level, start_at(1, 1, Direction::Right));

    let snapshots = run_until_terminal(&mut runtime, 16);
    let touched: Vec<_> = snapshots
        .iter()
        .filter_map(|snapshot| snapshot.active_instruction)
        .collect();

    // One loop-entry report plus one report per body execution; loop-exit
    // bookkeeping never surfaces as its own step.
    let mut expected = vec![id(1)];
    expected.extend(std::iter::repeat(id(2)).take(count as usize));
    assert_eq!(touched, expected);

    let last = snapshots.last().expect("steps");
    assert_eq!(last.pose.position(), GridPos::new(1 + count as i32, 1));
    assert_eq!(last.status, RunStatus::Failed, "no flag on this corridor");
}

#[test]
fn while_path_clear_stops_at_the_wall_without_a_rejection() {
    let level = level(
        &["######", "#S...#", "######"],
        start_at(1, 1, Direction::Right),
        0,
    );
    let program = vec![Instruction::while_path_clear(
        id(1),
        vec![Instruction::move_forward(id(2))],
    )];
    let mut runtime = Runtime::new(program, level, start_at(1, 1, Direction::Right));

    let snapshots = run_until_terminal(&mut runtime, 16);
    let moves = snapshots
        .iter()
        .filter(|snapshot| snapshot.active_instruction == Some(id(2)))
        .count();
    assert_eq!(moves, 3, "three clear cells before the wall");
    assert!(
        snapshots
            .iter()
            .all(|snapshot| snapshot.pose.animation() == AnimationHint::Idle),
        "the guard prevents ever attempting a blocked move",
    );
    assert_eq!(
        snapshots.last().expect("steps").pose.position(),
        GridPos::new(4, 1)
    );
}

#[test]
fn while_path_clear_skips_a_locked_door() {
    let level = level(
        &["#####", "#SD.#", "#####"],
        start_at(1, 1, Direction::Right),
        0,
    );
    let program = vec![Instruction::while_path_clear(
        id(1),
        vec![Instruction::move_forward(id(2))],
    )];
    let mut runtime = Runtime::new(program, level, start_at(1, 1, Direction::Right));

    let snapshots = run_until_terminal(&mut runtime, 8);
    assert!(snapshots
        .iter()
        .all(|snapshot| snapshot.active_instruction != Some(id(2))));
    assert_eq!(
        snapshots.last().expect("steps").pose.position(),
        GridPos::new(1, 1)
    );
}

#[test]
fn reaching_the_flag_short_of_stars_fails_with_the_deficit() {
    let level = level(
        &["#####", "#S*F#", "#####"],
        start_at(1, 1, Direction::Right),
        2,
    );
    let program = vec![
        Instruction::move_forward(id(1)),
        Instruction::move_forward(id(2)),
    ];
    let mut runtime = Runtime::new(program, level, start_at(1, 1, Direction::Right));

    let _ = runtime.step();
    let arrival = runtime.step();
    assert_eq!(arrival.status, RunStatus::Failed);
    assert_eq!(
        arrival.message.as_deref(),
        Some("Need 2 stars, only found 1.")
    );
}

#[test]
fn jump_clears_a_hole_without_touching_it() {
    let level = level(
        &["######", "#SO.F#", "######"],
        start_at(1, 1, Direction::Right),
        0,
    );
    let program = vec![
        Instruction::jump(id(1)),
        Instruction::move_forward(id(2)),
    ];
    let mut runtime = Runtime::new(program, level, start_at(1, 1, Direction::Right));

    let jumped = runtime.step();
    assert_eq!(jumped.pose.position(), GridPos::new(3, 1));
    assert_eq!(jumped.status, RunStatus::Running);

    let arrived = runtime.step();
    assert_eq!(arrived.status, RunStatus::Completed);
}

#[test]
fn jump_never_applies_the_mid_cell_effects() {
    let level = level(
        &["######", "#S*.F#", "######"],
        start_at(1, 1, Direction::Right),
        0,
    );
    let program = vec![
        Instruction::jump(id(1)),
        Instruction::move_forward(id(2)),
    ];
    let mut runtime = Runtime::new(program, level, start_at(1, 1, Direction::Right));

    let jumped = runtime.step();
    assert_eq!(jumped.pose.position(), GridPos::new(3, 1));
    assert!(
        jumped.collected_stars.is_empty(),
        "the star jumped over is never collected",
    );

    let arrived = runtime.step();
    assert_eq!(arrived.status, RunStatus::Completed);
    assert!(arrived.collected_stars.is_empty());
}

#[test]
fn jump_is_rejected_by_obstacles() {
    // A wall one cell ahead blocks the jump even though the agent never
    // stands there.
    let over_wall = level(
        &["#####", "#S#.#", "#####"],
        start_at(1, 1, Direction::Right),
        0,
    );
    let mut runtime = Runtime::new(
        vec![Instruction::jump(id(1))],
        over_wall,
        start_at(1, 1, Direction::Right),
    );
    let blocked = runtime.step();
    assert_eq!(blocked.pose.position(), GridPos::new(1, 1));
    assert_eq!(blocked.status, RunStatus::Running);
    assert_eq!(blocked.pose.animation(), AnimationHint::Denied);

    // A wall at the landing cell rejects as well.
    let into_wall = level(
        &["#####", "#S.##", "#####"],
        start_at(1, 1, Direction::Right),
        0,
    );
    let mut runtime = Runtime::new(
        vec![Instruction::jump(id(1))],
        into_wall,
        start_at(1, 1, Direction::Right),
    );
    let blocked = runtime.step();
    assert_eq!(blocked.pose.position(), GridPos::new(1, 1));
    assert_eq!(blocked.status, RunStatus::Running);

    // A locked door one cell ahead rejects; the run continues either way.
    let over_door = level(
        &["#####", "#SD.#", "#####"],
        start_at(1, 1, Direction::Right),
        0,
    );
    let mut runtime = Runtime::new(
        vec![Instruction::jump(id(1))],
        over_door,
        start_at(1, 1, Direction::Right),
    );
    let blocked = runtime.step();
    assert_eq!(blocked.status, RunStatus::Running);
    assert_eq!(blocked.pose.position(), GridPos::new(1, 1));
}

#[test]
fn jump_lands_on_a_locked_door() {
    // Only the mid-cell consults door state; a locked door at the landing
    // cell is stood on like floor.
    let level = level(
        &["#####", "#S.D#", "#####"],
        start_at(1, 1, Direction::Right),
        0,
    );
    let program = vec![Instruction::jump(id(1))];
    let mut runtime = Runtime::new(program, level, start_at(1, 1, Direction::Right));

    let snapshot = runtime.step();
    assert_eq!(snapshot.pose.position(), GridPos::new(3, 1));
    assert_eq!(snapshot.status, RunStatus::Running);
    assert_eq!(snapshot.pose.animation(), AnimationHint::Idle);
    assert!(snapshot.opened_doors.is_empty());
}

#[test]
fn jump_onto_a_hole_fails() {
    let level = level(
        &["#####", "#S.O#", "#####"],
        start_at(1, 1, Direction::Right),
        0,
    );
    let program = vec![Instruction::jump(id(1))];
    let mut runtime = Runtime::new(program, level, start_at(1, 1, Direction::Right));

    let snapshot = runtime.step();
    assert_eq!(snapshot.pose.position(), GridPos::new(3, 1));
    assert_eq!(snapshot.status, RunStatus::Failed);
}

#[test]
fn if_facing_wall_branches_only_when_blocked() {
    let level = level(
        &["#####", "#S.F#", "#####"],
        start_at(1, 1, Direction::Up),
        0,
    );
    let program = vec![
        Instruction::if_facing_wall(id(1), vec![Instruction::turn_right(id(2))]),
        Instruction::if_facing_wall(id(3), vec![Instruction::turn_left(id(4))]),
        Instruction::move_forward(id(5)),
        Instruction::move_forward(id(6)),
    ];
    let mut runtime = Runtime::new(program, level, start_at(1, 1, Direction::Up));

    let snapshots = run_until_terminal(&mut runtime, 16);
    let touched: Vec<_> = snapshots
        .iter()
        .filter_map(|snapshot| snapshot.active_instruction)
        .collect();
    // Facing the wall above: the first conditional fires and turns right.
    // Facing the open corridor afterwards: the second conditional skips.
    assert_eq!(touched, vec![id(1), id(2), id(3), id(5), id(6)]);
    assert_eq!(snapshots.last().expect("steps").status, RunStatus::Completed);
}

#[test]
fn if_on_star_sees_only_uncollected_stars() {
    // Arrival collects the star, so the conditional right after the move
    // must not fire.
    let level = level(
        &["#####", "#S*F#", "#####"],
        start_at(1, 1, Direction::Right),
        0,
    );
    let program = vec![
        Instruction::move_forward(id(1)),
        Instruction::if_on_star(id(2), vec![Instruction::turn_left(id(3))]),
        Instruction::move_forward(id(4)),
    ];
    let mut runtime = Runtime::new(program, level, start_at(1, 1, Direction::Right));

    let snapshots = run_until_terminal(&mut runtime, 8);
    let touched: Vec<_> = snapshots
        .iter()
        .filter_map(|snapshot| snapshot.active_instruction)
        .collect();
    assert_eq!(touched, vec![id(1), id(2), id(4)]);
    assert_eq!(snapshots.last().expect("steps").status, RunStatus::Completed);
}

#[test]
fn if_on_star_fires_when_the_run_starts_on_one() {
    // Construction never collects; only arrival does. A start pose placed
    // on a star therefore satisfies the predicate on the first step.
    let level = level(
        &["#####", "#*.F#", "#####"],
        start_at(1, 1, Direction::Right),
        0,
    );
    let program = vec![
        Instruction::if_on_star(id(1), vec![Instruction::turn_left(id(2))]),
    ];
    let mut runtime = Runtime::new(program, level, start_at(1, 1, Direction::Right));

    let entered = runtime.step();
    assert_eq!(entered.active_instruction, Some(id(1)));
    let body = runtime.step();
    assert_eq!(body.active_instruction, Some(id(2)));
    assert_eq!(body.pose.facing(), Direction::Up);
}

#[test]
fn nested_loops_terminate_within_their_expanded_trace() {
    let level = level(
        &["#####", "#S..#", "#####"],
        start_at(1, 1, Direction::Right),
        0,
    );
    let program = vec![Instruction::repeat(
        id(1),
        3,
        vec![Instruction::repeat(
            id(2),
            3,
            vec![Instruction::turn_left(id(3))],
        )],
    )];
    let mut runtime = Runtime::new(program, level, start_at(1, 1, Direction::Right));

    // Expanded trace: one outer entry, three inner entries, nine turns,
    // and the final out-of-moves evaluation.
    let snapshots = run_until_terminal(&mut runtime, 14);
    assert_eq!(snapshots.len(), 14);
    let turns = snapshots
        .iter()
        .filter(|snapshot| snapshot.active_instruction == Some(id(3)))
        .count();
    assert_eq!(turns, 9);
    assert_eq!(snapshots.last().expect("steps").status, RunStatus::Failed);
}
