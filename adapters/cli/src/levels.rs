//! Built-in level catalog.
//!
//! Adapted authoring data: each level names the blocks it hands the player
//! and a par block count for the intended solution. Grids are row-major,
//! `grid[y][x]`.

use gridbot_core::{BlockKind, Direction, GridPos, Level, Pose, Tile};

const E: Tile = Tile::Empty;
const W: Tile = Tile::Wall;
const S: Tile = Tile::Start;
const F: Tile = Tile::End;
const ST: Tile = Tile::Star;
const H: Tile = Tile::Hole;
const K: Tile = Tile::Key;
const D: Tile = Tile::Door;

/// Built-in level with the provided id, if any.
pub(crate) fn builtin(id: u32) -> Option<Level> {
    catalog().into_iter().find(|level| level.id == id)
}

/// Every built-in level, in play order.
pub(crate) fn catalog() -> Vec<Level> {
    vec![
        Level {
            id: 1,
            name: "Hello Gridbot".to_owned(),
            tutorial: Some("Two steps forward and you're home.".to_owned()),
            grid: vec![
                vec![W, W, W, W, W],
                vec![W, S, E, F, W],
                vec![W, W, W, W, W],
            ],
            start: Pose::new(GridPos::new(1, 1), Direction::Right),
            palette: vec![BlockKind::MoveForward],
            min_stars: 0,
            best_block_count: 2,
        },
        Level {
            id: 2,
            name: "Turn It Up".to_owned(),
            tutorial: Some("The bot needs to turn to reach the goal.".to_owned()),
            grid: vec![
                vec![W, W, W, W, W, W],
                vec![W, S, E, W, W, W],
                vec![W, W, E, F, W, W],
                vec![W, W, W, W, W, W],
            ],
            start: Pose::new(GridPos::new(1, 1), Direction::Right),
            palette: vec![
                BlockKind::MoveForward,
                BlockKind::TurnLeft,
                BlockKind::TurnRight,
            ],
            min_stars: 0,
            best_block_count: 5,
        },
        Level {
            id: 3,
            name: "Star Catcher".to_owned(),
            tutorial: Some("Collect the star before reaching the flag.".to_owned()),
            grid: vec![
                vec![W, W, W, W, W],
                vec![W, S, ST, F, W],
                vec![W, W, W, W, W],
            ],
            start: Pose::new(GridPos::new(1, 1), Direction::Right),
            palette: vec![
                BlockKind::MoveForward,
                BlockKind::TurnLeft,
                BlockKind::TurnRight,
            ],
            min_stars: 1,
            best_block_count: 2,
        },
        Level {
            id: 4,
            name: "Loop de Loop".to_owned(),
            tutorial: Some("A repeat block saves a lot of dragging.".to_owned()),
            grid: vec![
                vec![W, W, W, W, W, W, W],
                vec![W, S, E, E, E, F, W],
                vec![W, W, W, W, W, W, W],
            ],
            start: Pose::new(GridPos::new(1, 1), Direction::Right),
            palette: vec![BlockKind::MoveForward, BlockKind::Repeat],
            min_stars: 0,
            best_block_count: 2,
        },
        Level {
            id: 5,
            name: "Jump Around".to_owned(),
            tutorial: Some("Holes swallow bots. Jump over them.".to_owned()),
            grid: vec![
                vec![W, W, W, W, W, W],
                vec![W, S, H, E, F, W],
                vec![W, W, W, W, W, W],
            ],
            start: Pose::new(GridPos::new(1, 1), Direction::Right),
            palette: vec![BlockKind::MoveForward, BlockKind::Jump],
            min_stars: 0,
            best_block_count: 2,
        },
        Level {
            id: 6,
            name: "Locked Door".to_owned(),
            tutorial: Some("Grab the key and the door opens by itself.".to_owned()),
            grid: vec![
                vec![W, W, W, W, W, W],
                vec![W, S, K, D, F, W],
                vec![W, W, W, W, W, W],
            ],
            start: Pose::new(GridPos::new(1, 1), Direction::Right),
            palette: vec![BlockKind::MoveForward, BlockKind::Repeat],
            min_stars: 0,
            best_block_count: 2,
        },
        Level {
            id: 7,
            name: "Smart Robot".to_owned(),
            tutorial: Some("Let an if-wall block do the steering.".to_owned()),
            grid: vec![
                vec![W, W, W, W, W, W, W],
                vec![W, S, E, E, E, E, W],
                vec![W, W, W, W, W, E, W],
                vec![W, F, E, E, E, E, W],
                vec![W, W, W, W, W, W, W],
            ],
            start: Pose::new(GridPos::new(1, 1), Direction::Right),
            palette: vec![
                BlockKind::MoveForward,
                BlockKind::TurnLeft,
                BlockKind::IfFacingWall,
                BlockKind::Repeat,
            ],
            min_stars: 0,
            best_block_count: 5,
        },
        Level {
            id: 8,
            name: "Treasure Hunter".to_owned(),
            tutorial: Some("Three stars, then the flag.".to_owned()),
            grid: vec![
                vec![W, W, W, W, W, W, W],
                vec![W, S, ST, ST, ST, F, W],
                vec![W, W, W, W, W, W, W],
            ],
            start: Pose::new(GridPos::new(1, 1), Direction::Right),
            palette: vec![
                BlockKind::MoveForward,
                BlockKind::TurnRight,
                BlockKind::IfOnStar,
                BlockKind::Repeat,
                BlockKind::WhilePathClear,
            ],
            min_stars: 3,
            best_block_count: 2,
        },
    ]
}
