#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Gridbot engine.
//!
//! This crate defines the plain data that crosses the engine boundary: the
//! tile grid a level is made of, the agent pose, the instruction trees a
//! player assembles, and the [`StepSnapshot`] record the interpreter emits
//! after every step. Everything here is behavior-free and serializable so
//! that editors, drivers, and renderers can exchange values without linking
//! against the engine itself.

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Gridbot.";

/// Facing directions available to the agent.
///
/// The quarter-turn order used by the turn instructions is
/// up → right → down → left → up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Facing toward decreasing row indices.
    Up,
    /// Facing toward increasing column indices.
    Right,
    /// Facing toward increasing row indices.
    Down,
    /// Facing toward decreasing column indices.
    Left,
}

impl Direction {
    /// Signed unit offset `(dx, dy)` of one step in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Right => (1, 0),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
        }
    }

    /// Direction after one quarter-turn clockwise.
    #[must_use]
    pub const fn turned_right(self) -> Self {
        match self {
            Self::Up => Self::Right,
            Self::Right => Self::Down,
            Self::Down => Self::Left,
            Self::Left => Self::Up,
        }
    }

    /// Direction after one quarter-turn counter-clockwise.
    #[must_use]
    pub const fn turned_left(self) -> Self {
        match self {
            Self::Up => Self::Left,
            Self::Left => Self::Down,
            Self::Down => Self::Right,
            Self::Right => Self::Up,
        }
    }
}

/// Location of a single grid cell expressed as `(x, y)` coordinates.
///
/// Coordinates are signed so that one- and two-step probes taken from a
/// border cell can land outside the grid and be reported as out-of-bounds
/// by [`Level::tile`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    x: i32,
    y: i32,
}

impl GridPos {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column index of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row index of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Cell one step away in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        self.step_by(direction, 1)
    }

    /// Cell `cells` steps away in the provided direction.
    #[must_use]
    pub const fn step_by(self, direction: Direction, cells: i32) -> Self {
        let (dx, dy) = direction.offset();
        Self {
            x: self.x + dx * cells,
            y: self.y + dy * cells,
        }
    }

    /// Boundary encoding of the cell identity, `"<x>,<y>"`.
    ///
    /// Round-trips losslessly through [`GridPos::parse_key`] for any
    /// coordinate pair.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{},{}", self.x, self.y)
    }

    /// Parses a cell identity previously produced by [`GridPos::key`].
    #[must_use]
    pub fn parse_key(value: &str) -> Option<Self> {
        let (x, y) = value.split_once(',')?;
        Some(Self {
            x: x.parse().ok()?,
            y: y.parse().ok()?,
        })
    }
}

/// Transient presentation hint attached to the agent pose.
///
/// Reset to [`AnimationHint::Idle`] at the start of every step; set to
/// [`AnimationHint::Denied`] only when a move or jump was blocked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationHint {
    /// No special animation requested.
    Idle,
    /// The last action was blocked and should play a refusal animation.
    Denied,
}

/// Position and facing of the agent, plus the transient animation hint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pose {
    position: GridPos,
    facing: Direction,
    animation: AnimationHint,
}

impl Pose {
    /// Creates a new idle pose at the provided position and facing.
    #[must_use]
    pub const fn new(position: GridPos, facing: Direction) -> Self {
        Self {
            position,
            facing,
            animation: AnimationHint::Idle,
        }
    }

    /// Cell the agent currently occupies.
    #[must_use]
    pub const fn position(&self) -> GridPos {
        self.position
    }

    /// Direction the agent currently faces.
    #[must_use]
    pub const fn facing(&self) -> Direction {
        self.facing
    }

    /// Animation hint for the presentation layer.
    #[must_use]
    pub const fn animation(&self) -> AnimationHint {
        self.animation
    }

    /// Moves the agent to the provided cell.
    pub fn move_to(&mut self, position: GridPos) {
        self.position = position;
    }

    /// Rotates the agent to the provided facing.
    pub fn face(&mut self, facing: Direction) {
        self.facing = facing;
    }

    /// Clears the animation hint back to idle.
    pub fn clear_animation(&mut self) {
        self.animation = AnimationHint::Idle;
    }

    /// Marks the pose with the denied-action hint.
    pub fn deny(&mut self) {
        self.animation = AnimationHint::Denied;
    }
}

/// Static tile kinds a level grid is composed of.
///
/// Tiles never change during a run; collected and opened status lives in
/// the run state so the same level can be replayed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Walkable floor.
    Empty,
    /// Blocking wall.
    Wall,
    /// The agent's starting cell; walkable.
    Start,
    /// The goal flag; arriving here triggers win evaluation.
    End,
    /// Collectible star; walkable.
    Star,
    /// Hazard; stepping or jumping onto it fails the run.
    Hole,
    /// Collectible key; walkable. Collecting any key opens every door.
    Key,
    /// Blocking until opened by a key, then walkable.
    Door,
}

/// Unique identifier assigned to an instruction node by the editor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstructionId(u32);

impl InstructionId {
    /// Creates a new instruction identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Palette tag naming an instruction kind without its payload.
///
/// Levels list the tags available to the player; editors use them to offer
/// blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// One cell forward.
    MoveForward,
    /// Quarter-turn counter-clockwise.
    TurnLeft,
    /// Quarter-turn clockwise.
    TurnRight,
    /// Two cells forward over one obstacle cell.
    Jump,
    /// Fixed-count repeat loop.
    Repeat,
    /// Loop while the cell ahead is clear.
    WhilePathClear,
    /// Conditional on standing on an uncollected star.
    IfOnStar,
    /// Conditional on facing a wall.
    IfFacingWall,
}

/// Payload of a single instruction node.
///
/// The four primitive kinds carry no children; the four control kinds own
/// an ordered body. Ownership is strictly hierarchical: a child belongs to
/// exactly one parent sequence, so trees copy and serialize as plain values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstructionKind {
    /// Advance one cell in the facing direction.
    MoveForward,
    /// Rotate one quarter-turn counter-clockwise.
    TurnLeft,
    /// Rotate one quarter-turn clockwise.
    TurnRight,
    /// Advance two cells, clearing one obstacle cell in between.
    Jump,
    /// Execute the body a fixed number of times.
    Repeat {
        /// Number of iterations; editors conventionally offer 2 to 9, the
        /// engine accepts any positive count and clamps zero to one.
        count: u32,
        /// Instructions executed each iteration.
        body: Vec<Instruction>,
    },
    /// Execute the body for as long as the cell ahead is clear, re-checking
    /// before every iteration.
    WhilePathClear {
        /// Instructions executed each iteration.
        body: Vec<Instruction>,
    },
    /// Execute the body once if the agent stands on an uncollected star.
    IfOnStar {
        /// Instructions executed when the condition holds.
        body: Vec<Instruction>,
    },
    /// Execute the body once if the cell ahead is a wall or out of bounds.
    IfFacingWall {
        /// Instructions executed when the condition holds.
        body: Vec<Instruction>,
    },
}

impl InstructionKind {
    /// Child sequence of a control instruction, or `None` for primitives.
    #[must_use]
    pub fn body(&self) -> Option<&[Instruction]> {
        match self {
            Self::MoveForward | Self::TurnLeft | Self::TurnRight | Self::Jump => None,
            Self::Repeat { body, .. }
            | Self::WhilePathClear { body }
            | Self::IfOnStar { body }
            | Self::IfFacingWall { body } => Some(body),
        }
    }

    /// Palette tag for this kind.
    #[must_use]
    pub const fn block(&self) -> BlockKind {
        match self {
            Self::MoveForward => BlockKind::MoveForward,
            Self::TurnLeft => BlockKind::TurnLeft,
            Self::TurnRight => BlockKind::TurnRight,
            Self::Jump => BlockKind::Jump,
            Self::Repeat { .. } => BlockKind::Repeat,
            Self::WhilePathClear { .. } => BlockKind::WhilePathClear,
            Self::IfOnStar { .. } => BlockKind::IfOnStar,
            Self::IfFacingWall { .. } => BlockKind::IfFacingWall,
        }
    }
}

/// One node of a player program: an editor-assigned id plus its payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    id: InstructionId,
    kind: InstructionKind,
}

impl Instruction {
    /// Creates an instruction from an id and payload.
    #[must_use]
    pub const fn new(id: InstructionId, kind: InstructionKind) -> Self {
        Self { id, kind }
    }

    /// Move-forward primitive.
    #[must_use]
    pub const fn move_forward(id: InstructionId) -> Self {
        Self::new(id, InstructionKind::MoveForward)
    }

    /// Turn-left primitive.
    #[must_use]
    pub const fn turn_left(id: InstructionId) -> Self {
        Self::new(id, InstructionKind::TurnLeft)
    }

    /// Turn-right primitive.
    #[must_use]
    pub const fn turn_right(id: InstructionId) -> Self {
        Self::new(id, InstructionKind::TurnRight)
    }

    /// Jump primitive.
    #[must_use]
    pub const fn jump(id: InstructionId) -> Self {
        Self::new(id, InstructionKind::Jump)
    }

    /// Fixed-repeat loop over the provided body.
    #[must_use]
    pub fn repeat(id: InstructionId, count: u32, body: Vec<Instruction>) -> Self {
        Self::new(id, InstructionKind::Repeat { count, body })
    }

    /// While-path-clear loop over the provided body.
    #[must_use]
    pub fn while_path_clear(id: InstructionId, body: Vec<Instruction>) -> Self {
        Self::new(id, InstructionKind::WhilePathClear { body })
    }

    /// If-on-star conditional over the provided body.
    #[must_use]
    pub fn if_on_star(id: InstructionId, body: Vec<Instruction>) -> Self {
        Self::new(id, InstructionKind::IfOnStar { body })
    }

    /// If-facing-wall conditional over the provided body.
    #[must_use]
    pub fn if_facing_wall(id: InstructionId, body: Vec<Instruction>) -> Self {
        Self::new(id, InstructionKind::IfFacingWall { body })
    }

    /// Identifier of this node.
    #[must_use]
    pub const fn id(&self) -> InstructionId {
        self.id
    }

    /// Payload of this node.
    #[must_use]
    pub const fn kind(&self) -> &InstructionKind {
        &self.kind
    }

    /// Number of nodes in this subtree, this node included.
    #[must_use]
    pub fn block_count(&self) -> u32 {
        1 + self
            .kind
            .body()
            .map_or(0, |body| body.iter().map(Instruction::block_count).sum())
    }
}

/// Number of nodes across a whole program.
#[must_use]
pub fn program_block_count(program: &[Instruction]) -> u32 {
    program.iter().map(Instruction::block_count).sum()
}

/// Immutable per-run description of a puzzle: the tile grid, the agent's
/// starting pose, the palette offered to the player, and the win threshold.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    /// Numeric identifier used for selection and progress tracking.
    pub id: u32,
    /// Display name shown by presentation layers.
    pub name: String,
    /// Optional tutorial text introducing the level.
    pub tutorial: Option<String>,
    /// Row-major tile grid; `grid[y][x]` is the tile at `(x, y)`.
    pub grid: Vec<Vec<Tile>>,
    /// Starting pose of the agent.
    pub start: Pose,
    /// Instruction kinds available to the player in this level.
    pub palette: Vec<BlockKind>,
    /// Minimum collected stars required for a flag arrival to win.
    pub min_stars: u32,
    /// Par block count for the intended solution.
    pub best_block_count: u32,
}

impl Level {
    /// Number of rows in the grid.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.grid.len()
    }

    /// Number of columns in the grid.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.grid.first().map_or(0, Vec::len)
    }

    /// Tile at the provided position, or `None` outside the grid.
    ///
    /// Out-of-bounds is wall-equivalent everywhere the engine consults it.
    #[must_use]
    pub fn tile(&self, position: GridPos) -> Option<Tile> {
        if position.x() < 0 || position.y() < 0 {
            return None;
        }
        let row = self.grid.get(usize::try_from(position.y()).ok()?)?;
        row.get(usize::try_from(position.x()).ok()?).copied()
    }

    /// Every door cell in the grid, in row-major order.
    #[must_use]
    pub fn door_cells(&self) -> Vec<GridPos> {
        let mut doors = Vec::new();
        for (y, row) in self.grid.iter().enumerate() {
            for (x, tile) in row.iter().enumerate() {
                if *tile == Tile::Door {
                    doors.push(GridPos::new(x as i32, y as i32));
                }
            }
        }
        doors
    }
}

/// Lifecycle of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunStatus {
    /// The run is in progress and `step()` performs work.
    Running,
    /// The agent reached the flag with enough stars. Terminal.
    Completed,
    /// The run failed: hole, star shortfall, or exhausted instructions.
    /// Terminal.
    Failed,
    /// Reserved for faults reported by the hosting driver; the engine never
    /// enters this state on its own. Terminal.
    Error,
}

impl RunStatus {
    /// Whether the status freezes the run.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Observable result of one interpreter step.
///
/// This record is the entire boundary a presentation layer needs: it drives
/// agent placement, per-instruction highlighting, collectible visibility,
/// door state, and win/lose messaging. The three cell sets use the
/// [`GridPos::key`] encoding and are sorted for determinism.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSnapshot {
    /// Agent pose after the step, including the animation hint.
    pub pose: Pose,
    /// Instruction touched by this step, if any.
    pub active_instruction: Option<InstructionId>,
    /// Run status after the step.
    pub status: RunStatus,
    /// Keys of star cells collected so far.
    pub collected_stars: Vec<String>,
    /// Keys of key cells collected so far.
    pub collected_keys: Vec<String>,
    /// Keys of door cells opened so far.
    pub opened_doors: Vec<String>,
    /// Optional human-readable note, set on blocked actions and outcomes.
    pub message: Option<String>,
}
