#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Stepwise execution engine for Gridbot programs.
//!
//! A [`Runtime`] owns one run: the instruction tree, the level being
//! played, the agent pose, and the collected/opened cell sets. Its single
//! entry point, [`Runtime::step`], performs exactly one primitive action or
//! zero-cost control decision per call and returns a [`StepSnapshot`] for
//! the presentation layer. Pacing, cancellation, and display belong to the
//! calling driver; abandoning a run is dropping the runtime.

use std::collections::BTreeSet;

use gridbot_core::{
    GridPos, Instruction, InstructionId, InstructionKind, Level, Pose, RunStatus,
    StepSnapshot, Tile,
};
use serde::{Deserialize, Serialize};

/// One open instruction sequence being walked.
///
/// The sequence is addressed by the child-index path of its owning control
/// instructions, starting from the top-level program, so frames stay plain
/// data and the suspended stack serializes as-is. `remaining` is present
/// only for fixed-repeat frames.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct Frame {
    path: Vec<usize>,
    cursor: usize,
    remaining: Option<u32>,
}

impl Frame {
    fn top_level() -> Self {
        Self {
            path: Vec::new(),
            cursor: 0,
            remaining: None,
        }
    }
}

/// Primitive dispatch summary extracted from an instruction node so the
/// borrow of the program tree ends before run state is mutated.
enum Op {
    MoveForward,
    TurnLeft,
    TurnRight,
    Jump,
    Repeat { count: u32, body_len: usize },
    WhilePathClear { body_len: usize },
    IfOnStar { body_len: usize },
    IfFacingWall { body_len: usize },
}

impl Op {
    fn classify(kind: &InstructionKind) -> Self {
        match kind {
            InstructionKind::MoveForward => Self::MoveForward,
            InstructionKind::TurnLeft => Self::TurnLeft,
            InstructionKind::TurnRight => Self::TurnRight,
            InstructionKind::Jump => Self::Jump,
            InstructionKind::Repeat { count, body } => Self::Repeat {
                count: *count,
                body_len: body.len(),
            },
            InstructionKind::WhilePathClear { body } => Self::WhilePathClear {
                body_len: body.len(),
            },
            InstructionKind::IfOnStar { body } => Self::IfOnStar {
                body_len: body.len(),
            },
            InstructionKind::IfFacingWall { body } => Self::IfFacingWall {
                body_len: body.len(),
            },
        }
    }
}

/// Resolves the instruction sequence addressed by a frame path.
///
/// Paths are built exclusively from indices the engine itself visited, so
/// every segment addresses a control instruction with a body.
fn sequence_at<'a>(program: &'a [Instruction], path: &[usize]) -> &'a [Instruction] {
    let mut sequence = program;
    for index in path {
        sequence = sequence[*index].kind().body().unwrap_or(&[]);
    }
    sequence
}

/// Stepwise interpreter for one run of a program against a level.
///
/// Single-threaded and synchronous; each call to [`Runtime::step`] does a
/// bounded amount of work, and a terminal status freezes the run. The
/// runtime holds no resources, so a driver may stop calling at any time and
/// construct a fresh instance to restart.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Runtime {
    program: Vec<Instruction>,
    level: Level,
    pose: Pose,
    stack: Vec<Frame>,
    collected_stars: BTreeSet<GridPos>,
    collected_keys: BTreeSet<GridPos>,
    opened_doors: BTreeSet<GridPos>,
    status: RunStatus,
}

impl Runtime {
    /// Creates a runtime for one run, seeded with the top-level sequence.
    #[must_use]
    pub fn new(program: Vec<Instruction>, level: Level, start: Pose) -> Self {
        Self {
            program,
            level,
            pose: start,
            stack: vec![Frame::top_level()],
            collected_stars: BTreeSet::new(),
            collected_keys: BTreeSet::new(),
            opened_doors: BTreeSet::new(),
            status: RunStatus::Running,
        }
    }

    /// Current run status.
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        self.status
    }

    /// Current agent pose.
    #[must_use]
    pub const fn pose(&self) -> Pose {
        self.pose
    }

    /// Level the run is playing.
    #[must_use]
    pub const fn level(&self) -> &Level {
        &self.level
    }

    /// Freezes the run in the reserved error status on behalf of the host.
    ///
    /// The engine never enters this state itself; drivers use it to surface
    /// faults in their own collaborators through the snapshot channel.
    pub fn report_error(&mut self, message: impl Into<String>) -> StepSnapshot {
        self.status = RunStatus::Error;
        self.snapshot(None, Some(message.into()))
    }

    /// Executes exactly one primitive action or control decision.
    ///
    /// On a terminal status this is a no-op returning the frozen snapshot.
    /// Otherwise it walks the frame stack until one instruction has been
    /// dispatched or the stack empties and the win condition decides the
    /// run. Exhausted frames and loop-iteration resets are closed within
    /// the same call; those crossings are not separately observable.
    pub fn step(&mut self) -> StepSnapshot {
        self.pose.clear_animation();

        if self.status.is_terminal() {
            return self.snapshot(None, None);
        }

        loop {
            let Some(frame) = self.stack.last_mut() else {
                return self.evaluate_goal(None);
            };

            let sequence_len = sequence_at(&self.program, &frame.path).len();
            if frame.cursor >= sequence_len {
                match frame.remaining {
                    Some(left) if left > 1 => {
                        frame.remaining = Some(left - 1);
                        frame.cursor = 0;
                    }
                    _ => {
                        let _ = self.stack.pop();
                    }
                }
                continue;
            }

            let index = frame.cursor;
            frame.cursor += 1;
            let frame_path = frame.path.clone();

            let (id, op) = {
                let sequence = sequence_at(&self.program, &frame_path);
                let instruction = &sequence[index];
                (instruction.id(), Op::classify(instruction.kind()))
            };

            return match op {
                Op::MoveForward => self.handle_move(id),
                Op::Jump => self.handle_jump(id),
                Op::TurnLeft => {
                    self.pose.face(self.pose.facing().turned_left());
                    self.snapshot(Some(id), None)
                }
                Op::TurnRight => {
                    self.pose.face(self.pose.facing().turned_right());
                    self.snapshot(Some(id), None)
                }
                Op::Repeat { count, body_len } => {
                    if body_len > 0 {
                        self.push_frame(frame_path, index, Some(count.max(1)));
                    }
                    self.snapshot(Some(id), None)
                }
                Op::WhilePathClear { body_len } => {
                    // The condition is re-checked on every visit; rolling the
                    // cursor back makes this node the next instruction again
                    // once the body frame pops.
                    if self.is_path_clear() && body_len > 0 {
                        if let Some(frame) = self.stack.last_mut() {
                            frame.cursor = index;
                        }
                        self.push_frame(frame_path, index, None);
                    }
                    self.snapshot(Some(id), None)
                }
                Op::IfOnStar { body_len } => {
                    if self.is_on_star() && body_len > 0 {
                        self.push_frame(frame_path, index, None);
                    }
                    self.snapshot(Some(id), None)
                }
                Op::IfFacingWall { body_len } => {
                    if self.is_facing_wall() && body_len > 0 {
                        self.push_frame(frame_path, index, None);
                    }
                    self.snapshot(Some(id), None)
                }
            };
        }
    }

    fn push_frame(&mut self, mut parent_path: Vec<usize>, index: usize, remaining: Option<u32>) {
        parent_path.push(index);
        self.stack.push(Frame {
            path: parent_path,
            cursor: 0,
            remaining,
        });
    }

    fn handle_move(&mut self, id: InstructionId) -> StepSnapshot {
        let destination = self.pose.position().step(self.pose.facing());
        match self.level.tile(destination) {
            None | Some(Tile::Wall) => {
                self.pose.deny();
                self.snapshot(Some(id), Some("Bonk!".to_owned()))
            }
            Some(Tile::Door) if self.door_locked(destination) => {
                self.pose.deny();
                self.snapshot(Some(id), Some("Locked! Find a key.".to_owned()))
            }
            Some(Tile::Hole) => {
                self.pose.move_to(destination);
                self.status = RunStatus::Failed;
                self.snapshot(Some(id), Some("Fell in a hole!".to_owned()))
            }
            Some(tile) => {
                self.pose.move_to(destination);
                self.collect_at(destination);
                if tile == Tile::End {
                    self.evaluate_goal(Some(id))
                } else {
                    self.snapshot(Some(id), None)
                }
            }
        }
    }

    fn handle_jump(&mut self, id: InstructionId) -> StepSnapshot {
        let facing = self.pose.facing();
        let over = self.pose.position().step(facing);
        let destination = self.pose.position().step_by(facing, 2);

        // The mid-cell is an obstacle-only check: its collection and win
        // effects never apply because the agent never stands there.
        match self.level.tile(over) {
            None | Some(Tile::Wall) => {
                self.pose.deny();
                return self.snapshot(Some(id), Some("Can't jump over walls!".to_owned()));
            }
            Some(Tile::Door) if self.door_locked(over) => {
                self.pose.deny();
                return self
                    .snapshot(Some(id), Some("Can't jump over locked doors!".to_owned()));
            }
            _ => {}
        }

        match self.level.tile(destination) {
            None | Some(Tile::Wall) => {
                self.pose.deny();
                self.snapshot(Some(id), Some("Can't jump into a wall!".to_owned()))
            }
            Some(Tile::Hole) => {
                self.pose.move_to(destination);
                self.status = RunStatus::Failed;
                self.snapshot(Some(id), Some("Jumped into a hole!".to_owned()))
            }
            Some(tile) => {
                self.pose.move_to(destination);
                self.collect_at(destination);
                if tile == Tile::End {
                    self.evaluate_goal(Some(id))
                } else {
                    self.snapshot(Some(id), None)
                }
            }
        }
    }

    /// Records collectibles at an arrival cell. Star pickup is idempotent;
    /// the first key collected opens every door in the level.
    fn collect_at(&mut self, position: GridPos) {
        match self.level.tile(position) {
            Some(Tile::Star) => {
                let _ = self.collected_stars.insert(position);
            }
            Some(Tile::Key) => {
                if self.collected_keys.insert(position) {
                    for door in self.level.door_cells() {
                        let _ = self.opened_doors.insert(door);
                    }
                }
            }
            _ => {}
        }
    }

    fn evaluate_goal(&mut self, active: Option<InstructionId>) -> StepSnapshot {
        if self.level.tile(self.pose.position()) == Some(Tile::End) {
            let collected = self.collected_stars.len();
            if collected as u64 >= u64::from(self.level.min_stars) {
                self.status = RunStatus::Completed;
                self.snapshot(active, None)
            } else {
                self.status = RunStatus::Failed;
                let message = format!(
                    "Need {} stars, only found {}.",
                    self.level.min_stars, collected
                );
                self.snapshot(active, Some(message))
            }
        } else if self.stack.is_empty() && active.is_none() {
            self.status = RunStatus::Failed;
            self.snapshot(None, Some("Out of moves!".to_owned()))
        } else {
            self.snapshot(active, None)
        }
    }

    fn door_locked(&self, position: GridPos) -> bool {
        !self.opened_doors.contains(&position)
    }

    fn is_facing_wall(&self) -> bool {
        let ahead = self.pose.position().step(self.pose.facing());
        matches!(self.level.tile(ahead), None | Some(Tile::Wall))
    }

    fn is_path_clear(&self) -> bool {
        let ahead = self.pose.position().step(self.pose.facing());
        match self.level.tile(ahead) {
            None | Some(Tile::Wall) | Some(Tile::Hole) => false,
            Some(Tile::Door) => !self.door_locked(ahead),
            Some(_) => true,
        }
    }

    fn is_on_star(&self) -> bool {
        let position = self.pose.position();
        self.level.tile(position) == Some(Tile::Star)
            && !self.collected_stars.contains(&position)
    }

    fn snapshot(&self, active: Option<InstructionId>, message: Option<String>) -> StepSnapshot {
        StepSnapshot {
            pose: self.pose,
            active_instruction: active,
            status: self.status,
            collected_stars: cell_keys(&self.collected_stars),
            collected_keys: cell_keys(&self.collected_keys),
            opened_doors: cell_keys(&self.opened_doors),
            message,
        }
    }
}

/// Sorted boundary keys for a set of cells.
fn cell_keys(cells: &BTreeSet<GridPos>) -> Vec<String> {
    cells.iter().map(GridPos::key).collect()
}
