#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line driver that runs Gridbot programs against puzzle levels.
//!
//! The engine itself knows nothing about pacing or display; this adapter
//! owns both. It loads a level and a program, calls `step()` at a fixed
//! cadence, renders the board after every snapshot, and maps the terminal
//! status to the process exit code.

mod levels;
mod render;
mod transfer;

use std::{fs, path::PathBuf, process::ExitCode, thread, time::Duration};

use anyhow::{bail, Context};
use clap::Parser;
use gridbot_core::{
    program_block_count, BlockKind, Instruction, Level, RunStatus, WELCOME_BANNER,
};
use gridbot_engine::Runtime;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line arguments accepted by the Gridbot driver.
#[derive(Debug, Parser)]
#[command(name = "gridbot", about = "Run a block program against a grid puzzle")]
struct Args {
    /// Built-in level to play.
    #[arg(long, default_value_t = 1, conflicts_with = "level_file")]
    level: u32,

    /// JSON file holding a level definition, instead of a built-in level.
    #[arg(long)]
    level_file: Option<PathBuf>,

    /// JSON file holding the program, an array of instructions.
    #[arg(long)]
    program: Option<PathBuf>,

    /// Program encoded as a shareable code string.
    #[arg(long, conflicts_with = "program")]
    code: Option<String>,

    /// Print the shareable code string for the program and exit.
    #[arg(long)]
    share: bool,

    /// Pause between steps, in milliseconds.
    #[arg(long, default_value_t = 0)]
    interval_ms: u64,

    /// Abort the run after this many steps.
    #[arg(long, default_value_t = 1000)]
    max_steps: u32,
}

/// Entry point for the Gridbot command-line driver.
fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let program = load_program(&args)?;

    if args.share {
        println!("{}", transfer::encode(&program));
        return Ok(ExitCode::SUCCESS);
    }

    let level = load_level(&args)?;
    println!("{WELCOME_BANNER}");
    println!("Level {}: {}", level.id, level.name);
    if let Some(tutorial) = &level.tutorial {
        println!("{tutorial}");
    }

    let status = run(program, level, &args);
    Ok(match status {
        RunStatus::Completed => ExitCode::SUCCESS,
        RunStatus::Running | RunStatus::Failed | RunStatus::Error => ExitCode::FAILURE,
    })
}

/// Drives one run to a terminal status at the configured cadence.
fn run(program: Vec<Instruction>, level: Level, args: &Args) -> RunStatus {
    let extras = off_palette_blocks(&program, &level);
    if !extras.is_empty() {
        warn!(?extras, "program uses blocks the level does not offer");
    }

    let blocks = program_block_count(&program);
    let par = level.best_block_count;
    let start = level.start;
    let mut runtime = Runtime::new(program, level, start);

    let mut steps = 0u32;
    let outcome = loop {
        if steps >= args.max_steps {
            break runtime.report_error(format!("no outcome after {} steps", args.max_steps));
        }
        steps += 1;

        let snapshot = runtime.step();
        debug!(
            step = steps,
            status = ?snapshot.status,
            active = ?snapshot.active_instruction,
            "step"
        );
        println!("{}", render::board(runtime.level(), &snapshot));
        if let Some(message) = &snapshot.message {
            println!("{message}");
        }
        if snapshot.status.is_terminal() {
            break snapshot;
        }
        if args.interval_ms > 0 {
            thread::sleep(Duration::from_millis(args.interval_ms));
        }
    };

    info!(steps, status = ?outcome.status, "run finished");
    match outcome.status {
        RunStatus::Completed => {
            println!("Level complete!");
            if par > 0 {
                println!("Blocks used: {blocks} (par {par})");
            }
        }
        RunStatus::Failed => println!("Try again!"),
        RunStatus::Error => println!("The run was aborted."),
        RunStatus::Running => {}
    }
    outcome.status
}

fn load_program(args: &Args) -> anyhow::Result<Vec<Instruction>> {
    if let Some(path) = &args.program {
        let json = fs::read_to_string(path)
            .with_context(|| format!("could not read program file {}", path.display()))?;
        return serde_json::from_str(&json)
            .with_context(|| format!("could not parse program file {}", path.display()));
    }
    if let Some(code) = &args.code {
        return Ok(transfer::decode(code)?);
    }
    bail!("provide a program via --program <file> or --code <string>");
}

fn load_level(args: &Args) -> anyhow::Result<Level> {
    if let Some(path) = &args.level_file {
        let json = fs::read_to_string(path)
            .with_context(|| format!("could not read level file {}", path.display()))?;
        return serde_json::from_str(&json)
            .with_context(|| format!("could not parse level file {}", path.display()));
    }
    levels::builtin(args.level)
        .with_context(|| format!("no built-in level {}", args.level))
}

/// Block kinds the program uses that the level's palette does not offer.
///
/// The engine runs any tree it is handed; restricting the palette is an
/// editor concern, so the driver only warns.
fn off_palette_blocks(program: &[Instruction], level: &Level) -> Vec<BlockKind> {
    let mut extras = Vec::new();
    collect_off_palette(program, level, &mut extras);
    extras
}

fn collect_off_palette(program: &[Instruction], level: &Level, out: &mut Vec<BlockKind>) {
    for instruction in program {
        let block = instruction.kind().block();
        if !level.palette.contains(&block) && !out.contains(&block) {
            out.push(block);
        }
        if let Some(body) = instruction.kind().body() {
            collect_off_palette(body, level, out);
        }
    }
}
