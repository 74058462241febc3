//! CLI entry point for the water sort solver.
//!
//! Usage:
//!   watersort-solver solve "<puzzle>" [options]
//!   watersort-solver solve --stdin [options]
//!
//! Options:
//!   --algorithm <name>      Search strategy: astar, idastar, dijkstra
//!   --max-expansions <n>    Expansion budget before giving up
//!   --timeout <seconds>     Wall-clock budget before giving up
//!   --list-steps            Also print 1-based pours, one per line
//!
//! The result is a JSON envelope on stdout: `{message, step, steps}`,
//! with 0-based bottle indices in `steps`.

use std::io::{self, Read};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use watersort_solver::{
    new_solver, Algorithm, PuzzleState, Solver, SolverConfig, SolverWithStats, Step,
};

#[derive(Parser)]
#[command(name = "watersort-solver")]
#[command(about = "Optimal solver for water sort puzzles")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a puzzle and print the pour sequence as JSON
    Solve {
        /// Puzzle text, e.g. "[RRBB][BBRR][][]" (use --stdin to read it)
        #[arg(value_name = "PUZZLE")]
        puzzle: Option<String>,

        /// Read the puzzle text from stdin instead of an argument
        #[arg(long)]
        stdin: bool,

        /// Search strategy
        #[arg(long, value_enum, default_value = "astar")]
        algorithm: AlgorithmArg,

        /// Maximum node expansions before giving up
        #[arg(long)]
        max_expansions: Option<u64>,

        /// Maximum search time in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Also list the pours with 1-based bottle numbers, one per line
        #[arg(long)]
        list_steps: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AlgorithmArg {
    Astar,
    Idastar,
    Dijkstra,
}

impl From<AlgorithmArg> for Algorithm {
    fn from(arg: AlgorithmArg) -> Algorithm {
        match arg {
            AlgorithmArg::Astar => Algorithm::AStar,
            AlgorithmArg::Idastar => Algorithm::IdaStar,
            AlgorithmArg::Dijkstra => Algorithm::Dijkstra,
        }
    }
}

/// JSON envelope for one solve request.
#[derive(Debug, Serialize)]
struct SolveOutput {
    message: String,
    step: usize,
    steps: Vec<Step>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            puzzle,
            stdin,
            algorithm,
            max_expansions,
            timeout,
            list_steps,
        } => {
            let text = if stdin {
                let mut buffer = String::new();
                if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                    eprintln!("Error reading from stdin: {}", e);
                    return ExitCode::FAILURE;
                }
                buffer
            } else if let Some(text) = puzzle {
                text
            } else {
                eprintln!("Error: Must provide either puzzle text or --stdin");
                return ExitCode::FAILURE;
            };

            let initial = match PuzzleState::from_text(text.trim()) {
                Ok(state) => state,
                Err(e) => {
                    return fail(format!("Invalid puzzle state provided: {}", e));
                }
            };

            let config = SolverConfig {
                max_expansions,
                timeout: timeout.map(Duration::from_secs),
            };
            let mut solver = new_solver(algorithm.into(), config);

            let steps = match solver.solve(&initial) {
                Ok(steps) => steps,
                Err(e) => {
                    return fail(format!("Cannot solve puzzle: {}", e));
                }
            };

            let message = format!(
                "Puzzle solved in {} steps! Algorithm took {} iterations to find solution.",
                steps.len(),
                solver.stats().steps
            );

            if list_steps {
                // Human-facing listing: 1-based bottle numbers.
                for step in &steps {
                    eprintln!("{} {}", step.from + 1, step.to + 1);
                }
            }

            let output = SolveOutput {
                message,
                step: steps.len(),
                steps,
            };
            println!("{}", serde_json::to_string(&output).unwrap());
            ExitCode::SUCCESS
        }
    }
}

fn fail(message: String) -> ExitCode {
    let output = SolveOutput {
        message,
        step: 0,
        steps: Vec::new(),
    };
    println!("{}", serde_json::to_string(&output).unwrap());
    ExitCode::FAILURE
}
