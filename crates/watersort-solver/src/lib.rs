//! Optimal solver library for water sort puzzles.
//!
//! A puzzle is a row of bottles holding stacked colored liquid units; a
//! pour moves the top same-colored run between bottles, and the goal is
//! every bottle empty or full with one color. This crate models the
//! puzzle state, parses the canonical text encoding (see [`state`]), and
//! finds minimal pour sequences with a choice of three search
//! strategies: A*, IDA*, and Dijkstra.
//!
//! ```
//! use watersort_solver::{new_solver, Algorithm, PuzzleState, Solver, SolverConfig};
//!
//! let initial = PuzzleState::from_text("[RRBB][BB][RR]").unwrap();
//! let mut solver = new_solver(Algorithm::AStar, SolverConfig::default());
//! let steps = solver.solve(&initial).unwrap();
//! assert_eq!(steps.len(), 2);
//! ```

pub mod error;
pub mod heuristic;
pub mod solver;
pub mod state;

// Re-export main types
pub use error::{InvalidStateError, ParseError, PuzzleError, SolveError};
pub use heuristic::{ColorSpread, Heuristic, Zero};
pub use solver::{
    new_solver, Algorithm, AStarSolver, DijkstraSolver, IdaStarSolver, Solver, SolverConfig,
    SolverWithStats, Stats,
};
pub use state::{Bottle, Color, PuzzleState, Step};
