//! Error types for puzzle parsing, validation and search.
//!
//! Parsing distinguishes two failure kinds: a malformed encoding is a
//! `ParseError`, while syntactically valid text whose contents violate a
//! structural invariant is an `InvalidStateError`. Search failures are a
//! third family: running out of states is a legitimate outcome
//! (`NoSolution`), running out of budget is recoverable
//! (`ResourceExhausted`).

use thiserror::Error;

/// Malformed puzzle text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The input contained no bottles at all.
    #[error("puzzle text contains no bottles")]
    Empty,

    /// A `[` without a matching `]` before the end of input.
    #[error("unmatched '[' at byte {0}")]
    UnmatchedOpen(usize),

    /// A `]` with no `[` open, or any character outside the grammar.
    #[error("unexpected character {0:?} at byte {1}")]
    UnexpectedChar(char, usize),

    /// A color token that is not ASCII alphanumeric.
    #[error("unknown color token {0:?} at byte {1}")]
    UnknownColor(char, usize),

    /// The `N:` capacity prefix did not hold a positive integer.
    #[error("invalid capacity prefix {0:?}")]
    InvalidCapacity(String),

    /// Every bottle is empty and no capacity prefix was given, so the
    /// bottle capacity cannot be inferred.
    #[error("cannot infer capacity: every bottle is empty")]
    UnknownCapacity,

    /// A bottle holds more units than the puzzle capacity.
    #[error("bottle {index} holds {len} units, exceeding capacity {capacity}")]
    BottleOverCapacity {
        index: usize,
        len: usize,
        capacity: usize,
    },
}

/// Syntactically valid puzzle text that cannot describe a real puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidStateError {
    /// A color's total unit count is not a whole number of bottles, so
    /// it can never be collected into full monochrome bottles.
    #[error("color '{color}' has {count} units, not a multiple of capacity {capacity}")]
    ColorNotCollectible {
        color: char,
        count: usize,
        capacity: usize,
    },
}

/// Failure to decode a puzzle from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PuzzleError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Invalid(#[from] InvalidStateError),
}

/// Failure to produce a solution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// The initial state violates a structural invariant; checked before
    /// any search begins.
    #[error("invalid initial state: {0}")]
    InvalidState(#[from] InvalidStateError),

    /// The full reachable state space was explored without finding a
    /// goal. A terminal outcome, not a fault.
    #[error("puzzle has no solution")]
    NoSolution,

    /// A configured expansion or time budget ran out before the search
    /// resolved either way.
    #[error("search budget exhausted after {expansions} expansions")]
    ResourceExhausted { expansions: u64 },
}
