//! Search strategies over puzzle states.
//!
//! Three interchangeable strategies share one [`Solver`] contract:
//! best-first informed search (A*), iterative-deepening informed search
//! (IDA*), and uniform-cost search (Dijkstra). All three return
//! minimal-length pour sequences; they differ in how many states they
//! touch and how much memory the frontier takes. Each solve owns its
//! frontier and closed set outright, so solver instances can run
//! concurrently on different puzzles without sharing anything.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::time::{Duration, Instant};

use crate::error::SolveError;
use crate::heuristic::{ColorSpread, Heuristic, Zero};
use crate::state::{PuzzleState, Step};

/// Strategy choice, fixed at solver construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    AStar,
    IdaStar,
    Dijkstra,
}

impl Algorithm {
    /// The identifier used on external surfaces (flags, messages).
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::AStar => "astar",
            Algorithm::IdaStar => "idastar",
            Algorithm::Dijkstra => "dijkstra",
        }
    }

    /// Inverse of [`Algorithm::name`].
    pub fn from_name(name: &str) -> Option<Algorithm> {
        match name {
            "astar" => Some(Algorithm::AStar),
            "idastar" => Some(Algorithm::IdaStar),
            "dijkstra" => Some(Algorithm::Dijkstra),
            _ => None,
        }
    }
}

/// Optional budgets for one solve call, checked at the top of each
/// expansion so an enormous or unsolvable puzzle degrades to
/// [`SolveError::ResourceExhausted`] instead of blocking unboundedly.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolverConfig {
    /// Maximum node expansions/iterations before giving up.
    pub max_expansions: Option<u64>,
    /// Maximum wall-clock time before giving up.
    pub timeout: Option<Duration>,
}

/// Diagnostic counters from the most recent solve call. Never affects
/// the returned path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Node expansions (best-first) or node visits (IDA*) performed.
    pub steps: u64,
}

/// The shared strategy contract: a complete minimal pour sequence, or a
/// typed error. Never a partial path.
pub trait Solver {
    fn solve(&mut self, initial: &PuzzleState) -> Result<Vec<Step>, SolveError>;
}

/// Extended capability for strategies that report iteration counts.
pub trait SolverWithStats: Solver {
    fn stats(&self) -> Stats;
}

/// Construct the solver for an [`Algorithm`]. All provided strategies
/// carry the stats capability.
pub fn new_solver(algorithm: Algorithm, config: SolverConfig) -> Box<dyn SolverWithStats> {
    match algorithm {
        Algorithm::AStar => Box::new(AStarSolver::new(config)),
        Algorithm::IdaStar => Box::new(IdaStarSolver::new(config)),
        Algorithm::Dijkstra => Box::new(DijkstraSolver::new(config)),
    }
}

/// Budget state for one solve call.
struct Budget {
    max_expansions: Option<u64>,
    timeout: Option<Duration>,
    start: Instant,
}

impl Budget {
    fn new(config: &SolverConfig) -> Self {
        Self {
            max_expansions: config.max_expansions,
            timeout: config.timeout,
            start: Instant::now(),
        }
    }

    fn check(&self, expansions: u64) -> Result<(), SolveError> {
        if let Some(max) = self.max_expansions {
            if expansions >= max {
                return Err(SolveError::ResourceExhausted { expansions });
            }
        }
        if let Some(timeout) = self.timeout {
            if self.start.elapsed() >= timeout {
                return Err(SolveError::ResourceExhausted { expansions });
            }
        }
        Ok(())
    }
}

/// A discovered state plus the back-reference used for path
/// reconstruction. Nodes live in an arena for the duration of one solve.
struct SearchNode {
    state: PuzzleState,
    g: u32,
    parent: Option<usize>,
    step: Option<Step>,
}

/// Best-first search keyed by f = g + h. With the [`Zero`] heuristic
/// this is uniform-cost search. Tie-breaking is deterministic: lower f,
/// then lower h, then earlier insertion.
fn best_first_search(
    initial: &PuzzleState,
    heuristic: &dyn Heuristic,
    budget: &Budget,
    stats: &mut Stats,
) -> Result<Vec<Step>, SolveError> {
    initial.validate()?;

    let mut nodes: Vec<SearchNode> = Vec::new();
    let mut frontier: BinaryHeap<(Reverse<(u32, u32, u64)>, usize)> = BinaryHeap::new();
    let mut best_g: HashMap<PuzzleState, u32> = HashMap::new();
    let mut seq: u64 = 0;

    let h0 = heuristic.estimate(initial);
    nodes.push(SearchNode {
        state: initial.clone(),
        g: 0,
        parent: None,
        step: None,
    });
    best_g.insert(initial.clone(), 0);
    frontier.push((Reverse((h0, h0, seq)), 0));

    while let Some((_, idx)) = frontier.pop() {
        budget.check(stats.steps)?;

        let state = nodes[idx].state.clone();
        let g = nodes[idx].g;
        // Stale frontier entry: this state was re-discovered cheaper.
        if best_g.get(&state).is_some_and(|&best| g > best) {
            continue;
        }
        stats.steps += 1;

        if state.is_goal() {
            return Ok(reconstruct_path(&nodes, idx));
        }

        for step in state.legal_moves().collect::<Vec<_>>() {
            let next = state.apply(step);
            let next_g = g + 1;
            if best_g.get(&next).is_some_and(|&best| best <= next_g) {
                continue;
            }
            best_g.insert(next.clone(), next_g);
            let h = heuristic.estimate(&next);
            seq += 1;
            nodes.push(SearchNode {
                state: next,
                g: next_g,
                parent: Some(idx),
                step: Some(step),
            });
            frontier.push((Reverse((next_g + h, h, seq)), nodes.len() - 1));
        }
    }

    Err(SolveError::NoSolution)
}

/// Walk parent links back to the root and reverse into solve order.
fn reconstruct_path(nodes: &[SearchNode], goal_idx: usize) -> Vec<Step> {
    let mut steps = Vec::new();
    let mut node = &nodes[goal_idx];
    while let (Some(parent), Some(step)) = (node.parent, node.step) {
        steps.push(step);
        node = &nodes[parent];
    }
    steps.reverse();
    steps
}

/// Best-first informed search. Minimal frontier-ordered expansion with a
/// closed map from state to best known cost; optimal because
/// [`ColorSpread`] never overestimates.
pub struct AStarSolver {
    config: SolverConfig,
    heuristic: ColorSpread,
    stats: Stats,
}

impl AStarSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            heuristic: ColorSpread,
            stats: Stats::default(),
        }
    }
}

impl Solver for AStarSolver {
    fn solve(&mut self, initial: &PuzzleState) -> Result<Vec<Step>, SolveError> {
        self.stats = Stats::default();
        let budget = Budget::new(&self.config);
        best_first_search(initial, &self.heuristic, &budget, &mut self.stats)
    }
}

impl SolverWithStats for AStarSolver {
    fn stats(&self) -> Stats {
        self.stats
    }
}

/// Uniform-cost search: the best-first core ordered purely by
/// accumulated cost. Optimal with no heuristic at all, at the price of
/// expanding at least as many states as the informed variants.
pub struct DijkstraSolver {
    config: SolverConfig,
    heuristic: Zero,
    stats: Stats,
}

impl DijkstraSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            heuristic: Zero,
            stats: Stats::default(),
        }
    }
}

impl Solver for DijkstraSolver {
    fn solve(&mut self, initial: &PuzzleState) -> Result<Vec<Step>, SolveError> {
        self.stats = Stats::default();
        let budget = Budget::new(&self.config);
        best_first_search(initial, &self.heuristic, &budget, &mut self.stats)
    }
}

impl SolverWithStats for DijkstraSolver {
    fn stats(&self) -> Stats {
        self.stats
    }
}

/// What one bounded depth-first probe learned.
enum DfsOutcome {
    /// A goal was reached; the step stack holds the solution.
    Found,
    /// Some branch was cut at this f value; the minimum such value is
    /// the next iteration's threshold.
    NextThreshold(u32),
    /// Every branch was fully explored below the threshold.
    Exhausted,
}

/// Iterative-deepening informed search. Repeats a depth-first probe with
/// a growing f-threshold, keeping memory proportional to the search
/// depth instead of the frontier size. States on the current probe stack
/// are excluded from re-entry so every iteration terminates.
pub struct IdaStarSolver {
    config: SolverConfig,
    heuristic: ColorSpread,
    stats: Stats,
}

impl IdaStarSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            heuristic: ColorSpread,
            stats: Stats::default(),
        }
    }

    fn dfs(
        &mut self,
        state: &PuzzleState,
        g: u32,
        threshold: u32,
        steps: &mut Vec<Step>,
        on_path: &mut HashSet<PuzzleState>,
        budget: &Budget,
    ) -> Result<DfsOutcome, SolveError> {
        budget.check(self.stats.steps)?;
        self.stats.steps += 1;

        let f = g + self.heuristic.estimate(state);
        if f > threshold {
            return Ok(DfsOutcome::NextThreshold(f));
        }
        if state.is_goal() {
            return Ok(DfsOutcome::Found);
        }

        let mut next_threshold: Option<u32> = None;
        for step in state.legal_moves().collect::<Vec<_>>() {
            let next = state.apply(step);
            if on_path.contains(&next) {
                continue;
            }
            on_path.insert(next.clone());
            steps.push(step);
            match self.dfs(&next, g + 1, threshold, steps, on_path, budget)? {
                DfsOutcome::Found => return Ok(DfsOutcome::Found),
                DfsOutcome::NextThreshold(t) => {
                    next_threshold = Some(next_threshold.map_or(t, |m| m.min(t)));
                }
                DfsOutcome::Exhausted => {}
            }
            steps.pop();
            on_path.remove(&next);
        }

        match next_threshold {
            Some(t) => Ok(DfsOutcome::NextThreshold(t)),
            None => Ok(DfsOutcome::Exhausted),
        }
    }
}

impl Solver for IdaStarSolver {
    fn solve(&mut self, initial: &PuzzleState) -> Result<Vec<Step>, SolveError> {
        self.stats = Stats::default();
        initial.validate()?;
        let budget = Budget::new(&self.config);

        let mut threshold = self.heuristic.estimate(initial);
        loop {
            let mut steps = Vec::new();
            let mut on_path = HashSet::new();
            on_path.insert(initial.clone());
            match self.dfs(initial, 0, threshold, &mut steps, &mut on_path, &budget)? {
                DfsOutcome::Found => return Ok(steps),
                DfsOutcome::NextThreshold(t) => threshold = t,
                DfsOutcome::Exhausted => return Err(SolveError::NoSolution),
            }
        }
    }
}

impl SolverWithStats for IdaStarSolver {
    fn stats(&self) -> Stats {
        self.stats
    }
}
