//! Puzzle state representation: bottles, colors, pours.
//!
//! A puzzle is an ordered sequence of bottles, each an ordered stack of
//! colored units bounded by a shared capacity. States are immutable;
//! applying a pour produces a new state, so one state can sit in several
//! search structures at once. Equality and hashing are structural over
//! the full bottle contents, which is what makes visited-state
//! deduplication sound.
//!
//! The canonical text grammar is:
//!
//! ```text
//! puzzle   := [ capacity ":" ] bottle+
//! capacity := decimal integer >= 1
//! bottle   := "[" color* "]"
//! color    := one ASCII alphanumeric character, bottom to top
//! ```
//!
//! Whitespace is allowed between bottles and around the capacity prefix.
//! Without a prefix the capacity is the longest bottle's length.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{InvalidStateError, ParseError, PuzzleError};

/// A single liquid color, one ASCII alphanumeric token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color(u8);

impl Color {
    /// The character this color was parsed from.
    pub fn as_char(self) -> char {
        self.0 as char
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One pour: the maximal top same-color run of bottle `from` into bottle
/// `to`. Indices are 0-based; any display layer showing 1-based bottle
/// numbers applies the offset itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Step {
    pub from: usize,
    pub to: usize,
}

impl Step {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}

/// An ordered stack of colored units, bottom to top. Capacity lives on
/// the owning [`PuzzleState`]; four units stay inline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Bottle {
    units: SmallVec<[Color; 4]>,
}

impl Bottle {
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// The units bottom to top.
    pub fn units(&self) -> &[Color] {
        &self.units
    }

    /// The accessible (topmost) color, if any.
    pub fn top(&self) -> Option<Color> {
        self.units.last().copied()
    }

    /// Length of the contiguous same-color run at the top.
    pub fn top_run_len(&self) -> usize {
        match self.top() {
            None => 0,
            Some(top) => self.units.iter().rev().take_while(|&&c| c == top).count(),
        }
    }

    /// True if non-empty and all units share one color.
    pub fn is_monochrome(&self) -> bool {
        match self.top() {
            None => false,
            Some(top) => self.units.iter().all(|&c| c == top),
        }
    }
}

/// A snapshot of every bottle in the puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PuzzleState {
    bottles: Vec<Bottle>,
    capacity: usize,
}

impl PuzzleState {
    /// Parse the canonical text grammar (see the module docs).
    ///
    /// Malformed text yields a [`ParseError`]; well-formed text whose
    /// color counts cannot fill whole bottles yields an
    /// [`InvalidStateError`]. Parsing is deterministic: one input string
    /// maps to exactly one state or one error.
    pub fn from_text(text: &str) -> Result<PuzzleState, PuzzleError> {
        let (capacity_prefix, rest_start) = parse_capacity_prefix(text)?;

        let mut bottles: Vec<Bottle> = Vec::new();
        let mut current: Option<(usize, Bottle)> = None;
        for (pos, ch) in text.char_indices().skip_while(|&(p, _)| p < rest_start) {
            match (&mut current, ch) {
                (None, '[') => current = Some((pos, Bottle::default())),
                (None, c) if c.is_whitespace() => {}
                (None, c) => return Err(ParseError::UnexpectedChar(c, pos).into()),
                (Some((_, bottle)), ']') => {
                    bottles.push(std::mem::take(bottle));
                    current = None;
                }
                (Some((_, bottle)), c) if c.is_ascii_alphanumeric() => {
                    bottle.units.push(Color(c as u8));
                }
                (Some(_), c) => return Err(ParseError::UnknownColor(c, pos).into()),
            }
        }
        if let Some((open_pos, _)) = current {
            return Err(ParseError::UnmatchedOpen(open_pos).into());
        }
        if bottles.is_empty() {
            return Err(ParseError::Empty.into());
        }

        let capacity = match capacity_prefix {
            Some(capacity) => capacity,
            None => bottles
                .iter()
                .map(Bottle::len)
                .max()
                .filter(|&longest| longest > 0)
                .ok_or(ParseError::UnknownCapacity)?,
        };
        for (index, bottle) in bottles.iter().enumerate() {
            if bottle.len() > capacity {
                return Err(ParseError::BottleOverCapacity {
                    index,
                    len: bottle.len(),
                    capacity,
                }
                .into());
            }
        }

        let state = PuzzleState { bottles, capacity };
        state.validate()?;
        Ok(state)
    }

    /// Build a state from per-bottle color strings, for programmatic
    /// callers. Runs the same capacity and conservation checks as
    /// [`PuzzleState::from_text`].
    pub fn from_bottles(contents: &[&str], capacity: usize) -> Result<PuzzleState, PuzzleError> {
        if capacity == 0 {
            return Err(ParseError::InvalidCapacity("0".to_string()).into());
        }
        let mut bottles = Vec::with_capacity(contents.len());
        for (index, content) in contents.iter().enumerate() {
            let mut bottle = Bottle::default();
            for (pos, c) in content.char_indices() {
                if !c.is_ascii_alphanumeric() {
                    return Err(ParseError::UnknownColor(c, pos).into());
                }
                bottle.units.push(Color(c as u8));
            }
            if bottle.len() > capacity {
                return Err(ParseError::BottleOverCapacity {
                    index,
                    len: bottle.len(),
                    capacity,
                }
                .into());
            }
            bottles.push(bottle);
        }
        if bottles.is_empty() {
            return Err(ParseError::Empty.into());
        }
        let state = PuzzleState { bottles, capacity };
        state.validate()?;
        Ok(state)
    }

    /// Build a state without the conservation check, so tests can
    /// exercise the solvers' own up-front validation.
    #[cfg(test)]
    pub(crate) fn from_bottles_unchecked(contents: &[&str], capacity: usize) -> PuzzleState {
        let bottles = contents
            .iter()
            .map(|content| Bottle {
                units: content.chars().map(|c| Color(c as u8)).collect(),
            })
            .collect();
        PuzzleState { bottles, capacity }
    }

    /// Per-bottle unit capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn bottle_count(&self) -> usize {
        self.bottles.len()
    }

    pub fn bottles(&self) -> &[Bottle] {
        &self.bottles
    }

    /// Total units of each color, ordered by color for deterministic
    /// reporting.
    pub fn color_counts(&self) -> BTreeMap<Color, usize> {
        let mut counts = BTreeMap::new();
        for bottle in &self.bottles {
            for &color in bottle.units() {
                *counts.entry(color).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Check that every color's unit count is a whole number of bottles
    /// (conservation makes this invariant stable under pours, so one
    /// check on the initial state covers the whole search).
    pub fn validate(&self) -> Result<(), InvalidStateError> {
        for (color, count) in self.color_counts() {
            if count % self.capacity != 0 {
                return Err(InvalidStateError::ColorNotCollectible {
                    color: color.as_char(),
                    count,
                    capacity: self.capacity,
                });
            }
        }
        Ok(())
    }

    /// True iff every bottle is empty or full with a single color.
    pub fn is_goal(&self) -> bool {
        self.bottles
            .iter()
            .all(|b| b.is_empty() || (b.len() == self.capacity && b.is_monochrome()))
    }

    /// True iff `step` names two distinct bottles, the source is
    /// non-empty, the destination has free space, and the destination is
    /// empty or its top color matches the source's top color.
    pub fn is_legal(&self, step: Step) -> bool {
        if step.from == step.to || step.from >= self.bottles.len() || step.to >= self.bottles.len()
        {
            return false;
        }
        let src = &self.bottles[step.from];
        let dst = &self.bottles[step.to];
        match (src.top(), dst.top()) {
            (None, _) => false,
            (Some(_), None) => dst.len() < self.capacity,
            (Some(s), Some(d)) => s == d && dst.len() < self.capacity,
        }
    }

    /// Enumerate every legal pour, in (from, to) lexicographic order.
    /// The iterator borrows the state and can be restarted by calling
    /// again; the complete legal set is produced, with no pruning.
    pub fn legal_moves(&self) -> impl Iterator<Item = Step> + '_ {
        let n = self.bottles.len();
        (0..n)
            .flat_map(move |from| (0..n).map(move |to| Step::new(from, to)))
            .filter(move |&step| self.is_legal(step))
    }

    /// Apply a pour, producing the successor state. Transfers the
    /// maximal contiguous top run of the source's color, capped by the
    /// destination's free space.
    ///
    /// # Panics
    ///
    /// Panics if `step` is not legal for this state; passing an illegal
    /// step is a caller bug, not a recoverable condition.
    pub fn apply(&self, step: Step) -> PuzzleState {
        assert!(
            self.is_legal(step),
            "illegal pour {} on state {}",
            step,
            self
        );
        let mut next = self.clone();
        let run = next.bottles[step.from].top_run_len();
        let free = self.capacity - next.bottles[step.to].len();
        let moved = run.min(free);
        for _ in 0..moved {
            let unit = next.bottles[step.from].units.pop().unwrap();
            next.bottles[step.to].units.push(unit);
        }
        next
    }
}

impl fmt::Display for PuzzleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.capacity)?;
        for bottle in &self.bottles {
            write!(f, "[")?;
            for &color in bottle.units() {
                write!(f, "{}", color)?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

/// Parse an optional leading `N:` capacity prefix. Returns the capacity
/// (if present) and the byte offset where the bottle list starts.
fn parse_capacity_prefix(text: &str) -> Result<(Option<usize>, usize), ParseError> {
    let trimmed_start = text.len() - text.trim_start().len();
    let rest = &text[trimmed_start..];
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Ok((None, trimmed_start));
    }
    match rest[digits.len()..].chars().next() {
        Some(':') => {
            let capacity: usize = digits
                .parse()
                .map_err(|_| ParseError::InvalidCapacity(digits.clone()))?;
            if capacity == 0 {
                return Err(ParseError::InvalidCapacity(digits));
            }
            Ok((Some(capacity), trimmed_start + digits.len() + 1))
        }
        // Digits not followed by ':' are a stray token outside brackets.
        _ => Err(ParseError::UnexpectedChar(
            digits.chars().next().unwrap(),
            trimmed_start,
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_parse_basic() {
        let state = PuzzleState::from_text("[RRBB][BBRR][][]").unwrap();
        assert_eq!(state.capacity(), 4);
        assert_eq!(state.bottle_count(), 4);
        assert_eq!(state.bottles()[0].len(), 4);
        assert_eq!(state.bottles()[0].top().unwrap().as_char(), 'B');
        assert!(state.bottles()[2].is_empty());
    }

    #[test]
    fn test_parse_capacity_prefix_and_whitespace() {
        let state = PuzzleState::from_text("  4: [RR] [BB] [RRBB] ").unwrap();
        assert_eq!(state.capacity(), 4);
        assert_eq!(state.bottle_count(), 3);
    }

    #[test]
    fn test_parse_round_trips_through_display() {
        let text = "4:[RRBB][BBRR][][]";
        let state = PuzzleState::from_text(text).unwrap();
        assert_eq!(state.to_string(), text);
        assert_eq!(PuzzleState::from_text(&state.to_string()).unwrap(), state);
    }

    #[test]
    fn test_parse_unmatched_open_bracket() {
        let err = PuzzleState::from_text("[RRBB][BB").unwrap_err();
        assert_eq!(err, PuzzleError::Parse(ParseError::UnmatchedOpen(6)));
    }

    #[test]
    fn test_parse_stray_close_bracket() {
        let err = PuzzleState::from_text("[RR]]").unwrap_err();
        assert_eq!(err, PuzzleError::Parse(ParseError::UnexpectedChar(']', 4)));
    }

    #[test]
    fn test_parse_unknown_color_token() {
        let err = PuzzleState::from_text("[R!R]").unwrap_err();
        assert_eq!(err, PuzzleError::Parse(ParseError::UnknownColor('!', 2)));
    }

    #[test]
    fn test_parse_empty_input() {
        assert_eq!(
            PuzzleState::from_text("  ").unwrap_err(),
            PuzzleError::Parse(ParseError::Empty)
        );
    }

    #[test]
    fn test_parse_all_empty_bottles_needs_prefix() {
        assert_eq!(
            PuzzleState::from_text("[][]").unwrap_err(),
            PuzzleError::Parse(ParseError::UnknownCapacity)
        );
        let state = PuzzleState::from_text("4:[][]").unwrap();
        assert!(state.is_goal());
    }

    #[test]
    fn test_parse_zero_capacity_rejected() {
        assert_eq!(
            PuzzleState::from_text("0:[RR]").unwrap_err(),
            PuzzleError::Parse(ParseError::InvalidCapacity("0".to_string()))
        );
    }

    #[test]
    fn test_parse_bottle_over_capacity() {
        let err = PuzzleState::from_text("2:[RRR][B]").unwrap_err();
        assert_eq!(
            err,
            PuzzleError::Parse(ParseError::BottleOverCapacity {
                index: 0,
                len: 3,
                capacity: 2,
            })
        );
    }

    #[test]
    fn test_parse_rejects_unbalanced_color_counts() {
        let err = PuzzleState::from_text("[RRBB][BRR][]").unwrap_err();
        assert_eq!(
            err,
            PuzzleError::Invalid(InvalidStateError::ColorNotCollectible {
                color: 'B',
                count: 3,
                capacity: 4,
            })
        );
    }

    #[test]
    fn test_is_goal() {
        assert!(PuzzleState::from_text("[RRRR][]").unwrap().is_goal());
        assert!(!PuzzleState::from_text("[RRBB][BBRR]").unwrap().is_goal());
        // A partially filled monochrome bottle is not a finished bottle.
        assert!(!PuzzleState::from_text("4:[RR][RR]").unwrap().is_goal());
    }

    #[test]
    fn test_is_goal_is_stable() {
        let state = PuzzleState::from_text("[RRRR][]").unwrap();
        assert_eq!(state.is_goal(), state.is_goal());
    }

    #[test]
    fn test_legal_moves_complete_set() {
        let state = PuzzleState::from_text("[RRBB][BBRR][][]").unwrap();
        let moves: Vec<Step> = state.legal_moves().collect();
        // Full bottles can pour onto either empty bottle only.
        assert_eq!(
            moves,
            vec![
                Step::new(0, 2),
                Step::new(0, 3),
                Step::new(1, 2),
                Step::new(1, 3),
            ]
        );
    }

    #[test]
    fn test_legal_moves_color_compatibility() {
        let state = PuzzleState::from_text("4:[RRB][BBB][RR]").unwrap();
        let moves: HashSet<Step> = state.legal_moves().collect();
        // B on top of 0 may reach 1 (matching top); 1 may not reach 2.
        assert!(moves.contains(&Step::new(0, 1)));
        assert!(moves.contains(&Step::new(1, 0)));
        assert!(!moves.contains(&Step::new(1, 2)));
        assert!(!moves.contains(&Step::new(2, 0)));
    }

    #[test]
    fn test_legal_moves_iterator_restarts() {
        let state = PuzzleState::from_text("[RRBB][BBRR][][]").unwrap();
        let first: Vec<Step> = state.legal_moves().collect();
        let second: Vec<Step> = state.legal_moves().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_apply_moves_maximal_run() {
        let state = PuzzleState::from_text("[RRBB][BBRR][][]").unwrap();
        let next = state.apply(Step::new(0, 2));
        assert_eq!(next.to_string(), "4:[RR][BBRR][BB][]");
        // The receiver is untouched.
        assert_eq!(state.to_string(), "4:[RRBB][BBRR][][]");
    }

    #[test]
    fn test_apply_caps_at_destination_free_space() {
        let state = PuzzleState::from_text("4:[RBBB][RRB][R]").unwrap();
        // Source holds a 3-unit B run; the destination has 1 free slot.
        let next = state.apply(Step::new(0, 1));
        assert_eq!(next.to_string(), "4:[RBB][RRBB][R]");
    }

    #[test]
    fn test_apply_conserves_colors() {
        let state = PuzzleState::from_text("[RRBB][BBRR][][]").unwrap();
        let counts = state.color_counts();
        let next = state.apply(Step::new(1, 3));
        assert_eq!(next.color_counts(), counts);
    }

    #[test]
    #[should_panic(expected = "illegal pour")]
    fn test_apply_illegal_step_panics() {
        let state = PuzzleState::from_text("[RRBB][BBRR][][]").unwrap();
        // Destination top R does not match source top B.
        state.apply(Step::new(0, 1));
    }

    #[test]
    fn test_structural_equality_and_hash() {
        let a = PuzzleState::from_text("[RRBB][BBRR][][]").unwrap();
        let b = PuzzleState::from_text(" [RRBB] [BBRR] [] [] ").unwrap();
        let c = PuzzleState::from_text("[BBRR][RRBB][][]").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut seen = HashSet::new();
        seen.insert(a);
        assert!(seen.contains(&b));
        assert!(!seen.contains(&c));
    }

    #[test]
    fn test_from_bottles() {
        let state = PuzzleState::from_bottles(&["RRBB", "BBRR", "", ""], 4).unwrap();
        assert_eq!(state, PuzzleState::from_text("[RRBB][BBRR][][]").unwrap());
        assert!(PuzzleState::from_bottles(&["RRB", "B"], 4).is_err());
    }
}
