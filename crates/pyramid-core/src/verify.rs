//! Staged answer checking
//!
//! A full grid is checked once per distinct signature. The first wrong check
//! only tells the player something is off; later wrong checks reveal exactly
//! which cells are wrong and keep that list current while the player edits.

use crate::evaluate::{evaluate, Evaluation};
use crate::puzzle::Puzzle;
use crate::pyramid::{Position, Pyramid};
use serde::{Deserialize, Serialize};

/// Feedback phase for the current puzzle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Nothing checked yet, or the player asked to try again
    #[default]
    Editing,
    /// First wrong full grid: a hint without positions
    GentleHint,
    /// Wrong again: the wrong cells are shown
    ExplicitHighlight,
    /// Every cell matches; the puzzle is done
    Correct,
}

/// What a completed check decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The grid is correct
    Solved { first_try: bool },
    /// First wrong grid for this puzzle
    FirstWrong,
    /// Wrong again; wrong cells are now visible
    Highlighted,
}

/// Per-puzzle verification state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verifier {
    phase: Phase,
    checks_this_puzzle: u32,
    had_first_wrong: bool,
    show_wrong_highlights: bool,
    wrong_positions: Vec<Position>,
    last_signature: String,
}

impl Verifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild state saved with a session
    pub fn restore(checks_this_puzzle: u32, had_first_wrong: bool, show_wrong_highlights: bool) -> Self {
        let phase = if show_wrong_highlights {
            Phase::ExplicitHighlight
        } else if had_first_wrong {
            Phase::GentleHint
        } else {
            Phase::Editing
        };
        Self {
            phase,
            checks_this_puzzle,
            had_first_wrong,
            show_wrong_highlights,
            ..Self::default()
        }
    }

    /// Pick up a restored puzzle without re-checking a grid that was already checked
    pub fn resume(&mut self, puzzle: &Puzzle, solution: &Pyramid) {
        let evaluation = evaluate(puzzle, solution);
        if evaluation.all_filled {
            self.last_signature = puzzle.signature();
            if evaluation.wrong_positions.is_empty() {
                self.phase = Phase::Correct;
                self.show_wrong_highlights = false;
            }
        }
        if self.show_wrong_highlights {
            self.wrong_positions = evaluation.wrong_positions;
        }
    }

    /// Forget everything; used when a new puzzle is built
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn checks_this_puzzle(&self) -> u32 {
        self.checks_this_puzzle
    }

    pub fn had_first_wrong(&self) -> bool {
        self.had_first_wrong
    }

    pub fn show_wrong_highlights(&self) -> bool {
        self.show_wrong_highlights
    }

    /// Wrong cells the player may see; empty unless highlighting
    pub fn visible_wrong_positions(&self) -> &[Position] {
        if self.show_wrong_highlights {
            &self.wrong_positions
        } else {
            &[]
        }
    }

    pub fn is_highlighted(&self, pos: Position) -> bool {
        self.visible_wrong_positions().contains(&pos)
    }

    pub fn is_solved(&self) -> bool {
        self.phase == Phase::Correct
    }

    /// React to the puzzle after an edit
    ///
    /// While highlighting, the wrong list is refreshed on every call. A check
    /// only runs when the grid is full and differs from the last grid checked.
    pub fn observe(&mut self, puzzle: &Puzzle, solution: &Pyramid) -> Option<CheckOutcome> {
        if self.phase == Phase::Correct {
            return None;
        }

        let evaluation = evaluate(puzzle, solution);

        if self.show_wrong_highlights {
            self.wrong_positions = evaluation.wrong_positions.clone();
        }

        if !evaluation.all_filled {
            self.last_signature.clear();
            return None;
        }

        let signature = puzzle.signature();
        if signature == self.last_signature {
            return None;
        }
        self.last_signature = signature;

        Some(self.apply(evaluation))
    }

    fn apply(&mut self, evaluation: Evaluation) -> CheckOutcome {
        if evaluation.wrong_positions.is_empty() {
            let first_try = self.checks_this_puzzle == 0;
            self.phase = Phase::Correct;
            self.wrong_positions.clear();
            self.show_wrong_highlights = false;
            self.had_first_wrong = false;
            return CheckOutcome::Solved { first_try };
        }

        self.checks_this_puzzle += 1;

        if !self.had_first_wrong {
            self.had_first_wrong = true;
            self.phase = Phase::GentleHint;
            self.wrong_positions.clear();
            self.show_wrong_highlights = false;
            return CheckOutcome::FirstWrong;
        }

        self.phase = Phase::ExplicitHighlight;
        self.wrong_positions = evaluation.wrong_positions;
        self.show_wrong_highlights = true;
        CheckOutcome::Highlighted
    }

    /// Drop the hints and start the two-step feedback over
    ///
    /// The check counter stays, so a retry never earns the first-try bonus.
    pub fn try_again(&mut self) {
        if self.phase == Phase::Correct {
            return;
        }
        self.phase = Phase::Editing;
        self.wrong_positions.clear();
        self.show_wrong_highlights = false;
        self.had_first_wrong = false;
    }
}
