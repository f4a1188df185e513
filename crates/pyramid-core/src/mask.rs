use crate::pyramid::{cell_count, Position, Pyramid};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Puzzle difficulty from 1 (most cells given) to 5 (fewest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Difficulty used when nothing else was chosen
    pub const DEFAULT: Difficulty = Difficulty(3);

    pub fn new(level: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&level).then_some(Self(level))
    }

    pub fn level(self) -> u8 {
        self.0
    }

    /// Share of cells shown to the player at this difficulty
    pub fn given_ratio(self) -> f64 {
        given_ratio(i64::from(self.0))
    }

    pub fn all() -> impl Iterator<Item = Difficulty> {
        (Self::MIN..=Self::MAX).map(Difficulty)
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Difficulty::new(level).ok_or_else(|| format!("difficulty {level} is not between 1 and 5"))
    }
}

impl From<Difficulty> for u8 {
    fn from(difficulty: Difficulty) -> u8 {
        difficulty.0
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Given-cell ratio for a raw difficulty level; unknown levels fall back to 3
pub fn given_ratio(level: i64) -> f64 {
    match level {
        1 => 0.72,
        2 => 0.58,
        3 => 0.42,
        4 => 0.30,
        5 => 0.22,
        _ => 0.42,
    }
}

/// Number of given cells to aim for: never fewer than one per row
pub fn target_given_count(rows: usize, ratio: f64) -> usize {
    let scaled = (cell_count(rows) as f64 * ratio).round() as usize;
    scaled.max(rows)
}

/// Which cells of a pyramid are shown to the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    given: Vec<Vec<bool>>,
}

impl Mask {
    /// Choose the given cells of `solution` for `difficulty`
    ///
    /// One random cell per row plus the apex are always given; the rest are
    /// drawn in shuffled order until the target count for the difficulty is
    /// reached.
    pub fn select<R: Rng>(solution: &Pyramid, difficulty: Difficulty, rng: &mut R) -> Self {
        let rows = solution.row_count();
        let target = target_given_count(rows, difficulty.given_ratio());

        let mut given: Vec<Vec<bool>> = (0..rows).map(|r| vec![false; r + 1]).collect();
        for (r, row) in given.iter_mut().enumerate() {
            row[rng.gen_range(0..=r)] = true;
        }
        given[0][0] = true;

        let mut current = given.iter().flatten().filter(|&&g| g).count();

        let mut positions: Vec<Position> = solution.positions().collect();
        positions.shuffle(rng);

        for pos in positions {
            if current >= target {
                break;
            }
            let cell = &mut given[pos.row][pos.col];
            if !*cell {
                *cell = true;
                current += 1;
            }
        }

        Self { given }
    }

    /// Build a mask from explicit rows; `None` if the shape is not triangular
    pub fn from_rows(given: Vec<Vec<bool>>) -> Option<Self> {
        let triangular =
            !given.is_empty() && given.iter().enumerate().all(|(r, row)| row.len() == r + 1);
        triangular.then_some(Self { given })
    }

    pub fn row_count(&self) -> usize {
        self.given.len()
    }

    pub fn is_given(&self, pos: Position) -> bool {
        self.given
            .get(pos.row)
            .and_then(|row| row.get(pos.col))
            .copied()
            .unwrap_or(false)
    }

    pub fn given_count(&self) -> usize {
        self.given.iter().flatten().filter(|&&g| g).count()
    }

    pub fn rows(&self) -> &[Vec<bool>] {
        &self.given
    }
}
