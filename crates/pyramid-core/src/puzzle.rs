use crate::mask::Mask;
use crate::pyramid::{Position, Pyramid};
use serde::{Deserialize, Serialize};

/// Longest answer a player can type into a cell
pub const MAX_INPUT_LEN: usize = 4;

/// Keep only decimal digits and cut the result to `max_len` characters
pub fn clean_digits(raw: &str, max_len: usize) -> String {
    raw.chars().filter(char::is_ascii_digit).take(max_len).collect()
}

/// Normalize raw keystrokes for a pyramid cell
pub fn clean_numeric_input(raw: &str) -> String {
    clean_digits(raw, MAX_INPUT_LEN)
}

/// A single puzzle cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Pre-filled and locked for the player
    pub given: bool,
    /// The solution value, present even while hidden
    pub value: u32,
    /// Digits typed by the player, empty when untouched
    pub input: String,
}

impl Cell {
    pub fn is_filled(&self) -> bool {
        self.given || !self.input.trim().is_empty()
    }

    /// What the player sees in this cell
    pub fn display(&self) -> String {
        if self.given {
            self.value.to_string()
        } else {
            self.input.clone()
        }
    }
}

/// The grid the player edits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Puzzle {
    rows: Vec<Vec<Cell>>,
}

impl Puzzle {
    /// Combine a solution with a mask of given cells
    pub fn build(solution: &Pyramid, mask: &Mask) -> Self {
        let rows = solution
            .rows()
            .iter()
            .enumerate()
            .map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .map(|(c, &value)| Cell {
                        given: mask.is_given(Position::new(r, c)),
                        value,
                        input: String::new(),
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        self.rows.get(pos.row)?.get(pos.col)
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> {
        Position::all(self.rows.len())
    }

    pub fn cells(&self) -> impl Iterator<Item = (Position, &Cell)> {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(move |(c, cell)| (Position::new(r, c), cell))
        })
    }

    /// Store cleaned player input in an editable cell
    ///
    /// Returns `false` if the position is out of range or the cell is given.
    pub fn set_input(&mut self, pos: Position, raw: &str) -> bool {
        match self.rows.get_mut(pos.row).and_then(|row| row.get_mut(pos.col)) {
            Some(cell) if !cell.given => {
                cell.input = clean_numeric_input(raw);
                true
            }
            _ => false,
        }
    }

    /// Clear every player answer
    pub fn clear_inputs(&mut self) {
        for cell in self.rows.iter_mut().flatten() {
            cell.input.clear();
        }
    }

    pub fn is_filled(&self) -> bool {
        self.rows.iter().flatten().all(Cell::is_filled)
    }

    pub fn given_count(&self) -> usize {
        self.rows.iter().flatten().filter(|cell| cell.given).count()
    }

    /// Encoding of the whole grid, used to tell whether anything changed
    pub fn signature(&self) -> String {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| {
                        if cell.given {
                            format!("G{}", cell.value)
                        } else {
                            format!("I{}", cell.input)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("|")
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Check that this puzzle describes `solution`: same shape and values
    pub fn matches(&self, solution: &Pyramid) -> bool {
        self.rows.len() == solution.row_count()
            && self.cells().all(|(pos, cell)| solution.get(pos) == Some(cell.value))
    }
}
