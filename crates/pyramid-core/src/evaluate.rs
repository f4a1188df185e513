use crate::puzzle::Puzzle;
use crate::pyramid::{Position, Pyramid};
use serde::{Deserialize, Serialize};

/// Result of checking a puzzle against its solution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Every editable cell has an answer
    pub all_filled: bool,
    /// Editable cells that are empty or wrong, in row-major order
    pub wrong_positions: Vec<Position>,
}

impl Evaluation {
    pub fn is_solved(&self) -> bool {
        self.all_filled && self.wrong_positions.is_empty()
    }

    pub fn is_wrong(&self, pos: Position) -> bool {
        self.wrong_positions.contains(&pos)
    }
}

/// Compare every editable cell of `puzzle` with `solution`
///
/// Empty cells are reported as wrong and also clear `all_filled`. Given
/// cells are skipped.
pub fn evaluate(puzzle: &Puzzle, solution: &Pyramid) -> Evaluation {
    let mut all_filled = true;
    let mut wrong_positions = Vec::new();

    for (pos, cell) in puzzle.cells() {
        if cell.given {
            continue;
        }

        let input = cell.input.trim();
        if input.is_empty() {
            all_filled = false;
            wrong_positions.push(pos);
            continue;
        }

        let actual = input.parse::<u64>().ok();
        let expected = solution.get(pos).map(u64::from);
        if actual.is_none() || actual != expected {
            wrong_positions.push(pos);
        }
    }

    Evaluation {
        all_filled,
        wrong_positions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::{Difficulty, Mask};
    use crate::pyramid::Generator;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fill_with_solution(puzzle: &mut Puzzle, solution: &Pyramid) {
        for pos in solution.positions() {
            let value = solution.get(pos).unwrap();
            puzzle.set_input(pos, &value.to_string());
        }
    }

    fn random_puzzle(seed: u64, rows: usize, difficulty: u8) -> (Pyramid, Puzzle) {
        let mut generator = Generator::with_seed(seed);
        let mut rng = StdRng::seed_from_u64(seed);
        let solution = generator.generate(rows, 500).unwrap();
        let mask = Mask::select(&solution, Difficulty::new(difficulty).unwrap(), &mut rng);
        let puzzle = Puzzle::build(&solution, &mask);
        (solution, puzzle)
    }

    #[test]
    fn test_correct_answers() {
        for seed in 0..30 {
            let (solution, mut puzzle) = random_puzzle(seed, 5, 5);
            fill_with_solution(&mut puzzle, &solution);
            let eval = evaluate(&puzzle, &solution);
            assert!(eval.all_filled);
            assert!(eval.wrong_positions.is_empty());
            assert!(eval.is_solved());
        }
    }

    #[test]
    fn test_empty_cell_is_wrong_and_unfilled() {
        let (solution, mut puzzle) = random_puzzle(11, 4, 4);
        fill_with_solution(&mut puzzle, &solution);
        let hidden = puzzle
            .cells()
            .find(|(_, cell)| !cell.given)
            .map(|(pos, _)| pos)
            .unwrap();
        puzzle.set_input(hidden, "");

        let eval = evaluate(&puzzle, &solution);
        assert!(!eval.all_filled);
        assert_eq!(eval.wrong_positions, vec![hidden]);
    }

    #[test]
    fn test_wrong_values_in_row_major_order() {
        let (solution, mut puzzle) = random_puzzle(5, 5, 5);
        fill_with_solution(&mut puzzle, &solution);
        let hidden: Vec<Position> = puzzle
            .cells()
            .filter(|(_, cell)| !cell.given)
            .map(|(pos, _)| pos)
            .collect();
        assert!(hidden.len() >= 2);

        // Write the two cells in reverse order; the report stays row-major
        for &pos in hidden.iter().take(2).rev() {
            let wrong = solution.get(pos).unwrap() + 1;
            puzzle.set_input(pos, &wrong.to_string());
        }

        let eval = evaluate(&puzzle, &solution);
        assert!(eval.all_filled);
        assert_eq!(eval.wrong_positions, hidden[..2].to_vec());
        assert!(eval.is_wrong(hidden[0]));
    }

    #[test]
    fn test_leading_zeros_parse() {
        let solution = Pyramid::from_base(vec![1, 2, 3]).unwrap();
        let mask = Mask::from_rows(vec![vec![true], vec![true, true], vec![true, true, false]])
            .unwrap();
        let mut puzzle = Puzzle::build(&solution, &mask);
        puzzle.set_input(Position::new(2, 2), "003");
        assert!(evaluate(&puzzle, &solution).is_solved());
    }

    #[test]
    fn test_given_cells_never_reported() {
        let (solution, puzzle) = random_puzzle(8, 6, 1);
        let eval = evaluate(&puzzle, &solution);
        for pos in &eval.wrong_positions {
            assert!(!puzzle.cell(*pos).unwrap().given);
        }
        assert_eq!(
            eval.wrong_positions.len(),
            solution.cell_count() - puzzle.given_count()
        );
    }

    #[test]
    fn test_idempotent() {
        let (solution, mut puzzle) = random_puzzle(21, 5, 3);
        let hidden = puzzle
            .cells()
            .find(|(_, cell)| !cell.given)
            .map(|(pos, _)| pos)
            .unwrap();
        puzzle.set_input(hidden, "9999");
        let first = evaluate(&puzzle, &solution);
        let second = evaluate(&puzzle, &solution);
        assert_eq!(first, second);
    }
}
