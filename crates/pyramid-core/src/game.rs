use crate::error::{Error, Result};
use crate::mask::{Difficulty, Mask};
use crate::puzzle::Puzzle;
use crate::pyramid::{Generator, Position, Pyramid};
use crate::records::{SessionRecord, Stats};
use crate::settings::Settings;
use crate::verify::{CheckOutcome, Phase, Verifier};
use log::{debug, info};

/// What the player is told right now
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    /// Fresh puzzle, or still filling in
    Ready,
    /// Hints dropped after the player asked to try again
    TryAgain,
    /// First wrong full grid
    FirstWrong,
    /// Wrong again, wrong cells marked
    Highlighted,
    Solved,
    StatsReset,
    /// Generating a new puzzle failed; the old puzzle is still in play
    Problem(Error),
}

impl Status {
    pub fn emoji(&self) -> &'static str {
        match self {
            Status::Ready | Status::TryAgain => "🧠",
            Status::FirstWrong => "😕",
            Status::Highlighted => "🧐",
            Status::Solved => "🎉",
            Status::StatsReset => "🧼",
            Status::Problem(Error::InvalidSettings(_)) => "⚠️",
            Status::Problem(Error::GenerationExhausted { .. }) => "😵‍💫",
        }
    }

    pub fn text(&self) -> String {
        match self {
            Status::Ready => "Fill in the empty bricks!".to_string(),
            Status::TryAgain => "Okay! Give it another go 💪".to_string(),
            Status::FirstWrong => "Hmm… something is not right yet.".to_string(),
            Status::Highlighted => "The wrong bricks are marked red. You can do it! 💪".to_string(),
            Status::Solved => "SUPER! You did it! 🌈".to_string(),
            Status::StatsReset => "Score reset!".to_string(),
            Status::Problem(e) => e.to_string(),
        }
    }

    /// Whether this status reports a failure
    pub fn is_problem(&self) -> bool {
        matches!(self, Status::Problem(_))
    }
}

/// A running number pyramid game
///
/// Owns the solution and the puzzle built from it, the staged verifier and
/// the lifetime score. Front ends drive it and persist what it exposes.
pub struct Game {
    generator: Generator,
    settings: Settings,
    solution: Pyramid,
    puzzle: Puzzle,
    verifier: Verifier,
    stats: Stats,
    status: Status,
}

impl Game {
    /// Start a game with a freshly generated puzzle
    pub fn new(settings: Settings, stats: Stats) -> Result<Self> {
        Self::with_generator(Generator::new(), settings, stats)
    }

    /// Start a game that draws its puzzles from `generator`
    pub fn with_generator(mut generator: Generator, settings: Settings, stats: Stats) -> Result<Self> {
        let (solution, puzzle) = build_puzzle(&mut generator, settings)?;
        Ok(Self {
            generator,
            settings,
            solution,
            puzzle,
            verifier: Verifier::new(),
            stats,
            status: Status::Ready,
        })
    }

    /// Continue a saved session
    ///
    /// Returns `None` when the record holds no puzzle or fails validation:
    /// the solution must be a proper pyramid within the saved top limit and
    /// the puzzle must carry the same values.
    pub fn restore(record: &SessionRecord, stats: Stats) -> Option<Self> {
        let (Some(solution), Some(puzzle)) = (&record.solution, &record.puzzle) else {
            return None;
        };

        let defaults = Settings::default();
        let settings = Settings::new(
            record.rows.unwrap_or(solution.row_count()) as i64,
            i64::from(record.difficulty.unwrap_or(defaults.difficulty().level())),
            i64::from(record.top_max.unwrap_or(defaults.top_max())),
        )
        .ok()?;

        if settings.rows() != solution.row_count()
            || solution.apex() > settings.top_max()
            || !puzzle.matches(solution)
        {
            debug!("Saved session does not describe a valid puzzle");
            return None;
        }

        let mut verifier = Verifier::restore(
            record.checks_this_puzzle.unwrap_or(0),
            record.had_first_wrong_this_puzzle.unwrap_or(false),
            record.show_wrong_highlights.unwrap_or(false),
        );
        verifier.resume(puzzle, solution);

        let status = match verifier.phase() {
            Phase::Editing => Status::Ready,
            Phase::GentleHint => Status::FirstWrong,
            Phase::ExplicitHighlight => Status::Highlighted,
            Phase::Correct => Status::Solved,
        };

        Some(Self {
            generator: Generator::new(),
            settings,
            solution: solution.clone(),
            puzzle: puzzle.clone(),
            verifier,
            stats,
            status,
        })
    }

    /// Capture the game for a session record
    pub fn snapshot(&self, session_start_ms: u64, now_ms: u64) -> SessionRecord {
        SessionRecord {
            session_start_time: session_start_ms,
            last_activity: now_ms,
            solution: Some(self.solution.clone()),
            puzzle: Some(self.puzzle.clone()),
            rows: Some(self.settings.rows()),
            difficulty: Some(self.settings.difficulty().level()),
            top_max: Some(self.settings.top_max()),
            checks_this_puzzle: Some(self.verifier.checks_this_puzzle()),
            had_first_wrong_this_puzzle: Some(self.verifier.had_first_wrong()),
            show_wrong_highlights: Some(self.verifier.show_wrong_highlights()),
        }
    }

    /// Replace the puzzle with a new one built from `settings`
    ///
    /// On failure the current puzzle stays in play and the status carries
    /// the error.
    pub fn new_puzzle(&mut self, settings: Settings) -> Result<()> {
        match build_puzzle(&mut self.generator, settings) {
            Ok((solution, puzzle)) => {
                self.settings = settings;
                self.solution = solution;
                self.puzzle = puzzle;
                self.verifier.reset();
                self.status = Status::Ready;
                Ok(())
            }
            Err(e) => {
                info!("New puzzle rejected: {e}");
                self.status = Status::Problem(e.clone());
                Err(e)
            }
        }
    }

    /// Like [`Game::new_puzzle`], for loosely typed form values
    pub fn new_puzzle_from_raw(&mut self, rows: f64, difficulty: f64, top_max: f64) -> Result<()> {
        match Settings::from_raw(rows, difficulty, top_max) {
            Ok(settings) => self.new_puzzle(settings),
            Err(e) => {
                let e = Error::from(e);
                self.status = Status::Problem(e.clone());
                Err(e)
            }
        }
    }

    /// Type into a cell and run the staged check
    ///
    /// Returns the outcome when a full grid was checked. Edits are refused
    /// once the puzzle is solved.
    pub fn update_input(&mut self, pos: Position, raw: &str) -> Option<CheckOutcome> {
        if self.verifier.is_solved() || !self.puzzle.set_input(pos, raw) {
            return None;
        }

        let outcome = self.verifier.observe(&self.puzzle, &self.solution)?;
        match outcome {
            CheckOutcome::Solved { first_try } => {
                self.stats.record_solved(first_try);
                self.status = Status::Solved;
                debug!(
                    "Puzzle solved (first try: {first_try}), {} solved so far",
                    self.stats.solved
                );
            }
            CheckOutcome::FirstWrong => self.status = Status::FirstWrong,
            CheckOutcome::Highlighted => self.status = Status::Highlighted,
        }
        Some(outcome)
    }

    /// Clear a cell
    pub fn clear_cell(&mut self, pos: Position) -> Option<CheckOutcome> {
        self.update_input(pos, "")
    }

    /// Drop hints and start the staged feedback over
    pub fn try_again(&mut self) {
        if self.verifier.is_solved() {
            return;
        }
        self.verifier.try_again();
        self.status = Status::TryAgain;
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
        self.status = Status::StatsReset;
    }

    /// Get the current settings
    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// Get the difficulty
    pub fn difficulty(&self) -> Difficulty {
        self.settings.difficulty()
    }

    /// Get the solution
    pub fn solution(&self) -> &Pyramid {
        &self.solution
    }

    /// Get the puzzle being played
    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn verifier(&self) -> &Verifier {
        &self.verifier
    }

    pub fn phase(&self) -> Phase {
        self.verifier.phase()
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Check if the puzzle is solved
    pub fn is_solved(&self) -> bool {
        self.verifier.is_solved()
    }

    /// Whether `pos` should be shown as wrong
    pub fn is_marked_wrong(&self, pos: Position) -> bool {
        self.verifier.is_highlighted(pos)
    }

    pub fn wrong_positions(&self) -> &[Position] {
        self.verifier.visible_wrong_positions()
    }
}

/// Generate a solution and mask it; nothing is replaced on failure
fn build_puzzle(generator: &mut Generator, settings: Settings) -> Result<(Pyramid, Puzzle)> {
    let solution = generator.generate(settings.rows(), settings.top_max())?;
    let mask = Mask::select(&solution, settings.difficulty(), generator.rng());
    let puzzle = Puzzle::build(&solution, &mask);
    debug!(
        "Built {}-row puzzle at difficulty {} with {} given cells",
        settings.rows(),
        settings.difficulty(),
        puzzle.given_count()
    );
    Ok((solution, puzzle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SettingsError;
    use crate::pyramid::GeneratorConfig;
    use crate::records::SESSION_TIMEOUT_MS;

    fn seeded_game(seed: u64) -> Game {
        Game::with_generator(Generator::with_seed(seed), Settings::default(), Stats::default()).unwrap()
    }

    fn editable(game: &Game) -> Vec<Position> {
        game.puzzle()
            .cells()
            .filter(|(_, cell)| !cell.given)
            .map(|(pos, _)| pos)
            .collect()
    }

    fn answer(game: &Game, pos: Position) -> u32 {
        game.solution().get(pos).unwrap()
    }

    fn fill_offset(game: &mut Game, offset: u32) -> Vec<Option<CheckOutcome>> {
        editable(game)
            .into_iter()
            .map(|pos| {
                let value = answer(game, pos) + offset;
                game.update_input(pos, &value.to_string())
            })
            .collect()
    }

    #[test]
    fn test_default_game() {
        let game = seeded_game(1);
        assert_eq!(game.puzzle().row_count(), 3);
        assert!(game.solution().apex() <= 20);
        assert_eq!(game.puzzle().given_count(), 3);
        assert_eq!(game.status(), &Status::Ready);
        assert_eq!(game.phase(), Phase::Editing);
    }

    #[test]
    fn test_staged_scenario() {
        let mut game = seeded_game(42);
        let cells = editable(&game);

        let outcomes = fill_offset(&mut game, 1);
        assert_eq!(outcomes.last(), Some(&Some(CheckOutcome::FirstWrong)));
        assert!(outcomes[..outcomes.len() - 1].iter().all(Option::is_none));
        assert_eq!(game.phase(), Phase::GentleHint);
        assert!(game.wrong_positions().is_empty());
        assert_eq!(game.status().emoji(), "😕");

        let last = *cells.last().unwrap();
        let outcome = game.update_input(last, &(answer(&game, last) + 2).to_string());
        assert_eq!(outcome, Some(CheckOutcome::Highlighted));
        assert_eq!(game.phase(), Phase::ExplicitHighlight);
        assert_eq!(game.wrong_positions(), cells.as_slice());

        let outcomes = fill_offset(&mut game, 0);
        assert_eq!(
            outcomes.last(),
            Some(&Some(CheckOutcome::Solved { first_try: false }))
        );
        assert_eq!(game.phase(), Phase::Correct);
        assert!(game.wrong_positions().is_empty());
        assert_eq!(game.stats(), Stats { solved: 1, first_try: 0 });
        assert_eq!(game.status(), &Status::Solved);
    }

    #[test]
    fn test_first_try_scoring() {
        let mut game = seeded_game(9);
        fill_offset(&mut game, 0);
        assert!(game.is_solved());
        assert_eq!(game.stats(), Stats { solved: 1, first_try: 1 });
    }

    #[test]
    fn test_edits_refused_after_solve() {
        let mut game = seeded_game(9);
        fill_offset(&mut game, 0);
        let pos = editable(&game)[0];
        let padded = format!("0{}", answer(&game, pos));
        assert_eq!(game.update_input(pos, &padded), None);
        assert_eq!(game.stats().solved, 1);
        assert_ne!(game.puzzle().cell(pos).unwrap().input, padded);
    }

    #[test]
    fn test_given_cells_are_locked() {
        let mut game = seeded_game(3);
        let before = game.puzzle().clone();
        assert_eq!(game.update_input(Position::APEX, "99"), None);
        assert_eq!(game.puzzle(), &before);
    }

    #[test]
    fn test_try_again() {
        let mut game = seeded_game(5);
        fill_offset(&mut game, 1);
        game.try_again();
        assert_eq!(game.phase(), Phase::Editing);
        assert_eq!(game.status(), &Status::TryAgain);
        assert_eq!(game.verifier().checks_this_puzzle(), 1);

        fill_offset(&mut game, 0);
        assert_eq!(game.stats(), Stats { solved: 1, first_try: 0 });
    }

    #[test]
    fn test_new_puzzle_resets_per_puzzle_state() {
        let mut game = seeded_game(5);
        fill_offset(&mut game, 1);
        let settings = Settings::new(5, 1, 200).unwrap();
        game.new_puzzle(settings).unwrap();
        assert_eq!(game.puzzle().row_count(), 5);
        assert_eq!(game.settings(), settings);
        assert_eq!(game.verifier(), &Verifier::new());
        assert_eq!(game.status(), &Status::Ready);
    }

    #[test]
    fn test_failed_generation_keeps_puzzle() {
        let mut game = seeded_game(5);
        let before = game.puzzle().clone();
        let settings = Settings::new(20, 3, 1).unwrap();
        let err = game.new_puzzle(settings).unwrap_err();
        assert!(matches!(err, Error::GenerationExhausted { rows: 20, top_max: 1, .. }));
        assert_eq!(game.puzzle(), &before);
        assert_eq!(game.settings(), Settings::default());
        assert!(game.status().is_problem());
        assert_eq!(game.status().emoji(), "😵‍💫");
    }

    #[test]
    fn test_raw_settings_rejected() {
        let mut game = seeded_game(5);
        let err = game.new_puzzle_from_raw(4.0, 2.0, -3.0).unwrap_err();
        assert_eq!(err, Error::InvalidSettings(SettingsError::TopMax(-3.0)));
        assert_eq!(game.status().emoji(), "⚠️");
        assert_eq!(game.puzzle().row_count(), 3);

        game.new_puzzle_from_raw(4.7, 9.0, 300.0).unwrap();
        assert_eq!(game.puzzle().row_count(), 4);
        assert_eq!(game.difficulty().level(), 5);
    }

    #[test]
    fn test_small_attempt_budget() {
        let config = GeneratorConfig {
            max_attempts: 1,
            base_max: 9,
        };
        let result = Game::with_generator(
            Generator::with_config(config),
            Settings::new(20, 3, 1).unwrap(),
            Stats::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_reset_stats() {
        let mut game = seeded_game(9);
        fill_offset(&mut game, 0);
        game.reset_stats();
        assert_eq!(game.stats(), Stats::default());
        assert_eq!(game.status().text(), "Score reset!");
    }

    #[test]
    fn test_snapshot_restore() {
        let mut game = seeded_game(11);
        fill_offset(&mut game, 1);
        let last = *editable(&game).last().unwrap();
        game.update_input(last, &(answer(&game, last) + 2).to_string());
        assert_eq!(game.phase(), Phase::ExplicitHighlight);

        let record = game.snapshot(1_000, 2_000);
        let json = serde_json::to_string(&record).unwrap();
        let record: SessionRecord = serde_json::from_str(&json).unwrap();
        assert!(!record.is_expired(2_000 + SESSION_TIMEOUT_MS));

        let restored = Game::restore(&record, game.stats()).unwrap();
        assert_eq!(restored.puzzle(), game.puzzle());
        assert_eq!(restored.solution(), game.solution());
        assert_eq!(restored.phase(), Phase::ExplicitHighlight);
        assert_eq!(restored.wrong_positions(), game.wrong_positions());
        assert_eq!(restored.verifier().checks_this_puzzle(), 2);
        assert_eq!(restored.status(), &Status::Highlighted);
    }

    #[test]
    fn test_restore_solved_session_stays_solved() {
        let mut game = seeded_game(9);
        fill_offset(&mut game, 0);
        let restored = Game::restore(&game.snapshot(0, 0), Stats::default()).unwrap();
        assert!(restored.is_solved());
    }

    #[test]
    fn test_restore_rejects_corrupt_records() {
        let game = seeded_game(13);
        let empty = SessionRecord::start(0);
        assert!(Game::restore(&empty, Stats::default()).is_none());

        let mut wrong_rows = game.snapshot(0, 0);
        wrong_rows.rows = Some(4);
        assert!(Game::restore(&wrong_rows, Stats::default()).is_none());

        let mut low_top = game.snapshot(0, 0);
        low_top.top_max = Some(game.solution().apex().saturating_sub(1).max(1));
        if game.solution().apex() > 1 {
            assert!(Game::restore(&low_top, Stats::default()).is_none());
        }

        let mut other = game.snapshot(0, 0);
        other.solution = Some(Pyramid::from_base(vec![9, 9, 9]).unwrap());
        other.top_max = Some(100);
        assert!(Game::restore(&other, Stats::default()).is_none());

        // Broken sum invariant is caught while decoding
        let json = r#"{"sessionStartTime":0,"lastActivity":0,"solution":[[9],[1,2],[1,0,2]]}"#;
        assert!(serde_json::from_str::<SessionRecord>(json).is_err());
    }
}
