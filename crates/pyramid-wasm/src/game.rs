//! Browser-side game state
//!
//! Everything here is plain Rust. Clocks are passed in by the caller so the
//! state can be driven from `requestAnimationFrame` in the browser and from
//! ordinary unit tests.

use log::{debug, info};
use pyramid_core::{
    clean_digits, load_record, load_session, save_record, CheckOutcome, FlashTimer, Game,
    NumberRange, Phase, Position, Preferences, Settings, Stats, Storage, TensOnes, Verdict,
    CELEBRATE_MS, OOPS_MS, PREFERENCES_KEY, SESSION_KEY, STATS_KEY,
};
use pyramid_core::tens_ones::{ANSWER_LEN, MAX_PRINT_PAGES};
use serde::Serialize;

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ScreenState {
    Pyramid,
    TensOnes,
}

/// One brick as the page draws it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellView {
    pub row: usize,
    pub col: usize,
    pub text: String,
    pub given: bool,
    pub wrong: bool,
    pub selected: bool,
}

/// Snapshot of everything the page shows
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub screen: ScreenState,
    pub rows: Vec<Vec<CellView>>,
    pub emoji: &'static str,
    pub message: String,
    pub problem: bool,
    pub phase: Phase,
    pub can_try_again: bool,
    pub solved: bool,
    pub celebrating: bool,
    pub oops: bool,
    pub stats: Stats,
    pub settings: SettingsView,
    pub session_secs: u64,
    pub tens_ones: TensOnesView,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub rows: usize,
    pub difficulty: u8,
    pub top_max: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TensOnesView {
    pub number: u32,
    pub tens_input: String,
    pub ones_input: String,
    pub focus_ones: bool,
    pub verdict: Option<&'static str>,
    pub tens_ok: Option<bool>,
    pub ones_ok: Option<bool>,
    pub range: &'static str,
    pub print_pages: u32,
    pub solved: u32,
}

/// The game state behind the page
pub struct GameState {
    game: Game,
    storage: Box<dyn Storage>,
    session_start_ms: u64,
    cursor: Position,
    screen: ScreenState,
    celebrate: FlashTimer,
    oops: FlashTimer,
    tens_ones: TensOnes,
    tens_input: String,
    ones_input: String,
    focus_ones: bool,
    tens_verdict: Option<Verdict>,
}

impl GameState {
    /// Resume the saved session if it is recent, otherwise start fresh
    ///
    /// `wall_ms` is milliseconds since the Unix epoch.
    pub fn new(mut storage: Box<dyn Storage>, wall_ms: u64) -> pyramid_core::Result<Self> {
        let stats: Stats = load_record(storage.as_ref(), STATS_KEY).unwrap_or_default();

        let mut session_start_ms = wall_ms;
        let mut resumed = None;
        if let Some(record) = load_session(storage.as_mut(), wall_ms) {
            resumed = Game::restore(&record, stats);
            if resumed.is_some() || record.puzzle.is_none() {
                session_start_ms = record.session_start_time;
            }
        }

        let game = match resumed {
            Some(game) => {
                info!("Resumed saved session");
                game
            }
            None => Game::new(Settings::default(), stats)?,
        };

        let preferences: Preferences =
            load_record(storage.as_ref(), PREFERENCES_KEY).unwrap_or_default();

        let mut state = Self {
            cursor: first_open_brick(&game),
            game,
            storage,
            session_start_ms,
            screen: ScreenState::Pyramid,
            celebrate: FlashTimer::new(),
            oops: FlashTimer::new(),
            tens_ones: TensOnes::new(&preferences),
            tens_input: String::new(),
            ones_input: String::new(),
            focus_ones: false,
            tens_verdict: None,
        };
        state.save_session(wall_ms);
        Ok(state)
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn screen(&self) -> ScreenState {
        self.screen
    }

    pub fn tens_ones(&self) -> &TensOnes {
        &self.tens_ones
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    /// Expire flash timers; `now_ms` is a monotonic clock
    pub fn tick(&mut self, now_ms: u64) {
        self.celebrate.expire(now_ms);
        self.oops.expire(now_ms);
    }

    /// Start a new puzzle from raw form values
    ///
    /// On failure the old puzzle stays and the status explains why.
    pub fn new_puzzle(&mut self, rows: f64, difficulty: f64, top_max: f64, wall_ms: u64) -> bool {
        let ok = self
            .game
            .new_puzzle_from_raw(rows, difficulty, top_max)
            .is_ok();
        if ok {
            self.after_new_puzzle(wall_ms);
        }
        ok
    }

    /// Another puzzle with the current settings
    pub fn next_puzzle(&mut self, wall_ms: u64) -> bool {
        let ok = self.game.new_puzzle(self.game.settings()).is_ok();
        if ok {
            self.after_new_puzzle(wall_ms);
        }
        ok
    }

    fn after_new_puzzle(&mut self, wall_ms: u64) {
        self.cursor = first_open_brick(&self.game);
        self.celebrate.cancel();
        self.oops.cancel();
        self.save_session(wall_ms);
    }

    /// Replace what the player typed in a brick
    pub fn set_input(&mut self, pos: Position, raw: &str, now_ms: u64, wall_ms: u64) {
        let outcome = self.game.update_input(pos, raw);
        match outcome {
            Some(CheckOutcome::Solved { first_try }) => {
                debug!("Solved, first try: {first_try}");
                self.oops.cancel();
                self.celebrate.trigger(now_ms, CELEBRATE_MS);
                save_record(self.storage.as_mut(), STATS_KEY, &self.game.stats());
            }
            Some(CheckOutcome::FirstWrong) => self.oops.trigger(now_ms, OOPS_MS),
            Some(CheckOutcome::Highlighted) | None => {}
        }
        self.save_session(wall_ms);
    }

    pub fn try_again(&mut self, wall_ms: u64) {
        self.game.try_again();
        self.oops.cancel();
        self.save_session(wall_ms);
    }

    pub fn reset_stats(&mut self) {
        self.game.reset_stats();
        save_record(self.storage.as_mut(), STATS_KEY, &self.game.stats());
    }

    pub fn save_session(&mut self, wall_ms: u64) {
        let record = self.game.snapshot(self.session_start_ms, wall_ms);
        save_record(self.storage.as_mut(), SESSION_KEY, &record);
    }

    /// Keyboard handling, keyed by `KeyboardEvent.key`
    ///
    /// Returns whether the key was used.
    pub fn handle_key(&mut self, key: &str, now_ms: u64, wall_ms: u64) -> bool {
        match self.screen {
            ScreenState::Pyramid => self.handle_pyramid_key(key, now_ms, wall_ms),
            ScreenState::TensOnes => self.handle_tens_ones_key(key, now_ms),
        }
    }

    fn handle_pyramid_key(&mut self, key: &str, now_ms: u64, wall_ms: u64) -> bool {
        match key {
            "ArrowUp" | "k" => self.move_cursor(-1, 0),
            "ArrowDown" | "j" => self.move_cursor(1, 0),
            "ArrowLeft" | "h" => self.move_cursor(0, -1),
            "ArrowRight" | "l" => self.move_cursor(0, 1),
            "Backspace" => {
                let mut input = self.current_input();
                input.pop();
                self.set_input(self.cursor, &input, now_ms, wall_ms);
            }
            "Delete" | "x" => self.set_input(self.cursor, "", now_ms, wall_ms),
            "a" => {
                if matches!(self.game.phase(), Phase::GentleHint | Phase::ExplicitHighlight) {
                    self.try_again(wall_ms);
                }
            }
            "n" => {
                self.next_puzzle(wall_ms);
            }
            "Tab" => self.screen = ScreenState::TensOnes,
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_digit() => {
                        let mut input = self.current_input();
                        input.push(c);
                        self.set_input(self.cursor, &input, now_ms, wall_ms);
                    }
                    _ => return false,
                }
            }
        }
        true
    }

    fn handle_tens_ones_key(&mut self, key: &str, now_ms: u64) -> bool {
        match key {
            "Tab" | "Escape" => self.screen = ScreenState::Pyramid,
            "ArrowLeft" | "ArrowRight" => self.focus_ones = !self.focus_ones,
            "Backspace" => {
                self.focused_answer().pop();
                self.tens_verdict = None;
            }
            "Enter" => {
                if self.tens_verdict == Some(Verdict::Correct) {
                    self.next_task();
                } else {
                    self.submit_tens_ones(now_ms);
                }
            }
            "n" => self.next_task(),
            "g" => self.set_range(self.tens_ones.range().next()),
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_digit() => {
                        let field = self.focused_answer();
                        field.push(c);
                        *field = clean_digits(field, ANSWER_LEN);
                        self.tens_verdict = None;
                    }
                    _ => return false,
                }
            }
        }
        true
    }

    pub fn show_pyramid(&mut self) {
        self.screen = ScreenState::Pyramid;
    }

    pub fn show_tens_ones(&mut self) {
        self.screen = ScreenState::TensOnes;
    }

    pub fn select(&mut self, pos: Position) {
        if self.game.puzzle().cell(pos).is_some() {
            self.cursor = pos;
        }
    }

    fn move_cursor(&mut self, row_delta: i32, col_delta: i32) {
        let rows = self.game.puzzle().row_count() as i32;
        let row = (self.cursor.row as i32 + row_delta).clamp(0, rows - 1);
        let col = (self.cursor.col as i32 + col_delta).clamp(0, row);
        self.cursor = Position::new(row as usize, col as usize);
    }

    fn current_input(&self) -> String {
        self.game
            .puzzle()
            .cell(self.cursor)
            .map(|cell| cell.input.clone())
            .unwrap_or_default()
    }

    fn focused_answer(&mut self) -> &mut String {
        if self.focus_ones {
            &mut self.ones_input
        } else {
            &mut self.tens_input
        }
    }

    /// Set both answer boxes from form fields
    pub fn set_tens_ones_answer(&mut self, tens_raw: &str, ones_raw: &str) {
        self.tens_input = clean_digits(tens_raw, ANSWER_LEN);
        self.ones_input = clean_digits(ones_raw, ANSWER_LEN);
        self.tens_verdict = None;
    }

    pub fn submit_tens_ones(&mut self, now_ms: u64) -> Verdict {
        let verdict = self.tens_ones.submit(&self.tens_input, &self.ones_input);
        match verdict {
            Verdict::Correct => self.celebrate.trigger(now_ms, CELEBRATE_MS),
            Verdict::Wrong { .. } => self.oops.trigger(now_ms, OOPS_MS),
            Verdict::Incomplete => {}
        }
        self.tens_verdict = Some(verdict);
        verdict
    }

    pub fn next_task(&mut self) {
        self.tens_ones.next_task();
        self.tens_input.clear();
        self.ones_input.clear();
        self.focus_ones = false;
        self.tens_verdict = None;
    }

    pub fn set_range(&mut self, range: NumberRange) {
        self.tens_ones.set_range(range);
        self.tens_input.clear();
        self.ones_input.clear();
        self.focus_ones = false;
        self.tens_verdict = None;
        self.save_preferences();
    }

    pub fn set_print_pages(&mut self, pages: u32) {
        self.tens_ones
            .set_print_pages(pages.clamp(1, MAX_PRINT_PAGES));
        self.save_preferences();
    }

    fn save_preferences(&mut self) {
        let preferences = self.tens_ones.preferences();
        save_record(self.storage.as_mut(), PREFERENCES_KEY, &preferences);
    }

    /// Printable worksheet text for the configured number of pages
    pub fn worksheet_text(&mut self) -> String {
        self.tens_ones.worksheet().to_string()
    }

    pub fn view(&self, now_ms: u64, wall_ms: u64) -> ViewState {
        let status = self.game.status();
        let settings = self.game.settings();
        let rows = self
            .game
            .puzzle()
            .rows()
            .iter()
            .enumerate()
            .map(|(row, cells)| {
                cells
                    .iter()
                    .enumerate()
                    .map(|(col, cell)| {
                        let pos = Position::new(row, col);
                        CellView {
                            row,
                            col,
                            text: cell.display(),
                            given: cell.given,
                            wrong: self.game.is_marked_wrong(pos),
                            selected: pos == self.cursor,
                        }
                    })
                    .collect()
            })
            .collect();

        let task = self.tens_ones.task();
        let (verdict, tens_ok, ones_ok) = match self.tens_verdict {
            None => (None, None, None),
            Some(Verdict::Incomplete) => (Some("incomplete"), None, None),
            Some(Verdict::Correct) => (Some("correct"), Some(true), Some(true)),
            Some(Verdict::Wrong { tens_ok, ones_ok }) => {
                (Some("wrong"), Some(tens_ok), Some(ones_ok))
            }
        };

        ViewState {
            screen: self.screen,
            rows,
            emoji: status.emoji(),
            message: status.text(),
            problem: status.is_problem(),
            phase: self.game.phase(),
            can_try_again: matches!(
                self.game.phase(),
                Phase::GentleHint | Phase::ExplicitHighlight
            ),
            solved: self.game.is_solved(),
            celebrating: self.celebrate.is_active(now_ms),
            oops: self.oops.is_active(now_ms),
            stats: self.game.stats(),
            settings: SettingsView {
                rows: settings.rows(),
                difficulty: settings.difficulty().level(),
                top_max: settings.top_max(),
            },
            session_secs: wall_ms.saturating_sub(self.session_start_ms) / 1000,
            tens_ones: TensOnesView {
                number: task.number(),
                tens_input: self.tens_input.clone(),
                ones_input: self.ones_input.clone(),
                focus_ones: self.focus_ones,
                verdict,
                tens_ok,
                ones_ok,
                range: self.tens_ones.range().as_str(),
                print_pages: self.tens_ones.print_pages(),
                solved: self.tens_ones.solved(),
            },
        }
    }
}

fn first_open_brick(game: &Game) -> Position {
    game.puzzle()
        .cells()
        .find(|(_, cell)| !cell.given)
        .map(|(pos, _)| pos)
        .unwrap_or(Position::APEX)
}
