use crate::animations::Confetti;
use crate::storage::data_dir;
use crate::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, info, warn};
use pyramid_core::{
    clean_digits, load_record, load_session, save_record, CheckOutcome, FlashTimer, Game,
    NumberRange, Phase, Position, Preferences, Settings, Stats, Storage, TensOnes, Verdict,
    CELEBRATE_MS, OOPS_MS, PREFERENCES_KEY, SESSION_KEY, STATS_KEY,
};
use pyramid_core::tens_ones::{ANSWER_LEN, MAX_PRINT_PAGES};
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Result of handling a key press
pub enum AppAction {
    Continue,
    Quit,
}

/// Current screen state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenState {
    /// The number pyramid
    Pyramid,
    /// The tens-and-ones exercise
    TensOnes,
}

/// Menu state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    None,
    Settings,
}

/// Which answer box has focus on the tens-and-ones screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensOnesField {
    Tens,
    Ones,
}

/// Settings being edited in the menu, before validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsDraft {
    pub rows: i64,
    pub difficulty: i64,
    pub top_max: i64,
}

impl SettingsDraft {
    /// Menu rows: rows, difficulty, top limit, start
    pub const ITEMS: usize = 4;
    const TOP_MAX_STEP: i64 = 10;

    fn from_settings(settings: Settings) -> Self {
        Self {
            rows: settings.rows() as i64,
            difficulty: i64::from(settings.difficulty().level()),
            top_max: i64::from(settings.top_max()),
        }
    }

    fn adjust(&mut self, item: usize, delta: i64) {
        match item {
            0 => self.rows = (self.rows + delta).clamp(3, 20),
            1 => self.difficulty = (self.difficulty + delta).clamp(1, 5),
            2 => self.top_max = (self.top_max + delta * Self::TOP_MAX_STEP).max(0),
            _ => {}
        }
    }
}

/// How the app should start
#[derive(Debug, Clone, Default)]
pub struct StartOptions {
    /// Settings from the command line; these always start a new puzzle
    pub settings: Option<Settings>,
    /// Skip the saved session
    pub fresh: bool,
    /// Tens-and-ones range override
    pub range: Option<NumberRange>,
}

/// The main application state
pub struct App {
    /// Current pyramid game
    pub game: Game,
    storage: Box<dyn Storage>,
    /// Wall-clock start of this practice session
    pub session_start_ms: u64,
    /// Currently selected brick
    pub cursor: Position,
    pub screen_state: ScreenState,
    pub menu: MenuState,
    pub menu_selection: usize,
    pub draft: SettingsDraft,
    /// Color theme
    pub theme: Theme,
    /// Message to display
    pub message: Option<String>,
    /// Message timer
    message_timer: u32,
    pub celebrate: FlashTimer,
    pub oops: FlashTimer,
    pub confetti: Confetti,
    pub tens_ones: TensOnes,
    pub tens_input: String,
    pub ones_input: String,
    pub tens_focus: TensOnesField,
    pub tens_verdict: Option<Verdict>,
    clock: Instant,
}

impl App {
    /// Load saved records and start or resume a game
    pub fn new(options: StartOptions, mut storage: Box<dyn Storage>) -> pyramid_core::Result<Self> {
        let now = wall_clock_ms();
        let stats: Stats = load_record(storage.as_ref(), STATS_KEY).unwrap_or_default();

        let mut session_start_ms = now;
        let mut resumed = None;
        if options.settings.is_none() && !options.fresh {
            if let Some(record) = load_session(storage.as_mut(), now) {
                session_start_ms = record.session_start_time;
                resumed = Game::restore(&record, stats);
                if resumed.is_none() && record.puzzle.is_some() {
                    debug!("Saved puzzle rejected, starting a new one");
                    session_start_ms = now;
                }
            }
        }

        let game = match resumed {
            Some(game) => {
                info!("Resumed saved session");
                game
            }
            None => Game::new(options.settings.unwrap_or_default(), stats)?,
        };

        let mut preferences: Preferences =
            load_record(storage.as_ref(), PREFERENCES_KEY).unwrap_or_default();
        if let Some(range) = options.range {
            preferences.number_range = range.to_string();
            save_record(storage.as_mut(), PREFERENCES_KEY, &preferences);
        }

        let mut app = Self {
            cursor: first_open_brick(&game),
            draft: SettingsDraft::from_settings(game.settings()),
            game,
            storage,
            session_start_ms,
            screen_state: ScreenState::Pyramid,
            menu: MenuState::None,
            menu_selection: 0,
            theme: Theme::dark(),
            message: None,
            message_timer: 0,
            celebrate: FlashTimer::new(),
            oops: FlashTimer::new(),
            confetti: Confetti::new(),
            tens_ones: TensOnes::new(&preferences),
            tens_input: String::new(),
            ones_input: String::new(),
            tens_focus: TensOnesField::Tens,
            tens_verdict: None,
            clock: Instant::now(),
        };
        app.save_session();
        Ok(app)
    }

    /// Monotonic milliseconds since the app started, for the flash timers
    pub fn now_ms(&self) -> u64 {
        self.clock.elapsed().as_millis() as u64
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    /// Get the tick rate based on what is animating
    pub fn get_tick_rate(&self) -> Duration {
        if self.celebrate.is_active(self.now_ms()) || !self.confetti.is_empty() {
            Duration::from_millis(33) // 30 FPS for confetti
        } else {
            Duration::from_millis(100)
        }
    }

    /// Update animations and timers (called every tick)
    pub fn tick(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message = None;
            }
        }

        let now = self.now_ms();
        self.oops.expire(now);
        self.celebrate.expire(now);
        self.confetti.update(self.celebrate.is_active(now));
    }

    /// Session time as MM:SS
    pub fn session_time(&self) -> String {
        format_time(wall_clock_ms().saturating_sub(self.session_start_ms) / 1000)
    }

    /// Show a temporary message
    pub fn show_message(&mut self, msg: &str) {
        self.message = Some(msg.to_string());
        self.message_timer = 30; // ~3 seconds at 100ms poll
    }

    /// Record the session so a restart within five minutes resumes it
    pub fn save_session(&mut self) {
        let record = self.game.snapshot(self.session_start_ms, wall_clock_ms());
        save_record(self.storage.as_mut(), SESSION_KEY, &record);
    }

    fn save_stats(&mut self) {
        let stats = self.game.stats();
        save_record(self.storage.as_mut(), STATS_KEY, &stats);
    }

    fn save_preferences(&mut self) {
        let preferences = self.tens_ones.preferences();
        save_record(self.storage.as_mut(), PREFERENCES_KEY, &preferences);
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        match self.screen_state {
            ScreenState::TensOnes => self.handle_tens_ones_key(key),
            ScreenState::Pyramid => match self.menu {
                MenuState::None => self.handle_game_key(key),
                MenuState::Settings => self.handle_menu_key(key),
            },
        }
    }

    fn handle_game_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('q') => {
                self.save_session();
                return AppAction::Quit;
            }

            // Navigation
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1, 0),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1, 0),
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(0, -1),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(0, 1),

            // Number input
            KeyCode::Char(c) if c.is_ascii_digit() => {
                let mut input = self.current_input();
                input.push(c);
                self.enter(input);
            }
            KeyCode::Backspace => {
                let mut input = self.current_input();
                input.pop();
                self.enter(input);
            }
            KeyCode::Delete | KeyCode::Char('x') => self.enter(String::new()),

            // Drop hints and start the checks over
            KeyCode::Char('a') => {
                if matches!(self.game.phase(), Phase::GentleHint | Phase::ExplicitHighlight) {
                    self.game.try_again();
                    self.oops.cancel();
                    self.save_session();
                }
            }

            KeyCode::Char('n') => self.new_puzzle(self.game.settings()),

            KeyCode::Char('s') => {
                self.draft = SettingsDraft::from_settings(self.game.settings());
                self.menu = MenuState::Settings;
                self.menu_selection = 0;
            }

            KeyCode::Char('R') if key.modifiers.contains(KeyModifiers::SHIFT) => {
                self.game.reset_stats();
                self.save_stats();
            }

            KeyCode::Char('t') => {
                self.theme = self.theme.next();
                let name = self.theme.name;
                self.show_message(&format!("{name} theme"));
            }

            KeyCode::Tab => self.screen_state = ScreenState::TensOnes,

            _ => {}
        }

        AppAction::Continue
    }

    fn handle_menu_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.menu = MenuState::None,
            KeyCode::Up | KeyCode::Char('k') => {
                self.menu_selection = self.menu_selection.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.menu_selection = (self.menu_selection + 1).min(SettingsDraft::ITEMS - 1);
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('-') => {
                self.draft.adjust(self.menu_selection, -1);
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('+') => {
                self.draft.adjust(self.menu_selection, 1);
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.menu = MenuState::None;
                let draft = self.draft;
                if self
                    .game
                    .new_puzzle_from_raw(draft.rows as f64, draft.difficulty as f64, draft.top_max as f64)
                    .is_ok()
                {
                    self.after_new_puzzle();
                }
            }
            _ => {}
        }
        AppAction::Continue
    }

    fn handle_tens_ones_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('q') => {
                self.save_session();
                return AppAction::Quit;
            }
            KeyCode::Tab | KeyCode::Esc => self.screen_state = ScreenState::Pyramid,

            KeyCode::Left | KeyCode::Right => {
                self.tens_focus = match self.tens_focus {
                    TensOnesField::Tens => TensOnesField::Ones,
                    TensOnesField::Ones => TensOnesField::Tens,
                };
            }

            KeyCode::Char(c) if c.is_ascii_digit() => {
                let field = self.focused_answer();
                field.push(c);
                *field = clean_digits(field, ANSWER_LEN);
                self.tens_verdict = None;
            }
            KeyCode::Backspace => {
                self.focused_answer().pop();
                self.tens_verdict = None;
            }

            KeyCode::Enter => {
                if self.tens_verdict == Some(Verdict::Correct) {
                    self.next_tens_ones_task();
                } else {
                    self.check_tens_ones();
                }
            }

            KeyCode::Char('n') => self.next_tens_ones_task(),

            KeyCode::Char('g') => {
                let range = self.tens_ones.range().next();
                self.tens_ones.set_range(range);
                self.clear_tens_ones_answer();
                self.save_preferences();
                self.show_message(&format!("Numbers {range}"));
            }

            KeyCode::Char('+') => self.change_print_pages(1),
            KeyCode::Char('-') => self.change_print_pages(-1),

            KeyCode::Char('p') => self.print_worksheet(),

            _ => {}
        }
        AppAction::Continue
    }

    /// Replace the puzzle, keeping the old one if generation fails
    pub fn new_puzzle(&mut self, settings: Settings) {
        if self.game.new_puzzle(settings).is_ok() {
            self.after_new_puzzle();
        }
    }

    fn after_new_puzzle(&mut self) {
        self.cursor = first_open_brick(&self.game);
        self.celebrate.cancel();
        self.oops.cancel();
        self.confetti.clear();
        self.save_session();
    }

    fn current_input(&self) -> String {
        self.game
            .puzzle()
            .cell(self.cursor)
            .map(|cell| cell.input.clone())
            .unwrap_or_default()
    }

    /// Replace the answer in the selected brick and react to the check
    fn enter(&mut self, input: String) {
        if self.game.is_solved() {
            self.show_message("Solved! Press n for a new puzzle");
            return;
        }
        if self.game.puzzle().cell(self.cursor).is_some_and(|cell| cell.given) {
            self.show_message("That brick is already given");
            return;
        }

        let outcome = self.game.update_input(self.cursor, &input);
        let now = self.now_ms();
        match outcome {
            Some(CheckOutcome::Solved { .. }) => {
                self.oops.cancel();
                self.celebrate.trigger(now, CELEBRATE_MS);
                self.confetti.clear();
                self.save_stats();
            }
            Some(CheckOutcome::FirstWrong) => self.oops.trigger(now, OOPS_MS),
            Some(CheckOutcome::Highlighted) | None => {}
        }
        self.save_session();
    }

    fn move_cursor(&mut self, row_delta: i32, col_delta: i32) {
        let rows = self.game.puzzle().row_count() as i32;
        let row = (self.cursor.row as i32 + row_delta).clamp(0, rows - 1);
        // Row r has r + 1 bricks
        let col = (self.cursor.col as i32 + col_delta).clamp(0, row);
        self.cursor = Position::new(row as usize, col as usize);
    }

    fn focused_answer(&mut self) -> &mut String {
        match self.tens_focus {
            TensOnesField::Tens => &mut self.tens_input,
            TensOnesField::Ones => &mut self.ones_input,
        }
    }

    fn clear_tens_ones_answer(&mut self) {
        self.tens_input.clear();
        self.ones_input.clear();
        self.tens_focus = TensOnesField::Tens;
        self.tens_verdict = None;
    }

    fn next_tens_ones_task(&mut self) {
        self.tens_ones.next_task();
        self.clear_tens_ones_answer();
    }

    fn check_tens_ones(&mut self) {
        let verdict = self.tens_ones.submit(&self.tens_input, &self.ones_input);
        let now = self.now_ms();
        match verdict {
            Verdict::Correct => self.celebrate.trigger(now, CELEBRATE_MS),
            Verdict::Wrong { .. } => self.oops.trigger(now, OOPS_MS),
            Verdict::Incomplete => self.show_message("Fill in both boxes"),
        }
        self.tens_verdict = Some(verdict);
    }

    fn change_print_pages(&mut self, delta: i64) {
        let pages = (i64::from(self.tens_ones.print_pages()) + delta)
            .clamp(1, i64::from(MAX_PRINT_PAGES)) as u32;
        self.tens_ones.set_print_pages(pages);
        self.save_preferences();
        self.show_message(&format!("{pages} page(s) per print"));
    }

    /// Where printed worksheets are written
    pub fn worksheet_path() -> PathBuf {
        data_dir().join("worksheet.txt")
    }

    fn print_worksheet(&mut self) {
        let sheet = self.tens_ones.worksheet();
        let path = Self::worksheet_path();
        let written = fs::create_dir_all(data_dir()).and_then(|_| fs::write(&path, sheet.to_string()));
        match written {
            Ok(()) => self.show_message(&format!("Worksheet saved to {}", path.display())),
            Err(e) => {
                warn!("Could not write worksheet: {e}");
                self.show_message("Failed to save worksheet");
            }
        }
    }
}

/// First brick the player can type into, or the apex
fn first_open_brick(game: &Game) -> Position {
    game.puzzle()
        .cells()
        .find(|(_, cell)| !cell.given)
        .map(|(pos, _)| pos)
        .unwrap_or(Position::APEX)
}

/// Milliseconds since the Unix epoch, for session records
pub fn wall_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Format seconds as MM:SS, or H:MM:SS past an hour
pub fn format_time(secs: u64) -> String {
    if secs >= 3600 {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        let secs = secs % 60;
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{:02}:{:02}", mins, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyramid_core::{MemoryStorage, SessionRecord, Status};

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn fresh_app() -> App {
        let options = StartOptions {
            fresh: true,
            ..StartOptions::default()
        };
        App::new(options, Box::new(MemoryStorage::new())).unwrap()
    }

    fn open_bricks(app: &App) -> Vec<(Position, u32)> {
        app.game
            .puzzle()
            .cells()
            .filter(|(_, cell)| !cell.given)
            .map(|(pos, cell)| (pos, cell.value))
            .collect()
    }

    /// Type an answer into every open brick
    ///
    /// The grid is checked as soon as the last brick gets its first digit,
    /// so a single-digit brick goes last.
    fn answer_all(app: &mut App, wrong: bool) {
        let mut bricks = open_bricks(app);
        bricks.sort_by_key(|&(_, value)| value < 10);
        for (pos, value) in bricks {
            let typed = match (wrong, value < 10) {
                (false, _) => value,
                (true, true) => (value + 1) % 10,
                (true, false) => value + 1,
            };
            app.cursor = pos;
            press(app, KeyCode::Delete);
            type_text(app, &typed.to_string());
        }
    }

    #[test]
    fn test_starts_on_open_brick() {
        let app = fresh_app();
        let cell = app.game.puzzle().cell(app.cursor).unwrap();
        assert!(!cell.given);
        assert!(app.storage().get(SESSION_KEY).is_some());
    }

    #[test]
    fn test_cursor_stays_inside_pyramid() {
        let mut app = fresh_app();
        app.cursor = Position::new(2, 2);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.cursor, Position::new(1, 1));
        press(&mut app, KeyCode::Right);
        assert_eq!(app.cursor, Position::new(1, 1));
        press(&mut app, KeyCode::Up);
        assert_eq!(app.cursor, Position::APEX);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.cursor, Position::new(2, 0));
    }

    #[test]
    fn test_typing_solves_and_saves_stats() {
        let mut app = fresh_app();
        answer_all(&mut app, false);
        assert!(app.game.is_solved());
        assert!(app.celebrate.is_active(app.now_ms()));

        let stats: Stats = load_record(app.storage(), STATS_KEY).unwrap();
        assert_eq!(stats, Stats { solved: 1, first_try: 1 });
    }

    #[test]
    fn test_wrong_grid_flashes_then_highlights() {
        let mut app = fresh_app();
        answer_all(&mut app, true);
        assert_eq!(app.game.phase(), Phase::GentleHint);
        assert!(app.oops.is_active(app.now_ms()));

        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.game.phase(), Phase::Editing);
        assert_eq!(app.game.status(), &Status::TryAgain);
        assert!(!app.oops.is_active(app.now_ms()));
    }

    #[test]
    fn test_backspace_edits_answer() {
        let mut app = fresh_app();
        type_text(&mut app, "123");
        press(&mut app, KeyCode::Backspace);
        let cell = app.game.puzzle().cell(app.cursor).unwrap();
        assert_eq!(cell.input, "12");
    }

    #[test]
    fn test_settings_menu_starts_new_puzzle() {
        let mut app = fresh_app();
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.menu, MenuState::Settings);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.menu, MenuState::None);
        assert_eq!(app.game.puzzle().row_count(), 5);
        assert_eq!(app.game.settings().top_max(), 30);
    }

    #[test]
    fn test_rejected_settings_keep_puzzle() {
        let mut app = fresh_app();
        let before = app.game.puzzle().clone();
        press(&mut app, KeyCode::Char('s'));
        app.menu_selection = 2;
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.draft.top_max, 0);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.game.puzzle(), &before);
        assert!(app.game.status().is_problem());
    }

    #[test]
    fn test_resume_saved_session() {
        let mut storage = MemoryStorage::new();
        let game = Game::new(Settings::new(4, 2, 60).unwrap(), Stats::default()).unwrap();
        let record = game.snapshot(wall_clock_ms() - 10_000, wall_clock_ms());
        save_record(&mut storage, SESSION_KEY, &record);

        let app = App::new(StartOptions::default(), Box::new(storage)).unwrap();
        assert_eq!(app.game.puzzle(), game.puzzle());
        assert_eq!(app.session_start_ms, record.session_start_time);
    }

    #[test]
    fn test_expired_session_is_replaced() {
        let mut storage = MemoryStorage::new();
        let game = Game::new(Settings::new(6, 2, 400).unwrap(), Stats::default()).unwrap();
        let record: SessionRecord = game.snapshot(0, 1_000);
        save_record(&mut storage, SESSION_KEY, &record);

        let app = App::new(StartOptions::default(), Box::new(storage)).unwrap();
        assert_eq!(app.game.puzzle().row_count(), 3);
        assert!(app.session_start_ms > 1_000);
    }

    #[test]
    fn test_tens_ones_screen() {
        let options = StartOptions {
            fresh: true,
            range: Some(NumberRange::UpTo20),
            ..StartOptions::default()
        };
        let mut app = App::new(options, Box::new(MemoryStorage::new())).unwrap();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.screen_state, ScreenState::TensOnes);

        let task = app.tens_ones.task();
        type_text(&mut app, &task.tens().to_string());
        press(&mut app, KeyCode::Right);
        type_text(&mut app, &task.ones().to_string());
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.tens_verdict, Some(Verdict::Correct));
        assert_eq!(app.tens_ones.solved(), 1);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.tens_verdict, None);
        assert!(app.tens_input.is_empty());

        press(&mut app, KeyCode::Char('g'));
        let preferences: Preferences = load_record(app.storage(), PREFERENCES_KEY).unwrap();
        assert_eq!(preferences.number_range, "1-50");
    }

    #[test]
    fn test_tens_ones_answer_is_two_digits() {
        let mut app = fresh_app();
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "1234");
        assert_eq!(app.tens_input, "12");
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(65), "01:05");
        assert_eq!(format_time(3600 + 61), "1:01:01");
    }
}
