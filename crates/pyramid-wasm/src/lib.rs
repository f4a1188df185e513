//! WebAssembly number pyramid
//!
//! Exposes the game to a web page. The page draws the bricks from the view
//! returned by [`PyramidApp::view`] and forwards keys and form input. Scores,
//! preferences and the running session are kept in `localStorage`.

use pyramid_core::{MemoryStorage, NumberRange, Position, Storage, StorageError};
use wasm_bindgen::prelude::*;

mod game;


pub use game::{CellView, GameState, ScreenState, ViewState};

// Initialize panic hook and logging
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
}

/// `Storage` backed by the browser's `localStorage`
pub struct LocalStorage {
    inner: web_sys::Storage,
}

impl LocalStorage {
    /// The window's `localStorage`, if the browser allows it
    pub fn open() -> Option<Self> {
        let inner = web_sys::window()?.local_storage().ok()??;
        Some(Self { inner })
    }
}

impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner
            .set_item(key, value)
            .map_err(|e| StorageError::Backend(format!("{e:?}")))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.inner
            .remove_item(key)
            .map_err(|e| StorageError::Backend(format!("{e:?}")))
    }
}

/// Monotonic milliseconds for flash timers
fn now_ms() -> u64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0) as u64
}

/// Milliseconds since the Unix epoch for session records
fn wall_ms() -> u64 {
    js_sys::Date::now() as u64
}

/// The main WASM game controller
#[wasm_bindgen]
pub struct PyramidApp {
    state: GameState,
}

#[wasm_bindgen]
impl PyramidApp {
    /// Resume the last session or start a new puzzle
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<PyramidApp, JsValue> {
        let storage: Box<dyn Storage> = match LocalStorage::open() {
            Some(storage) => Box::new(storage),
            None => {
                log::warn!("localStorage unavailable, progress will not be kept");
                Box::new(MemoryStorage::new())
            }
        };
        let state =
            GameState::new(storage, wall_ms()).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(PyramidApp { state })
    }

    /// Everything the page shows, as a plain JS object
    #[wasm_bindgen]
    pub fn view(&self) -> Result<JsValue, JsValue> {
        let view = self.state.view(now_ms(), wall_ms());
        serde_wasm_bindgen::to_value(&view).map_err(JsValue::from)
    }

    /// Same as [`view`](Self::view) but as a JSON string
    #[wasm_bindgen]
    pub fn view_json(&self) -> String {
        serde_json::to_string(&self.state.view(now_ms(), wall_ms())).unwrap_or_default()
    }

    /// Handle `KeyboardEvent.key`; returns whether the key was used
    #[wasm_bindgen]
    pub fn handle_key(&mut self, key: &str) -> bool {
        self.state.handle_key(key, now_ms(), wall_ms())
    }

    /// Update timers (call from requestAnimationFrame)
    #[wasm_bindgen]
    pub fn tick(&mut self) {
        self.state.tick(now_ms());
    }

    /// Start a new puzzle from the settings form; raw values are validated
    #[wasm_bindgen]
    pub fn new_puzzle(&mut self, rows: f64, difficulty: f64, top_max: f64) -> bool {
        self.state.new_puzzle(rows, difficulty, top_max, wall_ms())
    }

    /// Another puzzle with the current settings
    #[wasm_bindgen]
    pub fn next_puzzle(&mut self) -> bool {
        self.state.next_puzzle(wall_ms())
    }

    /// Select a brick
    #[wasm_bindgen]
    pub fn select(&mut self, row: usize, col: usize) {
        self.state.select(Position::new(row, col));
    }

    /// Replace the text typed in a brick
    #[wasm_bindgen]
    pub fn set_input(&mut self, row: usize, col: usize, raw: &str) {
        self.state
            .set_input(Position::new(row, col), raw, now_ms(), wall_ms());
    }

    #[wasm_bindgen]
    pub fn try_again(&mut self) {
        self.state.try_again(wall_ms());
    }

    #[wasm_bindgen]
    pub fn reset_stats(&mut self) {
        self.state.reset_stats();
    }

    #[wasm_bindgen]
    pub fn show_pyramid(&mut self) {
        self.state.show_pyramid();
    }

    #[wasm_bindgen]
    pub fn show_tens_ones(&mut self) {
        self.state.show_tens_ones();
    }

    /// Set the tens and ones boxes from form fields
    #[wasm_bindgen]
    pub fn set_tens_ones_answer(&mut self, tens: &str, ones: &str) {
        self.state.set_tens_ones_answer(tens, ones);
    }

    /// Check the tens-and-ones answer: "correct", "wrong" or "incomplete"
    #[wasm_bindgen]
    pub fn check_tens_ones(&mut self) -> String {
        match self.state.submit_tens_ones(now_ms()) {
            pyramid_core::Verdict::Correct => "correct",
            pyramid_core::Verdict::Wrong { .. } => "wrong",
            pyramid_core::Verdict::Incomplete => "incomplete",
        }
        .to_string()
    }

    #[wasm_bindgen]
    pub fn next_task(&mut self) {
        self.state.next_task();
    }

    /// "1-20", "1-50" or "1-100"; anything else means 1-100
    #[wasm_bindgen]
    pub fn set_range(&mut self, range: &str) {
        self.state.set_range(NumberRange::parse(range));
    }

    #[wasm_bindgen]
    pub fn set_print_pages(&mut self, pages: u32) {
        self.state.set_print_pages(pages);
    }

    /// Text of a printable worksheet
    #[wasm_bindgen]
    pub fn worksheet_text(&mut self) -> String {
        self.state.worksheet_text()
    }

    /// Store the session, e.g. from a `pagehide` handler
    #[wasm_bindgen]
    pub fn save(&mut self) {
        self.state.save_session(wall_ms());
    }
}
