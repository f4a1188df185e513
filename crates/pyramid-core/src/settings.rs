use crate::error::SettingsError;
use crate::mask::Difficulty;
use crate::pyramid::{MAX_ROWS, MIN_ROWS};

/// Validated parameters for a new puzzle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    rows: usize,
    difficulty: Difficulty,
    top_max: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rows: 3,
            difficulty: Difficulty::DEFAULT,
            top_max: 20,
        }
    }
}

impl Settings {
    /// Strict validation: every value must already be in range
    pub fn new(rows: i64, difficulty: i64, top_max: i64) -> Result<Self, SettingsError> {
        if !(MIN_ROWS as i64..=MAX_ROWS as i64).contains(&rows) {
            return Err(SettingsError::Rows(rows as f64));
        }
        let difficulty = u8::try_from(difficulty)
            .ok()
            .and_then(Difficulty::new)
            .ok_or(SettingsError::Difficulty(difficulty as f64))?;
        let top_max = u32::try_from(top_max)
            .ok()
            .filter(|&t| t > 0)
            .ok_or(SettingsError::TopMax(top_max as f64))?;

        Ok(Self {
            rows: rows as usize,
            difficulty,
            top_max,
        })
    }

    /// Lenient validation for loosely typed form input
    ///
    /// Rows and difficulty are truncated and clamped into range (non-finite
    /// values become the minimum). The top limit must be a positive whole
    /// number.
    pub fn from_raw(rows: f64, difficulty: f64, top_max: f64) -> Result<Self, SettingsError> {
        let rows = clamp_int(rows, MIN_ROWS as i64, MAX_ROWS as i64);
        let difficulty = clamp_int(
            difficulty,
            i64::from(Difficulty::MIN),
            i64::from(Difficulty::MAX),
        );
        let whole = top_max.is_finite() && top_max.fract() == 0.0;
        if !whole || top_max <= 0.0 || top_max > f64::from(u32::MAX) {
            return Err(SettingsError::TopMax(top_max));
        }
        Self::new(rows, difficulty, top_max as i64)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn top_max(&self) -> u32 {
        self.top_max
    }
}

fn clamp_int(value: f64, min: i64, max: i64) -> i64 {
    if !value.is_finite() {
        return min;
    }
    (value.trunc() as i64).clamp(min, max)
}
