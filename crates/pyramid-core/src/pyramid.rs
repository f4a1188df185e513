use crate::error::{Error, Result, SettingsError};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest pyramid the game offers
pub const MIN_ROWS: usize = 3;
/// Largest pyramid the game offers
pub const MAX_ROWS: usize = 20;

/// Number of cells in a pyramid with `rows` rows
pub fn cell_count(rows: usize) -> usize {
    rows * (rows + 1) / 2
}

/// A cell position; row 0 is the apex and `col <= row`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const APEX: Position = Position { row: 0, col: 0 };

    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// All positions of a `rows`-row pyramid in row-major order
    pub fn all(rows: usize) -> impl Iterator<Item = Position> {
        (0..rows).flat_map(|row| (0..=row).map(move |col| Position::new(row, col)))
    }
}

/// A solved number pyramid, apex first
///
/// Every cell above the base is the sum of the two cells directly below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Pyramid {
    rows: Vec<Vec<u32>>,
}

impl Pyramid {
    /// Build a pyramid from raw rows, apex first
    ///
    /// Returns `None` unless row `r` has `r + 1` cells and every cell is the
    /// sum of the two below it.
    pub fn from_rows(rows: Vec<Vec<u32>>) -> Option<Self> {
        if rows.is_empty() || rows.iter().enumerate().any(|(r, row)| row.len() != r + 1) {
            return None;
        }
        let pyramid = Self { rows };
        pyramid.is_consistent().then_some(pyramid)
    }

    /// Derive the full pyramid from its base row
    ///
    /// Returns `None` for an empty base or if a sum overflows.
    pub fn from_base(base: Vec<u32>) -> Option<Self> {
        if base.is_empty() {
            return None;
        }
        let mut rows = vec![base];
        while let Some(below) = rows.last().filter(|row| row.len() > 1) {
            let next = below
                .windows(2)
                .map(|pair| pair[0].checked_add(pair[1]))
                .collect::<Option<Vec<u32>>>()?;
            rows.push(next);
        }
        rows.reverse();
        Some(Self { rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn cell_count(&self) -> usize {
        cell_count(self.rows.len())
    }

    pub fn rows(&self) -> &[Vec<u32>] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> &[u32] {
        &self.rows[row]
    }

    pub fn apex(&self) -> u32 {
        self.rows[0][0]
    }

    pub fn base(&self) -> &[u32] {
        &self.rows[self.rows.len() - 1]
    }

    pub fn get(&self, pos: Position) -> Option<u32> {
        self.rows.get(pos.row)?.get(pos.col).copied()
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> {
        Position::all(self.rows.len())
    }

    /// Check the sum rule for every cell above the base
    pub fn is_consistent(&self) -> bool {
        self.rows.windows(2).all(|pair| {
            let (upper, lower) = (&pair[0], &pair[1]);
            upper
                .iter()
                .enumerate()
                .all(|(c, &v)| lower[c].checked_add(lower[c + 1]) == Some(v))
        })
    }
}

impl<'de> Deserialize<'de> for Pyramid {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let rows = Vec::<Vec<u32>>::deserialize(deserializer)?;
        Pyramid::from_rows(rows)
            .ok_or_else(|| serde::de::Error::custom("rows do not form a valid number pyramid"))
    }
}

impl fmt::Display for Pyramid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.apex().to_string().len().max(2) + 1;
        let last = self.rows.len() - 1;
        for (r, row) in self.rows.iter().enumerate() {
            let indent = (last - r) * width / 2;
            write!(f, "{:indent$}", "")?;
            for value in row {
                write!(f, "{:^width$}", value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Configuration for pyramid generation
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Attempts before giving up with [`Error::GenerationExhausted`]
    pub max_attempts: usize,
    /// Largest digit placed on the base row (the smallest is always 0)
    pub base_max: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 9000,
            base_max: 9,
        }
    }
}

/// Number pyramid generator
///
/// Samples random base rows and keeps the first whose apex stays within the
/// requested bound.
pub struct Generator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    /// Create a new generator with default configuration
    pub fn new() -> Self {
        Self::with_config(GeneratorConfig::default())
    }

    /// Create a generator with custom configuration
    pub fn with_config(config: GeneratorConfig) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(entropy_seed()),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_seed(seed: u64) -> Self {
        Self {
            config: GeneratorConfig::default(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub(crate) fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Generate a solved pyramid with `rows` rows whose apex is at most `top_max`
    pub fn generate(&mut self, rows: usize, top_max: u32) -> Result<Pyramid> {
        if !(MIN_ROWS..=MAX_ROWS).contains(&rows) {
            return Err(SettingsError::Rows(rows as f64).into());
        }
        if top_max == 0 {
            return Err(SettingsError::TopMax(0.0).into());
        }

        for attempt in 1..=self.config.max_attempts {
            let base: Vec<u32> = (0..rows)
                .map(|_| self.rng.gen_range(0..=self.config.base_max))
                .collect();
            let Some(pyramid) = Pyramid::from_base(base) else {
                continue;
            };
            if pyramid.apex() <= top_max {
                debug!(
                    "Generated {}-row pyramid with apex {} after {} attempt(s)",
                    rows,
                    pyramid.apex(),
                    attempt
                );
                return Ok(pyramid);
            }
        }

        debug!(
            "Gave up on a {}-row pyramid with top <= {} after {} attempts",
            rows, top_max, self.config.max_attempts
        );
        Err(Error::GenerationExhausted {
            rows,
            top_max,
            attempts: self.config.max_attempts,
        })
    }
}

/// Seed for the generator RNG, from the platform entropy source
pub(crate) fn entropy_seed() -> u64 {
    let mut seed_bytes = [0u8; 8];
    if getrandom::getrandom(&mut seed_bytes).is_err() {
        // Fallback: a process-wide counter keeps consecutive generators apart
        static COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);
        let counter = COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        seed_bytes = counter.to_le_bytes();
    }
    u64::from_le_bytes(seed_bytes)
}
