//! Number pyramid practice engine
//!
//! Every brick of a number pyramid is the sum of the two bricks below it.
//! This crate generates solved pyramids under an apex limit, hides some
//! bricks according to a difficulty, checks the player's answers with
//! two-step feedback and keeps score. It also carries the smaller
//! tens-and-ones exercise.
//!
//! Presentation and persistence live in the front ends: they drive a
//! [`Game`], render what it exposes and hand a [`Storage`] backend to
//! [`load_record`]/[`save_record`].

pub mod error;
pub mod evaluate;
pub mod game;
pub mod mask;
pub mod puzzle;
pub mod pyramid;
pub mod records;
pub mod settings;
pub mod storage;
pub mod tens_ones;
pub mod timer;
pub mod verify;

pub use error::{Error, Result, SettingsError, StorageError};
pub use evaluate::{evaluate, Evaluation};
pub use game::{Game, Status};
pub use mask::{given_ratio, target_given_count, Difficulty, Mask};
pub use puzzle::{clean_digits, clean_numeric_input, Cell, Puzzle, MAX_INPUT_LEN};
pub use pyramid::{cell_count, Generator, GeneratorConfig, Position, Pyramid, MAX_ROWS, MIN_ROWS};
pub use records::{load_session, Preferences, SessionRecord, Stats, SESSION_TIMEOUT_MS};
pub use settings::Settings;
pub use storage::{
    load_record, remove_record, save_record, MemoryStorage, Storage, PREFERENCES_KEY, SESSION_KEY,
    STATS_KEY,
};
pub use tens_ones::{NumberRange, TensOnes, TensOnesTask, Verdict, Worksheet, TASKS_PER_PAGE};
pub use timer::{FlashTimer, CELEBRATE_MS, OOPS_MS};
pub use verify::{CheckOutcome, Phase, Verifier};
