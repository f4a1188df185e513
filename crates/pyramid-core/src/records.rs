use crate::puzzle::Puzzle;
use crate::pyramid::Pyramid;
use crate::storage::{self, Storage, SESSION_KEY};
use serde::{Deserialize, Serialize};

/// Sessions idle for longer than this are discarded
pub const SESSION_TIMEOUT_MS: u64 = 5 * 60 * 1000;

/// Lifetime score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stats {
    /// Puzzles solved
    pub solved: u32,
    /// Puzzles solved on the first full check
    pub first_try: u32,
}

impl Stats {
    pub fn record_solved(&mut self, first_try: bool) {
        self.solved += 1;
        if first_try {
            self.first_try += 1;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Settings of the tens-and-ones exercise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub number_range: String,
    pub print_pages: u32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            number_range: "1-100".to_string(),
            print_pages: 1,
        }
    }
}

/// Snapshot of a session in progress
///
/// Timestamps are milliseconds since the Unix epoch. Every puzzle field is
/// optional so that a session can be recorded before its first puzzle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_start_time: u64,
    pub last_activity: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<Pyramid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub puzzle: Option<Puzzle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_max: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checks_this_puzzle: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub had_first_wrong_this_puzzle: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_wrong_highlights: Option<bool>,
}

impl SessionRecord {
    /// An empty session starting now
    pub fn start(now_ms: u64) -> Self {
        Self {
            session_start_time: now_ms,
            last_activity: now_ms,
            ..Self::default()
        }
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_activity) > SESSION_TIMEOUT_MS
    }

    /// Milliseconds since the session started
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.session_start_time)
    }
}

/// Load the stored session, discarding it if it has expired
pub fn load_session(storage: &mut dyn Storage, now_ms: u64) -> Option<SessionRecord> {
    let record: SessionRecord = storage::load_record(storage, SESSION_KEY)?;
    if record.is_expired(now_ms) {
        log::debug!(
            "Discarding session idle for {} ms",
            now_ms.saturating_sub(record.last_activity)
        );
        storage::remove_record(storage, SESSION_KEY);
        return None;
    }
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{save_record, MemoryStorage};

    #[test]
    fn test_stats_counting() {
        let mut stats = Stats::default();
        stats.record_solved(true);
        stats.record_solved(false);
        assert_eq!(stats, Stats { solved: 2, first_try: 1 });
        stats.reset();
        assert_eq!(stats, Stats::default());
    }

    #[test]
    fn test_stats_tolerates_missing_fields() {
        let stats: Stats = serde_json::from_str(r#"{"solved":7}"#).unwrap();
        assert_eq!(stats, Stats { solved: 7, first_try: 0 });
    }

    #[test]
    fn test_preferences_shape() {
        let json = serde_json::to_string(&Preferences::default()).unwrap();
        assert_eq!(json, r#"{"numberRange":"1-100","printPages":1}"#);
    }

    #[test]
    fn test_session_expiry() {
        let record = SessionRecord::start(1_000);
        assert!(!record.is_expired(1_000 + SESSION_TIMEOUT_MS));
        assert!(record.is_expired(1_001 + SESSION_TIMEOUT_MS));
        assert!(!record.is_expired(0));
        assert_eq!(record.elapsed_ms(4_000), 3_000);
    }

    #[test]
    fn test_load_session_discards_expired() {
        let mut storage = MemoryStorage::new();
        save_record(&mut storage, SESSION_KEY, &SessionRecord::start(0));

        assert!(load_session(&mut storage, 60_000).is_some());
        assert!(load_session(&mut storage, SESSION_TIMEOUT_MS + 1).is_none());
        assert!(storage.get(SESSION_KEY).is_none());
    }

    #[test]
    fn test_empty_session_omits_puzzle_fields() {
        let json = serde_json::to_string(&SessionRecord::start(5)).unwrap();
        assert_eq!(json, r#"{"sessionStartTime":5,"lastActivity":5}"#);
    }
}
