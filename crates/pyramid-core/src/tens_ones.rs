//! Tens and ones: split a number into its tens and ones digits

use crate::puzzle::clean_digits;
use crate::pyramid::entropy_seed;
use crate::records::Preferences;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest answer accepted for the tens or the ones
pub const ANSWER_LEN: usize = 2;
/// Tasks printed on one worksheet page
pub const TASKS_PER_PAGE: usize = 12;
/// Upper bound on worksheet pages printed at once
pub const MAX_PRINT_PAGES: u32 = 20;

/// Numbers the exercise draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum NumberRange {
    UpTo20,
    UpTo50,
    #[default]
    UpTo100,
}

impl NumberRange {
    pub const ALL: [NumberRange; 3] = [Self::UpTo20, Self::UpTo50, Self::UpTo100];

    /// Parse a stored range; anything unrecognised means 1-100
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "1-20" => Self::UpTo20,
            "1-50" => Self::UpTo50,
            _ => Self::UpTo100,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::UpTo20 => "1-20",
            Self::UpTo50 => "1-50",
            Self::UpTo100 => "1-100",
        }
    }

    pub fn min(self) -> u32 {
        1
    }

    pub fn max(self) -> u32 {
        match self {
            Self::UpTo20 => 20,
            Self::UpTo50 => 50,
            Self::UpTo100 => 100,
        }
    }

    /// The next range in menu order, wrapping around
    pub fn next(self) -> Self {
        match self {
            Self::UpTo20 => Self::UpTo50,
            Self::UpTo50 => Self::UpTo100,
            Self::UpTo100 => Self::UpTo20,
        }
    }
}

impl fmt::Display for NumberRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for NumberRange {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<NumberRange> for String {
    fn from(range: NumberRange) -> Self {
        range.as_str().to_string()
    }
}

/// Result of checking a tens/ones answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// One of the two boxes is still empty
    Incomplete,
    Correct,
    Wrong { tens_ok: bool, ones_ok: bool },
}

/// One number to split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensOnesTask {
    number: u32,
}

impl TensOnesTask {
    pub fn new(number: u32) -> Self {
        Self { number }
    }

    /// Draw a number uniformly from `range`
    pub fn generate<R: Rng>(range: NumberRange, rng: &mut R) -> Self {
        Self::new(rng.gen_range(range.min()..=range.max()))
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn tens(&self) -> u32 {
        self.number / 10
    }

    pub fn ones(&self) -> u32 {
        self.number % 10
    }

    /// Check raw answers; non-digits are dropped and each box keeps two digits
    pub fn check(&self, tens_raw: &str, ones_raw: &str) -> Verdict {
        let tens = clean_digits(tens_raw, ANSWER_LEN);
        let ones = clean_digits(ones_raw, ANSWER_LEN);
        let (Ok(tens), Ok(ones)) = (tens.parse::<u32>(), ones.parse::<u32>()) else {
            return Verdict::Incomplete;
        };

        let tens_ok = tens == self.tens();
        let ones_ok = ones == self.ones();
        if tens_ok && ones_ok {
            Verdict::Correct
        } else {
            Verdict::Wrong { tens_ok, ones_ok }
        }
    }
}

/// Printable pages of tasks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worksheet {
    range: NumberRange,
    pages: Vec<Vec<TensOnesTask>>,
}

impl Worksheet {
    /// Build `pages` pages (at least one, at most [`MAX_PRINT_PAGES`])
    pub fn generate<R: Rng>(range: NumberRange, pages: u32, rng: &mut R) -> Self {
        let pages = pages.clamp(1, MAX_PRINT_PAGES);
        let pages = (0..pages)
            .map(|_| {
                (0..TASKS_PER_PAGE)
                    .map(|_| TensOnesTask::generate(range, rng))
                    .collect()
            })
            .collect();
        Self { range, pages }
    }

    pub fn range(&self) -> NumberRange {
        self.range
    }

    pub fn pages(&self) -> &[Vec<TensOnesTask>] {
        &self.pages
    }
}

impl fmt::Display for Worksheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.pages.len();
        for (index, page) in self.pages.iter().enumerate() {
            if index > 0 {
                // Form feed so printers start a new sheet
                writeln!(f, "\x0c")?;
            }
            writeln!(
                f,
                "Tens and ones ({})    Page {}/{}",
                self.range,
                index + 1,
                total
            )?;
            writeln!(f, "Name: ____________________")?;
            writeln!(f)?;
            for (n, task) in page.iter().enumerate() {
                writeln!(
                    f,
                    "{:>2}.  {:>3} = ___ tens + ___ ones",
                    n + 1,
                    task.number()
                )?;
            }
        }
        Ok(())
    }
}

/// State of the tens-and-ones screen
pub struct TensOnes {
    range: NumberRange,
    print_pages: u32,
    task: TensOnesTask,
    solved: u32,
    rng: StdRng,
}

impl TensOnes {
    pub fn new(preferences: &Preferences) -> Self {
        let mut rng = StdRng::seed_from_u64(entropy_seed());
        let range = NumberRange::parse(&preferences.number_range);
        let task = TensOnesTask::generate(range, &mut rng);
        Self {
            range,
            print_pages: preferences.print_pages.clamp(1, MAX_PRINT_PAGES),
            task,
            solved: 0,
            rng,
        }
    }

    #[cfg(test)]
    fn with_seed(preferences: &Preferences, seed: u64) -> Self {
        let mut exercise = Self::new(preferences);
        exercise.rng = StdRng::seed_from_u64(seed);
        exercise.next_task();
        exercise
    }

    pub fn range(&self) -> NumberRange {
        self.range
    }

    pub fn print_pages(&self) -> u32 {
        self.print_pages
    }

    pub fn task(&self) -> TensOnesTask {
        self.task
    }

    /// Tasks answered correctly on this screen
    pub fn solved(&self) -> u32 {
        self.solved
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            number_range: self.range.as_str().to_string(),
            print_pages: self.print_pages,
        }
    }

    /// Switch range and draw a new task from it
    pub fn set_range(&mut self, range: NumberRange) {
        self.range = range;
        self.next_task();
    }

    pub fn set_print_pages(&mut self, pages: u32) {
        self.print_pages = pages.clamp(1, MAX_PRINT_PAGES);
    }

    pub fn next_task(&mut self) {
        self.task = TensOnesTask::generate(self.range, &mut self.rng);
    }

    /// Check an answer, counting it if correct
    pub fn submit(&mut self, tens_raw: &str, ones_raw: &str) -> Verdict {
        let verdict = self.task.check(tens_raw, ones_raw);
        if verdict == Verdict::Correct {
            self.solved += 1;
        }
        verdict
    }

    pub fn worksheet(&mut self) -> Worksheet {
        Worksheet::generate(self.range, self.print_pages, &mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_parsing() {
        assert_eq!(NumberRange::parse("1-20"), NumberRange::UpTo20);
        assert_eq!(NumberRange::parse(" 1-50 "), NumberRange::UpTo50);
        assert_eq!(NumberRange::parse("1-100"), NumberRange::UpTo100);
        assert_eq!(NumberRange::parse("1-1000"), NumberRange::UpTo100);
        assert_eq!(NumberRange::parse(""), NumberRange::UpTo100);
        assert_eq!(NumberRange::UpTo100.next(), NumberRange::UpTo20);
    }

    #[test]
    fn test_range_serde() {
        let json = serde_json::to_string(&NumberRange::UpTo50).unwrap();
        assert_eq!(json, r#""1-50""#);
        let range: NumberRange = serde_json::from_str(r#""weird""#).unwrap();
        assert_eq!(range, NumberRange::UpTo100);
    }

    #[test]
    fn test_decomposition() {
        let task = TensOnesTask::new(47);
        assert_eq!((task.tens(), task.ones()), (4, 7));
        let task = TensOnesTask::new(100);
        assert_eq!((task.tens(), task.ones()), (10, 0));
        let task = TensOnesTask::new(8);
        assert_eq!((task.tens(), task.ones()), (0, 8));
    }

    #[test]
    fn test_check() {
        let task = TensOnesTask::new(47);
        assert_eq!(task.check("4", "7"), Verdict::Correct);
        assert_eq!(task.check("04", "7x"), Verdict::Correct);
        assert_eq!(task.check("", "7"), Verdict::Incomplete);
        assert_eq!(task.check("abc", "7"), Verdict::Incomplete);
        assert_eq!(
            task.check("7", "4"),
            Verdict::Wrong {
                tens_ok: false,
                ones_ok: false
            }
        );
        // Only the first two digits count
        assert_eq!(
            task.check("4", "777"),
            Verdict::Wrong {
                tens_ok: true,
                ones_ok: false
            }
        );
    }

    #[test]
    fn test_generated_numbers_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for range in NumberRange::ALL {
            for _ in 0..200 {
                let n = TensOnesTask::generate(range, &mut rng).number();
                assert!((1..=range.max()).contains(&n), "{n} outside {range}");
            }
        }
    }

    #[test]
    fn test_worksheet_pages() {
        let mut rng = StdRng::seed_from_u64(1);
        let sheet = Worksheet::generate(NumberRange::UpTo20, 3, &mut rng);
        assert_eq!(sheet.pages().len(), 3);
        assert!(sheet.pages().iter().all(|page| page.len() == TASKS_PER_PAGE));

        let text = sheet.to_string();
        assert!(text.contains("Page 3/3"));
        assert_eq!(text.matches("tens +").count(), 3 * TASKS_PER_PAGE);

        assert_eq!(Worksheet::generate(NumberRange::UpTo20, 0, &mut rng).pages().len(), 1);
    }

    #[test]
    fn test_exercise_flow() {
        let preferences = Preferences {
            number_range: "1-20".to_string(),
            print_pages: 2,
        };
        let mut exercise = TensOnes::with_seed(&preferences, 3);
        assert_eq!(exercise.range(), NumberRange::UpTo20);

        let task = exercise.task();
        let verdict = exercise.submit(&task.tens().to_string(), &task.ones().to_string());
        assert_eq!(verdict, Verdict::Correct);
        assert_eq!(exercise.solved(), 1);

        exercise.set_range(NumberRange::UpTo50);
        exercise.set_print_pages(0);
        assert_eq!(
            exercise.preferences(),
            Preferences {
                number_range: "1-50".to_string(),
                print_pages: 1
            }
        );
        assert_eq!(exercise.worksheet().pages().len(), 1);
    }
}
