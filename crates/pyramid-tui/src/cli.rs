//! Command-line options
//!
//! Without options the game starts with the settings of the last session
//! (if it is less than five minutes old) or with the defaults.
//!
//! ```text
//! $ pyramid --rows 5 --difficulty 2 --top-max 100
//! $ pyramid --worksheet 2 --range 1-50 > worksheet.txt
//! ```

use clap::Parser;
use pyramid_core::{NumberRange, Settings, SettingsError};

/// Number pyramid practice in the terminal
#[derive(Parser, Debug)]
#[command(about, long_about = None, version)]
pub struct Args {
    /// Number of rows (3-20)
    #[arg(short, long)]
    pub rows: Option<i64>,

    /// Difficulty from 1 (many bricks shown) to 5 (few)
    #[arg(short, long)]
    pub difficulty: Option<i64>,

    /// Largest value allowed at the top of the pyramid
    #[arg(short, long)]
    pub top_max: Option<i64>,

    /// Ignore the saved session and start a new puzzle
    #[arg(long, default_value_t = false)]
    pub fresh: bool,

    /// Print this many tens-and-ones worksheet pages to stdout and exit
    #[arg(short, long, value_name = "PAGES")]
    pub worksheet: Option<u32>,

    /// Number range for tens and ones: 1-20, 1-50 or 1-100
    #[arg(long, value_parser = ["1-20", "1-50", "1-100"])]
    pub range: Option<String>,

    /// Enable debug messages
    #[arg(long, default_value_t = false)]
    pub debug: bool,
}

impl Args {
    /// Whether any puzzle setting was given on the command line
    pub fn has_settings(&self) -> bool {
        self.rows.is_some() || self.difficulty.is_some() || self.top_max.is_some()
    }

    /// Puzzle settings from the command line, defaults filling the gaps
    pub fn settings(&self) -> Result<Settings, SettingsError> {
        let defaults = Settings::default();
        Settings::new(
            self.rows.unwrap_or(defaults.rows() as i64),
            self.difficulty
                .unwrap_or_else(|| i64::from(defaults.difficulty().level())),
            self.top_max
                .unwrap_or_else(|| i64::from(defaults.top_max())),
        )
    }

    pub fn range(&self) -> Option<NumberRange> {
        self.range.as_deref().map(NumberRange::parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["pyramid"]).unwrap();
        assert!(!args.has_settings());
        assert!(!args.fresh);
        assert_eq!(args.settings().unwrap(), Settings::default());
        assert_eq!(args.range(), None);
    }

    #[test]
    fn test_settings_flags() {
        let args =
            Args::try_parse_from(["pyramid", "--rows", "6", "-d", "4", "--top-max", "150"]).unwrap();
        assert!(args.has_settings());
        let settings = args.settings().unwrap();
        assert_eq!(settings.rows(), 6);
        assert_eq!(settings.difficulty().level(), 4);
        assert_eq!(settings.top_max(), 150);
    }

    #[test]
    fn test_out_of_range_settings() {
        let args = Args::try_parse_from(["pyramid", "--rows", "30"]).unwrap();
        assert_eq!(args.settings(), Err(SettingsError::Rows(30.0)));
    }

    #[test]
    fn test_worksheet_flags() {
        let args =
            Args::try_parse_from(["pyramid", "--worksheet", "3", "--range", "1-50"]).unwrap();
        assert_eq!(args.worksheet, Some(3));
        assert_eq!(args.range(), Some(NumberRange::UpTo50));
        assert!(Args::try_parse_from(["pyramid", "--range", "1-70"]).is_err());
    }
}
