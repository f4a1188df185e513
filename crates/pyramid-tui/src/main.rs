mod animations;
mod app;
mod cli;
mod render;
mod storage;
mod theme;

use app::{App, StartOptions};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use pyramid_core::{load_record, NumberRange, Preferences, Worksheet, PREFERENCES_KEY};
use std::fs::{self, File};
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use storage::{data_dir, FileStorage};

fn main() -> ExitCode {
    let args = cli::Args::parse();

    // --debug overrides RUST_LOG
    if args.debug {
        std::env::set_var("RUST_LOG", "debug");
    }
    init_logging(args.worksheet.is_some());

    if let Some(pages) = args.worksheet {
        return match print_worksheet(&args, pages) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let settings = if args.has_settings() {
        match args.settings() {
            Ok(settings) => Some(settings),
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        None
    };
    let options = StartOptions {
        settings,
        fresh: args.fresh,
        range: args.range(),
    };

    let app = match App::new(options, Box::new(FileStorage::open_default())) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(app) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Log to a file while the terminal is in the alternate screen
fn init_logging(to_stderr: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if !to_stderr {
        let dir = data_dir();
        let file = fs::create_dir_all(&dir).and_then(|_| File::create(dir.join("pyramid.log")));
        match file {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            // No log file, no logging
            Err(_) => {
                builder.filter_level(log::LevelFilter::Off);
            }
        }
    }
    builder.init();
}

fn print_worksheet(args: &cli::Args, pages: u32) -> io::Result<()> {
    let range = match args.range() {
        Some(range) => range,
        None => {
            let storage = FileStorage::open_default();
            let preferences: Preferences =
                load_record(&storage, PREFERENCES_KEY).unwrap_or_default();
            NumberRange::parse(&preferences.number_range)
        }
    };
    let sheet = Worksheet::generate(range, pages, &mut rand::thread_rng());
    info!("Printing {} worksheet page(s) for {}", sheet.pages().len(), range);

    let mut stdout = io::stdout().lock();
    write!(stdout, "{sheet}")?;
    stdout.flush()
}

fn run(app: App) -> io::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let mut app = app;
    let result = run_app(&mut stdout, &mut app);
    app.save_session();

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen)?;

    result
}

fn run_app(stdout: &mut io::Stdout, app: &mut App) -> io::Result<()> {
    let mut last_tick = Instant::now();

    loop {
        let tick_rate = app.get_tick_rate();

        render::render(stdout, app)?;
        stdout.flush()?;

        // Handle input with timeout for animation updates
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout.min(Duration::from_millis(33)))? {
            if let Event::Key(key) = event::read()? {
                // Handle Ctrl+C
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    break;
                }

                match app.handle_key(key) {
                    app::AppAction::Continue => {}
                    app::AppAction::Quit => break,
                }
            }
        }

        // Tick animations and timers
        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}
