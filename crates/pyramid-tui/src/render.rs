use crate::app::{App, MenuState, ScreenState, SettingsDraft, TensOnesField};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute,
    style::{Color, Print, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use pyramid_core::{Phase, Position, Verdict};
use std::io;

pub fn render(stdout: &mut io::Stdout, app: &mut App) -> io::Result<()> {
    let (term_width, term_height) = terminal::size()?;
    app.confetti.resize(term_width, term_height);

    execute!(stdout, Hide, SetBackgroundColor(app.theme.bg), Clear(ClearType::All))?;

    match app.screen_state {
        ScreenState::Pyramid => render_game_screen(stdout, app, term_width, term_height)?,
        ScreenState::TensOnes => render_tens_ones_screen(stdout, app, term_width)?,
    }

    render_confetti(stdout, app, term_width, term_height)?;

    if let Some(ref msg) = app.message {
        render_message(stdout, app, msg, term_width)?;
    }

    execute!(stdout, Show)?;
    Ok(())
}

/// Width of one brick, brackets included, wide enough for the apex
pub fn brick_width(apex: u32) -> u16 {
    let digits = apex.to_string().len().max(4) as u16;
    digits + 2
}

/// Screen column where brick `pos` starts, for a pyramid centered on `center_x`
pub fn brick_x(pos: Position, width: u16, center_x: u16) -> u16 {
    let row_width = (pos.row as u16 + 1) * width;
    center_x.saturating_sub(row_width / 2) + pos.col as u16 * width
}

fn render_game_screen(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let rows = app.game.puzzle().row_count() as u16;
    let width = brick_width(app.game.solution().apex());
    // Leave a blank line between rows while the pyramid fits
    let row_step: u16 = if rows * 2 + 14 <= term_height { 2 } else { 1 };
    let center_x = term_width / 2;
    let start_y: u16 = 3;

    execute!(
        stdout,
        MoveTo(center_x.saturating_sub(12), 1),
        SetForegroundColor(theme.key),
        Print("═══ NUMBER PYRAMID ═══")
    )?;

    for pos in app.game.puzzle().positions() {
        let x = brick_x(pos, width, center_x);
        let y = start_y + pos.row as u16 * row_step;
        render_brick(stdout, app, pos, x, y, width)?;
    }

    let info_y = start_y + rows * row_step + 1;
    render_status(stdout, app, term_width, info_y)?;
    render_info(stdout, app, term_width, info_y + 2)?;
    render_controls(stdout, app, term_width, info_y + 5)?;

    if app.menu == MenuState::Settings {
        render_settings_menu(stdout, app, term_width, term_height)?;
    }

    Ok(())
}

fn render_brick(
    stdout: &mut io::Stdout,
    app: &App,
    pos: Position,
    x: u16,
    y: u16,
    width: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let Some(cell) = app.game.puzzle().cell(pos) else {
        return Ok(());
    };
    let is_cursor = pos == app.cursor && app.menu == MenuState::None;
    let celebrating = app.celebrate.is_active(app.now_ms());

    let bg = if is_cursor { theme.selected_bg } else { theme.bg };
    let fg = if app.game.is_marked_wrong(pos) {
        theme.wrong
    } else if cell.given {
        theme.given
    } else if app.game.is_solved() && celebrating {
        theme.success
    } else if cell.is_filled() {
        theme.filled
    } else {
        theme.empty
    };

    let inner = (width - 2) as usize;
    let text = if cell.is_filled() {
        cell.display()
    } else {
        "·".to_string()
    };

    execute!(
        stdout,
        MoveTo(x, y),
        SetBackgroundColor(bg),
        SetForegroundColor(theme.border),
        Print(if cell.given { "[" } else { "(" }),
        SetForegroundColor(fg),
        Print(format!("{:^inner$}", text)),
        SetForegroundColor(theme.border),
        Print(if cell.given { "]" } else { ")" }),
        SetBackgroundColor(theme.bg)
    )?;

    Ok(())
}

fn render_status(stdout: &mut io::Stdout, app: &App, term_width: u16, y: u16) -> io::Result<()> {
    let theme = &app.theme;
    let status = app.game.status();
    let now = app.now_ms();

    let color = if status.is_problem() {
        theme.wrong
    } else if app.oops.is_active(now) {
        theme.oops
    } else if app.celebrate.is_active(now) {
        theme.success
    } else {
        theme.fg
    };

    let line = format!("{}  {}", status.emoji(), status.text());
    let x = term_width.saturating_sub(line.chars().count() as u16) / 2;
    execute!(stdout, MoveTo(x, y), SetForegroundColor(color), Print(line))?;

    if matches!(app.game.phase(), Phase::GentleHint | Phase::ExplicitHighlight) {
        let hint = "press a to try again";
        let x = term_width.saturating_sub(hint.len() as u16) / 2;
        execute!(stdout, MoveTo(x, y + 1), SetForegroundColor(theme.info), Print(hint))?;
    }

    Ok(())
}

fn render_info(stdout: &mut io::Stdout, app: &App, term_width: u16, y: u16) -> io::Result<()> {
    let theme = &app.theme;
    let stats = app.game.stats();
    let settings = app.game.settings();

    let score = format!(
        "Solved: {}   First try: {}   Session: {}",
        stats.solved,
        stats.first_try,
        app.session_time()
    );
    let setup = format!(
        "Rows: {}   Difficulty: {}   Top ≤ {}",
        settings.rows(),
        settings.difficulty(),
        settings.top_max()
    );

    for (i, line) in [score, setup].iter().enumerate() {
        let x = term_width.saturating_sub(line.chars().count() as u16) / 2;
        execute!(
            stdout,
            MoveTo(x, y + i as u16),
            SetForegroundColor(theme.info),
            Print(line)
        )?;
    }

    Ok(())
}

fn render_controls(stdout: &mut io::Stdout, app: &App, term_width: u16, y: u16) -> io::Result<()> {
    let controls: &[(&str, &str)] = match app.screen_state {
        ScreenState::Pyramid => &[
            ("hjkl/Arrows", "Move"),
            ("0-9", "Type"),
            ("Bksp/x", "Erase"),
            ("a", "Try again"),
            ("n", "New puzzle"),
            ("s", "Settings"),
            ("R", "Reset score"),
            ("Tab", "Tens & ones"),
            ("t", "Theme"),
            ("q", "Quit"),
        ],
        ScreenState::TensOnes => &[
            ("0-9", "Type"),
            ("←/→", "Switch box"),
            ("Enter", "Check"),
            ("n", "Next number"),
            ("g", "Range"),
            ("+/-", "Pages"),
            ("p", "Print sheet"),
            ("Tab", "Pyramid"),
            ("q", "Quit"),
        ],
    };
    render_key_grid(stdout, app, controls, term_width, y)
}

/// Key bindings in columns of three
fn render_key_grid(
    stdout: &mut io::Stdout,
    app: &App,
    controls: &[(&str, &str)],
    term_width: u16,
    y: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let columns = controls.len().div_ceil(3) as u16;
    let x = term_width.saturating_sub(columns * 24) / 2;

    for (i, (key, desc)) in controls.iter().enumerate() {
        let col = i / 3;
        let row = i % 3;
        execute!(
            stdout,
            MoveTo(x + col as u16 * 24, y + row as u16),
            SetForegroundColor(theme.key),
            Print(format!("{:>11}", key)),
            SetForegroundColor(theme.info),
            Print(format!(" {}", desc))
        )?;
    }

    Ok(())
}

fn render_message(
    stdout: &mut io::Stdout,
    app: &App,
    msg: &str,
    term_width: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let padded = format!("  {}  ", msg);
    let x = term_width.saturating_sub(padded.chars().count() as u16) / 2;

    execute!(
        stdout,
        MoveTo(x, 0),
        SetForegroundColor(theme.fg),
        SetBackgroundColor(theme.selected_bg),
        Print(&padded),
        SetBackgroundColor(theme.bg)
    )?;

    Ok(())
}

fn render_settings_menu(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let menu_width: u16 = 32;
    let menu_height: u16 = SettingsDraft::ITEMS as u16 + 5;
    let x = term_width.saturating_sub(menu_width) / 2;
    let y = term_height.saturating_sub(menu_height) / 2;

    let bg = Color::Rgb {
        r: 30,
        g: 30,
        b: 40,
    };

    // Background
    for row in 0..menu_height {
        execute!(
            stdout,
            MoveTo(x, y + row),
            SetBackgroundColor(bg),
            Print(" ".repeat(menu_width as usize))
        )?;
    }

    // Border
    execute!(stdout, SetForegroundColor(theme.border), SetBackgroundColor(bg))?;
    execute!(
        stdout,
        MoveTo(x, y),
        Print("┌"),
        Print("─".repeat(menu_width as usize - 2)),
        Print("┐")
    )?;
    for row in 1..menu_height - 1 {
        execute!(stdout, MoveTo(x, y + row), Print("│"))?;
        execute!(stdout, MoveTo(x + menu_width - 1, y + row), Print("│"))?;
    }
    execute!(
        stdout,
        MoveTo(x, y + menu_height - 1),
        Print("└"),
        Print("─".repeat(menu_width as usize - 2)),
        Print("┘")
    )?;

    let title = "New Puzzle";
    execute!(
        stdout,
        MoveTo(x + (menu_width - title.len() as u16) / 2, y + 1),
        SetForegroundColor(theme.fg),
        Print(title)
    )?;

    let draft = app.draft;
    let items = [
        format!("Rows        ◀ {:>4} ▶", draft.rows),
        format!("Difficulty  ◀ {:>4} ▶", draft.difficulty),
        format!("Top ≤       ◀ {:>4} ▶", draft.top_max),
        "Start".to_string(),
    ];

    for (i, item) in items.iter().enumerate() {
        let selected = i == app.menu_selection;
        let (fg, item_bg) = if selected {
            (Color::Black, theme.key)
        } else {
            (theme.fg, bg)
        };
        execute!(
            stdout,
            MoveTo(x + 2, y + 3 + i as u16),
            SetForegroundColor(fg),
            SetBackgroundColor(item_bg),
            Print(format!(" {:^26} ", item))
        )?;
    }

    execute!(stdout, SetBackgroundColor(theme.bg))?;
    Ok(())
}

fn render_tens_ones_screen(stdout: &mut io::Stdout, app: &App, term_width: u16) -> io::Result<()> {
    let theme = &app.theme;
    let center_x = term_width / 2;
    let exercise = &app.tens_ones;
    let task = exercise.task();
    let now = app.now_ms();

    execute!(
        stdout,
        MoveTo(center_x.saturating_sub(11), 1),
        SetForegroundColor(theme.key),
        Print("═══ TENS AND ONES ═══")
    )?;

    let number = format!("{}", task.number());
    execute!(
        stdout,
        MoveTo(center_x.saturating_sub(number.len() as u16 / 2), 4),
        SetForegroundColor(theme.given),
        Print(&number)
    )?;

    let boxes = [
        (TensOnesField::Tens, "tens", &app.tens_input),
        (TensOnesField::Ones, "ones", &app.ones_input),
    ];
    let row_x = center_x.saturating_sub(15);
    execute!(stdout, MoveTo(row_x, 6))?;
    for (field, label, value) in boxes {
        let focused = app.tens_focus == field;
        let fg = match app.tens_verdict {
            Some(Verdict::Wrong { tens_ok, ones_ok }) => {
                let ok = match field {
                    TensOnesField::Tens => tens_ok,
                    TensOnesField::Ones => ones_ok,
                };
                if ok {
                    theme.success
                } else {
                    theme.wrong
                }
            }
            Some(Verdict::Correct) => theme.success,
            _ => theme.filled,
        };
        execute!(
            stdout,
            SetBackgroundColor(if focused { theme.selected_bg } else { theme.bg }),
            SetForegroundColor(fg),
            Print(format!("[{:^4}]", value)),
            SetBackgroundColor(theme.bg),
            SetForegroundColor(theme.info),
            Print(format!(" {label}   "))
        )?;
    }

    let (line, color) = match app.tens_verdict {
        Some(Verdict::Correct) => (
            format!(
                "🎉 Right! {} = {} tens + {} ones",
                task.number(),
                task.tens(),
                task.ones()
            ),
            theme.success,
        ),
        Some(Verdict::Wrong { .. }) if app.oops.is_active(now) => {
            ("😕 Not quite. Look again!".to_string(), theme.oops)
        }
        Some(Verdict::Wrong { .. }) => ("😕 Not quite. Look again!".to_string(), theme.wrong),
        _ => ("🧠 How many tens and ones?".to_string(), theme.fg),
    };
    let x = term_width.saturating_sub(line.chars().count() as u16) / 2;
    execute!(stdout, MoveTo(x, 8), SetForegroundColor(color), Print(line))?;

    let info = format!(
        "Numbers: {}   Solved: {}   Print: {} page(s)",
        exercise.range(),
        exercise.solved(),
        exercise.print_pages()
    );
    let x = term_width.saturating_sub(info.chars().count() as u16) / 2;
    execute!(stdout, MoveTo(x, 10), SetForegroundColor(theme.info), Print(info))?;

    render_controls(stdout, app, term_width, 12)
}

fn render_confetti(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    for particle in app.confetti.particles() {
        if particle.is_visible(term_width, term_height) {
            execute!(
                stdout,
                MoveTo(particle.x as u16, particle.y as u16),
                SetForegroundColor(particle.color),
                Print(particle.char)
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brick_width_fits_apex() {
        assert_eq!(brick_width(20), 6);
        assert_eq!(brick_width(123_456), 8);
    }

    #[test]
    fn test_bricks_sit_between_their_children() {
        let width = 6;
        let center = 40;
        let apex = brick_x(Position::APEX, width, center);
        let left = brick_x(Position::new(1, 0), width, center);
        let right = brick_x(Position::new(1, 1), width, center);
        assert_eq!(apex, 37);
        assert_eq!(left + width / 2, apex);
        assert_eq!(right, left + width);
    }
}
