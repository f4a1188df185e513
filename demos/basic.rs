//! Basic example of using the number pyramid engine

use pyramid_core::{CheckOutcome, Game, Settings, Stats};

fn main() {
    let settings = match Settings::new(4, 3, 40) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{e}");
            return;
        }
    };

    println!("Generating a 4-row pyramid with an apex of at most 40...\n");
    let mut game = match Game::new(settings, Stats::default()) {
        Ok(game) => game,
        Err(e) => {
            eprintln!("{e}");
            return;
        }
    };

    println!("Solution:");
    println!("{}", game.solution());
    println!("Given cells: {}", game.puzzle().given_count());
    println!("Signature: {}\n", game.puzzle().signature());

    // Answer every hidden brick one too high, then fix them
    let hidden: Vec<_> = game
        .puzzle()
        .cells()
        .filter(|(_, cell)| !cell.given)
        .map(|(pos, cell)| (pos, cell.value))
        .collect();

    for &(pos, value) in &hidden {
        if let Some(outcome) = game.update_input(pos, &(value + 1).to_string()) {
            println!("{:?}: {} {}", outcome, game.status().emoji(), game.status().text());
        }
    }

    if let Some(&(pos, value)) = hidden.first() {
        game.update_input(pos, &(value + 2).to_string());
        println!("{} {}", game.status().emoji(), game.status().text());
        println!("Marked wrong: {:?}\n", game.wrong_positions());
    }

    for &(pos, value) in &hidden {
        if let Some(CheckOutcome::Solved { first_try }) = game.update_input(pos, &value.to_string()) {
            println!("Solved! First try: {first_try}");
        }
    }

    let stats = game.stats();
    println!("Score: {} solved, {} on the first try", stats.solved, stats.first_try);
}
