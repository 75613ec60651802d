//! Capture-Go: play capture-count Go against an MCTS engine.
//!
//! ## Usage
//!
//! - `capture-go` - Show a demo
//! - `capture-go play` - Play a game in the terminal
//! - `capture-go gtp` - Start GTP server for GUI integration
//! - `capture-go demo` - Run the demo

use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use flexi_logger::Logger;
use log::{info, warn};

use capture_go::board::{format_move, parse_vertex, Color, Move};
use capture_go::constants::{DEFAULT_ITERATIONS, DEFAULT_SIZE, EXPLORATION, MAX_GTP_SIZE, MIN_SIZE};
use capture_go::gtp::GtpEngine;
use capture_go::mcts::{Perspective, SearchConfig, SearchEngine};
use capture_go::position::BoardState;
use capture_go::worker::spawn_search;

/// Capture-Go: a capture-count Go engine using Monte Carlo Tree Search
#[derive(Parser)]
#[command(name = "capture-go")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Board size (NxN)
    #[arg(long, global = true, default_value_t = DEFAULT_SIZE, value_parser = parse_board_size)]
    size: usize,

    /// MCTS iterations per engine move
    #[arg(long, global = true, default_value_t = DEFAULT_ITERATIONS)]
    iterations: usize,

    /// Seed for reproducible searches
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// UCT exploration constant
    #[arg(long, global = true, default_value_t = EXPLORATION)]
    exploration: f64,

    /// Whose win rate selection maximizes at each node
    #[arg(long, global = true, value_enum, default_value_t = PerspectiveArg::Alternating)]
    perspective: PerspectiveArg,

    /// Log level, overridden by RUST_LOG
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Play against the engine in the terminal
    Play {
        /// Color of the human player
        #[arg(long, value_enum, default_value_t = Side::Black)]
        human: Side,
    },
    /// Start the GTP (Go Text Protocol) server for use with GUI applications
    Gtp,
    /// Run a simple demo of the engine
    Demo,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Side {
    Black,
    White,
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::Black => Color::Black,
            Side::White => Color::White,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum PerspectiveArg {
    Alternating,
    FixedWhite,
}

impl From<PerspectiveArg> for Perspective {
    fn from(arg: PerspectiveArg) -> Self {
        match arg {
            PerspectiveArg::Alternating => Perspective::Alternating,
            PerspectiveArg::FixedWhite => Perspective::FixedWhite,
        }
    }
}

fn parse_board_size(s: &str) -> Result<usize, String> {
    let size: usize = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if (MIN_SIZE..=MAX_GTP_SIZE).contains(&size) {
        Ok(size)
    } else {
        Err(format!("board size must be between {MIN_SIZE} and {MAX_GTP_SIZE}"))
    }
}

impl Cli {
    fn search_config(&self) -> SearchConfig {
        SearchConfig {
            exploration: self.exploration,
            perspective: self.perspective.into(),
            rollout_limit: None,
        }
    }

    fn engine(&self) -> SearchEngine {
        match self.seed {
            Some(seed) => SearchEngine::with_seed(self.search_config(), seed),
            None => SearchEngine::new(self.search_config()),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _logger = Logger::try_with_env_or_str(&cli.log_level)?
        .format(flexi_logger::colored_default_format)
        .start()?;

    match cli.command {
        Some(Commands::Gtp) => {
            let mut engine = GtpEngine::with_engine(cli.engine(), cli.size, cli.iterations);
            engine.run().context("GTP session failed")?;
        }
        Some(Commands::Play { human }) => play(&cli, human.into())?,
        Some(Commands::Demo) | None => run_demo(&cli),
    }
    Ok(())
}

/// Interactive game: the human enters vertices, the engine answers.
fn play(cli: &Cli, human: Color) -> Result<()> {
    let mut pos = BoardState::new(cli.size);
    let mut seeds = cli.seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!("You play {human}. Enter a vertex (e.g. D4), 'pass' or 'quit'.\n");

    while !pos.is_terminal() {
        println!("{pos}");

        if pos.current_player() == human {
            print!("{human}> ");
            io::stdout().flush()?;
            let Some(line) = lines.next() else {
                return Ok(());
            };
            let line = line?;
            let input = line.trim();
            if input.eq_ignore_ascii_case("quit") {
                return Ok(());
            }
            let result = parse_vertex(input, pos.size())
                .map_err(anyhow::Error::from)
                .and_then(|mv| pos.play(mv).map_err(anyhow::Error::from));
            if let Err(e) = result {
                println!("{e}");
            }
            continue;
        }

        // Input is not read again until the search has delivered its move.
        let pending = spawn_search(cli.search_config(), seeds.u64(..), &pos, cli.iterations)?;
        print!("Thinking");
        while !pending.is_finished() {
            print!(".");
            io::stdout().flush()?;
            thread::sleep(Duration::from_millis(200));
        }
        println!();

        let mv = pending.wait().unwrap_or_else(|e| {
            warn!("search failed ({e}), passing");
            Move::Pass
        });
        let played = match pos.play(mv) {
            Ok(()) => mv,
            Err(e) => {
                warn!("engine move rejected ({e}), passing instead");
                pos.pass_turn();
                Move::Pass
            }
        };
        println!("{} plays {}", human.opponent(), format_move(played, pos.size()));
    }

    println!("{pos}");
    let black = pos.captures(Color::Black);
    let white = pos.captures(Color::White);
    match pos.leader() {
        Some(winner) => println!("Game over. Winner: {winner} (Black={black} White={white})"),
        None => println!("Game over. Draw (Black={black} White={white})"),
    }
    info!("game finished: black={black} white={white}");
    Ok(())
}

fn run_demo(cli: &Cli) {
    println!("Capture-Go: capture-count Go with MCTS\n");

    // Demo 1: capturing a stone
    println!("=== Capture Demo ===");
    let mut board = BoardState::new(5);
    for mv in [
        Move::place(0, 1),
        Move::place(1, 1),
        Move::place(1, 0),
        Move::Pass,
        Move::place(1, 2),
        Move::Pass,
        Move::place(2, 1),
    ] {
        let result = board.play(mv);
        println!("{} -> {:?}", format_move(mv, 5), result);
    }
    println!("{board}");

    // Demo 2: engine reply on a small board
    println!("=== MCTS Demo ===");
    let mut pos = BoardState::new(cli.size.min(9));
    let center = pos.size() / 2;
    let _ = pos.apply_move(center, center);
    let mut engine = cli.engine();

    let iterations = cli.iterations.min(500);
    println!("Running {iterations} MCTS iterations...");
    let tree = engine.search(&pos, iterations);
    let best = tree.best_move().unwrap_or(Move::Pass);
    println!("Best move: {}", format_move(best, pos.size()));
    if let Some(value) = tree.best_child().and_then(|c| tree[c].mean_reward()) {
        println!("White win estimate: {:.1}%", value * 100.0);
    }
}
