//! Go Text Protocol (GTP) implementation.
//!
//! GTP is a text-based protocol for communicating with Go-playing programs.
//! This module implements the subset of GTP version 2 needed to drive the
//! engine from graphical Go interfaces like Sabaki or GoGui.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`
//! - `list_commands`, `known_command <cmd>`
//! - `quit`
//! - `boardsize <size>` - Resize and clear the board (2 to 25)
//! - `clear_board` - Reset the board to empty
//! - `komi <value>` - Accepted and ignored; games are decided on captures
//! - `play <color> <vertex>` - Play a move for the player to move
//! - `genmove <color>` - Search, play and report a move
//! - `showboard` - Render the board
//! - `final_score` - Capture difference, e.g. `W+3`
//!
//! ## Example
//!
//! ```ignore
//! use capture_go::gtp::GtpEngine;
//! let mut engine = GtpEngine::new();
//! engine.run()?;
//! ```

use std::io::{self, BufRead, Write};

use log::{trace, warn};

use crate::board::{format_move, parse_vertex, Color, Move};
use crate::constants::{DEFAULT_ITERATIONS, DEFAULT_SIZE, MAX_GTP_SIZE, MIN_SIZE};
use crate::mcts::{SearchConfig, SearchEngine};
use crate::position::BoardState;

/// The list of known GTP commands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "final_score",
    "genmove",
    "known_command",
    "komi",
    "list_commands",
    "name",
    "play",
    "protocol_version",
    "quit",
    "showboard",
    "version",
];

/// GTP engine state.
pub struct GtpEngine {
    /// Current game position
    pos: BoardState,
    /// Search engine used by `genmove`
    engine: SearchEngine,
    /// Search iterations per generated move
    iterations: usize,
}

impl Default for GtpEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GtpEngine {
    /// Create a GTP engine with default settings.
    pub fn new() -> Self {
        Self::with_engine(SearchEngine::new(SearchConfig::default()), DEFAULT_SIZE, DEFAULT_ITERATIONS)
    }

    /// Create a GTP engine around a configured search engine.
    pub fn with_engine(engine: SearchEngine, size: usize, iterations: usize) -> Self {
        Self {
            pos: BoardState::new(size),
            engine,
            iterations,
        }
    }

    /// The current position.
    pub fn position(&self) -> &BoardState {
        &self.pos
    }

    /// Run the GTP command loop on stdin/stdout.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with(stdin.lock(), stdout.lock())
    }

    /// Run the GTP command loop on arbitrary streams.
    pub fn run_with<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();
            trace!("gtp <- {command} {args:?}");

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            write!(output, "{prefix}{id_str} {message}\n\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());

        if end > 0 {
            if let Ok(id) = trimmed[..end].parse::<u32>() {
                return (Some(id), trimmed[end..].trim());
            }
        }

        (None, trimmed)
    }

    /// Check that a color argument names the player to move.
    fn check_color(&self, arg: &str) -> Result<Color, String> {
        let color = Color::parse(arg).ok_or_else(|| format!("invalid color '{arg}'"))?;
        if color != self.pos.current_player() {
            return Err(format!("{color} is not to move"));
        }
        Ok(color)
    }

    /// Execute a GTP command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "2".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let Some(cmd) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                (true, known.to_string())
            }

            "quit" => (true, String::new()),

            "boardsize" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match arg.parse::<usize>() {
                    Ok(size) if (MIN_SIZE..=MAX_GTP_SIZE).contains(&size) => {
                        self.pos = BoardState::new(size);
                        (true, String::new())
                    }
                    Ok(_) => (false, "unacceptable size".to_string()),
                    Err(_) => (false, "invalid size".to_string()),
                }
            }

            "clear_board" => {
                self.pos = BoardState::new(self.pos.size());
                (true, String::new())
            }

            "komi" => match args.first().map(|a| a.parse::<f32>()) {
                Some(Ok(_)) => (true, String::new()),
                Some(Err(_)) => (false, "invalid komi".to_string()),
                None => (false, "missing argument".to_string()),
            },

            "play" => {
                let [color, vertex, ..] = args else {
                    return (false, "missing arguments".to_string());
                };
                if let Err(e) = self.check_color(color) {
                    return (false, e);
                }
                let mv = match parse_vertex(vertex, self.pos.size()) {
                    Ok(mv) => mv,
                    Err(e) => return (false, e.to_string()),
                };
                match self.pos.play(mv) {
                    Ok(()) => (true, String::new()),
                    Err(e) => (false, e.to_string()),
                }
            }

            "genmove" => {
                let Some(color) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                if let Err(e) = self.check_color(color) {
                    return (false, e);
                }

                let mv = self
                    .engine
                    .choose_move(&self.pos, self.iterations)
                    .unwrap_or(Move::Pass);
                let played = match self.pos.play(mv) {
                    Ok(()) => mv,
                    Err(e) => {
                        warn!("engine move rejected ({e}), passing instead");
                        self.pos.pass_turn();
                        Move::Pass
                    }
                };
                (true, format_move(played, self.pos.size()))
            }

            "showboard" => (true, format!("\n{}", self.pos)),

            "final_score" => {
                let black = self.pos.captures(Color::Black);
                let white = self.pos.captures(Color::White);
                let score = match self.pos.leader() {
                    Some(Color::Black) => format!("B+{}", black - white),
                    Some(Color::White) => format!("W+{}", white - black),
                    None => "0".to_string(),
                };
                (true, score)
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::CellState;

    fn engine(size: usize) -> GtpEngine {
        GtpEngine::with_engine(SearchEngine::with_seed(SearchConfig::default(), 5), size, 20)
    }

    #[test]
    fn test_parse_id_with_id() {
        let (id, cmd) = GtpEngine::parse_id("123 name");
        assert_eq!(id, Some(123));
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_parse_id_without_id() {
        let (id, cmd) = GtpEngine::parse_id("name");
        assert_eq!(id, None);
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_name_command() {
        let mut gtp = engine(9);
        let (success, response) = gtp.execute("name", &[]);
        assert!(success);
        assert_eq!(response, "capture-go");
    }

    #[test]
    fn test_known_command() {
        let mut gtp = engine(9);
        assert_eq!(gtp.execute("known_command", &["genmove"]), (true, "true".to_string()));
        assert_eq!(gtp.execute("known_command", &["undo"]), (true, "false".to_string()));
    }

    #[test]
    fn test_boardsize() {
        let mut gtp = engine(9);
        assert!(gtp.execute("boardsize", &["13"]).0);
        assert_eq!(gtp.position().size(), 13);
        assert!(!gtp.execute("boardsize", &["26"]).0);
        assert!(!gtp.execute("boardsize", &["x"]).0);
    }

    #[test]
    fn test_play_and_clear() {
        let mut gtp = engine(9);
        assert!(gtp.execute("play", &["black", "D4"]).0);
        assert_eq!(gtp.position().cell(5, 3), CellState::Black);

        // Same color again is rejected
        assert!(!gtp.execute("play", &["black", "E5"]).0);
        // Occupied point is rejected
        assert!(!gtp.execute("play", &["white", "D4"]).0);

        assert!(gtp.execute("clear_board", &[]).0);
        assert_eq!(gtp.position(), &BoardState::new(9));
    }

    #[test]
    fn test_genmove_plays_for_color() {
        let mut gtp = engine(5);
        gtp.execute("play", &["b", "C3"]);
        let (success, vertex) = gtp.execute("genmove", &["w"]);
        assert!(success);
        assert_eq!(gtp.position().current_player(), Color::Black);
        assert!(parse_vertex(&vertex, 5).is_ok());
    }

    #[test]
    fn test_final_score_counts_captures() {
        let mut gtp = engine(5);
        for (color, vertex) in [("b", "B5"), ("w", "B4"), ("b", "A4"), ("w", "pass"), ("b", "C4"), ("w", "pass"), ("b", "B3")] {
            assert!(gtp.execute("play", &[color, vertex]).0, "{color} {vertex}");
        }
        assert_eq!(gtp.execute("final_score", &[]), (true, "B+1".to_string()));
    }

    #[test]
    fn test_run_with_stream() {
        let mut gtp = engine(9);
        let input = b"1 name\n# comment\n\nprotocol_version\nbogus\nquit\nname\n";
        let mut out = Vec::new();
        gtp.run_with(&input[..], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "=1 capture-go\n\n= 2\n\n? unknown command: bogus\n\n= \n\n"
        );
    }
}
