// Replay module for analyzing debug logs and debugging decisions
//
// This module provides functionality to:
// 1. Parse JSONL debug logs
// 2. Re-run the lookahead on logged boards
// 3. Compare logged vs replayed moves
// 4. Print a report and validate expected moves

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::lookahead::Lookahead;
use crate::rollout::Countdown;
use crate::snapshot::Snapshot;
use crate::types::{Board, Direction};

/// Represents a single log entry from the debug JSONL file
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LogEntry {
    pub turn: i32,
    /// Snake that made the logged move; older logs omit it and mean the first snake
    #[serde(default)]
    pub you_id: Option<String>,
    pub chosen_move: String,
    pub board: Board,
    #[serde(default)]
    pub timestamp: String,
}

impl LogEntry {
    /// Id of the snake whose move was logged
    pub fn snake_id(&self) -> Option<&str> {
        self.you_id
            .as_deref()
            .or_else(|| self.board.snakes.first().map(|s| s.id.as_str()))
    }
}

/// Result of replaying a single turn
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub turn: i32,
    pub original_move: Direction,
    pub replayed_move: Direction,
    pub matches: bool,
    pub score: Option<u64>,
    pub rollouts: usize,
    pub rounds: u32,
    pub computation_time_ms: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_turns: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
}

/// Replay engine for analyzing debug logs
pub struct ReplayEngine {
    lookahead: Lookahead,
    verbose: bool,
    use_deadline: bool,
}

impl ReplayEngine {
    /// Creates a replay engine running the lookahead described by `config`
    ///
    /// Replays ignore the wall clock by default so the same log always gives
    /// the same answers.
    pub fn new(config: &Config, verbose: bool) -> Result<Self, String> {
        Ok(ReplayEngine {
            lookahead: Lookahead::from_config(config)?,
            verbose,
            use_deadline: false,
        })
    }

    /// Replays under the configured decision budget, as the live bot does
    pub fn with_deadline(mut self, use_deadline: bool) -> Self {
        self.use_deadline = use_deadline;
        self
    }

    /// Loads all log entries from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<LogEntry>, String> {
        let file = File::open(log_path.as_ref()).map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: LogEntry = serde_json::from_str(&line)
                .map_err(|e| format!("Failed to parse JSON on line {}: {}", line_num + 1, e))?;

            entries.push(entry);
        }

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Replays a single log entry and compares the result
    pub fn replay_entry(&self, entry: &LogEntry) -> Result<ReplayResult, String> {
        if self.verbose {
            info!("Replaying turn {}...", entry.turn);
        }

        let original_move = Direction::parse(&entry.chosen_move)?;
        let you_id = entry.snake_id().ok_or("No snakes found in board state")?;
        let snapshot = Snapshot::from_board(&entry.board, you_id).map_err(|e| e.to_string())?;

        let countdown = if self.use_deadline {
            Countdown::new(self.lookahead.settings().max_millis)
        } else {
            Countdown::unbounded()
        };

        let start_time = Instant::now();
        let decision = self.lookahead.decide(Arc::new(snapshot), countdown);
        let computation_time_ms = start_time.elapsed().as_millis();

        let matches = original_move == decision.direction;
        let result = ReplayResult {
            turn: entry.turn,
            original_move,
            replayed_move: decision.direction,
            matches,
            score: decision.score,
            rollouts: decision.rollouts,
            rounds: decision.rounds,
            computation_time_ms,
        };

        if self.verbose {
            if matches {
                info!(
                    "Turn {}: MATCH - {} (score: {:?}, rollouts: {}, time: {}ms)",
                    entry.turn, result.replayed_move, result.score, result.rollouts, computation_time_ms
                );
            } else {
                warn!(
                    "Turn {}: MISMATCH - Original: {}, Replayed: {} (score: {:?}, rollouts: {}, time: {}ms)",
                    entry.turn,
                    original_move,
                    result.replayed_move,
                    result.score,
                    result.rollouts,
                    computation_time_ms
                );
            }
        }

        Ok(result)
    }

    /// Replays all entries; entries that cannot be replayed are skipped with a warning
    pub fn replay_all(&self, entries: &[LogEntry]) -> Vec<ReplayResult> {
        let mut results = Vec::new();

        for entry in entries {
            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => warn!("Failed to replay turn {}: {}", entry.turn, e),
            }
        }

        results
    }

    /// Replays specific turns from a log file
    pub fn replay_turns(&self, entries: &[LogEntry], turn_numbers: &[i32]) -> Result<Vec<ReplayResult>, String> {
        let mut results = Vec::new();

        for turn_num in turn_numbers {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn_num)
                .ok_or_else(|| format!("Turn {} not found in log file", turn_num))?;

            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => warn!("Failed to replay turn {}: {}", turn_num, e),
            }
        }

        Ok(results)
    }

    /// Generates statistics from replay results
    pub fn generate_stats(results: &[ReplayResult]) -> ReplayStats {
        let total_turns = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_turns - matches;
        let match_rate = if total_turns > 0 {
            (matches as f64 / total_turns as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_turns,
            matches,
            mismatches,
            match_rate,
        }
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = Self::generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Total Turns:    {}", stats.total_turns);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!("═══════════════════════════════════════════════════════════\n");

        if !results.is_empty() {
            let count = results.len() as f64;
            let avg_time = results.iter().map(|r| r.computation_time_ms as f64).sum::<f64>() / count;
            let avg_rollouts = results.iter().map(|r| r.rollouts as f64).sum::<f64>() / count;

            println!("Average Rollouts:           {:.1}", avg_rollouts);
            println!("Average Computation Time:   {:.1}ms\n", avg_time);
        }

        let mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED MISMATCHES");
            println!("═══════════════════════════════════════════════════════════");

            for result in mismatches {
                println!(
                    "Turn {}: {} → {} (score: {:?}, rounds: {}, time: {}ms)",
                    result.turn,
                    result.original_move,
                    result.replayed_move,
                    result.score,
                    result.rounds,
                    result.computation_time_ms
                );
            }
            println!();
        }
    }

    /// Checks that the logged move of each listed turn is one of the acceptable moves
    pub fn validate_expected_moves(
        entries: &[LogEntry],
        expected_moves: &[(i32, Vec<Direction>)],
    ) -> Result<(), String> {
        for (turn, acceptable) in expected_moves {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn)
                .ok_or_else(|| format!("Turn {} not found in log", turn))?;

            let actual_move = Direction::parse(&entry.chosen_move)?;

            if !acceptable.contains(&actual_move) {
                return Err(format!(
                    "Turn {}: Expected one of {:?}, but got {}",
                    turn,
                    acceptable.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
                    actual_move
                ));
            }
        }

        Ok(())
    }
}
