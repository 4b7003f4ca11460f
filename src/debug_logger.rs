// Debug logging module for asynchronous decision logging
//
// Each answered /move is appended to a JSONL file as one line holding the
// board, the snake we played and the move we sent. The replay tool reads these
// lines back. Writes happen on a spawned task so the response never waits on
// the disk.

use log::{error, info};
use serde::Serialize;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::types::{Board, Direction};

/// One line of the debug log
#[derive(Debug, Serialize)]
struct DebugLogEntry {
    turn: i32,
    you_id: String,
    chosen_move: String,
    board: Board,
    timestamp: String,
}

/// Shared debug logger state
/// Uses Arc<Mutex<File>> so concurrent requests append whole lines
#[derive(Clone)]
pub struct DebugLogger {
    file: Arc<Mutex<Option<File>>>,
    enabled: bool,
}

impl DebugLogger {
    /// Creates a new debug logger
    /// If enabled is true, opens the log file (truncating if it exists).
    /// A file that cannot be opened leaves the logger disabled.
    pub fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        let opened = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path);

        match opened {
            Ok(file) => {
                info!("Debug logging enabled: {}", log_file_path);
                DebugLogger {
                    file: Arc::new(Mutex::new(Some(File::from_std(file)))),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to create debug log file '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    /// Creates a disabled debug logger (no-op)
    pub fn disabled() -> Self {
        DebugLogger {
            file: Arc::new(Mutex::new(None)),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Logs a move decision (fire-and-forget)
    /// Must be called from within a tokio runtime
    pub fn log_move(&self, turn: i32, you_id: &str, board: Board, chosen_move: Direction) {
        if !self.enabled {
            return;
        }

        let entry = DebugLogEntry {
            turn,
            you_id: you_id.to_string(),
            chosen_move: chosen_move.as_str().to_string(),
            board,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let file_handle = self.file.clone();

        tokio::spawn(async move {
            Self::write_entry(file_handle, entry).await;
        });
    }

    /// Serializes the entry and appends it, flushing after every line
    async fn write_entry(file_handle: Arc<Mutex<Option<File>>>, entry: DebugLogEntry) {
        let line = match serde_json::to_string(&entry) {
            Ok(json_line) => format!("{}\n", json_line),
            Err(e) => {
                error!("Failed to serialize debug log entry: {}", e);
                return;
            }
        };

        let mut file_guard = file_handle.lock().await;
        if let Some(file) = file_guard.as_mut() {
            if let Err(e) = file.write_all(line.as_bytes()).await {
                error!("Failed to write debug log entry: {}", e);
            } else if let Err(e) = file.flush().await {
                error!("Failed to flush debug log: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ascii::parse_board;

    #[test]
    fn test_disabled_logger_ignores_moves() {
        let logger = DebugLogger::new(false, "never_created.jsonl");
        assert!(!logger.is_enabled());
        // No runtime is running here; a disabled logger must not spawn.
        let board = parse_board(&["0 _", "^ _"]).unwrap();
        logger.log_move(1, "0", board, Direction::Right);
        assert!(!std::path::Path::new("never_created.jsonl").exists());
    }

    #[test]
    fn test_unwritable_path_disables_logging() {
        let logger = DebugLogger::new(true, "/nonexistent-dir/debug.jsonl");
        assert!(!logger.is_enabled());
    }

    #[tokio::test]
    async fn test_entries_are_appended_as_json_lines() {
        let path = std::env::temp_dir().join(format!("lookahead_debug_{}.jsonl", std::process::id()));
        let path_str = path.to_string_lossy().to_string();
        let logger = DebugLogger::new(true, &path_str);
        assert!(logger.is_enabled());

        let board = parse_board(&["0 _", "^ _"]).unwrap();
        logger.log_move(7, "0", board, Direction::Right);

        let mut contents = String::new();
        for _ in 0..100 {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            contents = std::fs::read_to_string(&path).unwrap();
            if !contents.is_empty() {
                break;
            }
        }
        let _ = std::fs::remove_file(&path);

        let line: serde_json::Value = serde_json::from_str(contents.trim()).unwrap();
        assert_eq!(line["turn"], 7);
        assert_eq!(line["you_id"], "0");
        assert_eq!(line["chosen_move"], "right");
        assert_eq!(line["board"]["width"], 2);
    }
}
