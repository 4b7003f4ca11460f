// Battlesnake bot
//
// Owns the configured decision behaviour and exposes one method per API
// endpoint. The decision itself is CPU-bound, so /move hands it to the
// blocking pool and the async side only waits for the answer.

use log::{error, info, warn};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

use crate::behavior::{behavior_with_seed, Behavior, Cautious};
use crate::config::{Config, LOOKAHEAD_ALGORITHM};
use crate::debug_logger::DebugLogger;
use crate::heuristics::DEFAULT_DIRECTION;
use crate::lookahead::Lookahead;
use crate::snapshot::Snapshot;
use crate::types::{Battlesnake, Board, Direction, Game, GameState};

/// Battlesnake Bot with OOP-style API
/// Takes static configuration dependencies and exposes methods corresponding to API endpoints
pub struct Bot {
    config: Config,
    behavior: Arc<dyn Behavior>,
    debug_logger: DebugLogger,
}

impl Bot {
    /// Creates a new Bot instance with the given configuration
    ///
    /// `strategy.algorithm` picks the behaviour answering /move: the lookahead,
    /// or any single behaviour by name. An unusable strategy falls back to
    /// the cautious heuristic.
    pub fn new(config: Config) -> Self {
        let behavior = Self::behavior_from_config(&config);
        let debug_logger = DebugLogger::new(config.debug.enabled, &config.debug.log_file_path);
        Bot {
            config,
            behavior,
            debug_logger,
        }
    }

    /// Creates a bot that decides with `behavior` regardless of `strategy.algorithm`
    pub fn with_behavior(config: Config, behavior: Arc<dyn Behavior>) -> Self {
        Bot {
            config,
            behavior,
            debug_logger: DebugLogger::disabled(),
        }
    }

    fn behavior_from_config(config: &Config) -> Arc<dyn Behavior> {
        let algorithm = config.strategy.algorithm.as_str();
        if algorithm == LOOKAHEAD_ALGORITHM {
            match Lookahead::from_config(config) {
                Ok(lookahead) => return Arc::new(lookahead),
                Err(e) => warn!("Cannot build lookahead ({}), using cautious", e),
            }
        } else if let Some(behavior) = behavior_with_seed(algorithm, config.simulation.wanderer_seed) {
            return Arc::from(behavior);
        }
        Arc::new(Cautious)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Key of the behaviour answering /move
    pub fn strategy(&self) -> &str {
        self.behavior.key()
    }

    /// Returns bot metadata and appearance
    /// Corresponds to GET / endpoint
    pub fn info(&self) -> Value {
        info!("INFO");

        let appearance = &self.config.appearance;
        json!({
            "apiversion": appearance.apiversion,
            "author": appearance.author,
            "color": appearance.color,
            "head": appearance.head,
            "tail": appearance.tail,
            "version": appearance.version,
        })
    }

    /// Called when a game starts
    /// Corresponds to POST /start endpoint
    pub fn start(&self, game: &Game, _turn: &i32, board: &Board, _you: &Battlesnake) {
        info!(
            "GAME START {} ({}x{}, {} snakes, strategy {})",
            game.id,
            board.width,
            board.height,
            board.snakes.len(),
            self.behavior.key()
        );
    }

    /// Called when a game ends
    /// Corresponds to POST /end endpoint
    pub fn end(&self, game: &Game, turn: &i32, _board: &Board, _you: &Battlesnake) {
        info!("GAME OVER {} after {} turns", game.id, turn);
    }

    /// Computes and returns the next move
    /// Corresponds to POST /move endpoint
    ///
    /// A payload that cannot be turned into a snapshot, or a decision task
    /// that fails, is logged and answered with the default direction.
    pub async fn get_move(&self, game: &Game, turn: &i32, board: &Board, you: &Battlesnake) -> Value {
        let start_time = Instant::now();
        info!("Turn {}: Computing move", turn);

        let request = GameState {
            game: game.clone(),
            turn: *turn,
            board: board.clone(),
            you: you.clone(),
        };

        let chosen_move = match Snapshot::from_request(&request) {
            Ok(snapshot) => {
                let behavior = Arc::clone(&self.behavior);
                match tokio::task::spawn_blocking(move || behavior.next_move(&snapshot)).await {
                    Ok(direction) => direction,
                    Err(e) => {
                        error!("Turn {}: decision task failed: {}", turn, e);
                        DEFAULT_DIRECTION
                    }
                }
            }
            Err(e) => {
                error!("Turn {}: rejected board: {}", turn, e);
                DEFAULT_DIRECTION
            }
        };

        info!(
            "Turn {}: Chose {} ({}, time: {}ms)",
            turn,
            chosen_move.as_str(),
            self.behavior.key(),
            start_time.elapsed().as_millis()
        );

        self.debug_logger
            .log_move(*turn, &you.id, request.board, chosen_move);

        json!({ "move": chosen_move.as_str() })
    }
}

/// Reads the direction token out of a /move response
pub fn move_token(response: &Value) -> Option<Direction> {
    response
        .get("move")
        .and_then(Value::as_str)
        .and_then(|token| Direction::parse(token).ok())
}
