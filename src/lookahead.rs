// Lookahead decider
//
// Snapshot in, one move out: run every hypothesis combination through the
// rollout engine and keep the first move whose worst simulated future scores
// best.

use log::{debug, info};
use std::sync::Arc;
use std::time::Instant;

use crate::behavior::{behavior_with_seed, Behavior};
use crate::config::Config;
use crate::heuristics::last_resort;
use crate::rollout::{Countdown, RolloutEngine};
use crate::selector::{best_group, ScoreWeights};
use crate::snapshot::Snapshot;
use crate::types::Direction;

/// Limits and weights of one lookahead
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookaheadSettings {
    pub max_millis: u64,
    pub max_turns: u32,
    pub weights: ScoreWeights,
}

/// A chosen move plus what it took to choose it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub direction: Direction,
    /// Worst-case score of the chosen group; `None` when nothing was simulated
    pub score: Option<u64>,
    pub rollouts: usize,
    pub rounds: u32,
    pub elapsed_ms: u64,
}

pub struct Lookahead {
    my_behaviors: Vec<Box<dyn Behavior>>,
    enemy_behaviors: Vec<Box<dyn Behavior>>,
    settings: LookaheadSettings,
}

impl Lookahead {
    pub fn new(
        my_behaviors: Vec<Box<dyn Behavior>>,
        enemy_behaviors: Vec<Box<dyn Behavior>>,
        settings: LookaheadSettings,
    ) -> Self {
        Lookahead {
            my_behaviors,
            enemy_behaviors,
            settings,
        }
    }

    /// Builds the hypotheses and limits named in `config`
    pub fn from_config(config: &Config) -> Result<Self, String> {
        let seed = config.simulation.wanderer_seed;
        let resolve = |names: &[String]| -> Result<Vec<Box<dyn Behavior>>, String> {
            names
                .iter()
                .map(|name| {
                    behavior_with_seed(name, seed).ok_or_else(|| format!("Unknown behaviour '{}'", name))
                })
                .collect()
        };

        Ok(Lookahead::new(
            resolve(&config.simulation.my_behaviors)?,
            resolve(&config.simulation.enemy_behaviors)?,
            LookaheadSettings {
                max_millis: config.decision_budget_ms(),
                max_turns: config.simulation.max_turns,
                weights: ScoreWeights {
                    survival_turn_weight: config.scores.survival_turn_weight,
                    food_eaten_weight: config.scores.food_eaten_weight,
                },
            },
        ))
    }

    pub fn settings(&self) -> &LookaheadSettings {
        &self.settings
    }

    /// Simulates every hypothesis combination from `snapshot` and picks the
    /// maximin first move
    pub fn decide(&self, snapshot: Arc<Snapshot>, countdown: Countdown) -> Decision {
        let started = Instant::now();
        let engine = RolloutEngine::new(&self.my_behaviors, &self.enemy_behaviors, self.settings.max_turns);
        let report = engine.run(Arc::clone(&snapshot), &countdown);

        let best = best_group(&report.outcomes, &self.settings.weights);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let decision = match best {
            Some((group, worst)) => {
                debug!(
                    "Best group {} / {}: worst case {}",
                    group.my_behavior, group.first_move, worst
                );
                Decision {
                    direction: group.first_move,
                    score: Some(worst),
                    rollouts: report.outcomes.len(),
                    rounds: report.rounds,
                    elapsed_ms,
                }
            }
            None => Decision {
                direction: last_resort(&snapshot),
                score: None,
                rollouts: 0,
                rounds: report.rounds,
                elapsed_ms,
            },
        };

        info!(
            "Lookahead chose {} after {} rollouts, {} rounds, {}ms",
            decision.direction, decision.rollouts, decision.rounds, decision.elapsed_ms
        );
        decision
    }
}

impl Behavior for Lookahead {
    fn key(&self) -> &str {
        "lookahead"
    }

    fn next_move(&self, snapshot: &Snapshot) -> Direction {
        self.decide(Arc::new(snapshot.clone()), Countdown::new(self.settings.max_millis))
            .direction
    }
}
