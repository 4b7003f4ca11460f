// Behaviour hypotheses
//
// A behaviour answers "which way would this snake go on this board?". The
// rollout engine plays them for mine and, through perspective snapshots, for
// every rival. They must be pure functions of the snapshot so rollouts stay
// reproducible.

use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::heuristics::{chase_tail, closest_food, food_then_tail, last_resort, safe_moves, MOVE_PRIORITY};
use crate::pathfinding::shortest_path;
use crate::snapshot::Snapshot;
use crate::types::{Coord, Direction};

/// Seed used when a wanderer is resolved by name alone
pub const DEFAULT_WANDERER_SEED: u64 = 0x5eed_5a4e;

/// Capability interface shared by every decision procedure
pub trait Behavior: Send + Sync {
    /// Stable name used to group rollout outcomes and in configuration
    fn key(&self) -> &str;

    /// Move for mine on `snapshot`
    fn next_move(&self, snapshot: &Snapshot) -> Direction;
}

/// Follows its own tail
#[derive(Debug, Clone, Copy, Default)]
pub struct TailChaser;

impl Behavior for TailChaser {
    fn key(&self) -> &str {
        "tail_chaser"
    }

    fn next_move(&self, snapshot: &Snapshot) -> Direction {
        chase_tail(snapshot)
    }
}

/// Heads for the nearest food regardless of rivals
#[derive(Debug, Clone, Copy, Default)]
pub struct Hungry;

impl Behavior for Hungry {
    fn key(&self) -> &str {
        "hungry"
    }

    fn next_move(&self, snapshot: &Snapshot) -> Direction {
        closest_food(snapshot).unwrap_or_else(|| chase_tail(snapshot))
    }
}

/// Only goes for food it would win the race to, otherwise follows its tail
#[derive(Debug, Clone, Copy, Default)]
pub struct Cautious;

impl Behavior for Cautious {
    fn key(&self) -> &str {
        "cautious"
    }

    fn next_move(&self, snapshot: &Snapshot) -> Direction {
        food_then_tail(snapshot)
    }
}

/// Closes in on the nearest rival head
#[derive(Debug, Clone, Copy, Default)]
pub struct Stalker;

impl Stalker {
    fn hunt(snapshot: &Snapshot) -> Option<Direction> {
        let head = snapshot.mine()?.head();
        let prey = snapshot
            .rivals()
            .min_by_key(|(_, rival)| head.manhattan(&rival.head()))
            .map(|(_, rival)| rival.head())?;

        let mut best: Option<Vec<Direction>> = None;
        for target in MOVE_PRIORITY.iter().map(|d| d.apply(&prey)) {
            let Some(path) = shortest_path(head, target, snapshot) else {
                continue;
            };
            if path.is_empty() {
                continue;
            }
            if best.as_ref().map_or(true, |b| path.len() < b.len()) {
                best = Some(path);
            }
        }
        best.and_then(|path| path.first().copied())
    }
}

impl Behavior for Stalker {
    fn key(&self) -> &str {
        "stalker"
    }

    fn next_move(&self, snapshot: &Snapshot) -> Direction {
        Stalker::hunt(snapshot)
            .or_else(|| closest_food(snapshot))
            .unwrap_or_else(|| last_resort(snapshot))
    }
}

/// Keeps going one way for as long as it can
#[derive(Debug, Clone)]
pub struct Headstrong {
    direction: Direction,
    key: String,
}

impl Headstrong {
    pub fn new(direction: Direction) -> Self {
        Headstrong {
            direction,
            key: format!("headstrong_{}", direction),
        }
    }
}

impl Behavior for Headstrong {
    fn key(&self) -> &str {
        &self.key
    }

    fn next_move(&self, snapshot: &Snapshot) -> Direction {
        let safe = safe_moves(snapshot);
        let [a, b] = self.direction.perpendicular();
        [self.direction, a, b, self.direction.opposite()]
            .into_iter()
            .find(|d| safe.contains(d))
            .unwrap_or_else(|| last_resort(snapshot))
    }
}

/// Picks a random safe move.
///
/// The generator is reseeded from the head position and length on every call,
/// so the same board always gets the same answer.
#[derive(Debug, Clone, Copy)]
pub struct Wanderer {
    seed: u64,
}

impl Wanderer {
    pub fn new(seed: u64) -> Self {
        Wanderer { seed }
    }

    fn mix(&self, head: Coord, length: usize) -> u64 {
        let position = ((head.x as u32 as u64) << 32) | head.y as u32 as u64;
        self.seed
            ^ position.wrapping_mul(0x9e37_79b9_7f4a_7c15)
            ^ (length as u64).wrapping_mul(0xbf58_476d_1ce4_e5b9)
    }
}

impl Default for Wanderer {
    fn default() -> Self {
        Wanderer::new(DEFAULT_WANDERER_SEED)
    }
}

impl Behavior for Wanderer {
    fn key(&self) -> &str {
        "wanderer"
    }

    fn next_move(&self, snapshot: &Snapshot) -> Direction {
        let Some(me) = snapshot.mine() else {
            return last_resort(snapshot);
        };
        let safe = safe_moves(snapshot);
        if safe.is_empty() {
            return last_resort(snapshot);
        }
        let mut rng = StdRng::seed_from_u64(self.mix(me.head(), me.len()));
        safe[rng.random_range(0..safe.len())]
    }
}

/// Every name `behavior_by_name` understands
pub const BEHAVIOR_NAMES: [&str; 9] = [
    "tail_chaser",
    "hungry",
    "cautious",
    "stalker",
    "headstrong_left",
    "headstrong_right",
    "headstrong_up",
    "headstrong_down",
    "wanderer",
];

/// Resolves a configured hypothesis name
pub fn behavior_by_name(name: &str) -> Option<Box<dyn Behavior>> {
    behavior_with_seed(name, DEFAULT_WANDERER_SEED)
}

/// Resolves a hypothesis name, seeding a wanderer with `wanderer_seed`.
///
/// `lookahead` is not a hypothesis; it is built from configuration by the bot.
pub fn behavior_with_seed(name: &str, wanderer_seed: u64) -> Option<Box<dyn Behavior>> {
    let behavior: Box<dyn Behavior> = match name {
        "tail_chaser" => Box::new(TailChaser),
        "hungry" => Box::new(Hungry),
        "cautious" => Box::new(Cautious),
        "stalker" => Box::new(Stalker),
        "wanderer" => Box::new(Wanderer::new(wanderer_seed)),
        other => match other.strip_prefix("headstrong_").map(Direction::parse) {
            Some(Ok(direction)) => Box::new(Headstrong::new(direction)),
            _ => {
                warn!("Unknown behaviour '{}'", name);
                return None;
            }
        },
    };
    Some(behavior)
}
