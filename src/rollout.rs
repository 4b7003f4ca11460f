// Rollout engine
//
// A rollout plays one hypothesis out: mine follows `my_behavior` after a forced
// first move, every rival follows `enemy_behavior` on its own perspective. The
// engine keeps one rollout per (my behaviour, first move, enemy behaviour) and
// advances them together, one turn per round, until each one finishes or the
// countdown runs out.

use log::debug;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::behavior::Behavior;
use crate::heuristics::{last_resort, safe_moves, MOVE_PRIORITY};
use crate::snapshot::Snapshot;
use crate::types::Direction;

/// Why a rollout stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    /// Mine was removed
    Loss,
    /// Every rival present at the start was removed
    Win,
    /// Turn ceiling reached
    MaxTurns,
    /// Wall-clock budget ran out first
    OutOfTime,
}

/// Rollouts sharing mine's behaviour and forced first move
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub my_behavior: String,
    pub first_move: Direction,
}

/// Summary of one finished rollout
#[derive(Debug, Clone)]
pub struct OutcomeRecord {
    pub group: GroupKey,
    pub enemy_behavior: String,
    /// Id of mine in the root snapshot
    pub my_id: String,
    pub turns_simulated: u32,
    pub end_state: Arc<Snapshot>,
    /// Agent id to the turn it was removed
    pub obituaries: HashMap<String, u32>,
    /// Agent id to the turns it ate
    pub foods_eaten: HashMap<String, Vec<u32>>,
    pub termination: Termination,
    /// Moves mine made, in order
    pub moves: Vec<Direction>,
}

/// Wall-clock budget shared by every rollout of one decision
#[derive(Debug, Clone, Copy)]
pub struct Countdown {
    deadline: Option<Instant>,
}

impl Countdown {
    pub fn new(max_millis: u64) -> Self {
        Countdown {
            deadline: Some(Instant::now() + Duration::from_millis(max_millis)),
        }
    }

    /// Never expires; rollouts end on their own
    pub fn unbounded() -> Self {
        Countdown { deadline: None }
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.map_or(false, |deadline| Instant::now() >= deadline)
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }
}

/// Explicit state of one simulated future
pub struct Rollout<'a> {
    my_behavior: &'a dyn Behavior,
    enemy_behavior: &'a dyn Behavior,
    first_move: Direction,
    my_id: String,
    max_turns: u32,
    had_rivals: bool,
    snapshot: Arc<Snapshot>,
    turn: u32,
    obituaries: HashMap<String, u32>,
    foods_eaten: HashMap<String, Vec<u32>>,
    moves: Vec<Direction>,
    termination: Option<Termination>,
}

impl<'a> Rollout<'a> {
    pub fn new(
        initial: Arc<Snapshot>,
        my_behavior: &'a dyn Behavior,
        first_move: Direction,
        enemy_behavior: &'a dyn Behavior,
        max_turns: u32,
    ) -> Self {
        let my_id = initial.mine().map(|me| me.id.clone()).unwrap_or_default();
        let had_rivals = initial.rivals().next().is_some();
        let termination = if initial.is_loss() {
            Some(Termination::Loss)
        } else {
            None
        };

        Rollout {
            my_behavior,
            enemy_behavior,
            first_move,
            my_id,
            max_turns,
            had_rivals,
            snapshot: initial,
            turn: 0,
            obituaries: HashMap::new(),
            foods_eaten: HashMap::new(),
            moves: Vec::new(),
            termination,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.termination.is_some()
    }

    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn snapshot(&self) -> &Arc<Snapshot> {
        &self.snapshot
    }

    /// Simulates one turn. Does nothing once finished.
    pub fn step(&mut self) {
        if self.is_finished() {
            return;
        }
        if self.turn >= self.max_turns {
            self.termination = Some(Termination::MaxTurns);
            return;
        }
        let Some(mine) = self.snapshot.mine_index() else {
            self.termination = Some(Termination::Loss);
            return;
        };

        let moves: Vec<Direction> = (0..self.snapshot.agents().len())
            .map(|index| {
                if index == mine {
                    if self.turn == 0 {
                        self.first_move
                    } else {
                        self.my_behavior.next_move(&self.snapshot)
                    }
                } else {
                    match self.snapshot.perspective(index) {
                        Some(view) => self.enemy_behavior.next_move(&view),
                        None => last_resort(&self.snapshot),
                    }
                }
            })
            .collect();

        let (next, events) = self.snapshot.apply_moves_with_events(&moves);
        self.turn += 1;
        self.moves.push(moves[mine]);

        for id in events.removed {
            self.obituaries.insert(id, self.turn);
        }
        for id in events.ate {
            self.foods_eaten.entry(id).or_default().push(self.turn);
        }
        self.snapshot = Arc::new(next);

        if self.snapshot.is_loss() {
            self.termination = Some(Termination::Loss);
        } else if self.had_rivals && self.snapshot.rivals().next().is_none() {
            self.termination = Some(Termination::Win);
        } else if self.turn >= self.max_turns {
            self.termination = Some(Termination::MaxTurns);
        }
    }

    /// Stops the rollout where it is
    pub fn cut_short(&mut self) {
        if self.termination.is_none() {
            self.termination = Some(Termination::OutOfTime);
        }
    }

    /// Final record; an unfinished rollout is reported as out of time
    pub fn into_outcome(self) -> OutcomeRecord {
        OutcomeRecord {
            group: GroupKey {
                my_behavior: self.my_behavior.key().to_string(),
                first_move: self.first_move,
            },
            enemy_behavior: self.enemy_behavior.key().to_string(),
            my_id: self.my_id,
            turns_simulated: self.turn,
            end_state: self.snapshot,
            obituaries: self.obituaries,
            foods_eaten: self.foods_eaten,
            termination: self.termination.unwrap_or(Termination::OutOfTime),
            moves: self.moves,
        }
    }
}

/// Outcomes of one engine run
#[derive(Debug, Clone)]
pub struct EngineReport {
    pub outcomes: Vec<OutcomeRecord>,
    /// Rounds of lock-step advancement performed
    pub rounds: u32,
}

/// Runs every hypothesis combination against one root snapshot
pub struct RolloutEngine<'a> {
    my_behaviors: &'a [Box<dyn Behavior>],
    enemy_behaviors: &'a [Box<dyn Behavior>],
    max_turns: u32,
}

impl<'a> RolloutEngine<'a> {
    pub fn new(
        my_behaviors: &'a [Box<dyn Behavior>],
        enemy_behaviors: &'a [Box<dyn Behavior>],
        max_turns: u32,
    ) -> Self {
        RolloutEngine {
            my_behaviors,
            enemy_behaviors,
            max_turns,
        }
    }

    /// Candidate first moves: the safe ones, or all four when none is safe
    pub fn first_moves(initial: &Snapshot) -> Vec<Direction> {
        let safe = safe_moves(initial);
        if safe.is_empty() {
            MOVE_PRIORITY.to_vec()
        } else {
            safe
        }
    }

    /// Builds the rollouts in enumeration order: my behaviour, first move,
    /// enemy behaviour
    pub fn rollouts(&self, initial: &Arc<Snapshot>) -> Vec<Rollout<'a>> {
        if initial.is_loss() {
            return Vec::new();
        }
        let first_moves = Self::first_moves(initial);
        let mut rollouts =
            Vec::with_capacity(self.my_behaviors.len() * first_moves.len() * self.enemy_behaviors.len());

        for my_behavior in self.my_behaviors {
            for &first_move in &first_moves {
                for enemy_behavior in self.enemy_behaviors {
                    rollouts.push(Rollout::new(
                        Arc::clone(initial),
                        my_behavior.as_ref(),
                        first_move,
                        enemy_behavior.as_ref(),
                        self.max_turns,
                    ));
                }
            }
        }
        rollouts
    }

    /// Advances all rollouts round by round until they finish or time is up
    pub fn run(&self, initial: Arc<Snapshot>, countdown: &Countdown) -> EngineReport {
        let mut rollouts = self.rollouts(&initial);
        let mut rounds = 0u32;

        loop {
            if rollouts.iter().all(|r| r.is_finished()) {
                break;
            }
            if countdown.is_expired() {
                let unfinished = rollouts.iter().filter(|r| !r.is_finished()).count();
                debug!("Countdown expired after {} rounds, {} rollouts cut short", rounds, unfinished);
                rollouts.iter_mut().for_each(Rollout::cut_short);
                break;
            }
            for rollout in rollouts.iter_mut().filter(|r| !r.is_finished()) {
                rollout.step();
            }
            rounds += 1;
        }

        debug!("{} rollouts finished in {} rounds", rollouts.len(), rounds);
        EngineReport {
            outcomes: rollouts.into_iter().map(Rollout::into_outcome).collect(),
            rounds,
        }
    }
}
