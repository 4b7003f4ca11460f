// Single-snapshot move heuristics
//
// Every function looks at the board from the point of view of mine. Callers
// wanting another agent's opinion pass that agent's perspective snapshot.

use log::trace;

use crate::pathfinding::{path_length, shortest_path};
use crate::snapshot::Snapshot;
use crate::types::{Coord, Direction};

/// Answer given when nothing better exists
pub const DEFAULT_DIRECTION: Direction = Direction::Down;

/// Order in which immediate moves are tried
pub const MOVE_PRIORITY: [Direction; 4] = [
    Direction::Left,
    Direction::Right,
    Direction::Up,
    Direction::Down,
];

/// Moves from mine's head onto an in-bounds cell that is free right now
pub fn safe_moves(snapshot: &Snapshot) -> Vec<Direction> {
    let Some(me) = snapshot.mine() else {
        return Vec::new();
    };
    let head = me.head();

    MOVE_PRIORITY
        .into_iter()
        .filter(|direction| {
            let next = direction.apply(&head);
            snapshot.in_bounds(&next) && snapshot.turns_until_vacant(&next) == 0
        })
        .collect()
}

/// First safe move, if any
pub fn not_immediately_suicidal(snapshot: &Snapshot) -> Option<Direction> {
    safe_moves(snapshot).into_iter().next()
}

/// Always answers: a safe move, or the default direction
pub fn last_resort(snapshot: &Snapshot) -> Direction {
    not_immediately_suicidal(snapshot).unwrap_or(DEFAULT_DIRECTION)
}

/// First step towards the food with the strictly shortest path
pub fn closest_food(snapshot: &Snapshot) -> Option<Direction> {
    let head = snapshot.mine()?.head();
    best_food_step(snapshot, head, |_, _| true)
}

/// Like `closest_food`, but skips food a rival would win the race to.
///
/// A rival wins when it needs fewer moves, or the same number while being at
/// least as long as mine (a head-on at the food would not go our way).
pub fn race_aware_food(snapshot: &Snapshot) -> Option<Direction> {
    let me = snapshot.mine()?;
    let head = me.head();
    let my_length = me.len();

    best_food_step(snapshot, head, |food, my_steps| {
        for (index, rival) in snapshot.rivals() {
            let Some(view) = snapshot.perspective(index) else {
                continue;
            };
            let Some(rival_steps) = path_length(rival.head(), *food, &view) else {
                continue;
            };
            if rival_steps < my_steps || (rival_steps == my_steps && rival.len() >= my_length) {
                trace!(
                    "Food at ({}, {}) lost to {}: {} vs {} steps",
                    food.x,
                    food.y,
                    rival.id,
                    rival_steps,
                    my_steps
                );
                return false;
            }
        }
        true
    })
}

/// First step of a path from mine's head to mine's tail, else `last_resort`
pub fn chase_tail(snapshot: &Snapshot) -> Direction {
    snapshot
        .mine()
        .and_then(|me| shortest_path(me.head(), me.tail(), snapshot))
        .and_then(|path| path.first().copied())
        .unwrap_or_else(|| last_resort(snapshot))
}

/// Race-aware food, else chase the tail
pub fn food_then_tail(snapshot: &Snapshot) -> Direction {
    race_aware_food(snapshot).unwrap_or_else(|| chase_tail(snapshot))
}

fn best_food_step<F>(snapshot: &Snapshot, head: Coord, mut accept: F) -> Option<Direction>
where
    F: FnMut(&Coord, usize) -> bool,
{
    let mut best: Option<(usize, Direction)> = None;

    for food in snapshot.food() {
        let Some(path) = shortest_path(head, *food, snapshot) else {
            continue;
        };
        let Some(&first) = path.first() else {
            continue;
        };
        if best.map_or(false, |(length, _)| path.len() >= length) {
            continue;
        }
        if accept(food, path.len()) {
            best = Some((path.len(), first));
        }
    }

    best.map(|(_, direction)| direction)
}
