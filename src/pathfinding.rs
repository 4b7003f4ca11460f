// Temporally-aware A*
//
// A cell covered by a body is not a wall forever: it becomes enterable once the
// body has moved past it. A neighbour reached after `k` moves is only expanded
// when its vacate turn is below `k`.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::snapshot::Snapshot;
use crate::types::{Coord, Direction};

/// Extra cost of a first step next to the head of a rival at least as long as mine
pub const HEAD_COLLISION_PENALTY: u32 = 1000;

/// Expansion order of neighbours
const EXPANSION_ORDER: [Direction; 4] = [
    Direction::Left,
    Direction::Right,
    Direction::Up,
    Direction::Down,
];

/// Open-set entry. Lowest f first, then earliest insertion.
#[derive(Debug, PartialEq, Eq)]
struct OpenNode {
    f_score: u32,
    sequence: u64,
    coord: Coord,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_score
            .cmp(&self.f_score)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest sequence of moves from `start` to `goal` on `snapshot`.
///
/// Returns `Some(vec![])` when `start == goal` and `None` when the goal cannot
/// be reached. When `start` is the head of mine, the first step may not reverse
/// into the neck and first steps next to the head of an equal or longer rival
/// are penalised with `HEAD_COLLISION_PENALTY`.
pub fn shortest_path(start: Coord, goal: Coord, snapshot: &Snapshot) -> Option<Vec<Direction>> {
    if !snapshot.in_bounds(&start) || !snapshot.in_bounds(&goal) {
        return None;
    }
    if start == goal {
        return Some(Vec::new());
    }

    let mine = snapshot.mine().filter(|agent| agent.head() == start);
    let forbidden_first_step = mine.filter(|agent| agent.len() > 1).and_then(|agent| agent.neck());
    let dangerous_heads: Vec<Coord> = match mine {
        Some(me) => snapshot
            .rivals()
            .filter(|(_, rival)| rival.len() >= me.len())
            .map(|(_, rival)| rival.head())
            .collect(),
        None => Vec::new(),
    };

    let mut open = BinaryHeap::new();
    let mut closed: HashSet<Coord> = HashSet::new();
    let mut cost: HashMap<Coord, u32> = HashMap::new();
    let mut moves: HashMap<Coord, u32> = HashMap::new();
    let mut came_from: HashMap<Coord, (Coord, Direction)> = HashMap::new();
    let mut sequence = 0u64;

    cost.insert(start, 0);
    moves.insert(start, 0);
    open.push(OpenNode {
        f_score: start.manhattan(&goal),
        sequence,
        coord: start,
    });

    while let Some(OpenNode { coord: current, .. }) = open.pop() {
        if current == goal {
            return Some(reconstruct(&came_from, start, goal));
        }
        if !closed.insert(current) {
            continue;
        }

        let current_cost = cost.get(&current).copied().unwrap_or(0);
        let arrival = moves.get(&current).copied().unwrap_or(0) + 1;
        let first_step = current == start;

        for direction in EXPANSION_ORDER {
            let next = direction.apply(&current);
            if !snapshot.in_bounds(&next) || closed.contains(&next) {
                continue;
            }
            if snapshot.turns_until_vacant(&next) >= arrival {
                continue;
            }
            if first_step && forbidden_first_step == Some(next) {
                continue;
            }

            let penalty = if first_step && dangerous_heads.iter().any(|h| h.is_adjacent(&next)) {
                HEAD_COLLISION_PENALTY
            } else {
                0
            };
            let tentative = current_cost + 1 + penalty;
            if cost.get(&next).map_or(true, |&known| tentative < known) {
                cost.insert(next, tentative);
                moves.insert(next, arrival);
                came_from.insert(next, (current, direction));
                sequence += 1;
                open.push(OpenNode {
                    f_score: tentative + next.manhattan(&goal),
                    sequence,
                    coord: next,
                });
            }
        }
    }

    None
}

/// Number of moves on the shortest path, if any
pub fn path_length(start: Coord, goal: Coord, snapshot: &Snapshot) -> Option<usize> {
    shortest_path(start, goal, snapshot).map(|path| path.len())
}

fn reconstruct(
    came_from: &HashMap<Coord, (Coord, Direction)>,
    start: Coord,
    goal: Coord,
) -> Vec<Direction> {
    let mut path = Vec::new();
    let mut cursor = goal;
    while cursor != start {
        match came_from.get(&cursor) {
            Some(&(previous, direction)) => {
                path.push(direction);
                cursor = previous;
            }
            None => break,
        }
    }
    path.reverse();
    path
}
