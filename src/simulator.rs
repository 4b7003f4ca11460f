// Forward simulation of one game turn
//
// Rules, applied to every agent at once:
// 1. The head moves. Leaving the board or entering a cell that is still covered
//    (vacate turn > 0 before the move) removes the agent.
// 2. Moving onto food grows the agent: the food disappears and the new last
//    part is duplicated, so the old tail cell is freed and the length grows by
//    one. Otherwise the tail is dropped.
// 3. Agents whose heads meet: the shorter is removed, equal lengths remove both.

use log::trace;
use std::collections::{HashMap, HashSet};

use crate::occupancy::OccupancyGrid;
use crate::snapshot::{Agent, Snapshot};
use crate::types::{Coord, Direction};

/// What happened to agents during one simulated turn
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnEvents {
    /// Ids of agents removed this turn
    pub removed: Vec<String>,
    /// Ids of surviving agents that ate this turn
    pub ate: Vec<String>,
}

impl Snapshot {
    /// The snapshot after every agent makes its move.
    ///
    /// `moves[i]` is the move of agent `i`. Agents without an entry keep going
    /// the way they face, or up when that cannot be told.
    pub fn apply_moves(&self, moves: &[Direction]) -> Snapshot {
        self.apply_moves_with_events(moves).0
    }

    /// Like `apply_moves`, also reporting removals and food events
    pub fn apply_moves_with_events(&self, moves: &[Direction]) -> (Snapshot, TurnEvents) {
        let agent_count = self.agents().len();
        let mut removed = vec![false; agent_count];
        let mut grew = vec![false; agent_count];
        let mut moved: Vec<Agent> = Vec::with_capacity(agent_count);
        let mut eaten: HashSet<Coord> = HashSet::new();

        for (index, agent) in self.agents().iter().enumerate() {
            let direction = moves
                .get(index)
                .copied()
                .unwrap_or_else(|| agent.facing().unwrap_or(Direction::Up));
            let destination = direction.apply(&agent.head());
            let mut next = agent.clone();

            if !self.in_bounds(&destination) || self.turns_until_vacant(&destination) > 0 {
                trace!("{} crashes moving {} into ({}, {})", agent.id, direction, destination.x, destination.y);
                removed[index] = true;
                moved.push(next);
                continue;
            }

            next.body.insert(0, destination);
            next.body.pop();
            if self.is_food(&destination) {
                eaten.insert(destination);
                grew[index] = true;
                let tail = next.tail();
                next.body.push(tail);
            }
            moved.push(next);
        }

        let mut meetings: HashMap<Coord, Vec<usize>> = HashMap::new();
        for (index, agent) in moved.iter().enumerate() {
            if !removed[index] {
                meetings.entry(agent.head()).or_default().push(index);
            }
        }
        for group in meetings.values().filter(|group| group.len() > 1) {
            let longest = group.iter().map(|&i| moved[i].len()).max().unwrap_or(0);
            let winners = group.iter().filter(|&&i| moved[i].len() == longest).count();
            for &i in group {
                if moved[i].len() < longest || winners > 1 {
                    trace!("{} loses a head-on at ({}, {})", moved[i].id, moved[i].head().x, moved[i].head().y);
                    removed[i] = true;
                }
            }
        }

        let mut events = TurnEvents::default();
        let mut survivors = Vec::with_capacity(agent_count);
        let mut survivor_grew = Vec::with_capacity(agent_count);
        let mut mine = None;

        for (index, agent) in moved.into_iter().enumerate() {
            if removed[index] {
                events.removed.push(agent.id);
                continue;
            }
            if grew[index] {
                events.ate.push(agent.id.clone());
            }
            if Some(index) == self.mine_index() {
                mine = Some(survivors.len());
            }
            survivor_grew.push(grew[index]);
            survivors.push(agent);
        }

        let food: Vec<Coord> = self
            .food()
            .iter()
            .filter(|f| !eaten.contains(*f))
            .copied()
            .collect();

        let occupancy = if events.removed.is_empty() {
            let mut grid = self.occupancy().clone();
            grid.advance(&survivors, &survivor_grew);
            grid
        } else {
            OccupancyGrid::build(self.width(), self.height(), &survivors)
        };
        trace!("Vacate turns after the move:\n{}", occupancy.render());

        let next = Snapshot::from_parts(self.width(), self.height(), survivors, food, mine, occupancy);
        (next, events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ascii::parse_board;

    fn snapshot(rows: &[&str]) -> Snapshot {
        let board = parse_board(rows).unwrap();
        Snapshot::from_board(&board, "0").unwrap()
    }

    fn ids(snapshot: &Snapshot) -> Vec<&str> {
        snapshot.agents().iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_plain_move_drops_tail() {
        let snap = snapshot(&[
            "_ _ _ _",
            "_ > 0 _",
            "_ _ _ _",
        ]);
        let (next, events) = snap.apply_moves_with_events(&[Direction::Right]);
        assert_eq!(events, TurnEvents::default());
        assert_eq!(next.mine().unwrap().body, vec![Coord::new(3, 1), Coord::new(2, 1)]);
        assert_eq!(next.turns_until_vacant(&Coord::new(1, 1)), 0);
    }

    #[test]
    fn test_eating_grows_and_removes_food() {
        let snap = snapshot(&[
            "_ _ _ _",
            "> > 0 *",
            "_ _ _ _",
        ]);
        let (next, events) = snap.apply_moves_with_events(&[Direction::Right]);
        assert_eq!(events.ate, vec!["0".to_string()]);
        assert!(next.food().is_empty());

        let me = next.mine().unwrap();
        assert_eq!(
            me.body,
            vec![Coord::new(3, 1), Coord::new(2, 1), Coord::new(1, 1), Coord::new(1, 1)]
        );
        // The old tail cell is free, the stacked tail stays for one more turn.
        assert_eq!(next.turns_until_vacant(&Coord::new(0, 1)), 0);
        assert_eq!(next.turns_until_vacant(&Coord::new(1, 1)), 1);
    }

    #[test]
    fn test_wall_and_body_collisions_remove_agent() {
        let snap = snapshot(&[
            "0 _ _",
            "^ _ _",
            "^ _ 1",
        ]);
        let (next, events) = snap.apply_moves_with_events(&[Direction::Up, Direction::Right]);
        assert_eq!(events.removed, vec!["0".to_string(), "1".to_string()]);
        assert!(next.is_loss());
        assert!(next.agents().is_empty());
    }

    #[test]
    fn test_moving_into_a_tail_that_leaves_is_safe() {
        let snap = snapshot(&[
            "v < _",
            "0 ^ _",
            "_ _ _",
        ]);
        let me = snap.mine().unwrap();
        assert_eq!(me.len(), 4);
        assert_eq!(me.tail(), Coord::new(1, 1));

        let next = snap.apply_moves(&[Direction::Right]);
        assert!(!next.is_loss());
        assert_eq!(next.mine().unwrap().head(), Coord::new(1, 1));
    }

    #[test]
    fn test_head_on_shorter_loses() {
        let snap = snapshot(&[
            "> > 0 _ 1 < _",
        ]);
        let (next, events) = snap.apply_moves_with_events(&[Direction::Right, Direction::Left]);
        assert_eq!(events.removed, vec!["1".to_string()]);
        assert_eq!(ids(&next), vec!["0"]);
        assert!(next.is_win());
    }

    #[test]
    fn test_head_on_equal_length_removes_both() {
        let snap = snapshot(&[
            "> 0 _ 1 <",
        ]);
        let (next, events) = snap.apply_moves_with_events(&[Direction::Right, Direction::Left]);
        assert_eq!(events.removed.len(), 2);
        assert!(next.is_loss());
    }

    #[test]
    fn test_mine_is_reindexed_after_removal() {
        let board = parse_board(&[
            "0 _ _",
            "_ _ _",
            "_ _ 1",
        ])
        .unwrap();
        let snap = Snapshot::from_board(&board, "1").unwrap();
        assert_eq!(snap.mine_index(), Some(1));

        let next = snap.apply_moves(&[Direction::Up, Direction::Left]);
        assert_eq!(ids(&next), vec!["1"]);
        assert_eq!(next.mine_index(), Some(0));
        assert_eq!(next.mine().unwrap().head(), Coord::new(1, 0));
    }

    #[test]
    fn test_missing_move_keeps_facing() {
        let snap = snapshot(&[
            "_ _ _",
            "> 0 _",
            "_ _ _",
        ]);
        let next = snap.apply_moves(&[]);
        assert_eq!(next.mine().unwrap().head(), Coord::new(2, 1));
    }

    #[test]
    fn test_three_way_meeting_keeps_only_the_longest() {
        let snap = snapshot(&[
            "_ _ v _ _",
            "_ _ 2 _ _",
            "> 0 _ 1 <",
            "_ _ _ _ ^",
        ]);
        // 2 is length 2, 0 length 2, 1 length 3.
        let (next, events) = snap.apply_moves_with_events(&[
            Direction::Right,
            Direction::Left,
            Direction::Down,
        ]);
        assert_eq!(ids(&next), vec!["1"]);
        assert_eq!(events.removed.len(), 2);
    }

    #[test]
    fn test_original_snapshot_is_untouched() {
        let snap = snapshot(&["> 0 _ *"]);
        let before = snap.mine().unwrap().clone();
        let _ = snap.apply_moves(&[Direction::Right]);
        assert_eq!(snap.mine().unwrap(), &before);
        assert_eq!(snap.food(), &[Coord::new(3, 0)]);
    }
}
