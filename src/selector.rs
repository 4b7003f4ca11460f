// Maximin move selection over rollout outcomes

use crate::rollout::{GroupKey, OutcomeRecord};
use crate::types::Direction;

/// Weights turning an outcome into a score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreWeights {
    pub survival_turn_weight: u64,
    pub food_eaten_weight: u64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        ScoreWeights {
            survival_turn_weight: 100,
            food_eaten_weight: 200,
        }
    }
}

/// Turns mine survived times the turn weight, plus foods eaten times the food weight
pub fn score(outcome: &OutcomeRecord, weights: &ScoreWeights) -> u64 {
    let survived = outcome
        .obituaries
        .get(&outcome.my_id)
        .copied()
        .unwrap_or(outcome.turns_simulated);
    let foods = outcome
        .foods_eaten
        .get(&outcome.my_id)
        .map_or(0, |turns| turns.len());

    survived as u64 * weights.survival_turn_weight + foods as u64 * weights.food_eaten_weight
}

/// Worst score of each (my behaviour, first move) group, in first-seen order
pub fn group_worst_scores(outcomes: &[OutcomeRecord], weights: &ScoreWeights) -> Vec<(GroupKey, u64)> {
    let mut groups: Vec<(GroupKey, u64)> = Vec::new();

    for outcome in outcomes {
        let value = score(outcome, weights);
        match groups.iter_mut().find(|(key, _)| *key == outcome.group) {
            Some((_, worst)) => *worst = (*worst).min(value),
            None => groups.push((outcome.group.clone(), value)),
        }
    }

    groups
}

/// Group whose worst case is best; the earliest group wins ties
pub fn best_group(outcomes: &[OutcomeRecord], weights: &ScoreWeights) -> Option<(GroupKey, u64)> {
    let mut best: Option<(GroupKey, u64)> = None;
    for (key, worst) in group_worst_scores(outcomes, weights) {
        if best.as_ref().map_or(true, |(_, best_worst)| worst > *best_worst) {
            best = Some((key, worst));
        }
    }
    best
}

/// First move of the group with the best worst case
pub fn best_move(outcomes: &[OutcomeRecord], weights: &ScoreWeights) -> Option<Direction> {
    best_group(outcomes, weights).map(|(key, _)| key.first_move)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rollout::Termination;
    use crate::snapshot::Snapshot;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn outcome(behavior: &str, first_move: Direction, enemy: &str, turns: u32, died: Option<u32>, foods: usize) -> OutcomeRecord {
        let mut obituaries = HashMap::new();
        if let Some(turn) = died {
            obituaries.insert("me".to_string(), turn);
        }
        let mut foods_eaten = HashMap::new();
        if foods > 0 {
            foods_eaten.insert("me".to_string(), (1..=foods as u32).collect());
        }

        OutcomeRecord {
            group: GroupKey {
                my_behavior: behavior.to_string(),
                first_move,
            },
            enemy_behavior: enemy.to_string(),
            my_id: "me".to_string(),
            turns_simulated: turns,
            end_state: Arc::new(Snapshot::new(1, 1, vec![], vec![], None).unwrap()),
            obituaries,
            foods_eaten,
            termination: if died.is_some() {
                Termination::Loss
            } else {
                Termination::MaxTurns
            },
            moves: vec![first_move],
        }
    }

    #[test]
    fn test_score_uses_death_turn_and_food() {
        let weights = ScoreWeights::default();
        assert_eq!(score(&outcome("a", Direction::Up, "x", 10, None, 0), &weights), 1000);
        assert_eq!(score(&outcome("a", Direction::Up, "x", 10, Some(4), 0), &weights), 400);
        assert_eq!(score(&outcome("a", Direction::Up, "x", 10, None, 2), &weights), 1400);
    }

    #[test]
    fn test_groups_keep_worst_in_first_seen_order() {
        let weights = ScoreWeights::default();
        let outcomes = vec![
            outcome("a", Direction::Left, "x", 10, None, 0),
            outcome("a", Direction::Left, "y", 10, Some(3), 0),
            outcome("a", Direction::Right, "x", 10, None, 1),
            outcome("a", Direction::Right, "y", 10, None, 0),
        ];
        let groups = group_worst_scores(&outcomes, &weights);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0.first_move, Direction::Left);
        assert_eq!(groups[0].1, 300);
        assert_eq!(groups[1].0.first_move, Direction::Right);
        assert_eq!(groups[1].1, 1000);
    }

    #[test]
    fn test_maximin_prefers_the_safest_worst_case() {
        let weights = ScoreWeights::default();
        // Left has the best single outcome but can die early; Down is steady.
        let outcomes = vec![
            outcome("a", Direction::Left, "x", 10, None, 5),
            outcome("a", Direction::Left, "y", 10, Some(2), 0),
            outcome("a", Direction::Down, "x", 10, None, 0),
            outcome("a", Direction::Down, "y", 10, None, 0),
        ];
        assert_eq!(best_move(&outcomes, &weights), Some(Direction::Down));
    }

    #[test]
    fn test_ties_go_to_the_first_group() {
        let weights = ScoreWeights::default();
        let outcomes = vec![
            outcome("a", Direction::Right, "x", 10, None, 0),
            outcome("a", Direction::Up, "x", 10, None, 0),
        ];
        assert_eq!(best_move(&outcomes, &weights), Some(Direction::Right));
        assert_eq!(best_move(&outcomes, &weights), best_move(&outcomes, &weights));
    }

    #[test]
    fn test_no_outcomes_no_move() {
        assert_eq!(best_move(&[], &ScoreWeights::default()), None);
    }
}
