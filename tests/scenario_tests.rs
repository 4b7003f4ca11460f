// End-to-end rollouts on small hand-drawn boards
//
// Each scenario plays a full rollout and checks the whole trajectory: the
// moves made, what was eaten and how the rollout ended.

use std::sync::Arc;

use lookahead_snake::ascii::parse_board;
use lookahead_snake::behavior::{Behavior, Cautious, TailChaser};
use lookahead_snake::lookahead::{Lookahead, LookaheadSettings};
use lookahead_snake::rollout::{Countdown, Rollout, Termination};
use lookahead_snake::selector::ScoreWeights;
use lookahead_snake::snapshot::Snapshot;
use lookahead_snake::types::{Coord, Direction};

fn snapshot(rows: &[&str]) -> Arc<Snapshot> {
    let board = parse_board(rows).unwrap();
    Arc::new(Snapshot::from_board(&board, "0").unwrap())
}

fn play_out(rollout: &mut Rollout<'_>) {
    while !rollout.is_finished() {
        rollout.step();
    }
}

/// Lone snake of length three on an empty 8x8 board
fn tail_chase_board() -> Arc<Snapshot> {
    snapshot(&[
        "_ _ _ _ _ _ _ _",
        "_ _ _ _ _ _ _ _",
        "_ _ _ _ _ _ _ _",
        "_ _ _ > v _ _ _",
        "_ _ _ _ 0 _ _ _",
        "_ _ _ _ _ _ _ _",
        "_ _ _ _ _ _ _ _",
        "_ _ _ _ _ _ _ _",
    ])
}

#[test]
fn test_lone_tail_chaser_cycles_until_max_turns() {
    let snap = tail_chase_board();
    assert_eq!(TailChaser.next_move(&snap), Direction::Left);

    let mut rollout = Rollout::new(Arc::clone(&snap), &TailChaser, Direction::Left, &TailChaser, 100);
    play_out(&mut rollout);
    let outcome = rollout.into_outcome();

    assert_eq!(outcome.termination, Termination::MaxTurns);
    assert_eq!(outcome.turns_simulated, 100);
    assert!(outcome.obituaries.is_empty());
    assert!(outcome.foods_eaten.is_empty());

    let cycle = [Direction::Left, Direction::Up, Direction::Right, Direction::Down];
    assert_eq!(outcome.moves.len(), 100);
    for (turn, direction) in outcome.moves.iter().enumerate() {
        assert_eq!(*direction, cycle[turn % 4], "turn {}", turn + 1);
    }

    // Back where it started after a whole number of laps
    let me = outcome.end_state.mine().unwrap();
    assert_eq!(me.body, snap.mine().unwrap().body);
}

#[test]
fn test_lone_tail_chaser_survives_the_whole_lookahead() {
    let lookahead = Lookahead::new(
        vec![Box::new(TailChaser)],
        vec![Box::new(TailChaser)],
        LookaheadSettings {
            max_millis: 1000,
            max_turns: 100,
            weights: ScoreWeights::default(),
        },
    );
    let decision = lookahead.decide(tail_chase_board(), Countdown::unbounded());
    assert_eq!(decision.score, Some(100 * 100));
    assert_eq!(decision.rollouts, 3);
}

#[test]
fn test_food_is_eaten_then_tail_is_chased() {
    let snap = snapshot(&[
        "_ _ _ _ _ *",
        "_ _ _ _ _ _",
        "_ _ _ _ _ _",
        "_ _ > > 0 _",
        "_ _ _ _ _ _",
        "_ _ _ _ _ _",
    ]);

    let mut rollout = Rollout::new(Arc::clone(&snap), &Cautious, Direction::Right, &Cautious, 100);
    play_out(&mut rollout);
    let outcome = rollout.into_outcome();

    assert_eq!(outcome.termination, Termination::MaxTurns);
    assert!(outcome.obituaries.is_empty());
    assert_eq!(outcome.foods_eaten.get("0"), Some(&vec![4]));
    assert!(!outcome.end_state.has_food());
    assert_eq!(outcome.end_state.mine().unwrap().len(), 4);

    assert_eq!(
        &outcome.moves[..4],
        &[Direction::Right, Direction::Up, Direction::Up, Direction::Up]
    );
    let cycle = [Direction::Left, Direction::Down, Direction::Right, Direction::Up];
    for (offset, direction) in outcome.moves[4..].iter().enumerate() {
        assert_eq!(*direction, cycle[offset % 4], "turn {}", offset + 5);
    }
}

#[test]
fn test_equal_rivals_leave_contested_food_alone() {
    // Both heads are two moves from the food and both snakes are length 3.
    let snap = snapshot(&[
        "_ _ _ _ _ _ _",
        "_ _ _ _ _ _ _",
        "> v _ _ _ v <",
        "_ 0 _ * _ 1 _",
        "_ _ _ _ _ _ _",
        "_ _ _ _ _ _ _",
        "_ _ _ _ _ _ _",
    ]);
    let rival_view = snap.perspective(1).unwrap();

    assert_eq!(Cautious.next_move(&snap), Direction::Left);
    assert_eq!(Cautious.next_move(&rival_view), Direction::Right);

    let mut rollout = Rollout::new(Arc::clone(&snap), &Cautious, Direction::Left, &Cautious, 60);
    play_out(&mut rollout);
    let outcome = rollout.into_outcome();

    assert_eq!(outcome.termination, Termination::MaxTurns);
    assert!(outcome.obituaries.is_empty());
    assert!(outcome.foods_eaten.is_empty());
    assert!(outcome.end_state.is_food(&Coord::new(3, 3)));
    assert_eq!(outcome.end_state.agents().len(), 2);
}
