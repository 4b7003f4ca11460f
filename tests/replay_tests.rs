// Replay of a recorded debug log
//
// The fixture holds three logged turns: one the lookahead agrees with, one it
// cannot agree with (the logged move leaves the board) and one whose board
// has no snakes left to replay.

use lookahead_snake::config::Config;
use lookahead_snake::replay::ReplayEngine;
use lookahead_snake::types::Direction;

fn fixture() -> String {
    format!("{}/tests/fixtures/sample_game.jsonl", env!("CARGO_MANIFEST_DIR"))
}

fn engine() -> ReplayEngine {
    let mut config = Config::default_hardcoded();
    config.simulation.max_turns = 8;
    ReplayEngine::new(&config, true).unwrap()
}

#[test]
fn test_fixture_loads_and_skips_blank_lines() {
    let entries = engine().load_log_file(fixture()).unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].snake_id(), Some("me"));
    assert_eq!(entries[1].you_id, None);
    assert_eq!(entries[1].snake_id(), Some("me"));
}

#[test]
fn test_replay_all_compares_moves() {
    let engine = engine();
    let entries = engine.load_log_file(fixture()).unwrap();
    let results = engine.replay_all(&entries);

    // The snakeless turn cannot be replayed and is skipped.
    assert_eq!(results.len(), 2);

    assert_eq!(results[0].turn, 1);
    assert_eq!(results[0].replayed_move, Direction::Right);
    assert!(results[0].matches);

    assert_eq!(results[1].turn, 2);
    assert_eq!(results[1].original_move, Direction::Up);
    assert!(!results[1].matches);
    assert!(matches!(results[1].replayed_move, Direction::Right | Direction::Down));

    let stats = ReplayEngine::generate_stats(&results);
    assert_eq!(stats.total_turns, 2);
    assert_eq!(stats.matches, 1);
    assert_eq!(stats.mismatches, 1);
    assert_eq!(stats.match_rate, 50.0);

    engine.print_report(&results);
}

#[test]
fn test_replay_selected_turns() {
    let engine = engine().with_deadline(true);
    let entries = engine.load_log_file(fixture()).unwrap();

    let results = engine.replay_turns(&entries, &[1]).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].replayed_move, Direction::Right);

    assert!(engine.replay_turns(&entries, &[42]).is_err());
}

#[test]
fn test_logged_moves_validate() {
    let entries = engine().load_log_file(fixture()).unwrap();
    assert!(ReplayEngine::validate_expected_moves(
        &entries,
        &[(1, vec![Direction::Right]), (2, vec![Direction::Up, Direction::Left])]
    )
    .is_ok());
    assert!(ReplayEngine::validate_expected_moves(&entries, &[(3, vec![Direction::Up])]).is_err());
}

#[test]
fn test_missing_log_file_is_an_error() {
    assert!(engine().load_log_file("does/not/exist.jsonl").is_err());
}
