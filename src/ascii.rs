// Text-art boards
//
// Fixtures for tests and the replay tool are easier to read as pictures:
//
//     _ _ _ * _
//     _ > v _ _
//     _ _ 0 _ 1
//
// Tokens are separated by whitespace. `_` is an empty cell, `*` is food and a
// number is the head of the snake with that id. Arrows are body parts pointing
// towards the part nearer the head. The first row is the top of the board.

use std::collections::HashSet;

use crate::types::{Battlesnake, Board, Coord, Game, GameState};

/// Parses text art into a board. Snakes are listed in ascending id order.
pub fn parse_board(rows: &[&str]) -> Result<Board, String> {
    let grid: Vec<Vec<&str>> = rows.iter().map(|row| row.split_whitespace().collect()).collect();

    let height = grid.len();
    if height == 0 {
        return Err("Board has no rows".to_string());
    }
    let width = grid[0].len();
    if width == 0 {
        return Err("Board has no columns".to_string());
    }
    if let Some(row) = grid.iter().position(|r| r.len() != width) {
        return Err(format!(
            "Row {} has {} cells, expected {}",
            row,
            grid[row].len(),
            width
        ));
    }

    let to_coord = |row: usize, col: usize| Coord::new(col as i32, (height - 1 - row) as i32);
    let token = |row: i64, col: i64| {
        if row < 0 || col < 0 {
            None
        } else {
            grid.get(row as usize).and_then(|r| r.get(col as usize)).copied()
        }
    };

    let mut food = Vec::new();
    let mut heads: Vec<(u64, String, usize, usize)> = Vec::new();

    for (row, cells) in grid.iter().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            match *cell {
                "_" | "<" | ">" | "^" | "v" => {}
                "*" => food.push(to_coord(row, col)),
                id if id.chars().all(|c| c.is_ascii_digit()) => {
                    let order = id
                        .parse::<u64>()
                        .map_err(|e| format!("Bad snake id '{}': {}", id, e))?;
                    heads.push((order, id.to_string(), row, col));
                }
                other => {
                    return Err(format!("Unknown token '{}' at row {}, column {}", other, row, col))
                }
            }
        }
    }
    heads.sort_by_key(|(order, ..)| *order);

    let mut claimed: HashSet<(usize, usize)> = HashSet::new();
    let mut snakes = Vec::with_capacity(heads.len());

    for (_, id, head_row, head_col) in heads {
        let mut body = vec![to_coord(head_row, head_col)];
        claimed.insert((head_row, head_col));
        let (mut row, mut col) = (head_row as i64, head_col as i64);

        loop {
            let candidates = [
                (row, col + 1, "<"),
                (row, col - 1, ">"),
                (row + 1, col, "^"),
                (row - 1, col, "v"),
            ];
            let next = candidates.iter().find(|(r, c, arrow)| {
                token(*r, *c) == Some(*arrow) && !claimed.contains(&(*r as usize, *c as usize))
            });

            match next {
                Some(&(r, c, _)) => {
                    claimed.insert((r as usize, c as usize));
                    body.push(to_coord(r as usize, c as usize));
                    row = r;
                    col = c;
                }
                None => break,
            }
        }

        snakes.push(Battlesnake::from_body(&id, 100, body));
    }

    Ok(Board {
        height: height as i32,
        width: width as i32,
        food,
        snakes,
        hazards: Vec::new(),
    })
}

/// Wraps a parsed board in a move request for the snake `you_id`
pub fn parse_game_state(rows: &[&str], you_id: &str) -> Result<GameState, String> {
    let board = parse_board(rows)?;
    let you = board
        .snakes
        .iter()
        .find(|s| s.id == you_id)
        .cloned()
        .ok_or_else(|| format!("Snake '{}' is not on the board", you_id))?;

    Ok(GameState {
        game: Game {
            id: "ascii".to_string(),
            ruleset: Default::default(),
            timeout: 500,
            source: String::new(),
        },
        turn: 0,
        board,
        you,
    })
}
