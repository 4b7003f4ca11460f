// Occupancy prediction
//
// For every cell we track how many turns must pass before the body covering it
// is guaranteed to have moved on. A part at index i of a snake of length L
// vacates after L - 1 - i turns: the tail is already leaving, the head stays
// longest.

use std::fmt::Write;

use crate::snapshot::Agent;
use crate::types::Coord;

/// Returned for cells that can never be entered (off the board)
pub const NEVER_VACANT: u32 = u32::MAX;

/// Predicted state of one grid cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OccupancyCell {
    /// Agent index whose body still covers the cell, if any
    pub owner: Option<usize>,
    /// Turns until no body covers the cell
    pub vacate_turn: u32,
}

impl OccupancyCell {
    fn cover(&mut self, owner: usize, vacate_turn: u32) {
        if vacate_turn > self.vacate_turn {
            self.vacate_turn = vacate_turn;
            self.owner = Some(owner);
        }
    }
}

/// Row-major grid of vacate predictions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyGrid {
    width: i32,
    height: i32,
    cells: Vec<OccupancyCell>,
}

impl OccupancyGrid {
    /// Computes predictions from scratch for the given bodies
    pub fn build(width: i32, height: i32, agents: &[Agent]) -> Self {
        let cell_count = (width.max(0) as usize) * (height.max(0) as usize);
        let mut grid = OccupancyGrid {
            width,
            height,
            cells: vec![OccupancyCell::default(); cell_count],
        };

        for (owner, agent) in agents.iter().enumerate() {
            let length = agent.len() as u32;
            for (i, part) in agent.body.iter().enumerate() {
                if let Some(index) = grid.index(part) {
                    grid.cells[index].cover(owner, length - 1 - i as u32);
                }
            }
        }

        grid
    }

    /// Turns until `coord` is free; `NEVER_VACANT` off the board, 0 when empty
    pub fn turns_until_vacant(&self, coord: &Coord) -> u32 {
        match self.index(coord) {
            Some(index) => self.cells[index].vacate_turn,
            None => NEVER_VACANT,
        }
    }

    /// Agent index still covering `coord`
    pub fn owner(&self, coord: &Coord) -> Option<usize> {
        self.index(coord).and_then(|index| self.cells[index].owner)
    }

    pub fn cell(&self, coord: &Coord) -> Option<OccupancyCell> {
        self.index(coord).map(|index| self.cells[index])
    }

    /// Incrementally advances the grid by one turn in which nobody died.
    ///
    /// `agents` are the bodies after the move, indexed as before it. Cells of an
    /// agent that grew keep their counter: its tail stays where it was, so each
    /// remaining part still needs the same number of turns to clear. Every other
    /// covered cell counts down by one, then each new head is stamped with
    /// `length - 1`.
    ///
    /// Must not be used after a removal; indices and vacate chains change, so
    /// the grid has to be rebuilt.
    pub fn advance(&mut self, agents: &[Agent], grew: &[bool]) {
        for cell in self.cells.iter_mut() {
            let Some(owner) = cell.owner else {
                continue;
            };
            if grew.get(owner).copied().unwrap_or(false) {
                continue;
            }
            cell.vacate_turn = cell.vacate_turn.saturating_sub(1);
            if cell.vacate_turn == 0 {
                cell.owner = None;
            }
        }

        for (owner, agent) in agents.iter().enumerate() {
            let vacate_turn = agent.len() as u32 - 1;
            if let Some(index) = self.index(&agent.head()) {
                self.cells[index] = if vacate_turn > 0 {
                    OccupancyCell {
                        owner: Some(owner),
                        vacate_turn,
                    }
                } else {
                    OccupancyCell::default()
                };
            }
        }
    }

    /// Text rendering of the vacate counters, top row first
    pub fn render(&self) -> String {
        let mut out = String::new();
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                let vacate = self.turns_until_vacant(&Coord::new(x, y));
                if x > 0 {
                    out.push(' ');
                }
                let _ = write!(out, "{}", vacate);
            }
            out.push('\n');
        }
        out
    }

    fn index(&self, coord: &Coord) -> Option<usize> {
        if coord.x < 0 || coord.y < 0 || coord.x >= self.width || coord.y >= self.height {
            return None;
        }
        Some((coord.y * self.width + coord.x) as usize)
    }
}
