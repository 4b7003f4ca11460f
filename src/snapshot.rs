// Board snapshot
//
// Typed, immutable view of one turn. Built once from the wire payload and then
// re-derived by the simulator for every simulated turn. Besides the raw
// entities it carries the occupancy predictions and a memo table of
// "perspective" snapshots: the same board with another agent playing the role
// of "mine", used to ask a behaviour what that agent would do.

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

use crate::occupancy::OccupancyGrid;
use crate::types::{Board, Coord, Direction, GameState};

/// Reasons a payload cannot be turned into a snapshot
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("board dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },
    #[error("snake '{0}' has an empty body")]
    EmptyBody(String),
    #[error("snake '{id}' has a body part off the board at ({x}, {y})")]
    BodyOutOfBounds { id: String, x: i32, y: i32 },
    #[error("food off the board at ({x}, {y})")]
    FoodOutOfBounds { x: i32, y: i32 },
    #[error("snake id '{0}' appears more than once")]
    DuplicateId(String),
    #[error("designated snake '{0}' is not on the board")]
    MissingMine(String),
}

/// A snake as the decision engine sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    pub id: String,
    pub health: i32,
    /// Head first
    pub body: Vec<Coord>,
}

impl Agent {
    pub fn new(id: &str, health: i32, body: Vec<Coord>) -> Self {
        Agent {
            id: id.to_string(),
            health,
            body,
        }
    }

    pub fn head(&self) -> Coord {
        self.body[0]
    }

    pub fn tail(&self) -> Coord {
        self.body[self.body.len() - 1]
    }

    /// Second body part, when the snake is longer than one
    pub fn neck(&self) -> Option<Coord> {
        self.body.get(1).copied()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Direction the head is travelling in, if it can be told from the neck
    pub fn facing(&self) -> Option<Direction> {
        self.neck().and_then(|neck| neck.direction_to(&self.head()))
    }
}

/// Immutable per-turn game state
#[derive(Debug)]
pub struct Snapshot {
    width: i32,
    height: i32,
    agents: Vec<Agent>,
    food: Vec<Coord>,
    mine: Option<usize>,
    occupancy: OccupancyGrid,
    perspectives: Mutex<HashMap<String, Arc<Snapshot>>>,
}

impl Snapshot {
    /// Validates the entities and computes occupancy from scratch.
    ///
    /// `mine` names the agent playing "my snake"; `None` describes a board on
    /// which that snake is already gone.
    pub fn new(
        width: i32,
        height: i32,
        agents: Vec<Agent>,
        food: Vec<Coord>,
        mine: Option<&str>,
    ) -> Result<Self, SnapshotError> {
        if width <= 0 || height <= 0 {
            return Err(SnapshotError::InvalidDimensions { width, height });
        }

        let in_bounds = |c: &Coord| c.x >= 0 && c.y >= 0 && c.x < width && c.y < height;

        let mut seen = HashSet::new();
        for agent in &agents {
            if !seen.insert(agent.id.as_str()) {
                return Err(SnapshotError::DuplicateId(agent.id.clone()));
            }
            if agent.is_empty() {
                return Err(SnapshotError::EmptyBody(agent.id.clone()));
            }
            if let Some(part) = agent.body.iter().find(|p| !in_bounds(p)) {
                return Err(SnapshotError::BodyOutOfBounds {
                    id: agent.id.clone(),
                    x: part.x,
                    y: part.y,
                });
            }
        }

        if let Some(f) = food.iter().find(|f| !in_bounds(f)) {
            return Err(SnapshotError::FoodOutOfBounds { x: f.x, y: f.y });
        }

        let mine = match mine {
            Some(id) => Some(
                agents
                    .iter()
                    .position(|a| a.id == id)
                    .ok_or_else(|| SnapshotError::MissingMine(id.to_string()))?,
            ),
            None => None,
        };

        let occupancy = OccupancyGrid::build(width, height, &agents);
        Ok(Self::from_parts(width, height, agents, food, mine, occupancy))
    }

    /// Builds a snapshot of `board` as seen by the snake with id `you_id`
    pub fn from_board(board: &Board, you_id: &str) -> Result<Self, SnapshotError> {
        let agents = board
            .snakes
            .iter()
            .filter(|s| s.health > 0)
            .map(|s| Agent::new(&s.id, s.health, s.body.clone()))
            .collect();

        Snapshot::new(
            board.width,
            board.height,
            agents,
            board.food.clone(),
            Some(you_id),
        )
    }

    /// Builds a snapshot from a move request.
    ///
    /// Some servers omit `you` from `board.snakes`; it is added back from the
    /// request so the designated snake is always present.
    pub fn from_request(request: &GameState) -> Result<Self, SnapshotError> {
        if request.board.snakes.iter().any(|s| s.id == request.you.id) {
            return Snapshot::from_board(&request.board, &request.you.id);
        }

        let mut board = request.board.clone();
        board.snakes.insert(0, request.you.clone());
        Snapshot::from_board(&board, &request.you.id)
    }

    /// Assembles a snapshot from already validated parts
    pub(crate) fn from_parts(
        width: i32,
        height: i32,
        agents: Vec<Agent>,
        food: Vec<Coord>,
        mine: Option<usize>,
        occupancy: OccupancyGrid,
    ) -> Self {
        Snapshot {
            width,
            height,
            agents,
            food,
            mine,
            occupancy,
            perspectives: Mutex::new(HashMap::new()),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, index: usize) -> Option<&Agent> {
        self.agents.get(index)
    }

    pub fn agent_by_id(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn food(&self) -> &[Coord] {
        &self.food
    }

    pub fn has_food(&self) -> bool {
        !self.food.is_empty()
    }

    pub fn is_food(&self, coord: &Coord) -> bool {
        self.food.contains(coord)
    }

    pub fn mine_index(&self) -> Option<usize> {
        self.mine
    }

    pub fn mine(&self) -> Option<&Agent> {
        self.mine.and_then(|i| self.agents.get(i))
    }

    /// Every agent other than mine, with its index
    pub fn rivals(&self) -> impl Iterator<Item = (usize, &Agent)> + '_ {
        let mine = self.mine;
        self.agents
            .iter()
            .enumerate()
            .filter(move |(i, _)| Some(*i) != mine)
    }

    pub fn occupancy(&self) -> &OccupancyGrid {
        &self.occupancy
    }

    pub fn in_bounds(&self, coord: &Coord) -> bool {
        coord.x >= 0 && coord.y >= 0 && coord.x < self.width && coord.y < self.height
    }

    pub fn turns_until_vacant(&self, coord: &Coord) -> u32 {
        self.occupancy.turns_until_vacant(coord)
    }

    /// Agent whose body covers `coord` and has not started vacating it
    pub fn occupant(&self, coord: &Coord) -> Option<&Agent> {
        self.occupancy.owner(coord).and_then(|i| self.agents.get(i))
    }

    /// My snake is gone
    pub fn is_loss(&self) -> bool {
        self.mine.is_none()
    }

    /// My snake is the only one left
    pub fn is_win(&self) -> bool {
        self.mine.is_some() && self.agents.len() == 1
    }

    /// The same board with agent `index` playing "mine".
    ///
    /// Built once per agent and memoised on this snapshot, so every behaviour
    /// asking about the same rival during one turn shares the view.
    pub fn perspective(&self, index: usize) -> Option<Arc<Snapshot>> {
        if Some(index) == self.mine {
            return None;
        }
        let agent = self.agents.get(index)?;

        let mut memo = self.perspectives.lock();
        let view = memo.entry(agent.id.clone()).or_insert_with(|| {
            Arc::new(Snapshot::from_parts(
                self.width,
                self.height,
                self.agents.clone(),
                self.food.clone(),
                Some(index),
                self.occupancy.clone(),
            ))
        });
        Some(Arc::clone(view))
    }
}

// The perspective memo is a cache, a copy starts with an empty one.
impl Clone for Snapshot {
    fn clone(&self) -> Self {
        Snapshot::from_parts(
            self.width,
            self.height,
            self.agents.clone(),
            self.food.clone(),
            self.mine,
            self.occupancy.clone(),
        )
    }
}
