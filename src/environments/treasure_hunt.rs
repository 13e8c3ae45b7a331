//! Treasure hunt grid world
//!
//! A hunter walks a grid of empty, blocked, trap and treasure tiles. Traps
//! cost health, reaching the treasure pays out; both can send the hunter
//! back to the start, so the environment restarts its own episodes and never
//! reports a terminal state.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    error::{Error, Result},
    ports::Environment,
    types::StateId,
};

const NAME: &str = "treasure-hunt";

/// Largest supported width or height, bounded by the 5-bit coordinates of
/// the state id.
pub const MAX_SIDE: usize = 32;

/// Health at the start of every walk
pub const MAX_HEALTH: u8 = 3;

/// Built-in levels
pub mod levels {
    use crate::error::{Error, Result};

    /// A corridor with a single trap between start and treasure.
    pub const LEVEL_0: &[&str] = &[
        "        ",
        " XXXXXX ",
        "S  T   G",
        " XXXXXX ",
        "        ",
    ];

    /// An open field scattered with traps.
    pub const LEVEL_1: &[&str] = &[
        "   T    ",
        "   T T  ",
        "S    T  ",
        " TT  T T",
        " T   T  ",
        " T   TTG",
    ];

    /// Walls and traps mixed.
    pub const LEVEL_2: &[&str] = &[
        "   T    ",
        " X X XX ",
        "ST T TT ",
        " X T XX ",
        " T X XX ",
        " T   TTG",
    ];

    pub const ALL: [&[&str]; 3] = [LEVEL_0, LEVEL_1, LEVEL_2];

    /// Look up a built-in level by number.
    pub fn builtin(index: usize) -> Result<&'static [&'static str]> {
        ALL.get(index).copied().ok_or_else(|| Error::InvalidLevel {
            reason: format!("no built-in level {index}, expected 0..{}", ALL.len()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Order in which legal moves are listed
    pub const ORDER: [Direction; 4] = [
        Direction::Down,
        Direction::Up,
        Direction::Right,
        Direction::Left,
    ];

    fn offset(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    Empty,
    Blocked,
    Trap,
    Treasure,
}

impl Tile {
    fn from_char(c: char) -> Tile {
        match c {
            'X' => Tile::Blocked,
            'T' => Tile::Trap,
            'G' => Tile::Treasure,
            _ => Tile::Empty,
        }
    }

    fn to_char(self) -> char {
        match self {
            Tile::Empty => ' ',
            Tile::Blocked => 'X',
            Tile::Trap => 'T',
            Tile::Treasure => 'G',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreasureRewards {
    /// Paid for reaching the treasure
    pub treasure: f64,
    /// Paid for stepping on a trap, indexed by the health left afterwards
    pub penalties: [f64; MAX_HEALTH as usize],
}

impl Default for TreasureRewards {
    fn default() -> Self {
        Self {
            treasure: 1.0,
            penalties: [-1.0; MAX_HEALTH as usize],
        }
    }
}

/// Treasure hunt environment
///
/// The state id packs `x & 0x1F | (y & 0x1F) << 5 | (health & 0x3) << 10`.
#[derive(Debug, Clone, PartialEq)]
pub struct TreasureHunt {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
    start: (usize, usize),
    position: (usize, usize),
    health: u8,
    rewards: TreasureRewards,
    treasures_found: u64,
    lives_lost: u64,
}

impl TreasureHunt {
    /// Parse a level from rows of `' '`, `X`, `T`, `G` and a single `S`.
    ///
    /// Unknown characters read as empty tiles.
    pub fn new(level: &[&str]) -> Result<Self> {
        let height = level.len();
        let width = level.first().map(|row| row.chars().count()).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(Error::InvalidLevel {
                reason: "level is empty".to_string(),
            });
        }
        if height > MAX_SIDE || width > MAX_SIDE {
            return Err(Error::InvalidLevel {
                reason: format!("{width}x{height} exceeds {MAX_SIDE}x{MAX_SIDE}"),
            });
        }

        let mut tiles = Vec::with_capacity(width * height);
        let mut start = None;
        for (y, row) in level.iter().enumerate() {
            let chars: Vec<char> = row.chars().collect();
            if chars.len() != width {
                return Err(Error::InvalidLevel {
                    reason: format!("row {y} has {} tiles, expected {width}", chars.len()),
                });
            }
            for (x, c) in chars.into_iter().enumerate() {
                if c == 'S' {
                    if start.is_some() {
                        return Err(Error::InvalidLevel {
                            reason: format!("second start tile at {x},{y}"),
                        });
                    }
                    start = Some((x, y));
                }
                tiles.push(Tile::from_char(c));
            }
        }

        let start = start.ok_or_else(|| Error::InvalidLevel {
            reason: "level has no start tile".to_string(),
        })?;

        Ok(Self {
            width,
            height,
            tiles,
            start,
            position: start,
            health: MAX_HEALTH,
            rewards: TreasureRewards::default(),
            treasures_found: 0,
            lives_lost: 0,
        })
    }

    /// One of the built-in levels.
    pub fn builtin(index: usize) -> Result<Self> {
        Self::new(levels::builtin(index)?)
    }

    pub fn with_rewards(mut self, rewards: TreasureRewards) -> Self {
        self.rewards = rewards;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Hunter position as (x, y)
    pub fn position(&self) -> (usize, usize) {
        self.position
    }

    pub fn health(&self) -> u8 {
        self.health
    }

    /// Times the treasure was reached since construction
    pub fn treasures_found(&self) -> u64 {
        self.treasures_found
    }

    /// Times the hunter ran out of health since construction
    pub fn lives_lost(&self) -> u64 {
        self.lives_lost
    }

    /// Tile at (x, y); anything outside the grid reads as blocked.
    pub fn tile(&self, x: isize, y: isize) -> Tile {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            Tile::Blocked
        } else {
            self.tiles[y as usize * self.width + x as usize]
        }
    }

    fn neighbour(&self, direction: Direction) -> (isize, isize) {
        let (dx, dy) = direction.offset();
        (self.position.0 as isize + dx, self.position.1 as isize + dy)
    }

    fn restart(&mut self) {
        self.position = self.start;
        self.health = MAX_HEALTH;
    }
}

impl Environment for TreasureHunt {
    type Action = Direction;

    fn state_id(&self) -> Result<StateId> {
        let (x, y) = self.position;
        let id = (x as u64 & 0x1F) | (y as u64 & 0x1F) << 5 | (self.health as u64 & 0x3) << 10;
        Ok(StateId::new(id))
    }

    fn legal_actions(&self) -> Vec<Direction> {
        Direction::ORDER
            .into_iter()
            .filter(|&direction| {
                let (x, y) = self.neighbour(direction);
                self.tile(x, y) != Tile::Blocked
            })
            .collect()
    }

    fn execute(&mut self, action: &Direction) -> Result<f64> {
        let (x, y) = self.neighbour(*action);
        if self.tile(x, y) == Tile::Blocked {
            return Err(Error::IllegalAction {
                environment: NAME,
                action: format!("{action} from {},{}", self.position.0, self.position.1),
            });
        }
        self.position = (x as usize, y as usize);

        let reward = match self.tile(x, y) {
            Tile::Trap => {
                self.health = self.health.saturating_sub(1);
                let penalty = self.rewards.penalties[usize::from(self.health)];
                if self.health == 0 {
                    self.lives_lost += 1;
                    self.restart();
                }
                penalty
            }
            Tile::Treasure => {
                self.treasures_found += 1;
                self.restart();
                self.rewards.treasure
            }
            _ => 0.0,
        };

        trace!(%action, x, y, health = self.health, reward, "move");
        Ok(reward)
    }

    fn reset(&mut self) {
        self.restart();
    }

    fn name(&self) -> &str {
        NAME
    }

    /// The tile map row by row, followed by the start tile.
    fn layout(&self) -> Option<String> {
        let rows: Vec<String> = self
            .tiles
            .chunks(self.width)
            .map(|row| row.iter().map(|tile| tile.to_char()).collect())
            .collect();
        Some(format!("{}@{},{}", rows.join("/"), self.start.0, self.start.1))
    }
}

impl fmt::Display for TreasureHunt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            let line: String = (0..self.width)
                .map(|x| {
                    if (x, y) == self.position {
                        'H'
                    } else if (x, y) == self.start {
                        'S'
                    } else {
                        self.tiles[y * self.width + x].to_char()
                    }
                })
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
