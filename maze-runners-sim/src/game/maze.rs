//! Tile Maze
//!
//! Static tile geometry the runners move through. Layouts are plain text,
//! one character per tile:
//!
//! | Symbol        | Tile                    |
//! |---------------|-------------------------|
//! | `#`           | wall                    |
//! | `.` or space  | floor                   |
//! | `1` / `2`     | floor, spawn of player 1 / 2 |
//! | `A` / `B`     | goal of player 1 / 2    |

use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::core::vec2::Vec2;
use crate::game::input::PlayerSlot;

/// Built-in mirrored layout. Player 2 starts top-left, player 1 top-right;
/// each goal sits in the bottom corner of the opposite half, so both runners
/// cross through the shared corridor on row 13. Both routes are 56 moves.
pub const CLASSIC_LAYOUT: &str = "\
#####################
#2....#...#...#....1#
#.###.#.#.#.#.#.###.#
#.#...#.#.#.#.#...#.#
#.#.###.#.#.#.###.#.#
#.#...#.#.#.#.#...#.#
#.###.#.#.#.#.#.###.#
#...#...#.#.#...#...#
###.#####.#.#####.###
#...#.....#.....#...#
#.###.###.#.###.###.#
#.....#...#...#.....#
#####.#.#####.#.#####
#.....#.......#.....#
#.#######.#.#######.#
#A#.......#.......#B#
#####################";

// =============================================================================
// MAZE TRAIT
// =============================================================================

/// Geometry queries used by runners during move resolution.
pub trait Maze {
    /// Grid size as `(columns, rows)`.
    fn dimensions(&self) -> (usize, usize);

    /// True when the point lies inside a wall or outside the grid.
    fn is_blocked(&self, x: f32, y: f32) -> bool;

    /// True when the point lies on `player`'s goal tile.
    fn is_goal(&self, player: PlayerSlot, x: f32, y: f32) -> bool;
}

// =============================================================================
// TILES
// =============================================================================

/// A single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tile {
    /// Walkable
    Floor,
    /// Obstruction
    Wall,
    /// Walkable goal of one player
    Goal(PlayerSlot),
}

impl Tile {
    /// True for floor and goal tiles.
    #[inline]
    pub fn is_walkable(self) -> bool {
        !matches!(self, Tile::Wall)
    }
}

/// Layout parsing and loading errors.
#[derive(Debug, Error)]
pub enum MazeError {
    /// No rows in the layout.
    #[error("maze layout is empty")]
    Empty,

    /// Rows of different widths.
    #[error("row {row} is {found} tiles wide, expected {expected}")]
    Ragged {
        /// Zero-based row index
        row: usize,
        /// Width of the first row
        expected: usize,
        /// Width of this row
        found: usize,
    },

    /// Unrecognised layout character.
    #[error("unknown tile symbol {symbol:?} at row {row}, column {col}")]
    UnknownTile {
        /// Offending character
        symbol: char,
        /// Zero-based row index
        row: usize,
        /// Zero-based column index
        col: usize,
    },

    /// Spawn marker absent.
    #[error("no spawn marker for {0}")]
    MissingSpawn(PlayerSlot),

    /// Goal marker absent.
    #[error("no goal marker for {0}")]
    MissingGoal(PlayerSlot),

    /// Spawn or goal marker repeated.
    #[error("marker {symbol:?} appears more than once (row {row}, column {col})")]
    DuplicateMarker {
        /// Repeated marker
        symbol: char,
        /// Row of the repeat
        row: usize,
        /// Column of the repeat
        col: usize,
    },

    /// Layout file could not be read.
    #[error("failed to read maze layout: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// TILE MAZE
// =============================================================================

/// Rectangular grid of tiles with one spawn and one goal per player.
#[derive(Clone, Debug, PartialEq)]
pub struct TileMaze {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
    spawns: [(usize, usize); 2],
    goals: [(usize, usize); 2],
}

impl TileMaze {
    /// Parse a text layout. Empty lines are skipped; a line of spaces is a
    /// row of floor.
    pub fn parse(layout: &str) -> Result<Self, MazeError> {
        let rows: Vec<&str> = layout
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .collect();
        let width = rows.first().map(|r| r.chars().count()).ok_or(MazeError::Empty)?;

        let mut tiles = Vec::with_capacity(width * rows.len());
        let mut spawns: [Option<(usize, usize)>; 2] = [None; 2];
        let mut goals: [Option<(usize, usize)>; 2] = [None; 2];

        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(MazeError::Ragged { row, expected: width, found });
            }

            for (col, symbol) in line.chars().enumerate() {
                let (tile, marker) = match symbol {
                    '#' => (Tile::Wall, None),
                    '.' | ' ' => (Tile::Floor, None),
                    '1' => (Tile::Floor, Some((&mut spawns, PlayerSlot::One))),
                    '2' => (Tile::Floor, Some((&mut spawns, PlayerSlot::Two))),
                    'A' => (Tile::Goal(PlayerSlot::One), Some((&mut goals, PlayerSlot::One))),
                    'B' => (Tile::Goal(PlayerSlot::Two), Some((&mut goals, PlayerSlot::Two))),
                    _ => return Err(MazeError::UnknownTile { symbol, row, col }),
                };
                if let Some((slots, player)) = marker {
                    let slot = &mut slots[player.index()];
                    if slot.is_some() {
                        return Err(MazeError::DuplicateMarker { symbol, row, col });
                    }
                    *slot = Some((col, row));
                }
                tiles.push(tile);
            }
        }

        let spawns = [
            spawns[0].ok_or(MazeError::MissingSpawn(PlayerSlot::One))?,
            spawns[1].ok_or(MazeError::MissingSpawn(PlayerSlot::Two))?,
        ];
        let goals = [
            goals[0].ok_or(MazeError::MissingGoal(PlayerSlot::One))?,
            goals[1].ok_or(MazeError::MissingGoal(PlayerSlot::Two))?,
        ];

        Ok(Self {
            width,
            height: rows.len(),
            tiles,
            spawns,
            goals,
        })
    }

    /// Read and parse a layout file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MazeError> {
        let layout = fs::read_to_string(path)?;
        Self::parse(&layout)
    }

    /// The built-in layout.
    pub fn classic() -> Self {
        match Self::parse(CLASSIC_LAYOUT) {
            Ok(maze) => maze,
            Err(e) => unreachable!("built-in layout is invalid: {e}"),
        }
    }

    /// Tile at a grid coordinate, `None` outside the grid.
    pub fn tile(&self, tx: usize, ty: usize) -> Option<Tile> {
        if tx >= self.width || ty >= self.height {
            return None;
        }
        Some(self.tiles[ty * self.width + tx])
    }

    /// Tile containing a maze-space point.
    pub fn tile_at(&self, x: f32, y: f32) -> Option<Tile> {
        let (tx, ty) = Vec2::new(x, y).tile()?;
        self.tile(tx, ty)
    }

    /// Spawn tile of a player.
    pub fn spawn_tile(&self, player: PlayerSlot) -> (usize, usize) {
        self.spawns[player.index()]
    }

    /// Spawn point (tile centre) of a player.
    pub fn spawn_point(&self, player: PlayerSlot) -> Vec2 {
        let (tx, ty) = self.spawn_tile(player);
        Vec2::tile_center(tx, ty)
    }

    /// Goal tile of a player.
    pub fn goal_tile(&self, player: PlayerSlot) -> (usize, usize) {
        self.goals[player.index()]
    }

    /// Walkable neighbours of a tile (up, down, left, right).
    pub fn walkable_neighbours(&self, (tx, ty): (usize, usize)) -> impl Iterator<Item = (usize, usize)> + '_ {
        let candidates = [
            ty.checked_sub(1).map(|y| (tx, y)),
            Some((tx, ty + 1)),
            tx.checked_sub(1).map(|x| (x, ty)),
            Some((tx + 1, ty)),
        ];
        candidates
            .into_iter()
            .flatten()
            .filter(|&(x, y)| self.tile(x, y).is_some_and(Tile::is_walkable))
    }

    /// Rows of tiles, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.tiles.chunks(self.width)
    }
}

impl FromStr for TileMaze {
    type Err = MazeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Maze for TileMaze {
    fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn is_blocked(&self, x: f32, y: f32) -> bool {
        !self.tile_at(x, y).is_some_and(Tile::is_walkable)
    }

    fn is_goal(&self, player: PlayerSlot, x: f32, y: f32) -> bool {
        self.tile_at(x, y) == Some(Tile::Goal(player))
    }
}

// =============================================================================
// TESTS
// =============================================================================
