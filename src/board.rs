//! Board coordinate/state transcoding.
//!
//! The match server encodes a board as `grid[x][y]` (column-major) with small
//! integer cell codes; everything client-side consumes `grid[row][col]` with
//! symbolic cell states. Converting between the two is a full transpose plus
//! a value map, and the same column/row swap applies to single points when a
//! shot is submitted.

use serde::{Deserialize, Serialize};

const CODE_WATER: i64 = 0;
const CODE_SHIP: i64 = 1;
const CODE_HIT: i64 = 2;
const CODE_MISS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CellState {
    Water,
    Ship,
    Hit,
    Miss,
}

/// Codes outside {0,1,2,3} decode to water. The server may grow new codes
/// (e.g. a separate "sunk"); an old client must keep rendering rather than
/// fail, so this fallback must be preserved.
pub fn decode_cell(code: i64) -> CellState {
    match code {
        CODE_WATER => CellState::Water,
        CODE_SHIP => CellState::Ship,
        CODE_HIT => CellState::Hit,
        CODE_MISS => CellState::Miss,
        _ => CellState::Water,
    }
}

pub fn encode_cell(cell: CellState) -> i64 {
    match cell {
        CellState::Water => CODE_WATER,
        CellState::Ship => CODE_SHIP,
        CellState::Hit => CODE_HIT,
        CellState::Miss => CODE_MISS,
    }
}

/// Transposes the server's `[col][row]` integer grid into the client's
/// row-major symbolic grid: `fixed[row][col] = decode(raw[col][row])`.
///
/// Width comes from the outer array, height from the first inner array. An
/// empty grid transcodes to an empty board, and short inner columns read as
/// water rather than erroring; malformed upstream data degrades, it does not
/// crash the view.
pub fn decode_grid(raw: &[Vec<i64>]) -> Vec<Vec<CellState>> {
    if raw.is_empty() {
        return Vec::new();
    }

    let width = raw.len();
    let height = raw[0].len();
    let mut fixed = vec![vec![CellState::Water; width]; height];

    for (col, column) in raw.iter().enumerate() {
        for row in 0..height {
            let code = column.get(row).copied().unwrap_or(CODE_WATER);
            fixed[row][col] = decode_cell(code);
        }
    }

    fixed
}

/// Exact inverse of [`decode_grid`]: row-major symbolic grid back into the
/// server's column-major integer convention.
pub fn encode_grid(grid: &[Vec<CellState>]) -> Vec<Vec<i64>> {
    if grid.is_empty() {
        return Vec::new();
    }

    let height = grid.len();
    let width = grid[0].len();
    let mut raw = vec![vec![CODE_WATER; height]; width];

    for (row, cells) in grid.iter().enumerate() {
        for col in 0..width {
            let cell = cells.get(col).copied().unwrap_or(CellState::Water);
            raw[col][row] = encode_cell(cell);
        }
    }

    raw
}

/// Opponent-board projection: ships never render regardless of what the
/// server sent. Hits and misses pass through untouched.
pub fn conceal_ships(grid: Vec<Vec<CellState>>) -> Vec<Vec<CellState>> {
    grid.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| match cell {
                    CellState::Ship => CellState::Water,
                    other => other,
                })
                .collect()
        })
        .collect()
}

/// Point-level convention map for shot submission: server x = column,
/// server y = row.
pub fn to_server_point(row: usize, col: usize) -> (usize, usize) {
    (col, row)
}
