//! Ship-placement validation engine for the setup phase.
//!
//! Everything here is local and synchronous: the fleet is validated cell by
//! cell before any server round-trip, and a rejected operation leaves the
//! fleet exactly as it was. The server re-validates on submission either way;
//! this engine exists so the UI can give instant feedback.

use std::collections::HashMap;
use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::CellState;
use crate::constants::DEFAULT_GRID_SIZE;
use crate::models::SetupShipPayload;

// ==================== FLEET CONFIGURATION ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipKind {
    Carrier,
    Battleship,
    Cruiser,
    Submarine,
    Destroyer,
}

impl ShipKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Carrier => "CARRIER",
            Self::Battleship => "BATTLESHIP",
            Self::Cruiser => "CRUISER",
            Self::Submarine => "SUBMARINE",
            Self::Destroyer => "DESTROYER",
        }
    }
}

impl fmt::Display for ShipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn toggled(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

// The wire format uses the numeric codes 0 (horizontal) and 1 (vertical).
impl Serialize for Orientation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(match self {
            Self::Horizontal => 0,
            Self::Vertical => 1,
        })
    }
}

impl<'de> Deserialize<'de> for Orientation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(Self::Horizontal),
            1 => Ok(Self::Vertical),
            other => Err(de::Error::custom(format!(
                "invalid orientation code {other}"
            ))),
        }
    }
}

/// The required fleet: an ordered list of ship kinds with fixed lengths.
/// Supplied by configuration, never computed.
#[derive(Debug, Clone)]
pub struct FleetConfig {
    ships: Vec<(ShipKind, usize)>,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            ships: vec![
                (ShipKind::Carrier, 5),
                (ShipKind::Battleship, 4),
                (ShipKind::Cruiser, 3),
                (ShipKind::Submarine, 3),
                (ShipKind::Destroyer, 2),
            ],
        }
    }
}

impl FleetConfig {
    pub fn new(ships: Vec<(ShipKind, usize)>) -> Self {
        Self { ships }
    }

    pub fn length_of(&self, kind: ShipKind) -> Option<usize> {
        self.ships
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, len)| *len)
    }

    pub fn required(&self) -> impl Iterator<Item = ShipKind> + '_ {
        self.ships.iter().map(|(kind, _)| *kind)
    }

    pub fn ship_count(&self) -> usize {
        self.ships.len()
    }
}

// ==================== PLACEMENT ====================

/// One ship's chosen orientation and anchor cell. HORIZONTAL extends along
/// increasing column from the anchor, VERTICAL along increasing row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub kind: ShipKind,
    pub orientation: Orientation,
    pub row: usize,
    pub col: usize,
    pub length: usize,
}

impl Placement {
    pub fn cells(&self) -> Vec<(usize, usize)> {
        (0..self.length)
            .map(|i| match self.orientation {
                Orientation::Horizontal => (self.row, self.col + i),
                Orientation::Vertical => (self.row + i, self.col),
            })
            .collect()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    #[error("{kind} does not fit on the board at ({row}, {col})")]
    OutOfBounds {
        kind: ShipKind,
        row: usize,
        col: usize,
    },

    #[error("{kind} would overlap {other}")]
    Collision { kind: ShipKind, other: ShipKind },

    #[error("{0} is not part of this fleet")]
    UnknownShip(ShipKind),

    #[error("{0} has not been placed")]
    NotPlaced(ShipKind),

    #[error("no ship is selected")]
    NothingSelected,

    #[error("fleet is incomplete")]
    FleetIncomplete,
}

// ==================== SETUP BOARD ====================

/// In-memory model of the player's fleet during setup.
///
/// A ship kind present in the placement map means "placed"; absence means
/// "unplaced". All mutations are all-or-nothing: a rejected placement or
/// rotation leaves the previous state untouched.
#[derive(Debug, Clone)]
pub struct SetupBoard {
    size: usize,
    config: FleetConfig,
    placements: HashMap<ShipKind, Placement>,
    selected: Option<ShipKind>,
}

impl Default for SetupBoard {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_SIZE, FleetConfig::default())
    }
}

impl SetupBoard {
    pub fn new(size: usize, config: FleetConfig) -> Self {
        Self {
            size,
            config,
            placements: HashMap::new(),
            selected: None,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn config(&self) -> &FleetConfig {
        &self.config
    }

    /// Marks `kind` as the active selection. No validation; selecting an
    /// already-placed ship is how re-placement and rotation start.
    pub fn select_ship(&mut self, kind: ShipKind) {
        self.selected = Some(kind);
    }

    pub fn selected(&self) -> Option<ShipKind> {
        self.selected
    }

    pub fn place_ship(
        &mut self,
        kind: ShipKind,
        orientation: Orientation,
        row: usize,
        col: usize,
    ) -> Result<(), PlacementError> {
        let length = self
            .config
            .length_of(kind)
            .ok_or(PlacementError::UnknownShip(kind))?;

        let candidate = Placement {
            kind,
            orientation,
            row,
            col,
            length,
        };
        self.validate(&candidate)?;

        // Acceptance replaces any prior placement for this kind.
        self.placements.insert(kind, candidate);
        Ok(())
    }

    /// Places the selected ship at the given anchor, keeping its previous
    /// orientation (horizontal if it was never placed).
    pub fn place_selected(&mut self, row: usize, col: usize) -> Result<(), PlacementError> {
        let kind = self.selected.ok_or(PlacementError::NothingSelected)?;
        let orientation = self
            .placements
            .get(&kind)
            .map(|p| p.orientation)
            .unwrap_or(Orientation::Horizontal);
        self.place_ship(kind, orientation, row, col)
    }

    /// Toggles orientation around the ship's existing anchor. A rotation
    /// that would leave the board or overlap another ship is rejected and
    /// the prior placement survives unchanged.
    pub fn rotate_ship(&mut self, kind: ShipKind) -> Result<(), PlacementError> {
        let prior = self
            .placements
            .get(&kind)
            .cloned()
            .ok_or(PlacementError::NotPlaced(kind))?;

        let rotated = Placement {
            orientation: prior.orientation.toggled(),
            ..prior
        };
        self.validate(&rotated)?;

        self.placements.insert(kind, rotated);
        Ok(())
    }

    /// Empties the fleet. Always succeeds; whether the player is still
    /// allowed to do so (e.g. after confirming readiness) is the caller's
    /// concern.
    pub fn clear_board(&mut self) {
        self.placements.clear();
        self.selected = None;
    }

    pub fn is_ship_placed(&self, kind: ShipKind) -> bool {
        self.placements.contains_key(&kind)
    }

    pub fn all_ships_placed(&self) -> bool {
        self.config.required().all(|kind| self.is_ship_placed(kind))
    }

    pub fn placement(&self, kind: ShipKind) -> Option<&Placement> {
        self.placements.get(&kind)
    }

    fn validate(&self, candidate: &Placement) -> Result<(), PlacementError> {
        let cells = candidate.cells();

        for &(row, col) in &cells {
            if row >= self.size || col >= self.size {
                return Err(PlacementError::OutOfBounds {
                    kind: candidate.kind,
                    row: candidate.row,
                    col: candidate.col,
                });
            }
        }

        for (other_kind, other) in &self.placements {
            if *other_kind == candidate.kind {
                continue;
            }
            let occupied = other.cells();
            if cells.iter().any(|cell| occupied.contains(cell)) {
                return Err(PlacementError::Collision {
                    kind: candidate.kind,
                    other: *other_kind,
                });
            }
        }

        Ok(())
    }

    /// Pure projection of the fleet onto an all-water grid. Cells outside
    /// the board are ignored rather than erroring; a malformed fleet
    /// configuration degrades on the read path instead of crashing it.
    pub fn render_grid(&self) -> Vec<Vec<CellState>> {
        let mut grid = vec![vec![CellState::Water; self.size]; self.size];
        for placement in self.placements.values() {
            for (row, col) in placement.cells() {
                if row < self.size && col < self.size {
                    grid[row][col] = CellState::Ship;
                }
            }
        }
        grid
    }

    /// Projects the fleet into wire DTOs for setup submission, in fleet
    /// configuration order. Errors unless every required ship is placed.
    pub fn setup_payload(&self) -> Result<Vec<SetupShipPayload>, PlacementError> {
        if !self.all_ships_placed() {
            return Err(PlacementError::FleetIncomplete);
        }

        Ok(self
            .config
            .required()
            .filter_map(|kind| self.placements.get(&kind))
            .map(|p| SetupShipPayload {
                ship_type: p.kind.as_str().to_string(),
                size: p.length as u32,
                orientation: p.orientation,
                start_row: p.row as u32,
                start_col: p.col as u32,
            })
            .collect())
    }
}
