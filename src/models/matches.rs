use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fleet::Orientation;

// ==================== PHASE ====================

/// The match's coarse lifecycle stage, exactly as the server reports it.
///
/// This is a closed enum on purpose: a status string the client does not
/// recognize is a deserialization error, never a silent default. The client
/// must not guess its way through an unknown phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchPhase {
    Setup,
    InProgress,
    Finished,
}

// ==================== MATCH LIFECYCLE ====================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchRequest {
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_difficulty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchResponse {
    pub match_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchListItem {
    pub id: String,
    pub player1: String,
    #[serde(default)]
    pub player2: Option<String>,
    pub status: MatchPhase,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPlayer {
    pub id: String,
    pub username: String,
    pub is_ready: bool,
}

/// Match entity returned by the mutating lifecycle endpoints
/// (join/ready/forfeit).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub player1: MatchPlayer,
    #[serde(default)]
    pub player2: Option<MatchPlayer>,
    #[serde(default)]
    pub current_turn: Option<String>,
    pub status: MatchPhase,
    #[serde(default)]
    pub winner: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==================== SETUP ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupShipPayload {
    pub ship_type: String,
    pub size: u32,
    pub orientation: Orientation,
    pub start_row: u32,
    pub start_col: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupMatchRequest {
    pub match_id: String,
    // The server expects this exact PascalCase key.
    #[serde(rename = "SetupShipPayload")]
    pub ships: Vec<SetupShipPayload>,
}

// ==================== BATTLE STATE ====================

/// One player's board as the server reports it: a column-major integer grid
/// (`grid[x][y]`) plus per-ship damage summaries. The grid is transcoded by
/// `crate::board` before anything client-side reads it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardState {
    #[serde(default)]
    pub grid: Vec<Vec<i64>>,
    #[serde(default)]
    pub ships: Vec<ShipStatus>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipStatus {
    pub id: String,
    #[serde(rename = "type")]
    pub ship_type: String,
    pub size: u32,
    pub hits: u32,
    pub is_sunk: bool,
}

/// Authoritative per-fetch match state. Turn ownership arrives as a flag the
/// client trusts verbatim; it never derives whose turn it is from game rules.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchGameState {
    pub match_id: String,
    pub status: MatchPhase,
    pub is_my_turn: bool,
    #[serde(default)]
    pub current_turn_player_id: Option<String>,
    #[serde(default)]
    pub winner_id: Option<String>,
    #[serde(default)]
    pub my_board: BoardState,
    #[serde(default)]
    pub opponent_board: BoardState,
    #[serde(default)]
    pub stats: Option<serde_json::Value>,
}

// ==================== SHOTS ====================

/// Shot submission in the server's coordinate convention: x = column,
/// y = row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShotRequest {
    pub match_id: String,
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShotResponse {
    pub hit: bool,
    pub sunk: bool,
    #[serde(default)]
    pub ship_type: Option<String>,
    pub game_over: bool,
    #[serde(default)]
    pub winner: Option<String>,
}
