//! Match synchronization: the polling/reconciliation loop that keeps the
//! local view of a match consistent with the server's authoritative state.
//!
//! The server drives every transition. The client re-fetches on a fixed
//! interval only while the match is IN_PROGRESS, applies mutating responses
//! by re-fetching immediately, and never updates a board optimistically.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::api::ApiClient;
use crate::board::{conceal_ships, decode_grid, CellState};
use crate::error::{ClientError, Result};
use crate::fleet::SetupBoard;
use crate::models::{MatchGameState, MatchPhase, ShipStatus, ShotResponse};

/// Read-only snapshot of one match as the UI consumes it.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchView {
    pub match_id: String,
    pub phase: MatchPhase,
    pub my_turn: bool,
    pub current_turn_player_id: Option<String>,
    pub winner_id: Option<String>,
    /// Row-major; own ships render.
    pub own_board: Vec<Vec<CellState>>,
    /// Row-major; ships are concealed no matter what the server sent.
    pub opponent_board: Vec<Vec<CellState>>,
    pub own_ships: Vec<ShipStatus>,
}

impl MatchView {
    fn from_state(state: MatchGameState) -> Self {
        Self {
            match_id: state.match_id,
            phase: state.status,
            my_turn: state.is_my_turn,
            current_turn_player_id: state.current_turn_player_id,
            winner_id: state.winner_id,
            own_board: decode_grid(&state.my_board.grid),
            opponent_board: conceal_ships(decode_grid(&state.opponent_board.grid)),
            own_ships: state.my_board.ships,
        }
    }

    pub fn is_over(&self) -> bool {
        self.phase == MatchPhase::Finished
    }

    /// Attack intents are locally permitted only on our turn of a running
    /// match. The server remains the final authority either way.
    pub fn can_fire(&self) -> bool {
        self.phase == MatchPhase::InProgress && self.my_turn
    }
}

/// Owner of one match's view state.
///
/// Snapshots are published through a watch channel; `None` until the first
/// successful fetch. Dropping the session simply abandons any in-flight
/// request.
pub struct MatchSession {
    api: Arc<ApiClient>,
    match_id: String,
    view_tx: watch::Sender<Option<MatchView>>,
}

impl MatchSession {
    pub fn new(api: Arc<ApiClient>, match_id: impl Into<String>) -> Self {
        let (view_tx, _) = watch::channel(None);
        Self {
            api,
            match_id: match_id.into(),
            view_tx,
        }
    }

    pub fn match_id(&self) -> &str {
        &self.match_id
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<MatchView>> {
        self.view_tx.subscribe()
    }

    /// Latest published snapshot, if any fetch has succeeded yet.
    pub fn view(&self) -> Option<MatchView> {
        self.view_tx.borrow().clone()
    }

    /// One authoritative fetch, transcoded and published.
    pub async fn refresh(&self) -> Result<MatchView> {
        let state = self.api.match_state(&self.match_id).await?;
        Ok(self.apply(state))
    }

    fn apply(&self, state: MatchGameState) -> MatchView {
        let view = MatchView::from_state(state);
        let previous = self.view_tx.borrow().as_ref().map(|v| v.phase);
        if previous != Some(view.phase) {
            tracing::info!(
                match_id = %self.match_id,
                phase = ?view.phase,
                "match phase transition"
            );
        }
        self.view_tx.send_replace(Some(view.clone()));
        view
    }

    /// Re-fetches on the configured interval for as long as the server
    /// reports IN_PROGRESS, and stops the moment it reports anything else.
    ///
    /// Transient fetch failures are logged and the loop keeps going; an
    /// expired session ends it, since no further fetch can succeed.
    pub async fn poll_while_in_progress(&self) -> Result<MatchView> {
        let interval = Duration::from_millis(self.api.config().poll_interval_ms);

        let mut view = match self.view() {
            Some(view) => view,
            None => self.refresh().await?,
        };

        while view.phase == MatchPhase::InProgress {
            tokio::time::sleep(interval).await;
            match self.refresh().await {
                Ok(next) => view = next,
                Err(ClientError::SessionExpired) => return Err(ClientError::SessionExpired),
                Err(err) => {
                    tracing::warn!(match_id = %self.match_id, error = %err, "match poll failed; retrying next tick");
                }
            }
        }

        tracing::debug!(match_id = %self.match_id, phase = ?view.phase, "polling stopped");
        Ok(view)
    }

    /// Submits an attack at client (row, col).
    ///
    /// Locally gated on the cached view; the resulting board state comes
    /// from the immediate re-fetch, never from assuming the shot landed.
    pub async fn fire_shot(&self, row: usize, col: usize) -> Result<ShotResponse> {
        match self.view() {
            Some(view) if view.is_over() => return Err(ClientError::MatchOver),
            Some(view) if view.can_fire() => {}
            _ => return Err(ClientError::OutOfTurn),
        }

        let outcome = self.api.shoot(&self.match_id, row, col).await?;
        self.refresh().await?;
        Ok(outcome)
    }

    /// Submits the completed fleet, then signals readiness. The two
    /// sub-requests run strictly in sequence; the second is not attempted if
    /// the first fails.
    pub async fn confirm_fleet(&self, setup: &SetupBoard) -> Result<MatchView> {
        if matches!(self.view(), Some(view) if view.is_over()) {
            return Err(ClientError::MatchOver);
        }

        let ships = setup.setup_payload()?;
        self.api.setup_fleet(&self.match_id, ships).await?;
        self.api.ready(&self.match_id).await?;
        self.refresh().await
    }

    pub async fn forfeit(&self) -> Result<MatchView> {
        if matches!(self.view(), Some(view) if view.is_over()) {
            return Err(ClientError::MatchOver);
        }

        self.api.forfeit_match(&self.match_id).await?;
        self.refresh().await
    }
}
