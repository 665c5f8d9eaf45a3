// Match lifecycle endpoints: lobby, setup submission, shots, and the
// authoritative state fetch the sync loop lives on.

use crate::board::to_server_point;
use crate::error::Result;
use crate::models::{
    CreateMatchRequest, CreateMatchResponse, Match, MatchGameState, MatchListItem,
    SetupMatchRequest, SetupShipPayload, ShotRequest, ShotResponse,
};

use super::{ApiClient, AuthPolicy};

impl ApiClient {
    /// POST /match
    ///
    /// The returned id is persisted as the active match so a reload can find
    /// its way back.
    pub async fn create_match(&self, request: &CreateMatchRequest) -> Result<CreateMatchResponse> {
        let response: CreateMatchResponse = self
            .post_json("/match", request, AuthPolicy::Renewable)
            .await?;
        self.credentials().set_active_match(&response.match_id);
        tracing::info!(match_id = %response.match_id, mode = %request.mode, "match created");
        Ok(response)
    }

    /// GET /match
    pub async fn list_matches(&self) -> Result<Vec<MatchListItem>> {
        self.get_json("/match", AuthPolicy::Renewable).await
    }

    /// GET /match/{id}: the authoritative per-fetch state.
    pub async fn match_state(&self, match_id: &str) -> Result<MatchGameState> {
        self.get_json(&format!("/match/{match_id}"), AuthPolicy::Renewable)
            .await
    }

    /// POST /match/setup: submits the whole fleet's placements.
    pub async fn setup_fleet(&self, match_id: &str, ships: Vec<SetupShipPayload>) -> Result<()> {
        // The response merely echoes the accepted setup.
        self.post_unit(
            "/match/setup",
            Some(&SetupMatchRequest {
                match_id: match_id.to_string(),
                ships,
            }),
            AuthPolicy::Renewable,
        )
        .await
    }

    /// POST /match/shot
    ///
    /// Takes client row/col; the wire payload carries the server's axes
    /// (x = column, y = row).
    pub async fn shoot(&self, match_id: &str, row: usize, col: usize) -> Result<ShotResponse> {
        let (x, y) = to_server_point(row, col);
        self.post_json(
            "/match/shot",
            &ShotRequest {
                match_id: match_id.to_string(),
                x: x as u32,
                y: y as u32,
            },
            AuthPolicy::Renewable,
        )
        .await
    }

    /// POST /match/{id}/join
    pub async fn join_match(&self, match_id: &str) -> Result<Match> {
        self.post_json(
            &format!("/match/{match_id}/join"),
            &serde_json::json!({}),
            AuthPolicy::Renewable,
        )
        .await
    }

    /// POST /match/{id}/ready: signals the fleet is final.
    pub async fn ready(&self, match_id: &str) -> Result<Match> {
        self.post_json(
            &format!("/match/{match_id}/ready"),
            &serde_json::json!({}),
            AuthPolicy::Renewable,
        )
        .await
    }

    /// POST /match/{id}/forfeit
    pub async fn forfeit_match(&self, match_id: &str) -> Result<Match> {
        self.post_json(
            &format!("/match/{match_id}/forfeit"),
            &serde_json::json!({}),
            AuthPolicy::Renewable,
        )
        .await
    }

    /// POST /match/{id}/cancel: abandon a match that never started.
    pub async fn cancel_match(&self, match_id: &str) -> Result<()> {
        self.post_unit::<serde_json::Value>(
            &format!("/match/{match_id}/cancel"),
            None,
            AuthPolicy::Renewable,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::config::ClientConfig;
    use crate::storage::MemoryStorage;
    use crate::transport::mock::MockTransport;

    use super::*;

    fn client() -> (ApiClient, Arc<MockTransport>) {
        let transport = Arc::new(MockTransport::new());
        let api = ApiClient::with_transport(
            ClientConfig::default(),
            Arc::new(MemoryStorage::new()),
            transport.clone(),
        );
        (api, transport)
    }

    #[tokio::test]
    async fn create_match_persists_the_active_match_id() {
        let (api, transport) = client();
        transport.push_response(201, json!({"matchId": "m-42"}));

        let response = api
            .create_match(&CreateMatchRequest {
                mode: "pvp".to_string(),
                ai_difficulty: None,
                opponent_id: None,
            })
            .await
            .expect("create");

        assert_eq!(response.match_id, "m-42");
        assert_eq!(api.credentials().active_match().as_deref(), Some("m-42"));

        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(body["mode"], "pvp");
        assert!(body.get("aiDifficulty").is_none(), "None fields stay off the wire");
    }

    #[tokio::test]
    async fn shoot_translates_row_col_into_server_axes() {
        let (api, transport) = client();
        transport.push_response(
            200,
            json!({"hit": true, "sunk": false, "gameOver": false}),
        );

        let outcome = api.shoot("m-1", 4, 7).await.expect("shot accepted");
        assert!(outcome.hit);
        assert!(!outcome.game_over);

        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(body["matchId"], "m-1");
        assert_eq!(body["x"], 7, "x carries the column");
        assert_eq!(body["y"], 4, "y carries the row");
    }

    #[tokio::test]
    async fn setup_submits_fleet_under_the_expected_key() {
        let (api, transport) = client();
        transport.push_response(200, json!({"matchId": "m-1"}));

        let ships = vec![SetupShipPayload {
            ship_type: "DESTROYER".to_string(),
            size: 2,
            orientation: crate::fleet::Orientation::Horizontal,
            start_row: 0,
            start_col: 0,
        }];
        api.setup_fleet("m-1", ships).await.expect("setup");

        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(body["matchId"], "m-1");
        assert_eq!(body["SetupShipPayload"][0]["shipType"], "DESTROYER");
        assert_eq!(body["SetupShipPayload"][0]["orientation"], 0);
    }

    #[tokio::test]
    async fn lifecycle_posts_hit_the_expected_paths() {
        let (api, transport) = client();
        let match_body = json!({
            "id": "m-1",
            "player1": {"id": "p-1", "username": "a", "isReady": true},
            "player2": null,
            "currentTurn": null,
            "status": "SETUP",
            "winner": null,
            "createdAt": "2026-01-10T12:00:00Z",
            "updatedAt": "2026-01-10T12:00:00Z"
        });
        transport.push_response(200, match_body.clone());
        transport.push_response(200, match_body.clone());
        transport.push_response(200, match_body);
        transport.push_empty_response(204);

        api.join_match("m-1").await.expect("join");
        api.ready("m-1").await.expect("ready");
        api.forfeit_match("m-1").await.expect("forfeit");
        api.cancel_match("m-1").await.expect("cancel");

        let urls: Vec<String> = transport.requests().iter().map(|r| r.url.clone()).collect();
        assert!(urls[0].ends_with("/match/m-1/join"));
        assert!(urls[1].ends_with("/match/m-1/ready"));
        assert!(urls[2].ends_with("/match/m-1/forfeit"));
        assert!(urls[3].ends_with("/match/m-1/cancel"));
    }
}
