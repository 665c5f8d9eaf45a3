// Authentication, profile, and leaderboard endpoints.

use crate::error::Result;
use crate::models::{AuthResponse, LeaderboardEntry, LoginRequest, RegisterRequest, UserProfile};
use crate::transport::Method;

use super::{ApiClient, AuthPolicy};

impl ApiClient {
    /// POST /auth/login
    ///
    /// On success both tokens and the username are persisted, replacing any
    /// previous session wholesale.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse> {
        let response: AuthResponse = self
            .post_json(
                "/auth/login",
                &LoginRequest {
                    username: username.to_string(),
                    password: password.to_string(),
                },
                AuthPolicy::Exempt,
            )
            .await?;

        self.credentials()
            .set_credentials(&response.access_token, &response.refresh_token);
        self.credentials().set_username(&response.username);
        tracing::info!(username = %response.username, "login succeeded");

        Ok(response)
    }

    /// POST /users, then the login flow.
    ///
    /// Registration itself establishes no session; the account is logged in
    /// immediately afterwards with the same credentials.
    pub async fn register(&self, username: &str, password: &str) -> Result<AuthResponse> {
        self.post_unit(
            "/users",
            Some(&RegisterRequest {
                username: username.to_string(),
                password: password.to_string(),
            }),
            AuthPolicy::Exempt,
        )
        .await?;

        self.login(username, password).await
    }

    /// Purges tokens, username, and the active match id. Local only; the
    /// server keeps no session state worth telling.
    pub fn logout(&self) {
        self.credentials().clear_session();
        tracing::info!("session cleared");
    }

    /// GET /users/profile
    pub async fn profile(&self) -> Result<UserProfile> {
        self.get_json("/users/profile", AuthPolicy::Renewable).await
    }

    /// GET /users/player_stats
    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
        self.get_json("/users/player_stats", AuthPolicy::Renewable)
            .await
    }

    /// GET /auth/validate. Returns true iff the stored token still satisfies the
    /// server. Never errors; any failure reads as "not valid".
    pub async fn validate_token(&self) -> bool {
        self.request(Method::GET, "/auth/validate", None, AuthPolicy::Renewable)
            .await
            .is_ok()
    }
}
