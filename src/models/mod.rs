// src/models/mod.rs
pub mod matches;
pub mod user;

// Re-export commonly used types so other modules can use `crate::models::X`
pub use matches::{
    BoardState,
    CreateMatchRequest,
    CreateMatchResponse,
    Match,
    MatchGameState,
    MatchListItem,
    MatchPhase,
    MatchPlayer,
    SetupMatchRequest,
    SetupShipPayload,
    ShipStatus,
    ShotRequest,
    ShotResponse,
};
pub use user::{
    AuthResponse,
    LeaderboardEntry,
    LoginRequest,
    RefreshTokenRequest,
    RefreshTokenResponse,
    RegisterRequest,
    UserProfile,
};
