/// Application constants

// Match server
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5205";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// Board geometry
pub const DEFAULT_GRID_SIZE: usize = 10;

// Re-fetch cadence while a match is in progress
pub const MATCH_POLL_INTERVAL_MS: u64 = 2_000;

// Durable storage keys. These mirror what the match server's web client
// persists, so a session survives a reload of the embedding application.
pub const KEY_ACCESS_TOKEN: &str = "token";
pub const KEY_REFRESH_TOKEN: &str = "refreshToken";
pub const KEY_USERNAME: &str = "username";
pub const KEY_ACTIVE_MATCH: &str = "matchId";
