//! Client-side state synchronization for a turn-based naval battle game.
//!
//! This crate is the programmatic core a UI layer drives: it tracks session
//! and match truth against a remote match server despite an imperfect
//! network and an API whose board conventions differ from the client's own.
//!
//! The pieces, leaf first:
//!
//! - [`board`] transcodes between the server's column-major integer grids
//!   and the client's row-major symbolic grids.
//! - [`session`] owns the access/refresh token pair, persisted through a
//!   [`storage::KeyValueStore`].
//! - [`api`] is the request pipeline: bearer injection, error normalization,
//!   and single-flight credential renewal, plus the typed endpoint surface.
//! - [`fleet`] validates ship placement locally, before any server
//!   round-trip.
//! - [`sync`] runs the match loop: fixed-interval polling while a match is
//!   in progress, immediate application of mutating responses, and the
//!   read-only [`sync::MatchView`] the UI consumes.

pub mod api;
pub mod board;
pub mod config;
pub mod constants;
pub mod error;
pub mod fleet;
pub mod models;
pub mod session;
pub mod storage;
pub mod sync;
pub mod transport;

pub use api::{ApiClient, AuthPolicy};
pub use board::CellState;
pub use config::ClientConfig;
pub use error::{ApiError, ClientError, Result};
pub use fleet::{FleetConfig, Orientation, PlacementError, SetupBoard, ShipKind};
pub use models::{MatchGameState, MatchPhase, ShotResponse};
pub use session::CredentialStore;
pub use storage::{KeyValueStore, MemoryStorage};
pub use sync::{MatchSession, MatchView};
