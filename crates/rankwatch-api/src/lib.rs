//! API client library for rankwatch.
//!
//! Provides the rank codec and domain entities shared by every crate, the
//! rate-limited request pipeline, and clients for the Riot Games API and
//! the Discord REST API.

/// Discord REST API client.
pub mod discord;
/// Serialised, rate-limited HTTP request execution.
pub mod dispatcher;
/// Summoner, match and queue entities.
pub mod model;
/// Riot platform and regional routing values.
pub mod platform;
/// Rank codec.
pub mod rank;
/// Sliding-log rate limiter.
pub mod rate_limiter;
/// Riot Games API client.
pub mod riot;

pub use dispatcher::{DispatchError, Dispatcher};
pub use model::{
    Ladder, Loadout, Match, MatchState, Participant, QueueKind, RiotId, Summoner, SummonerProfile,
    Team,
};
pub use platform::{Platform, RegionalRoute};
pub use rank::{Division, Rank, Tier};
pub use rate_limiter::RateLimiter;
