//! `RiotApi` trait definition.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use crate::model::{Ladder, Match, RiotId, SummonerProfile};
use crate::platform::Platform;

/// Riot Games API trait.
///
/// Abstracts API operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(RiotApi: Send)]
pub trait LocalRiotApi {
    /// Resolves a Riot id (`name#tag`) to a puuid.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist, or the HTTP request
    /// or JSON parsing fails.
    async fn resolve_identity(&self, riot_id: &RiotId, platform: Platform) -> Result<String>;

    /// Looks up the Riot id of a puuid.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn fetch_account(&self, puuid: &str, platform: Platform) -> Result<RiotId>;

    /// Fetches the platform summoner record (internal id, icon).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn fetch_summoner(&self, puuid: &str, platform: Platform) -> Result<SummonerProfile>;

    /// Fetches solo and flex ranks. A queue without a ladder entry is
    /// unranked, which is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn fetch_rank(&self, summoner_id: &str, platform: Platform) -> Result<Ladder>;

    /// Returns the id of the most recent ranked match, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn latest_ranked_match_id(&self, puuid: &str, platform: Platform)
    -> Result<Option<String>>;

    /// Fetches a finished match. Participant ranks are left unranked.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn fetch_match(&self, match_id: &str, platform: Platform) -> Result<Match>;

    /// Fetches the live game of a player; `None` when not in game.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn fetch_live_match(&self, puuid: &str, platform: Platform) -> Result<Option<Match>>;
}
