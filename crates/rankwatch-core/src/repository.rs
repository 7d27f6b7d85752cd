//! Persistence contract consumed by the scheduler and the use cases.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rankwatch_api::{Match, Summoner};

/// Storage for summoners, matches and notification destinations.
///
/// Writes are upserts keyed by puuid or match id, so replaying a write
/// is harmless. Implementations serialise conflicting writes themselves.
pub trait Repository {
    /// Loads a summoner by puuid.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage query fails.
    fn get_summoner(&self, puuid: &str) -> Result<Option<Summoner>>;

    /// Loads a summoner by display name and tag (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the storage query fails.
    fn find_summoner_by_riot_id(&self, game_name: &str, tag_line: &str)
    -> Result<Option<Summoner>>;

    /// Lists every stored summoner ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage query fails.
    fn list_summoners(&self) -> Result<Vec<Summoner>>;

    /// Inserts or replaces a summoner.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn upsert_summoner(&self, summoner: &Summoner) -> Result<()>;

    /// Advances the last-reconciled timestamp of a summoner.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn touch_summoner(&self, puuid: &str, at: DateTime<Utc>) -> Result<()>;

    /// Returns `true` once a finished summary of the match is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage query fails.
    fn is_match_processed(&self, match_id: &str) -> Result<bool>;

    /// Returns `true` if the match is stored in any state.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage query fails.
    fn is_match_recorded(&self, match_id: &str) -> Result<bool>;

    /// Stores a live match unless already known. Returns `true` when the
    /// row was newly inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn record_live_match(&self, game: &Match) -> Result<bool>;

    /// Replaces the row stored under `old_id` (if any) with the finished
    /// match, marking it processed.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn finalize_match(&self, old_id: &str, game: &Match) -> Result<()>;

    /// Channels that receive events about a summoner.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage query fails.
    fn list_notification_destinations(&self, puuid: &str) -> Result<Vec<String>>;

    /// Registers a channel for a summoner. Returns `false` when the pair
    /// already existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn add_notification_destination(&self, puuid: &str, channel_id: &str) -> Result<bool>;

    /// Removes a channel from a summoner. Returns `false` when the pair did
    /// not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn remove_notification_destination(&self, puuid: &str, channel_id: &str) -> Result<bool>;

    /// Puuid of the least-recently-reconciled summoner that has at least
    /// one destination. Ties are broken by puuid.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage query fails.
    fn oldest_summoner_with_destination(&self) -> Result<Option<String>>;
}
