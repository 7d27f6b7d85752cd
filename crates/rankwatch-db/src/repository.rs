//! [`Repository`] implementation over a single `SQLite` connection.

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rankwatch_api::{Match, MatchState, Summoner};
use rankwatch_core::Repository;
use rusqlite::Connection;

use crate::connection::open_db;
use crate::{destinations, matches, summoners};

/// `SQLite`-backed store for summoners, matches and destinations.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Wraps an open, migrated connection.
    #[must_use]
    pub const fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens the database under `dir` (or the default data directory).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(dir: Option<&PathBuf>) -> Result<Self> {
        Ok(Self::new(open_db(dir)?))
    }

    /// Underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Repository for SqliteRepository {
    fn get_summoner(&self, puuid: &str) -> Result<Option<Summoner>> {
        summoners::load_summoner(&self.conn, puuid)
    }

    fn find_summoner_by_riot_id(
        &self,
        game_name: &str,
        tag_line: &str,
    ) -> Result<Option<Summoner>> {
        summoners::find_summoner_by_riot_id(&self.conn, game_name, tag_line)
    }

    fn list_summoners(&self) -> Result<Vec<Summoner>> {
        summoners::load_summoners(&self.conn)
    }

    fn upsert_summoner(&self, summoner: &Summoner) -> Result<()> {
        summoners::upsert_summoner(&self.conn, summoner)
    }

    fn touch_summoner(&self, puuid: &str, at: DateTime<Utc>) -> Result<()> {
        summoners::touch_summoner(&self.conn, puuid, at)
    }

    fn is_match_processed(&self, match_id: &str) -> Result<bool> {
        Ok(matches::match_state(&self.conn, match_id)? == Some(MatchState::Finished))
    }

    fn is_match_recorded(&self, match_id: &str) -> Result<bool> {
        Ok(matches::match_state(&self.conn, match_id)?.is_some())
    }

    fn record_live_match(&self, game: &Match) -> Result<bool> {
        matches::insert_live_match(&self.conn, game)
    }

    fn finalize_match(&self, old_id: &str, game: &Match) -> Result<()> {
        matches::finalize_match(&self.conn, old_id, game)
    }

    fn list_notification_destinations(&self, puuid: &str) -> Result<Vec<String>> {
        destinations::load_destinations(&self.conn, puuid)
    }

    fn add_notification_destination(&self, puuid: &str, channel_id: &str) -> Result<bool> {
        destinations::add_destination(&self.conn, puuid, channel_id)
    }

    fn remove_notification_destination(&self, puuid: &str, channel_id: &str) -> Result<bool> {
        destinations::remove_destination(&self.conn, puuid, channel_id)
    }

    fn oldest_summoner_with_destination(&self) -> Result<Option<String>> {
        summoners::oldest_tracked_summoner(&self.conn)
    }
}
