//! Match storage.
//!
//! A match is stored as a JSON payload keyed by match id. Live snapshots and
//! finished summaries share the same key, so finalising updates the live row.

use anyhow::{Context, Result};
use rankwatch_api::{Match, MatchState};
use rusqlite::{Connection, OptionalExtension};

/// Inserts a live match unless its id is already stored. Returns `true` when
/// a row was inserted.
///
/// # Errors
///
/// Returns an error if serialisation or the database operation fails.
pub fn insert_live_match(conn: &Connection, game: &Match) -> Result<bool> {
    let payload = serde_json::to_string(game)
        .with_context(|| format!("failed to serialise match {}", game.match_id))?;
    let rows = conn
        .execute(
            "INSERT OR IGNORE INTO matches (match_id, state, payload) VALUES (?1, ?2, ?3)",
            [
                game.match_id.as_str(),
                MatchState::Ongoing.as_str(),
                payload.as_str(),
            ],
        )
        .with_context(|| format!("failed to insert live match {}", game.match_id))?;
    Ok(rows > 0)
}

/// Replaces the row stored under `old_id` with the finished match.
///
/// Runs in one transaction; a missing `old_id` row is not an error.
///
/// # Errors
///
/// Returns an error if serialisation or the database operation fails.
pub fn finalize_match(conn: &Connection, old_id: &str, game: &Match) -> Result<()> {
    let mut finished = game.clone();
    finished.state = MatchState::Finished;
    let payload = serde_json::to_string(&finished)
        .with_context(|| format!("failed to serialise match {}", game.match_id))?;

    let tx = conn
        .unchecked_transaction()
        .context("failed to begin transaction")?;
    if old_id != finished.match_id {
        tx.execute("DELETE FROM matches WHERE match_id = ?1", [old_id])
            .with_context(|| format!("failed to delete match {old_id}"))?;
    }
    tx.execute(
        "INSERT INTO matches (match_id, state, payload) VALUES (?1, ?2, ?3)
         ON CONFLICT(match_id) DO UPDATE SET
            state = excluded.state,
            payload = excluded.payload",
        [
            finished.match_id.as_str(),
            MatchState::Finished.as_str(),
            payload.as_str(),
        ],
    )
    .with_context(|| format!("failed to store match {}", finished.match_id))?;
    tx.commit().context("failed to commit match update")?;
    Ok(())
}

/// Stored state of a match, if any.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn match_state(conn: &Connection, match_id: &str) -> Result<Option<MatchState>> {
    let state: Option<String> = conn
        .query_row(
            "SELECT state FROM matches WHERE match_id = ?1",
            [match_id],
            |row| row.get(0),
        )
        .optional()
        .with_context(|| format!("failed to query match {match_id}"))?;
    Ok(state.map(|s| {
        if s == MatchState::Finished.as_str() {
            MatchState::Finished
        } else {
            MatchState::Ongoing
        }
    }))
}

/// Loads a stored match.
///
/// # Errors
///
/// Returns an error if the database query fails or the payload is malformed.
pub fn load_match(conn: &Connection, match_id: &str) -> Result<Option<Match>> {
    let payload: Option<String> = conn
        .query_row(
            "SELECT payload FROM matches WHERE match_id = ?1",
            [match_id],
            |row| row.get(0),
        )
        .optional()
        .with_context(|| format!("failed to load match {match_id}"))?;
    payload
        .map(|p| {
            serde_json::from_str(&p)
                .with_context(|| format!("failed to decode stored match {match_id}"))
        })
        .transpose()
}
