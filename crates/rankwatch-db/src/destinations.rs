//! Notification destination (summoner to channel) mappings.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Maps a channel to a summoner. Returns `false` if the pair already exists.
///
/// # Errors
///
/// Returns an error if the database operation fails, including when the
/// summoner is not stored.
pub fn add_destination(conn: &Connection, puuid: &str, channel_id: &str) -> Result<bool> {
    let rows = conn
        .execute(
            "INSERT OR IGNORE INTO summoner_channels (puuid, channel_id) VALUES (?1, ?2)",
            [puuid, channel_id],
        )
        .with_context(|| format!("failed to add channel {channel_id} for {puuid}"))?;
    Ok(rows > 0)
}

/// Removes a channel mapping. Returns `false` if the pair did not exist.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn remove_destination(conn: &Connection, puuid: &str, channel_id: &str) -> Result<bool> {
    let rows = conn
        .execute(
            "DELETE FROM summoner_channels WHERE puuid = ?1 AND channel_id = ?2",
            [puuid, channel_id],
        )
        .with_context(|| format!("failed to remove channel {channel_id} for {puuid}"))?;
    Ok(rows > 0)
}

/// Loads the channels of a summoner ordered by channel id.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn load_destinations(conn: &Connection, puuid: &str) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT channel_id FROM summoner_channels WHERE puuid = ?1 ORDER BY channel_id")
        .context("failed to prepare destinations query")?;

    let rows = stmt
        .query_map([puuid], |row| row.get(0))
        .context("failed to query destinations")?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row.context("failed to read destination row")?);
    }
    Ok(result)
}
