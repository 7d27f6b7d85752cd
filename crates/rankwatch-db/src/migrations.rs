//! Schema version management using `PRAGMA user_version`.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Current schema version.
const CURRENT_VERSION: u32 = 2;

/// Runs database migrations up to `CURRENT_VERSION`.
///
/// # Errors
///
/// Returns an error if any SQL statement fails.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let version: u32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read user_version")?;

    if version < 1 {
        migrate_v1(conn).context("migration to v1 failed")?;
    }
    if version < 2 {
        migrate_v2(conn).context("migration to v2 failed")?;
    }

    conn.pragma_update(None, "user_version", CURRENT_VERSION)
        .context("failed to update user_version")?;

    Ok(())
}

/// Migration to v1: create `summoners` and `summoner_channels` tables.
///
/// `last_checked` holds unix microseconds so the rotation order is numeric.
fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS summoners (
            puuid            TEXT PRIMARY KEY,
            game_name        TEXT NOT NULL,
            tag_line         TEXT NOT NULL,
            summoner_id      TEXT NOT NULL,
            profile_icon_id  INTEGER NOT NULL DEFAULT 0,
            solo_rank        INTEGER NOT NULL DEFAULT 0,
            flex_rank        INTEGER NOT NULL DEFAULT 0,
            platform         TEXT NOT NULL,
            last_checked     INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS summoner_channels (
            puuid       TEXT NOT NULL REFERENCES summoners(puuid),
            channel_id  TEXT NOT NULL,
            PRIMARY KEY (puuid, channel_id)
        );

        CREATE INDEX IF NOT EXISTS idx_summoners_riot_id
            ON summoners(game_name COLLATE NOCASE, tag_line COLLATE NOCASE);
        CREATE INDEX IF NOT EXISTS idx_summoners_last_checked ON summoners(last_checked);",
    )
    .context("failed to create summoner tables")?;

    Ok(())
}

/// Migration to v2: create the `matches` table.
fn migrate_v2(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS matches (
            match_id  TEXT PRIMARY KEY,
            state     TEXT NOT NULL,
            payload   TEXT NOT NULL
        );",
    )
    .context("failed to create matches table")?;

    Ok(())
}
