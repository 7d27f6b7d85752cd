//! Summoner CRUD operations.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rankwatch_api::{Platform, Rank, Summoner};
use rusqlite::{Connection, OptionalExtension, Row};

const SUMMONER_COLUMNS: &str = "puuid, game_name, tag_line, summoner_id, profile_icon_id,
     solo_rank, flex_rank, platform, last_checked";

/// A summoner row as stored.
struct SummonerRow {
    puuid: String,
    game_name: String,
    tag_line: String,
    summoner_id: String,
    profile_icon_id: i64,
    solo_rank: i32,
    flex_rank: i32,
    platform: String,
    last_checked: i64,
}

impl SummonerRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            puuid: row.get(0)?,
            game_name: row.get(1)?,
            tag_line: row.get(2)?,
            summoner_id: row.get(3)?,
            profile_icon_id: row.get(4)?,
            solo_rank: row.get(5)?,
            flex_rank: row.get(6)?,
            platform: row.get(7)?,
            last_checked: row.get(8)?,
        })
    }

    fn into_summoner(self) -> Result<Summoner> {
        let platform: Platform = self
            .platform
            .parse()
            .with_context(|| format!("invalid platform for summoner {}", self.puuid))?;
        let last_checked = DateTime::<Utc>::from_timestamp_micros(self.last_checked)
            .with_context(|| format!("invalid last_checked for summoner {}", self.puuid))?;
        Ok(Summoner {
            puuid: self.puuid,
            game_name: self.game_name,
            tag_line: self.tag_line,
            summoner_id: self.summoner_id,
            profile_icon_id: self.profile_icon_id,
            solo_rank: Rank::from_raw(self.solo_rank),
            flex_rank: Rank::from_raw(self.flex_rank),
            platform,
            last_checked,
        })
    }
}

/// Inserts a summoner or replaces every column of the stored row.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn upsert_summoner(conn: &Connection, summoner: &Summoner) -> Result<()> {
    conn.execute(
        "INSERT INTO summoners (
            puuid, game_name, tag_line, summoner_id, profile_icon_id,
            solo_rank, flex_rank, platform, last_checked
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(puuid) DO UPDATE SET
            game_name = excluded.game_name,
            tag_line = excluded.tag_line,
            summoner_id = excluded.summoner_id,
            profile_icon_id = excluded.profile_icon_id,
            solo_rank = excluded.solo_rank,
            flex_rank = excluded.flex_rank,
            platform = excluded.platform,
            last_checked = excluded.last_checked",
        rusqlite::params![
            summoner.puuid,
            summoner.game_name,
            summoner.tag_line,
            summoner.summoner_id,
            summoner.profile_icon_id,
            summoner.solo_rank.raw(),
            summoner.flex_rank.raw(),
            summoner.platform.id(),
            summoner.last_checked.timestamp_micros(),
        ],
    )
    .with_context(|| format!("failed to upsert summoner {}", summoner.puuid))?;
    Ok(())
}

/// Loads a summoner by puuid.
///
/// # Errors
///
/// Returns an error if the database query fails or the row is malformed.
pub fn load_summoner(conn: &Connection, puuid: &str) -> Result<Option<Summoner>> {
    let row = conn
        .query_row(
            &format!("SELECT {SUMMONER_COLUMNS} FROM summoners WHERE puuid = ?1"),
            [puuid],
            SummonerRow::from_row,
        )
        .optional()
        .with_context(|| format!("failed to load summoner {puuid}"))?;
    row.map(SummonerRow::into_summoner).transpose()
}

/// Loads a summoner by name and tag, ignoring ASCII case.
///
/// # Errors
///
/// Returns an error if the database query fails or the row is malformed.
pub fn find_summoner_by_riot_id(
    conn: &Connection,
    game_name: &str,
    tag_line: &str,
) -> Result<Option<Summoner>> {
    let row = conn
        .query_row(
            &format!(
                "SELECT {SUMMONER_COLUMNS} FROM summoners
                 WHERE game_name = ?1 COLLATE NOCASE AND tag_line = ?2 COLLATE NOCASE
                 ORDER BY puuid
                 LIMIT 1"
            ),
            [game_name, tag_line],
            SummonerRow::from_row,
        )
        .optional()
        .with_context(|| format!("failed to find summoner {game_name}#{tag_line}"))?;
    row.map(SummonerRow::into_summoner).transpose()
}

/// Loads every summoner ordered by name and tag.
///
/// # Errors
///
/// Returns an error if the database query fails or a row is malformed.
pub fn load_summoners(conn: &Connection) -> Result<Vec<Summoner>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {SUMMONER_COLUMNS} FROM summoners
             ORDER BY game_name COLLATE NOCASE, tag_line COLLATE NOCASE"
        ))
        .context("failed to prepare summoners query")?;

    let rows = stmt
        .query_map([], SummonerRow::from_row)
        .context("failed to query summoners")?;

    let mut result = Vec::new();
    for row in rows {
        let row = row.context("failed to read summoner row")?;
        result.push(row.into_summoner()?);
    }
    Ok(result)
}

/// Sets the last-reconciled timestamp. Unknown puuids are ignored.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn touch_summoner(conn: &Connection, puuid: &str, at: DateTime<Utc>) -> Result<()> {
    conn.execute(
        "UPDATE summoners SET last_checked = ?2 WHERE puuid = ?1",
        rusqlite::params![puuid, at.timestamp_micros()],
    )
    .with_context(|| format!("failed to touch summoner {puuid}"))?;
    Ok(())
}

/// Puuid of the least-recently-checked summoner with at least one channel.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn oldest_tracked_summoner(conn: &Connection) -> Result<Option<String>> {
    conn.query_row(
        "SELECT s.puuid FROM summoners s
         WHERE EXISTS (SELECT 1 FROM summoner_channels c WHERE c.puuid = s.puuid)
         ORDER BY s.last_checked, s.puuid
         LIMIT 1",
        [],
        |row| row.get(0),
    )
    .optional()
    .context("failed to query oldest tracked summoner")
}
