//! Onboarding and offboarding of tracked summoners.
#![allow(clippy::future_not_send)]

use anyhow::{Context, Result, bail};
use chrono::Utc;
use rankwatch_api::riot::LocalRiotApi;
use rankwatch_api::{DispatchError, Platform, RiotId, Summoner};
use tracing::instrument;

use crate::repository::Repository;

/// Characters rejected in names and tags.
const FORBIDDEN_CHARS: &str = "!@#$%^&*()+=[]{}|\\;:'\",<>/?";

/// Checks a Riot id for characters that never appear in real names.
///
/// Names may contain spaces; tags may not.
///
/// # Errors
///
/// Returns an error if either part is empty or contains a forbidden
/// character.
pub fn validate_riot_id(riot_id: &RiotId) -> Result<()> {
    let name = riot_id.game_name.trim();
    let tag = riot_id.tag_line.trim();
    if name.is_empty() || tag.is_empty() {
        bail!("name and tag must not be empty");
    }
    if name.contains(|c| FORBIDDEN_CHARS.contains(c)) {
        bail!("name contains invalid characters: {name}");
    }
    if tag.contains(|c: char| c.is_whitespace() || FORBIDDEN_CHARS.contains(c)) {
        bail!("tag contains invalid characters: {tag}");
    }
    Ok(())
}

/// Starts tracking a summoner in a channel.
///
/// Reuses the stored summoner when one matches the Riot id; otherwise
/// resolves the account, summoner record and ranks through the API and
/// stores the result. A stored summoner without destinations gets its ranks
/// refreshed first, so tracking starts from current values.
///
/// # Errors
///
/// Returns an error if the Riot id is invalid or unknown, the summoner is
/// already tracked in `channel_id`, or an API or storage call fails.
#[instrument(skip_all, fields(riot_id = %riot_id, channel_id = %channel_id))]
pub async fn onboard<A, R>(
    api: &A,
    repo: &R,
    riot_id: &RiotId,
    platform: Platform,
    channel_id: &str,
) -> Result<Summoner>
where
    A: LocalRiotApi,
    R: Repository,
{
    validate_riot_id(riot_id)?;

    let summoner = match repo.find_summoner_by_riot_id(&riot_id.game_name, &riot_id.tag_line)? {
        Some(stored) => refresh_if_untracked(api, repo, stored).await?,
        None => fetch_new_summoner(api, repo, riot_id, platform).await?,
    };

    if !repo.add_notification_destination(&summoner.puuid, channel_id)? {
        bail!(
            "{} is already tracked in channel {channel_id}",
            summoner.name_tag()
        );
    }
    tracing::info!(
        summoner = %summoner.name_tag(),
        solo_rank = %summoner.solo_rank,
        flex_rank = %summoner.flex_rank,
        "Summoner onboarded"
    );
    Ok(summoner)
}

/// Stops tracking a summoner in a channel. The summoner row is kept.
///
/// # Errors
///
/// Returns an error if the Riot id is invalid, the summoner is unknown or
/// not tracked in `channel_id`, or a storage call fails.
#[instrument(skip_all, fields(riot_id = %riot_id, channel_id = %channel_id))]
pub fn offboard<R: Repository>(repo: &R, riot_id: &RiotId, channel_id: &str) -> Result<Summoner> {
    validate_riot_id(riot_id)?;

    let Some(summoner) = repo.find_summoner_by_riot_id(&riot_id.game_name, &riot_id.tag_line)?
    else {
        bail!("{riot_id} is not tracked");
    };
    if !repo.remove_notification_destination(&summoner.puuid, channel_id)? {
        bail!("{riot_id} is not tracked in channel {channel_id}");
    }
    tracing::info!(summoner = %summoner.name_tag(), "Summoner offboarded");
    Ok(summoner)
}

async fn refresh_if_untracked<A, R>(api: &A, repo: &R, mut stored: Summoner) -> Result<Summoner>
where
    A: LocalRiotApi,
    R: Repository,
{
    if !repo.list_notification_destinations(&stored.puuid)?.is_empty() {
        return Ok(stored);
    }
    let ladder = api
        .fetch_rank(&stored.summoner_id, stored.platform)
        .await
        .context("failed to refresh ranks")?;
    stored.set_ladder(ladder);
    repo.upsert_summoner(&stored)?;
    Ok(stored)
}

async fn fetch_new_summoner<A, R>(
    api: &A,
    repo: &R,
    riot_id: &RiotId,
    platform: Platform,
) -> Result<Summoner>
where
    A: LocalRiotApi,
    R: Repository,
{
    let puuid = match api.resolve_identity(riot_id, platform).await {
        Ok(puuid) => puuid,
        Err(e)
            if e
                .downcast_ref::<DispatchError>()
                .is_some_and(DispatchError::is_not_found) =>
        {
            bail!("Riot account {riot_id} does not exist");
        }
        Err(e) => return Err(e),
    };

    // Renamed accounts are stored under their old name.
    if let Some(stored) = repo.get_summoner(&puuid)? {
        let mut renamed = refresh_if_untracked(api, repo, stored).await?;
        renamed.game_name.clone_from(&riot_id.game_name);
        renamed.tag_line.clone_from(&riot_id.tag_line);
        repo.upsert_summoner(&renamed)?;
        return Ok(renamed);
    }

    let canonical = api
        .fetch_account(&puuid, platform)
        .await
        .context("failed to fetch account")?;
    let profile = api
        .fetch_summoner(&puuid, platform)
        .await
        .context("failed to fetch summoner")?;
    let ladder = api
        .fetch_rank(&profile.summoner_id, platform)
        .await
        .context("failed to fetch ranks")?;

    let summoner = Summoner {
        puuid,
        game_name: canonical.game_name,
        tag_line: canonical.tag_line,
        summoner_id: profile.summoner_id,
        profile_icon_id: profile.profile_icon_id,
        solo_rank: ladder.solo,
        flex_rank: ladder.flex,
        platform,
        last_checked: Utc::now(),
    };
    repo.upsert_summoner(&summoner)?;
    Ok(summoner)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::testing::{FakeRiotApi, MemoryRepository, summoner};

    fn riot_id(text: &str) -> RiotId {
        RiotId::parse(text).unwrap()
    }

    #[test]
    fn test_validate_riot_id() {
        // Arrange & Act & Assert
        assert!(validate_riot_id(&riot_id("Hide on bush#KR1")).is_ok());
        assert!(validate_riot_id(&riot_id("Robert'); DROP#EUW")).is_err());
        assert!(validate_riot_id(&riot_id("Name#E W")).is_err());
        assert!(validate_riot_id(&riot_id("#EUW")).is_err());
    }

    #[tokio::test]
    async fn test_onboard_new_summoner() {
        // Arrange
        let api = FakeRiotApi::default();
        api.add_account("Xayah#EUW", "puuid-x", "sid-x");
        api.set_ladder("sid-x", "GOLD IV 20 LP", "UNRANKED");
        let repo = MemoryRepository::default();

        // Act
        let tracked = onboard(&api, &repo, &riot_id("xayah#euw"), Platform::Euw1, "chan-1")
            .await
            .unwrap();

        // Assert
        assert_eq!(tracked.name_tag(), "Xayah#EUW");
        assert_eq!(tracked.solo_rank.to_string(), "GOLD IV 20 LP");
        assert_eq!(repo.stored("puuid-x").profile_icon_id, 7);
        assert_eq!(
            repo.list_notification_destinations("puuid-x").unwrap(),
            vec![String::from("chan-1")]
        );
        assert_eq!(
            repo.oldest_summoner_with_destination().unwrap().as_deref(),
            Some("puuid-x")
        );
    }

    #[tokio::test]
    async fn test_onboard_same_channel_twice_fails() {
        // Arrange
        let api = FakeRiotApi::default();
        api.add_account("Xayah#EUW", "puuid-x", "sid-x");
        let repo = MemoryRepository::default();
        onboard(&api, &repo, &riot_id("Xayah#EUW"), Platform::Euw1, "chan-1")
            .await
            .unwrap();

        // Act
        let second = onboard(&api, &repo, &riot_id("Xayah#EUW"), Platform::Euw1, "chan-1").await;
        let other_channel =
            onboard(&api, &repo, &riot_id("Xayah#EUW"), Platform::Euw1, "chan-2").await;

        // Assert
        assert!(
            second
                .unwrap_err()
                .to_string()
                .contains("already tracked in channel chan-1")
        );
        assert!(other_channel.is_ok());
    }

    #[tokio::test]
    async fn test_onboard_unknown_account() {
        // Arrange
        let api = FakeRiotApi::default();
        let repo = MemoryRepository::default();

        // Act
        let result = onboard(&api, &repo, &riot_id("Ghost#0000"), Platform::Euw1, "chan-1").await;

        // Assert
        assert!(result.unwrap_err().to_string().contains("does not exist"));
        assert!(repo.list_summoners().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_onboard_refreshes_untracked_stored_summoner() {
        // Arrange
        let api = FakeRiotApi::default();
        api.set_ladder("sid-p", "EMERALD III 33 LP", "UNRANKED");
        let repo = MemoryRepository::default();
        let mut participant = summoner("p", "SILVER I 0 LP");
        participant.game_name = String::from("Pyke");
        repo.track(&participant, &[]);

        // Act
        let tracked = onboard(&api, &repo, &riot_id("Pyke#EUW"), Platform::Euw1, "chan-1")
            .await
            .unwrap();

        // Assert
        assert_eq!(tracked.solo_rank.to_string(), "EMERALD III 33 LP");
        assert_eq!(repo.stored("p").solo_rank, tracked.solo_rank);
    }

    #[tokio::test]
    async fn test_offboard_keeps_summoner_row() {
        // Arrange
        let repo = MemoryRepository::default();
        let mut tracked = summoner("x", "GOLD IV 20 LP");
        tracked.game_name = String::from("Xayah");
        repo.track(&tracked, &["chan-1"]);

        // Act
        let removed = offboard(&repo, &riot_id("Xayah#EUW"), "chan-1").unwrap();
        let again = offboard(&repo, &riot_id("Xayah#EUW"), "chan-1");

        // Assert
        assert_eq!(removed.puuid, "x");
        assert!(again.unwrap_err().to_string().contains("not tracked in channel"));
        assert!(repo.get_summoner("x").unwrap().is_some());
        assert!(repo.oldest_summoner_with_destination().unwrap().is_none());
    }
}
