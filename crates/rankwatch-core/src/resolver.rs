//! Participant resolution for fetched matches.
#![allow(clippy::future_not_send)]

use anyhow::Result;
use rankwatch_api::riot::LocalRiotApi;
use rankwatch_api::{Match, Summoner};
use tracing::instrument;

use crate::repository::Repository;

/// Replaces the provisional participants of a fetched match with resolved
/// summoners.
///
/// `known` (the player being reconciled, with freshly fetched ranks) is used
/// as-is. Stored summoners come from the repository without any API call.
/// Everyone else is resolved through the ladder endpoint and stored. A
/// participant that cannot be resolved is dropped from the match.
#[instrument(skip_all, fields(match_id = %game.match_id))]
pub async fn resolve_match<A, R>(api: &A, repo: &R, mut game: Match, known: Option<&Summoner>) -> Match
where
    A: LocalRiotApi,
    R: Repository,
{
    for team in &mut game.teams {
        let provisional = std::mem::take(&mut team.participants);
        for mut participant in provisional {
            match resolve_participant(api, repo, &participant.summoner, known).await {
                Ok(summoner) => {
                    participant.summoner = summoner;
                    team.participants.push(participant);
                }
                Err(e) => {
                    tracing::warn!(
                        puuid = %participant.summoner.puuid,
                        "Dropping unresolved participant: {e:#}"
                    );
                }
            }
        }
    }
    game
}

async fn resolve_participant<A, R>(
    api: &A,
    repo: &R,
    provisional: &Summoner,
    known: Option<&Summoner>,
) -> Result<Summoner>
where
    A: LocalRiotApi,
    R: Repository,
{
    if let Some(known) = known.filter(|known| known.puuid == provisional.puuid) {
        return Ok(known.clone());
    }
    if let Some(stored) = repo.get_summoner(&provisional.puuid)? {
        return Ok(stored);
    }

    let mut summoner = provisional.clone();
    if summoner.summoner_id.is_empty() {
        let profile = api
            .fetch_summoner(&summoner.puuid, summoner.platform)
            .await?;
        summoner.summoner_id = profile.summoner_id;
        summoner.profile_icon_id = profile.profile_icon_id;
    }
    let ladder = api
        .fetch_rank(&summoner.summoner_id, summoner.platform)
        .await?;
    summoner.set_ladder(ladder);
    repo.upsert_summoner(&summoner)?;
    tracing::debug!(puuid = %summoner.puuid, "Stored new participant");
    Ok(summoner)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::atomic::Ordering;

    use rankwatch_api::{MatchState, QueueKind};

    use super::*;
    use crate::testing::{FakeRiotApi, MemoryRepository, game, summoner};

    #[tokio::test]
    async fn test_stored_summoners_skip_the_api() {
        // Arrange
        let api = FakeRiotApi::default();
        let repo = MemoryRepository::default();
        repo.track(&summoner("a", "GOLD IV 20 LP"), &[]);
        repo.track(&summoner("b", "SILVER I 5 LP"), &[]);
        let raw = game("EUW1_1", QueueKind::SoloQueue, MatchState::Finished, &["a"], &["b"]);

        // Act
        let resolved = resolve_match(&api, &repo, raw, None).await;

        // Assert
        assert_eq!(api.rank_calls.load(Ordering::SeqCst), 0);
        let a = resolved.participant("a").unwrap();
        assert_eq!(a.summoner.solo_rank.to_string(), "GOLD IV 20 LP");
    }

    #[tokio::test]
    async fn test_unknown_participants_are_fetched_and_stored() {
        // Arrange
        let api = FakeRiotApi::default();
        api.set_ladder("sid-c", "PLATINUM II 50 LP", "UNRANKED");
        let repo = MemoryRepository::default();
        let raw = game("EUW1_1", QueueKind::SoloQueue, MatchState::Finished, &["c"], &[]);

        // Act
        let resolved = resolve_match(&api, &repo, raw, None).await;

        // Assert
        let c = resolved.participant("c").unwrap();
        assert_eq!(c.summoner.solo_rank.to_string(), "PLATINUM II 50 LP");
        assert_eq!(repo.stored("c").solo_rank, c.summoner.solo_rank);
    }

    #[tokio::test]
    async fn test_known_summoner_is_reused_without_fetching() {
        // Arrange
        let api = FakeRiotApi::default();
        let repo = MemoryRepository::default();
        let polled = summoner("a", "GOLD IV 45 LP");
        let raw = game("EUW1_1", QueueKind::SoloQueue, MatchState::Finished, &["a"], &[]);

        // Act
        let resolved = resolve_match(&api, &repo, raw, Some(&polled)).await;

        // Assert
        assert_eq!(api.rank_calls.load(Ordering::SeqCst), 0);
        assert_eq!(resolved.participant("a").unwrap().summoner, polled);
    }

    #[tokio::test]
    async fn test_unresolvable_participant_is_dropped() {
        // Arrange
        let api = FakeRiotApi::default();
        api.failing_ladders
            .lock()
            .unwrap()
            .insert(String::from("sid-d"));
        let repo = MemoryRepository::default();
        let raw = game("EUW1_1", QueueKind::SoloQueue, MatchState::Finished, &["c"], &["d"]);

        // Act
        let resolved = resolve_match(&api, &repo, raw, None).await;

        // Assert
        assert!(resolved.participant("c").is_some());
        assert!(resolved.participant("d").is_none());
        assert!(resolved.teams[1].participants.is_empty());
    }
}
