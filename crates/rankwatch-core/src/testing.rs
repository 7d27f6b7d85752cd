//! In-memory fakes shared by the unit tests of this crate.
#![allow(clippy::unwrap_used)]

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use rankwatch_api::riot::LocalRiotApi;
use rankwatch_api::{
    DispatchError, Ladder, Loadout, Match, MatchState, Participant, Platform, QueueKind, Rank,
    RiotId, Summoner, SummonerProfile, Team,
};

use crate::notify::{LocalNotificationSink, NotificationEvent};
use crate::repository::Repository;

/// Builds a summoner on EUW with the given solo rank text.
pub fn summoner(puuid: &str, solo: &str) -> Summoner {
    Summoner {
        puuid: String::from(puuid),
        game_name: puuid.to_uppercase(),
        tag_line: String::from("EUW"),
        summoner_id: format!("sid-{puuid}"),
        profile_icon_id: 1,
        solo_rank: Rank::parse(solo),
        flex_rank: Rank::UNRANKED,
        platform: Platform::Euw1,
        last_checked: DateTime::<Utc>::UNIX_EPOCH,
    }
}

/// Builds a participant from a summoner.
pub fn participant(summoner: Summoner, team_id: i64, champion_id: i64) -> Participant {
    Participant {
        summoner,
        champion_id,
        team_id,
        loadout: Loadout::default(),
    }
}

/// Builds a match with provisional (unranked) participants.
///
/// `blue` and `red` are puuids; provisional summoners carry no ranks, as
/// the API returns them.
pub fn game(match_id: &str, queue: QueueKind, state: MatchState, blue: &[&str], red: &[&str]) -> Match {
    let mut game = Match {
        match_id: String::from(match_id),
        queue,
        state,
        teams: [Team::new(100), Team::new(200)],
    };
    for (team_id, puuids) in [(100, blue), (200, red)] {
        for (champion_id, puuid) in (1_i64..).zip(puuids.iter()) {
            game.push_participant(participant(summoner(puuid, "UNRANKED"), team_id, champion_id));
        }
    }
    game
}

fn not_found() -> anyhow::Error {
    anyhow::Error::new(DispatchError::NotFound)
}

/// Scriptable Riot API.
#[derive(Debug, Default)]
pub struct FakeRiotApi {
    /// `name#tag` (lowercase) to puuid.
    pub accounts: Mutex<HashMap<String, String>>,
    /// Puuid to canonical Riot id.
    pub identities: Mutex<HashMap<String, RiotId>>,
    /// Puuid to summoner record.
    pub profiles: Mutex<HashMap<String, SummonerProfile>>,
    /// Summoner id to ladder.
    pub ladders: Mutex<HashMap<String, Ladder>>,
    /// Summoner ids whose ladder lookup fails.
    pub failing_ladders: Mutex<HashSet<String>>,
    /// Puuid to latest ranked match id.
    pub latest_matches: Mutex<HashMap<String, String>>,
    /// Finished matches by id.
    pub matches: Mutex<HashMap<String, Match>>,
    /// Puuid to live match.
    pub live_matches: Mutex<HashMap<String, Match>>,
    /// Number of ladder lookups.
    pub rank_calls: AtomicU32,
    /// Number of match lookups.
    pub match_calls: AtomicU32,
    /// Number of live match lookups.
    pub live_calls: AtomicU32,
}

impl FakeRiotApi {
    /// Sets the ladder returned for a summoner id.
    pub fn set_ladder(&self, summoner_id: &str, solo: &str, flex: &str) {
        self.ladders.lock().unwrap().insert(
            String::from(summoner_id),
            Ladder {
                solo: Rank::parse(solo),
                flex: Rank::parse(flex),
            },
        );
    }

    /// Registers a finished match as the latest ranked match of `puuids`.
    pub fn set_latest_match(&self, game: Match, puuids: &[&str]) {
        for puuid in puuids {
            self.latest_matches
                .lock()
                .unwrap()
                .insert(String::from(*puuid), game.match_id.clone());
        }
        self.matches
            .lock()
            .unwrap()
            .insert(game.match_id.clone(), game);
    }

    /// Registers an account resolvable by Riot id.
    pub fn add_account(&self, riot_id: &str, puuid: &str, summoner_id: &str) {
        let parsed = RiotId::parse(riot_id).unwrap();
        self.accounts
            .lock()
            .unwrap()
            .insert(riot_id.to_lowercase(), String::from(puuid));
        self.identities
            .lock()
            .unwrap()
            .insert(String::from(puuid), parsed);
        self.profiles.lock().unwrap().insert(
            String::from(puuid),
            SummonerProfile {
                summoner_id: String::from(summoner_id),
                profile_icon_id: 7,
            },
        );
    }
}

impl LocalRiotApi for FakeRiotApi {
    async fn resolve_identity(&self, riot_id: &RiotId, _platform: Platform) -> Result<String> {
        let key = riot_id.to_string().to_lowercase();
        self.accounts
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn fetch_account(&self, puuid: &str, _platform: Platform) -> Result<RiotId> {
        self.identities
            .lock()
            .unwrap()
            .get(puuid)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn fetch_summoner(&self, puuid: &str, _platform: Platform) -> Result<SummonerProfile> {
        self.profiles
            .lock()
            .unwrap()
            .get(puuid)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn fetch_rank(&self, summoner_id: &str, _platform: Platform) -> Result<Ladder> {
        self.rank_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_ladders.lock().unwrap().contains(summoner_id) {
            bail!("ladder lookup failed for {summoner_id}");
        }
        Ok(self
            .ladders
            .lock()
            .unwrap()
            .get(summoner_id)
            .copied()
            .unwrap_or_default())
    }

    async fn latest_ranked_match_id(
        &self,
        puuid: &str,
        _platform: Platform,
    ) -> Result<Option<String>> {
        Ok(self.latest_matches.lock().unwrap().get(puuid).cloned())
    }

    async fn fetch_match(&self, match_id: &str, _platform: Platform) -> Result<Match> {
        self.match_calls.fetch_add(1, Ordering::SeqCst);
        self.matches
            .lock()
            .unwrap()
            .get(match_id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn fetch_live_match(&self, puuid: &str, _platform: Platform) -> Result<Option<Match>> {
        self.live_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.live_matches.lock().unwrap().get(puuid).cloned())
    }
}

/// Repository backed by ordered maps.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    summoners: Mutex<BTreeMap<String, Summoner>>,
    destinations: Mutex<BTreeSet<(String, String)>>,
    matches: Mutex<BTreeMap<String, Match>>,
    /// Puuids whose upsert fails.
    pub failing_upserts: Mutex<HashSet<String>>,
}

impl MemoryRepository {
    /// Stores a summoner and registers the given channels for it.
    pub fn track(&self, summoner: &Summoner, channels: &[&str]) {
        self.upsert_summoner(summoner).unwrap();
        for channel in channels {
            self.add_notification_destination(&summoner.puuid, channel)
                .unwrap();
        }
    }

    /// Stored match by id.
    pub fn stored_match(&self, match_id: &str) -> Option<Match> {
        self.matches.lock().unwrap().get(match_id).cloned()
    }

    /// Stored summoner by puuid.
    pub fn stored(&self, puuid: &str) -> Summoner {
        self.get_summoner(puuid).unwrap().unwrap()
    }
}

impl Repository for MemoryRepository {
    fn get_summoner(&self, puuid: &str) -> Result<Option<Summoner>> {
        Ok(self.summoners.lock().unwrap().get(puuid).cloned())
    }

    fn find_summoner_by_riot_id(
        &self,
        game_name: &str,
        tag_line: &str,
    ) -> Result<Option<Summoner>> {
        Ok(self
            .summoners
            .lock()
            .unwrap()
            .values()
            .find(|s| {
                s.game_name.eq_ignore_ascii_case(game_name)
                    && s.tag_line.eq_ignore_ascii_case(tag_line)
            })
            .cloned())
    }

    fn list_summoners(&self) -> Result<Vec<Summoner>> {
        Ok(self.summoners.lock().unwrap().values().cloned().collect())
    }

    fn upsert_summoner(&self, summoner: &Summoner) -> Result<()> {
        if self.failing_upserts.lock().unwrap().contains(&summoner.puuid) {
            bail!("write failed for {}", summoner.puuid);
        }
        self.summoners
            .lock()
            .unwrap()
            .insert(summoner.puuid.clone(), summoner.clone());
        Ok(())
    }

    fn touch_summoner(&self, puuid: &str, at: DateTime<Utc>) -> Result<()> {
        if let Some(summoner) = self.summoners.lock().unwrap().get_mut(puuid) {
            summoner.last_checked = at;
        }
        Ok(())
    }

    fn is_match_processed(&self, match_id: &str) -> Result<bool> {
        Ok(self
            .matches
            .lock()
            .unwrap()
            .get(match_id)
            .is_some_and(|game| game.state == MatchState::Finished))
    }

    fn is_match_recorded(&self, match_id: &str) -> Result<bool> {
        Ok(self.matches.lock().unwrap().contains_key(match_id))
    }

    fn record_live_match(&self, game: &Match) -> Result<bool> {
        let mut matches = self.matches.lock().unwrap();
        if matches.contains_key(&game.match_id) {
            return Ok(false);
        }
        matches.insert(game.match_id.clone(), game.clone());
        Ok(true)
    }

    fn finalize_match(&self, old_id: &str, game: &Match) -> Result<()> {
        let mut matches = self.matches.lock().unwrap();
        matches.remove(old_id);
        let mut finished = game.clone();
        finished.state = MatchState::Finished;
        matches.insert(finished.match_id.clone(), finished);
        Ok(())
    }

    fn list_notification_destinations(&self, puuid: &str) -> Result<Vec<String>> {
        Ok(self
            .destinations
            .lock()
            .unwrap()
            .iter()
            .filter(|(owner, _)| owner == puuid)
            .map(|(_, channel)| channel.clone())
            .collect())
    }

    fn add_notification_destination(&self, puuid: &str, channel_id: &str) -> Result<bool> {
        Ok(self
            .destinations
            .lock()
            .unwrap()
            .insert((String::from(puuid), String::from(channel_id))))
    }

    fn remove_notification_destination(&self, puuid: &str, channel_id: &str) -> Result<bool> {
        Ok(self
            .destinations
            .lock()
            .unwrap()
            .remove(&(String::from(puuid), String::from(channel_id))))
    }

    fn oldest_summoner_with_destination(&self) -> Result<Option<String>> {
        let destinations = self.destinations.lock().unwrap();
        Ok(self
            .summoners
            .lock()
            .unwrap()
            .values()
            .filter(|s| destinations.iter().any(|(owner, _)| *owner == s.puuid))
            .min_by(|a, b| {
                a.last_checked
                    .cmp(&b.last_checked)
                    .then_with(|| a.puuid.cmp(&b.puuid))
            })
            .map(|s| s.puuid.clone()))
    }
}

/// Sink that records every delivered event.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(String, NotificationEvent)>>,
    /// Destinations that reject every event.
    pub failing: Mutex<HashSet<String>>,
}

impl RecordingSink {
    /// Delivered `(destination, event)` pairs in order.
    pub fn events(&self) -> Vec<(String, NotificationEvent)> {
        self.events.lock().unwrap().clone()
    }
}

impl LocalNotificationSink for RecordingSink {
    async fn emit(&self, destination: &str, event: &NotificationEvent) -> Result<()> {
        if self.failing.lock().unwrap().contains(destination) {
            bail!("destination {destination} rejected the event");
        }
        self.events
            .lock()
            .unwrap()
            .push((String::from(destination), event.clone()));
        Ok(())
    }
}
