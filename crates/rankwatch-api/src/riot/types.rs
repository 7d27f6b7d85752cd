//! Riot Games API response schemas.
//!
//! Only the fields rankwatch reads are declared; unknown fields are
//! ignored so new API fields never break parsing.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::model::{
    Ladder, Loadout, Match, MatchState, Participant, QueueKind, RiotId, Summoner, SummonerProfile,
    Team,
};
use crate::platform::Platform;
use crate::rank::Rank;

/// Blue side team id.
const BLUE_TEAM_ID: i64 = 100;
/// Red side team id.
const RED_TEAM_ID: i64 = 200;

/// `account-v1` account.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    /// Player id.
    pub puuid: String,
    /// Display name (absent for some legacy accounts).
    #[serde(default)]
    pub game_name: Option<String>,
    /// Tag line.
    #[serde(default)]
    pub tag_line: Option<String>,
}

impl AccountDto {
    /// Converts into a [`RiotId`], using empty strings for missing parts.
    pub fn into_riot_id(self) -> RiotId {
        RiotId {
            game_name: self.game_name.unwrap_or_default(),
            tag_line: self.tag_line.unwrap_or_default(),
        }
    }
}

/// `summoner-v4` summoner.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummonerDto {
    /// Encrypted summoner id.
    #[serde(default)]
    pub id: String,
    /// Profile icon id.
    #[serde(default)]
    pub profile_icon_id: i64,
}

impl From<SummonerDto> for SummonerProfile {
    fn from(dto: SummonerDto) -> Self {
        Self {
            summoner_id: dto.id,
            profile_icon_id: dto.profile_icon_id,
        }
    }
}

/// `league-v4` ladder entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueEntryDto {
    /// Queue tag (`"RANKED_SOLO_5x5"`, `"RANKED_FLEX_SR"`, ...).
    pub queue_type: String,
    /// Tier name.
    #[serde(default)]
    pub tier: String,
    /// Division numeral.
    #[serde(default)]
    pub rank: String,
    /// League points.
    #[serde(default)]
    pub league_points: u32,
}

/// Splits ladder entries into solo and flex ranks.
///
/// Entries for other queues are ignored; a missing queue stays unranked.
pub fn ladder_from_entries(entries: &[LeagueEntryDto]) -> Ladder {
    let mut ladder = Ladder::default();
    for entry in entries {
        let rank = Rank::from_entry(&entry.tier, &entry.rank, entry.league_points);
        match QueueKind::from_ladder_tag(&entry.queue_type) {
            QueueKind::SoloQueue => ladder.solo = rank,
            QueueKind::FlexQueue => ladder.flex = rank,
            QueueKind::Unranked => {}
        }
    }
    ladder
}

/// `match-v5` match.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchDto {
    /// Metadata block.
    pub metadata: MatchMetadataDto,
    /// Game block.
    pub info: MatchInfoDto,
}

/// `match-v5` metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchMetadataDto {
    /// `{PLATFORM}_{gameId}`.
    pub match_id: String,
}

/// `match-v5` info.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfoDto {
    /// Numeric queue id.
    #[serde(default)]
    pub queue_id: i64,
    /// Platform id (`"EUW1"`).
    #[serde(default)]
    pub platform_id: String,
    /// Participants.
    #[serde(default)]
    pub participants: Vec<MatchParticipantDto>,
}

/// `match-v5` participant.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchParticipantDto {
    /// Player id.
    pub puuid: String,
    /// Team id.
    pub team_id: i64,
    /// Champion id.
    pub champion_id: i64,
    /// Display name.
    #[serde(default)]
    pub riot_id_game_name: String,
    /// Tag line.
    #[serde(default, alias = "riotIdTagLine")]
    pub riot_id_tagline: String,
    /// Encrypted summoner id.
    #[serde(default)]
    pub summoner_id: String,
    /// Profile icon id.
    #[serde(default)]
    pub profile_icon: i64,
    /// First summoner spell.
    #[serde(default)]
    pub summoner1_id: i64,
    /// Second summoner spell.
    #[serde(default)]
    pub summoner2_id: i64,
    /// Item slot 0.
    #[serde(default)]
    pub item0: i64,
    /// Item slot 1.
    #[serde(default)]
    pub item1: i64,
    /// Item slot 2.
    #[serde(default)]
    pub item2: i64,
    /// Item slot 3.
    #[serde(default)]
    pub item3: i64,
    /// Item slot 4.
    #[serde(default)]
    pub item4: i64,
    /// Item slot 5.
    #[serde(default)]
    pub item5: i64,
    /// Item slot 6 (trinket).
    #[serde(default)]
    pub item6: i64,
    /// Runes.
    #[serde(default)]
    pub perks: MatchPerksDto,
}

/// `match-v5` runes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchPerksDto {
    /// Primary and secondary trees.
    #[serde(default)]
    pub styles: Vec<MatchPerkStyleDto>,
}

/// `match-v5` rune tree.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchPerkStyleDto {
    /// Tree id.
    #[serde(default)]
    pub style: i64,
    /// Selected runes.
    #[serde(default)]
    pub selections: Vec<MatchPerkSelectionDto>,
}

/// `match-v5` rune selection.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchPerkSelectionDto {
    /// Rune id.
    pub perk: i64,
}

impl MatchDto {
    /// Maps into a finished [`Match`] with unresolved (unranked) players.
    ///
    /// `fallback` is used when the payload carries no known platform id.
    pub fn into_match(self, fallback: Platform) -> Match {
        let platform = self.info.platform_id.parse().unwrap_or(fallback);
        let mut game = Match {
            match_id: self.metadata.match_id,
            queue: QueueKind::from_queue_id(self.info.queue_id),
            state: MatchState::Finished,
            teams: [Team::new(BLUE_TEAM_ID), Team::new(RED_TEAM_ID)],
        };
        for participant in self.info.participants {
            game.push_participant(participant.into_participant(platform));
        }
        game
    }
}

impl MatchParticipantDto {
    fn into_participant(self, platform: Platform) -> Participant {
        let perk_ids = self
            .perks
            .styles
            .iter()
            .flat_map(|style| style.selections.iter().map(|s| s.perk))
            .collect();
        let mut styles = self.perks.styles.iter().map(|style| style.style);
        let perk_style = styles.next().unwrap_or_default();
        let perk_sub_style = styles.next().unwrap_or_default();

        Participant {
            summoner: provisional_summoner(
                self.puuid,
                RiotId {
                    game_name: self.riot_id_game_name,
                    tag_line: self.riot_id_tagline,
                },
                self.summoner_id,
                self.profile_icon,
                platform,
            ),
            champion_id: self.champion_id,
            team_id: self.team_id,
            loadout: Loadout {
                item_ids: vec![
                    self.item0, self.item1, self.item2, self.item3, self.item4, self.item5,
                    self.item6,
                ],
                spell_ids: vec![self.summoner1_id, self.summoner2_id],
                perk_ids,
                perk_style,
                perk_sub_style,
            },
        }
    }
}

/// `spectator-v5` live game.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentGameDto {
    /// Numeric game id.
    pub game_id: i64,
    /// Platform id (`"EUW1"`).
    #[serde(default)]
    pub platform_id: String,
    /// Numeric queue id.
    #[serde(default)]
    pub game_queue_config_id: i64,
    /// Participants.
    #[serde(default)]
    pub participants: Vec<CurrentGameParticipantDto>,
}

/// `spectator-v5` participant.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentGameParticipantDto {
    /// Player id (null for bots).
    #[serde(default)]
    pub puuid: Option<String>,
    /// Team id.
    pub team_id: i64,
    /// Champion id.
    pub champion_id: i64,
    /// `Name#Tag`.
    #[serde(default)]
    pub riot_id: String,
    /// Encrypted summoner id.
    #[serde(default)]
    pub summoner_id: String,
    /// Profile icon id.
    #[serde(default)]
    pub profile_icon_id: i64,
    /// First summoner spell.
    #[serde(default)]
    pub spell1_id: i64,
    /// Second summoner spell.
    #[serde(default)]
    pub spell2_id: i64,
    /// Runes.
    #[serde(default)]
    pub perks: Option<CurrentGamePerksDto>,
}

/// `spectator-v5` runes.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentGamePerksDto {
    /// Selected rune ids.
    #[serde(default)]
    pub perk_ids: Vec<i64>,
    /// Primary tree.
    #[serde(default)]
    pub perk_style: i64,
    /// Secondary tree.
    #[serde(default)]
    pub perk_sub_style: i64,
}

impl CurrentGameDto {
    /// Maps into an ongoing [`Match`] keyed `{PLATFORM}_{gameId}`.
    ///
    /// Participants without a puuid (bots) are skipped.
    pub fn into_match(self, fallback: Platform) -> Match {
        let platform = self.platform_id.parse().unwrap_or(fallback);
        let mut game = Match {
            match_id: Match::match_key(platform, self.game_id),
            queue: QueueKind::from_queue_id(self.game_queue_config_id),
            state: MatchState::Ongoing,
            teams: [Team::new(BLUE_TEAM_ID), Team::new(RED_TEAM_ID)],
        };
        for participant in self.participants {
            let Some(puuid) = participant.puuid else {
                continue;
            };
            let riot_id = RiotId::parse(&participant.riot_id).unwrap_or(RiotId {
                game_name: participant.riot_id,
                tag_line: String::new(),
            });
            let perks = participant.perks.unwrap_or(CurrentGamePerksDto {
                perk_ids: Vec::new(),
                perk_style: 0,
                perk_sub_style: 0,
            });
            game.push_participant(Participant {
                summoner: provisional_summoner(
                    puuid,
                    riot_id,
                    participant.summoner_id,
                    participant.profile_icon_id,
                    platform,
                ),
                champion_id: participant.champion_id,
                team_id: participant.team_id,
                loadout: Loadout {
                    item_ids: Vec::new(),
                    spell_ids: vec![participant.spell1_id, participant.spell2_id],
                    perk_ids: perks.perk_ids,
                    perk_style: perks.perk_style,
                    perk_sub_style: perks.perk_sub_style,
                },
            });
        }
        game
    }
}

/// Summoner built from match data before ranks are resolved.
fn provisional_summoner(
    puuid: String,
    riot_id: RiotId,
    summoner_id: String,
    profile_icon_id: i64,
    platform: Platform,
) -> Summoner {
    Summoner {
        puuid,
        game_name: riot_id.game_name,
        tag_line: riot_id.tag_line,
        summoner_id,
        profile_icon_id,
        solo_rank: Rank::UNRANKED,
        flex_rank: Rank::UNRANKED,
        platform,
        last_checked: DateTime::<Utc>::UNIX_EPOCH,
    }
}
