//! Summoner, match and queue entities.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platform::Platform;
use crate::rank::Rank;

/// Queue id of ranked solo/duo games.
const SOLO_QUEUE_ID: i64 = 420;
/// Queue id of ranked flex games.
const FLEX_QUEUE_ID: i64 = 440;

/// Ranked ladder a game or ladder entry belongs to.
///
/// Produced once at parse time from the numeric queue id or the ladder
/// queue tag; everything downstream matches on this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueueKind {
    /// Ranked solo/duo.
    SoloQueue,
    /// Ranked flex.
    FlexQueue,
    /// Any other queue.
    Unranked,
}

impl QueueKind {
    /// The two ranked ladders.
    pub const RANKED: [Self; 2] = [Self::SoloQueue, Self::FlexQueue];

    /// Classifies a numeric match queue id.
    #[must_use]
    pub const fn from_queue_id(queue_id: i64) -> Self {
        match queue_id {
            SOLO_QUEUE_ID => Self::SoloQueue,
            FLEX_QUEUE_ID => Self::FlexQueue,
            _ => Self::Unranked,
        }
    }

    /// Classifies a ladder entry queue tag (`"RANKED_SOLO_5x5"`).
    #[must_use]
    pub fn from_ladder_tag(tag: &str) -> Self {
        match tag {
            "RANKED_SOLO_5x5" => Self::SoloQueue,
            "RANKED_FLEX_SR" => Self::FlexQueue,
            _ => Self::Unranked,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SoloQueue => "Solo/Duo",
            Self::FlexQueue => "Flex",
            Self::Unranked => "Unranked",
        }
    }

    /// Returns `true` for the solo and flex ladders.
    #[must_use]
    pub const fn is_ranked(self) -> bool {
        !matches!(self, Self::Unranked)
    }
}

impl fmt::Display for QueueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Riot account name and tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiotId {
    /// Display name.
    pub game_name: String,
    /// Tag line (text after `#`).
    pub tag_line: String,
}

impl RiotId {
    /// Parses `"Name#Tag"`. Returns `None` without a `#`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let (game_name, tag_line) = text.rsplit_once('#')?;
        Some(Self {
            game_name: String::from(game_name),
            tag_line: String::from(tag_line),
        })
    }
}

impl fmt::Display for RiotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.game_name, self.tag_line)
    }
}

/// Platform-scoped summoner record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummonerProfile {
    /// Encrypted summoner id used by the ladder endpoint.
    pub summoner_id: String,
    /// Profile icon id.
    pub profile_icon_id: i64,
}

/// Solo and flex ranks of one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ladder {
    /// Solo/duo rank.
    pub solo: Rank,
    /// Flex rank.
    pub flex: Rank,
}

impl Ladder {
    /// Rank for a queue; unranked queues map to [`Rank::UNRANKED`].
    #[must_use]
    pub const fn rank(&self, queue: QueueKind) -> Rank {
        match queue {
            QueueKind::SoloQueue => self.solo,
            QueueKind::FlexQueue => self.flex,
            QueueKind::Unranked => Rank::UNRANKED,
        }
    }
}

/// A tracked or observed player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summoner {
    /// Stable player id (primary key).
    pub puuid: String,
    /// Display name.
    pub game_name: String,
    /// Tag line.
    pub tag_line: String,
    /// Encrypted summoner id used by the ladder endpoint.
    pub summoner_id: String,
    /// Profile icon id.
    pub profile_icon_id: i64,
    /// Current solo/duo rank.
    pub solo_rank: Rank,
    /// Current flex rank.
    pub flex_rank: Rank,
    /// Platform the summoner plays on.
    pub platform: Platform,
    /// Last time the reconciliation loop checked this summoner.
    pub last_checked: DateTime<Utc>,
}

impl Summoner {
    /// `Name#Tag` display form.
    #[must_use]
    pub fn name_tag(&self) -> String {
        format!("{}#{}", self.game_name, self.tag_line)
    }

    /// Both ranks as a [`Ladder`].
    #[must_use]
    pub const fn ladder(&self) -> Ladder {
        Ladder {
            solo: self.solo_rank,
            flex: self.flex_rank,
        }
    }

    /// Rank for a queue.
    #[must_use]
    pub const fn rank(&self, queue: QueueKind) -> Rank {
        self.ladder().rank(queue)
    }

    /// Replaces both ranks.
    pub fn set_ladder(&mut self, ladder: Ladder) {
        self.solo_rank = ladder.solo;
        self.flex_rank = ladder.flex;
    }

    /// Ranked queues whose rank differs from `ladder`.
    #[must_use]
    pub fn changed_queues(&self, ladder: &Ladder) -> Vec<QueueKind> {
        QueueKind::RANKED
            .into_iter()
            .filter(|&queue| self.rank(queue) != ladder.rank(queue))
            .collect()
    }
}

/// Items, summoner spells and runes of one participant.
///
/// Passed through untouched to whoever renders match visuals.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Loadout {
    /// Item ids (slots 0..=6, 0 = empty).
    #[serde(default)]
    pub item_ids: Vec<i64>,
    /// Summoner spell ids.
    #[serde(default)]
    pub spell_ids: Vec<i64>,
    /// Selected rune ids.
    #[serde(default)]
    pub perk_ids: Vec<i64>,
    /// Primary rune tree.
    #[serde(default)]
    pub perk_style: i64,
    /// Secondary rune tree.
    #[serde(default)]
    pub perk_sub_style: i64,
}

/// One player in a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// The player; ranks are only meaningful once resolved.
    pub summoner: Summoner,
    /// Champion id.
    pub champion_id: i64,
    /// Team id (100 or 200).
    pub team_id: i64,
    /// Items, spells and runes.
    #[serde(default)]
    pub loadout: Loadout,
}

/// One side of a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Team id (100 or 200).
    pub team_id: i64,
    /// Participants in API order.
    pub participants: Vec<Participant>,
}

impl Team {
    /// Creates an empty team.
    #[must_use]
    pub const fn new(team_id: i64) -> Self {
        Self {
            team_id,
            participants: Vec::new(),
        }
    }

    /// Integer mean of the non-zero solo ranks on this team.
    ///
    /// Returns [`Rank::UNRANKED`] when no participant has a solo rank;
    /// callers should read that as "insufficient data".
    #[must_use]
    pub fn average_rank(&self) -> Rank {
        let ranked: Vec<i64> = self
            .participants
            .iter()
            .map(|p| p.summoner.solo_rank)
            .filter(|rank| rank.is_ranked())
            .map(|rank| i64::from(rank.raw()))
            .collect();
        let Ok(count) = i64::try_from(ranked.len()) else {
            return Rank::UNRANKED;
        };
        let mean = ranked
            .iter()
            .sum::<i64>()
            .checked_div(count)
            .and_then(|mean| i32::try_from(mean).ok());
        mean.map_or(Rank::UNRANKED, Rank::from_raw)
    }
}

/// Whether a match is still being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchState {
    /// Live snapshot.
    Ongoing,
    /// Post-game summary.
    Finished,
}

impl MatchState {
    /// Storage tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ongoing => "ongoing",
            Self::Finished => "finished",
        }
    }
}

/// A live or finished match with exactly two teams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// `{PLATFORM}_{gameId}`; shared by the live snapshot and the summary.
    pub match_id: String,
    /// Queue classification.
    pub queue: QueueKind,
    /// Live or finished.
    pub state: MatchState,
    /// Blue side (100) and red side (200).
    pub teams: [Team; 2],
}

impl Match {
    /// Builds the match key from a platform and numeric game id.
    #[must_use]
    pub fn match_key(platform: Platform, game_id: i64) -> String {
        format!("{}_{game_id}", platform.id())
    }

    /// Every participant, blue side first.
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.teams.iter().flat_map(|team| team.participants.iter())
    }

    /// Participant with the given puuid.
    #[must_use]
    pub fn participant(&self, puuid: &str) -> Option<&Participant> {
        self.participants().find(|p| p.summoner.puuid == puuid)
    }

    /// The team of `puuid` and the opposing team.
    #[must_use]
    pub fn sides_of(&self, puuid: &str) -> Option<(&Team, &Team)> {
        let [blue, red] = &self.teams;
        if blue.participants.iter().any(|p| p.summoner.puuid == puuid) {
            Some((blue, red))
        } else if red.participants.iter().any(|p| p.summoner.puuid == puuid) {
            Some((red, blue))
        } else {
            None
        }
    }

    /// Inserts a participant into the side matching its team id.
    ///
    /// Team 200 goes to the red side, everything else to blue.
    pub fn push_participant(&mut self, participant: Participant) {
        let [blue, red] = &mut self.teams;
        if participant.team_id == red.team_id {
            red.participants.push(participant);
        } else {
            blue.participants.push(participant);
        }
    }
}
