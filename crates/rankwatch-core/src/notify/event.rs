//! Notification events.

use rankwatch_api::{Loadout, QueueKind, Rank, Summoner};
use serde::Serialize;

/// Ladder movement of one player in one queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankChange {
    /// Subject puuid.
    pub puuid: String,
    /// Subject `Name#Tag`.
    pub name_tag: String,
    /// Subject profile icon id.
    pub profile_icon_id: i64,
    /// Affected ladder.
    pub queue: QueueKind,
    /// Rank before the change.
    pub old_rank: Rank,
    /// Rank after the change.
    pub new_rank: Rank,
    /// Current solo/duo rank.
    pub solo_rank: Rank,
    /// Current flex rank.
    pub flex_rank: Rank,
    /// Match the change is attributed to.
    pub match_id: Option<String>,
    /// Champion played in that match.
    pub champion_id: Option<i64>,
    /// Items, spells and runes used in that match.
    pub loadout: Option<Loadout>,
}

impl RankChange {
    /// Builds the event from the stored and the updated summoner.
    #[must_use]
    pub fn new(previous: &Summoner, current: &Summoner, queue: QueueKind) -> Self {
        Self {
            puuid: current.puuid.clone(),
            name_tag: current.name_tag(),
            profile_icon_id: current.profile_icon_id,
            queue,
            old_rank: previous.rank(queue),
            new_rank: current.rank(queue),
            solo_rank: current.solo_rank,
            flex_rank: current.flex_rank,
            match_id: None,
            champion_id: None,
            loadout: None,
        }
    }

    /// Signed point difference.
    #[must_use]
    pub const fn delta(&self) -> i32 {
        Rank::delta(self.old_rank, self.new_rank)
    }

    /// Delta as shown to users (`"+25 LP"`, `"-18 LP"`).
    ///
    /// Placements and drops to unranked have no meaningful point delta and
    /// read `"Placed"` / `"Unranked"` instead.
    #[must_use]
    pub fn delta_label(&self) -> String {
        if self.old_rank == Rank::UNRANKED {
            return String::from("Placed");
        }
        if self.new_rank == Rank::UNRANKED {
            return String::from("Unranked");
        }
        format!("{:+} LP", self.delta())
    }

    /// Returns `true` when the player moved up.
    #[must_use]
    pub const fn is_gain(&self) -> bool {
        self.delta() > 0
    }
}

/// A tracked player entered a ranked game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchStart {
    /// Subject puuid.
    pub puuid: String,
    /// Subject `Name#Tag`.
    pub name_tag: String,
    /// Subject profile icon id.
    pub profile_icon_id: i64,
    /// Live match key.
    pub match_id: String,
    /// Ladder of the match.
    pub queue: QueueKind,
    /// Subject rank in that ladder.
    pub rank: Rank,
    /// Average solo rank of the subject's team.
    pub own_average: Rank,
    /// Average solo rank of the opposing team.
    pub enemy_average: Rank,
    /// Champion picked by the subject.
    pub champion_id: i64,
}

/// Structured event handed to a notification sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationEvent {
    /// Rank moved in one queue.
    RankChanged(RankChange),
    /// Ranked game started.
    MatchStarted(MatchStart),
}

impl NotificationEvent {
    /// Puuid of the player the event is about.
    #[must_use]
    pub fn subject(&self) -> &str {
        match self {
            Self::RankChanged(change) => &change.puuid,
            Self::MatchStarted(start) => &start.puuid,
        }
    }
}
