//! Ladder rank codec.
//!
//! A [`Rank`] packs a ladder position and its league points into one
//! ordered integer: `ladder_index * 100 + points`. Index 0 is reserved for
//! "no rank yet", indices 1..=28 cover Iron IV through Diamond I, and the
//! three apex tiers (Master, Grandmaster, Challenger) take 29..=31 with a
//! single division each.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Highest league-points value a [`Rank`] can carry.
pub const MAX_POINTS: u16 = 99;

/// Highest ladder index (Challenger).
pub const MAX_LADDER_INDEX: u8 = 31;

/// Number of tiers that are split into four divisions.
const DIVIDED_TIERS: u8 = 7;

/// First ladder index used by the apex tiers.
const APEX_BASE_INDEX: u8 = 29;

/// Display text of the zero rank.
const UNRANKED_TEXT: &str = "UNRANKED";

/// Competitive tier, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    /// Iron.
    Iron,
    /// Bronze.
    Bronze,
    /// Silver.
    Silver,
    /// Gold.
    Gold,
    /// Platinum.
    Platinum,
    /// Emerald.
    Emerald,
    /// Diamond.
    Diamond,
    /// Master (apex, single division).
    Master,
    /// Grandmaster (apex, single division).
    Grandmaster,
    /// Challenger (apex, single division).
    Challenger,
}

impl Tier {
    /// All tiers from lowest to highest.
    pub const ALL: [Self; 10] = [
        Self::Iron,
        Self::Bronze,
        Self::Silver,
        Self::Gold,
        Self::Platinum,
        Self::Emerald,
        Self::Diamond,
        Self::Master,
        Self::Grandmaster,
        Self::Challenger,
    ];

    /// Upper-case name as used by the ladder API (`"GOLD"`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Iron => "IRON",
            Self::Bronze => "BRONZE",
            Self::Silver => "SILVER",
            Self::Gold => "GOLD",
            Self::Platinum => "PLATINUM",
            Self::Emerald => "EMERALD",
            Self::Diamond => "DIAMOND",
            Self::Master => "MASTER",
            Self::Grandmaster => "GRANDMASTER",
            Self::Challenger => "CHALLENGER",
        }
    }

    /// Returns `true` for tiers without divisions.
    #[must_use]
    pub const fn is_apex(self) -> bool {
        matches!(self, Self::Master | Self::Grandmaster | Self::Challenger)
    }

    /// Parses a tier name, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.name().eq_ignore_ascii_case(name))
    }

    /// Zero-based position in [`Tier::ALL`].
    const fn ordinal(self) -> u8 {
        match self {
            Self::Iron => 0,
            Self::Bronze => 1,
            Self::Silver => 2,
            Self::Gold => 3,
            Self::Platinum => 4,
            Self::Emerald => 5,
            Self::Diamond => 6,
            Self::Master => 7,
            Self::Grandmaster => 8,
            Self::Challenger => 9,
        }
    }
}

/// Division within a tier, ordered from lowest (IV) to highest (I).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Division {
    /// Division IV.
    Four,
    /// Division III.
    Three,
    /// Division II.
    Two,
    /// Division I.
    One,
}

impl Division {
    /// All divisions from lowest to highest.
    pub const ALL: [Self; 4] = [Self::Four, Self::Three, Self::Two, Self::One];

    /// Roman numeral as used by the ladder API (`"IV"`).
    #[must_use]
    pub const fn numeral(self) -> &'static str {
        match self {
            Self::Four => "IV",
            Self::Three => "III",
            Self::Two => "II",
            Self::One => "I",
        }
    }

    /// Parses a Roman numeral, ignoring ASCII case.
    #[must_use]
    pub fn from_numeral(numeral: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|division| division.numeral().eq_ignore_ascii_case(numeral))
    }

    /// Zero-based step within a tier (IV = 0, I = 3).
    const fn step(self) -> u8 {
        match self {
            Self::Four => 0,
            Self::Three => 1,
            Self::Two => 2,
            Self::One => 3,
        }
    }
}

/// Ladder position packed as `ladder_index * 100 + points`.
///
/// The derived ordering matches ladder order; `Rank::UNRANKED` (0) sorts
/// below every ranked value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Rank(i32);

impl Rank {
    /// The "no rank yet" value.
    pub const UNRANKED: Self = Self(0);

    /// Wraps a stored integer without validation.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the packed integer.
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Encodes a ladder index (1..=31) and league points.
    ///
    /// Points above [`MAX_POINTS`] are clamped. An index of 0 or above
    /// [`MAX_LADDER_INDEX`] yields [`Rank::UNRANKED`].
    #[must_use]
    pub fn encode(ladder_index: u8, points: u16) -> Self {
        if ladder_index == 0 || ladder_index > MAX_LADDER_INDEX {
            return Self::UNRANKED;
        }
        let points = points.min(MAX_POINTS);
        Self(
            i32::from(ladder_index)
                .saturating_mul(100)
                .saturating_add(i32::from(points)),
        )
    }

    /// Encodes a tier, division and league points.
    ///
    /// The division is ignored for apex tiers.
    #[must_use]
    pub fn from_parts(tier: Tier, division: Division, points: u16) -> Self {
        Self::encode(ladder_index(tier, division), points)
    }

    /// Decodes into tier, division and points.
    ///
    /// Returns `None` for the unranked value and for integers outside the
    /// encoded range.
    #[must_use]
    pub fn decode(self) -> Option<(Tier, Division, u16)> {
        let index = u8::try_from(self.0.checked_div(100)?).ok()?;
        let points = u16::try_from(self.0.checked_rem(100)?).ok()?;
        if index == 0 || index > MAX_LADDER_INDEX {
            return None;
        }
        if index >= APEX_BASE_INDEX {
            let offset = usize::from(index.checked_sub(APEX_BASE_INDEX)?);
            let tier = *Tier::ALL.get(usize::from(DIVIDED_TIERS).checked_add(offset)?)?;
            return Some((tier, Division::One, points));
        }
        let zero_based = index.checked_sub(1)?;
        let tier = *Tier::ALL.get(usize::from(zero_based.checked_div(4)?))?;
        let division = *Division::ALL.get(usize::from(zero_based.checked_rem(4)?))?;
        Some((tier, division, points))
    }

    /// Best-effort conversion of a ladder entry (`"GOLD"`, `"IV"`, 20).
    ///
    /// Unknown tier or division text yields [`Rank::UNRANKED`].
    #[must_use]
    pub fn from_entry(tier: &str, division: &str, points: u32) -> Self {
        let Some(tier) = Tier::from_name(tier) else {
            return Self::UNRANKED;
        };
        let division = if tier.is_apex() {
            Some(Division::One)
        } else {
            Division::from_numeral(division)
        };
        let Some(division) = division else {
            return Self::UNRANKED;
        };
        let points = u16::try_from(points).unwrap_or(u16::MAX);
        Self::from_parts(tier, division, points)
    }

    /// Parses display text such as `"GOLD IV 20 LP"`.
    ///
    /// Malformed or unrecognised text yields [`Rank::UNRANKED`].
    #[must_use]
    pub fn parse(text: &str) -> Self {
        parse_display(text).unwrap_or(Self::UNRANKED)
    }

    /// Returns `true` for any value other than [`Rank::UNRANKED`].
    #[must_use]
    pub const fn is_ranked(self) -> bool {
        self.0 > 0
    }

    /// Tier of a ranked value.
    #[must_use]
    pub fn tier(self) -> Option<Tier> {
        self.decode().map(|(tier, _, _)| tier)
    }

    /// Signed point difference from `old` to `new`.
    #[must_use]
    pub const fn delta(old: Self, new: Self) -> i32 {
        new.0.saturating_sub(old.0)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.decode() {
            Some((tier, division, points)) => {
                write!(f, "{} {} {points} LP", tier.name(), division.numeral())
            }
            None => f.write_str(UNRANKED_TEXT),
        }
    }
}

impl FromStr for Rank {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Ladder index of a tier and division.
#[allow(clippy::arithmetic_side_effects)]
const fn ladder_index(tier: Tier, division: Division) -> u8 {
    if tier.is_apex() {
        APEX_BASE_INDEX + (tier.ordinal() - DIVIDED_TIERS)
    } else {
        tier.ordinal() * 4 + division.step() + 1
    }
}

/// Strict parser behind [`Rank::parse`].
fn parse_display(text: &str) -> Option<Rank> {
    let mut words = text.split_whitespace();
    let tier_word = words.next()?;
    if tier_word.eq_ignore_ascii_case(UNRANKED_TEXT) {
        return words.next().is_none().then_some(Rank::UNRANKED);
    }

    let tier = Tier::from_name(tier_word)?;
    let division = Division::from_numeral(words.next()?)?;
    let points: u16 = words.next()?.parse().ok()?;
    let suffix = words.next()?;
    if !suffix.eq_ignore_ascii_case("LP") || words.next().is_some() || points > MAX_POINTS {
        return None;
    }
    if tier.is_apex() && division != Division::One {
        return None;
    }
    Some(Rank::from_parts(tier, division, points))
}
