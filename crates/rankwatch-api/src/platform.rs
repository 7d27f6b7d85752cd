//! Riot platform and regional routing values.

use std::fmt;
use std::str::FromStr;

use anyhow::{Error, bail};
use serde::{Deserialize, Serialize};

/// Platform (shard) a summoner plays on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Platform {
    /// Brazil.
    Br1,
    /// Europe Nordic & East.
    Eun1,
    /// Europe West.
    Euw1,
    /// Japan.
    Jp1,
    /// Korea.
    Kr,
    /// Latin America North.
    La1,
    /// Latin America South.
    La2,
    /// North America.
    Na1,
    /// Oceania.
    Oc1,
    /// Turkey.
    Tr1,
    /// Russia.
    Ru,
    /// Singapore.
    Sg2,
    /// Taiwan.
    Tw2,
    /// Vietnam.
    Vn2,
}

/// Regional routing value used by account and match endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionalRoute {
    /// Americas.
    Americas,
    /// Asia.
    Asia,
    /// Europe.
    Europe,
    /// South East Asia.
    Sea,
}

impl Platform {
    /// Every supported platform.
    pub const ALL: [Self; 14] = [
        Self::Br1,
        Self::Eun1,
        Self::Euw1,
        Self::Jp1,
        Self::Kr,
        Self::La1,
        Self::La2,
        Self::Na1,
        Self::Oc1,
        Self::Tr1,
        Self::Ru,
        Self::Sg2,
        Self::Tw2,
        Self::Vn2,
    ];

    /// Platform id as it appears in match ids (`"EUW1"`).
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Br1 => "BR1",
            Self::Eun1 => "EUN1",
            Self::Euw1 => "EUW1",
            Self::Jp1 => "JP1",
            Self::Kr => "KR",
            Self::La1 => "LA1",
            Self::La2 => "LA2",
            Self::Na1 => "NA1",
            Self::Oc1 => "OC1",
            Self::Tr1 => "TR1",
            Self::Ru => "RU",
            Self::Sg2 => "SG2",
            Self::Tw2 => "TW2",
            Self::Vn2 => "VN2",
        }
    }

    /// API host serving platform-scoped endpoints.
    #[must_use]
    pub const fn host(self) -> &'static str {
        match self {
            Self::Br1 => "br1.api.riotgames.com",
            Self::Eun1 => "eun1.api.riotgames.com",
            Self::Euw1 => "euw1.api.riotgames.com",
            Self::Jp1 => "jp1.api.riotgames.com",
            Self::Kr => "kr.api.riotgames.com",
            Self::La1 => "la1.api.riotgames.com",
            Self::La2 => "la2.api.riotgames.com",
            Self::Na1 => "na1.api.riotgames.com",
            Self::Oc1 => "oc1.api.riotgames.com",
            Self::Tr1 => "tr1.api.riotgames.com",
            Self::Ru => "ru.api.riotgames.com",
            Self::Sg2 => "sg2.api.riotgames.com",
            Self::Tw2 => "tw2.api.riotgames.com",
            Self::Vn2 => "vn2.api.riotgames.com",
        }
    }

    /// Regional route for match endpoints.
    #[must_use]
    pub const fn match_route(self) -> RegionalRoute {
        match self {
            Self::Br1 | Self::La1 | Self::La2 | Self::Na1 => RegionalRoute::Americas,
            Self::Jp1 | Self::Kr => RegionalRoute::Asia,
            Self::Eun1 | Self::Euw1 | Self::Tr1 | Self::Ru => RegionalRoute::Europe,
            Self::Oc1 | Self::Sg2 | Self::Tw2 | Self::Vn2 => RegionalRoute::Sea,
        }
    }

    /// Regional route for account endpoints (no SEA cluster there).
    #[must_use]
    pub const fn account_route(self) -> RegionalRoute {
        match self.match_route() {
            RegionalRoute::Sea => RegionalRoute::Asia,
            route => route,
        }
    }

    /// Extracts the platform prefix of a match id (`"EUW1_6712345678"`).
    #[must_use]
    pub fn from_match_id(match_id: &str) -> Option<Self> {
        let (prefix, _) = match_id.split_once('_')?;
        prefix.parse().ok()
    }
}

impl RegionalRoute {
    /// API host serving regional endpoints.
    #[must_use]
    pub const fn host(self) -> &'static str {
        match self {
            Self::Americas => "americas.api.riotgames.com",
            Self::Asia => "asia.api.riotgames.com",
            Self::Europe => "europe.api.riotgames.com",
            Self::Sea => "sea.api.riotgames.com",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(platform) = Self::ALL
            .into_iter()
            .find(|platform| platform.id().eq_ignore_ascii_case(s.trim()))
        else {
            bail!("unknown platform: {s}");
        };
        Ok(platform)
    }
}
