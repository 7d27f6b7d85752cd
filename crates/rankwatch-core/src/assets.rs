//! Community Dragon asset URLs.

use rankwatch_api::Tier;

/// Versioned CDN root.
const CDN_BASE_URL: &str = "https://cdn.communitydragon.org/15.1.1";

/// Static ranked emblem directory.
const EMBLEM_BASE_URL: &str = "https://raw.communitydragon.org/latest/plugins/rcp-fe-lol-static-assets/global/default/images/ranked-emblem";

/// Profile icon image.
#[must_use]
pub fn profile_icon_url(profile_icon_id: i64) -> String {
    format!("{CDN_BASE_URL}/profile-icon/{profile_icon_id}")
}

/// Square champion portrait.
#[must_use]
pub fn champion_square_url(champion_id: i64) -> String {
    format!("{CDN_BASE_URL}/champion/{champion_id}/square")
}

/// Ranked emblem of a tier; `None` selects the unranked emblem.
#[must_use]
pub fn rank_emblem_url(tier: Option<Tier>) -> String {
    let name = tier.map_or("unranked", |tier| tier.name()).to_ascii_lowercase();
    format!("{EMBLEM_BASE_URL}/emblem-{name}.png")
}
