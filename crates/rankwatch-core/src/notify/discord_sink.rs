use anyhow::Result;
use rankwatch_api::discord::{CreateMessage, DiscordClient, Embed};
use rankwatch_api::{QueueKind, Rank};

use super::{LocalNotificationSink, MatchStart, NotificationEvent, RankChange};
use crate::assets;

/// Embed colour for gains.
const GAIN_COLOR: u32 = 0x00ff_00;
/// Embed colour for losses.
const LOSS_COLOR: u32 = 0xff_0000;
/// Embed colour for match announcements.
const MATCH_COLOR: u32 = 0x5865_f2;

/// Sink that posts one embed message per event to a Discord channel.
#[derive(Debug)]
pub struct DiscordSink {
    client: DiscordClient,
}

impl DiscordSink {
    /// Wraps a Discord client.
    #[must_use]
    pub const fn new(client: DiscordClient) -> Self {
        Self { client }
    }
}

impl LocalNotificationSink for DiscordSink {
    async fn emit(&self, destination: &str, event: &NotificationEvent) -> Result<()> {
        let embed = match event {
            NotificationEvent::RankChanged(change) => rank_change_embed(change),
            NotificationEvent::MatchStarted(start) => match_start_embed(start),
        };
        self.client
            .send_message(destination, &CreateMessage::embed(embed))
            .await
    }
}

/// `"Solo/Duo-Rank Update | +25 LP"` with both current ranks.
fn rank_change_embed(change: &RankChange) -> Embed {
    let color = if change.is_gain() {
        GAIN_COLOR
    } else {
        LOSS_COLOR
    };
    let mut embed = Embed::default()
        .author(
            change.name_tag.clone(),
            assets::profile_icon_url(change.profile_icon_id),
        )
        .title(format!(
            "{}-Rank Update | {}",
            change.queue,
            change.delta_label()
        ))
        .inline_field(
            format!("{}-Rank", QueueKind::SoloQueue),
            change.solo_rank.to_string(),
        )
        .inline_field(
            format!("{}-Rank", QueueKind::FlexQueue),
            change.flex_rank.to_string(),
        )
        .thumbnail(assets::rank_emblem_url(change.new_rank.tier()))
        .color(color);
    if let Some(champion_id) = change.champion_id {
        embed = embed.footer(
            change.match_id.clone().unwrap_or_default(),
            assets::champion_square_url(champion_id),
        );
    }
    embed
}

/// `"A Flex-Match has started!"` with both team averages.
fn match_start_embed(start: &MatchStart) -> Embed {
    Embed::default()
        .author(start.rank.to_string(), assets::rank_emblem_url(start.rank.tier()))
        .title(format!("A {}-Match has started!", start.queue))
        .inline_field("Your Team Average Rank", average_label(start.own_average))
        .inline_field("Enemy Team Average Rank", average_label(start.enemy_average))
        .thumbnail(assets::champion_square_url(start.champion_id))
        .footer(
            start.name_tag.clone(),
            assets::profile_icon_url(start.profile_icon_id),
        )
        .color(MATCH_COLOR)
}

/// Team averages without any ranked player carry no information.
fn average_label(average: Rank) -> String {
    if average.is_ranked() {
        average.to_string()
    } else {
        String::from("Insufficient data")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use std::time::Duration;

    use super::*;

    fn change(old: &str, new: &str) -> RankChange {
        RankChange {
            puuid: String::from("puuid-x"),
            name_tag: String::from("Xayah#EUW"),
            profile_icon_id: 29,
            queue: QueueKind::SoloQueue,
            old_rank: Rank::parse(old),
            new_rank: Rank::parse(new),
            solo_rank: Rank::parse(new),
            flex_rank: Rank::UNRANKED,
            match_id: Some(String::from("EUW1_1")),
            champion_id: Some(103),
            loadout: None,
        }
    }

    #[test]
    fn test_rank_change_embed() {
        // Arrange & Act
        let embed = rank_change_embed(&change("GOLD IV 20 LP", "GOLD IV 45 LP"));

        // Assert
        assert_eq!(embed.title.as_deref(), Some("Solo/Duo-Rank Update | +25 LP"));
        assert_eq!(embed.color, Some(GAIN_COLOR));
        assert_eq!(embed.fields.len(), 2);
        assert_eq!(embed.fields[0].value, "GOLD IV 45 LP");
        assert_eq!(embed.fields[1].value, "UNRANKED");
        assert!(
            embed
                .thumbnail
                .unwrap()
                .url
                .ends_with("/emblem-gold.png")
        );
    }

    #[test]
    fn test_loss_uses_loss_color() {
        // Arrange & Act
        let embed = rank_change_embed(&change("GOLD IV 20 LP", "IRON I 90 LP"));

        // Assert
        assert_eq!(embed.color, Some(LOSS_COLOR));
    }

    #[test]
    fn test_placement_embed_title() {
        // Arrange & Act
        let embed = rank_change_embed(&change("UNRANKED", "GOLD IV 20 LP"));

        // Assert
        assert_eq!(embed.title.as_deref(), Some("Solo/Duo-Rank Update | Placed"));
        assert_eq!(embed.color, Some(GAIN_COLOR));
    }

    #[test]
    fn test_match_start_embed_marks_missing_average() {
        // Arrange
        let start = MatchStart {
            puuid: String::from("puuid-x"),
            name_tag: String::from("Xayah#EUW"),
            profile_icon_id: 29,
            match_id: String::from("EUW1_2"),
            queue: QueueKind::FlexQueue,
            rank: Rank::parse("SILVER II 40 LP"),
            own_average: Rank::parse("SILVER I 10 LP"),
            enemy_average: Rank::UNRANKED,
            champion_id: 498,
        };

        // Act
        let embed = match_start_embed(&start);

        // Assert
        assert_eq!(embed.title.as_deref(), Some("A Flex-Match has started!"));
        assert_eq!(embed.fields[0].value, "SILVER I 10 LP");
        assert_eq!(embed.fields[1].value, "Insufficient data");
        assert_eq!(embed.footer.unwrap().text, "Xayah#EUW");
    }

    #[tokio::test]
    async fn test_emit_posts_to_destination_channel() {
        // Arrange
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/api/v10/channels/42/messages"))
            .respond_with(wiremock::ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        let client = DiscordClient::builder()
            .base_url(
                url::Url::parse(&format!("{}/api/v10/", server.uri())).unwrap(),
            )
            .bot_token("bot-token")
            .user_agent("test/0.0.0")
            .retry_cooldown(Duration::from_millis(10))
            .build()
            .unwrap();
        let sink = DiscordSink::new(client);
        let event =
            NotificationEvent::RankChanged(change("GOLD IV 20 LP", "GOLD IV 45 LP"));

        // Act
        let result = sink.emit("42", &event).await;

        // Assert
        assert!(result.is_ok());
    }
}
