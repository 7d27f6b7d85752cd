use anyhow::Result;

use super::{LocalNotificationSink, NotificationEvent};

/// Sink that writes every event to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl LocalNotificationSink for LogSink {
    async fn emit(&self, destination: &str, event: &NotificationEvent) -> Result<()> {
        match event {
            NotificationEvent::RankChanged(change) => tracing::info!(
                destination,
                summoner = %change.name_tag,
                queue = %change.queue,
                old_rank = %change.old_rank,
                new_rank = %change.new_rank,
                delta = %change.delta_label(),
                match_id = change.match_id.as_deref().unwrap_or("-"),
                "Rank changed"
            ),
            NotificationEvent::MatchStarted(start) => tracing::info!(
                destination,
                summoner = %start.name_tag,
                queue = %start.queue,
                rank = %start.rank,
                own_average = %start.own_average,
                enemy_average = %start.enemy_average,
                champion_id = start.champion_id,
                match_id = %start.match_id,
                "Ranked match started"
            ),
        }
        Ok(())
    }
}
