//! Notification events and sinks.
#![allow(clippy::future_not_send)]

mod discord_sink;
mod event;
mod log_sink;

use anyhow::Result;

pub use discord_sink::DiscordSink;
pub use event::{MatchStart, NotificationEvent, RankChange};
pub use log_sink::LogSink;

/// Delivers events to a destination (chat channel id).
///
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(NotificationSink: Send)]
pub trait LocalNotificationSink {
    /// Delivers one event.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination rejects or cannot be reached.
    async fn emit(&self, destination: &str, event: &NotificationEvent) -> Result<()>;
}
