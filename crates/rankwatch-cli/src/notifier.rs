//! Runtime choice between Discord delivery and the log sink.

use anyhow::{Context, Result};
use rankwatch_api::discord::DiscordClient;
use rankwatch_core::{DiscordSink, LocalNotificationSink, LogSink, NotificationEvent};

use crate::USER_AGENT;

/// Sink selected from the environment at startup.
#[derive(Debug)]
pub enum Notifier {
    /// Posts embeds to Discord channels.
    Discord(DiscordSink),
    /// Writes events to the log.
    Log(LogSink),
}

impl Notifier {
    /// Uses Discord when `DISCORD_BOT_TOKEN` is set, the log otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the Discord client fails to build.
    pub fn from_env() -> Result<Self> {
        let Ok(bot_token) = std::env::var("DISCORD_BOT_TOKEN") else {
            tracing::info!("DISCORD_BOT_TOKEN is not set, events go to the log");
            return Ok(Self::Log(LogSink));
        };
        let client = DiscordClient::builder()
            .bot_token(bot_token)
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build Discord client")?;
        Ok(Self::Discord(DiscordSink::new(client)))
    }
}

impl LocalNotificationSink for Notifier {
    async fn emit(&self, destination: &str, event: &NotificationEvent) -> Result<()> {
        match self {
            Self::Discord(sink) => sink.emit(destination, event).await,
            Self::Log(sink) => sink.emit(destination, event).await,
        }
    }
}
