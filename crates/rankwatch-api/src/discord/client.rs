//! `DiscordClient` - Discord REST client implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::instrument;
use url::Url;

use super::types::CreateMessage;
use crate::dispatcher::Dispatcher;
use crate::rate_limiter::RateLimiter;

/// Default base URL for the Discord REST API v10.
const DEFAULT_BASE_URL: &str = "https://discord.com/api/v10/";

/// Global bot budget: 50 requests per second.
const GLOBAL_WINDOW: (usize, Duration) = (50, Duration::from_secs(1));

/// Message-create budget: 5 messages per 5 seconds.
const MESSAGE_WINDOW: (usize, Duration) = (5, Duration::from_secs(5));

/// HTTP request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Discord REST client.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct DiscordClient {
    /// Rate-limited request funnel.
    dispatcher: Dispatcher,
    /// Base URL for API requests.
    base_url: Url,
    /// Bot token.
    bot_token: String,
}

/// Builder for `DiscordClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct DiscordClientBuilder {
    base_url: Option<Url>,
    bot_token: Option<String>,
    user_agent: Option<String>,
    retry_cooldown: Option<Duration>,
}

impl DiscordClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            bot_token: None,
            user_agent: None,
            retry_cooldown: None,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the bot token (required).
    #[must_use]
    pub fn bot_token(mut self, token: impl Into<String>) -> Self {
        self.bot_token = Some(token.into());
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the 429 cool-down (default: 20s).
    #[must_use]
    pub const fn retry_cooldown(mut self, cooldown: Duration) -> Self {
        self.retry_cooldown = Some(cooldown);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `bot_token` is not set.
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<DiscordClient> {
        let bot_token = self.bot_token.context("bot_token is required")?;
        let user_agent = self.user_agent.context("user_agent is required")?;

        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            let result = Url::parse(DEFAULT_BASE_URL);
            result.context("invalid default base URL")?
        };

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        let mut dispatcher = Dispatcher::new(
            http_client,
            RateLimiter::new(GLOBAL_WINDOW.0, GLOBAL_WINDOW.1),
            RateLimiter::new(MESSAGE_WINDOW.0, MESSAGE_WINDOW.1),
        );
        if let Some(cooldown) = self.retry_cooldown {
            dispatcher = dispatcher.retry_cooldown(cooldown);
        }

        Ok(DiscordClient {
            dispatcher,
            base_url,
            bot_token,
        })
    }
}

impl DiscordClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> DiscordClientBuilder {
        DiscordClientBuilder::new()
    }

    /// Posts a message to a text channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel does not exist, the bot lacks
    /// access, or the request fails after the single 429 retry.
    #[instrument(skip_all, fields(channel_id = %channel_id))]
    pub async fn send_message(&self, channel_id: &str, message: &CreateMessage) -> Result<()> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow::anyhow!("base URL cannot have path segments"))?
            .pop_if_empty()
            .extend(["channels", channel_id, "messages"]);

        let request = self
            .dispatcher
            .post(url)
            .header("Authorization", format!("Bot {}", self.bot_token))
            .json(message)
            .build()
            .context("failed to build message request")?;

        self.dispatcher
            .execute(request)
            .await
            .with_context(|| format!("failed to post message to channel {channel_id}"))?;
        tracing::debug!("Discord message posted");
        Ok(())
    }
}
