//! `RiotClient` - Riot Games API client implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use super::api::LocalRiotApi;
use super::types::{
    AccountDto, CurrentGameDto, LeagueEntryDto, MatchDto, SummonerDto, ladder_from_entries,
};
use crate::dispatcher::{DispatchError, Dispatcher};
use crate::model::{Ladder, Match, RiotId, SummonerProfile};
use crate::platform::Platform;
use crate::rate_limiter::RateLimiter;

/// Header carrying the developer API key.
const TOKEN_HEADER: &str = "X-Riot-Token";

/// Default short-window budget: 10 requests per second.
const DEFAULT_SHORT_WINDOW: (usize, Duration) = (10, Duration::from_secs(1));

/// Default long-window budget: 100 requests per two minutes.
const DEFAULT_LONG_WINDOW: (usize, Duration) = (100, Duration::from_secs(120));

/// HTTP request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Riot Games API client.
///
/// Platform-scoped and regional endpoints share one [`Dispatcher`], so the
/// configured budget covers the whole API key.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct RiotClient {
    /// Rate-limited request funnel.
    dispatcher: Dispatcher,
    /// Single host for every request (tests); `None` routes by platform.
    base_url: Option<Url>,
    /// Developer API key.
    api_token: String,
}

/// Builder for `RiotClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct RiotClientBuilder {
    base_url: Option<Url>,
    api_token: Option<String>,
    user_agent: Option<String>,
    short_window: Option<(usize, Duration)>,
    long_window: Option<(usize, Duration)>,
    poll_interval: Option<Duration>,
    retry_cooldown: Option<Duration>,
}

impl RiotClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_token: None,
            user_agent: None,
            short_window: None,
            long_window: None,
            poll_interval: None,
            retry_cooldown: None,
        }
    }

    /// Sends every request to one base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the short-window budget (default: 10 per second).
    #[must_use]
    pub const fn short_window(mut self, requests: usize, window: Duration) -> Self {
        self.short_window = Some((requests, window));
        self
    }

    /// Sets the long-window budget (default: 100 per two minutes).
    #[must_use]
    pub const fn long_window(mut self, requests: usize, window: Duration) -> Self {
        self.long_window = Some((requests, window));
        self
    }

    /// Sets the capacity poll interval (default: 50ms).
    #[must_use]
    pub const fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
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
    /// - `api_token` is not set.
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<RiotClient> {
        let api_token = self.api_token.context("api_token is required")?;
        let user_agent = self.user_agent.context("user_agent is required")?;

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .timeout(REQUEST_TIMEOUT)
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        let (short_requests, short_window) = self.short_window.unwrap_or(DEFAULT_SHORT_WINDOW);
        let (long_requests, long_window) = self.long_window.unwrap_or(DEFAULT_LONG_WINDOW);
        let mut dispatcher = Dispatcher::new(
            http_client,
            RateLimiter::new(short_requests, short_window),
            RateLimiter::new(long_requests, long_window),
        );
        if let Some(interval) = self.poll_interval {
            dispatcher = dispatcher.poll_interval(interval);
        }
        if let Some(cooldown) = self.retry_cooldown {
            dispatcher = dispatcher.retry_cooldown(cooldown);
        }

        Ok(RiotClient {
            dispatcher,
            base_url: self.base_url,
            api_token,
        })
    }
}

impl RiotClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> RiotClientBuilder {
        RiotClientBuilder::new()
    }

    /// Builds `https://{host}/{segments...}`, honouring the base URL override.
    fn endpoint(&self, host: &str, segments: &[&str]) -> Result<Url> {
        let mut url = if let Some(base) = &self.base_url {
            base.clone()
        } else {
            let result = Url::parse(&format!("https://{host}/"));
            result.with_context(|| format!("invalid API host: {host}"))?
        };
        url.path_segments_mut()
            .map_err(|()| anyhow::anyhow!("base URL cannot have path segments"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends an authenticated GET through the dispatcher and decodes JSON.
    #[instrument(skip_all, fields(url = %url))]
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T, DispatchError> {
        let request = self
            .dispatcher
            .get(url)
            .header(TOKEN_HEADER, &self.api_token)
            .query(query)
            .build()?;
        tracing::debug!(url = %request.url(), "Riot API request");
        self.dispatcher.execute_json(request).await
    }
}

impl LocalRiotApi for RiotClient {
    #[instrument(skip_all, fields(riot_id = %riot_id))]
    async fn resolve_identity(&self, riot_id: &RiotId, platform: Platform) -> Result<String> {
        let url = self.endpoint(
            platform.account_route().host(),
            &[
                "riot",
                "account",
                "v1",
                "accounts",
                "by-riot-id",
                &riot_id.game_name,
                &riot_id.tag_line,
            ],
        )?;
        let account: AccountDto = self
            .get_json(url, &[])
            .await
            .with_context(|| format!("failed to resolve Riot id {riot_id}"))?;
        Ok(account.puuid)
    }

    #[instrument(skip_all)]
    async fn fetch_account(&self, puuid: &str, platform: Platform) -> Result<RiotId> {
        let url = self.endpoint(
            platform.account_route().host(),
            &["riot", "account", "v1", "accounts", "by-puuid", puuid],
        )?;
        let account: AccountDto = self
            .get_json(url, &[])
            .await
            .with_context(|| format!("failed to fetch account {puuid}"))?;
        Ok(account.into_riot_id())
    }

    #[instrument(skip_all)]
    async fn fetch_summoner(&self, puuid: &str, platform: Platform) -> Result<SummonerProfile> {
        let url = self.endpoint(
            platform.host(),
            &["lol", "summoner", "v4", "summoners", "by-puuid", puuid],
        )?;
        let summoner: SummonerDto = self
            .get_json(url, &[])
            .await
            .with_context(|| format!("failed to fetch summoner {puuid}"))?;
        Ok(summoner.into())
    }

    #[instrument(skip_all)]
    async fn fetch_rank(&self, summoner_id: &str, platform: Platform) -> Result<Ladder> {
        let url = self.endpoint(
            platform.host(),
            &["lol", "league", "v4", "entries", "by-summoner", summoner_id],
        )?;
        let entries: Vec<LeagueEntryDto> = self
            .get_json(url, &[])
            .await
            .with_context(|| format!("failed to fetch ladder entries for {summoner_id}"))?;
        Ok(ladder_from_entries(&entries))
    }

    #[instrument(skip_all)]
    async fn latest_ranked_match_id(
        &self,
        puuid: &str,
        platform: Platform,
    ) -> Result<Option<String>> {
        let url = self.endpoint(
            platform.match_route().host(),
            &["lol", "match", "v5", "matches", "by-puuid", puuid, "ids"],
        )?;
        let query = [("start", "0"), ("count", "1"), ("type", "ranked")];
        match self.get_json::<Vec<String>>(url, &query).await {
            Ok(ids) => Ok(ids.into_iter().next()),
            Err(DispatchError::NotFound) => Ok(None),
            Err(e) => Err(e).with_context(|| format!("failed to list matches of {puuid}")),
        }
    }

    #[instrument(skip_all, fields(match_id = %match_id))]
    async fn fetch_match(&self, match_id: &str, platform: Platform) -> Result<Match> {
        let platform = Platform::from_match_id(match_id).unwrap_or(platform);
        let url = self.endpoint(
            platform.match_route().host(),
            &["lol", "match", "v5", "matches", match_id],
        )?;
        let game: MatchDto = self
            .get_json(url, &[])
            .await
            .with_context(|| format!("failed to fetch match {match_id}"))?;
        Ok(game.into_match(platform))
    }

    #[instrument(skip_all)]
    async fn fetch_live_match(&self, puuid: &str, platform: Platform) -> Result<Option<Match>> {
        let url = self.endpoint(
            platform.host(),
            &["lol", "spectator", "v5", "active-games", "by-summoner", puuid],
        )?;
        match self.get_json::<CurrentGameDto>(url, &[]).await {
            Ok(game) => Ok(Some(game.into_match(platform))),
            Err(DispatchError::NotFound) => Ok(None),
            Err(e) => Err(e).with_context(|| format!("failed to fetch live game of {puuid}")),
        }
    }
}
