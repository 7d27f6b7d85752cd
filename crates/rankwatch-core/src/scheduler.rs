//! Reconciliation scheduler.
//!
//! One cycle reconciles the least-recently-checked summoner that has a
//! notification destination:
//!
//! 1. select the oldest summoner (idle when there is none),
//! 2. fetch its solo and flex ranks,
//! 3. compare them with the stored ranks,
//! 4. attribute a change to the latest ranked match unless that match was
//!    already processed,
//! 5. fan out rank-change events to every tracked participant of that
//!    match and mark it processed,
//! 6. advance the summoner's checkpoint, whatever happened before.
//!
//! A live-match sweep for the same summoner runs between steps 5 and 6.
#![allow(clippy::future_not_send)]

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use rankwatch_api::riot::LocalRiotApi;
use rankwatch_api::{Match, Participant, Summoner};
use tokio::sync::watch;
use tracing::instrument;

use crate::notify::{LocalNotificationSink, MatchStart, NotificationEvent, RankChange};
use crate::repository::Repository;
use crate::resolver::resolve_match;

/// Default pause when no summoner has a destination.
const DEFAULT_IDLE_INTERVAL: Duration = Duration::from_secs(30);

/// Scheduler pacing and feature switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerOptions {
    /// Pause after an idle or failed cycle.
    pub idle_interval: Duration,
    /// Pause after a successful cycle.
    pub cycle_interval: Duration,
    /// Check the polled summoner for a live ranked game every cycle.
    pub live_sweep: bool,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            idle_interval: DEFAULT_IDLE_INTERVAL,
            cycle_interval: Duration::ZERO,
            live_sweep: true,
        }
    }
}

/// Result of one reconciliation cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No summoner has a destination.
    Idle,
    /// A summoner was reconciled and checkpointed.
    Reconciled {
        /// The reconciled summoner.
        puuid: String,
        /// Events delivered during the cycle.
        events: usize,
    },
}

/// Polling loop driving the API client, the repository and the sink.
#[derive(Debug)]
pub struct Scheduler<A, R, S> {
    api: A,
    repo: R,
    sink: S,
    options: SchedulerOptions,
    /// Last checkpoint handed out; keeps checkpoints strictly increasing.
    last_checkpoint: Option<DateTime<Utc>>,
}

impl<A, R, S> Scheduler<A, R, S>
where
    A: LocalRiotApi,
    R: Repository,
    S: LocalNotificationSink,
{
    /// Creates a scheduler.
    #[must_use]
    pub const fn new(api: A, repo: R, sink: S, options: SchedulerOptions) -> Self {
        Self {
            api,
            repo,
            sink,
            options,
            last_checkpoint: None,
        }
    }

    /// The API client.
    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// The repository.
    #[must_use]
    pub const fn repo(&self) -> &R {
        &self.repo
    }

    /// The notification sink.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Runs cycles until `stop` turns `true` or its sender is dropped.
    ///
    /// The stop flag is checked between cycles; an in-flight cycle always
    /// completes.
    ///
    /// # Errors
    ///
    /// Never fails today; cycle errors are logged and the loop continues.
    #[instrument(skip_all)]
    pub async fn run(&mut self, mut stop: watch::Receiver<bool>) -> Result<()> {
        tracing::info!("Reconciliation loop started");
        loop {
            if *stop.borrow_and_update() {
                break;
            }

            let pause = match self.run_cycle().await {
                Ok(CycleOutcome::Idle) => {
                    tracing::debug!("No summoner with a destination; idling");
                    self.options.idle_interval
                }
                Ok(CycleOutcome::Reconciled { .. }) => self.options.cycle_interval,
                Err(e) => {
                    tracing::error!("Reconciliation cycle failed: {e:#}");
                    self.options.idle_interval
                }
            };

            if pause.is_zero() {
                tokio::task::yield_now().await;
                continue;
            }
            tokio::select! {
                changed = stop.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                () = tokio::time::sleep(pause) => {}
            }
        }
        tracing::info!("Reconciliation loop stopped");
        Ok(())
    }

    /// Runs one cycle.
    ///
    /// Failures while reconciling or sweeping are logged and still end in
    /// a checkpoint, so one broken summoner cannot starve the others.
    ///
    /// # Errors
    ///
    /// Returns an error if selecting or checkpointing the summoner fails.
    #[instrument(skip_all)]
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome> {
        let Some(puuid) = self
            .repo
            .oldest_summoner_with_destination()
            .context("failed to select the next summoner")?
        else {
            return Ok(CycleOutcome::Idle);
        };

        let mut events = 0_usize;
        match self.reconcile(&puuid).await {
            Ok(delivered) => events = events.saturating_add(delivered),
            Err(e) => tracing::error!(puuid = %puuid, "Failed to reconcile summoner: {e:#}"),
        }
        if self.options.live_sweep {
            match self.sweep_live(&puuid).await {
                Ok(delivered) => events = events.saturating_add(delivered),
                Err(e) => tracing::error!(puuid = %puuid, "Live match sweep failed: {e:#}"),
            }
        }

        let at = self.next_checkpoint();
        self.repo
            .touch_summoner(&puuid, at)
            .with_context(|| format!("failed to checkpoint summoner {puuid}"))?;
        Ok(CycleOutcome::Reconciled { puuid, events })
    }

    /// Steps 2-5 for one summoner. Returns the number of delivered events.
    #[instrument(skip_all, fields(puuid = %puuid))]
    async fn reconcile(&self, puuid: &str) -> Result<usize> {
        let stored = self
            .repo
            .get_summoner(puuid)?
            .with_context(|| format!("summoner {puuid} is not stored"))?;
        let ladder = self
            .api
            .fetch_rank(&stored.summoner_id, stored.platform)
            .await?;

        let changed = stored.changed_queues(&ladder);
        if changed.is_empty() {
            tracing::debug!(summoner = %stored.name_tag(), "No rank change");
            return Ok(0);
        }
        let mut current = stored.clone();
        current.set_ladder(ladder);
        tracing::info!(summoner = %stored.name_tag(), queues = ?changed, "Rank change detected");

        let Some(match_id) = self
            .api
            .latest_ranked_match_id(puuid, stored.platform)
            .await?
        else {
            return self.announce_unattributed(&stored, &current).await;
        };
        if self.repo.is_match_processed(&match_id)? {
            tracing::debug!(match_id = %match_id, "Latest match already processed; storing rank");
            self.repo.upsert_summoner(&current)?;
            return Ok(0);
        }

        let game = self.api.fetch_match(&match_id, stored.platform).await?;
        if !game.queue.is_ranked() {
            return self.announce_unattributed(&stored, &current).await;
        }
        let game = resolve_match(&self.api, &self.repo, game, Some(&current)).await;

        let mut events = 0_usize;
        for participant in game.participants() {
            match self
                .announce_participant(&game, participant, &stored, &current)
                .await
            {
                Ok(delivered) => events = events.saturating_add(delivered),
                Err(e) => tracing::warn!(
                    puuid = %participant.summoner.puuid,
                    match_id = %game.match_id,
                    "Fan-out failed for participant: {e:#}"
                ),
            }
        }
        if game.participant(puuid).is_none() {
            let delivered = self.announce_unattributed(&stored, &current).await?;
            events = events.saturating_add(delivered);
        }

        self.repo.finalize_match(&game.match_id, &game)?;
        tracing::info!(match_id = %game.match_id, events, "Match processed");
        Ok(events)
    }

    /// Announces and stores the rank change of one match participant.
    ///
    /// The polled summoner reuses its fetched ladder; every other tracked
    /// participant gets a fresh ladder lookup.
    async fn announce_participant(
        &self,
        game: &Match,
        participant: &Participant,
        polled: &Summoner,
        polled_current: &Summoner,
    ) -> Result<usize> {
        let puuid = &participant.summoner.puuid;
        let destinations = self.repo.list_notification_destinations(puuid)?;
        if destinations.is_empty() {
            return Ok(0);
        }

        let (previous, current) = if *puuid == polled.puuid {
            (polled.clone(), polled_current.clone())
        } else {
            let previous = participant.summoner.clone();
            let ladder = self
                .api
                .fetch_rank(&previous.summoner_id, previous.platform)
                .await?;
            let mut current = previous.clone();
            current.set_ladder(ladder);
            (previous, current)
        };

        let mut events = 0_usize;
        for queue in previous.changed_queues(&current.ladder()) {
            let mut change = RankChange::new(&previous, &current, queue);
            change.match_id = Some(game.match_id.clone());
            change.champion_id = Some(participant.champion_id);
            change.loadout = Some(participant.loadout.clone());
            let event = NotificationEvent::RankChanged(change);
            events = events.saturating_add(self.deliver(&destinations, &event).await);
        }
        self.repo.upsert_summoner(&current)?;
        Ok(events)
    }

    /// Announces a change that cannot be tied to a ranked match.
    async fn announce_unattributed(&self, previous: &Summoner, current: &Summoner) -> Result<usize> {
        let destinations = self.repo.list_notification_destinations(&previous.puuid)?;
        let mut events = 0_usize;
        for queue in previous.changed_queues(&current.ladder()) {
            let event = NotificationEvent::RankChanged(RankChange::new(previous, current, queue));
            events = events.saturating_add(self.deliver(&destinations, &event).await);
        }
        self.repo.upsert_summoner(current)?;
        Ok(events)
    }

    /// Announces a newly observed live ranked game of `puuid`.
    #[instrument(skip_all, fields(puuid = %puuid))]
    async fn sweep_live(&self, puuid: &str) -> Result<usize> {
        let stored = self
            .repo
            .get_summoner(puuid)?
            .with_context(|| format!("summoner {puuid} is not stored"))?;
        let Some(live) = self.api.fetch_live_match(puuid, stored.platform).await? else {
            tracing::debug!("Not in game");
            return Ok(0);
        };
        if !live.queue.is_ranked() || self.repo.is_match_recorded(&live.match_id)? {
            return Ok(0);
        }

        let live = resolve_match(&self.api, &self.repo, live, Some(&stored)).await;
        if !self.repo.record_live_match(&live)? {
            return Ok(0);
        }
        tracing::info!(match_id = %live.match_id, queue = %live.queue, "Ranked match started");

        let mut events = 0_usize;
        for participant in live.participants() {
            let subject = &participant.summoner;
            let destinations = match self.repo.list_notification_destinations(&subject.puuid) {
                Ok(destinations) => destinations,
                Err(e) => {
                    tracing::warn!(puuid = %subject.puuid, "Failed to list destinations: {e:#}");
                    continue;
                }
            };
            let Some((own, enemy)) = live.sides_of(&subject.puuid) else {
                continue;
            };
            if destinations.is_empty() {
                continue;
            }
            let event = NotificationEvent::MatchStarted(MatchStart {
                puuid: subject.puuid.clone(),
                name_tag: subject.name_tag(),
                profile_icon_id: subject.profile_icon_id,
                match_id: live.match_id.clone(),
                queue: live.queue,
                rank: subject.rank(live.queue),
                own_average: own.average_rank(),
                enemy_average: enemy.average_rank(),
                champion_id: participant.champion_id,
            });
            events = events.saturating_add(self.deliver(&destinations, &event).await);
        }
        Ok(events)
    }

    /// Emits an event to every destination; failures are isolated per
    /// destination. Returns the number of successful deliveries.
    async fn deliver(&self, destinations: &[String], event: &NotificationEvent) -> usize {
        let mut delivered = 0_usize;
        for destination in destinations {
            match self.sink.emit(destination, event).await {
                Ok(()) => {
                    tracing::info!(destination = %destination, subject = event.subject(), "Event delivered");
                    delivered = delivered.saturating_add(1);
                }
                Err(e) => tracing::warn!(
                    destination = %destination,
                    subject = event.subject(),
                    "Failed to deliver event: {e:#}"
                ),
            }
        }
        delivered
    }

    /// Current time truncated to microseconds, bumped past the previous
    /// checkpoint when the clock has not moved.
    fn next_checkpoint(&mut self) -> DateTime<Utc> {
        let now = Utc::now().trunc_subsecs(6);
        let at = match self.last_checkpoint {
            Some(last) if now <= last => last
                .checked_add_signed(TimeDelta::microseconds(1))
                .unwrap_or(now),
            _ => now,
        };
        self.last_checkpoint = Some(at);
        at
    }
}
