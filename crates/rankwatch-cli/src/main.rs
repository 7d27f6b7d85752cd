//! rankwatch - League of Legends rank tracker.

/// Application configuration (TOML).
mod config;
/// Notification sink selection.
mod notifier;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::AppConfig;
use crate::notifier::Notifier;
use rankwatch_api::riot::RiotClient;
use rankwatch_api::{Platform, RiotId};
use rankwatch_core::{Repository, Scheduler, offboard, onboard, validate_riot_id};
use rankwatch_db::SqliteRepository;

/// User-Agent sent to every API.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config/data directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Run the reconciliation loop until Ctrl-C.
    Run,
    /// Manage tracked summoners.
    Summoner(SummonerCommand),
}

/// Arguments for the `summoner` subcommand.
#[derive(clap::Args)]
struct SummonerCommand {
    /// Summoner subcommand to run.
    #[command(subcommand)]
    command: SummonerSubcommands,
}

/// Available summoner subcommands.
#[derive(Subcommand)]
enum SummonerSubcommands {
    /// Start announcing a summoner in a channel.
    Add(AddArgs),
    /// Stop announcing a summoner in a channel.
    Remove(RemoveArgs),
    /// List stored summoners and their channels.
    List,
}

/// Arguments for the `summoner add` subcommand.
#[derive(clap::Args)]
struct AddArgs {
    /// Riot game name (e.g. "Hide on bush").
    #[arg(long, required = true)]
    name: String,
    /// Riot tag line without `#` (e.g. "KR1").
    #[arg(long, required = true)]
    tag: String,
    /// Platform id (e.g. "euw1"). Falls back to `riot.default_platform`.
    #[arg(long)]
    platform: Option<String>,
    /// Discord channel id receiving the announcements.
    #[arg(long, required = true)]
    channel: String,
}

/// Arguments for the `summoner remove` subcommand.
#[derive(clap::Args)]
struct RemoveArgs {
    /// Riot game name.
    #[arg(long, required = true)]
    name: String,
    /// Riot tag line without `#`.
    #[arg(long, required = true)]
    tag: String,
    /// Discord channel id to stop announcing in.
    #[arg(long, required = true)]
    channel: String,
}

/// Builds a `RiotClient` from the `RIOT_API_TOKEN` environment variable.
///
/// # Errors
///
/// Returns an error if `RIOT_API_TOKEN` is not set or the client fails to build.
#[instrument(skip_all)]
fn build_riot_client(config: &AppConfig) -> Result<RiotClient> {
    let api_token = std::env::var("RIOT_API_TOKEN")
        .context("RIOT_API_TOKEN environment variable is required")?;

    let limits = &config.rate_limit;
    let (short_requests, short_window) = limits.short_window();
    let (long_requests, long_window) = limits.long_window();
    RiotClient::builder()
        .api_token(api_token)
        .user_agent(USER_AGENT)
        .short_window(short_requests, short_window)
        .long_window(long_requests, long_window)
        .poll_interval(limits.poll_interval())
        .retry_cooldown(limits.retry_cooldown())
        .build()
        .context("failed to build Riot API client")
}

/// Runs the `run` subcommand.
///
/// # Errors
///
/// Returns an error if configuration, the database or a client cannot be
/// set up. Errors inside a cycle are logged and do not stop the loop.
#[instrument(skip_all)]
#[allow(clippy::future_not_send)]
async fn run_scheduler(dir: Option<&PathBuf>) -> Result<()> {
    let config = AppConfig::load_from(dir)?;
    let api = build_riot_client(&config)?;
    let repo = SqliteRepository::open(dir).context("failed to open database")?;
    let sink = Notifier::from_env()?;

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
            return;
        }
        tracing::info!("Shutdown requested, finishing the current cycle");
        if stop_tx.send(true).is_err() {
            tracing::debug!("Scheduler already stopped");
        }
    });

    let mut scheduler = Scheduler::new(api, repo, sink, config.scheduler.options());
    scheduler.run(stop_rx).await
}

/// Runs the `summoner add` subcommand.
///
/// # Errors
///
/// Returns an error if the Riot id is invalid or unknown, the summoner is
/// already tracked in the channel, or setup fails.
#[instrument(skip_all)]
#[allow(clippy::future_not_send)]
async fn run_summoner_add(args: &AddArgs, dir: Option<&PathBuf>) -> Result<()> {
    let riot_id = RiotId {
        game_name: args.name.clone(),
        tag_line: args.tag.clone(),
    };
    validate_riot_id(&riot_id)?;

    let config = AppConfig::load_from(dir)?;
    let platform: Platform = match &args.platform {
        Some(p) => p.parse()?,
        None => config.default_platform()?,
    };
    let api = build_riot_client(&config)?;
    let repo = SqliteRepository::open(dir).context("failed to open database")?;

    let summoner = onboard(&api, &repo, &riot_id, platform, &args.channel).await?;
    tracing::info!(
        "Tracking {} ({}) in channel {}: Solo/Duo {}, Flex {}",
        summoner.name_tag(),
        summoner.platform,
        args.channel,
        summoner.solo_rank,
        summoner.flex_rank,
    );

    Ok(())
}

/// Runs the `summoner remove` subcommand.
///
/// # Errors
///
/// Returns an error if the summoner is not tracked in the channel.
#[instrument(skip_all)]
fn run_summoner_remove(args: &RemoveArgs, dir: Option<&PathBuf>) -> Result<()> {
    let riot_id = RiotId {
        game_name: args.name.clone(),
        tag_line: args.tag.clone(),
    };
    let repo = SqliteRepository::open(dir).context("failed to open database")?;

    let summoner = offboard(&repo, &riot_id, &args.channel)?;
    tracing::info!(
        "Stopped tracking {} in channel {}",
        summoner.name_tag(),
        args.channel
    );

    Ok(())
}

/// Runs the `summoner list` subcommand.
///
/// # Errors
///
/// Returns an error if DB operations fail.
#[instrument(skip_all)]
fn run_summoner_list(dir: Option<&PathBuf>) -> Result<()> {
    let repo = SqliteRepository::open(dir).context("failed to open database")?;
    let summoners = repo.list_summoners().context("failed to load summoners")?;

    let mut tracked = Vec::new();
    for summoner in summoners {
        let channels = repo
            .list_notification_destinations(&summoner.puuid)
            .context("failed to load channels")?;
        if !channels.is_empty() {
            tracked.push((summoner, channels));
        }
    }

    if tracked.is_empty() {
        tracing::info!("No summoners tracked. Run `summoner add` first.");
        return Ok(());
    }

    tracing::info!("Summoner\t\tPlatform\tSolo/Duo\t\tFlex\t\t\tChannels");
    for (summoner, channels) in &tracked {
        tracing::info!(
            "{}\t{}\t\t{}\t{}\t{}",
            summoner.name_tag(),
            summoner.platform,
            summoner.solo_rank,
            summoner.flex_rank,
            channels.join(","),
        );
    }
    tracing::info!("Total: {} summoners", tracked.len());

    Ok(())
}

/// Installs the tracing subscriber.
fn init_tracing() {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run => run_scheduler(cli.dir.as_ref()).await,
        Commands::Summoner(cmd) => match cmd.command {
            SummonerSubcommands::Add(args) => run_summoner_add(&args, cli.dir.as_ref()).await,
            SummonerSubcommands::Remove(args) => run_summoner_remove(&args, cli.dir.as_ref()),
            SummonerSubcommands::List => run_summoner_list(cli.dir.as_ref()),
        },
    }
}
