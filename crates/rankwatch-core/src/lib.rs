//! Core library for rankwatch.
//!
//! Holds the persistence contract, notification events and sinks, match
//! participant resolution, the reconciliation scheduler and the
//! onboarding use cases.

/// Community Dragon asset URLs.
pub mod assets;
/// Notification events and sinks.
pub mod notify;
/// Onboarding and offboarding of tracked summoners.
pub mod onboarding;
/// Persistence contract.
pub mod repository;
/// Participant resolution for fetched matches.
pub mod resolver;
/// Reconciliation scheduler.
pub mod scheduler;

#[cfg(test)]
mod testing;

pub use notify::{
    DiscordSink, LocalNotificationSink, LogSink, MatchStart, NotificationEvent,
    NotificationSink, RankChange,
};
pub use onboarding::{offboard, onboard, validate_riot_id};
pub use repository::Repository;
pub use resolver::resolve_match;
pub use scheduler::{CycleOutcome, Scheduler, SchedulerOptions};
