//! Riot Games API client module.
//!
//! Resolves player identities, ladder ranks, match summaries and live
//! games. Every request goes through one [`crate::Dispatcher`].

mod api;
mod client;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalRiotApi, RiotApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{RiotClient, RiotClientBuilder};
