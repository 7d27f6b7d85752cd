//! Discord REST client module.
//!
//! Posts embed messages to text channels with a bot token. Only the
//! message-create endpoint is covered.

mod client;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use client::{DiscordClient, DiscordClientBuilder};
pub use types::{CreateMessage, Embed, EmbedAuthor, EmbedField, EmbedFooter, EmbedImage};
