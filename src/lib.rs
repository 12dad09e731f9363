pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{discord::DiscordRestSink, streams_api::HttpStreamsSource};
pub use config::{cli::CliArgs, BotConfig};
pub use crate::core::{engine::SyncEngine, pipeline::StreamSyncPipeline};
pub use domain::model::{ChannelMessage, Embed, StreamRecord, SyncPlan, SyncReport};
pub use utils::error::{BotError, Result};
