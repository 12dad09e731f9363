use crate::domain::model::{ChannelMessage, Embed, StreamRecord, SyncReport};
use crate::utils::error::Result;
use async_trait::async_trait;

/// One full extract/plan/apply cycle. The engine only knows this trait.
#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn run_once(&self) -> Result<SyncReport>;
}

/// Where the current streamer list comes from.
#[async_trait]
pub trait StreamsSource: Send + Sync {
    async fn fetch_streams(&self) -> Result<Vec<StreamRecord>>;
}

/// The channel the bot keeps in sync. `sync_messages` returns only messages
/// this bot posted for syncing, newest first, already filtered by the marker.
#[async_trait]
pub trait ChannelSink: Send + Sync {
    async fn sync_messages(&self) -> Result<Vec<ChannelMessage>>;
    async fn post(&self, embed: &Embed) -> Result<()>;
    async fn edit(&self, message_id: &str, embed: &Embed) -> Result<()>;
    async fn delete(&self, message_id: &str) -> Result<()>;
}
