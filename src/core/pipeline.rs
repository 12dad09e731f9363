use crate::core::{ChannelSink, Pipeline, StreamsSource, SyncPlan, SyncReport};
use crate::domain::model::{ChannelMessage, StreamRecord};
use crate::utils::error::Result;
use std::collections::HashMap;

/// Snapshot of both sides of the sync, keyed by stream URL.
pub struct SyncState {
    pub streams: HashMap<String, StreamRecord>,
    pub messages: HashMap<String, ChannelMessage>,
    /// Duplicate messages removed while building the snapshot.
    pub collapsed: usize,
}

/// Diffs the streams API against the channel's existing sync messages and
/// applies the difference.
pub struct StreamSyncPipeline<S: StreamsSource, C: ChannelSink> {
    source: S,
    sink: C,
}

impl<S: StreamsSource, C: ChannelSink> StreamSyncPipeline<S, C> {
    pub fn new(source: S, sink: C) -> Self {
        Self { source, sink }
    }

    /// Fetches both sides. When the channel holds more than one sync message
    /// for a streamer the extras are garbage collected here; history arrives
    /// newest first, so the oldest message survives.
    pub async fn extract(&self) -> Result<SyncState> {
        let records = self.source.fetch_streams().await?;
        let mut streams = HashMap::new();
        for record in records {
            streams.insert(record.url.clone(), record);
        }

        let mut messages: HashMap<String, ChannelMessage> = HashMap::new();
        let mut collapsed = 0;
        for message in self.sink.sync_messages().await? {
            let key = match message.embeds.first().and_then(|e| e.sync_key()) {
                Some(key) => key.to_string(),
                None => continue,
            };

            if let Some(duplicate) = messages.insert(key.clone(), message) {
                tracing::info!("Collapsing duplicate message for {}", key);
                self.sink.delete(&duplicate.id).await?;
                collapsed += 1;
            }
        }

        Ok(SyncState {
            streams,
            messages,
            collapsed,
        })
    }

    /// Pure diff. Output vectors are sorted by key so logs and tests see a
    /// stable order.
    pub fn plan(state: &SyncState) -> SyncPlan {
        let mut plan = SyncPlan::default();

        for (key, record) in &state.streams {
            match state.messages.get(key) {
                None => plan.post.push(record.clone()),
                Some(message) => {
                    if record.embed_outdated(&message.embeds[0]) {
                        plan.edit.push((message.id.clone(), record.clone()));
                    }
                }
            }
        }

        for (key, message) in &state.messages {
            if !state.streams.contains_key(key) {
                plan.delete.push((message.id.clone(), key.clone()));
            }
        }

        plan.post.sort_by(|a, b| a.url.cmp(&b.url));
        plan.edit.sort_by(|a, b| a.1.url.cmp(&b.1.url));
        plan.delete.sort_by(|a, b| a.1.cmp(&b.1));
        plan
    }

    pub async fn apply(&self, plan: SyncPlan) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        for record in &plan.post {
            tracing::info!("Added new stream for {}", record.url);
            self.sink.post(&record.to_embed()).await?;
            report.posted += 1;
        }

        for (message_id, record) in &plan.edit {
            tracing::info!("Updating stream info for {}", record.url);
            self.sink.edit(message_id, &record.to_embed()).await?;
            report.edited += 1;
        }

        for (message_id, key) in &plan.delete {
            tracing::info!("Streamer {} stopped streaming. Removing message.", key);
            self.sink.delete(message_id).await?;
            report.deleted += 1;
        }

        Ok(report)
    }
}

#[async_trait::async_trait]
impl<S: StreamsSource, C: ChannelSink> Pipeline for StreamSyncPipeline<S, C> {
    async fn run_once(&self) -> Result<SyncReport> {
        let state = self.extract().await?;
        tracing::debug!(
            "Extracted {} live streams, {} sync messages",
            state.streams.len(),
            state.messages.len()
        );

        let plan = Self::plan(&state);
        if plan.is_empty() && state.collapsed == 0 {
            tracing::debug!("Channel already in sync");
        }

        let mut report = self.apply(plan).await?;
        report.deleted += state.collapsed;
        Ok(report)
    }
}
