pub mod engine;
pub mod pipeline;

pub use crate::domain::model::{SyncPlan, SyncReport};
pub use crate::domain::ports::{ChannelSink, Pipeline, StreamsSource};
pub use crate::utils::error::Result;
