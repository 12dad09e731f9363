// Adapters layer: concrete clients for the external systems (streams API,
// Discord REST). Everything reqwest-specific lives here.

pub mod discord;
pub mod streams_api;
