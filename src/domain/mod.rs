// Domain layer: stream/message models and ports (interfaces). No knowledge of
// reqwest or the concrete Discord endpoints.

pub mod model;
pub mod ports;
