//! Library side of the aggstock CLI, shared with the integration tests.

pub mod logging;
pub mod pipeline;
pub mod types;
