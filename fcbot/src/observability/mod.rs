//! Observability utilities.

mod logging;
mod timing;

pub use logging::{effective_level, init_logging, LogHandle};
pub use timing::StepTimer;
