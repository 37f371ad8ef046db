pub mod structured_logger;
pub mod telemetry_setup;

pub use structured_logger::{LogFormat, LoggingConfig, StructuredLogger, LOG_ENV_PREFIX};
pub use telemetry_setup::init_structured_logging;
