pub mod app;

pub use app::{build_registry, Application, StartupConfig};
pub use scheduler_config::{
    catalog, ExportFormat, OptionCatalog, OptionDescriptor, OptionGroup, OptionKind,
    OptionResolver, OptionValue, Registry,
};
pub use scheduler_errors::{ConfigError, ConfigResult};
pub use scheduler_observability::{LogFormat, LoggingConfig};
