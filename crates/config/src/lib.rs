pub mod catalog;
pub mod group;
pub mod introspection;
pub mod opts;
pub mod registry;

// Re-export commonly used types
pub use group::OptionGroup;
pub use introspection::{ExportFormat, GroupListing, OptionCatalog};
pub use opts::{Bound, OptionBuilder, OptionConstraints, OptionDescriptor, OptionKind, OptionValue};
pub use registry::{OptionResolver, Registry, DEFAULT_GROUP};
pub use scheduler_errors::{ConfigError, ConfigResult};
