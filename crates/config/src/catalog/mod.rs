pub mod scheduler;

pub use scheduler::{
    list_opts, register_opts, DEFAULT_GROUP_NAME, METRICS_GROUP_NAME, TRUSTED_GROUP_NAME,
    UPGRADE_GROUP_NAME,
};
