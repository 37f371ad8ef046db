use std::path::Path;

use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// 日志环境变量前缀，例如 `SCHEDULER_LOG_LEVEL=debug`
pub const LOG_ENV_PREFIX: &str = "SCHEDULER_LOG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub include_location: bool,
    pub include_thread_id: bool,
    pub include_thread_name: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
            include_location: true,
            include_thread_id: false,
            include_thread_name: false,
        }
    }
}

impl LoggingConfig {
    /// 加载日志配置：内置默认值，其次是可选的 TOML 文件，最后是 `SCHEDULER_LOG_*` 环境变量
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let defaults = Self::default();
        let mut builder = ConfigBuilder::builder()
            .set_default("level", defaults.level.as_str())?
            .set_default("format", "json")?
            .set_default("include_location", defaults.include_location)?
            .set_default("include_thread_id", defaults.include_thread_id)?
            .set_default("include_thread_name", defaults.include_thread_name)?;

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("日志配置文件不存在: {}", path));
            }
        }

        builder = builder.add_source(Environment::with_prefix(LOG_ENV_PREFIX).try_parsing(true));

        let settings = builder.build().context("构建日志配置失败")?;
        settings
            .try_deserialize::<LoggingConfig>()
            .context("解析日志配置失败")
    }

    pub fn with_level<S: Into<String>>(mut self, level: S) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

/// 选项注册中心的结构化日志事件
pub struct StructuredLogger;

impl StructuredLogger {
    pub fn log_option_registered(group: &str, option: &str, kind: &str, has_default: bool) {
        debug!(
            event = "option_registered",
            option.group = group,
            option.name = option,
            option.kind = kind,
            option.has_default = has_default,
            "Option registered"
        );
    }
    pub fn log_group_registered(group: &str, title: &str, explicit: bool) {
        debug!(
            event = "group_registered",
            group.name = group,
            group.title = title,
            group.explicit = explicit,
            "Option group registered"
        );
    }
    pub fn log_duplicate_ignored(group: &str, option: &str) {
        debug!(
            event = "duplicate_option_ignored",
            option.group = group,
            option.name = option,
            "Identical option already registered, ignoring"
        );
    }
    pub fn log_registration_rejected(group: &str, option: Option<&str>, reason: &str) {
        warn!(
            event = "registration_rejected",
            option.group = group,
            option.name = option.unwrap_or("-"),
            registration.reason = reason,
            "Option registration rejected"
        );
    }
    pub fn log_catalog_registered(group_count: usize, option_count: usize) {
        info!(
            event = "catalog_registered",
            catalog.groups = group_count,
            catalog.options = option_count,
            "Option catalog registered"
        );
    }
    pub fn log_catalog_exported(format: &str, group_count: usize, option_count: usize) {
        info!(
            event = "catalog_exported",
            catalog.format = format,
            catalog.groups = group_count,
            catalog.options = option_count,
            "Option catalog exported"
        );
    }
}
