//! 选项目录导出
//!
//! `OptionCatalog` 是注册中心的只读快照，按分组给出完整的选项列表，
//! 供外部的文档生成和示例配置工具使用。分组和选项都保持插入顺序，
//! 相同的注册序列总是得到相同的输出。

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use scheduler_errors::ConfigResult;
use scheduler_observability::StructuredLogger;

use crate::group::OptionGroup;
use crate::opts::OptionDescriptor;

/// 目录中单个分组的条目
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupListing {
    #[serde(skip)]
    pub name: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    pub options: Vec<OptionDescriptor>,
}

impl GroupListing {
    pub fn new<N: Into<String>>(name: N, options: Vec<OptionDescriptor>) -> Self {
        let name = name.into();
        Self {
            title: name.clone(),
            name,
            help: None,
            options,
        }
    }

    pub fn with_title<T: Into<String>>(mut self, title: T) -> Self {
        self.title = title.into();
        self
    }
}

impl From<&OptionGroup> for GroupListing {
    fn from(group: &OptionGroup) -> Self {
        Self {
            name: group.name().to_string(),
            title: group.title().to_string(),
            help: group.help().map(str::to_string),
            options: group.list().iter().map(|opt| (**opt).clone()).collect(),
        }
    }
}

/// 文档工具使用的导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Toml,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Toml => "toml",
        }
    }
}

/// 分组名到描述符列表的有序映射
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionCatalog {
    groups: Vec<GroupListing>,
}

impl OptionCatalog {
    pub fn new(groups: Vec<GroupListing>) -> Self {
        Self { groups }
    }

    pub fn get(&self, group: &str) -> Option<&[OptionDescriptor]> {
        self.group(group).map(|listing| listing.options.as_slice())
    }

    pub fn group(&self, group: &str) -> Option<&GroupListing> {
        self.groups.iter().find(|listing| listing.name == group)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[OptionDescriptor])> {
        self.groups
            .iter()
            .map(|listing| (listing.name.as_str(), listing.options.as_slice()))
    }

    pub fn groups(&self) -> &[GroupListing] {
        &self.groups
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.groups.iter().map(|listing| listing.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn option_count(&self) -> usize {
        self.groups.iter().map(|listing| listing.options.len()).sum()
    }

    pub fn export(&self, format: ExportFormat) -> ConfigResult<String> {
        let rendered = match format {
            ExportFormat::Json => serde_json::to_string_pretty(self)?,
            ExportFormat::Toml => toml::to_string(self)?,
        };
        StructuredLogger::log_catalog_exported(format.as_str(), self.len(), self.option_count());
        Ok(rendered)
    }
}

impl Serialize for OptionCatalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for listing in &self.groups {
            map.serialize_entry(&listing.name, listing)?;
        }
        map.end()
    }
}
