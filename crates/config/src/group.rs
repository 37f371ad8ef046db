//! 选项分组
//!
//! 分组是独立的命名空间：同一分组内选项名称唯一，不同分组之间可以重名。
//! 选项按插入顺序保存，该顺序只影响文档渲染，不影响语义。

use std::collections::HashMap;
use std::sync::Arc;

use scheduler_errors::{ConfigError, ConfigResult};

use crate::opts::OptionDescriptor;

/// 按插入顺序保存描述符的命名分组
#[derive(Debug, Clone, PartialEq)]
pub struct OptionGroup {
    name: String,
    title: Option<String>,
    help: Option<String>,
    descriptors: Vec<Arc<OptionDescriptor>>,
    index: HashMap<String, usize>,
}

impl OptionGroup {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            title: None,
            help: None,
            descriptors: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn with_title<T: Into<String>>(mut self, title: T) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_help<H: Into<String>>(mut self, help: H) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 可读标题，未声明时使用分组名
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// 声明的原始标题，不回退到分组名
    pub fn declared_title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// 添加描述符
    ///
    /// 新插入返回 `Ok(true)`，已存在结构相同的描述符时返回 `Ok(false)`；
    /// 同名但定义不同则返回 `DuplicateOption`。
    pub fn add(&mut self, descriptor: OptionDescriptor) -> ConfigResult<bool> {
        self.add_shared(Arc::new(descriptor))
    }

    pub(crate) fn add_shared(&mut self, descriptor: Arc<OptionDescriptor>) -> ConfigResult<bool> {
        if let Some(&position) = self.index.get(descriptor.name()) {
            if *self.descriptors[position] == *descriptor {
                return Ok(false);
            }
            return Err(ConfigError::duplicate_option(&self.name, descriptor.name()));
        }

        self.index
            .insert(descriptor.name().to_string(), self.descriptors.len());
        self.descriptors.push(descriptor);
        Ok(true)
    }

    /// 按插入顺序返回描述符
    pub fn list(&self) -> &[Arc<OptionDescriptor>] {
        &self.descriptors
    }

    pub fn get(&self, name: &str) -> ConfigResult<&Arc<OptionDescriptor>> {
        self.index
            .get(name)
            .map(|&position| &self.descriptors[position])
            .ok_or_else(|| ConfigError::option_not_found(&self.name, name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// 合并同一分组另一次声明中的标题和帮助文本
    ///
    /// 先声明的值生效；后续声明可以省略或原样重复，否则返回 `DuplicateGroup`。
    /// 返回值表示是否采纳了新的字段。
    pub(crate) fn merge_metadata(&mut self, other: &OptionGroup) -> ConfigResult<bool> {
        let title = merge_field(&self.name, &self.title, &other.title)?;
        let help = merge_field(&self.name, &self.help, &other.help)?;
        let changed = title.is_some() || help.is_some();
        if let Some(title) = title {
            self.title = Some(title);
        }
        if let Some(help) = help {
            self.help = Some(help);
        }
        Ok(changed)
    }
}

fn merge_field(
    group: &str,
    existing: &Option<String>,
    requested: &Option<String>,
) -> ConfigResult<Option<String>> {
    match (existing, requested) {
        (None, Some(value)) => Ok(Some(value.clone())),
        (Some(current), Some(value)) if current != value => {
            Err(ConfigError::duplicate_group(group, current, value))
        }
        _ => Ok(None),
    }
}
