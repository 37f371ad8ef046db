//! 配置选项注册中心
//!
//! `Registry` 是进程级的选项目录：启动时构造一次，以 `Arc<Registry>` 句柄传递给
//! 所有注册点和外部的配置解析器，不通过隐式全局变量访问。
//!
//! 注册操作在写锁内串行执行，分组在首次使用时惰性创建，因此各子系统可以按任意顺序注册。
//! 每次注册调用是原子的：批量中任何一个选项冲突，整批都不会生效。

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use scheduler_errors::{ConfigError, ConfigResult};
use scheduler_observability::StructuredLogger;

use crate::group::OptionGroup;
use crate::introspection::{GroupListing, OptionCatalog};
use crate::opts::OptionDescriptor;

/// 未命名的默认分组
pub const DEFAULT_GROUP: &str = "DEFAULT";

/// 外部取值解析器和文档工具使用的只读查询接口
pub trait OptionResolver: Send + Sync {
    /// 返回 `group.option` 的描述符（不是运行时取值）
    fn resolve(&self, group: &str, option: &str) -> ConfigResult<Arc<OptionDescriptor>>;

    /// 所有已注册分组及其描述符的快照
    fn list_opts(&self) -> OptionCatalog;
}

#[derive(Debug, Default)]
struct RegistryState {
    groups: Vec<OptionGroup>,
    index: HashMap<String, usize>,
}

impl RegistryState {
    fn get(&self, name: &str) -> Option<&OptionGroup> {
        self.index.get(name).map(|&position| &self.groups[position])
    }

    fn commit(&mut self, group: OptionGroup) {
        match self.index.get(group.name()) {
            Some(&position) => self.groups[position] = group,
            None => {
                self.index.insert(group.name().to_string(), self.groups.len());
                self.groups.push(group);
            }
        }
    }
}

/// 进程级的选项分组目录
#[derive(Debug, Default)]
pub struct Registry {
    state: RwLock<RegistryState>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在 `group` 下注册描述符，分组不存在时创建
    ///
    /// 重复注册完全相同的描述符是空操作；同名但结构不同的描述符返回
    /// `DuplicateOption`，注册中心保持不变。
    pub fn register_opts<I>(&self, descriptors: I, group: &str) -> ConfigResult<()>
    where
        I: IntoIterator<Item = OptionDescriptor>,
    {
        let descriptors: Vec<OptionDescriptor> = descriptors.into_iter().collect();
        if descriptors.is_empty() {
            return Ok(());
        }
        validate_group_name(group)?;

        let mut state = self.state.write();
        let existed = state.get(group).is_some();
        let mut staged = state
            .get(group)
            .cloned()
            .unwrap_or_else(|| OptionGroup::new(group));

        let outcomes = stage_descriptors(&mut staged, descriptors.into_iter().map(Arc::new))?;

        let title = staged.title().to_string();
        state.commit(staged);
        if !existed {
            StructuredLogger::log_group_registered(group, &title, false);
        }
        log_outcomes(group, &outcomes);
        Ok(())
    }

    /// 在默认分组中注册描述符
    pub fn register_default_opts<I>(&self, descriptors: I) -> ConfigResult<()>
    where
        I: IntoIterator<Item = OptionDescriptor>,
    {
        self.register_opts(descriptors, DEFAULT_GROUP)
    }

    pub fn register_opt(&self, descriptor: OptionDescriptor, group: &str) -> ConfigResult<()> {
        self.register_opts([descriptor], group)
    }

    /// 注册分组元数据以及分组携带的描述符
    ///
    /// 先声明的标题和帮助文本生效；后续声明必须相同或省略，否则返回 `DuplicateGroup`。
    pub fn register_group(&self, group: OptionGroup) -> ConfigResult<()> {
        validate_group_name(group.name())?;

        let mut state = self.state.write();
        let existed = state.get(group.name()).is_some();
        let mut staged = match state.get(group.name()) {
            Some(current) => {
                let mut merged = current.clone();
                if let Err(err) = merged.merge_metadata(&group) {
                    StructuredLogger::log_registration_rejected(
                        group.name(),
                        None,
                        &err.to_string(),
                    );
                    return Err(err);
                }
                merged
            }
            None => {
                let mut fresh = OptionGroup::new(group.name());
                fresh.merge_metadata(&group)?;
                fresh
            }
        };

        let outcomes = stage_descriptors(&mut staged, group.list().iter().cloned())?;

        let title = staged.title().to_string();
        state.commit(staged);
        if !existed {
            StructuredLogger::log_group_registered(group.name(), &title, true);
        }
        log_outcomes(group.name(), &outcomes);
        Ok(())
    }

    /// 一次性注册分组元数据和一组描述符
    pub fn register_group_opts<I>(&self, group: OptionGroup, descriptors: I) -> ConfigResult<()>
    where
        I: IntoIterator<Item = OptionDescriptor>,
    {
        let mut group = group;
        for descriptor in descriptors {
            group.add(descriptor)?;
        }
        self.register_group(group)
    }

    pub fn resolve(&self, group: &str, option: &str) -> ConfigResult<Arc<OptionDescriptor>> {
        let state = self.state.read();
        let group = state
            .get(group)
            .ok_or_else(|| ConfigError::group_not_found(group))?;
        group.get(option).cloned()
    }

    /// 单个分组的快照
    pub fn group(&self, name: &str) -> ConfigResult<OptionGroup> {
        self.state
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::group_not_found(name))
    }

    pub fn contains(&self, group: &str, option: &str) -> bool {
        self.state
            .read()
            .get(group)
            .is_some_and(|g| g.contains(option))
    }

    pub fn group_names(&self) -> Vec<String> {
        self.state
            .read()
            .groups
            .iter()
            .map(|g| g.name().to_string())
            .collect()
    }

    pub fn group_count(&self) -> usize {
        self.state.read().groups.len()
    }

    pub fn option_count(&self) -> usize {
        self.state.read().groups.iter().map(OptionGroup::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().groups.is_empty()
    }

    /// 按注册顺序列出所有分组及其描述符
    pub fn list_opts(&self) -> OptionCatalog {
        let state = self.state.read();
        OptionCatalog::new(state.groups.iter().map(GroupListing::from).collect())
    }

    /// 清空所有分组，仅用于测试清理
    pub fn reset(&self) {
        let mut state = self.state.write();
        tracing::debug!(groups = state.groups.len(), "Option registry reset");
        *state = RegistryState::default();
    }
}

impl OptionResolver for Registry {
    fn resolve(&self, group: &str, option: &str) -> ConfigResult<Arc<OptionDescriptor>> {
        Registry::resolve(self, group, option)
    }

    fn list_opts(&self) -> OptionCatalog {
        Registry::list_opts(self)
    }
}

fn validate_group_name(name: &str) -> ConfigResult<()> {
    if name.trim().is_empty() {
        return Err(ConfigError::invalid_option("group name cannot be empty"));
    }
    Ok(())
}

/// 暂存到分组副本中，返回每个描述符是否为新插入；冲突时立即记录并返回错误
fn stage_descriptors<I>(
    group: &mut OptionGroup,
    descriptors: I,
) -> ConfigResult<Vec<(Arc<OptionDescriptor>, bool)>>
where
    I: IntoIterator<Item = Arc<OptionDescriptor>>,
{
    let mut outcomes = Vec::new();
    for descriptor in descriptors {
        match group.add_shared(Arc::clone(&descriptor)) {
            Ok(inserted) => outcomes.push((descriptor, inserted)),
            Err(err) => {
                StructuredLogger::log_registration_rejected(
                    group.name(),
                    Some(descriptor.name()),
                    &err.to_string(),
                );
                return Err(err);
            }
        }
    }
    Ok(outcomes)
}

fn log_outcomes(group: &str, outcomes: &[(Arc<OptionDescriptor>, bool)]) {
    for (descriptor, inserted) in outcomes {
        if *inserted {
            StructuredLogger::log_option_registered(
                group,
                descriptor.name(),
                descriptor.kind().as_str(),
                descriptor.default_value().is_some(),
            );
        } else {
            StructuredLogger::log_duplicate_ignored(group, descriptor.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opts::OptionValue;
    use tracing_test::traced_test;

    fn retry_limit() -> OptionDescriptor {
        OptionDescriptor::integer("retry_limit")
            .default_value(3)
            .min(1)
            .help("Maximum retries")
            .build()
            .unwrap()
    }

    #[test]
    fn test_register_and_resolve() {
        let registry = Registry::new();
        registry.register_default_opts([retry_limit()]).unwrap();

        let opt = registry.resolve(DEFAULT_GROUP, "retry_limit").unwrap();
        assert_eq!(opt.default_value(), Some(&OptionValue::Integer(3)));
        assert!(registry.contains(DEFAULT_GROUP, "retry_limit"));
    }

    #[test]
    fn test_resolve_errors() {
        let registry = Registry::new();
        assert_eq!(
            registry.resolve("metrics", "required").unwrap_err(),
            ConfigError::group_not_found("metrics")
        );

        registry.register_default_opts([retry_limit()]).unwrap();
        assert_eq!(
            registry.resolve(DEFAULT_GROUP, "missing").unwrap_err(),
            ConfigError::option_not_found(DEFAULT_GROUP, "missing")
        );
    }

    #[test]
    fn test_lazy_group_creation() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        registry.register_opt(retry_limit(), "metrics").unwrap();
        assert_eq!(registry.group_names(), vec!["metrics".to_string()]);
        assert_eq!(registry.group("metrics").unwrap().title(), "metrics");
    }

    #[test]
    fn test_empty_registration_creates_nothing() {
        let registry = Registry::new();
        registry.register_opts(Vec::new(), "metrics").unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_batch_is_atomic() {
        let registry = Registry::new();
        let flag = OptionDescriptor::boolean("flag").default_value(true).build().unwrap();
        registry.register_default_opts([flag]).unwrap();

        let conflicting = OptionDescriptor::boolean("flag").default_value(false).build().unwrap();
        let fresh = OptionDescriptor::string("topic").default_value("scheduler").build().unwrap();
        let err = registry
            .register_default_opts([fresh, conflicting])
            .unwrap_err();

        assert!(matches!(err, ConfigError::DuplicateOption { .. }));
        assert!(!registry.contains(DEFAULT_GROUP, "topic"));
        assert_eq!(registry.option_count(), 1);
    }

    #[test]
    #[traced_test]
    fn test_rejected_batch_emits_no_registration_events() {
        let registry = Registry::new();
        let flag = OptionDescriptor::boolean("flag").default_value(true).build().unwrap();
        registry.register_default_opts([flag]).unwrap();

        let staged_only = OptionDescriptor::string("staged_topic").build().unwrap();
        let conflicting = OptionDescriptor::boolean("flag").default_value(false).build().unwrap();
        assert!(registry
            .register_default_opts([staged_only, conflicting])
            .is_err());

        assert!(logs_contain("Option registration rejected"));
        assert!(!logs_contain("staged_topic"));
    }

    #[test]
    #[traced_test]
    fn test_register_group_opts_logs_each_option_once() {
        let registry = Registry::new();
        registry
            .register_group_opts(
                OptionGroup::new("trusted_computing").with_title("Trust parameters"),
                [retry_limit()],
            )
            .unwrap();

        logs_assert(|lines: &[&str]| {
            let registered = lines
                .iter()
                .filter(|line| line.contains("Option registered") && line.contains("retry_limit"))
                .count();
            match registered {
                1 => Ok(()),
                n => Err(format!("expected one registration event, got {n}")),
            }
        });
        assert!(!logs_contain("Identical option already registered"));
    }

    #[test]
    fn test_same_name_in_different_groups() {
        let registry = Registry::new();
        let a = OptionDescriptor::boolean("required").default_value(true).build().unwrap();
        let b = OptionDescriptor::string("required").build().unwrap();
        registry.register_opt(a, "metrics").unwrap();
        registry.register_opt(b, DEFAULT_GROUP).unwrap();

        assert_eq!(registry.resolve("metrics", "required").unwrap().kind().as_str(), "boolean");
        assert_eq!(registry.resolve(DEFAULT_GROUP, "required").unwrap().kind().as_str(), "string");
    }

    #[test]
    fn test_register_group_title_merge() {
        let registry = Registry::new();
        registry.register_opt(retry_limit(), "trusted_computing").unwrap();
        registry
            .register_group(OptionGroup::new("trusted_computing").with_title("Trust parameters"))
            .unwrap();
        registry
            .register_group(OptionGroup::new("trusted_computing"))
            .unwrap();
        assert_eq!(
            registry.group("trusted_computing").unwrap().title(),
            "Trust parameters"
        );

        let err = registry
            .register_group(OptionGroup::new("trusted_computing").with_title("Other"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateGroup { .. }));
        assert_eq!(registry.group("trusted_computing").unwrap().len(), 1);
    }

    #[test]
    fn test_register_group_rejects_empty_name() {
        let registry = Registry::new();
        assert!(matches!(
            registry.register_group(OptionGroup::new("  ")),
            Err(ConfigError::InvalidOption(_))
        ));
    }

    #[test]
    fn test_register_group_opts() {
        let registry = Registry::new();
        registry
            .register_group_opts(
                OptionGroup::new("trusted_computing").with_title("Trust parameters"),
                [retry_limit()],
            )
            .unwrap();
        let group = registry.group("trusted_computing").unwrap();
        assert_eq!(group.title(), "Trust parameters");
        assert!(group.contains("retry_limit"));
    }

    #[test]
    fn test_reset() {
        let registry = Registry::new();
        registry.register_default_opts([retry_limit()]).unwrap();
        registry.register_group(OptionGroup::new("metrics")).unwrap();
        assert_eq!(registry.group_count(), 2);

        registry.reset();
        assert!(registry.is_empty());
        assert!(registry.list_opts().is_empty());
    }

    #[test]
    fn test_resolver_trait_object() {
        let registry = Arc::new(Registry::new());
        registry.register_default_opts([retry_limit()]).unwrap();

        let resolver: Arc<dyn OptionResolver> = registry;
        assert_eq!(resolver.resolve(DEFAULT_GROUP, "retry_limit").unwrap().name(), "retry_limit");
        assert_eq!(resolver.list_opts().option_count(), 1);
    }
}
