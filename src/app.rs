use std::sync::Arc;

use anyhow::{Context, Result};
use scheduler_config::{catalog, OptionResolver, Registry};
use scheduler_observability::{init_structured_logging, LoggingConfig};
use tracing::info;

/// 启动配置
#[derive(Debug, Clone, Default)]
pub struct StartupConfig {
    /// 日志配置文件路径（TOML），为空时只使用默认值和环境变量
    pub logging_config_path: Option<String>,
    /// 是否安装全局日志订阅器；嵌入到已有进程或测试中时关闭
    pub init_logging: bool,
}

/// 调度服务配置目录的启动入口
///
/// 在单线程启动阶段构造唯一的 `Registry`，注册调度器选项目录，
/// 然后把只读句柄交给外部的配置解析器和文档工具。
pub struct Application {
    registry: Arc<Registry>,
}

impl Application {
    /// 创建新的应用实例
    pub fn new(startup: &StartupConfig) -> Result<Self> {
        if startup.init_logging {
            let logging = LoggingConfig::load(startup.logging_config_path.as_deref())
                .context("加载日志配置失败")?;
            init_structured_logging(logging)?;
        }

        let registry = Arc::new(Registry::new());
        catalog::register_opts(&registry).context("注册调度器配置选项失败")?;

        info!(
            groups = registry.group_count(),
            options = registry.option_count(),
            "配置选项目录初始化完成"
        );

        Ok(Self { registry })
    }

    /// 共享的注册中心句柄，供后续子系统继续注册自己的选项
    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    /// 只读解析接口
    pub fn resolver(&self) -> Arc<dyn OptionResolver> {
        self.registry.clone()
    }
}

/// 构造已注册完整目录的注册中心，不安装全局日志订阅器
pub fn build_registry() -> Result<Arc<Registry>> {
    Ok(Application::new(&StartupConfig::default())?.registry())
}
