use thiserror::Error;

/// 配置选项注册中心错误类型
///
/// 注册类错误（类型不匹配、约束冲突、重复定义）都是子系统接线的编程错误，
/// 应当中止启动；查找类错误（分组或选项不存在）同样需要立即暴露。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("选项类型不匹配: {option} 期望 {expected}, 实际 {actual}")]
    TypeMismatch {
        option: String,
        expected: String,
        actual: String,
    },
    #[error("选项约束冲突: {option} - {message}")]
    ConstraintViolation { option: String, message: String },
    #[error("选项重复定义: {group}.{option}")]
    DuplicateOption { group: String, option: String },
    #[error("分组重复定义: {group} (已有标题 {existing:?}, 新标题 {requested:?})")]
    DuplicateGroup {
        group: String,
        existing: String,
        requested: String,
    },
    #[error("选项未找到: {group}.{option}")]
    OptionNotFound { group: String, option: String },
    #[error("分组未找到: {group}")]
    GroupNotFound { group: String },
    #[error("无效的选项声明: {0}")]
    InvalidOption(String),
    #[error("序列化错误: {0}")]
    Serialization(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    pub fn type_mismatch<O, E, A>(option: O, expected: E, actual: A) -> Self
    where
        O: Into<String>,
        E: Into<String>,
        A: Into<String>,
    {
        Self::TypeMismatch {
            option: option.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
    pub fn constraint_violation<O: Into<String>, M: Into<String>>(option: O, message: M) -> Self {
        Self::ConstraintViolation {
            option: option.into(),
            message: message.into(),
        }
    }
    pub fn duplicate_option<G: Into<String>, O: Into<String>>(group: G, option: O) -> Self {
        Self::DuplicateOption {
            group: group.into(),
            option: option.into(),
        }
    }
    pub fn duplicate_group<G, E, R>(group: G, existing: E, requested: R) -> Self
    where
        G: Into<String>,
        E: Into<String>,
        R: Into<String>,
    {
        Self::DuplicateGroup {
            group: group.into(),
            existing: existing.into(),
            requested: requested.into(),
        }
    }
    pub fn option_not_found<G: Into<String>, O: Into<String>>(group: G, option: O) -> Self {
        Self::OptionNotFound {
            group: group.into(),
            option: option.into(),
        }
    }
    pub fn group_not_found<G: Into<String>>(group: G) -> Self {
        Self::GroupNotFound {
            group: group.into(),
        }
    }
    pub fn invalid_option<S: Into<String>>(msg: S) -> Self {
        Self::InvalidOption(msg.into())
    }
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            ConfigError::TypeMismatch { .. }
                | ConfigError::ConstraintViolation { .. }
                | ConfigError::DuplicateOption { .. }
                | ConfigError::DuplicateGroup { .. }
                | ConfigError::InvalidOption(_)
        )
    }
    pub fn is_lookup_error(&self) -> bool {
        matches!(
            self,
            ConfigError::OptionNotFound { .. } | ConfigError::GroupNotFound { .. }
        )
    }
    pub fn user_message(&self) -> &str {
        match self {
            ConfigError::TypeMismatch { .. } => "选项默认值与声明类型不符",
            ConfigError::ConstraintViolation { .. } => "选项默认值违反声明的约束",
            ConfigError::DuplicateOption { .. } => "同名选项已以不同定义注册",
            ConfigError::DuplicateGroup { .. } => "同名分组已以不同元数据注册",
            ConfigError::OptionNotFound { .. } => "请求的配置选项不存在",
            ConfigError::GroupNotFound { .. } => "请求的配置分组不存在",
            _ => "配置目录内部错误",
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::Serialization(err.to_string())
    }
}
