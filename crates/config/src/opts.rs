//! 配置选项描述符
//!
//! 每个 `OptionDescriptor` 声明一个可调参数：名称、值类型、默认值、约束和帮助文本。
//! 描述符在构造时完成校验，之后不可变，并以结构相等性比较，
//! 因此重复注册完全相同的描述符是安全的空操作。

use std::fmt;

use scheduler_errors::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// 选项值类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    String,
    Integer,
    Float,
    Boolean,
    /// 单个以分隔符拼接的列表值
    List,
    /// 由所有来源中每次出现的值汇总而成的列表
    MultiString,
}

impl OptionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKind::String => "string",
            OptionKind::Integer => "integer",
            OptionKind::Float => "float",
            OptionKind::Boolean => "boolean",
            OptionKind::List => "list",
            OptionKind::MultiString => "multi_string",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, OptionKind::Integer | OptionKind::Float)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, OptionKind::List | OptionKind::MultiString)
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 带类型的选项值，两种列表类型都由 `List` 承载
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<String>),
}

impl OptionValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            OptionValue::Boolean(_) => "boolean",
            OptionValue::Integer(_) => "integer",
            OptionValue::Float(_) => "float",
            OptionValue::String(_) => "string",
            OptionValue::List(_) => "list",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            OptionValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// 数值视图，整数会转换为 `f64`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OptionValue::Float(f) => Some(*f),
            OptionValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            OptionValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// 按 `kind` 校验取值；浮点选项接受能精确表示的整数
    fn conform(self, option: &str, kind: OptionKind) -> ConfigResult<Self> {
        let actual = self.type_name();
        match (kind, self) {
            (OptionKind::String, value @ OptionValue::String(_))
            | (OptionKind::Integer, value @ OptionValue::Integer(_))
            | (OptionKind::Boolean, value @ OptionValue::Boolean(_))
            | (OptionKind::List | OptionKind::MultiString, value @ OptionValue::List(_)) => {
                Ok(value)
            }
            (OptionKind::Float, OptionValue::Float(f)) if f.is_nan() => {
                Err(ConfigError::type_mismatch(option, "float", "NaN"))
            }
            (OptionKind::Float, OptionValue::Float(f)) => Ok(OptionValue::Float(f)),
            (OptionKind::Float, OptionValue::Integer(i)) => {
                let widened = i as f64;
                if widened as i128 != i128::from(i) {
                    return Err(ConfigError::type_mismatch(
                        option,
                        "float",
                        format!("integer {i} (not exactly representable)"),
                    ));
                }
                Ok(OptionValue::Float(widened))
            }
            (kind, _) => Err(ConfigError::type_mismatch(option, kind.as_str(), actual)),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Boolean(b) => write!(f, "{b}"),
            OptionValue::Integer(i) => write!(f, "{i}"),
            OptionValue::Float(v) => write!(f, "{v:?}"),
            OptionValue::String(s) => f.write_str(s),
            OptionValue::List(items) => f.write_str(&items.join(",")),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Boolean(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Integer(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        OptionValue::Integer(value.into())
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Float(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::String(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::String(value)
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(value: Vec<String>) -> Self {
        OptionValue::List(value)
    }
}

impl From<Vec<&str>> for OptionValue {
    fn from(value: Vec<&str>) -> Self {
        OptionValue::List(value.into_iter().map(str::to_string).collect())
    }
}

/// `min`/`max` 使用的闭区间数值边界
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    Integer(i64),
    Float(f64),
}

impl Bound {
    pub fn as_f64(&self) -> f64 {
        match self {
            Bound::Integer(i) => *i as f64,
            Bound::Float(f) => *f,
        }
    }

    fn is_nan(&self) -> bool {
        matches!(self, Bound::Float(f) if f.is_nan())
    }

    /// `value` 低于边界时返回 `Some(Less)`
    fn compare(&self, value: &OptionValue) -> Option<std::cmp::Ordering> {
        match (value, self) {
            (OptionValue::Integer(v), Bound::Integer(b)) => Some(v.cmp(b)),
            _ => value.as_f64()?.partial_cmp(&self.as_f64()),
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Integer(i) => write!(f, "{i}"),
            Bound::Float(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<i64> for Bound {
    fn from(value: i64) -> Self {
        Bound::Integer(value)
    }
}

impl From<i32> for Bound {
    fn from(value: i32) -> Self {
        Bound::Integer(value.into())
    }
}

impl From<f64> for Bound {
    fn from(value: f64) -> Self {
        Bound::Float(value)
    }
}

/// 声明的校验约束
///
/// `required` 只做记录，由使用方组件负责执行。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Bound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Bound>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
}

impl OptionConstraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min<B: Into<Bound>>(mut self, min: B) -> Self {
        self.min = Some(min.into());
        self
    }

    pub fn with_max<B: Into<Bound>>(mut self, max: B) -> Self {
        self.max = Some(max.into());
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none() && !self.required && self.choices.is_empty()
    }

    /// 拒绝与 `kind` 不相容的约束声明
    fn check_declaration(&self, option: &str, kind: OptionKind) -> ConfigResult<()> {
        for (label, bound) in [("min", self.min), ("max", self.max)] {
            let Some(bound) = bound else { continue };
            if !kind.is_numeric() {
                return Err(ConfigError::invalid_option(format!(
                    "{option}: {label} bound requires a numeric kind, got {kind}"
                )));
            }
            if bound.is_nan() {
                return Err(ConfigError::invalid_option(format!(
                    "{option}: {label} bound cannot be NaN"
                )));
            }
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min.as_f64() > max.as_f64() {
                return Err(ConfigError::invalid_option(format!(
                    "{option}: min {min} is greater than max {max}"
                )));
            }
        }
        if !self.choices.is_empty() && kind != OptionKind::String {
            return Err(ConfigError::invalid_option(format!(
                "{option}: choices require the string kind, got {kind}"
            )));
        }
        Ok(())
    }

    fn check_value(&self, option: &str, value: &OptionValue) -> ConfigResult<()> {
        use std::cmp::Ordering;

        if let Some(min) = self.min {
            if min.compare(value) == Some(Ordering::Less) {
                return Err(ConfigError::constraint_violation(
                    option,
                    format!("value {value} is below minimum {min}"),
                ));
            }
        }
        if let Some(max) = self.max {
            if max.compare(value) == Some(Ordering::Greater) {
                return Err(ConfigError::constraint_violation(
                    option,
                    format!("value {value} is above maximum {max}"),
                ));
            }
        }
        if let (false, Some(s)) = (self.choices.is_empty(), value.as_str()) {
            if !self.choices.iter().any(|choice| choice == s) {
                return Err(ConfigError::constraint_violation(
                    option,
                    format!("value {s:?} is not one of {:?}", self.choices),
                ));
            }
        }
        Ok(())
    }
}

/// 单个配置选项的不可变声明
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionDescriptor {
    name: String,
    kind: OptionKind,
    help: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<OptionValue>,
    #[serde(skip_serializing_if = "OptionConstraints::is_empty")]
    constraints: OptionConstraints,
}

impl OptionDescriptor {
    /// 校验并构造描述符
    ///
    /// 默认值与 `kind` 不符时返回 `TypeMismatch`，违反边界或可选值时返回
    /// `ConstraintViolation`，名称为空或约束不适用于 `kind` 时返回 `InvalidOption`。
    pub fn new<N, H>(
        name: N,
        kind: OptionKind,
        default: Option<OptionValue>,
        constraints: OptionConstraints,
        help: H,
    ) -> ConfigResult<Self>
    where
        N: Into<String>,
        H: Into<String>,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConfigError::invalid_option("option name cannot be empty"));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(ConfigError::invalid_option(format!(
                "option name {name:?} cannot contain whitespace"
            )));
        }

        constraints.check_declaration(&name, kind)?;

        let default = match default {
            Some(value) => {
                let value = value.conform(&name, kind)?;
                constraints.check_value(&name, &value)?;
                Some(value)
            }
            None => None,
        };

        Ok(Self {
            name,
            kind,
            help: help.into(),
            default,
            constraints,
        })
    }

    pub fn builder<N: Into<String>>(name: N, kind: OptionKind) -> OptionBuilder {
        OptionBuilder::new(name, kind)
    }

    pub fn string<N: Into<String>>(name: N) -> OptionBuilder {
        OptionBuilder::new(name, OptionKind::String)
    }

    pub fn integer<N: Into<String>>(name: N) -> OptionBuilder {
        OptionBuilder::new(name, OptionKind::Integer)
    }

    pub fn float<N: Into<String>>(name: N) -> OptionBuilder {
        OptionBuilder::new(name, OptionKind::Float)
    }

    pub fn boolean<N: Into<String>>(name: N) -> OptionBuilder {
        OptionBuilder::new(name, OptionKind::Boolean)
    }

    pub fn list<N: Into<String>>(name: N) -> OptionBuilder {
        OptionBuilder::new(name, OptionKind::List)
    }

    pub fn multi_string<N: Into<String>>(name: N) -> OptionBuilder {
        OptionBuilder::new(name, OptionKind::MultiString)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> OptionKind {
        self.kind
    }

    pub fn default_value(&self) -> Option<&OptionValue> {
        self.default.as_ref()
    }

    pub fn constraints(&self) -> &OptionConstraints {
        &self.constraints
    }

    pub fn help(&self) -> &str {
        &self.help
    }
}

/// [`OptionDescriptor`] 的链式构造器，校验在 `build` 中执行
#[derive(Debug, Clone)]
pub struct OptionBuilder {
    name: String,
    kind: OptionKind,
    default: Option<OptionValue>,
    constraints: OptionConstraints,
    help: String,
}

impl OptionBuilder {
    pub fn new<N: Into<String>>(name: N, kind: OptionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
            constraints: OptionConstraints::default(),
            help: String::new(),
        }
    }

    pub fn default_value<V: Into<OptionValue>>(mut self, value: V) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn min<B: Into<Bound>>(mut self, min: B) -> Self {
        self.constraints.min = Some(min.into());
        self
    }

    pub fn max<B: Into<Bound>>(mut self, max: B) -> Self {
        self.constraints.max = Some(max.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.constraints.required = required;
        self
    }

    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constraints.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    pub fn help<H: Into<String>>(mut self, help: H) -> Self {
        self.help = help.into();
        self
    }

    pub fn build(self) -> ConfigResult<OptionDescriptor> {
        OptionDescriptor::new(
            self.name,
            self.kind,
            self.default,
            self.constraints,
            self.help,
        )
    }
}
