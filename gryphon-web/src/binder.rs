//! 参数绑定器
//!
//! 每种内容类型对应一个方法绑定器，按注册顺序选择第一个
//! 声明支持该内容类型的绑定器。`ParameterBinderSet` 提供
//! 各绑定器共享的标量转换和嵌套键展开逻辑。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Number, Value};

use crate::error::BindError;
use crate::introspection::{ActionArguments, BoundValue, ParameterDescription, ParameterType};
use crate::request::ActionRequest;

/// 方法绑定器 trait
///
/// `can_bind` 根据规范化的内容类型决定是否接手整个请求的绑定。
#[async_trait]
pub trait ActionMethodBinder: Send + Sync {
    fn can_bind(&self, content_type: Option<&str>) -> bool;

    async fn bind(
        &self,
        parameters: &[ParameterDescription],
        request: &ActionRequest,
        path_variables: &HashMap<String, String>,
        arguments: &mut ActionArguments,
    ) -> Result<(), BindError>;
}

/// 绑定器集合
///
/// 选择第一个 `can_bind` 返回 true 的绑定器执行绑定，
/// 全部拒绝时报告不支持的内容类型。
pub struct BinderSet {
    binders: Vec<Arc<dyn ActionMethodBinder>>,
}

impl BinderSet {
    pub fn new() -> Self {
        Self {
            binders: Vec::new(),
        }
    }

    pub fn with_binder(mut self, binder: Arc<dyn ActionMethodBinder>) -> Self {
        self.binders.push(binder);
        self
    }

    pub async fn bind(
        &self,
        parameters: &[ParameterDescription],
        request: &ActionRequest,
        path_variables: &HashMap<String, String>,
        arguments: &mut ActionArguments,
    ) -> Result<(), BindError> {
        let content_type = request.content_type();

        for binder in &self.binders {
            if binder.can_bind(content_type.as_deref()) {
                return binder
                    .bind(parameters, request, path_variables, arguments)
                    .await;
            }
        }

        Err(BindError::UnsupportedContentType {
            content_type: content_type.unwrap_or_default(),
        })
    }

    pub fn len(&self) -> usize {
        self.binders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.binders.is_empty()
    }
}

impl Default for BinderSet {
    fn default() -> Self {
        Self::new()
    }
}

/// 嵌套键的路径片段
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// 绑定器共享的参数绑定工具
///
/// 平铺的键值对（查询串、表单字段、multipart 文本字段）通过
/// 这里统一转换为类型化的绑定值。
pub struct ParameterBinderSet;

impl ParameterBinderSet {
    /// 把原始字符串按参数类别转换为 JSON 值
    pub fn coerce_scalar(
        parameter: &ParameterDescription,
        raw: &str,
    ) -> Result<Value, BindError> {
        let conversion = |message: String| BindError::Conversion {
            name: parameter.name().to_string(),
            target_type: parameter.type_name().to_string(),
            message,
        };

        match parameter.parameter_type() {
            ParameterType::String => Ok(Value::String(raw.to_string())),
            ParameterType::Integer => raw
                .parse::<i64>()
                .map(|v| Value::Number(v.into()))
                .map_err(|e| conversion(e.to_string())),
            ParameterType::Float => raw
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| conversion(format!("invalid float '{}'", raw))),
            ParameterType::Boolean => raw
                .parse::<bool>()
                .map(Value::Bool)
                .map_err(|e| conversion(e.to_string())),
            ParameterType::Bean | ParameterType::File => Err(conversion(
                "scalar value cannot bind a composite parameter".to_string(),
            )),
        }
    }

    /// 猜测标量的 JSON 表示：依次尝试整数、浮点、布尔，否则保留字符串
    fn guess_scalar(raw: &str) -> Value {
        if let Ok(v) = raw.parse::<i64>() {
            return Value::Number(v.into());
        }
        if let Ok(v) = raw.parse::<f64>() {
            if let Some(n) = Number::from_f64(v) {
                return Value::Number(n);
            }
        }
        if let Ok(v) = raw.parse::<bool>() {
            return Value::Bool(v);
        }
        Value::String(raw.to_string())
    }

    /// 用平铺的键值对绑定尚未绑定的参数
    ///
    /// 标量参数取第一个同名条目；复合参数收集 `name.xxx` 和
    /// `name[n]` 前缀的条目展开成嵌套结构后运行类型探针。
    pub fn bind_flat_entries(
        parameters: &[ParameterDescription],
        entries: &[(String, String)],
        arguments: &mut ActionArguments,
    ) -> Result<(), BindError> {
        for parameter in parameters {
            if arguments.is_bound(parameter.name()) {
                continue;
            }

            match parameter.parameter_type() {
                ParameterType::File => continue,
                ParameterType::Bean => {
                    if let Some(value) = Self::build_nested(parameter.name(), entries) {
                        parameter.check(&value)?;
                        arguments.insert(parameter.name(), BoundValue::Json(value));
                    }
                }
                _ => {
                    if let Some((_, raw)) =
                        entries.iter().find(|(key, _)| key == parameter.name())
                    {
                        let value = Self::coerce_scalar(parameter, raw)?;
                        arguments.insert(parameter.name(), BoundValue::Json(value));
                    }
                }
            }
        }

        Ok(())
    }

    /// 从前缀匹配的条目构建嵌套 JSON 值
    ///
    /// `user.address.city=Austin` 变为 `{"address": {"city": "Austin"}}`，
    /// `tags[0]=a` 变为 `["a"]`。没有匹配条目时返回 `None`。
    pub fn build_nested(name: &str, entries: &[(String, String)]) -> Option<Value> {
        let mut root = Value::Null;
        let mut matched = false;

        for (key, raw) in entries {
            let rest = if key == name {
                ""
            } else if let Some(rest) = key.strip_prefix(name) {
                if rest.starts_with('.') || rest.starts_with('[') {
                    rest.trim_start_matches('.')
                } else {
                    continue;
                }
            } else {
                continue;
            };

            matched = true;
            let segments = Self::split_segments(rest);
            Self::insert_path(&mut root, &segments, Self::guess_scalar(raw));
        }

        matched.then_some(root)
    }

    fn split_segments(path: &str) -> Vec<Segment> {
        let mut segments = Vec::new();
        for part in path.split('.') {
            if part.is_empty() {
                continue;
            }

            let mut rest = part;
            if let Some(bracket) = rest.find('[') {
                if bracket > 0 {
                    segments.push(Segment::Key(rest[..bracket].to_string()));
                }
                rest = &rest[bracket..];
                while let Some(close) = rest.find(']') {
                    let inner = &rest[1..close];
                    match inner.parse::<usize>() {
                        Ok(index) => segments.push(Segment::Index(index)),
                        Err(_) => segments.push(Segment::Key(inner.to_string())),
                    }
                    rest = &rest[close + 1..];
                    if !rest.starts_with('[') {
                        break;
                    }
                }
            } else {
                segments.push(Segment::Key(rest.to_string()));
            }
        }
        segments
    }

    fn insert_path(target: &mut Value, segments: &[Segment], value: Value) {
        let Some((head, tail)) = segments.split_first() else {
            *target = value;
            return;
        };

        match head {
            Segment::Key(key) => {
                if !target.is_object() {
                    *target = Value::Object(Map::new());
                }
                if let Value::Object(map) = target {
                    let slot = map.entry(key.clone()).or_insert(Value::Null);
                    Self::insert_path(slot, tail, value);
                }
            }
            Segment::Index(index) => {
                if !target.is_array() {
                    *target = Value::Array(Vec::new());
                }
                if let Value::Array(array) = target {
                    while array.len() <= *index {
                        array.push(Value::Null);
                    }
                    Self::insert_path(&mut array[*index], tail, value);
                }
            }
        }
    }
}
