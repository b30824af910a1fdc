//! 参数描述与绑定结果
//!
//! 方法参数在注册时被描述为 `ParameterDescription` 列表，
//! 绑定器根据描述把请求数据填充为 `ActionArguments`。

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::BindError;
use crate::multipart::UploadedFile;

/// 参数类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterType {
    String,
    Integer,
    Float,
    Boolean,
    /// 复合对象，从嵌套键或 JSON 请求体反序列化
    Bean,
    /// 上传文件
    File,
}

/// 类型探针 - 在绑定时验证值能否反序列化为目标类型
type TypeProbe = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// 方法参数描述
#[derive(Clone)]
pub struct ParameterDescription {
    name: String,
    parameter_type: ParameterType,
    type_name: String,
    probe: Option<TypeProbe>,
}

impl ParameterDescription {
    pub fn string(name: impl Into<String>) -> Self {
        Self::scalar(name, ParameterType::String, "String")
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::scalar(name, ParameterType::Integer, "i64")
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::scalar(name, ParameterType::Float, "f64")
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::scalar(name, ParameterType::Boolean, "bool")
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self::scalar(name, ParameterType::File, "UploadedFile")
    }

    /// 描述一个复合参数
    ///
    /// 注册时捕获目标类型的反序列化探针，绑定失败在绑定阶段
    /// 而不是调用阶段报告。
    pub fn bean<T: DeserializeOwned + 'static>(name: impl Into<String>) -> Self {
        let type_name = std::any::type_name::<T>().to_string();
        let probe: TypeProbe = Arc::new(|value: &Value| {
            serde_json::from_value::<T>(value.clone())
                .map(|_| ())
                .map_err(|e| e.to_string())
        });

        Self {
            name: name.into(),
            parameter_type: ParameterType::Bean,
            type_name,
            probe: Some(probe),
        }
    }

    fn scalar(name: impl Into<String>, parameter_type: ParameterType, type_name: &str) -> Self {
        Self {
            name: name.into(),
            parameter_type,
            type_name: type_name.to_string(),
            probe: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameter_type(&self) -> ParameterType {
        self.parameter_type
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn is_a(&self, parameter_type: ParameterType) -> bool {
        self.parameter_type == parameter_type
    }

    /// 对绑定值运行类型探针
    pub fn check(&self, value: &Value) -> Result<(), BindError> {
        if let Some(probe) = &self.probe {
            probe(value).map_err(|message| BindError::Conversion {
                name: self.name.clone(),
                target_type: self.type_name.clone(),
                message,
            })?;
        }
        Ok(())
    }
}

impl fmt::Debug for ParameterDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterDescription")
            .field("name", &self.name)
            .field("parameter_type", &self.parameter_type)
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// 已绑定的参数值
#[derive(Debug, Clone)]
pub enum BoundValue {
    Json(Value),
    File(UploadedFile),
}

/// 绑定后的参数集合
#[derive(Debug, Clone, Default)]
pub struct ActionArguments {
    values: HashMap<String, BoundValue>,
}

impl ActionArguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: BoundValue) {
        self.values.insert(name.into(), value);
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&BoundValue> {
        self.values.get(name)
    }

    pub fn json(&self, name: &str) -> Option<&Value> {
        match self.values.get(name) {
            Some(BoundValue::Json(value)) => Some(value),
            _ => None,
        }
    }

    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        match self.values.get(name) {
            Some(BoundValue::File(file)) => Some(file),
            _ => None,
        }
    }

    /// 将绑定值反序列化为目标类型
    pub fn deserialize<T: DeserializeOwned>(&self, name: &str) -> Result<T, BindError> {
        match self.values.get(name) {
            Some(BoundValue::Json(value)) => {
                serde_json::from_value(value.clone()).map_err(|e| BindError::Conversion {
                    name: name.to_string(),
                    target_type: std::any::type_name::<T>().to_string(),
                    message: e.to_string(),
                })
            }
            Some(BoundValue::File(_)) => Err(BindError::Conversion {
                name: name.to_string(),
                target_type: std::any::type_name::<T>().to_string(),
                message: "bound value is an uploaded file".to_string(),
            }),
            None => Err(BindError::Missing {
                name: name.to_string(),
            }),
        }
    }

    /// 返回尚未绑定的参数
    pub fn unbound<'a>(
        &self,
        parameters: &'a [ParameterDescription],
    ) -> Vec<&'a ParameterDescription> {
        parameters
            .iter()
            .filter(|p| !self.is_bound(p.name()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
