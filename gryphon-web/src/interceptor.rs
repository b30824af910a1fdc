//! 动作拦截器
//!
//! 提供类似 Spring HandlerInterceptor 的拦截器功能。拦截器按
//! 标记（Marker）触发：方法声明携带哪些标记，分发时就执行
//! 对应已注册的拦截器。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use crate::error::HandlerError;
use crate::request::{ActionRequest, ActionResponse};

/// 标记类别 - 字符串键，对应一个已注册的拦截器
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarkerKind(String);

impl MarkerKind {
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MarkerKind {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for MarkerKind {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// 方法上声明的拦截标记
///
/// `config` 是标记自带的配置载荷，执行时原样传给拦截器。
#[derive(Debug, Clone)]
pub struct Marker {
    kind: MarkerKind,
    config: Value,
}

impl Marker {
    pub fn new(kind: impl Into<MarkerKind>) -> Self {
        Self {
            kind: kind.into(),
            config: Value::Null,
        }
    }

    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    pub fn kind(&self) -> &MarkerKind {
        &self.kind
    }

    pub fn config(&self) -> &Value {
        &self.config
    }
}

/// 动作拦截器 trait
///
/// 三个阶段都可以通过返回 `Some(value)` 提供响应值：
/// - `before` 返回 `Some` 时跳过剩余 before 拦截器和方法调用
/// - `after` 返回 `Some` 时替换当前结果，所有 after 拦截器都会执行
/// - `exception` 返回 `Some` 时表示该拦截器处理了异常
#[async_trait]
pub trait ActionInterceptor: Send + Sync {
    /// 方法调用前执行
    async fn before(
        &self,
        _config: &Value,
        _request: &ActionRequest,
        _response: &mut ActionResponse,
    ) -> Result<Option<Value>, HandlerError> {
        Ok(None)
    }

    /// 方法调用后执行
    ///
    /// `result` 是当前携带的结果（方法返回值或更早拦截器的替换值）。
    async fn after(
        &self,
        _config: &Value,
        _result: &Value,
        _request: &ActionRequest,
        _response: &mut ActionResponse,
    ) -> Result<Option<Value>, HandlerError> {
        Ok(None)
    }

    /// 方法调用或其他拦截器失败时执行
    async fn exception(
        &self,
        _config: &Value,
        _error: &HandlerError,
        _request: &ActionRequest,
        _response: &mut ActionResponse,
    ) -> Option<Value> {
        None
    }
}

/// 标记与其对应拦截器的配对
pub type BoundInterceptor = (Marker, Arc<dyn ActionInterceptor>);

/// 拦截器注册表
///
/// 每个标记类别至多对应一个拦截器，重复注册时后注册的生效。
pub struct InterceptorRegistry {
    interceptors: RwLock<HashMap<MarkerKind, Arc<dyn ActionInterceptor>>>,
}

impl InterceptorRegistry {
    pub fn new() -> Self {
        Self {
            interceptors: RwLock::new(HashMap::new()),
        }
    }

    /// 注册拦截器，后注册的替换先注册的
    pub fn register(&self, kind: impl Into<MarkerKind>, interceptor: Arc<dyn ActionInterceptor>) {
        let kind = kind.into();
        let mut interceptors = self.interceptors.write();
        if interceptors.insert(kind.clone(), interceptor).is_some() {
            tracing::debug!("Interceptor for marker '{}' replaced", kind);
        } else {
            tracing::debug!("Interceptor registered for marker '{}'", kind);
        }
    }

    pub fn has_interceptor(&self, kind: &MarkerKind) -> bool {
        self.interceptors.read().contains_key(kind)
    }

    /// 按标记声明顺序查找拦截器，跳过未注册的标记
    pub fn find_interceptors(&self, markers: &[Marker]) -> Vec<BoundInterceptor> {
        let interceptors = self.interceptors.read();
        markers
            .iter()
            .filter_map(|marker| {
                interceptors
                    .get(marker.kind())
                    .map(|interceptor| (marker.clone(), Arc::clone(interceptor)))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.interceptors.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.read().is_empty()
    }
}

impl Default for InterceptorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tagged(&'static str);

    #[async_trait]
    impl ActionInterceptor for Tagged {
        async fn before(
            &self,
            _config: &Value,
            _request: &ActionRequest,
            _response: &mut ActionResponse,
        ) -> Result<Option<Value>, HandlerError> {
            Ok(Some(Value::String(self.0.to_string())))
        }
    }

    #[test]
    fn later_registration_replaces_earlier() {
        let registry = InterceptorRegistry::new();
        registry.register("logged", Arc::new(Tagged("first")));
        registry.register("logged", Arc::new(Tagged("second")));

        assert_eq!(registry.len(), 1);

        let markers = vec![Marker::new("logged")];
        let found = registry.find_interceptors(&markers);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn find_interceptors_preserves_declaration_order() {
        let registry = InterceptorRegistry::new();
        registry.register("auth", Arc::new(Tagged("auth")));
        registry.register("logged", Arc::new(Tagged("logged")));

        let markers = vec![
            Marker::new("logged"),
            Marker::new("unregistered"),
            Marker::new("auth"),
        ];

        let found = registry.find_interceptors(&markers);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].0.kind().as_str(), "logged");
        assert_eq!(found[1].0.kind().as_str(), "auth");
    }

    #[test]
    fn unregistered_markers_are_skipped() {
        let registry = InterceptorRegistry::new();
        let markers = vec![Marker::new("nothing")];
        assert!(registry.find_interceptors(&markers).is_empty());
    }
}
