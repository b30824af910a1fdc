//! 动作模型与控制器注册表
//!
//! 控制器在启动时以全限定名注册为 `ControllerDescriptor`，
//! 描述符携带方法表；解析动作名就是在注册表中查找
//! "控制器键 + 方法名"，不依赖任何运行时反射。

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::error::{ActionError, HandlerError};
use crate::interceptor::{BoundInterceptor, Marker};
use crate::introspection::{ActionArguments, ParameterDescription};

/// 方法调用返回的 future
pub type InvokeFuture = Pin<Box<dyn Future<Output = Result<Value, HandlerError>> + Send>>;

/// 方法调用器 - 接收控制器实例和绑定好的参数
pub type Invoker =
    Arc<dyn Fn(Arc<dyn Any + Send + Sync>, ActionArguments) -> InvokeFuture + Send + Sync>;

/// 将类型化的异步处理函数包装为 `Invoker`
///
/// 调用时把 `Arc<dyn Any>` 向下转换为具体控制器类型，
/// 转换失败说明描述符和容器注册的类型不一致。
pub fn typed_handler<C, F, Fut>(handler: F) -> Invoker
where
    C: Any + Send + Sync,
    F: Fn(Arc<C>, ActionArguments) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
{
    let handler = Arc::new(handler);
    Arc::new(move |instance: Arc<dyn Any + Send + Sync>, arguments: ActionArguments| {
        let handler = Arc::clone(&handler);
        Box::pin(async move {
            let controller = instance.downcast::<C>().map_err(|_| -> HandlerError {
                Box::new(ActionError::ControllerType {
                    expected: std::any::type_name::<C>().to_string(),
                })
            })?;
            handler(controller, arguments).await
        })
    })
}

/// 方法描述符
#[derive(Clone)]
pub struct MethodDescriptor {
    name: String,
    parameters: Vec<ParameterDescription>,
    markers: Vec<Marker>,
    invoker: Invoker,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>, invoker: Invoker) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            markers: Vec::new(),
            invoker,
        }
    }

    pub fn with_parameter(mut self, parameter: ParameterDescription) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[ParameterDescription] {
        &self.parameters
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("markers", &self.markers)
            .finish()
    }
}

/// 控制器描述符
///
/// `name` 是控制器的全限定键（例如 `demo.user.UserController`），
/// `bean_name` 是容器中对应的 Bean 名称，默认与 `name` 相同。
#[derive(Debug)]
pub struct ControllerDescriptor {
    name: String,
    type_name: String,
    bean_name: String,
    methods: HashMap<String, MethodDescriptor>,
}

impl ControllerDescriptor {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            bean_name: name.clone(),
            name,
            type_name: type_name.into(),
            methods: HashMap::new(),
        }
    }

    pub fn with_bean_name(mut self, bean_name: impl Into<String>) -> Self {
        self.bean_name = bean_name.into();
        self
    }

    pub fn with_method(mut self, method: MethodDescriptor) -> Self {
        self.methods.insert(method.name().to_string(), method);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn bean_name(&self) -> &str {
        &self.bean_name
    }

    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }

    pub fn method_names(&self) -> Vec<String> {
        self.methods.keys().cloned().collect()
    }
}

/// 已解析的动作 - 控制器键、方法名和调用所需的全部元数据
///
/// 拦截器在动作创建时解析一次，之后不再变化。
#[derive(Clone)]
pub struct MethodAction {
    controller: String,
    method: String,
    controller_type: String,
    bean_name: String,
    parameters: Vec<ParameterDescription>,
    markers: Vec<Marker>,
    interceptors: Vec<BoundInterceptor>,
    invoker: Invoker,
}

impl MethodAction {
    pub(crate) fn from_descriptor(
        descriptor: &ControllerDescriptor,
        method: &MethodDescriptor,
        interceptors: Vec<BoundInterceptor>,
    ) -> Self {
        Self {
            controller: descriptor.name().to_string(),
            method: method.name().to_string(),
            controller_type: descriptor.type_name().to_string(),
            bean_name: descriptor.bean_name().to_string(),
            parameters: method.parameters().to_vec(),
            markers: method.markers().to_vec(),
            interceptors,
            invoker: Arc::clone(&method.invoker),
        }
    }

    /// 动作的全名，例如 `demo.user.UserController.list`
    pub fn name(&self) -> String {
        format!("{}.{}", self.controller, self.method)
    }

    pub fn controller(&self) -> &str {
        &self.controller
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn controller_type(&self) -> &str {
        &self.controller_type
    }

    pub fn bean_name(&self) -> &str {
        &self.bean_name
    }

    pub fn parameters(&self) -> &[ParameterDescription] {
        &self.parameters
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn interceptors(&self) -> &[BoundInterceptor] {
        &self.interceptors
    }

    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }
}

impl fmt::Debug for MethodAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodAction")
            .field("controller", &self.controller)
            .field("method", &self.method)
            .field("controller_type", &self.controller_type)
            .finish()
    }
}

impl fmt::Display for MethodAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.controller, self.method)
    }
}

/// 控制器注册表
pub struct ControllerRegistry {
    controllers: RwLock<HashMap<String, Arc<ControllerDescriptor>>>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self {
            controllers: RwLock::new(HashMap::new()),
        }
    }

    /// 注册控制器描述符，重复注册时后注册的替换先注册的
    pub fn register(&self, descriptor: ControllerDescriptor) {
        let name = descriptor.name().to_string();
        let mut controllers = self.controllers.write();
        if controllers.insert(name.clone(), Arc::new(descriptor)).is_some() {
            tracing::debug!("Controller descriptor '{}' replaced", name);
        } else {
            tracing::debug!("Controller descriptor '{}' registered", name);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<ControllerDescriptor>> {
        self.controllers.read().get(name).cloned()
    }

    pub fn controller_names(&self) -> Vec<String> {
        self.controllers.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.controllers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.read().is_empty()
    }
}

impl Default for ControllerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// 拆分动作名为控制器键和方法名
///
/// 最后一个点号之后是方法名，之前是控制器键。
/// 名称不含点号或任一部分为空时返回 `None`。
pub(crate) fn split_action_name(action_name: &str) -> Option<(&str, &str)> {
    let index = action_name.rfind('.')?;
    let controller = &action_name[..index];
    let method = &action_name[index + 1..];
    if controller.is_empty() || method.is_empty() {
        return None;
    }
    Some((controller, method))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn noop_invoker() -> Invoker {
        Arc::new(|_, _| Box::pin(async { Ok(Value::Null) }))
    }

    #[test]
    fn action_name_splits_on_last_dot() {
        assert_eq!(
            split_action_name("com.example.Foo.bar"),
            Some(("com.example.Foo", "bar"))
        );
        assert_eq!(split_action_name("Foo.bar"), Some(("Foo", "bar")));
    }

    #[test]
    fn malformed_action_names_are_rejected() {
        assert_eq!(split_action_name("nodots"), None);
        assert_eq!(split_action_name(".bar"), None);
        assert_eq!(split_action_name("Foo."), None);
        assert_eq!(split_action_name(""), None);
    }

    #[test]
    fn descriptor_replacement_is_last_wins() {
        let registry = ControllerRegistry::new();
        registry.register(ControllerDescriptor::new("demo.Foo", "FooV1"));
        registry.register(ControllerDescriptor::new("demo.Foo", "FooV2"));

        assert_eq!(registry.len(), 1);
        let descriptor = registry.lookup("demo.Foo").unwrap();
        assert_eq!(descriptor.type_name(), "FooV2");
    }

    #[test]
    fn method_action_carries_descriptor_metadata() {
        let descriptor = ControllerDescriptor::new("demo.Foo", "Foo").with_method(
            MethodDescriptor::new("bar", noop_invoker())
                .with_parameter(ParameterDescription::string("name"))
                .with_marker(Marker::new("logged").with_config(json!({"level": "info"}))),
        );

        let method = descriptor.method("bar").unwrap();
        let action = MethodAction::from_descriptor(&descriptor, method, Vec::new());

        assert_eq!(action.name(), "demo.Foo.bar");
        assert_eq!(action.parameters().len(), 1);
        assert_eq!(action.markers().len(), 1);
        assert_eq!(action.bean_name(), "demo.Foo");
    }
}
